use huddle_client::NegotiationState;
use huddle_core::SignalData;

use crate::integration::{Scripted, init_tracing, member, wait_for_roster};
use crate::utils::PeerEvent;

#[tokio::test]
async fn test_bad_offer_closes_one_link() {
    init_tracing();

    let mut local = Scripted::spawn("B");
    local.next_sent().await;

    local.peer_connected("X", false);
    local.peer_connected("Y", false);
    local.signal("X", SignalData::Offer { sdp: "garbage".into() });

    assert!(
        local
            .observer
            .wait_for(&PeerEvent::LinkFailed { member: member("X") }, 2000)
            .await
    );

    // Y still negotiates normally.
    local.signal("Y", SignalData::Offer { sdp: "offer Y->B #0".into() });
    let (to, _) = local.next_signal().await.expect("no answer to Y");
    assert_eq!(to, member("Y"));

    // The failed link stays listed, closed, until the member leaves.
    assert!(
        wait_for_roster(
            &local.set,
            |r| {
                r.len() == 2
                    && r[0].member == member("X")
                    && r[0].negotiation == NegotiationState::Closed
                    && r[1].negotiation == NegotiationState::Connected
            },
            2000
        )
        .await
    );
    assert!(local.transports.to(&member("X")).await.unwrap().is_closed().await);

    // Further signals for the closed link are ignored.
    local.signal("X", SignalData::Offer { sdp: "offer X->B #0".into() });
    local.expect_quiet().await;

    local.peer_disconnected("X");
    assert!(
        local
            .observer
            .wait_for(&PeerEvent::Left { member: member("X") }, 2000)
            .await
    );
    assert_eq!(local.set.roster().await.unwrap().len(), 1);
}

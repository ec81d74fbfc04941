use huddle_client::NegotiationState;
use huddle_core::{IceCandidate, SignalData};

use crate::integration::{Scripted, init_tracing, member};

#[tokio::test]
async fn test_stale_signals_dropped() {
    init_tracing();

    let mut local = Scripted::spawn("B");
    local.next_sent().await;

    local.peer_connected("A", false);
    assert!(local.wait_for_transports(1, 2000).await);

    // Answer with no offer outstanding.
    local.signal("A", SignalData::Answer { sdp: "answer A->B #0".into() });
    // Answer and candidate from someone we have no link with.
    local.signal("Z", SignalData::Answer { sdp: "answer Z->B #0".into() });
    local.signal(
        "Z",
        SignalData::Candidate {
            candidate: IceCandidate {
                candidate: "z".into(),
                sdp_mid: None,
                sdp_m_line_index: None,
            },
        },
    );

    local.expect_quiet().await;

    let roster = local.set.roster().await.unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].member, member("A"));
    assert_eq!(roster[0].negotiation, NegotiationState::New);
    assert!(local.transports.to(&member("A")).await.unwrap().calls().await.is_empty());
    assert!(local.transports.to(&member("Z")).await.is_none());
}

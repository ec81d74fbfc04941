use huddle_client::{LocalTrack, NegotiationState, TrackKind};
use huddle_core::SignalData;

use crate::integration::{Scripted, init_tracing, member, wait_for_roster};

#[tokio::test]
async fn test_responder_tracks_follow_answer() {
    init_tracing();

    let mut b = Scripted::spawn("B");
    let (camera, _writer) = LocalTrack::sample(TrackKind::Video, "B");
    b.set.publish(camera.clone()).await.unwrap();
    assert_eq!(b.set.published().await.unwrap(), vec![TrackKind::Video]);

    // A already sits in the room and offers without any video of its own.
    b.peer_connected("A", false);
    assert!(b.wait_for_transports(1, 2000).await);
    b.signal(
        "A",
        SignalData::Offer {
            sdp: "offer A->B #0".into(),
        },
    );

    let (to, answer) = b.next_signal().await.unwrap();
    assert_eq!(to, member("A"));
    assert!(matches!(answer, SignalData::Answer { .. }));

    // B's camera was not in A's offer, so B offers it right after answering.
    let (to, offer) = b.next_signal().await.unwrap();
    assert_eq!(to, member("A"));
    let SignalData::Offer { sdp } = offer else {
        panic!("expected an offer, got {offer:?}");
    };
    assert!(sdp.starts_with("offer B->A"));

    let link = b.transports.to(&member("A")).await.unwrap();
    assert_eq!(link.attached().await, vec![camera.id().clone()]);

    b.signal(
        "A",
        SignalData::Answer {
            sdp: "answer A->B #1".into(),
        },
    );
    assert!(
        wait_for_roster(
            &b.set,
            |r| r.len() == 1 && r[0].negotiation == NegotiationState::Connected,
            2000
        )
        .await
    );
    assert_eq!(link.offers().await, 1);
}

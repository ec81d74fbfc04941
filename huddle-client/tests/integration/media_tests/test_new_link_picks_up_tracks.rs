use huddle_client::{LocalTrack, TrackKind};

use crate::integration::{Participant, init_tracing, wait_until};
use crate::utils::{LoopbackRelay, TransportCall};

#[tokio::test]
async fn test_new_link_picks_up_tracks() {
    init_tracing();

    let relay = LoopbackRelay::new();
    let a = Participant::join(&relay, "A", "abc").await;

    let (audio, _writer) = LocalTrack::sample(TrackKind::Audio, "A");
    a.set.publish(audio.clone()).await.unwrap();

    let b = Participant::join(&relay, "B", "abc").await;
    assert!(a.wait_connected_to(&[&b.id], 2000).await);
    assert!(b.wait_connected_to(&[&a.id], 2000).await);

    // Attached before the first offer, so one offer carries it.
    let a_to_b = a.transports.to(&b.id).await.unwrap();
    let calls = a_to_b.calls().await;
    assert_eq!(calls[0], TransportCall::Attach(audio.id().clone()));
    assert_eq!(calls[1], TransportCall::CreateOffer);
    assert_eq!(a_to_b.offers().await, 1);

    // A responder that starts sending renegotiates from its side.
    let (video, _writer) = LocalTrack::sample(TrackKind::Video, "B");
    b.set.publish(video.clone()).await.unwrap();

    let b_to_a = b.transports.to(&a.id).await.unwrap();
    let (x, y) = (&a_to_b, &b_to_a);
    assert!(
        wait_until(
            || async move {
                y.offers().await == 1 && x.count(&TransportCall::CreateAnswer).await == 1
            },
            2000
        )
        .await
    );
    assert!(b.wait_connected_to(&[&a.id], 2000).await);
    assert_eq!(b_to_a.attached().await, vec![video.id().clone()]);
}

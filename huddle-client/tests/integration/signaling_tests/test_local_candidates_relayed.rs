use crate::integration::{Participant, init_tracing, wait_until};
use crate::utils::{LoopbackRelay, TransportCall};

#[tokio::test]
async fn test_local_candidates_relayed() {
    init_tracing();

    let relay = LoopbackRelay::new();
    let a = Participant::join(&relay, "A", "abc").await;
    let b = Participant::join(&relay, "B", "abc").await;
    assert!(b.wait_connected_to(&[&a.id], 2000).await);

    let a_to_b = a.transports.to(&b.id).await.unwrap();
    let b_to_a = b.transports.to(&a.id).await.unwrap();
    a_to_b.emit_candidate("from-a");
    b_to_a.emit_candidate("from-b");

    let (x, y) = (&a_to_b, &b_to_a);
    assert!(
        wait_until(
            || async move {
                x.count(&TransportCall::Candidate("from-b".into())).await == 1
                    && y.count(&TransportCall::Candidate("from-a".into())).await == 1
            },
            2000
        )
        .await
    );
}

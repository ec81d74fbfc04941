use crate::integration::{Participant, init_tracing};
use crate::utils::LoopbackRelay;

#[tokio::test]
async fn test_rooms_do_not_mix() {
    init_tracing();

    let relay = LoopbackRelay::new();
    let a = Participant::join(&relay, "A", "one").await;
    let b = Participant::join(&relay, "B", "one").await;
    let c = Participant::join(&relay, "C", "two").await;

    assert!(a.wait_connected_to(&[&b.id], 2000).await);
    assert!(b.wait_connected_to(&[&a.id], 2000).await);

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert!(c.roster().await.is_empty());
    assert!(c.transports.all().await.is_empty());
    assert_eq!(a.roster().await.len(), 1);
}

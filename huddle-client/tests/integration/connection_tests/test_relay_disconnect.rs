use crate::integration::{Participant, init_tracing, wait_until};
use crate::utils::{LoopbackRelay, PeerEvent};

#[tokio::test]
async fn test_relay_disconnect() {
    init_tracing();

    let relay = LoopbackRelay::new();
    let a = Participant::join(&relay, "A", "abc").await;
    let b = Participant::join(&relay, "B", "abc").await;
    let c = Participant::join(&relay, "C", "abc").await;

    assert!(b.wait_connected_to(&[&a.id, &c.id], 2000).await);

    b.connection.drop_connection().await;

    // B tears everything down locally.
    assert!(b.observer.wait_for(&PeerEvent::Disconnected, 2000).await);
    assert!(b.observer.events().await.contains(&PeerEvent::Left { member: a.id.clone() }));
    assert!(b.observer.events().await.contains(&PeerEvent::Left { member: c.id.clone() }));
    for transport in b.transports.all().await {
        assert!(transport.is_closed().await);
    }
    let set = &b.set;
    assert!(wait_until(|| async move { !set.is_running() }, 2000).await);

    // A and C drop B and keep each other.
    assert!(a.wait_connected_to(&[&c.id], 2000).await);
    assert!(c.wait_connected_to(&[&a.id], 2000).await);
    assert!(a.transports.to(&b.id).await.unwrap().is_closed().await);
    assert!(c.transports.to(&b.id).await.unwrap().is_closed().await);
    assert!(!a.transports.to(&c.id).await.unwrap().is_closed().await);
}

use huddle_client::Role;

use crate::integration::{Participant, init_tracing};
use crate::utils::LoopbackRelay;

#[tokio::test]
async fn test_three_member_mesh() {
    init_tracing();

    let relay = LoopbackRelay::new();
    let a = Participant::join(&relay, "A", "abc").await;
    let b = Participant::join(&relay, "B", "abc").await;
    let c = Participant::join(&relay, "C", "abc").await;

    assert!(a.wait_connected_to(&[&b.id, &c.id], 2000).await);
    assert!(b.wait_connected_to(&[&a.id, &c.id], 2000).await);
    assert!(c.wait_connected_to(&[&a.id, &b.id], 2000).await);

    let role = |p: &Participant, other: &Participant| {
        let set = p.set.clone();
        let other = other.id.clone();
        async move {
            set.roster()
                .await
                .unwrap()
                .into_iter()
                .find(|s| s.member == other)
                .map(|s| s.role)
        }
    };

    // Every pair has exactly one initiator.
    for (x, y) in [(&a, &b), (&a, &c), (&b, &c)] {
        assert_eq!(role(x, y).await, Some(Role::Initiator));
        assert_eq!(role(y, x).await, Some(Role::Responder));
    }

    // Three pairs, three offers in total.
    let mut offers = 0;
    for p in [&a, &b, &c] {
        for transport in p.transports.all().await {
            offers += transport.offers().await;
        }
    }
    assert_eq!(offers, 3);
}

use huddle_core::ClientEvent;

use crate::integration::{Scripted, init_tracing, member, room, wait_until};

#[tokio::test]
async fn test_leave_during_offer() {
    init_tracing();

    let mut a = Scripted::spawn("A");
    a.transports.stall_offers();
    assert_eq!(
        a.next_sent().await,
        Some(ClientEvent::JoinRoom(room("abc"), member("A")))
    );

    // The offer towards B is still being built when A leaves.
    a.peer_connected("B", true);
    let transports = a.transports.clone();
    assert!(
        wait_until(
            move || {
                let transports = transports.clone();
                async move {
                    match transports.to(&member("B")).await {
                        Some(link) => link.offers().await == 1,
                        None => false,
                    }
                }
            },
            2000
        )
        .await
    );

    assert_eq!(a.set.leave().await.unwrap(), 1);
    a.transports.release_offers();

    // Leave is the last word; the abandoned offer never goes out.
    assert_eq!(a.next_sent().await, Some(ClientEvent::LeaveRoom));
    assert_eq!(a.next_sent().await, None);

    let link = a.transports.to(&member("B")).await.unwrap();
    assert!(link.is_closed().await);
}

use huddle_core::RelayEvent;

use crate::integration::{init_tracing, start_test_relay};
use crate::utils::{TestConnection, member};

fn connected(event: RelayEvent) -> (String, bool) {
    match event {
        RelayEvent::UserConnected {
            user_id, initiator, ..
        } => (user_id.to_string(), initiator),
        other => panic!("Expected user-connected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_three_members_join() {
    init_tracing();

    let (server, url) = start_test_relay().await;

    let mut a = TestConnection::connect(&url).await.unwrap();
    let mut b = TestConnection::connect(&url).await.unwrap();
    let mut c = TestConnection::connect(&url).await.unwrap();

    a.join("abc", "A").await.unwrap();
    a.expect_silence().await.unwrap();

    b.join("abc", "B").await.unwrap();
    assert_eq!(connected(a.recv().await.unwrap()), ("B".into(), true));
    assert_eq!(connected(b.recv().await.unwrap()), ("A".into(), false));

    c.join("abc", "C").await.unwrap();
    assert_eq!(connected(a.recv().await.unwrap()), ("C".into(), true));
    assert_eq!(connected(b.recv().await.unwrap()), ("C".into(), true));

    let mut c_view = vec![
        connected(c.recv().await.unwrap()),
        connected(c.recv().await.unwrap()),
    ];
    c_view.sort();
    assert_eq!(c_view, vec![("A".into(), false), ("B".into(), false)]);

    // Exactly one initiator per pair: A->B, A->C, B->C.
    for conn in [&mut a, &mut b, &mut c] {
        conn.expect_silence().await.unwrap();
    }

    let room = huddle_core::RoomId::parse("abc").unwrap();
    let members: Vec<_> = server
        .router()
        .registry()
        .members(&room)
        .await
        .into_iter()
        .map(|m| m.member_id)
        .collect();
    assert_eq!(members, vec![member("A"), member("B"), member("C")]);

    server.shutdown().await.unwrap();
}

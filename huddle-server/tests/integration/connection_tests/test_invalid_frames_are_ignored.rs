use huddle_core::RelayEvent;

use crate::integration::{init_tracing, start_test_relay};
use crate::utils::{TestConnection, member};

#[tokio::test]
async fn test_invalid_frames_are_ignored() {
    init_tracing();

    let (server, url) = start_test_relay().await;

    let mut alice = TestConnection::connect(&url).await.unwrap();
    alice.send_raw("not json").await.unwrap();
    alice.send_raw(r#"{"event":"end-call"}"#).await.unwrap();
    alice.send_raw(r#"{"event":"join-room","data":["", "A"]}"#).await.unwrap();
    alice.join("abc", "A").await.unwrap();

    // The connection survives garbage and still works.
    let mut bob = TestConnection::connect(&url).await.unwrap();
    bob.join("abc", "B").await.unwrap();

    match alice.recv().await.unwrap() {
        RelayEvent::UserConnected {
            user_id, initiator, ..
        } => {
            assert_eq!(user_id, member("B"));
            assert!(initiator);
        }
        other => panic!("Unexpected event {:?}", other),
    }

    server.shutdown().await.unwrap();
}

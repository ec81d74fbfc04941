use huddle_core::{ClientEvent, RelayEvent};

use crate::integration::{init_tracing, start_test_relay};
use crate::utils::{TestConnection, member};

#[tokio::test]
async fn test_chat_message_is_room_scoped() {
    init_tracing();

    let (server, url) = start_test_relay().await;

    let mut a = TestConnection::connect(&url).await.unwrap();
    let mut b = TestConnection::connect(&url).await.unwrap();
    let mut outsider = TestConnection::connect(&url).await.unwrap();

    a.join("abc", "A").await.unwrap();
    b.join("abc", "B").await.unwrap();
    outsider.join("other", "X").await.unwrap();
    a.recv().await.unwrap();
    b.recv().await.unwrap();

    b.send(ClientEvent::SendMessage("hello room".into()))
        .await
        .unwrap();

    assert_eq!(
        a.recv().await.unwrap(),
        RelayEvent::ReceiveMessage {
            user_id: member("B"),
            message: "hello room".into(),
        }
    );
    b.expect_silence().await.unwrap();
    outsider.expect_silence().await.unwrap();

    server.shutdown().await.unwrap();
}

//! Integration tests for the live WebSocket protocol.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use rentchat_core::types::UserId;

use crate::helpers::TestApp;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect_with_query(addr: std::net::SocketAddr, token: &str) -> Socket {
    let (socket, _) = connect_async(format!("ws://{addr}/ws?token={token}"))
        .await
        .expect("Failed to connect");
    socket
}

async fn connect_with_header(addr: std::net::SocketAddr, token: &str) -> Socket {
    let mut request = format!("ws://{addr}/ws")
        .into_client_request()
        .expect("Failed to build request");
    request.headers_mut().insert(
        "Authorization",
        format!("Bearer {token}").parse().expect("header value"),
    );
    let (socket, _) = connect_async(request).await.expect("Failed to connect");
    socket
}

async fn wait_online(app: &TestApp, user_id: UserId) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !app.engine.presence.is_online(user_id) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("User never came online");
}

async fn next_event(socket: &mut Socket) -> Value {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let frame = socket
                .next()
                .await
                .expect("Socket closed")
                .expect("Socket error");
            if let Message::Text(text) = frame {
                return serde_json::from_str::<Value>(text.as_str()).expect("Invalid JSON event");
            }
        }
    })
    .await
    .expect("Timed out waiting for event")
}

async fn send_json(socket: &mut Socket, value: Value) {
    socket
        .send(Message::text(value.to_string()))
        .await
        .expect("Failed to send frame");
}

#[tokio::test]
async fn test_upgrade_without_token_is_refused() {
    let app = TestApp::new().await;
    let addr = app.spawn_server().await;

    match connect_async(format!("ws://{addr}/ws")).await {
        Err(WsError::Http(response)) => assert_eq!(response.status(), 401),
        other => panic!("Expected HTTP 401, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_upgrade_with_invalid_token_is_refused() {
    let app = TestApp::new().await;
    let addr = app.spawn_server().await;

    match connect_async(format!("ws://{addr}/ws?token=not-a-jwt")).await {
        Err(WsError::Http(response)) => assert_eq!(response.status(), 401),
        other => panic!("Expected HTTP 401, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_live_round_trip() {
    let app = TestApp::new().await;
    let owner = app.create_user("Olivia").await;
    let renter = app.create_user("Ben").await;
    let car = app.create_vehicle(&owner, "Civic").await;
    let addr = app.spawn_server().await;

    let mut owner_ws = connect_with_query(addr, &app.token_for(&owner)).await;
    let mut renter_ws = connect_with_header(addr, &app.token_for(&renter)).await;
    wait_online(&app, owner.id).await;
    wait_online(&app, renter.id).await;

    send_json(
        &mut renter_ws,
        json!({
            "type": "send_message",
            "receiver_id": owner.id,
            "vehicle_id": car,
            "content": "Is it available this weekend?",
        }),
    )
    .await;

    let sent = next_event(&mut renter_ws).await;
    assert_eq!(sent["type"], "message_sent");
    assert_eq!(sent["message"]["content"], "Is it available this weekend?");
    let conversation_id = sent["conversation_id"].clone();
    assert_eq!(next_event(&mut renter_ws).await["type"], "conversation_updated");

    let incoming = next_event(&mut owner_ws).await;
    assert_eq!(incoming["type"], "new_message");
    assert_eq!(incoming["conversation_id"], conversation_id);
    assert_eq!(incoming["message"]["sender"]["name"], "Ben");
    let updated = next_event(&mut owner_ws).await;
    assert_eq!(updated["type"], "conversation_updated");
    assert_eq!(updated["unread_count"][owner.id.to_string()], 1);

    send_json(
        &mut owner_ws,
        json!({ "type": "mark_as_read", "conversation_id": conversation_id }),
    )
    .await;

    let marked = next_event(&mut owner_ws).await;
    assert_eq!(marked["type"], "messages_marked_read");
    assert_eq!(marked["count"], 1);
    let read = next_event(&mut renter_ws).await;
    assert_eq!(read["type"], "messages_read");
    assert_eq!(read["read_by"], owner.id.to_string());

    owner_ws.close(None).await.expect("Failed to close");
    let offline = next_event(&mut renter_ws).await;
    assert_eq!(offline["type"], "user_status_change");
    assert_eq!(offline["user_id"], owner.id.to_string());
    assert_eq!(offline["status"], "offline");
}

#[tokio::test]
async fn test_bad_frames_get_error_events() {
    let app = TestApp::new().await;
    let owner = app.create_user("Olivia").await;
    let stranger = app.create_user("Carl").await;
    let car = app.create_vehicle(&owner, "Civic").await;
    let addr = app.spawn_server().await;

    let mut ws = connect_with_query(addr, &app.token_for(&stranger)).await;
    wait_online(&app, stranger.id).await;

    ws.send(Message::text("{oops")).await.expect("send");
    let error = next_event(&mut ws).await;
    assert_eq!(error["type"], "error");
    assert_eq!(error["code"], "VALIDATION");

    send_json(&mut ws, json!({ "type": "send_message", "receiver_id": owner.id })).await;
    let error = next_event(&mut ws).await;
    assert_eq!(error["message"], "Missing required fields");

    let other = app.create_user("Dana").await;
    send_json(
        &mut ws,
        json!({
            "type": "send_message",
            "receiver_id": other.id,
            "vehicle_id": car,
            "content": "hey",
        }),
    )
    .await;
    let error = next_event(&mut ws).await;
    assert_eq!(error["code"], "AUTHORIZATION");
}

#[tokio::test]
async fn test_store_outage_keeps_connection_usable() {
    let app = TestApp::new().await;
    let owner = app.create_user("Olivia").await;
    let renter = app.create_user("Ben").await;
    let car = app.create_vehicle(&owner, "Civic").await;
    let addr = app.spawn_server().await;

    let mut ws = connect_with_query(addr, &app.token_for(&renter)).await;
    wait_online(&app, renter.id).await;
    let frame = json!({
        "type": "send_message",
        "receiver_id": owner.id,
        "vehicle_id": car,
        "content": "Hello?",
    });

    app.messages.set_unavailable(true);
    send_json(&mut ws, frame.clone()).await;
    let error = next_event(&mut ws).await;
    assert_eq!(error["code"], "DATABASE");
    assert_eq!(error["message"], "Error sending message");

    app.messages.set_unavailable(false);
    send_json(&mut ws, frame).await;
    assert_eq!(next_event(&mut ws).await["type"], "message_sent");
}

//! Integration tests for the chat query routes.

use axum::http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_requires_bearer_token() {
    let app = TestApp::new().await;

    let response = app.get("/api/chat/conversations", None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "AUTHENTICATION");
}

#[tokio::test]
async fn test_rejects_token_for_unknown_user() {
    let app = TestApp::new().await;
    let ghost = rentchat_entity::UserSummary::new(rentchat_core::types::UserId::new(), "Ghost", None);

    let response = app
        .get("/api/chat/unread-count", Some(&app.token_for(&ghost)))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "User not found");
}

#[tokio::test]
async fn test_inbox_and_unread_count() {
    let app = TestApp::new().await;
    let owner = app.create_user("Olivia").await;
    let renter = app.create_user("Ben").await;
    let car = app.create_vehicle(&owner, "Civic").await;
    let van = app.create_vehicle(&owner, "Transit").await;

    app.send_message(&renter, &owner, car, "Is the Civic free on Friday?").await;
    app.send_message(&renter, &owner, car, "For two days").await;
    app.send_message(&renter, &owner, van, "And the van?").await;

    let token = app.token_for(&owner);
    let inbox = app.get("/api/chat/conversations", Some(&token)).await;
    assert_eq!(inbox.status, StatusCode::OK);
    let items = inbox.data().as_array().expect("array");
    assert_eq!(items.len(), 2);
    // most recent first
    assert_eq!(items[0]["vehicle"]["name"], "Transit");
    assert_eq!(items[0]["last_message"]["content"], "And the van?");
    assert_eq!(items[1]["unread_count"][owner.id.to_string()], 2);
    assert_eq!(items[1]["is_new"], false);

    let unread = app.get("/api/chat/unread-count", Some(&token)).await;
    assert_eq!(unread.status, StatusCode::OK);
    assert_eq!(unread.data()["unread_count"], 3);

    let renter_unread = app
        .get("/api/chat/unread-count", Some(&app.token_for(&renter)))
        .await;
    assert_eq!(renter_unread.data()["unread_count"], 0);
}

#[tokio::test]
async fn test_message_history_oldest_first() {
    let app = TestApp::new().await;
    let owner = app.create_user("Olivia").await;
    let renter = app.create_user("Ben").await;
    let car = app.create_vehicle(&owner, "Civic").await;

    let first = app.send_message(&renter, &owner, car, "Hi").await;
    app.send_message(&owner, &renter, car, "Hello!").await;

    let path = format!("/api/chat/conversations/{}/messages", first.conversation_id);
    let response = app.get(&path, Some(&app.token_for(&renter))).await;

    assert_eq!(response.status, StatusCode::OK);
    let messages = response.data().as_array().expect("array");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["content"], "Hi");
    assert_eq!(messages[0]["sender"]["name"], "Ben");
    assert_eq!(messages[1]["content"], "Hello!");
    assert_eq!(messages[1]["receiver"]["id"], renter.id.to_string());
}

#[tokio::test]
async fn test_history_hidden_from_non_participants() {
    let app = TestApp::new().await;
    let owner = app.create_user("Olivia").await;
    let renter = app.create_user("Ben").await;
    let stranger = app.create_user("Carl").await;
    let car = app.create_vehicle(&owner, "Civic").await;
    let sent = app.send_message(&renter, &owner, car, "Hi").await;

    let path = format!("/api/chat/conversations/{}/messages", sent.conversation_id);
    let response = app.get(&path, Some(&app.token_for(&stranger))).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Conversation not found");
}

#[tokio::test]
async fn test_vehicle_page_placeholder_then_real_view() {
    let app = TestApp::new().await;
    let owner = app.create_user("Olivia").await;
    let renter = app.create_user("Ben").await;
    let car = app.create_vehicle(&owner, "Civic").await;
    let token = app.token_for(&renter);
    let path = format!("/api/chat/conversations/vehicle/{}/user/{}", car, owner.id);

    let placeholder = app.get(&path, Some(&token)).await;
    assert_eq!(placeholder.status, StatusCode::OK);
    assert!(placeholder.data()["id"].is_null());
    assert_eq!(placeholder.data()["is_new"], true);
    assert_eq!(placeholder.data()["unread_count"], serde_json::json!({}));
    assert_eq!(placeholder.data()["participants"].as_array().map(Vec::len), Some(2));

    let sent = app.send_message(&renter, &owner, car, "Hi").await;

    let existing = app.get(&path, Some(&token)).await;
    assert_eq!(existing.status, StatusCode::OK);
    assert_eq!(existing.data()["id"], sent.conversation_id.to_string());
    assert_eq!(existing.data()["is_new"], false);
}

#[tokio::test]
async fn test_vehicle_page_rejects_non_owner() {
    let app = TestApp::new().await;
    let owner = app.create_user("Olivia").await;
    let renter = app.create_user("Ben").await;
    let car = app.create_vehicle(&owner, "Civic").await;

    let path = format!("/api/chat/conversations/vehicle/{}/user/{}", car, renter.id);
    let response = app.get(&path, Some(&app.token_for(&renter))).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_health_reports_store_and_metrics() {
    let app = TestApp::new().await;

    let response = app.get("/api/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["database"], "connected");
    assert_eq!(response.data()["realtime"]["connections_active"], 0);
}

#[tokio::test]
async fn test_development_config_seeds_usable_identities() {
    use rentchat_core::config::{AppConfig, StoreProvider};
    use rentchat_database::memory::MemoryDirectory;
    use rentchat_database::{UserDirectory, VehicleCatalog};

    let config = AppConfig::load("development").expect("load");
    assert_eq!(config.database.provider, StoreProvider::Memory);

    let directory = MemoryDirectory::new();
    directory.seed(&config.database.seed).await.expect("seed");

    let vehicle = config.database.seed.vehicles.first().expect("a seeded vehicle");
    let listed = directory
        .find_vehicle(vehicle.id)
        .await
        .expect("find")
        .expect("vehicle resolves");
    let owner = directory
        .find_user(listed.owner_id)
        .await
        .expect("find")
        .expect("owner resolves");
    assert!(!owner.name.is_empty());
    assert!(config.database.seed.users.len() >= 2);
}

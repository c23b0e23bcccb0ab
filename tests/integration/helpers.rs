//! Shared test helpers for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use tower::ServiceExt;

use rentchat_api::{AppState, build_app};
use rentchat_auth::{Claims, JwtDecoder, JwtIdentityVerifier};
use rentchat_core::config::AppConfig;
use rentchat_core::types::{UserId, VehicleId};
use rentchat_database::memory::{MemoryConversationStore, MemoryDirectory, MemoryMessageStore};
use rentchat_entity::{UserSummary, Vehicle};
use rentchat_realtime::ChatEngine;
use rentchat_service::{RequestContext, SendMessageRequest, SentMessage};

const TEST_SECRET: &str = "integration-test-secret";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// The live engine behind `/ws`
    pub engine: ChatEngine,
    /// Users and vehicles
    pub directory: Arc<MemoryDirectory>,
    /// Message store, to simulate outages
    pub messages: Arc<MemoryMessageStore>,
}

impl TestApp {
    /// Create a new test application over memory stores
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = TEST_SECRET.to_string();

        let directory = Arc::new(MemoryDirectory::new());
        let conversations = Arc::new(MemoryConversationStore::new());
        let messages = Arc::new(MemoryMessageStore::new());

        let verifier = Arc::new(JwtIdentityVerifier::new(
            JwtDecoder::new(&config.auth),
            directory.clone(),
        ));
        let chat = Arc::new(rentchat_service::ChatService::new(
            conversations.clone(),
            messages.clone(),
            directory.clone(),
            directory.clone(),
        ));
        let engine = ChatEngine::new(config.realtime.clone(), chat, verifier.clone());

        let cors = config.server.cors.clone();
        let state = AppState::new(config, verifier, engine.clone(), conversations);

        Self {
            router: build_app(state, &cors),
            engine,
            directory,
            messages,
        }
    }

    /// Add a marketplace user
    pub async fn create_user(&self, name: &str) -> UserSummary {
        let user = UserSummary::new(UserId::new(), name, None);
        self.directory.insert_user(user.clone()).await;
        user
    }

    /// List a vehicle owned by `owner`
    pub async fn create_vehicle(&self, owner: &UserSummary, name: &str) -> VehicleId {
        let id = VehicleId::new();
        self.directory
            .insert_vehicle(Vehicle {
                id,
                owner_id: owner.id,
                name: name.to_string(),
                image_url: None,
                category: Some("car".to_string()),
            })
            .await;
        id
    }

    /// Mint an access token for `user`
    pub fn token_for(&self, user: &UserSummary) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.into_uuid(),
            iat: now,
            exp: now + 3600,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .expect("Failed to encode token")
    }

    /// Send a message through the chat service, bypassing the socket
    pub async fn send_message(
        &self,
        from: &UserSummary,
        to: &UserSummary,
        vehicle_id: VehicleId,
        content: &str,
    ) -> SentMessage {
        self.engine
            .chat
            .send_message(
                &RequestContext::new(from.clone()),
                SendMessageRequest {
                    receiver_id: to.id,
                    vehicle_id,
                    content: content.to_string(),
                    message_type: None,
                },
            )
            .await
            .expect("Failed to send message")
    }

    /// Make a GET request to the test app
    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        let mut req = Request::builder().method("GET").uri(path);

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req.body(Body::empty()).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Serve the router on an ephemeral local port
    pub async fn spawn_server(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("No local addr");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server failed");
        });
        addr
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` field of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

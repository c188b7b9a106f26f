//! Test helpers for the REST API integration tests.
//!
//! Provides an in-memory TestServer plus helpers for registering users,
//! promoting them and creating content.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum_test::TestServer;
use serde_json::{json, Value};

use agora::auth::TokenService;
use agora::config::ForumConfig;
use agora::db::{Role, SharedDatabase, UserRepository, UserUpdate};
use agora::web::{create_health_router, create_router, AppState};
use agora::Database;

/// Secret used to sign test tokens.
pub const TEST_SECRET: &str = "test-secret-key-for-testing-only";

/// Password given to every test user.
pub const TEST_PASSWORD: &str = "password123";

/// A registered test user.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub token: String,
}

impl TestUser {
    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Build the full application router over the given database.
pub fn build_server(db: SharedDatabase, forum: ForumConfig) -> TestServer {
    let app_state = Arc::new(AppState::new(
        db,
        TokenService::new(TEST_SECRET, 3600),
        forum,
    ));
    let router = create_router(app_state, &[]).merge(create_health_router());
    TestServer::new(router).expect("Failed to create test server")
}

/// Create a test server with an in-memory database.
pub async fn create_test_server() -> (TestServer, SharedDatabase) {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let db = Arc::new(db);
    (build_server(db.clone(), ForumConfig::default()), db)
}

/// Register a user and return its id and token.
pub async fn register_user(server: &TestServer, username: &str) -> TestUser {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": TEST_PASSWORD
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let body: Value = response.json();
    TestUser {
        id: body["user"]["id"].as_i64().expect("user id"),
        username: username.to_string(),
        token: body["token"].as_str().expect("token").to_string(),
    }
}

/// Change a user's role directly in storage.
pub async fn set_role(db: &SharedDatabase, user: &TestUser, role: Role) {
    UserRepository::new(db.pool())
        .update(user.id, &UserUpdate::new().role(role))
        .await
        .expect("Failed to update role")
        .expect("User not found");
}

/// Register a user and promote them to moderator.
pub async fn register_moderator(
    server: &TestServer,
    db: &SharedDatabase,
    username: &str,
) -> TestUser {
    let user = register_user(server, username).await;
    set_role(db, &user, Role::Moderator).await;
    user
}

/// Create a topic and return the response body's `topic`.
pub async fn create_topic(server: &TestServer, user: &TestUser, title: &str) -> Value {
    let response = server
        .post("/api/topics")
        .add_header(AUTHORIZATION, user.bearer())
        .json(&json!({
            "title": title,
            "description": format!("Description of {title}"),
            "category": "General",
            "tags": ["test"]
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let body: Value = response.json();
    body["topic"].clone()
}

/// Create a post (or reply when `parent` is set) and return the `post`.
pub async fn create_post(
    server: &TestServer,
    user: &TestUser,
    topic_id: i64,
    parent: Option<i64>,
    content: &str,
) -> Value {
    let response = server
        .post("/api/posts")
        .add_header(AUTHORIZATION, user.bearer())
        .json(&json!({
            "content": content,
            "topicId": topic_id,
            "parentPostId": parent
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let body: Value = response.json();
    body["post"].clone()
}

/// Extract an entity id from a response value.
pub fn id_of(value: &Value) -> i64 {
    value["id"].as_i64().expect("id")
}

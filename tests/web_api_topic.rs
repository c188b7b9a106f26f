//! Web API Topic Tests
//!
//! Integration tests for topic endpoints.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use common::{
    create_post, create_test_server, create_topic, id_of, register_moderator, register_user,
};
use serde_json::{json, Value};

// ============================================================================
// Creation
// ============================================================================

#[tokio::test]
async fn test_create_topic_success() {
    let (server, _db) = create_test_server().await;
    let alice = register_user(&server, "alice").await;

    let response = server
        .post("/api/topics")
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({
            "title": "Rust async runtimes",
            "description": "Which one do you use?",
            "category": "Technology",
            "tags": ["rust", "async"]
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Topic created successfully");
    assert_eq!(body["flagged"], false);

    let topic = &body["topic"];
    assert_eq!(topic["title"], "Rust async runtimes");
    assert_eq!(topic["category"], "Technology");
    assert_eq!(topic["tags"], json!(["rust", "async"]));
    assert_eq!(topic["author"]["username"], "alice");
    assert_eq!(topic["author"]["role"], "user");
    assert_eq!(topic["viewCount"], 0);
    assert_eq!(topic["postCount"], 0);
    assert_eq!(topic["isPinned"], false);
    assert_eq!(topic["isLocked"], false);
    assert_eq!(topic["isModerated"], false);
}

#[tokio::test]
async fn test_create_topic_defaults_category() {
    let (server, _db) = create_test_server().await;
    let alice = register_user(&server, "alice").await;

    let response = server
        .post("/api/topics")
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({
            "title": "No category",
            "description": "Should land in General"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["topic"]["category"], "General");
    assert_eq!(body["topic"]["tags"], json!([]));
}

#[tokio::test]
async fn test_create_topic_flagged() {
    let (server, _db) = create_test_server().await;
    let alice = register_user(&server, "alice").await;

    let response = server
        .post("/api/topics")
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({
            "title": "Cheap SPAM watches",
            "description": "Click here"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["flagged"], true);
    assert_eq!(body["message"], "Topic created but flagged for moderation");
    assert_eq!(body["topic"]["isModerated"], true);
    assert_eq!(
        body["topic"]["moderationReason"],
        "Content contains inappropriate language"
    );
}

#[tokio::test]
async fn test_create_topic_clean_title_not_flagged() {
    let (server, _db) = create_test_server().await;
    let alice = register_user(&server, "alice").await;

    let response = server
        .post("/api/topics")
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({
            "title": "Innocent title",
            "description": "buy spam now"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["flagged"], false);
    assert_eq!(body["topic"]["isModerated"], false);
}

#[tokio::test]
async fn test_create_topic_missing_fields() {
    let (server, _db) = create_test_server().await;
    let alice = register_user(&server, "alice").await;

    let response = server
        .post("/api/topics")
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({ "title": "Only a title" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Title and description are required");
}

#[tokio::test]
async fn test_create_topic_unauthenticated() {
    let (server, _db) = create_test_server().await;

    let response = server
        .post("/api/topics")
        .json(&json!({ "title": "t", "description": "d" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_topic_increments_author_post_count() {
    let (server, _db) = create_test_server().await;
    let alice = register_user(&server, "alice").await;
    create_topic(&server, &alice, "First").await;

    let response = server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, alice.bearer())
        .await;

    let body: Value = response.json();
    assert_eq!(body["user"]["postCount"], 1);
}

// ============================================================================
// Reading
// ============================================================================

#[tokio::test]
async fn test_get_topic_increments_views() {
    let (server, _db) = create_test_server().await;
    let alice = register_user(&server, "alice").await;
    let topic = create_topic(&server, &alice, "Views").await;
    let id = id_of(&topic);

    let first: Value = server.get(&format!("/api/topics/{id}")).await.json();
    let second: Value = server.get(&format!("/api/topics/{id}")).await.json();

    assert_eq!(first["topic"]["viewCount"], 1);
    assert_eq!(second["topic"]["viewCount"], 2);
}

#[tokio::test]
async fn test_get_topic_can_edit_for_viewer() {
    let (server, _db) = create_test_server().await;
    let alice = register_user(&server, "alice").await;
    let bob = register_user(&server, "bob").await;
    let id = id_of(&create_topic(&server, &alice, "Mine").await);

    let anonymous: Value = server.get(&format!("/api/topics/{id}")).await.json();
    assert!(anonymous["topic"].get("canEdit").is_none());

    let owner: Value = server
        .get(&format!("/api/topics/{id}"))
        .add_header(AUTHORIZATION, alice.bearer())
        .await
        .json();
    assert_eq!(owner["topic"]["canEdit"], true);

    let other: Value = server
        .get(&format!("/api/topics/{id}"))
        .add_header(AUTHORIZATION, bob.bearer())
        .await
        .json();
    assert_eq!(other["topic"]["canEdit"], false);
}

#[tokio::test]
async fn test_get_topic_not_found() {
    let (server, _db) = create_test_server().await;

    let response = server.get("/api/topics/9999").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Topic not found");
}

#[tokio::test]
async fn test_get_topic_invalid_id() {
    let (server, _db) = create_test_server().await;

    let response = server.get("/api/topics/not-a-number").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Invalid ID");
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_topics_pagination() {
    let (server, _db) = create_test_server().await;
    let alice = register_user(&server, "alice").await;
    for i in 0..12 {
        create_topic(&server, &alice, &format!("Topic {i}")).await;
    }

    let page1: Value = server.get("/api/topics").await.json();
    assert_eq!(page1["success"], true);
    assert_eq!(page1["topics"].as_array().unwrap().len(), 10);
    assert_eq!(page1["currentPage"], 1);
    assert_eq!(page1["totalPages"], 2);
    assert_eq!(page1["totalTopics"], 12);
    assert_eq!(page1["hasMore"], true);

    let page2: Value = server.get("/api/topics?page=2").await.json();
    assert_eq!(page2["topics"].as_array().unwrap().len(), 2);
    assert_eq!(page2["hasMore"], false);

    let small: Value = server.get("/api/topics?limit=5&page=3").await.json();
    assert_eq!(small["topics"].as_array().unwrap().len(), 2);
    assert_eq!(small["totalPages"], 3);
}

#[tokio::test]
async fn test_list_topics_bad_paging_falls_back() {
    let (server, _db) = create_test_server().await;
    let alice = register_user(&server, "alice").await;
    create_topic(&server, &alice, "Only").await;

    let body: Value = server.get("/api/topics?page=abc&limit=-3").await.json();
    assert_eq!(body["currentPage"], 1);
    assert_eq!(body["topics"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_topics_pinned_first() {
    let (server, db) = create_test_server().await;
    let alice = register_user(&server, "alice").await;
    let moderator = register_moderator(&server, &db, "mod").await;

    let old = id_of(&create_topic(&server, &alice, "Old").await);
    create_topic(&server, &alice, "New").await;

    server
        .patch(&format!("/api/topics/{old}/pin"))
        .add_header(AUTHORIZATION, moderator.bearer())
        .await
        .assert_status_ok();

    let body: Value = server.get("/api/topics").await.json();
    let topics = body["topics"].as_array().unwrap();
    assert_eq!(topics[0]["title"], "Old");
    assert_eq!(topics[0]["isPinned"], true);
    assert_eq!(topics[1]["title"], "New");
}

#[tokio::test]
async fn test_list_topics_search_and_category() {
    let (server, _db) = create_test_server().await;
    let alice = register_user(&server, "alice").await;

    for (title, category) in [
        ("Learning Rust", "Technology"),
        ("Sourdough starter", "Food"),
        ("Rust belt travel", "Travel"),
    ] {
        server
            .post("/api/topics")
            .add_header(AUTHORIZATION, alice.bearer())
            .json(&json!({
                "title": title,
                "description": "body",
                "category": category
            }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let search: Value = server.get("/api/topics?search=rust").await.json();
    assert_eq!(search["totalTopics"], 2);

    let filtered: Value = server
        .get("/api/topics?search=rust&category=Technology")
        .await
        .json();
    assert_eq!(filtered["totalTopics"], 1);
    assert_eq!(filtered["topics"][0]["title"], "Learning Rust");

    let all: Value = server.get("/api/topics?category=All").await.json();
    assert_eq!(all["totalTopics"], 3);

    let by_path: Value = server.get("/api/topics/category/Food").await.json();
    assert_eq!(by_path["totalTopics"], 1);
    assert_eq!(by_path["topics"][0]["title"], "Sourdough starter");
}

// ============================================================================
// Editing and deletion
// ============================================================================

#[tokio::test]
async fn test_update_topic_by_owner() {
    let (server, _db) = create_test_server().await;
    let alice = register_user(&server, "alice").await;
    let id = id_of(&create_topic(&server, &alice, "Before").await);

    let response = server
        .put(&format!("/api/topics/{id}"))
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({ "title": "After", "tags": ["edited"] }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Topic updated");
    assert_eq!(body["topic"]["title"], "After");
    assert_eq!(body["topic"]["description"], "Description of Before");
    assert_eq!(body["topic"]["tags"], json!(["edited"]));
}

#[tokio::test]
async fn test_update_topic_forbidden_for_others() {
    let (server, _db) = create_test_server().await;
    let alice = register_user(&server, "alice").await;
    let bob = register_user(&server, "bob").await;
    let id = id_of(&create_topic(&server, &alice, "Alice's").await);

    let response = server
        .put(&format!("/api/topics/{id}"))
        .add_header(AUTHORIZATION, bob.bearer())
        .json(&json!({ "title": "Hijacked" }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_update_topic_by_moderator() {
    let (server, db) = create_test_server().await;
    let alice = register_user(&server, "alice").await;
    let moderator = register_moderator(&server, &db, "mod").await;
    let id = id_of(&create_topic(&server, &alice, "Alice's").await);

    let response = server
        .put(&format!("/api/topics/{id}"))
        .add_header(AUTHORIZATION, moderator.bearer())
        .json(&json!({ "description": "Edited by staff" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["topic"]["description"], "Edited by staff");
}

#[tokio::test]
async fn test_update_topic_refilters_content() {
    let (server, _db) = create_test_server().await;
    let alice = register_user(&server, "alice").await;
    let id = id_of(&create_topic(&server, &alice, "Clean").await);

    let response = server
        .put(&format!("/api/topics/{id}"))
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({ "description": "now with badword1" }))
        .await;

    let body: Value = response.json();
    assert_eq!(body["topic"]["isModerated"], true);
}

#[tokio::test]
async fn test_delete_topic_cascades_to_posts() {
    let (server, _db) = create_test_server().await;
    let alice = register_user(&server, "alice").await;
    let id = id_of(&create_topic(&server, &alice, "Doomed").await);
    create_post(&server, &alice, id, None, "first").await;

    let response = server
        .delete(&format!("/api/topics/{id}"))
        .add_header(AUTHORIZATION, alice.bearer())
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Topic deleted");

    server
        .get(&format!("/api/topics/{id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let posts: Value = server.get(&format!("/api/posts/topic/{id}")).await.json();
    assert_eq!(posts["totalPosts"], 0);

    let list: Value = server.get("/api/topics").await.json();
    assert_eq!(list["totalTopics"], 0);
}

#[tokio::test]
async fn test_delete_topic_forbidden_for_others() {
    let (server, _db) = create_test_server().await;
    let alice = register_user(&server, "alice").await;
    let bob = register_user(&server, "bob").await;
    let id = id_of(&create_topic(&server, &alice, "Alice's").await);

    server
        .delete(&format!("/api/topics/{id}"))
        .add_header(AUTHORIZATION, bob.bearer())
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

// ============================================================================
// Lock and pin
// ============================================================================

#[tokio::test]
async fn test_lock_toggle() {
    let (server, db) = create_test_server().await;
    let alice = register_user(&server, "alice").await;
    let moderator = register_moderator(&server, &db, "mod").await;
    let id = id_of(&create_topic(&server, &alice, "Lockable").await);

    let locked: Value = server
        .patch(&format!("/api/topics/{id}/lock"))
        .add_header(AUTHORIZATION, moderator.bearer())
        .await
        .json();
    assert_eq!(locked["message"], "Topic locked");
    assert_eq!(locked["topic"]["isLocked"], true);

    let unlocked: Value = server
        .patch(&format!("/api/topics/{id}/lock"))
        .add_header(AUTHORIZATION, moderator.bearer())
        .await
        .json();
    assert_eq!(unlocked["message"], "Topic unlocked");
    assert_eq!(unlocked["topic"]["isLocked"], false);
}

#[tokio::test]
async fn test_lock_requires_moderator() {
    let (server, _db) = create_test_server().await;
    let alice = register_user(&server, "alice").await;
    let id = id_of(&create_topic(&server, &alice, "Mine").await);

    let response = server
        .patch(&format!("/api/topics/{id}/lock"))
        .add_header(AUTHORIZATION, alice.bearer())
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["message"], "Moderator access required");
}

#[tokio::test]
async fn test_pin_toggle_missing_topic() {
    let (server, db) = create_test_server().await;
    let moderator = register_moderator(&server, &db, "mod").await;

    server
        .patch("/api/topics/4242/pin")
        .add_header(AUTHORIZATION, moderator.bearer())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

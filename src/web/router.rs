//! Router configuration for Web API.

use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_post, create_topic, delete_post, delete_topic, get_topic, list_posts_by_topic,
    list_reported, list_topics, list_topics_by_category, login, me, moderate_post, register,
    report_post, toggle_like, toggle_lock, toggle_pin, update_post, update_topic, verify_token,
    AppState,
};
use super::middleware::{create_cors_layer, inject_auth, AuthState};

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify-token", get(verify_token))
        .route("/me", get(me));

    // Static segments are registered next to the `:id` captures they shadow.
    let topic_routes = Router::new()
        .route("/", get(list_topics).post(create_topic))
        .route("/category/:category", get(list_topics_by_category))
        .route(
            "/:id",
            get(get_topic).put(update_topic).delete(delete_topic),
        )
        .route("/:id/lock", patch(toggle_lock))
        .route("/:id/pin", patch(toggle_pin));

    let post_routes = Router::new()
        .route("/", post(create_post))
        .route("/topic/:id", get(list_posts_by_topic))
        .route("/reported", get(list_reported))
        .route("/:id", put(update_post).delete(delete_post))
        .route("/:id/like", post(toggle_like))
        .route("/:id/report", post(report_post))
        .route("/:id/moderate", patch(moderate_post));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/topics", topic_routes)
        .nest("/posts", post_routes);

    let auth_state = Arc::new(AuthState::new(
        app_state.tokens.clone(),
        app_state.db.clone(),
    ));

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = auth_state.clone();
                    inject_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

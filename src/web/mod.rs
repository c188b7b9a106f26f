//! Web API module for Agora.
//!
//! This module provides the JSON REST surface under `/api`: identity,
//! topics, threaded posts and the moderation queue.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_health_router, create_router};
pub use server::WebServer;

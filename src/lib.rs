//! Agora - a discussion forum backend
//!
//! Topics, threaded posts, likes, reports and a moderation queue served as a
//! JSON REST API.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod logging;
pub mod moderation;
pub mod pagination;
pub mod post;
pub mod topic;
pub mod web;

pub use auth::{
    authenticate, authenticate_optional, can_mutate, hash_password, login, register,
    require_role, require_staff, verify_password, AuthError, LoginError, PasswordError,
    Principal, RegistrationError, RegistrationRequest, TokenService,
};
pub use config::Config;
pub use db::{Database, NewUser, Role, SharedDatabase, User, UserRepository, UserUpdate};
pub use error::{AgoraError, Result};
pub use filter::{classify, classify_first, Classification};
pub use moderation::{ModerationQueue, ReportedPost};
pub use pagination::{Page, PageRequest};
pub use post::{ModerationAction, NewPost, Post, PostRepository, PostService, ThreadNode};
pub use topic::{NewTopic, Topic, TopicFilter, TopicRepository, TopicService, TopicUpdate};
pub use web::{create_router, AppState, WebServer};

//! Post module for Agora.
//!
//! This module provides posts and threaded replies:
//! - Post creation with lock checks, reply levels and content filtering
//! - Reply tree assembly for topic listings
//! - Likes, reports and moderator decisions

mod repository;
mod service;
mod thread;
mod types;

pub use repository::PostRepository;
pub use service::{PostService, MAX_CONTENT_LENGTH, MAX_REASON_LENGTH};
pub use thread::{build_tree, ThreadNode};
pub use types::{LikeOutcome, ModerationAction, NewPost, Post, Report};

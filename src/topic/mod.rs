//! Topic module for Agora.
//!
//! This module provides discussion topics:
//! - Creation with content filtering and a default category
//! - Listing with category filter, text search and pinned-first ordering
//! - Edits and soft deletes by the author or moderation staff
//! - Lock and pin toggles for moderators

mod repository;
mod service;
mod types;

pub use repository::TopicRepository;
pub use service::{TopicService, MAX_CATEGORY_LENGTH, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH};
pub use types::{
    normalize_tags, NewTopic, Topic, TopicFilter, TopicRef, TopicUpdate, ALL_CATEGORIES,
};

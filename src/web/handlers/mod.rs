//! API handlers for the REST surface.

pub mod auth;
pub mod post;
pub mod topic;

use std::collections::HashMap;

use crate::auth::TokenService;
use crate::config::ForumConfig;
use crate::db::{SharedDatabase, UserRef, UserRepository};
use crate::web::error::ApiError;

pub use auth::*;
pub use post::*;
pub use topic::*;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: SharedDatabase,
    /// Token issuer.
    pub tokens: TokenService,
    /// Listing and defaults configuration.
    pub forum: ForumConfig,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: SharedDatabase, tokens: TokenService, forum: ForumConfig) -> Self {
        Self { db, tokens, forum }
    }

    /// Resolve author references for the given user IDs.
    pub(crate) async fn user_refs(
        &self,
        ids: impl IntoIterator<Item = i64>,
    ) -> Result<HashMap<i64, UserRef>, ApiError> {
        let mut ids: Vec<i64> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(UserRepository::new(self.db.pool()).get_refs(&ids).await?)
    }
}

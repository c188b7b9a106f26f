//! Deriving the acting principal from a bearer credential.

use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, warn};

use super::token::TokenService;
use crate::db::{Role, User, UserRef, UserRepository};
use crate::AgoraError;

/// The authenticated identity behind a request: the user's profile without
/// secret fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Role tier.
    pub role: Role,
    /// Number of topics and posts created.
    pub post_count: i64,
    /// Reputation score.
    pub reputation: i64,
    /// Self-introduction.
    pub bio: String,
    /// Account creation timestamp.
    pub created_at: String,
}

impl Principal {
    /// Whether the principal is a moderator or admin.
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// Reference form used when stamping authorship.
    pub fn to_ref(&self) -> UserRef {
        UserRef {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
        }
    }
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            post_count: user.post_count,
            reputation: user.reputation,
            bio: user.bio,
            created_at: user.created_at,
        }
    }
}

/// Authentication failures.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No credential supplied.
    #[error("Authentication required")]
    Unauthenticated,

    /// Credential malformed, expired or wrongly signed.
    #[error("Invalid or expired token")]
    InvalidCredential,

    /// The credential names a user that no longer exists.
    #[error("User not found")]
    PrincipalNotFound,

    /// Identity lookup failed.
    #[error("database error: {0}")]
    Database(String),
}

impl From<AuthError> for AgoraError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Database(msg) => AgoraError::Database(msg),
            other => AgoraError::Unauthenticated(other.to_string()),
        }
    }
}

/// Resolve a credential into a principal.
///
/// The user is re-read on every call, so role changes and deletions take
/// effect immediately regardless of what the token says.
pub async fn authenticate(
    tokens: &TokenService,
    pool: &SqlitePool,
    credential: Option<&str>,
) -> Result<Principal, AuthError> {
    let token = credential
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::Unauthenticated)?;

    let claims = tokens
        .verify(token)
        .map_err(|_| AuthError::InvalidCredential)?;

    let user = UserRepository::new(pool)
        .get_by_id(claims.sub)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?
        .ok_or(AuthError::PrincipalNotFound)?;

    Ok(Principal::from(user))
}

/// Like [`authenticate`], but any failure yields no principal.
pub async fn authenticate_optional(
    tokens: &TokenService,
    pool: &SqlitePool,
    credential: Option<&str>,
) -> Option<Principal> {
    match authenticate(tokens, pool, credential).await {
        Ok(principal) => Some(principal),
        Err(AuthError::Database(e)) => {
            warn!(error = %e, "Identity lookup failed; continuing anonymously");
            None
        }
        Err(e) => {
            if credential.is_some() {
                debug!(reason = %e, "Ignoring unusable credential");
            }
            None
        }
    }
}

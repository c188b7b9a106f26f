//! Bearer authentication extractors.
//!
//! The [`inject_auth`] middleware puts an [`AuthState`] into the request
//! extensions; [`AuthUser`] and [`OptionalAuthUser`] read it and resolve the
//! `Authorization` header into a [`Principal`].

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{authenticate, authenticate_optional, Principal, TokenService};
use crate::db::SharedDatabase;
use crate::web::error::ApiError;

/// Everything the extractors need to resolve a credential.
#[derive(Clone)]
pub struct AuthState {
    /// Token verifier.
    pub tokens: TokenService,
    /// User store.
    pub db: SharedDatabase,
}

impl AuthState {
    /// Create a new auth state.
    pub fn new(tokens: TokenService, db: SharedDatabase) -> Self {
        Self { tokens, db }
    }
}

/// Pull the credential out of the `Authorization` header.
///
/// `Bearer <token>` yields the token; any other value is passed through
/// whole so that it fails verification instead of reading as "absent".
fn credential(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(AUTHORIZATION)?;
    let value = header.to_str().unwrap_or("");
    let token = value.strip_prefix("Bearer ").unwrap_or(value);
    Some(token.to_string())
}

fn auth_state(parts: &Parts) -> Result<Arc<AuthState>, ApiError> {
    parts.extensions.get::<Arc<AuthState>>().cloned().ok_or_else(|| {
        tracing::error!("Auth state missing from request extensions");
        ApiError::internal()
    })
}

/// Extractor for authenticated users.
///
/// Rejects the request with 401 when the credential is missing, invalid or
/// names a user that no longer exists.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let state = auth_state(parts)?;
            let token = credential(parts);
            let principal = authenticate(&state.tokens, state.db.pool(), token.as_deref()).await?;
            Ok(AuthUser(principal))
        })
    }
}

/// Optional authentication extractor.
///
/// Never rejects: an absent or unusable credential yields `None`.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<Principal>);

impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let Some(state) = parts.extensions.get::<Arc<AuthState>>().cloned() else {
                return Ok(OptionalAuthUser(None));
            };
            let token = credential(parts);
            let principal =
                authenticate_optional(&state.tokens, state.db.pool(), token.as_deref()).await;
            Ok(OptionalAuthUser(principal))
        })
    }
}

/// Middleware function to inject the auth state into request extensions.
pub async fn inject_auth(
    auth_state: Arc<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(auth_state);
    next.run(request).await
}

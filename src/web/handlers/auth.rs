//! Authentication handlers.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use super::AppState;
use crate::auth::{self as identity, Principal, RegistrationRequest};
use crate::db::{User, UserRepository};
use crate::web::dto::{
    AuthResponse, LoginRequest, RegisterRequest, UserResponse, ValidatedJson, VerifyResponse,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

fn issue_token(state: &AppState, user: &User) -> Result<String, ApiError> {
    state.tokens.issue(user).map_err(|e| {
        tracing::error!(error = %e, user_id = user.id, "Failed to issue token");
        ApiError::internal()
    })
}

/// POST /api/auth/register - Create an account and sign in.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let repo = UserRepository::new(state.db.pool());
    let user = identity::register(
        &repo,
        RegistrationRequest::new(req.username, req.email, req.password),
    )
    .await?;

    let token = issue_token(&state, &user)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "User registered successfully".to_string(),
            token,
            user: Principal::from(user),
        }),
    ))
}

/// POST /api/auth/login - Exchange email and password for a token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let repo = UserRepository::new(state.db.pool());
    let user = identity::login(&repo, &req.email, &req.password).await?;

    let token = issue_token(&state, &user)?;

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        user: Principal::from(user),
    }))
}

/// GET /api/auth/verify-token - Check that the bearer token is usable.
pub async fn verify_token(AuthUser(principal): AuthUser) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        success: true,
        valid: true,
        user: principal,
    })
}

/// GET /api/auth/me - Current user's profile.
pub async fn me(AuthUser(principal): AuthUser) -> Json<UserResponse> {
    Json(UserResponse {
        success: true,
        user: principal,
    })
}

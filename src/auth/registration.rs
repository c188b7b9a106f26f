//! Account registration and password login.

use thiserror::Error;
use tracing::info;

use super::password::{hash_password, verify_password, PasswordError};
use crate::db::{NewUser, Role, User, UserRepository};

/// Minimum username length.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = 30;

/// Maximum email length.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Registration-specific errors.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// A field failed validation.
    #[error("{0}")]
    Validation(String),

    /// Username or email already registered.
    #[error("User already exists")]
    UserExists,

    /// Password rejected or hashing failed.
    #[error("{0}")]
    Password(#[from] PasswordError),

    /// Database error.
    #[error("database error: {0}")]
    Database(String),
}

/// Login errors.
#[derive(Error, Debug)]
pub enum LoginError {
    /// Unknown email or wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Database error.
    #[error("database error: {0}")]
    Database(String),
}

/// Registration request data.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

impl RegistrationRequest {
    /// Create a new registration request. Username and email are trimmed.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into().trim().to_string(),
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    fn validate(&self) -> Result<(), RegistrationError> {
        let len = self.username.chars().count();
        if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
            return Err(RegistrationError::Validation(format!(
                "Username must be {MIN_USERNAME_LENGTH}-{MAX_USERNAME_LENGTH} characters"
            )));
        }
        if self.username.chars().any(char::is_control) {
            return Err(RegistrationError::Validation(
                "Username must not contain control characters".to_string(),
            ));
        }

        let email_ok = self.email.len() <= MAX_EMAIL_LENGTH
            && !self.email.chars().any(char::is_whitespace)
            && matches!(self.email.split_once('@'), Some((local, domain)) if !local.is_empty() && !domain.is_empty());
        if !email_ok {
            return Err(RegistrationError::Validation(
                "Please provide a valid email address".to_string(),
            ));
        }

        Ok(())
    }
}

/// Register a new user with the default role.
pub async fn register(
    repo: &UserRepository<'_>,
    request: RegistrationRequest,
) -> Result<User, RegistrationError> {
    register_with_role(repo, request, Role::User).await
}

/// Register a new user with a specific role.
///
/// Used to bootstrap moderator and admin accounts.
pub async fn register_with_role(
    repo: &UserRepository<'_>,
    request: RegistrationRequest,
    role: Role,
) -> Result<User, RegistrationError> {
    request.validate()?;

    if repo
        .exists(&request.username, &request.email)
        .await
        .map_err(|e| RegistrationError::Database(e.to_string()))?
    {
        return Err(RegistrationError::UserExists);
    }

    let password_hash = hash_password(&request.password)?;

    let new_user =
        NewUser::new(&request.username, &request.email, password_hash).with_role(role);
    let user = repo.create(&new_user).await.map_err(|e| {
        // Lost a race with a concurrent registration for the same name/email.
        if e.to_string().contains("UNIQUE constraint failed") {
            RegistrationError::UserExists
        } else {
            RegistrationError::Database(e.to_string())
        }
    })?;

    info!(
        username = %user.username,
        user_id = user.id,
        role = %user.role,
        "New user registered"
    );

    Ok(user)
}

/// Check an email/password pair and return the matching user.
pub async fn login(
    repo: &UserRepository<'_>,
    email: &str,
    password: &str,
) -> Result<User, LoginError> {
    let user = repo
        .get_by_email(email.trim())
        .await
        .map_err(|e| LoginError::Database(e.to_string()))?
        .ok_or(LoginError::InvalidCredentials)?;

    verify_password(password, &user.password).map_err(|_| LoginError::InvalidCredentials)?;

    info!(user_id = user.id, "User logged in");
    Ok(user)
}

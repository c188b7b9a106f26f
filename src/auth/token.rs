//! Bearer token issuance and verification (HS256 JWT).

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::User;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: i64,
    /// Username at issue time.
    pub username: String,
    /// Role at issue time. Informational only; the stored role is authoritative.
    pub role: String,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
    /// JWT ID (unique identifier).
    pub jti: String,
}

/// Token errors.
#[derive(Error, Debug)]
pub enum TokenError {
    /// Signing failed.
    #[error("failed to encode token: {0}")]
    Encode(String),

    /// Malformed, expired or wrongly signed token.
    #[error("invalid or expired token")]
    Invalid,
}

/// Issues and verifies signed access tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry_secs: u64,
}

impl TokenService {
    /// Create a token service from a shared secret.
    pub fn new(secret: &str, expiry_secs: u64) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry_secs,
        }
    }

    /// Token lifetime in seconds.
    pub fn expiry_secs(&self) -> u64 {
        self.expiry_secs
    }

    /// Issue a token for the given user.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role.as_str().to_string(),
            iat: now,
            exp: now + self.expiry_secs,
            jti: uuid::Uuid::new_v4().to_string(),
        };
        self.encode(&claims)
    }

    /// Sign arbitrary claims.
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verify a token's signature and expiry, returning its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                TokenError::Invalid
            })
    }
}

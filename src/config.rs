//! Configuration module for Agora.

use serde::Deserialize;
use std::path::Path;

use crate::{AgoraError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Maximum pooled connections.
    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/agora.db".to_string()
}

fn default_db_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_db_max_connections(),
        }
    }
}

/// Token issuance configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign tokens (must be set).
    #[serde(default)]
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,
}

fn default_token_expiry() -> u64 {
    7 * 24 * 60 * 60 // 7 days
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_expiry_secs: default_token_expiry(),
        }
    }
}

/// Forum behaviour configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ForumConfig {
    /// Default page size for topic listings.
    #[serde(default = "default_topics_page_size")]
    pub topics_page_size: u32,
    /// Default page size for post listings.
    #[serde(default = "default_posts_page_size")]
    pub posts_page_size: u32,
    /// Default page size for the moderation queue.
    #[serde(default = "default_reported_page_size")]
    pub reported_page_size: u32,
    /// Upper bound for any requested page size.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    /// Category assigned to topics created without one.
    #[serde(default = "default_category")]
    pub default_category: String,
}

fn default_topics_page_size() -> u32 {
    10
}

fn default_posts_page_size() -> u32 {
    20
}

fn default_reported_page_size() -> u32 {
    20
}

fn default_max_page_size() -> u32 {
    100
}

fn default_category() -> String {
    "General".to_string()
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            topics_page_size: default_topics_page_size(),
            posts_page_size: default_posts_page_size(),
            reported_page_size: default_reported_page_size(),
            max_page_size: default_max_page_size(),
            default_category: default_category(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/agora.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Token configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Forum behaviour.
    #[serde(default)]
    pub forum: ForumConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(AgoraError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| AgoraError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `AGORA_JWT_SECRET`: token signing secret
    /// - `AGORA_DATABASE_PATH`: SQLite database file
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(jwt_secret) = std::env::var("AGORA_JWT_SECRET") {
            if !jwt_secret.is_empty() {
                self.auth.jwt_secret = jwt_secret;
            }
        }
        if let Ok(path) = std::env::var("AGORA_DATABASE_PATH") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(AgoraError::Config(
                "jwt_secret is not set. \
                 Set it in config.toml or via AGORA_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }

        let forum = &self.forum;
        for (name, size) in [
            ("topics_page_size", forum.topics_page_size),
            ("posts_page_size", forum.posts_page_size),
            ("reported_page_size", forum.reported_page_size),
        ] {
            if size == 0 {
                return Err(AgoraError::Config(format!("{name} must be positive")));
            }
            if size > forum.max_page_size {
                return Err(AgoraError::Config(format!(
                    "{name} ({size}) exceeds max_page_size ({})",
                    forum.max_page_size
                )));
            }
        }

        Ok(())
    }
}

//! Error types for Agora.

use thiserror::Error;

/// Common error type for Agora.
#[derive(Error, Debug)]
pub enum AgoraError {
    /// Database error.
    ///
    /// Wraps any failure reported by the storage layer. Errors from sqlx are
    /// converted automatically.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid credential.
    #[error("authentication error: {0}")]
    Unauthenticated(String),

    /// Authenticated but not permitted.
    #[error("permission denied: {0}")]
    Forbidden(String),

    /// Malformed or missing input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Entity absent or soft-deleted.
    #[error("{0} not found")]
    NotFound(String),

    /// The principal already reported this post.
    #[error("You have already reported this post")]
    DuplicateReport,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for AgoraError {
    fn from(e: sqlx::Error) -> Self {
        AgoraError::Database(e.to_string())
    }
}

/// Result type alias for Agora operations.
pub type Result<T> = std::result::Result<T, AgoraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_display() {
        let err = AgoraError::Unauthenticated("token expired".to_string());
        assert_eq!(err.to_string(), "authentication error: token expired");
    }

    #[test]
    fn test_forbidden_display() {
        let err = AgoraError::Forbidden("moderator access required".to_string());
        assert_eq!(err.to_string(), "permission denied: moderator access required");
    }

    #[test]
    fn test_validation_display() {
        let err = AgoraError::Validation("title is required".to_string());
        assert_eq!(err.to_string(), "validation error: title is required");
    }

    #[test]
    fn test_not_found_display() {
        let err = AgoraError::NotFound("Topic".to_string());
        assert_eq!(err.to_string(), "Topic not found");
    }

    #[test]
    fn test_duplicate_report_display() {
        assert_eq!(
            AgoraError::DuplicateReport.to_string(),
            "You have already reported this post"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AgoraError = io_err.into();
        assert!(matches!(err, AgoraError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: AgoraError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AgoraError::Database(_)));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(AgoraError::Validation("test".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}

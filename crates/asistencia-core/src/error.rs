use thiserror::Error;

/// Application-wide error types for the attendance backend.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request payload failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Write conflicts with existing data (e.g. duplicate username).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true if this error is the caller's fault rather than the
    /// server's (maps to a 4xx status).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::NotFound(_)
                | AppError::Conflict(_)
                | AppError::Unauthorized(_)
                | AppError::SerializationError(_)
        )
    }
}

use thiserror::Error;

/// Comm module initialization errors
#[derive(Debug, Error)]
pub enum CommInitError {
    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind TCP listener: {0}")]
    BindFailed(String),
}

/// Comm module runtime errors
#[derive(Debug, Error)]
pub enum CommError {
    #[error("HTTP server error: {0}")]
    ServeError(#[from] std::io::Error),
}

/// Result type for comm operations
#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, CommError>;

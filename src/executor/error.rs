// Error types for Executor module
#![allow(dead_code)]

use thiserror::Error;

/// Executor error types
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("No strategy registered for language '{0}'")]
    UnknownLanguage(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to prepare scratch file {0}: {1}")]
    ScratchFailed(String, String),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ExecutorError>;

// Client module - caller side of the execution engine
#![allow(dead_code)]

pub mod grader;
pub mod error;

pub use grader::GraderClient;
pub use error::{ClientError, ClientInitError};

use crate::executor::config::parse_env_var;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Engine base URL
    pub endpoint: String,
    /// Request timeout in seconds; must exceed compile + run deadlines
    pub request_timeout_secs: u64,
    /// Token sent to unlock the transformed source
    pub debug_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:9700".to_string(),
            request_timeout_secs: 30,
            debug_token: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let endpoint = std::env::var("CODEGRADE_ENDPOINT").unwrap_or(defaults.endpoint);

        let request_timeout_secs =
            parse_env_var("CODEGRADE_CLIENT_TIMEOUT_SECS", defaults.request_timeout_secs);

        let debug_token = std::env::var("CODEGRADE_DEBUG_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());

        Self {
            endpoint,
            request_timeout_secs,
            debug_token,
        }
    }
}

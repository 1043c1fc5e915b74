use crate::comm::error::CommInitError;
use crate::executor::config::parse_env_var;
use std::net::SocketAddr;

/// Comm module configuration
#[derive(Debug, Clone)]
pub struct CommConfig {
    /// Listen address (default: 0.0.0.0)
    pub listen_addr: String,
    /// Listen port (default: 9700)
    pub listen_port: u16,
    /// Maximum request body size in bytes (default: 65536)
    pub max_payload_bytes: usize,
    /// Executions allowed to run at once (default: 4)
    pub max_concurrent_executions: usize,
    /// Token that unlocks privileged debug output (default: none)
    pub debug_token: Option<String>,
}

impl Default for CommConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 9700,
            max_payload_bytes: 65536,
            max_concurrent_executions: 4,
            debug_token: None,
        }
    }
}

impl CommConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        config.listen_addr = parse_env_var("CODEGRADE_LISTEN_ADDR", config.listen_addr);
        config.listen_port = parse_env_var("CODEGRADE_LISTEN_PORT", config.listen_port);
        config.max_payload_bytes =
            parse_env_var("CODEGRADE_MAX_PAYLOAD_BYTES", config.max_payload_bytes);
        config.max_concurrent_executions = parse_env_var(
            "CODEGRADE_MAX_CONCURRENT",
            config.max_concurrent_executions,
        )
        .max(1);
        config.debug_token = std::env::var("CODEGRADE_DEBUG_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());

        config
    }

    /// Returns the socket address to bind to
    pub fn bind_addr(&self) -> Result<SocketAddr, CommInitError> {
        let addr = format!("{}:{}", self.listen_addr, self.listen_port);
        addr.parse()
            .map_err(|_| CommInitError::InvalidAddress(addr))
    }
}

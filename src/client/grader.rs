// Grader client - HTTP communication with the execution engine

use super::{ClientConfig, ClientError, ClientInitError};
use crate::comm::server::DEBUG_TOKEN_HEADER;
use crate::comm::types::{InvokeRequest, InvokeResponse};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Client for the engine's `/invoke` and `/healthz` endpoints.
/// Failed calls are not retried: a resend would run the submission again.
#[derive(Clone)]
pub struct GraderClient {
    config: ClientConfig,
    client: Client,
}

impl GraderClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientInitError> {
        if !config.endpoint.starts_with("http://") && !config.endpoint.starts_with("https://") {
            return Err(ClientInitError::ConfigInvalid(format!(
                "endpoint must be an http(s) URL: {}",
                config.endpoint
            )));
        }

        debug!(
            endpoint = %config.endpoint,
            timeout_secs = config.request_timeout_secs,
            "initializing grader client"
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    /// Submit code to the engine
    pub async fn invoke(&self, request: &InvokeRequest) -> Result<InvokeResponse, ClientError> {
        let start = Instant::now();
        let url = self.url("/invoke");

        let mut builder = self.client.post(&url).json(request);
        if let Some(token) = &self.config.debug_token {
            builder = builder.header(DEBUG_TOKEN_HEADER, token);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), url = %url, "engine returned an error status");
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let response: InvokeResponse = serde_json::from_str(&body)?;

        info!(
            returncode = response.returncode,
            success = ?response.success,
            latency_ms = start.elapsed().as_millis() as u64,
            "invoke completed"
        );
        Ok(response)
    }

    /// True when the engine answers its liveness probe
    pub async fn health(&self) -> Result<bool, ClientError> {
        let response = self.client.get(self.url("/healthz")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        let body: serde_json::Value = response.json().await?;
        Ok(body["ok"] == serde_json::Value::Bool(true))
    }
}

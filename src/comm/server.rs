use crate::comm::config::CommConfig;
use crate::comm::error::{CommError, CommInitError};
use crate::comm::types::{InvokeRequest, InvokeResponse};
use crate::executor::runner::INTERNAL_ERROR_MESSAGE;
use crate::executor::{Access, Executor};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::future::Future;
use std::net::SocketAddr;
use std::result::Result as StdResult;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};

/// Header carrying the debug token of a privileged caller
pub const DEBUG_TOKEN_HEADER: &str = "x-debug-token";

/// Shared state of the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    executor: Arc<Executor>,
    /// Caps concurrent executions; each may spawn two processes
    permits: Arc<Semaphore>,
    debug_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(executor: Arc<Executor>, config: &CommConfig) -> Self {
        Self {
            executor,
            permits: Arc::new(Semaphore::new(config.max_concurrent_executions.max(1))),
            debug_token: config.debug_token.as_deref().map(Arc::from),
        }
    }

    /// Privileged only when the caller presents the configured token
    fn access_for(&self, headers: &HeaderMap) -> Access {
        let presented = headers
            .get(DEBUG_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());

        match (self.debug_token.as_deref(), presented) {
            (Some(expected), Some(presented)) if expected == presented => Access::Privileged,
            _ => Access::Submitter,
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState, max_payload_bytes: usize) -> Router {
    Router::new()
        .route("/invoke", post(invoke))
        .route("/healthz", get(health))
        .layer(DefaultBodyLimit::max(max_payload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

async fn invoke(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<InvokeResponse> {
    let start = Instant::now();

    let payload: InvokeRequest = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, body_len = body.len(), "rejected malformed invoke body");
            return Json(InvokeResponse::error(format!("Invalid JSON body: {}", e)));
        }
    };

    let request = match payload.into_execution_request() {
        Ok(request) => request,
        Err(message) => {
            debug!(reason = message, "rejected invoke request");
            return Json(InvokeResponse::error(message));
        }
    };

    let access = state.access_for(&headers);
    info!(
        language = %request.language,
        code_len = request.source_code.len(),
        graded = request.test.is_some(),
        privileged = access == Access::Privileged,
        "invoke request received"
    );

    let Ok(permit) = state.permits.clone().acquire_owned().await else {
        error!("execution semaphore closed");
        return Json(InvokeResponse::error(INTERNAL_ERROR_MESSAGE));
    };

    // The task owns the permit: it outlives this handler when the caller disconnects.
    // A panic inside the engine must still produce a renderable response.
    let executor = Arc::clone(&state.executor);
    let task = tokio::spawn(async move {
        let _permit = permit;
        executor.execute(request, access).await
    });
    let response = match task.await {
        Ok(result) => InvokeResponse::from(result),
        Err(e) => {
            error!(error = %e, "execution task failed");
            InvokeResponse::error(INTERNAL_ERROR_MESSAGE)
        }
    };

    debug!(
        returncode = response.returncode,
        latency_ms = start.elapsed().as_millis() as u64,
        "invoke response sent"
    );
    Json(response)
}

/// Comm server - serves the execution engine over HTTP
pub struct Comm {
    listener: TcpListener,
    router: Router,
}

impl Comm {
    /// Bind the listener and build the router
    pub async fn new(
        config: CommConfig,
        executor: Arc<Executor>,
    ) -> StdResult<Comm, CommInitError> {
        let addr = config.bind_addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| CommInitError::BindFailed(e.to_string()))?;

        info!(
            addr = %listener.local_addr().unwrap_or(addr),
            max_payload_bytes = config.max_payload_bytes,
            max_concurrent_executions = config.max_concurrent_executions,
            debug_enabled = config.debug_token.is_some(),
            "comm listening"
        );

        let state = AppState::new(executor, &config);
        let router = build_router(state, config.max_payload_bytes);

        Ok(Self { listener, router })
    }

    /// Get local socket address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until `shutdown` resolves
    pub async fn run<F>(self, shutdown: F) -> StdResult<(), CommError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("comm stopped");
        Ok(())
    }
}

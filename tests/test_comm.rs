// Integration tests for Comm module
// This file should be run with cargo test --test test_comm

#[path = "../src/client/mod.rs"]
mod client;
#[path = "../src/comm/mod.rs"]
mod comm;
#[path = "../src/executor/mod.rs"]
mod executor;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use client::{ClientConfig, ClientError, GraderClient};
use comm::server::DEBUG_TOKEN_HEADER;
use comm::{AppState, Comm, CommConfig, InvokeRequest, InvokeResponse, build_router};
use executor::{Executor, ExecutorConfig, ProcessOutput, Sandbox};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_test::assert_ok;
use tower::ServiceExt;

fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    });
}

const TOKEN: &str = "let-me-see";

/// Answers every run with a fixed stdout and counts spawns
struct EchoSandbox {
    stdout: String,
    spawns: AtomicUsize,
}

#[async_trait]
impl Sandbox for EchoSandbox {
    async fn run(&self, _command: &[String], _timeout_secs: u64) -> ProcessOutput {
        self.spawns.fetch_add(1, Ordering::SeqCst);
        ProcessOutput {
            stdout: self.stdout.clone(),
            ..Default::default()
        }
    }
}

fn echo_sandbox(stdout: &str) -> Arc<EchoSandbox> {
    Arc::new(EchoSandbox {
        stdout: stdout.to_string(),
        spawns: AtomicUsize::new(0),
    })
}

/// Holds every run for a while and records the peak number of runs in flight
struct SlowSandbox {
    delay: Duration,
    active: AtomicUsize,
    peak: AtomicUsize,
    finished: AtomicUsize,
}

impl SlowSandbox {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Sandbox for SlowSandbox {
    async fn run(&self, _command: &[String], _timeout_secs: u64) -> ProcessOutput {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.finished.fetch_add(1, Ordering::SeqCst);
        ProcessOutput::default()
    }
}

fn test_router(sandbox: Arc<EchoSandbox>) -> Router {
    capped_router(sandbox, 4)
}

fn capped_router(sandbox: Arc<dyn Sandbox>, max_concurrent_executions: usize) -> Router {
    let executor = Arc::new(Executor::with_sandbox(ExecutorConfig::default(), sandbox));
    let config = CommConfig {
        debug_token: Some(TOKEN.to_string()),
        max_payload_bytes: 4096,
        max_concurrent_executions,
        ..Default::default()
    };
    let state = AppState::new(executor, &config);
    build_router(state, config.max_payload_bytes)
}

async fn post_invoke(router: Router, body: impl Into<Body>, token: Option<&str>) -> (StatusCode, InvokeResponse) {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/invoke")
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header(DEBUG_TOKEN_HEADER, token);
    }

    let response = router
        .oneshot(builder.body(body.into()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn json_body(request: &InvokeRequest) -> String {
    serde_json::to_string(request).unwrap()
}

fn has_python() -> bool {
    std::process::Command::new("python3")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Start a live server on an ephemeral port
async fn spawn_server(debug_token: Option<&str>) -> (String, oneshot::Sender<()>) {
    let config = CommConfig {
        listen_addr: "127.0.0.1".to_string(),
        listen_port: 0,
        debug_token: debug_token.map(str::to_string),
        ..Default::default()
    };
    let comm = Comm::new(config, Arc::new(Executor::default()))
        .await
        .expect("server should bind");
    let addr = comm.local_addr().unwrap();

    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let _ = comm
            .run(async {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{}", addr), tx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_healthz() {
        init_tracing();

        let response = test_router(echo_sandbox(""))
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_malformed_json_is_reported_in_body() {
        init_tracing();

        let (status, response) = post_invoke(test_router(echo_sandbox("")), "{not json", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.returncode, -1);
        assert!(response.error_message.unwrap().starts_with("Invalid JSON body"));
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        init_tracing();

        let sandbox = echo_sandbox("");
        let (_, response) = post_invoke(test_router(sandbox.clone()), r#"{"code":"print(1)"}"#, None).await;

        assert_eq!(
            response.error_message.as_deref(),
            Some("Code and language must be provided.")
        );
        assert_eq!(response.success, None);
        assert_eq!(sandbox.spawns.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unsupported_language_rejected() {
        init_tracing();

        let body = json_body(&InvokeRequest::new("puts 1", "ruby"));
        let (_, response) = post_invoke(test_router(echo_sandbox("")), body, None).await;

        assert_eq!(response.error_message.as_deref(), Some("Unsupported language."));
        assert_eq!(response.returncode, -1);
    }

    #[tokio::test]
    async fn test_blocked_submission_response() {
        init_tracing();

        let sandbox = echo_sandbox("");
        let body = json_body(&InvokeRequest::new("import subprocess", "python").with_test("", ""));
        let (status, response) = post_invoke(test_router(sandbox.clone()), body, Some(TOKEN)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.returncode, -1);
        assert!(response.stderr.starts_with("Forbidden keyword(s) detected: "));
        assert!(response.stderr.contains(r"\bimport\s+subprocess\b"));
        assert_eq!(
            response.error_message.as_deref(),
            Some("Security policy violation. Please remove these keywords and try again.")
        );
        assert!(response.transformed_source.is_none());
        assert_eq!(sandbox.spawns.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_graded_run_over_http() {
        init_tracing();

        let body = json_body(&InvokeRequest::new("x = 5", "python").with_test("print(x)", "5"));
        let (_, response) = post_invoke(test_router(echo_sandbox("5\n")), body, None).await;

        assert_eq!(response.success, Some(true));
        assert_eq!(response.returncode, 0);
        assert_eq!(response.stdout, "5\n");
        assert!(response.timeout.is_none());
    }

    #[tokio::test]
    async fn test_ungraded_success_is_null_on_the_wire() {
        init_tracing();

        let router = test_router(echo_sandbox("2\n"));
        let request = Request::builder()
            .method("POST")
            .uri("/invoke")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"code":"print(1+1)","language":"python"}"#))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["success"], serde_json::Value::Null);
        assert_eq!(body["stdout"], "2\n");
        assert!(body.get("transformedSource").is_none());
    }

    #[tokio::test]
    async fn test_debug_token_unlocks_transformed_source() {
        init_tracing();

        let body = json_body(&InvokeRequest::new("x = 5", "python").with_test("print(x)", "5"));

        let (_, response) = post_invoke(test_router(echo_sandbox("5")), body.clone(), None).await;
        assert!(response.transformed_source.is_none());

        let (_, response) = post_invoke(test_router(echo_sandbox("5")), body.clone(), Some("wrong")).await;
        assert!(response.transformed_source.is_none());

        let (_, response) = post_invoke(test_router(echo_sandbox("5")), body, Some(TOKEN)).await;
        assert_eq!(response.transformed_source.as_deref(), Some("x = 5\nprint(x)"));
    }

    #[tokio::test]
    async fn test_concurrency_cap_holds_for_parallel_requests() {
        init_tracing();

        let sandbox = SlowSandbox::new(Duration::from_millis(200));
        let router = capped_router(sandbox.clone(), 1);
        let body = json_body(&InvokeRequest::new("print(1)", "python"));

        let requests = (0..3).map(|_| post_invoke(router.clone(), body.clone(), None));
        let responses = futures::future::join_all(requests).await;

        for (status, response) in responses {
            assert_eq!(status, StatusCode::OK);
            assert_eq!(response.returncode, 0);
        }
        assert_eq!(sandbox.finished.load(Ordering::SeqCst), 3);
        assert_eq!(sandbox.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrency_cap_survives_caller_disconnect() {
        init_tracing();

        let sandbox = SlowSandbox::new(Duration::from_millis(800));
        let router = capped_router(sandbox.clone(), 1);
        let body = json_body(&InvokeRequest::new("print(1)", "python"));

        // The caller gives up while its execution is still running
        let abandoned = tokio::time::timeout(
            Duration::from_millis(100),
            post_invoke(router.clone(), body.clone(), None),
        )
        .await;
        assert!(abandoned.is_err());

        let (status, _) = post_invoke(router, body, None).await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(sandbox.finished.load(Ordering::SeqCst), 2);
        assert_eq!(
            sandbox.peak.load(Ordering::SeqCst),
            1,
            "an abandoned request must keep its slot until its run ends"
        );
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        init_tracing();

        let sandbox = echo_sandbox("");
        let body = json_body(&InvokeRequest::new("x".repeat(8192), "python"));

        let response = test_router(sandbox.clone())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/invoke")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(sandbox.spawns.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_client_against_live_server() {
        init_tracing();
        if !has_python() {
            eprintln!("skipping: python3 not installed");
            return;
        }

        let (endpoint, shutdown) = spawn_server(Some(TOKEN)).await;
        let client = GraderClient::new(ClientConfig {
            endpoint,
            request_timeout_secs: 30,
            debug_token: Some(TOKEN.to_string()),
        })
        .unwrap();

        assert!(assert_ok!(client.health().await));

        let request = InvokeRequest::new("def add(a, b):\n    return a + b", "python")
            .with_test("print(add(2, 3))", "5");
        let response = assert_ok!(client.invoke(&request).await);

        assert_eq!(response.success, Some(true), "stderr: {}", response.stderr);
        assert_eq!(response.stdout.trim(), "5");
        assert!(response.transformed_source.unwrap().ends_with("print(add(2, 3))"));

        let _ = shutdown.send(());
    }

    #[tokio::test]
    async fn test_client_rejects_non_http_endpoint() {
        init_tracing();

        let result = GraderClient::new(ClientConfig {
            endpoint: "ftp://127.0.0.1:9700".to_string(),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_client_unreachable_endpoint() {
        init_tracing();

        // Bind then drop to get a port nothing listens on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let client = GraderClient::new(ClientConfig {
            endpoint: format!("http://127.0.0.1:{}", port),
            request_timeout_secs: 2,
            debug_token: None,
        })
        .unwrap();

        let result = client.invoke(&InvokeRequest::new("print(1)", "python")).await;
        assert!(matches!(result, Err(ClientError::NetworkError(_))));
    }
}

// Process sandbox: one OS process under a hard deadline
#![allow(dead_code)]

use crate::executor::types::ProcessOutput;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// How long to keep draining pipes after the process is gone.
/// A grandchild that inherited the pipe can otherwise hold it open forever.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

const READ_CHUNK: usize = 8192;

/// Isolation strategy for a single command
#[async_trait]
pub trait Sandbox: Send + Sync {
    /// Run `command` (program followed by arguments) for at most `timeout_secs` seconds.
    /// Never fails: spawn and wait errors are reported in the output.
    async fn run(&self, command: &[String], timeout_secs: u64) -> ProcessOutput;
}

/// Plain child process with piped output and a wall-clock deadline
#[derive(Debug, Clone)]
pub struct ProcessSandbox {
    max_output_bytes: usize,
}

impl ProcessSandbox {
    pub fn new(max_output_bytes: usize) -> Self {
        Self { max_output_bytes }
    }
}

enum Waited {
    Exited(i32),
    TimedOut,
    Failed(String),
}

/// Read a stream to EOF, keeping at most `limit` bytes
async fn read_capped<R: AsyncRead + Unpin>(mut reader: R, limit: usize) -> (Vec<u8>, bool) {
    let mut kept = Vec::new();
    let mut truncated = false;
    let mut buf = [0u8; READ_CHUNK];

    loop {
        match reader.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let room = limit.saturating_sub(kept.len());
                if n > room {
                    kept.extend_from_slice(&buf[..room]);
                    truncated = true;
                } else {
                    kept.extend_from_slice(&buf[..n]);
                }
            }
        }
    }

    (kept, truncated)
}

fn spawn_reader<R>(stream: Option<R>, limit: usize) -> JoinHandle<(Vec<u8>, bool)>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        match stream {
            Some(s) => read_capped(s, limit).await,
            None => (Vec::new(), false),
        }
    })
}

/// Kill and reap the child. Returns false when the kill failed.
async fn terminate(child: &mut Child, program: &str) -> bool {
    match child.kill().await {
        Ok(()) => true,
        Err(e) => {
            warn!(program = %program, error = %e, "failed to kill process");
            false
        }
    }
}

/// Collect a reader task, giving up after the grace period
async fn collect(mut task: JoinHandle<(Vec<u8>, bool)>) -> (String, bool) {
    match timeout(DRAIN_GRACE, &mut task).await {
        Ok(Ok((bytes, truncated))) => (String::from_utf8_lossy(&bytes).into_owned(), truncated),
        Ok(Err(e)) => {
            warn!(error = %e, "output reader task failed");
            (String::new(), false)
        }
        Err(_) => {
            warn!("output pipe still open after process exit, abandoning drain");
            task.abort();
            (String::new(), true)
        }
    }
}

#[async_trait]
impl Sandbox for ProcessSandbox {
    async fn run(&self, command: &[String], timeout_secs: u64) -> ProcessOutput {
        let start = Instant::now();

        let Some((program, args)) = command.split_first() else {
            return ProcessOutput::failed("An error occurred: empty command");
        };

        debug!(program = %program, args = ?args, timeout_secs, "spawning process");

        let mut child = match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                warn!(program = %program, error = %e, "failed to spawn process");
                return ProcessOutput::failed(format!("An error occurred: {}", e));
            }
        };

        let stdout_task = spawn_reader(child.stdout.take(), self.max_output_bytes);
        let stderr_task = spawn_reader(child.stderr.take(), self.max_output_bytes);

        let wait_result = timeout(Duration::from_secs(timeout_secs), child.wait()).await;

        let waited = match wait_result {
            Ok(Ok(status)) => Waited::Exited(status.code().unwrap_or(-1)),
            Ok(Err(e)) => {
                warn!(program = %program, error = %e, "failed to wait for process");
                terminate(&mut child, program).await;
                Waited::Failed(e.to_string())
            }
            Err(_) => {
                terminate(&mut child, program).await;
                Waited::TimedOut
            }
        };

        let (stdout, stdout_truncated) = collect(stdout_task).await;
        let (stderr, stderr_truncated) = collect(stderr_task).await;
        let truncated = stdout_truncated || stderr_truncated;
        let duration_ms = start.elapsed().as_millis() as u64;

        let output = match waited {
            Waited::Exited(exit_code) => ProcessOutput {
                stdout,
                stderr,
                exit_code,
                timed_out: false,
                truncated,
            },
            Waited::TimedOut => ProcessOutput {
                stdout,
                stderr: format!("Execution time exceeded {} seconds.\n{}", timeout_secs, stderr),
                exit_code: -1,
                timed_out: true,
                truncated,
            },
            Waited::Failed(e) => ProcessOutput {
                stdout,
                stderr: format!("An error occurred: {}", e),
                exit_code: -1,
                timed_out: false,
                truncated,
            },
        };

        info!(
            program = %program,
            duration_ms = duration_ms,
            exit_code = output.exit_code,
            timed_out = output.timed_out,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            truncated = output.truncated,
            "process finished"
        );

        output
    }
}

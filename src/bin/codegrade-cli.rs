//! codegrade CLI client
//!
//! Submits a source file to the codegrade daemon over HTTP, optionally with a
//! hidden test, and prints the captured output and verdict.

#[path = "../client/mod.rs"]
mod client;
#[path = "../comm/mod.rs"]
#[allow(dead_code)]
mod comm;
#[path = "../executor/mod.rs"]
#[allow(dead_code)]
mod executor;

use clap::{Parser, Subcommand};
use client::{ClientConfig, GraderClient};
use comm::{InvokeRequest, InvokeResponse};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// CLI arguments
#[derive(Debug, Parser)]
#[command(name = "codegrade-cli")]
#[command(about = "codegrade daemon CLI client")]
struct Args {
    /// Daemon base URL (default: $CODEGRADE_ENDPOINT or http://127.0.0.1:9700)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Request timeout in seconds (default: 30)
    #[arg(long)]
    timeout: Option<u64>,

    /// Debug token; when accepted the daemon returns the executed source
    #[arg(long)]
    debug_token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a source file, graded when --input/--expected are given
    Run {
        /// Source file (.py or .c)
        file: PathBuf,

        /// Language, inferred from the file extension when omitted
        #[arg(short, long)]
        language: Option<String>,

        /// File with the test statements to merge into the submission
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// File with the expected output
        #[arg(short = 'x', long)]
        expected: Option<PathBuf>,
    },
    /// Check that the daemon is alive
    Health,
}

fn infer_language(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()? {
        "py" => Some("python"),
        "c" | "h" => Some("c"),
        _ => None,
    }
}

fn read_optional(path: Option<&PathBuf>) -> io::Result<Option<String>> {
    path.map(std::fs::read_to_string).transpose()
}

fn print_report(response: &InvokeResponse, expected: Option<&str>) {
    println!("stdout:\n{}", response.stdout);
    println!("stderr:\n{}", response.stderr);
    if let Some(expected) = expected {
        println!("test output:\n{}", expected);
    }
    if let Some(source) = &response.transformed_source {
        println!("----------\ntest debug\n----------");
        println!("test code:\n{}", source);
    }
    if let Some(message) = &response.error_message {
        println!("[error] {}", message);
    }
    if response.timeout == Some(true) {
        println!("[timeout]");
    }
    println!("returncode: {}", response.returncode);

    let verdict = match response.success {
        Some(true) => "PASS",
        Some(false) => "FAIL",
        None if response.untestable == Some(true) => "UNGRADED (entry function not found)",
        None => "UNGRADED",
    };
    println!("verdict: {}", verdict);
}

async fn run_command(
    client: &GraderClient,
    command: Command,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Command::Health => {
            let ok = client.health().await?;
            println!("{}: {}", client.endpoint(), if ok { "ok" } else { "unhealthy" });
            Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Command::Run {
            file,
            language,
            input,
            expected,
        } => {
            let code = std::fs::read_to_string(&file)?;
            let language = match language {
                Some(language) => language,
                None => infer_language(&file)
                    .ok_or("cannot infer language from file extension, pass --language")?
                    .to_string(),
            };

            let input = read_optional(input.as_ref())?;
            let expected = read_optional(expected.as_ref())?;

            let mut request = InvokeRequest::new(code, language);
            if input.is_some() || expected.is_some() {
                request = request.with_test(
                    input.unwrap_or_default(),
                    expected.clone().unwrap_or_default(),
                );
            }

            let response = client.invoke(&request).await?;
            print_report(&response, expected.as_deref());

            Ok(match response.success {
                Some(false) => ExitCode::FAILURE,
                _ if response.error_message.is_some() => ExitCode::FAILURE,
                _ => ExitCode::SUCCESS,
            })
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = ClientConfig::from_env();
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = timeout;
    }
    if args.debug_token.is_some() {
        config.debug_token = args.debug_token;
    }

    let client = match GraderClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("[error] {}", e);
            return ExitCode::from(2);
        }
    };

    // Build runtime for async network operations
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("[error] Failed to start runtime: {}", e);
            return ExitCode::from(2);
        }
    };

    match rt.block_on(run_command(&client, args.command)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("[error] {}", e);
            ExitCode::from(2)
        }
    }
}

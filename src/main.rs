mod comm;
mod executor;

use comm::{Comm, CommConfig};
use executor::config::parse_env_var;
use executor::{Executor, ExecutorConfig};
use std::process;
use std::sync::Arc;
use tokio::signal;
use tracing::{Level, error, info};
use tracing_subscriber::fmt;

/// Tokio runtime with signal handling
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    fmt()
        .with_max_level(parse_env_var("CODEGRADE_LOG_LEVEL", Level::INFO))
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    info!("Starting codegrade daemon...");

    // Initialize config
    let executor_config = ExecutorConfig::from_env()?;
    let comm_config = CommConfig::from_env();

    info!(
        listen_port = comm_config.listen_port,
        python = %executor_config.python,
        c_compiler = %executor_config.c_compiler,
        run_timeout_secs = executor_config.constraints.run_timeout_secs,
        compile_timeout_secs = executor_config.constraints.compile_timeout_secs,
        "Configuration loaded"
    );

    // Initialize executor
    let executor = Arc::new(Executor::new(executor_config));
    info!(languages = ?executor.languages(), "Executor initialized");

    // Initialize comm
    let comm = Comm::new(comm_config, executor).await?;
    info!(addr = %comm.local_addr()?, "Comm initialized");

    let shutdown = async {
        signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
    };

    if let Err(e) = comm.run(shutdown).await {
        error!(error = %e, "Comm server error");
        process::exit(1);
    }

    info!("Goodbye!");
    Ok(())
}

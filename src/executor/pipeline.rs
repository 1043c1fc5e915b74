// Compile-then-run sequencing
#![allow(dead_code)]

use crate::executor::config::ExecutionConstraints;
use crate::executor::error::Result;
use crate::executor::language::LanguageImpl;
use crate::executor::sandbox::Sandbox;
use crate::executor::scratch::Scratch;
use crate::executor::types::{Outcome, ProcessOutput};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// What the pipeline produced for one source
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// `CompileFailed`, `Succeeded` or `RuntimeTimedOut`
    pub outcome: Outcome,
    /// Output of the last step that ran
    pub output: ProcessOutput,
    /// Compiler stderr when the compile step failed
    pub compile_error: Option<String>,
}

/// Writes the source to scratch, compiles it if the language needs it, then runs it
pub struct CompileRunPipeline {
    sandbox: Arc<dyn Sandbox>,
    constraints: ExecutionConstraints,
    scratch_dir: PathBuf,
}

impl CompileRunPipeline {
    pub fn new(
        sandbox: Arc<dyn Sandbox>,
        constraints: ExecutionConstraints,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            sandbox,
            constraints,
            scratch_dir,
        }
    }

    pub async fn run(&self, language: &dyn LanguageImpl, source: &str) -> Result<PipelineOutput> {
        // Dropped on every return path, removing source and artifact
        let scratch =
            Scratch::create(&self.scratch_dir, language.source_extension(), source).await?;

        if let Some(compile) = language.compile_command(scratch.source(), scratch.artifact()) {
            debug!(language = language.name(), "compiling");
            let compiled = self
                .sandbox
                .run(&compile, self.constraints.compile_timeout_secs)
                .await;

            if !compiled.success() {
                warn!(
                    language = language.name(),
                    exit_code = compiled.exit_code,
                    timed_out = compiled.timed_out,
                    "compile step failed, skipping run"
                );
                return Ok(PipelineOutput {
                    outcome: Outcome::CompileFailed,
                    compile_error: Some(compiled.stderr.clone()),
                    output: compiled,
                });
            }
        }

        let command = language.run_command(scratch.source(), scratch.artifact());
        debug!(language = language.name(), "running");
        let output = self
            .sandbox
            .run(&command, self.constraints.run_timeout_secs)
            .await;

        let outcome = if output.timed_out {
            Outcome::RuntimeTimedOut
        } else {
            Outcome::Succeeded
        };

        Ok(PipelineOutput {
            outcome,
            output,
            compile_error: None,
        })
    }
}

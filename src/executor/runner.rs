// Main Executor implementation
#![allow(dead_code)]

use crate::executor::c::CLanguage;
use crate::executor::config::ExecutorConfig;
use crate::executor::error::{ExecutorError, Result};
use crate::executor::grading;
use crate::executor::language::LanguageImpl;
use crate::executor::pipeline::CompileRunPipeline;
use crate::executor::python::PythonLanguage;
use crate::executor::sandbox::{ProcessSandbox, Sandbox};
use crate::executor::security;
use crate::executor::types::{Access, ExecutionRequest, ExecutionResult, Language, Outcome};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub const MISSING_INPUT_MESSAGE: &str = "Code and language must be provided.";
pub const UNSUPPORTED_LANGUAGE_MESSAGE: &str = "Unsupported language.";
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred while executing the submission.";

/// Filters, injects, runs and grades one submission per call.
/// Holds no per-request state, so one instance serves concurrent requests.
pub struct Executor {
    config: ExecutorConfig,
    languages: HashMap<Language, Arc<dyn LanguageImpl>>,
    pipeline: CompileRunPipeline,
}

impl Executor {
    /// Executor backed by plain OS processes
    pub fn new(config: ExecutorConfig) -> Self {
        let sandbox = Arc::new(ProcessSandbox::new(config.constraints.max_output_bytes));
        Self::with_sandbox(config, sandbox)
    }

    /// Executor backed by a custom isolation strategy
    pub fn with_sandbox(config: ExecutorConfig, sandbox: Arc<dyn Sandbox>) -> Self {
        debug!(
            compile_timeout_secs = config.constraints.compile_timeout_secs,
            run_timeout_secs = config.constraints.run_timeout_secs,
            max_output_bytes = config.constraints.max_output_bytes,
            scratch_dir = %config.scratch_dir.display(),
            "initializing executor"
        );

        let pipeline = CompileRunPipeline::new(
            sandbox,
            config.constraints.clone(),
            config.scratch_dir.clone(),
        );

        let mut executor = Self {
            languages: HashMap::new(),
            pipeline,
            config,
        };

        executor.register(Arc::new(PythonLanguage::new(executor.config.python.clone())));
        executor.register(Arc::new(CLanguage::new(
            executor.config.c_compiler.clone(),
            executor.config.c_flags.clone(),
        )));

        info!(language_count = executor.languages.len(), "executor initialized with languages");
        executor
    }

    /// Add or replace the strategy for a language
    pub fn register(&mut self, language: Arc<dyn LanguageImpl>) {
        self.languages.insert(language.language(), language);
    }

    /// Languages this executor accepts
    pub fn languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> = self.languages.keys().copied().collect();
        languages.sort_by_key(|l| l.as_str());
        languages
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run one request. Every failure is folded into the result.
    pub async fn execute(&self, request: ExecutionRequest, access: Access) -> ExecutionResult {
        let start = Instant::now();
        let language = request.language;

        let result = match self.try_execute(request, access).await {
            Ok(result) => result,
            Err(ExecutorError::InvalidRequest(message)) => ExecutionResult::rejected(message),
            Err(ExecutorError::UnsupportedLanguage(_) | ExecutorError::UnknownLanguage(_)) => {
                ExecutionResult::rejected(UNSUPPORTED_LANGUAGE_MESSAGE)
            }
            Err(e) => {
                error!(language = %language, error = %e, "execution failed internally");
                ExecutionResult::rejected(INTERNAL_ERROR_MESSAGE)
            }
        };

        info!(
            language = %language,
            outcome = ?result.outcome,
            exit_code = result.exit_code,
            timed_out = result.timed_out,
            success = ?result.success,
            duration_ms = start.elapsed().as_millis() as u64,
            "execution finished"
        );

        result
    }

    async fn try_execute(
        &self,
        request: ExecutionRequest,
        access: Access,
    ) -> Result<ExecutionResult> {
        if request.source_code.is_empty() {
            return Err(ExecutorError::InvalidRequest(MISSING_INPUT_MESSAGE.to_string()));
        }

        let violations = security::scan(&request.source_code);
        if !violations.is_empty() {
            return Ok(ExecutionResult::blocked(violations));
        }

        let strategy = self
            .languages
            .get(&request.language)
            .cloned()
            .ok_or_else(|| ExecutorError::UnknownLanguage(request.language.to_string()))?;

        // Without a test the code runs as submitted and is not graded
        let (source, expected, untestable) = match &request.test {
            Some(test) => {
                let injection = strategy.inject(&request.source_code, &test.input);
                if injection.injected {
                    (injection.source, Some(test.expected_output.as_str()), false)
                } else {
                    warn!(language = %request.language, "test could not be injected, run is ungraded");
                    (injection.source, None, true)
                }
            }
            None => (request.source_code.clone(), None, false),
        };

        let run = self.pipeline.run(strategy.as_ref(), &source).await?;

        let success = expected.map(|expected| match run.outcome {
            Outcome::Succeeded => grading::compare(&run.output.stdout, expected),
            _ => false,
        });

        Ok(ExecutionResult {
            outcome: run.outcome,
            stdout: run.output.stdout,
            stderr: run.output.stderr,
            exit_code: run.output.exit_code,
            timed_out: run.output.timed_out,
            compile_error: run.compile_error,
            success,
            untestable,
            violations: Vec::new(),
            error_message: None,
            transformed_source: (access == Access::Privileged).then_some(source),
        })
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(ExecutorConfig::default())
    }
}

// Data types for Executor module
#![allow(dead_code)]

use crate::executor::error::ExecutorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages the engine can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    C,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::C => "c",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ExecutorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "c" => Ok(Language::C),
            other => Err(ExecutorError::UnsupportedLanguage(other.to_string())),
        }
    }
}

/// Hidden test owned by the caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestSpec {
    /// Statements merged into the submission by the harness
    pub input: String,
    /// Output the run must end with
    pub expected_output: String,
}

/// One execution request
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub source_code: String,
    pub language: Language,
    /// `None` runs the submission ungraded
    pub test: Option<TestSpec>,
}

impl ExecutionRequest {
    pub fn new(source_code: impl Into<String>, language: Language) -> Self {
        Self {
            source_code: source_code.into(),
            language,
            test: None,
        }
    }

    pub fn with_test(mut self, input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        self.test = Some(TestSpec {
            input: input.into(),
            expected_output: expected_output.into(),
        });
        self
    }
}

/// Who is asking. Only privileged callers see the transformed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    Submitter,
    Privileged,
}

/// Terminal state of one execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Blocklist matched, nothing was spawned
    SecurityBlocked,
    /// Compiler exited non-zero, nothing was run
    CompileFailed,
    /// The program ran to completion (any exit code)
    Succeeded,
    /// The program was killed at the deadline
    RuntimeTimedOut,
    /// Invalid input or internal fault before the pipeline ran
    Rejected,
}

/// Output of a single sandboxed process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub timed_out: bool,
    /// At least one stream hit the output cap
    pub truncated: bool,
}

impl ProcessOutput {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: message.into(),
            exit_code: -1,
            timed_out: false,
            truncated: false,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }
}

/// Everything the coordinator reports back for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub outcome: Outcome,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub timed_out: bool,
    pub compile_error: Option<String>,
    /// `None` when the run was not graded
    pub success: Option<bool>,
    /// The harness could not find the entry function
    pub untestable: bool,
    pub violations: Vec<String>,
    pub error_message: Option<String>,
    /// Only filled for `Access::Privileged`
    pub transformed_source: Option<String>,
}

impl ExecutionResult {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Rejected,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: -1,
            timed_out: false,
            compile_error: None,
            success: None,
            untestable: false,
            violations: Vec::new(),
            error_message: Some(message.into()),
            transformed_source: None,
        }
    }

    pub fn blocked(violations: Vec<String>) -> Self {
        Self {
            outcome: Outcome::SecurityBlocked,
            stdout: String::new(),
            stderr: format!("Forbidden keyword(s) detected: {}", violations.join(", ")),
            exit_code: -1,
            timed_out: false,
            compile_error: None,
            success: None,
            untestable: false,
            violations,
            error_message: Some(
                "Security policy violation. Please remove these keywords and try again."
                    .to_string(),
            ),
            transformed_source: None,
        }
    }
}

// Executor module - untrusted code execution and grading
#![allow(unused_imports)]

pub mod c;
pub mod config;
pub mod error;
pub mod grading;
pub mod harness;
pub mod language;
pub mod pipeline;
pub mod python;
pub mod runner;
pub mod sandbox;
pub mod scratch;
pub mod security;
pub mod types;

pub use config::{ExecutionConstraints, ExecutorConfig};
pub use error::{ExecutorError, Result};
pub use language::LanguageImpl;
pub use runner::Executor;
pub use sandbox::{ProcessSandbox, Sandbox};
pub use types::{
    Access, ExecutionRequest, ExecutionResult, Language, Outcome, ProcessOutput, TestSpec,
};

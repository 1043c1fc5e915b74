// Per-language strategy trait
#![allow(dead_code)]

use crate::executor::harness::Injection;
use crate::executor::types::Language;
use std::path::Path;

/// Internal trait for language implementations
pub trait LanguageImpl: Send + Sync {
    /// Language this strategy handles
    fn language(&self) -> Language;

    /// File extension for the scratch source file, without the dot
    fn source_extension(&self) -> &'static str;

    /// Merge a hidden test into the submission
    fn inject(&self, code: &str, test_input: &str) -> Injection;

    /// Compiler invocation, `None` for interpreted languages
    fn compile_command(&self, source: &Path, artifact: &Path) -> Option<Vec<String>>;

    /// Program invocation after a successful compile (or directly)
    fn run_command(&self, source: &Path, artifact: &Path) -> Vec<String>;

    /// Get language name
    fn name(&self) -> &'static str {
        self.language().as_str()
    }
}

pub(crate) fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

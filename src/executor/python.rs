// Python strategy
#![allow(dead_code)]

use crate::executor::harness::{self, Injection};
use crate::executor::language::{LanguageImpl, path_arg};
use crate::executor::types::Language;
use std::path::Path;

/// Runs submissions with a Python interpreter, no compile step
pub struct PythonLanguage {
    interpreter: String,
}

impl PythonLanguage {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }
}

impl LanguageImpl for PythonLanguage {
    fn language(&self) -> Language {
        Language::Python
    }

    fn source_extension(&self) -> &'static str {
        "py"
    }

    fn inject(&self, code: &str, test_input: &str) -> Injection {
        harness::append_after(code, test_input)
    }

    fn compile_command(&self, _source: &Path, _artifact: &Path) -> Option<Vec<String>> {
        None
    }

    fn run_command(&self, source: &Path, _artifact: &Path) -> Vec<String> {
        vec![self.interpreter.clone(), path_arg(source)]
    }
}

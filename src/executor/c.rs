// C strategy
#![allow(dead_code)]

use crate::executor::harness::{self, Injection};
use crate::executor::language::{LanguageImpl, path_arg};
use crate::executor::types::Language;
use std::path::Path;

/// Compiles submissions with a C compiler, then runs the binary
pub struct CLanguage {
    compiler: String,
    flags: Vec<String>,
}

impl CLanguage {
    pub fn new(compiler: impl Into<String>, flags: Vec<String>) -> Self {
        Self {
            compiler: compiler.into(),
            flags,
        }
    }
}

impl LanguageImpl for CLanguage {
    fn language(&self) -> Language {
        Language::C
    }

    fn source_extension(&self) -> &'static str {
        "c"
    }

    fn inject(&self, code: &str, test_input: &str) -> Injection {
        harness::splice_into_main(code, test_input)
    }

    fn compile_command(&self, source: &Path, artifact: &Path) -> Option<Vec<String>> {
        let mut command = vec![
            self.compiler.clone(),
            path_arg(source),
            "-o".to_string(),
            path_arg(artifact),
        ];
        command.extend(self.flags.iter().cloned());
        Some(command)
    }

    fn run_command(&self, _source: &Path, artifact: &Path) -> Vec<String> {
        vec![path_arg(artifact)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands() {
        let c = CLanguage::new("gcc", vec!["-lm".to_string()]);
        let src = Path::new("/tmp/codegrade-x.c");
        let bin = Path::new("/tmp/codegrade-x");

        assert_eq!(
            c.compile_command(src, bin).unwrap(),
            vec!["gcc", "/tmp/codegrade-x.c", "-o", "/tmp/codegrade-x", "-lm"]
        );
        assert_eq!(c.run_command(src, bin), vec!["/tmp/codegrade-x"]);
    }
}

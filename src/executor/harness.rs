// Merges a hidden test into a submission
#![allow(dead_code)]

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

/// Statement printed between the submission's own output and the test's output
pub const TEST_DELIMITER: &str = "printf(\"\\n\"); //test code begins";

/// `int main()` / `int main(void)` whose body ends at a `}` alone in column 0.
/// Groups: preamble, signature, body, closing brace, trailer.
static C_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?sm)\A(.*?)(int\s+main\s*\(\s*(?:void)?\s*\)\s*\{)(.*?)(^\})\s*(.*)\z")
        .expect("entry pattern must compile")
});

/// A `return <expr>;` that is the last statement of a body, trailing comments included
static TRAILING_RETURN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\breturn\s+[^;]+;(?:\s*(?://[^\n]*|/\*(?s:.*?)\*/))*\s*\z")
        .expect("return pattern must compile")
});

/// Result of merging a test into a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    pub source: String,
    /// `false` when the entry point was not found and `source` is the submission as-is
    pub injected: bool,
}

impl Injection {
    fn injected(source: String) -> Self {
        Self {
            source,
            injected: true,
        }
    }

    fn unchanged(source: &str) -> Self {
        Self {
            source: source.to_string(),
            injected: false,
        }
    }
}

/// Interpreted languages: the test runs after the submission at top level
pub fn append_after(code: &str, test_input: &str) -> Injection {
    Injection::injected(format!("{}\n{}", code, test_input))
}

/// C: splice the test into `main`, before its trailing return
pub fn splice_into_main(code: &str, test_input: &str) -> Injection {
    let Some(caps) = C_ENTRY.captures(code) else {
        warn!(code_len = code.len(), "entry function not found, test not injected");
        return Injection::unchanged(code);
    };

    let preamble = &caps[1];
    let signature = caps[2].trim();
    let body = caps[3].trim();
    let closing = &caps[4];
    let trailer = &caps[5];

    let new_body = match TRAILING_RETURN.find(body) {
        Some(ret) => {
            let statement = ret.as_str().trim();
            let rest = body[..ret.start()].trim_end();
            debug!(return_statement = %statement, "moving trailing return after test code");
            if rest.is_empty() {
                format!("{}\n{}\n{}", TEST_DELIMITER, test_input, statement)
            } else {
                format!("{}\n{}\n{}\n{}", rest, TEST_DELIMITER, test_input, statement)
            }
        }
        None => {
            if body.is_empty() {
                format!("{}\n{}", TEST_DELIMITER, test_input)
            } else {
                format!("{}\n{}\n{}", body, TEST_DELIMITER, test_input)
            }
        }
    };

    Injection::injected(format!(
        "{}{}\n{}\n{}{}",
        preamble, signature, new_body, closing, trailer
    ))
}

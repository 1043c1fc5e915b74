// Blocklist scan of submitted source
//
// A text heuristic, not an isolation boundary: obfuscated code can get past it.
#![allow(dead_code)]

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

/// Forbidden patterns, matched against lower-cased source in this order
pub const FORBIDDEN_PATTERNS: &[&str] = &[
    r"__import__\s*\(",
    r#"\bopen\s*\([^)]*["'].*["']"#,
    r"\bimport\s+os\b",
    r"\bimport\s+subprocess\b",
    r"\bimport\s+socket\b",
    r"\bimport\s+urllib\b",
    r"\bimport\s+requests\b",
    r"\bimport\s+ftplib\b",
    r"\bimport\s+paramiko\b",
    r"\bimport\s+pyodbc\b",
    r"\bsocket\s*\.",
    r"\bsubprocess\b",
    r"\b(popen|call|run)\s*\(",
];

static FORBIDDEN_REGEXES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    FORBIDDEN_PATTERNS
        .iter()
        .map(|p| (*p, Regex::new(p).expect("blocklist pattern must compile")))
        .collect()
});

/// Scan source and return every matched pattern descriptor.
/// An empty result means the code may run.
pub fn scan(code: &str) -> Vec<String> {
    let lowered = code.to_lowercase();

    let violations: Vec<String> = FORBIDDEN_REGEXES
        .iter()
        .filter(|(_, re)| re.is_match(&lowered))
        .map(|(pattern, _)| format!("[regex] matched: {}", pattern))
        .collect();

    if violations.is_empty() {
        debug!(code_len = code.len(), "security scan passed");
    } else {
        warn!(
            code_len = code.len(),
            violation_count = violations.len(),
            "security scan blocked submission"
        );
    }

    violations
}

// Wire types of the HTTP interface
#![allow(dead_code)]

use crate::executor::runner::{MISSING_INPUT_MESSAGE, UNSUPPORTED_LANGUAGE_MESSAGE};
use crate::executor::{ExecutionRequest, ExecutionResult, Language};
use serde::{Deserialize, Serialize};

/// Hidden test merged into the payload by the caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireTest {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub output: String,
}

/// Body of `POST /invoke`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvokeRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// Absent for ungraded runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<WireTest>,
}

impl InvokeRequest {
    pub fn new(code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            language: Some(language.into()),
            test: None,
        }
    }

    pub fn with_test(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.test = Some(WireTest {
            input: input.into(),
            output: output.into(),
        });
        self
    }

    /// Validate the payload. The error is the message shown to the caller.
    pub fn into_execution_request(self) -> Result<ExecutionRequest, &'static str> {
        let code = self.code.filter(|c| !c.is_empty());
        let language = self.language.filter(|l| !l.is_empty());

        let (Some(code), Some(language)) = (code, language) else {
            return Err(MISSING_INPUT_MESSAGE);
        };

        let language: Language = language
            .parse()
            .map_err(|_| UNSUPPORTED_LANGUAGE_MESSAGE)?;

        let mut request = ExecutionRequest::new(code, language);
        if let Some(test) = self.test {
            request = request.with_test(test.input, test.output);
        }
        Ok(request)
    }
}

/// Body returned by `POST /invoke`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeResponse {
    pub stdout: String,
    pub stderr: String,
    pub returncode: i32,
    /// `null` when the run was not graded
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub untestable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformed_source: Option<String>,
}

impl InvokeResponse {
    /// Response for a request the engine could not run
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            returncode: -1,
            error_message: Some(message.into()),
            ..Default::default()
        }
    }
}

impl From<ExecutionResult> for InvokeResponse {
    fn from(result: ExecutionResult) -> Self {
        Self {
            stdout: result.stdout,
            stderr: result.stderr,
            returncode: result.exit_code,
            success: result.success,
            timeout: result.timed_out.then_some(true),
            error_message: result.error_message,
            compile_error: result.compile_error,
            untestable: result.untestable.then_some(true),
            transformed_source: result.transformed_source,
        }
    }
}

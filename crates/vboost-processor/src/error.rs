//! Processor error types.

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Result type for processor operations.
pub type ProcessorResult<T> = Result<T, ProcessorError>;

/// Errors that can occur while dispatching a video to a processor.
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Invalid processor configuration: {0}")]
    ConfigError(String),

    #[error("Processor returned {status}: {message}")]
    Rejected {
        status: u16,
        message: String,
        /// Response body, parsed as JSON when possible
        details: Value,
    },

    #[error("Processor request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Processor executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("Processor script failed: {message}")]
    ScriptFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Processor produced no output at {0}")]
    MissingOutput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessorError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn script_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::ScriptFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Build a rejection from a non-success response body.
    pub fn rejected(status: u16, body: String) -> Self {
        let details = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));
        let message = details
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status));

        Self::Rejected {
            status,
            message,
            details,
        }
    }

    /// Diagnostic payload to surface to the client.
    pub fn details(&self) -> Value {
        match self {
            Self::Rejected { details, .. } => details.clone(),
            Self::ScriptFailed {
                stderr: Some(stderr),
                ..
            } if !stderr.trim().is_empty() => Value::String(stderr.trim().to_string()),
            other => Value::String(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejected_parses_json_body() {
        let err = ProcessorError::rejected(500, r#"{"error":"unsupported codec"}"#.to_string());
        assert_eq!(err.to_string(), "Processor returned 500: unsupported codec");
        assert_eq!(err.details(), json!({"error": "unsupported codec"}));
    }

    #[test]
    fn test_rejected_keeps_text_body() {
        let err = ProcessorError::rejected(502, "Bad Gateway".to_string());
        assert_eq!(err.details(), json!("Bad Gateway"));
        assert!(err.to_string().contains("HTTP 502"));
    }

    #[test]
    fn test_script_failure_details_prefer_stderr() {
        let err = ProcessorError::script_failed("exit 1", Some("Traceback...\n".into()), Some(1));
        assert_eq!(err.details(), json!("Traceback..."));

        let silent = ProcessorError::script_failed("exit 1", Some(String::new()), Some(1));
        assert_eq!(silent.details(), json!("Processor script failed: exit 1"));
    }
}

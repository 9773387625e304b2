// ABOUTME: Defines all error types for the subtask library using thiserror.
// ABOUTME: Each concern has its own error enum, unified under Error.

use std::time::Duration;

/// Top-level error type for the subtask library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),
}

/// Errors returned to callers of the task executor.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Task was cancelled")]
    Cancelled,
}

impl From<LlmError> for TaskError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Connection(msg) => TaskError::Connection(msg),
            LlmError::Timeout(after) => TaskError::Timeout(after),
            other => TaskError::Model(other.to_string()),
        }
    }
}

/// Errors from model backend operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Stream closed before the final chunk")]
    StreamClosed,

    #[error("No response within {0:?}")]
    Timeout(Duration),
}

/// Errors from loading settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Errors from tool operations.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Execution failed: {0}")]
    Execution(#[source] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_maps_to_task_error() {
        let err: TaskError = LlmError::Connection("refused".into()).into();
        assert!(matches!(err, TaskError::Connection(msg) if msg == "refused"));

        let err: TaskError = LlmError::Timeout(Duration::from_secs(3)).into();
        assert!(matches!(err, TaskError::Timeout(d) if d == Duration::from_secs(3)));

        let err: TaskError = LlmError::Api {
            status: 500,
            message: "model not loaded".into(),
        }
        .into();
        match err {
            TaskError::Model(msg) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("model not loaded"));
            }
            other => panic!("expected Model, got {other:?}"),
        }

        let err: TaskError = LlmError::StreamClosed.into();
        assert!(matches!(err, TaskError::Model(_)));
    }

    #[test]
    fn test_umbrella_error_display() {
        let err = Error::from(TaskError::InvalidRequest("empty task name".into()));
        assert_eq!(err.to_string(), "Task error: Invalid request: empty task name");
    }
}

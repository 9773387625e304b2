// ABOUTME: TaskRequest and TaskResult - what goes into and comes out of a subagent run.
// ABOUTME: Requests carry optional per-task overrides of the loaded settings.

use std::fmt;
use std::time::Duration;

use super::SubAgentType;
use crate::error::TaskError;
use crate::llm::{ToolCall, Usage};

/// One unit of delegated work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    pub subagent_type: SubAgentType,

    /// Short label shown in the report header.
    pub task_name: String,

    /// Full instructions, sent verbatim as the user message.
    pub task_description: String,

    /// Overrides the configured model for this task only.
    pub model: Option<String>,

    /// Overrides the configured streaming mode for this task only.
    pub stream: Option<bool>,

    /// Overrides the configured reasoning flag for this task only.
    pub reveal_reasoning: Option<bool>,
}

impl TaskRequest {
    pub fn new(
        subagent_type: SubAgentType,
        task_name: impl Into<String>,
        task_description: impl Into<String>,
    ) -> Self {
        Self {
            subagent_type,
            task_name: task_name.into(),
            task_description: task_description.into(),
            model: None,
            stream: None,
            reveal_reasoning: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = Some(stream);
        self
    }

    pub fn with_reasoning(mut self, reveal: bool) -> Self {
        self.reveal_reasoning = Some(reveal);
        self
    }

    /// Reject requests that would send an empty prompt.
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.task_name.trim().is_empty() {
            return Err(TaskError::InvalidRequest("task name is empty".to_string()));
        }
        if self.task_description.trim().is_empty() {
            return Err(TaskError::InvalidRequest(
                "task description is empty".to_string(),
            ));
        }
        if matches!(&self.model, Some(m) if m.trim().is_empty()) {
            return Err(TaskError::InvalidRequest("model name is empty".to_string()));
        }
        Ok(())
    }
}

/// Outcome of a successful subagent run.
#[derive(Debug, Clone)]
pub struct TaskResult {
    /// Unique id of this run, used in logs.
    pub agent_id: String,

    pub subagent_type: SubAgentType,

    /// Model name the run was configured with.
    pub model: String,

    /// The full report: header, raw answer, footer.
    pub formatted_output: String,

    /// The model's answer, unmodified.
    pub raw_model_output: String,

    /// Reasoning trace, only when it was requested and the model produced one.
    pub reasoning: Option<String>,

    /// Tool calls the model asked for. Always empty for tool-less types.
    pub tool_calls: Vec<ToolCall>,

    pub usage: Usage,

    pub duration: Duration,
}

impl fmt::Display for TaskResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted_output)
    }
}

// ABOUTME: Defines the ToolResult type - what a tool hands back to the agent
// ABOUTME: loop: output text, an error flag, and structured metadata.

use std::collections::HashMap;

use serde::Serialize;

/// Result of a tool execution.
///
/// An error result is still a successful call from the loop's point of
/// view: its content goes back to the model as the tool's answer.
#[derive(Debug, Clone, Default)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ToolResult {
    /// Create a successful text result.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Create an error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: message.into(),
            is_error: true,
            ..Default::default()
        }
    }

    /// Attach a metadata value. Values that fail to serialize are skipped.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.metadata.insert(key.into(), v);
        }
        self
    }
}

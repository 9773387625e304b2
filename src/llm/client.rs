// ABOUTME: Defines the LlmClient trait - the abstraction layer that lets
// ABOUTME: subagents run against any chat backend (Ollama, test doubles, etc.)

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use super::{Request, Response, ToolCall, Usage};
use crate::error::LlmError;

/// Event types for streaming responses.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// First chunk arrived.
    MessageStart { model: String },

    /// Fragment of the reasoning trace.
    ThinkingDelta { text: String },

    /// Fragment of the answer text.
    ContentDelta { text: String },

    /// Tool calls requested by the model.
    ToolCalls { calls: Vec<ToolCall> },

    /// Terminal chunk. Nothing follows it.
    MessageStop {
        done_reason: Option<String>,
        usage: Usage,
    },
}

/// Trait for chat backend implementations.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Create a message (non-streaming).
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError>;

    /// Create a message with streaming response.
    ///
    /// Implementations must end the stream after yielding
    /// [`StreamEvent::MessageStop`], and yield [`LlmError::StreamClosed`] if the
    /// backend hangs up before sending it.
    fn create_message_stream(
        &self,
        req: &Request,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;
}

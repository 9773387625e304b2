// ABOUTME: Utility that accumulates StreamEvents into a complete Response.
// ABOUTME: Concatenates text and reasoning fragments in arrival order.

use super::{Response, StreamEvent};
use crate::error::LlmError;

/// Accumulates streaming events into a finalized response.
///
/// Feed events via [`handle_event`](Self::handle_event) and call
/// [`into_response`](Self::into_response) once the stream is exhausted.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    response: Response,
    thinking: String,
    finished: bool,
}

impl StreamAccumulator {
    /// Create a new empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a single stream event. Events after `MessageStop` are ignored.
    pub fn handle_event(&mut self, event: &StreamEvent) {
        if self.finished {
            return;
        }

        match event {
            StreamEvent::MessageStart { model } => {
                self.response.model = model.clone();
            }
            StreamEvent::ThinkingDelta { text } => {
                self.thinking.push_str(text);
            }
            StreamEvent::ContentDelta { text } => {
                self.response.content.push_str(text);
            }
            StreamEvent::ToolCalls { calls } => {
                self.response.tool_calls.extend(calls.iter().cloned());
            }
            StreamEvent::MessageStop { done_reason, usage } => {
                self.response.done_reason = done_reason.clone();
                self.response.usage = usage.clone();
                self.finished = true;
            }
        }
    }

    /// Returns true once the terminal event has been seen.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consume the accumulator and return the assembled response.
    ///
    /// Fails with [`LlmError::StreamClosed`] if the terminal event never
    /// arrived; a truncated answer is not returned as if it were complete.
    pub fn into_response(self) -> Result<Response, LlmError> {
        if !self.finished {
            return Err(LlmError::StreamClosed);
        }

        let mut response = self.response;
        if !self.thinking.is_empty() {
            response.thinking = Some(self.thinking);
        }
        Ok(response)
    }
}

// ABOUTME: Test double for LlmClient used by unit tests across the crate.
// ABOUTME: Replies from a script and records every request it receives.

use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::Stream;

use crate::error::LlmError;
use crate::llm::{LlmClient, Request, Response, Role, StreamEvent, ToolCall, Usage};

pub(crate) struct ScriptedClient {
    reply: String,
    echo: bool,
    thinking: Option<String>,
    tool_calls: Vec<ToolCall>,
    failure: Option<fn() -> LlmError>,
    delay: Option<Duration>,
    truncated: bool,
    requests: Mutex<Vec<Request>>,
    stream_calls: AtomicUsize,
}

impl ScriptedClient {
    pub(crate) fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            echo: false,
            thinking: None,
            tool_calls: Vec::new(),
            failure: None,
            delay: None,
            truncated: false,
            requests: Mutex::new(Vec::new()),
            stream_calls: AtomicUsize::new(0),
        }
    }

    /// Reply with the content of the last user message.
    pub(crate) fn echoing() -> Self {
        Self {
            echo: true,
            ..Self::replying("")
        }
    }

    pub(crate) fn failing(failure: fn() -> LlmError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::replying("")
        }
    }

    pub(crate) fn with_thinking(mut self, thinking: &str) -> Self {
        self.thinking = Some(thinking.to_string());
        self
    }

    pub(crate) fn with_tool_call(mut self, name: &str, arguments: serde_json::Value) -> Self {
        self.tool_calls.push(ToolCall {
            name: name.to_string(),
            arguments,
        });
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Streams end without a terminal event.
    pub(crate) fn truncated(mut self) -> Self {
        self.truncated = true;
        self
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    fn answer(&self, req: &Request) -> String {
        if self.echo {
            req.messages
                .iter()
                .rev()
                .find(|m| m.role == Role::User)
                .map(|m| m.content.clone())
                .unwrap_or_default()
        } else {
            self.reply.clone()
        }
    }

    fn usage() -> Usage {
        Usage {
            input_tokens: 10,
            output_tokens: 5,
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError> {
        self.requests.lock().unwrap().push(req.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(failure) = self.failure {
            return Err(failure());
        }

        Ok(Response {
            model: req.model.clone(),
            content: self.answer(req),
            thinking: self.thinking.clone(),
            tool_calls: self.tool_calls.clone(),
            done_reason: Some("stop".to_string()),
            usage: Self::usage(),
        })
    }

    fn create_message_stream(
        &self,
        req: &Request,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        self.requests.lock().unwrap().push(req.clone());
        self.stream_calls.fetch_add(1, Ordering::SeqCst);

        let mut events: Vec<Result<StreamEvent, LlmError>> = Vec::new();
        if let Some(failure) = self.failure {
            events.push(Err(failure()));
        } else {
            events.push(Ok(StreamEvent::MessageStart {
                model: req.model.clone(),
            }));
            if let Some(thinking) = &self.thinking {
                events.push(Ok(StreamEvent::ThinkingDelta {
                    text: thinking.clone(),
                }));
            }
            for piece in self.answer(req).split_inclusive(' ') {
                events.push(Ok(StreamEvent::ContentDelta {
                    text: piece.to_string(),
                }));
            }
            if !self.tool_calls.is_empty() {
                events.push(Ok(StreamEvent::ToolCalls {
                    calls: self.tool_calls.clone(),
                }));
            }
            if !self.truncated {
                events.push(Ok(StreamEvent::MessageStop {
                    done_reason: Some("stop".to_string()),
                    usage: Self::usage(),
                }));
            }
        }

        let delay = self.delay;
        Box::pin(async_stream::stream! {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            for event in events {
                yield event;
            }
        })
    }
}

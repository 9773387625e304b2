// ABOUTME: ModelInvoker - bounded, single-attempt calls to an LlmClient.
// ABOUTME: Returns a buffered Invocation or a finite stream of text fragments.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};

use super::stream_accumulator::StreamAccumulator;
use super::{LlmClient, Message, Request, Response, StreamEvent, ToolCall, ToolDefinition, Usage};
use crate::config::{DEFAULT_TIMEOUT_SECS, Settings};
use crate::error::LlmError;

/// A finite, forward-only sequence of answer fragments. Concatenate in
/// arrival order to get the full answer. Cannot be restarted.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send + 'static>>;

/// Per-call backend options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationOptions {
    pub model_name: String,
    pub stream: bool,
    pub reveal_reasoning: bool,
}

impl InvocationOptions {
    /// Options for `model_name` with streaming and reasoning off.
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            stream: false,
            reveal_reasoning: false,
        }
    }

    /// Options taken from loaded settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.model.clone())
            .stream(settings.stream)
            .reveal_reasoning(settings.think)
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn reveal_reasoning(mut self, reveal: bool) -> Self {
        self.reveal_reasoning = reveal;
        self
    }
}

/// Outcome of one successful invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Model that answered, as reported by the backend (or requested, if it did not say).
    pub model: String,
    pub content: String,
    /// Reasoning trace; only present when `reveal_reasoning` was requested.
    pub reasoning: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Usage,
}

impl Invocation {
    fn from_response(response: Response, options: &InvocationOptions) -> Self {
        Self {
            model: if response.model.is_empty() {
                options.model_name.clone()
            } else {
                response.model
            },
            content: response.content,
            reasoning: if options.reveal_reasoning {
                response.thinking
            } else {
                None
            },
            tool_calls: response.tool_calls,
            usage: response.usage,
        }
    }
}

/// Invokes a model backend with a timeout and no retries.
#[derive(Clone)]
pub struct ModelInvoker {
    client: Arc<dyn LlmClient>,
    timeout: Duration,
}

impl ModelInvoker {
    /// Create an invoker with the default timeout.
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the bound for one invocation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The bound for one invocation.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn request(
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
        options: &InvocationOptions,
    ) -> Request {
        Request::new(&options.model_name)
            .messages(messages)
            .tools(tools)
            .think(options.reveal_reasoning)
    }

    /// Invoke without any tool schema attached.
    pub async fn invoke(
        &self,
        messages: Vec<Message>,
        options: &InvocationOptions,
    ) -> Result<Invocation, LlmError> {
        self.invoke_with_tools(messages, Vec::new(), options).await
    }

    /// Invoke with the given tool schema attached.
    ///
    /// With `options.stream` set, fragments are accumulated before returning.
    pub async fn invoke_with_tools(
        &self,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
        options: &InvocationOptions,
    ) -> Result<Invocation, LlmError> {
        let request = Self::request(messages, tools, options);

        let response = tokio::time::timeout(self.timeout, self.exchange(&request, options.stream))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout))??;

        Ok(Invocation::from_response(response, options))
    }

    async fn exchange(&self, request: &Request, stream: bool) -> Result<Response, LlmError> {
        if !stream {
            return self.client.create_message(request).await;
        }

        let mut events = self.client.create_message_stream(request);
        let mut acc = StreamAccumulator::new();
        while let Some(event) = events.next().await {
            acc.handle_event(&event?);
            if acc.is_finished() {
                break;
            }
        }
        acc.into_response()
    }

    /// Stream the answer text as it arrives, without tools.
    ///
    /// Only answer fragments are yielded; reasoning is not. The whole stream
    /// shares one deadline, and it ends at the backend's terminal event.
    pub fn invoke_stream(
        &self,
        messages: Vec<Message>,
        options: &InvocationOptions,
    ) -> FragmentStream {
        let request = Self::request(messages, Vec::new(), options);
        let mut events = self.client.create_message_stream(&request);
        let timeout = self.timeout;

        Box::pin(async_stream::try_stream! {
            // A bound too large to represent never fires.
            let deadline = tokio::time::Instant::now().checked_add(timeout);
            loop {
                let next = match deadline {
                    Some(deadline) => tokio::time::timeout_at(deadline, events.next())
                        .await
                        .map_err(|_| LlmError::Timeout(timeout))?,
                    None => events.next().await,
                };

                let Some(event) = next else {
                    Err(LlmError::StreamClosed)?;
                    return;
                };

                match event? {
                    StreamEvent::ContentDelta { text } => {
                        yield text;
                    }
                    StreamEvent::MessageStop { .. } => return,
                    _ => {}
                }
            }
        })
    }
}

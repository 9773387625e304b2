// ABOUTME: TaskExecutor - runs one typed subagent task against the model backend.
// ABOUTME: Resolves policy and prompt, invokes once, and formats the report.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::handle::TaskHandle;
use super::prompt::compose;
use super::report::format_report;
use super::task::TASK_TOOL_NAME;
use super::{SubAgentType, TaskRequest, TaskResult, ToolPolicy};
use crate::config::Settings;
use crate::error::TaskError;
use crate::llm::{InvocationOptions, LlmClient, ModelInvoker, OllamaClient};
use crate::tool::Registry;

/// Spawns subagents. Cheap to clone; clones share the client and registry.
#[derive(Clone)]
pub struct TaskExecutor {
    invoker: ModelInvoker,
    settings: Arc<Settings>,
    tools: Registry,
}

impl TaskExecutor {
    /// Create an executor over any backend client.
    pub fn new(client: Arc<dyn LlmClient>, settings: Settings) -> Self {
        let invoker = ModelInvoker::new(client).with_timeout(settings.timeout());
        Self {
            invoker,
            settings: Arc::new(settings),
            tools: Registry::new(),
        }
    }

    /// Create an executor talking to the Ollama server named in `settings`.
    pub fn from_settings(settings: Settings) -> Self {
        let client = Arc::new(OllamaClient::from_settings(&settings));
        Self::new(client, settings)
    }

    /// Tools granted to `FullToolSet` subagents.
    pub fn with_tools(mut self, tools: Registry) -> Self {
        self.tools = tools;
        self
    }

    /// Override the per-task timeout from settings.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.invoker = self.invoker.with_timeout(timeout);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tools(&self) -> &Registry {
        &self.tools
    }

    pub fn timeout(&self) -> Duration {
        self.invoker.timeout()
    }

    /// Backend options for `request`: settings, then the request's overrides.
    pub fn options_for(&self, request: &TaskRequest) -> InvocationOptions {
        let mut options = InvocationOptions::from_settings(&self.settings);
        if let Some(model) = &request.model {
            options.model_name = model.clone();
        }
        if let Some(stream) = request.stream {
            options.stream = stream;
        }
        if let Some(reveal) = request.reveal_reasoning {
            options.reveal_reasoning = reveal;
        }
        options
    }

    /// Run a subagent of `subagent_type` on one task and return its report.
    pub async fn spawn_task(
        &self,
        subagent_type: SubAgentType,
        task_name: &str,
        task_description: &str,
    ) -> Result<TaskResult, TaskError> {
        self.spawn(TaskRequest::new(subagent_type, task_name, task_description))
            .await
    }

    /// Run one request to completion.
    pub async fn spawn(&self, request: TaskRequest) -> Result<TaskResult, TaskError> {
        self.run(Uuid::new_v4().to_string(), request).await
    }

    /// Run several requests concurrently. Results come back in input order.
    pub async fn spawn_many(
        &self,
        requests: Vec<TaskRequest>,
    ) -> Vec<Result<TaskResult, TaskError>> {
        info!(count = requests.len(), "spawning subagents concurrently");
        join_all(requests.into_iter().map(|request| self.spawn(request))).await
    }

    /// Run a request on the tokio runtime and return a handle to it.
    pub fn spawn_background(&self, request: TaskRequest) -> TaskHandle {
        let agent_id = Uuid::new_v4().to_string();
        let executor = self.clone();
        let id = agent_id.clone();
        TaskHandle::spawn(agent_id, async move { executor.run(id, request).await })
    }

    pub(crate) async fn run(
        &self,
        agent_id: String,
        request: TaskRequest,
    ) -> Result<TaskResult, TaskError> {
        request.validate()?;

        let subagent_type = request.subagent_type;
        let policy = subagent_type.tool_policy();
        let options = self.options_for(&request);
        let messages = compose(subagent_type, &request.task_description);

        info!(
            agent_id = %agent_id,
            subagent_type = %subagent_type,
            model = %options.model_name,
            task = %request.task_name,
            "spawning subagent"
        );

        let start = Instant::now();
        let outcome = match policy {
            ToolPolicy::NoTools => {
                debug!(
                    agent_id = %agent_id,
                    messages = messages.len(),
                    stream = options.stream,
                    think = options.reveal_reasoning,
                    "invoking without tools"
                );
                self.invoker.invoke(messages, &options).await
            }
            ToolPolicy::FullToolSet => {
                let tools = self.tools.definitions_except(&[TASK_TOOL_NAME]).await;
                debug!(
                    agent_id = %agent_id,
                    messages = messages.len(),
                    tools = tools.len(),
                    stream = options.stream,
                    think = options.reveal_reasoning,
                    "invoking with tools"
                );
                self.invoker.invoke_with_tools(messages, tools, &options).await
            }
        };

        let invocation = match outcome {
            Ok(invocation) => invocation,
            Err(err) => {
                warn!(
                    agent_id = %agent_id,
                    subagent_type = %subagent_type,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    error = %err,
                    "subagent failed"
                );
                return Err(err.into());
            }
        };
        let duration = start.elapsed();

        let tool_calls = match policy {
            ToolPolicy::NoTools => {
                if !invocation.tool_calls.is_empty() {
                    warn!(
                        agent_id = %agent_id,
                        dropped = invocation.tool_calls.len(),
                        "ignoring tool calls from a tool-less subagent"
                    );
                }
                Vec::new()
            }
            ToolPolicy::FullToolSet => invocation.tool_calls,
        };

        let formatted_output = format_report(
            &request.task_name,
            subagent_type.description(),
            &options.model_name,
            &invocation.content,
        );

        info!(
            agent_id = %agent_id,
            subagent_type = %subagent_type,
            duration_ms = duration.as_millis() as u64,
            output_tokens = invocation.usage.output_tokens,
            "subagent completed"
        );

        Ok(TaskResult {
            agent_id,
            subagent_type,
            model: options.model_name,
            formatted_output,
            raw_model_output: invocation.content,
            reasoning: invocation.reasoning,
            tool_calls,
            usage: invocation.usage,
            duration,
        })
    }
}

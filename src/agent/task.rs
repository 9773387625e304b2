// ABOUTME: TaskTool - exposes subagent spawning to a host agent's model as a tool.
// ABOUTME: Bad arguments and failed runs come back as error results, not Err.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::info;

use super::{SubAgentType, TaskExecutor, TaskHandle, TaskRequest};
use crate::tool::{Tool, ToolResult};

/// Name of the subagent tool. Never offered to subagents themselves.
pub const TASK_TOOL_NAME: &str = "task";

#[derive(Debug, Deserialize)]
struct TaskParams {
    subagent_type: String,
    prompt: String,
    description: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    run_in_background: bool,
}

/// A tool that runs a task on a typed subagent and returns its report.
///
/// With `run_in_background` the tool answers at once with the agent id. The
/// run's handle is parked until the host collects it with
/// [`TaskTool::take_background`].
pub struct TaskTool {
    executor: TaskExecutor,
    background: Arc<Mutex<HashMap<String, TaskHandle>>>,
}

impl TaskTool {
    pub fn new(executor: TaskExecutor) -> Self {
        Self {
            executor,
            background: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Remove and return the handle of a background run.
    pub async fn take_background(&self, agent_id: &str) -> Option<TaskHandle> {
        self.background.lock().await.remove(agent_id)
    }

    /// Ids of background runs not yet collected.
    pub async fn background_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.background.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    async fn start_background(&self, request: TaskRequest) -> ToolResult {
        if let Err(e) = request.validate() {
            return ToolResult::error(format!("Subagent error: {}", e));
        }

        let subagent_type = request.subagent_type;
        let handle = self.executor.spawn_background(request);
        let agent_id = handle.agent_id().to_string();
        self.background.lock().await.insert(agent_id.clone(), handle);
        info!(
            agent_id = %agent_id,
            subagent_type = %subagent_type,
            "subagent running in background"
        );

        ToolResult::text(format!(
            "Started {} subagent in the background. Agent id: {}",
            subagent_type, agent_id
        ))
        .with_metadata("agent_id", &agent_id)
        .with_metadata("subagent_type", subagent_type)
        .with_metadata("background", true)
    }
}

#[async_trait]
impl Tool for TaskTool {
    fn name(&self) -> &str {
        TASK_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Launch a specialized subagent to handle a focused task. The subagent starts \
         with a fresh conversation, works on the prompt alone, and returns a report."
    }

    fn schema(&self) -> serde_json::Value {
        let kinds: Vec<&str> = SubAgentType::ALL.iter().map(|t| t.as_str()).collect();
        let guide: Vec<String> = SubAgentType::ALL
            .iter()
            .map(|t| format!("{}: {}", t.as_str(), t.description()))
            .collect();

        serde_json::json!({
            "type": "object",
            "properties": {
                "subagent_type": {
                    "type": "string",
                    "enum": kinds,
                    "description": format!("The kind of subagent to run. {}", guide.join("; "))
                },
                "prompt": {
                    "type": "string",
                    "description": "Complete instructions for the subagent"
                },
                "description": {
                    "type": "string",
                    "description": "A short (3-5 word) label for the task"
                },
                "model": {
                    "type": "string",
                    "description": "Optional: model to use instead of the configured one"
                },
                "run_in_background": {
                    "type": "boolean",
                    "description": "Run the subagent in the background and return its agent id immediately"
                }
            },
            "required": ["subagent_type", "prompt", "description"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        let params: TaskParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return Ok(ToolResult::error(format!("Invalid parameters: {}", e))),
        };

        let subagent_type: SubAgentType = match params.subagent_type.parse() {
            Ok(t) => t,
            Err(e) => return Ok(ToolResult::error(e.to_string())),
        };

        let mut request = TaskRequest::new(subagent_type, params.description, params.prompt);
        if let Some(model) = params.model {
            request = request.with_model(model);
        }

        if params.run_in_background {
            return Ok(self.start_background(request).await);
        }

        match self.executor.spawn(request).await {
            Ok(result) => Ok(ToolResult::text(result.formatted_output)
                .with_metadata("agent_id", &result.agent_id)
                .with_metadata("subagent_type", result.subagent_type)
                .with_metadata("model", &result.model)
                .with_metadata("duration_ms", result.duration.as_millis() as u64)),
            Err(e) => Ok(ToolResult::error(format!("Subagent error: {}", e))),
        }
    }
}

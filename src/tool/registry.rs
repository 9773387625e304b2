// ABOUTME: Implements the Registry - a shared, thread-safe set of tools
// ABOUTME: whose definitions can be attached to a model request.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Tool, ToolResult};
use crate::error::ToolError;
use crate::llm::{ToolCall, ToolDefinition};

/// A thread-safe registry of tools. Clones share the same tool set.
#[derive(Default, Clone)]
pub struct Registry {
    tools: Arc<RwLock<HashMap<String, Arc<dyn Tool>>>>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name.
    pub async fn register<T: Tool + 'static>(&self, tool: T) {
        self.register_arc(Arc::new(tool)).await;
    }

    /// Register a tool from an Arc.
    pub async fn register_arc(&self, tool: Arc<dyn Tool>) {
        let mut tools = self.tools.write().await;
        tools.insert(tool.name().to_string(), tool);
    }

    /// Unregister a tool by name.
    pub async fn unregister(&self, name: &str) {
        let mut tools = self.tools.write().await;
        tools.remove(name);
    }

    /// Get a tool by name.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().await;
        tools.get(name).cloned()
    }

    /// List all tool names, sorted alphabetically.
    pub async fn list(&self) -> Vec<String> {
        let tools = self.tools.read().await;
        let mut names: Vec<_> = tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of registered tools.
    pub async fn count(&self) -> usize {
        self.tools.read().await.len()
    }

    /// Definitions of every registered tool, sorted by name.
    pub async fn to_definitions(&self) -> Vec<ToolDefinition> {
        self.definitions_except(&[]).await
    }

    /// Definitions of every registered tool not named in `excluded`, sorted by name.
    pub async fn definitions_except(&self, excluded: &[&str]) -> Vec<ToolDefinition> {
        let tools = self.tools.read().await;
        let mut defs: Vec<ToolDefinition> = tools
            .values()
            .filter(|t| !excluded.iter().any(|name| *name == t.name()))
            .map(|t| t.definition())
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Run a tool call a model asked for.
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
        let tool = self
            .get(&call.name)
            .await
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;
        if !call.arguments.is_object() {
            return Err(ToolError::InvalidParams(format!(
                "arguments for '{}' must be a JSON object",
                call.name
            )));
        }
        tool.execute(call.arguments.clone())
            .await
            .map_err(ToolError::Execution)
    }
}

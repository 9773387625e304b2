// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use subtask::prelude::*;` to get started quickly.

pub use crate::agent::{
    SubAgentType, TaskExecutor, TaskHandle, TaskRequest, TaskResult, TaskStatus, TaskTool,
    ToolPolicy, format_report,
};
pub use crate::config::Settings;
pub use crate::error::{ConfigError, Error, LlmError, TaskError, ToolError};
pub use crate::llm::{
    FragmentStream, Invocation, InvocationOptions, LlmClient, Message, ModelInvoker,
    OllamaClient, Request, Response, Role, StreamEvent, ToolCall, ToolDefinition, Usage,
};
pub use crate::tool::{Registry, Tool, ToolResult};

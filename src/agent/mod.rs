// ABOUTME: Subagent module - typed subagents, their prompts, and the executor that runs them.
// ABOUTME: Provides TaskExecutor, TaskHandle, TaskTool, and the report formatter.

mod executor;
mod handle;
mod kind;
mod prompt;
mod report;
mod request;
mod task;

pub use executor::TaskExecutor;
pub use handle::{TaskHandle, TaskStatus};
pub use kind::{Profile, SubAgentType, ToolPolicy};
pub use prompt::compose;
pub use report::{REPORT_FOOTER, format_report};
pub use request::{TaskRequest, TaskResult};
pub use task::{TASK_TOOL_NAME, TaskTool};

// ABOUTME: Root module for subtask - typed subagent dispatch for agent runtimes.
// ABOUTME: Re-exports the executor, subagent types, and error types.

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod prelude;
pub mod tool;

#[cfg(test)]
mod testing;

pub use agent::{SubAgentType, TaskExecutor, TaskRequest, TaskResult};
pub use config::Settings;
pub use error::{Error, TaskError};

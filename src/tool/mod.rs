// ABOUTME: Tool module - the Tool trait and the registry subagents can be granted.
// ABOUTME: Executing requested tool calls is left to the host agent loop.

mod registry;
mod result;
mod traits;

pub use registry::*;
pub use result::*;
pub use traits::*;

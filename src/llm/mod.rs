// ABOUTME: LLM module - client abstraction for the model backend.
// ABOUTME: Defines types, the LlmClient trait, the Ollama client and the invoker.

mod client;
mod invoker;
mod ollama;
pub mod stream_accumulator;
mod types;

pub use client::*;
pub use invoker::*;
pub use ollama::*;
pub use types::*;

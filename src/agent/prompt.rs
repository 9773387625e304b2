// ABOUTME: Prompt composition for subagents - system prompt (if any) then the task.
// ABOUTME: Every subagent conversation starts fresh; no parent history is carried.

use super::SubAgentType;
use crate::llm::Message;

/// Build the message list for one subagent invocation.
pub fn compose(subagent_type: SubAgentType, task_description: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system_prompt) = subagent_type.system_prompt() {
        messages.push(Message::system(system_prompt));
    }
    messages.push(Message::user(task_description));
    messages
}

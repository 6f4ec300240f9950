//! Conversions between jobscout types and llm crate types.
//!
//! Internal; the llm crate takes the system prompt through its builder, so
//! system messages are split off here rather than sent as chat turns.

use llm::chat::ChatMessage as LlmMessage;

use crate::{Message, Role};

/// Convert our messages to llm crate messages.
///
/// Returns the system prompt (multiple system messages are joined with a
/// blank line) and the remaining conversation.
pub fn to_llm_messages(messages: &[Message]) -> (Option<String>, Vec<LlmMessage>) {
    let mut system_parts: Vec<&str> = Vec::new();
    let mut llm_messages = Vec::with_capacity(messages.len());

    for msg in messages {
        match msg.role {
            Role::System => system_parts.push(&msg.content),
            Role::User => {
                llm_messages.push(LlmMessage::user().content(msg.content.clone()).build());
            }
            Role::Assistant => {
                llm_messages.push(LlmMessage::assistant().content(msg.content.clone()).build());
            }
        }
    }

    let system_prompt = (!system_parts.is_empty()).then(|| system_parts.join("\n\n"));
    (system_prompt, llm_messages)
}

//! Conversation messages

use crate::tool::{ToolCall, ToolResult};
use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use part::{Data, MessagePart, PartType};
pub use source::Source;

mod part;
mod source;

/// The role of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The caller, including tool results fed back to the model
    User,
    /// The model
    Model,
}

/// A message in the conversation
///
/// The conversation is owned by the caller and only ever appended to.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    /// The role of the message
    pub role: Role,

    /// The parts of the message, in order
    pub parts: Vec<MessagePart>,
}

impl Message {
    /// Create a message from parts
    pub fn new(role: Role, parts: Vec<MessagePart>) -> Self {
        Self { role, parts }
    }

    /// Create a new user message with a single text part
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![MessagePart::text(text)])
    }

    /// Create a new model message with a single text part
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, vec![MessagePart::text(text)])
    }

    /// Wrap a tool result into a user message
    pub fn user_tool_result(result: ToolResult) -> Self {
        Self::new(Role::User, vec![MessagePart::ToolResult(result)])
    }

    /// Wrap several tool results into one user message, keeping their order
    pub fn user_tool_results(results: impl IntoIterator<Item = ToolResult>) -> Self {
        Self::new(
            Role::User,
            results.into_iter().map(MessagePart::ToolResult).collect(),
        )
    }

    /// The text parts concatenated in order.
    pub fn text(&self) -> Result<String> {
        let mut text = String::new();
        for part in self.parts.iter().filter(|part| part.is_text()) {
            text.push_str(&part.try_text()?);
        }
        Ok(text)
    }

    /// The tool calls of the message, in order.
    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCall> {
        self.parts.iter().filter_map(|part| match part {
            MessagePart::ToolCall(call) => Some(call),
            _ => None,
        })
    }
}

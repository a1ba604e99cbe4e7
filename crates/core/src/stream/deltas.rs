//! Assembly of tool calls streamed in fragments

use crate::message::MessagePart;
use anyhow::{Context as _, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One fragment of a streamed tool call
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolCallDelta {
    /// The index of the call within the turn
    #[serde(default)]
    pub index: u32,

    /// The ID of the call, usually only on the first fragment
    #[serde(default)]
    pub id: String,

    /// The tool name, usually only on the first fragment
    #[serde(default)]
    pub name: String,

    /// A slice of the JSON argument text
    #[serde(default)]
    pub arguments: String,
}

impl ToolCallDelta {
    /// Merge a later fragment of the same call into this one
    pub fn merge(&mut self, delta: &Self) {
        if !delta.id.is_empty() {
            self.id = delta.id.clone();
        }
        if !delta.name.is_empty() {
            self.name = delta.name.clone();
        }
        self.arguments.push_str(&delta.arguments);
    }
}

/// Accumulates tool call fragments by index
///
/// Backends that stream tool calls in pieces feed every fragment here and
/// emit the finished calls once the turn's calls are complete.
#[derive(Debug, Default)]
pub struct ToolCallDeltas {
    calls: BTreeMap<u32, ToolCallDelta>,
}

impl ToolCallDeltas {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a fragment
    pub fn accept(&mut self, delta: &ToolCallDelta) {
        self.calls.entry(delta.index).or_default().merge(delta);
    }

    /// Whether no fragment has been accepted
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Finish the calls into tool call parts, ordered by index.
    ///
    /// Empty argument text becomes an empty object.
    pub fn finish(self) -> Result<Vec<MessagePart>> {
        self.calls
            .into_values()
            .map(|call| {
                let args = if call.arguments.trim().is_empty() {
                    Value::Object(Default::default())
                } else {
                    serde_json::from_str(&call.arguments).with_context(|| {
                        format!("invalid arguments for tool call {} ({})", call.id, call.name)
                    })?
                };
                Ok(MessagePart::tool_call(call.id, call.name, args))
            })
            .collect()
    }
}

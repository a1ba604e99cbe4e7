//! Response metadata refined while the stream drains

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The reason the model stopped generating
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The backend reported a reason this crate does not model
    #[default]
    Unknown,

    /// The model finished naturally
    Stop,

    /// The model hit the max token limit
    Length,

    /// Content was filtered
    ContentFilter,

    /// The model is making tool calls
    ToolCalls,

    /// The model refused to answer
    Refusal,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Usage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,

    /// Number of tokens spent thinking
    pub thoughts_tokens: u32,

    /// Number of tokens in the completion
    pub completion_tokens: u32,
}

impl Usage {
    /// All tokens of the exchange, saturating at `u32::MAX`.
    pub fn total(&self) -> u32 {
        self.prompt_tokens
            .saturating_add(self.thoughts_tokens)
            .saturating_add(self.completion_tokens)
    }
}

/// Metadata of a chat completion response
///
/// Only final once the response stream has been drained to its end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatCompleteResponseMetadata {
    /// Token usage
    pub usage: Usage,

    /// Why generation stopped, once the backend said so
    pub finish_reason: Option<FinishReason>,
}

/// The producer's handle to the metadata of a response
///
/// There is exactly one writer per response, handed to the producer when the
/// response is built.
#[derive(Debug)]
pub struct MetaWriter(pub(crate) Arc<Mutex<ChatCompleteResponseMetadata>>);

impl MetaWriter {
    /// Replace the usage.
    pub fn set_usage(&self, usage: Usage) {
        self.0.lock().usage = usage;
    }

    /// Record the finish reason.
    pub fn set_finish_reason(&self, reason: FinishReason) {
        self.0.lock().finish_reason = Some(reason);
    }

    /// Edit the metadata in place.
    pub fn update(&self, f: impl FnOnce(&mut ChatCompleteResponseMetadata)) {
        f(&mut self.0.lock());
    }
}

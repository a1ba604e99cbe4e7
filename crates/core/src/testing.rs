//! Scripted chat completer for testing.
//!
//! Replays pre-scripted turns instead of calling a backend and records every
//! request it receives. Intended for tests that exercise streaming, tool
//! dispatch and round trips without real LLM calls.

use crate::{
    ChatCompleter, Context,
    message::MessagePart,
    request::ChatCompleteRequest,
    stream::{FinishReason, StreamingResponse, Usage},
};
use anyhow::Result;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;

/// One scripted model turn
#[derive(Debug, Clone, Default)]
pub struct ScriptedTurn {
    /// The parts streamed, in order
    pub parts: Vec<MessagePart>,

    /// An error streamed after the parts
    pub error: Option<String>,

    /// An error returned before streaming starts
    pub reject: Option<String>,

    /// Usage reported once the parts are streamed
    pub usage: Usage,

    /// Finish reason reported once the parts are streamed
    pub finish_reason: Option<FinishReason>,

    /// Never end the stream after the parts
    pub hang: bool,
}

impl ScriptedTurn {
    /// A turn answering with text parts
    pub fn text<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: texts.into_iter().map(MessagePart::text).collect(),
            finish_reason: Some(FinishReason::Stop),
            ..Default::default()
        }
    }

    /// A turn calling one tool
    pub fn tool_call(id: &str, name: &str, args: Value) -> Self {
        Self::parts(vec![MessagePart::tool_call(id, name, args)])
            .with_finish_reason(FinishReason::ToolCalls)
    }

    /// A turn streaming the given parts
    pub fn parts(parts: Vec<MessagePart>) -> Self {
        Self {
            parts,
            ..Default::default()
        }
    }

    /// A turn the backend rejects outright
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            reject: Some(message.into()),
            ..Default::default()
        }
    }

    /// Fail the stream after the parts
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Report usage at the end of the stream
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    /// Report a finish reason at the end of the stream
    pub fn with_finish_reason(mut self, reason: FinishReason) -> Self {
        self.finish_reason = Some(reason);
        self
    }

    /// Keep the stream open after the parts
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }
}

/// A [`ChatCompleter`] replaying scripted turns in order.
///
/// Fails the request once the script is exhausted.
#[derive(Debug, Default)]
pub struct ScriptedCompleter {
    turns: Mutex<VecDeque<ScriptedTurn>>,
    requests: Mutex<Vec<ChatCompleteRequest>>,
}

impl ScriptedCompleter {
    /// Create a completer replaying the given turns
    pub fn new(turns: impl IntoIterator<Item = ScriptedTurn>) -> Self {
        Self {
            turns: Mutex::new(turns.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<ChatCompleteRequest> {
        self.requests.lock().clone()
    }

    /// The number of turns not yet replayed
    pub fn remaining(&self) -> usize {
        self.turns.lock().len()
    }
}

impl ChatCompleter for ScriptedCompleter {
    async fn chat_complete(
        &self,
        ctx: &Context,
        request: &ChatCompleteRequest,
    ) -> Result<StreamingResponse> {
        self.requests.lock().push(request.clone());
        let Some(turn) = self.turns.lock().pop_front() else {
            anyhow::bail!("scripted completer has no turns left");
        };
        if let Some(reject) = turn.reject {
            anyhow::bail!(reject);
        }

        Ok(StreamingResponse::new(ctx, move |meta| {
            async_stream::try_stream! {
                for part in turn.parts {
                    yield part;
                }
                if let Some(error) = turn.error {
                    Err(anyhow::anyhow!(error))?;
                }

                meta.set_usage(turn.usage);
                if let Some(reason) = turn.finish_reason {
                    meta.set_finish_reason(reason);
                }
                if turn.hang {
                    std::future::pending::<()>().await;
                }
            }
        }))
    }
}

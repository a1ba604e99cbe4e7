//! The caller-side tool round trip
//!
//! Issue a request, drain the streamed turn, execute the tools it calls,
//! append the model's turn and the tool results to the conversation, and
//! issue the request again until the model answers without calling tools.

use crate::{
    ChatCompleter, Context,
    error::{StepLimit, UnknownTool},
    message::{Message, MessagePart, Role},
    request::ChatCompleteRequest,
    stream::ChatCompleteResponseMetadata,
    tool::{self, Tool, ToolCall, ToolResult},
};
use anyhow::Result;

/// One drained model turn
#[derive(Debug, Clone)]
pub struct Turn {
    /// Every part the model emitted, in order
    pub parts: Vec<MessagePart>,

    /// The final metadata of the response
    pub meta: ChatCompleteResponseMetadata,
}

impl Turn {
    /// The text parts concatenated in order.
    pub fn text(&self) -> Result<String> {
        let mut text = String::new();
        for part in self.parts.iter().filter(|part| part.is_text()) {
            text.push_str(&part.try_text()?);
        }
        Ok(text)
    }

    /// The tool calls of the turn, in order.
    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCall> {
        self.parts.iter().filter_map(|part| match part {
            MessagePart::ToolCall(call) => Some(call),
            _ => None,
        })
    }
}

/// The outcome of one request/drain/dispatch cycle
#[derive(Debug, Clone)]
pub enum Step {
    /// The model answered without calling tools
    Finished(Turn),

    /// The model called tools, their results are appended and the request is
    /// ready to be issued again
    ToolsCalled {
        /// The turn that called the tools
        turn: Turn,
        /// One result per call, in call order
        results: Vec<ToolResult>,
    },
}

/// Drives a request through as many tool round trips as the model needs
///
/// The conversation lives in the request, and grows by exactly two messages
/// per round trip: the model's turn replayed verbatim, then a user message
/// with the tool results.
#[derive(Debug)]
pub struct RoundTrip<C> {
    completer: C,
    request: ChatCompleteRequest,
    max_tool_steps: Option<usize>,
    tool_steps: usize,
    requests: usize,
}

impl<C: ChatCompleter> RoundTrip<C> {
    /// Create a new round trip over a request
    pub fn new(completer: C, request: ChatCompleteRequest) -> Self {
        Self {
            completer,
            request,
            max_tool_steps: None,
            tool_steps: 0,
            requests: 0,
        }
    }

    /// Bound the number of tool round trips before the model has to answer.
    ///
    /// The count starts over once a turn finishes without tool calls, so
    /// every follow-up prompt gets the full budget.
    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_tool_steps = Some(max);
        self
    }

    /// Add tools to the request
    pub fn with_tools(mut self, tools: impl IntoIterator<Item = Tool>) -> Self {
        self.request.tools.extend(tools);
        self
    }

    /// The request as it stands, conversation included
    pub fn request(&self) -> &ChatCompleteRequest {
        &self.request
    }

    /// The conversation so far
    pub fn messages(&self) -> &[Message] {
        &self.request.messages
    }

    /// Append a message, e.g. the next user prompt after a finished turn
    pub fn push(&mut self, message: Message) {
        self.request.messages.push(message);
    }

    /// The number of requests issued over the lifetime of the round trip
    pub fn requests(&self) -> usize {
        self.requests
    }

    /// The number of tool round trips since the last finished turn
    pub fn tool_steps(&self) -> usize {
        self.tool_steps
    }

    /// Give the request back, conversation included
    pub fn into_request(self) -> ChatCompleteRequest {
        self.request
    }

    /// Run one request/drain/dispatch cycle.
    ///
    /// Stream errors and request errors are returned as is and leave the
    /// conversation untouched, so do tool calls naming a tool the request
    /// does not carry and tool calls past the step bound. Tool execution
    /// errors are not errors here, they are carried in the results.
    pub async fn step(&mut self, ctx: &Context) -> Result<Step> {
        ctx.check()?;

        self.requests += 1;
        tracing::debug!(
            request = self.requests,
            tool_steps = self.tool_steps,
            messages = self.request.messages.len(),
            tools = self.request.tools.len(),
            "issuing chat completion"
        );
        let mut response = self.completer.chat_complete(ctx, &self.request).await?;
        let parts = response.collect_parts().await?;
        let turn = Turn {
            parts,
            meta: response.meta(),
        };

        if turn.tool_calls().next().is_none() {
            if !turn.parts.is_empty() {
                self.request
                    .messages
                    .push(Message::new(Role::Model, turn.parts.clone()));
            }
            self.tool_steps = 0;
            return Ok(Step::Finished(turn));
        }

        if let Some(max) = self.max_tool_steps.filter(|max| self.tool_steps >= *max) {
            return Err(StepLimit(max).into());
        }

        let mut dispatch = Vec::new();
        for call in turn.tool_calls() {
            let Some(tool) = tool::find(&self.request.tools, &call.name) else {
                return Err(UnknownTool {
                    id: call.id.clone(),
                    name: call.name.clone(),
                }
                .into());
            };
            dispatch.push((tool, call));
        }

        let mut results = Vec::with_capacity(dispatch.len());
        for (tool, call) in dispatch {
            tracing::debug!(id = %call.id, name = %call.name, "calling tool");
            if let Some(summary) = tool.summarize(ctx.clone(), call.args.clone()).await {
                match summary {
                    Ok(summary) => tracing::info!(tool = %call.name, "{summary}"),
                    Err(e) => tracing::warn!(tool = %call.name, "failed to summarize call: {e:#}"),
                }
            }

            let result = tool.call(ctx, call).await;
            if let Some(err) = &result.err {
                tracing::warn!(id = %call.id, tool = %call.name, "tool failed: {err}");
            }
            results.push(result);
        }

        self.request
            .messages
            .push(Message::new(Role::Model, turn.parts.clone()));
        self.request
            .messages
            .push(Message::user_tool_results(results.clone()));
        self.tool_steps += 1;
        Ok(Step::ToolsCalled { turn, results })
    }

    /// Step until the model answers without calling tools.
    ///
    /// Unbounded unless [`Self::with_max_steps`] was set, in which case a
    /// tool call past the bound fails with [`StepLimit`].
    pub async fn run(&mut self, ctx: &Context) -> Result<Turn> {
        self.tool_steps = 0;
        loop {
            if let Step::Finished(turn) = self.step(ctx).await? {
                return Ok(turn);
            }
        }
    }
}

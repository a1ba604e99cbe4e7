//! Core abstractions for a provider-agnostic LLM interface
//!
//! One request format in, one streamed response format out, whichever backend
//! answers. Tools are described by a portable [`Schema`], usually derived with
//! [`macro@Schematic`], and called through the [`RoundTrip`] driver.

extern crate self as gai_core;

pub use {
    completer::ChatCompleter,
    config::Config,
    context::Context,
    embed::{EmbedRequest, EmbedResponse, Embedder, VectorComponent},
    error::{Cancelled, StepLimit, StreamConsumed, UnknownTool},
    gai_codegen::Schematic,
    message::{Data, Message, MessagePart, PartType, Role},
    request::{ChatCompleteRequest, Temperature, ThinkingLevel},
    round_trip::{RoundTrip, Step, Turn},
    schema::{Schema, SchemaType, Schematic, schema_for},
    stream::{
        ChatCompleteResponseMetadata, FinishReason, MetaWriter, StreamState, StreamingResponse,
        ToolCallDelta, ToolCallDeltas, Usage,
    },
    tool::{Tool, ToolCall, ToolDeclaration, ToolError, ToolResult},
};

pub mod error;
pub mod message;
pub mod schema;
pub mod stream;
pub mod tool;

mod completer;
mod config;
mod context;
mod embed;
mod request;
mod round_trip;

#[cfg(feature = "testing")]
pub mod testing;

#[doc(hidden)]
pub mod __private {
    pub use serde_json::json;
}

//! Typed error conditions callers may want to branch on.
//!
//! Everything fallible returns `anyhow::Result`; these values travel inside
//! the `anyhow::Error` and can be recovered with `downcast_ref`.

use thiserror::Error;

/// The execution context was cancelled while a response was being drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("chat completion cancelled")]
pub struct Cancelled;

/// A tool call named a tool the request does not carry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no tool named {name} in the request (call {id})")]
pub struct UnknownTool {
    /// The id of the offending tool call
    pub id: String,
    /// The requested tool name
    pub name: String,
}

/// A read-once byte source was read again after its first read failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("byte source already consumed by a failed read")]
pub struct StreamConsumed;

/// The model called tools again after the caller's bound on tool round trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("model kept calling tools after {0} tool round trips")]
pub struct StepLimit(pub usize);

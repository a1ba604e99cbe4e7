//! Defaults for chat completion requests

use crate::{
    ChatCompleter,
    message::Message,
    request::{ChatCompleteRequest, Temperature, ThinkingLevel},
    round_trip::RoundTrip,
};
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Chat completion defaults, usually loaded from a TOML file
///
/// ```toml
/// system = "You are a terse assistant."
/// temperature = 0.7
/// thinking_level = "low"
/// max_completion_tokens = 1024
/// max_tool_steps = 8
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The system prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// The sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Temperature>,

    /// How much effort the model spends thinking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_level: Option<ThinkingLevel>,

    /// The maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,

    /// The bound on tool round trips before the model has to answer,
    /// unbounded if unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tool_steps: Option<usize>,
}

impl Config {
    /// Parse a configuration from TOML
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).context("invalid chat completion config")
    }

    /// Load a configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&source)
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(Into::into)
    }

    /// Build a request over the given messages with these defaults applied
    pub fn request(&self, messages: Vec<Message>) -> ChatCompleteRequest {
        let mut request = ChatCompleteRequest::from(self.clone());
        request.messages = messages;
        request
    }

    /// Start a tool round trip with these defaults and step bound
    pub fn round_trip<C: ChatCompleter>(&self, completer: C, messages: Vec<Message>) -> RoundTrip<C> {
        let round_trip = RoundTrip::new(completer, self.request(messages));
        match self.max_tool_steps {
            Some(max) => round_trip.with_max_steps(max),
            None => round_trip,
        }
    }
}

impl From<Config> for ChatCompleteRequest {
    fn from(config: Config) -> Self {
        Self {
            system: config.system,
            temperature: config.temperature,
            thinking_level: config.thinking_level,
            max_completion_tokens: config.max_completion_tokens,
            ..Default::default()
        }
    }
}

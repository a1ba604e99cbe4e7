//! Chat completion request

use crate::{message::Message, schema::Schema, tool::Tool};
use anyhow::{Result, bail};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

/// A chat completion request.
///
/// Backend adapters translate this into their wire format.
#[derive(Debug, Clone, Default)]
pub struct ChatCompleteRequest {
    /// The conversation messages.
    pub messages: Vec<Message>,

    /// The system prompt.
    pub system: Option<String>,

    /// The sampling temperature.
    pub temperature: Option<Temperature>,

    /// How much effort the model should spend thinking.
    pub thinking_level: Option<ThinkingLevel>,

    /// The shape of structured output, if requested.
    pub response_schema: Option<Schema>,

    /// The tools the model may call.
    pub tools: Vec<Tool>,

    /// The maximum number of tokens to generate.
    pub max_completion_tokens: Option<u32>,
}

impl ChatCompleteRequest {
    /// Create a new request over the given messages.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// Set the system prompt.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature.
    pub fn with_temperature(mut self, temperature: Temperature) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the thinking level.
    pub fn with_thinking_level(mut self, level: ThinkingLevel) -> Self {
        self.thinking_level = Some(level);
        self
    }

    /// Request structured output of the given shape.
    pub fn with_response_schema(mut self, schema: Schema) -> Self {
        self.response_schema = Some(schema);
        self
    }

    /// Set the tools.
    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = tools;
        self
    }

    /// Add a tool.
    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tools.push(tool);
        self
    }

    /// Set the completion token limit.
    pub fn with_max_completion_tokens(mut self, max: u32) -> Self {
        self.max_completion_tokens = Some(max);
        self
    }

    /// The first tool with the given name.
    pub fn tool(&self, name: &str) -> Option<&Tool> {
        crate::tool::find(&self.tools, name)
    }
}

/// Sampling temperature within `[0.0, 2.0]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Temperature(f64);

impl Temperature {
    /// The lowest accepted temperature.
    pub const MIN: f64 = 0.0;

    /// The highest accepted temperature.
    pub const MAX: f64 = 2.0;

    /// Create a temperature, rejecting values outside the accepted range.
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || !(Self::MIN..=Self::MAX).contains(&value) {
            bail!(
                "temperature {value} is outside [{:.1}, {:.1}]",
                Self::MIN,
                Self::MAX
            );
        }
        Ok(Self(value))
    }

    /// The temperature as a float.
    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<f64> for Temperature {
    type Error = anyhow::Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for Temperature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Self::new(value).map_err(<D::Error as serde::de::Error>::custom)
    }
}

/// How much effort the model spends thinking before answering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThinkingLevel {
    None,
    Minimal,
    Low,
    Medium,
    High,
    XHigh,
    Max,
}

impl ThinkingLevel {
    /// Every level, least effort first.
    pub const ALL: [Self; 7] = [
        Self::None,
        Self::Minimal,
        Self::Low,
        Self::Medium,
        Self::High,
        Self::XHigh,
        Self::Max,
    ];

    /// The wire name of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Minimal => "minimal",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::XHigh => "xhigh",
            Self::Max => "max",
        }
    }

    /// Assert that a backend supports this level.
    ///
    /// # Panics
    ///
    /// If the level is not in `supported`. Adapters call this while building
    /// their payload, an unsupported level is a caller bug.
    pub fn ensure_supported(&self, supported: &[Self]) {
        if !supported.contains(self) {
            panic!("unsupported thinking level: {self}");
        }
    }
}

impl fmt::Display for ThinkingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThinkingLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match Self::ALL.into_iter().find(|level| level.as_str() == s) {
            Some(level) => Ok(level),
            None => bail!("unknown thinking level: {s}"),
        }
    }
}

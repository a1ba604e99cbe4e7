//! Message parts

use crate::{
    message::source::Source,
    tool::{ToolCall, ToolResult},
};
use anyhow::{Context as _, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser};
use serde_json::Value;
use std::{fmt, io::Read};

/// The variant tag of a [`MessagePart`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartType {
    Text,
    Data,
    ToolCall,
    ToolResult,
}

impl PartType {
    /// The wire name of the tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Data => "data",
            Self::ToolCall => "tool_call",
            Self::ToolResult => "tool_result",
        }
    }
}

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary content with its MIME type
#[derive(Debug, Clone)]
pub struct Data {
    /// The MIME type, e.g. `image/png`
    pub mime_type: String,

    source: Source,
}

impl Data {
    /// The bytes of the data, read at most once.
    pub fn bytes(&self) -> Result<&[u8]> {
        self.source.bytes()
    }

    /// Whether the bytes are already in memory.
    pub fn is_materialized(&self) -> bool {
        self.source.is_materialized()
    }
}

/// One fragment of a message, exactly one variant active
///
/// Variant accessors panic on the wrong variant, branch on
/// [`MessagePart::part_type`] first.
#[derive(Debug, Clone)]
pub enum MessagePart {
    /// Text, held in memory or read lazily from a byte stream
    Text(Source),

    /// Binary data
    Data(Data),

    /// A request from the model to invoke a tool
    ToolCall(ToolCall),

    /// The reply to a prior tool call
    ToolResult(ToolResult),
}

impl MessagePart {
    /// A text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(Source::from_bytes(text.into().into_bytes()))
    }

    /// A text part read lazily from `reader`.
    ///
    /// The reader is drained on first access and cached.
    pub fn text_reader(reader: impl Read + Send + 'static) -> Self {
        Self::Text(Source::from_reader(reader))
    }

    /// A data part read lazily from `reader`.
    pub fn data(mime_type: impl Into<String>, reader: impl Read + Send + 'static) -> Self {
        Self::Data(Data {
            mime_type: mime_type.into(),
            source: Source::from_reader(reader),
        })
    }

    /// A data part over bytes already in memory.
    pub fn data_bytes(mime_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Data(Data {
            mime_type: mime_type.into(),
            source: Source::from_bytes(bytes),
        })
    }

    /// A tool call part.
    pub fn tool_call(id: impl Into<String>, name: impl Into<String>, args: Value) -> Self {
        Self::ToolCall(ToolCall::new(id, name, args))
    }

    /// A tool result part.
    pub fn tool_result(result: ToolResult) -> Self {
        Self::ToolResult(result)
    }

    /// The variant tag.
    pub fn part_type(&self) -> PartType {
        match self {
            Self::Text(_) => PartType::Text,
            Self::Data(_) => PartType::Data,
            Self::ToolCall(_) => PartType::ToolCall,
            Self::ToolResult(_) => PartType::ToolResult,
        }
    }

    /// Whether this is a text part.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// The text of a text part.
    ///
    /// # Panics
    ///
    /// If this is not a text part, or the lazy source fails to read.
    pub fn as_text(&self) -> String {
        match self.try_text() {
            Ok(text) => text,
            Err(e) => panic!("error reading text: {e:#}"),
        }
    }

    /// The text of a text part, surfacing read and decode failures.
    ///
    /// # Panics
    ///
    /// If this is not a text part.
    pub fn try_text(&self) -> Result<String> {
        let Self::Text(source) = self else {
            panic!("not text type");
        };
        let bytes = source.bytes()?;
        let text = std::str::from_utf8(bytes).context("text part is not valid UTF-8")?;
        Ok(text.to_owned())
    }

    /// The data of a data part.
    ///
    /// # Panics
    ///
    /// If this is not a data part.
    pub fn as_data(&self) -> &Data {
        match self {
            Self::Data(data) => data,
            _ => panic!("not data type"),
        }
    }

    /// The tool call of a tool call part.
    ///
    /// # Panics
    ///
    /// If this is not a tool call part.
    pub fn as_tool_call(&self) -> &ToolCall {
        match self {
            Self::ToolCall(call) => call,
            _ => panic!("not tool call type"),
        }
    }

    /// The tool result of a tool result part.
    ///
    /// # Panics
    ///
    /// If this is not a tool result part.
    pub fn as_tool_result(&self) -> &ToolResult {
        match self {
            Self::ToolResult(result) => result,
            _ => panic!("not tool result type"),
        }
    }
}

impl From<ToolCall> for MessagePart {
    fn from(call: ToolCall) -> Self {
        Self::ToolCall(call)
    }
}

impl From<ToolResult> for MessagePart {
    fn from(result: ToolResult) -> Self {
        Self::ToolResult(result)
    }
}

#[derive(Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Repr {
    Text {
        text: String,
    },
    Data {
        mime_type: String,
        data: String,
    },
    ToolCall {
        tool_call: ToolCall,
    },
    ToolResult {
        tool_result: ToolResult,
    },
}

impl Serialize for MessagePart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match self {
            Self::Text(_) => Repr::Text {
                text: self.try_text().map_err(<S::Error as ser::Error>::custom)?,
            },
            Self::Data(data) => Repr::Data {
                mime_type: data.mime_type.clone(),
                data: STANDARD.encode(data.bytes().map_err(<S::Error as ser::Error>::custom)?),
            },
            Self::ToolCall(call) => Repr::ToolCall {
                tool_call: call.clone(),
            },
            Self::ToolResult(result) => Repr::ToolResult {
                tool_result: result.clone(),
            },
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MessagePart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text { text } => Self::text(text),
            Repr::Data { mime_type, data } => {
                let bytes = STANDARD.decode(data).map_err(<D::Error as de::Error>::custom)?;
                Self::data_bytes(mime_type, bytes)
            }
            Repr::ToolCall { tool_call } => Self::ToolCall(tool_call),
            Repr::ToolResult { tool_result } => Self::ToolResult(tool_result),
        })
    }
}

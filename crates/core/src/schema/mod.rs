//! Portable schema model for tool arguments and structured output.
//!
//! [`Schema`] is the provider-neutral subset of JSON Schema every backend's
//! function-calling API understands. Schemas are built once per tool, either
//! with `#[derive(Schematic)]`, by hand with the builder methods, or by
//! converting a `schemars` schema, and are immutable afterwards.

pub use generate::{MAX_DEPTH, Schematic, nested, schema_for};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

mod generate;
mod interop;

/// The data type of a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// A string
    String,
    /// A floating point number
    Number,
    /// An integer
    Integer,
    /// A boolean
    Boolean,
    /// An array, see [`Schema::items`]
    Array,
    /// An object, see [`Schema::properties`]
    Object,
}

impl SchemaType {
    /// The lowercase JSON Schema name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// The uppercase OpenAPI name used by Gemini-style function declarations.
    pub fn as_openapi(&self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Number => "NUMBER",
            Self::Integer => "INTEGER",
            Self::Boolean => "BOOLEAN",
            Self::Array => "ARRAY",
            Self::Object => "OBJECT",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recursive, provider-agnostic schema
///
/// `property_ordering` always lists the keys of `properties` in field
/// declaration order, which is also the order `properties` is kept and
/// serialized in.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// The type of the data, unset for schemas accepting any type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<SchemaType>,

    /// The description of the data
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// The title of the schema
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,

    /// The default value of the data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// An example of the data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    /// Possible values of a primitive, stringified
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enumeration: Vec<String>,

    /// The format of the data, e.g. `int32`, `double` or `email`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,

    /// Regular expression a string must match
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pattern: String,

    /// Minimum value of a number or integer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    /// Maximum value of a number or integer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    /// Minimum length of a string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    /// Maximum length of a string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    /// Minimum number of elements of an array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,

    /// Maximum number of elements of an array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    /// Schema of the elements of an array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    /// Properties of an object
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,

    /// Property names in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub property_ordering: Vec<String>,

    /// Required property names, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// The data must be valid against any of these schemas
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Schema>,
}

impl Schema {
    /// A schema of the given type.
    pub fn typed(ty: SchemaType) -> Self {
        Self {
            ty: Some(ty),
            ..Default::default()
        }
    }

    /// A string schema.
    pub fn string() -> Self {
        Self::typed(SchemaType::String)
    }

    /// A number schema.
    pub fn number() -> Self {
        Self::typed(SchemaType::Number)
    }

    /// An integer schema.
    pub fn integer() -> Self {
        Self::typed(SchemaType::Integer)
    }

    /// A boolean schema.
    pub fn boolean() -> Self {
        Self::typed(SchemaType::Boolean)
    }

    /// An array schema with the given element schema.
    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::typed(SchemaType::Array)
        }
    }

    /// An object schema without properties.
    pub fn object() -> Self {
        Self::typed(SchemaType::Object)
    }

    /// A schema accepting any value.
    pub fn any() -> Self {
        Self::default()
    }

    /// A schema accepting any of the given alternatives.
    pub fn any_of(alternatives: Vec<Schema>) -> Self {
        Self {
            any_of: alternatives,
            ..Default::default()
        }
    }

    /// Append a property, keeping `property_ordering` and `required` in
    /// insertion order.
    ///
    /// Re-adding an existing name replaces its schema in place.
    pub fn push_property(&mut self, name: impl Into<String>, schema: Schema, required: bool) {
        let name = name.into();
        if self.properties.insert(name.clone(), schema).is_none() {
            self.property_ordering.push(name.clone());
        }

        let listed = self.required.iter().position(|r| *r == name);
        match (required, listed) {
            (true, None) => self.required.push(name),
            (false, Some(index)) => {
                self.required.remove(index);
            }
            _ => {}
        }
    }

    /// Add a property, builder style.
    pub fn with_property(mut self, name: impl Into<String>, schema: Schema, required: bool) -> Self {
        self.push_property(name, schema, required);
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the format.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Set the allowed values.
    pub fn with_enum(mut self, values: Vec<String>) -> Self {
        self.enumeration = values;
        self
    }

    /// Set the numeric bounds.
    pub fn with_range(mut self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties.get(name)
    }

    /// Properties in declaration order.
    pub fn ordered_properties(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.property_ordering
            .iter()
            .filter_map(|name| self.properties.get(name).map(|s| (name.as_str(), s)))
    }

    /// Whether the named property is required.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

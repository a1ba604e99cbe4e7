//! Conversion from JSON Schema documents, e.g. those produced by `schemars`.

use crate::schema::{Schema, SchemaType};
use anyhow::{Result, bail};
use schemars::{JsonSchema, generate::SchemaSettings};
use serde_json::{Map, Value};

impl Schema {
    /// Generate a schema for `T` through its `schemars::JsonSchema` impl.
    ///
    /// Subschemas are inlined so the result has no references.
    pub fn from_schemars<T: JsonSchema>() -> Result<Self> {
        let generator = SchemaSettings::draft2020_12()
            .with(|settings| settings.inline_subschemas = true)
            .into_generator();
        Self::try_from(&generator.into_root_schema_for::<T>())
    }

    /// Convert a JSON Schema document into the portable model.
    ///
    /// Nullable types collapse to their non-null member, `oneOf` is read as
    /// `anyOf`, enum values are stringified and only the first example is
    /// kept. References are rejected.
    pub fn from_json_schema(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(true) => Ok(Self::any()),
            Value::Bool(false) => bail!("the `false` schema has no portable representation"),
            Value::Object(map) => convert(map),
            other => bail!("expected a schema object, found {other}"),
        }
    }
}

impl TryFrom<&schemars::Schema> for Schema {
    type Error = anyhow::Error;

    fn try_from(schema: &schemars::Schema) -> Result<Self> {
        Self::from_json_schema(schema.as_value())
    }
}

fn convert(map: &Map<String, Value>) -> Result<Schema> {
    if let Some(reference) = map.get("$ref") {
        bail!("schema reference {reference} cannot be converted, inline subschemas first");
    }

    let mut schema = Schema {
        description: string(map, "description"),
        title: string(map, "title"),
        format: string(map, "format"),
        pattern: string(map, "pattern"),
        default: map.get("default").cloned(),
        example: match map.get("examples") {
            Some(Value::Array(examples)) => examples.first().cloned(),
            _ => map.get("example").cloned(),
        },
        minimum: map.get("minimum").and_then(Value::as_f64),
        maximum: map.get("maximum").and_then(Value::as_f64),
        min_length: map.get("minLength").and_then(Value::as_u64),
        max_length: map.get("maxLength").and_then(Value::as_u64),
        min_items: map.get("minItems").and_then(Value::as_u64),
        max_items: map.get("maxItems").and_then(Value::as_u64),
        ..Default::default()
    };

    match map.get("type") {
        Some(Value::String(name)) => schema.ty = ty(name),
        Some(Value::Array(names)) => {
            let types = names
                .iter()
                .filter_map(Value::as_str)
                .filter_map(ty)
                .collect::<Vec<_>>();
            match types.as_slice() {
                [single] => schema.ty = Some(*single),
                [] => {}
                many => schema.any_of = many.iter().map(|ty| Schema::typed(*ty)).collect(),
            }
        }
        _ => {}
    }

    if let Some(Value::Array(values)) = map.get("enum") {
        schema.enumeration = values.iter().filter_map(stringify).collect();
    } else if let Some(value) = map.get("const") {
        schema.enumeration = stringify(value).into_iter().collect();
    }

    if let Some(items) = map.get("items") {
        schema.items = Some(Box::new(Schema::from_json_schema(items)?));
    }

    if let Some(Value::Object(properties)) = map.get("properties") {
        for (name, property) in properties {
            schema.push_property(name.as_str(), Schema::from_json_schema(property)?, false);
        }
    }
    if let Some(Value::Array(required)) = map.get("required") {
        schema.required = required
            .iter()
            .filter_map(Value::as_str)
            .map(ToOwned::to_owned)
            .collect();
    }

    let mut alternatives = Vec::new();
    for key in ["anyOf", "oneOf"] {
        if let Some(Value::Array(values)) = map.get(key) {
            for value in values.iter().filter(|value| !is_null(value)) {
                alternatives.push(Schema::from_json_schema(value)?);
            }
        }
    }

    // `Option<T>` shows up as `anyOf: [T, null]`
    if alternatives.len() == 1 && schema.ty.is_none() && schema.any_of.is_empty() {
        let inner = alternatives.remove(0);
        return Ok(merge(schema, inner));
    }
    schema.any_of.extend(alternatives);
    Ok(schema)
}

fn ty(name: &str) -> Option<SchemaType> {
    Some(match name {
        "string" => SchemaType::String,
        "number" => SchemaType::Number,
        "integer" => SchemaType::Integer,
        "boolean" => SchemaType::Boolean,
        "array" => SchemaType::Array,
        "object" => SchemaType::Object,
        _ => return None,
    })
}

fn string(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .unwrap_or_default()
}

fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn is_null(value: &Value) -> bool {
    value.get("type").and_then(Value::as_str) == Some("null")
}

/// Fill the gaps of `outer` with the keywords of `inner`.
fn merge(outer: Schema, inner: Schema) -> Schema {
    let (properties, property_ordering) = if outer.properties.is_empty() {
        (inner.properties, inner.property_ordering)
    } else {
        (outer.properties, outer.property_ordering)
    };

    Schema {
        ty: outer.ty.or(inner.ty),
        description: pick(outer.description, inner.description),
        title: pick(outer.title, inner.title),
        format: pick(outer.format, inner.format),
        pattern: pick(outer.pattern, inner.pattern),
        default: outer.default.or(inner.default),
        example: outer.example.or(inner.example),
        enumeration: fill(outer.enumeration, inner.enumeration),
        minimum: outer.minimum.or(inner.minimum),
        maximum: outer.maximum.or(inner.maximum),
        min_length: outer.min_length.or(inner.min_length),
        max_length: outer.max_length.or(inner.max_length),
        min_items: outer.min_items.or(inner.min_items),
        max_items: outer.max_items.or(inner.max_items),
        items: outer.items.or(inner.items),
        properties,
        property_ordering,
        required: fill(outer.required, inner.required),
        any_of: fill(outer.any_of, inner.any_of),
    }
}

fn pick(outer: String, inner: String) -> String {
    if outer.is_empty() { inner } else { outer }
}

fn fill<T>(outer: Vec<T>, inner: Vec<T>) -> Vec<T> {
    if outer.is_empty() { inner } else { outer }
}

//! Tests for conversion from JSON Schema documents.

#![allow(dead_code)]

use gai_core::{Schema, SchemaType};
use schemars::JsonSchema;
use serde_json::json;

/// A weather lookup
#[derive(JsonSchema)]
struct Weather {
    /// The city to look up
    city: String,
    days: Option<u8>,
    unit: Unit,
    tags: Vec<String>,
}

#[derive(JsonSchema)]
#[serde(rename_all = "lowercase")]
enum Unit {
    Celsius,
    Fahrenheit,
}

#[test]
fn converts_schemars_output() {
    let schema = Schema::from_schemars::<Weather>().unwrap();
    assert_eq!(schema.ty, Some(SchemaType::Object));
    assert_eq!(schema.description, "A weather lookup");
    assert_eq!(
        schema.property_ordering,
        vec!["city", "days", "unit", "tags"]
    );
    assert_eq!(schema.properties["city"].description, "The city to look up");
    assert_eq!(schema.properties["days"].ty, Some(SchemaType::Integer));
    assert_eq!(
        schema.properties["unit"].enumeration,
        vec!["celsius", "fahrenheit"]
    );
    assert_eq!(
        schema.properties["tags"].items.as_deref(),
        Some(&Schema::string())
    );
    assert!(schema.is_required("city"));
    assert!(!schema.is_required("days"));
}

#[test]
fn converts_json_schema_keywords() {
    let schema = Schema::from_json_schema(&json!({
        "type": "object",
        "properties": {
            "b": { "type": ["string", "null"], "minLength": 2, "examples": ["xy", "z"] },
            "a": { "type": "number", "minimum": 0, "maximum": 1.5, "default": 1 },
            "c": { "oneOf": [{ "type": "integer" }, { "type": "boolean" }] },
            "d": { "const": 3 }
        },
        "required": ["a"]
    }))
    .unwrap();

    assert_eq!(schema.property_ordering, vec!["b", "a", "c", "d"]);
    assert_eq!(schema.required, vec!["a"]);

    let b = &schema.properties["b"];
    assert_eq!(b.ty, Some(SchemaType::String));
    assert_eq!(b.min_length, Some(2));
    assert_eq!(b.example, Some(json!("xy")));

    let a = &schema.properties["a"];
    assert_eq!(a.minimum, Some(0.0));
    assert_eq!(a.maximum, Some(1.5));
    assert_eq!(a.default, Some(json!(1)));

    let c = &schema.properties["c"];
    assert_eq!(c.any_of, vec![Schema::integer(), Schema::boolean()]);

    assert_eq!(schema.properties["d"].enumeration, vec!["3"]);
}

#[test]
fn nullable_any_of_collapses() {
    let schema = Schema::from_json_schema(&json!({
        "description": "maybe a count",
        "anyOf": [{ "type": "integer", "minimum": 1 }, { "type": "null" }]
    }))
    .unwrap();
    assert_eq!(schema.ty, Some(SchemaType::Integer));
    assert_eq!(schema.minimum, Some(1.0));
    assert_eq!(schema.description, "maybe a count");
    assert!(schema.any_of.is_empty());
}

#[test]
fn nullable_collapse_keeps_outer_keywords() {
    let schema = Schema::from_json_schema(&json!({
        "properties": {
            "a": { "type": "string" },
            "b": { "type": "integer" }
        },
        "required": ["a"],
        "anyOf": [
            { "type": "object", "required": ["b"], "properties": { "c": { "type": "boolean" } } },
            { "type": "null" }
        ]
    }))
    .unwrap();
    assert_eq!(schema.ty, Some(SchemaType::Object));
    assert_eq!(schema.property_ordering, vec!["a", "b"]);
    assert_eq!(schema.properties["a"], Schema::string());
    assert_eq!(schema.required, vec!["a"]);
    assert!(schema.property("c").is_none());

    let value = serde_json::to_value(&schema).unwrap();
    assert_eq!(value["propertyOrdering"], json!(["a", "b"]));

    let schema = Schema::from_json_schema(&json!({
        "anyOf": [{ "type": "object", "properties": { "c": { "type": "boolean" } } }, { "type": "null" }]
    }))
    .unwrap();
    assert_eq!(schema.property_ordering, vec!["c"]);
}

#[test]
fn rejects_unrepresentable_documents() {
    assert!(Schema::from_json_schema(&json!({ "$ref": "#/$defs/Thing" })).is_err());
    assert!(Schema::from_json_schema(&json!(false)).is_err());
    assert!(Schema::from_json_schema(&json!("object")).is_err());
    assert_eq!(Schema::from_json_schema(&json!(true)).unwrap(), Schema::any());
}

#[test]
fn try_from_schemars_schema() {
    let raw = schemars::json_schema!({
        "type": "array",
        "items": { "type": "boolean" },
        "maxItems": 3
    });
    let schema = Schema::try_from(&raw).unwrap();
    assert_eq!(schema, {
        let mut expected = Schema::array(Schema::boolean());
        expected.max_items = Some(3);
        expected
    });
}

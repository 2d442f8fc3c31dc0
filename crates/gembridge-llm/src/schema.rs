//! Tool parameter schema sanitization
//!
//! Gemini validates function declarations against a restricted OpenAPI-style
//! dialect. Caller-supplied JSON Schemas are rewritten into that dialect by
//! dropping unsupported keywords and folding `type` arrays into `nullable`.
//!
//! Keyword stripping only happens where a key is a schema keyword. Maps keyed
//! by property or definition names (`properties`, `$defs`, ...) keep every
//! name, so a parameter literally called `title` survives; its value is still
//! sanitized as a schema. Data-valued keywords (`enum`, `const`, `required`)
//! are copied verbatim.

use serde_json::{Map, Value};

/// Keywords the Gemini schema validator rejects
pub const STRIPPED_KEYWORDS: [&str; 14] = [
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "minLength",
    "maxLength",
    "pattern",
    "additionalProperties",
    "title",
    "default",
    "examples",
    "$schema",
    "$id",
];

/// Keywords whose value maps names to sub-schemas
const NAMED_SCHEMA_MAPS: [&str; 4] = ["properties", "patternProperties", "$defs", "definitions"];

/// Keywords whose value is plain data rather than a schema
const DATA_KEYWORDS: [&str; 4] = ["enum", "const", "required", "example"];

/// Sanitize a tool parameter schema into Gemini's dialect
///
/// Returns a new tree; the input is left untouched. Applying the function to
/// its own output returns the same value.
pub fn sanitize_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(sanitize_object(map)),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_schema).collect()),
        other => other.clone(),
    }
}

fn sanitize_object(map: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::with_capacity(map.len());

    for (key, value) in map {
        let key_str = key.as_str();
        if STRIPPED_KEYWORDS.contains(&key_str) {
            continue;
        }

        if key_str == "type" {
            fold_type(value, &mut out);
        } else if NAMED_SCHEMA_MAPS.contains(&key_str) {
            out.insert(key.clone(), sanitize_named_schemas(value));
        } else if DATA_KEYWORDS.contains(&key_str) {
            out.insert(key.clone(), value.clone());
        } else {
            out.insert(key.clone(), sanitize_schema(value));
        }
    }

    out
}

/// Sanitize each value of a name -> schema map, keeping every name
fn sanitize_named_schemas(value: &Value) -> Value {
    match value {
        Value::Object(named) => Value::Object(
            named
                .iter()
                .map(|(name, schema)| (name.clone(), sanitize_schema(schema)))
                .collect(),
        ),
        other => sanitize_schema(other),
    }
}

/// Collapse `type: [..]` to the first non-null entry, marking `nullable`
fn fold_type(value: &Value, out: &mut Map<String, Value>) {
    let Value::Array(alternatives) = value else {
        out.insert("type".to_owned(), value.clone());
        return;
    };

    let is_null = |t: &Value| t.as_str() == Some("null");

    if let Some(first) = alternatives.iter().find(|t| !is_null(t)) {
        out.insert("type".to_owned(), first.clone());
    }
    if alternatives.iter().any(is_null) {
        out.insert("nullable".to_owned(), Value::Bool(true));
    }
}

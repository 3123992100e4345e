//! JSON schemas for structured generative output.
//!
//! Schemas are generated from the response structs with `schemars` and then
//! normalized for strict structured-output modes:
//! 1. `additionalProperties: false` on every object
//! 2. every property listed in `required`, nullable ones included
//! 3. `$ref`s inlined and the `definitions` table dropped

use schemars::{schema_for, JsonSchema};
use serde_json::{Map, Value};

/// Generate a strict output schema for `T`.
pub fn output_schema<T: JsonSchema>() -> Value {
    let mut root = serde_json::to_value(schema_for!(T)).unwrap_or_default();

    let definitions = match &mut root {
        Value::Object(map) => {
            map.remove("$schema");
            map.remove("definitions").unwrap_or(Value::Null)
        }
        _ => Value::Null,
    };

    normalize(&mut root, &definitions);
    root
}

fn normalize(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(target) = resolve_ref(map, definitions) {
                *value = target;
                normalize(value, definitions);
                return;
            }

            if map.get("type").and_then(Value::as_str) == Some("object") {
                close_object(map);
            }

            for child in map.values_mut() {
                normalize(child, definitions);
            }
        }
        Value::Array(items) => {
            for item in items {
                normalize(item, definitions);
            }
        }
        _ => {}
    }
}

/// Look up `{"$ref": "#/definitions/Name"}` in the definitions table.
fn resolve_ref(map: &Map<String, Value>, definitions: &Value) -> Option<Value> {
    let name = map
        .get("$ref")?
        .as_str()?
        .strip_prefix("#/definitions/")?;
    definitions.get(name).cloned()
}

fn close_object(map: &mut Map<String, Value>) {
    map.insert("additionalProperties".to_string(), Value::Bool(false));

    let keys: Vec<Value> = map
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| props.keys().cloned().map(Value::String).collect())
        .unwrap_or_default();
    map.insert("required".to_string(), Value::Array(keys));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Inner {
        label: Option<String>,
        weight: f64,
    }

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Outer {
        name: String,
        items: Vec<Inner>,
    }

    #[test]
    fn test_schema_is_closed_and_inlined() {
        let schema = output_schema::<Outer>();
        let text = serde_json::to_string(&schema).unwrap();

        assert!(!text.contains("$ref"));
        assert!(schema.get("definitions").is_none());
        assert!(schema.get("$schema").is_none());
        assert_eq!(schema["additionalProperties"], Value::Bool(false));

        let inner = &schema["properties"]["items"]["items"];
        assert_eq!(inner["type"], "object");
        assert_eq!(inner["additionalProperties"], Value::Bool(false));

        let required: Vec<&str> = inner["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert!(required.contains(&"label"));
        assert!(required.contains(&"weight"));
    }
}

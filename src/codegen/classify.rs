//! Schema classification heuristics
//!
//! Layers and groups are recognized by property shape, not by any explicit
//! marker in the schemas: a layer carries `do_objectID` and `frame`, a
//! group is a layer with a `layers` array. Objects are anything declaring
//! a `_class` discriminator.

use serde_json::Value;

fn property<'a>(schema: &'a Value, key: &str) -> Option<&'a Value> {
    schema.get("properties").and_then(|p| p.get(key))
}

/// Does the schema represent an object in the model (has a `_class`)?
pub fn is_object_schema(schema: &Value) -> bool {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|p| p.contains_key("_class"))
        .unwrap_or(false)
}

/// Heuristic: a layer declares both `do_objectID` and `frame` properties.
pub fn is_layer_schema(schema: &Value) -> bool {
    matches!(property(schema, "do_objectID"), Some(Value::Object(_)))
        && matches!(property(schema, "frame"), Some(Value::Object(_)))
}

/// Heuristic: a group is a layer that also declares a `layers` property.
pub fn is_group_schema(schema: &Value) -> bool {
    is_layer_schema(schema) && matches!(property(schema, "layers"), Some(Value::Object(_)))
}

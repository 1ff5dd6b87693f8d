//! Polymorphism wiring
//!
//! Object schemas carry a `_class` string constant; heterogeneous
//! containers (layer lists, style collections) can only be decoded by
//! dispatching on it at runtime. This module builds the discriminator
//! table and attaches decoders to every class field whose annotation is a
//! union, either directly or inside `Optional` or `List`.

use indexmap::IndexMap;
use serde_json::Value;

use super::decl::{Annotation, DeclGraph, Declaration, Decoder};
use super::names;

/// Shape of a field annotation with respect to unions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionShape {
    Union,
    ListUnion,
    OptionalUnion,
    NotUnion,
}

/// Classify an annotation as union-bearing or not.
pub fn union_shape(annotation: &Annotation) -> UnionShape {
    match annotation {
        Annotation::Union(_) => UnionShape::Union,
        Annotation::List(inner) if matches!(**inner, Annotation::Union(_)) => UnionShape::ListUnion,
        Annotation::Optional(inner) if matches!(**inner, Annotation::Union(_)) => {
            UnionShape::OptionalUnion
        }
        _ => UnionShape::NotUnion,
    }
}

/// Attach a decoder to every union-bearing field of every class in the
/// graph. Plain and optional unions decode one object; list unions map
/// the decoder over the list.
pub fn inject_decoders(graph: &mut DeclGraph) {
    for decl in graph.decls_mut() {
        if let Declaration::Class(class) = decl {
            for field in &mut class.fields {
                field.decoder = match union_shape(&field.annotation) {
                    UnionShape::Union | UnionShape::OptionalUnion => Some(Decoder::ToObject),
                    UnionShape::ListUnion => Some(Decoder::ListToObject),
                    UnionShape::NotUnion => None,
                };
            }
        }
    }
}

/// The `_class` constant declared by an object schema, if any.
pub fn class_constant(schema: &Value) -> Option<&str> {
    schema
        .get("properties")
        .and_then(|p| p.get("_class"))
        .and_then(|c| c.get("const"))
        .and_then(Value::as_str)
}

/// Collect the distinct non-empty `_class` constants, sorted.
pub fn collect_class_values(definitions: &IndexMap<String, Value>) -> Vec<String> {
    let mut values: Vec<String> = definitions
        .values()
        .filter_map(class_constant)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect();
    values.sort();
    values.dedup();
    values
}

/// Build the discriminator table: `_class` constant to class identifier.
/// The first definition declaring a constant wins.
pub fn build_class_map(definitions: &IndexMap<String, Value>) -> IndexMap<String, String> {
    let mut map = IndexMap::new();
    for class_value in collect_class_values(definitions) {
        for schema in definitions.values() {
            if class_constant(schema) != Some(class_value.as_str()) {
                continue;
            }
            if let Some(id) = schema.get("$id").and_then(Value::as_str) {
                map.insert(class_value.clone(), names::extract_id(id));
                break;
            }
        }
    }
    map
}

//! Recursive schema translation
//!
//! `ModelBuilder` is the heart of the generator: it walks raw schema
//! values and lowers each one to an annotation or a registered top-level
//! declaration. The input is dynamic JSON, so every dispatch site narrows
//! explicitly rather than deserializing into a typed schema record.
//!
//! Naming of nested anonymous objects follows the `<parent><Key>` rule:
//! the identifier hint accumulates the capitalized property key on each
//! property descent, and arrays, `oneOf` items and `patternProperties`
//! values pass the hint through unchanged.

use serde_json::Value;

use crate::error::{Result, SketchError};

use super::decl::{
    AliasDecl, Annotation, ClassDecl, DeclGraph, Declaration, EnumDecl, Field, LiteralValue,
    Primitive,
};
use super::imports::ImportRegistry;
use super::names;

/// Result of translating a single schema node.
enum Translated {
    Annot(Annotation),
    Class(ClassDecl),
}

/// Builds the declaration graph from top-level schema definitions.
#[derive(Debug, Default)]
pub struct ModelBuilder {
    graph: DeclGraph,
    imports: ImportRegistry,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &DeclGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut DeclGraph {
        &mut self.graph
    }

    pub fn imports_mut(&mut self) -> &mut ImportRegistry {
        &mut self.imports
    }

    pub fn into_parts(self) -> (DeclGraph, ImportRegistry) {
        (self.graph, self.imports)
    }

    /// Register a top-level definition under the identifier taken from its
    /// `$id` (or `Unknown` when absent).
    pub fn add_top_level(&mut self, schema: &Value) -> Result<()> {
        let identifier =
            names::extract_id(schema.get("$id").and_then(Value::as_str).unwrap_or("Unknown"));

        if let (Some(values), Some(descriptions)) = (
            schema.get("enum").and_then(Value::as_array),
            schema.get("enumDescriptions").and_then(Value::as_array),
        ) {
            let decl = self.enum_decl(&identifier, descriptions, values)?;
            return self
                .graph
                .insert(identifier, schema.clone(), Declaration::Enum(decl));
        }

        match self.node(&identifier, schema, true)? {
            Translated::Class(class) => {
                self.graph
                    .insert(identifier, schema.clone(), Declaration::Class(class))
            }
            Translated::Annot(annotation) => self.graph.insert(
                identifier.clone(),
                schema.clone(),
                Declaration::Alias(AliasDecl {
                    name: identifier,
                    annotation,
                }),
            ),
        }
    }

    /// Translate a schema to an annotation, registering any nested
    /// anonymous classes along the way.
    pub fn translate_annotation(&mut self, hint: &str, schema: &Value) -> Result<Annotation> {
        match self.node(hint, schema, false)? {
            Translated::Annot(annotation) => Ok(annotation),
            // `node` only surfaces a class at top level.
            Translated::Class(class) => Ok(Annotation::Named {
                id: class.name,
                quoted: true,
            }),
        }
    }

    fn enum_decl(
        &mut self,
        identifier: &str,
        descriptions: &[Value],
        values: &[Value],
    ) -> Result<EnumDecl> {
        self.imports.require_enum_base();
        let mut members: Vec<(String, LiteralValue)> = Vec::with_capacity(values.len());
        for (description, value) in descriptions.iter().zip(values.iter()) {
            let description = description.as_str().ok_or_else(|| {
                SketchError::UnsupportedSchema(format!(
                    "non-string enumDescription {description} in {identifier}"
                ))
            })?;
            let existing: Vec<String> = members.iter().map(|(name, _)| name.clone()).collect();
            let name = names::enum_member(description, &existing);
            members.push((name, LiteralValue::from_json(value)?));
        }
        Ok(EnumDecl {
            name: identifier.to_string(),
            members,
        })
    }

    fn node(&mut self, hint: &str, schema: &Value, top_level: bool) -> Result<Translated> {
        let annot = match schema.get("type").and_then(Value::as_str) {
            Some("string") => match schema.get("enum").and_then(Value::as_array) {
                Some(values) => self.literal_union(values)?,
                None => Annotation::Primitive(Primitive::Str),
            },
            Some("number") => {
                if schema.get("enum").is_some() {
                    // The target language has no float literal types.
                    return Err(SketchError::UnsupportedSchema(format!(
                        "enum not supported for number in {hint}"
                    )));
                }
                Annotation::Primitive(Primitive::Float)
            }
            Some("integer") => match schema.get("enum").and_then(Value::as_array) {
                Some(values) => self.literal_union(values)?,
                None => Annotation::Primitive(Primitive::Int),
            },
            Some("boolean") => match schema.get("enum").and_then(Value::as_array) {
                Some(values) => self.literal_union(values)?,
                None => Annotation::Primitive(Primitive::Bool),
            },
            Some("null") => self.literal(LiteralValue::Null),
            Some("object") => return self.object_node(hint, schema, top_level),
            Some("array") => match schema.get("items") {
                Some(items @ Value::Object(_)) => {
                    let inner = self.translate_annotation(hint, items)?;
                    self.list_of(inner)
                }
                _ => {
                    let inner = self.any();
                    self.list_of(inner)
                }
            },
            _ => {
                if let Some(constant) = schema.get("const") {
                    self.constant(constant)?
                } else if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
                    Annotation::Named {
                        id: names::extract_ref(reference),
                        quoted: !top_level,
                    }
                } else if let Some(items) = schema.get("oneOf").and_then(Value::as_array) {
                    let nodes = items
                        .iter()
                        .map(|item| self.translate_annotation(hint, item))
                        .collect::<Result<Vec<_>>>()?;
                    self.union(nodes)
                } else {
                    self.any()
                }
            }
        };
        Ok(Translated::Annot(annot))
    }

    fn object_node(&mut self, hint: &str, schema: &Value, top_level: bool) -> Result<Translated> {
        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            if schema.get("additionalProperties").and_then(Value::as_bool) == Some(true) {
                let value = self.any();
                return Ok(Translated::Annot(self.dict_str(value)));
            }

            let required: Vec<&str> = schema
                .get("required")
                .and_then(Value::as_array)
                .map(|keys| keys.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();

            // Stable partition: required fields first, source order within
            // each side.
            let (required_props, optional_props): (Vec<_>, Vec<_>) = properties
                .iter()
                .partition(|(key, _)| required.contains(&key.as_str()));

            let mut fields: Vec<Field> = Vec::with_capacity(properties.len());
            for (key, sub_schema) in required_props.into_iter().chain(optional_props) {
                let child_hint = format!("{}{}", hint, names::upper_first(key));
                let annotation = self.translate_annotation(&child_hint, sub_schema)?;
                let is_required = required.contains(&key.as_str());
                let siblings: Vec<String> = fields.iter().map(|f| f.name.clone()).collect();
                let name = names::field_name(key, &siblings);
                let annotation = if is_required {
                    annotation
                } else {
                    self.optional(annotation)
                };
                fields.push(Field {
                    name,
                    key: key.clone(),
                    annotation,
                    required: is_required,
                    decoder: None,
                });
            }
            self.imports.require_json_mixin();

            if top_level {
                return Ok(Translated::Class(ClassDecl {
                    name: hint.to_string(),
                    fields,
                }));
            }
            let name = names::class_name(hint, |candidate| self.graph.contains(candidate));
            let class = ClassDecl {
                name: name.clone(),
                fields,
            };
            self.graph
                .insert(name.clone(), schema.clone(), Declaration::Class(class))?;
            return Ok(Translated::Annot(Annotation::Named {
                id: name,
                quoted: true,
            }));
        }

        if let Some(patterns) = schema.get("patternProperties").and_then(Value::as_object) {
            let nodes = patterns
                .values()
                .map(|pattern_schema| self.translate_annotation(hint, pattern_schema))
                .collect::<Result<Vec<_>>>()?;
            let value = self.union(nodes);
            return Ok(Translated::Annot(self.dict_str(value)));
        }

        Ok(Translated::Annot(self.any()))
    }

    fn constant(&mut self, value: &Value) -> Result<Annotation> {
        match value {
            Value::String(s) => Ok(self.literal(LiteralValue::Str(s.clone()))),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(self.literal(LiteralValue::Int(i)))
                } else if let Some(f) = n.as_f64() {
                    Ok(self.literal(LiteralValue::Float(f)))
                } else {
                    Err(SketchError::UnsupportedSchema(format!(
                        "unsupported const value {n}"
                    )))
                }
            }
            other => Err(SketchError::UnsupportedSchema(format!(
                "unsupported const value {other}"
            ))),
        }
    }

    fn literal_union(&mut self, values: &[Value]) -> Result<Annotation> {
        let literals = values
            .iter()
            .map(|value| {
                let literal = LiteralValue::from_json(value)?;
                Ok(self.literal(literal))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.union(literals))
    }

    fn literal(&mut self, value: LiteralValue) -> Annotation {
        self.imports.require_typing("Literal");
        Annotation::Literal(value)
    }

    fn union(&mut self, mut nodes: Vec<Annotation>) -> Annotation {
        match nodes.len() {
            0 => self.any(),
            1 => nodes.remove(0),
            _ => {
                self.imports.require_typing("Union");
                Annotation::Union(nodes)
            }
        }
    }

    fn optional(&mut self, annotation: Annotation) -> Annotation {
        self.imports.require_typing("Optional");
        Annotation::Optional(Box::new(annotation))
    }

    fn list_of(&mut self, annotation: Annotation) -> Annotation {
        self.imports.require_typing("List");
        Annotation::List(Box::new(annotation))
    }

    fn dict_str(&mut self, value: Annotation) -> Annotation {
        self.imports.require_typing("Dict");
        Annotation::Dict(
            Box::new(Annotation::Primitive(Primitive::Str)),
            Box::new(value),
        )
    }

    fn any(&mut self) -> Annotation {
        self.imports.require_typing("Any");
        Annotation::Any
    }
}

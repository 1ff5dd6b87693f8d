//! Code generation pipeline
//!
//! Turns a loaded schema bundle into one self-contained Python module.
//!
//! Stages:
//! 1. Merge the `definitions` of the document, fileFormat, meta and user
//!    schemas into one ordered map (last writer wins on duplicate keys).
//! 2. Synthesize the umbrella definitions (`Contents`, `Document`,
//!    `AnyLayer`, `AnyGroup`, `AnyObject`, `ClassValue`).
//! 3. Translate every definition into the declaration graph.
//! 4. Wire polymorphic decoders and build the discriminator table.
//! 5. Render the module and write it out in one shot.
//!
//! The pipeline is synchronous and deterministic: identical schema inputs
//! produce byte-identical source.

pub mod builder;
pub mod classify;
pub mod decl;
pub mod decoders;
pub mod imports;
pub mod names;
pub mod python;

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::Result;
use crate::schemas::SchemaBundle;

pub use builder::ModelBuilder;
pub use decl::{Annotation, DeclGraph, Declaration};
pub use decoders::UnionShape;

/// Output of a generation run.
#[derive(Debug, Clone)]
pub struct GeneratedModule {
    /// Generated Python source
    pub source: String,
    /// Number of top-level declarations in the module
    pub declaration_count: usize,
}

/// Generate the typed module for a schema bundle.
pub fn generate_module(bundle: &SchemaBundle) -> Result<GeneratedModule> {
    let definitions = merge_definitions(bundle);
    debug!(definitions = definitions.len(), "merged schema definitions");

    let class_values = decoders::collect_class_values(&definitions);
    let all_definitions = with_synthetic_definitions(&definitions, &class_values, bundle);

    let mut builder = ModelBuilder::new();
    for schema in all_definitions.values() {
        builder.add_top_level(schema)?;
    }

    // The discriminator table annotation needs `Type`; everything else was
    // requested during translation.
    builder.imports_mut().require_typing("Type");
    decoders::inject_decoders(builder.graph_mut());
    let class_map = decoders::build_class_map(&definitions);

    let (graph, imports) = builder.into_parts();
    let declaration_count = graph.len();
    let source = python::render_module(
        &imports,
        &[python::TO_OBJECT_DEF.to_string()],
        &graph,
        &[python::render_class_map(&class_map)],
    );

    info!(
        declarations = declaration_count,
        classes = class_map.len(),
        "generated module"
    );
    Ok(GeneratedModule {
        source,
        declaration_count,
    })
}

/// Generate and write the module. The target file is written only once
/// the module is fully built, so a failed run leaves no partial output.
pub fn generate_to_path(out: &Path, bundle: &SchemaBundle) -> Result<GeneratedModule> {
    let module = generate_module(bundle)?;
    fs::write(out, &module.source)?;
    info!(path = %out.display(), "wrote generated module");
    Ok(module)
}

/// Union of the `definitions` maps of the four relevant schemas, in the
/// order document, fileFormat, meta, user. Duplicate keys keep their first
/// position and take the last value, like a Python dict merge.
fn merge_definitions(bundle: &SchemaBundle) -> IndexMap<String, Value> {
    let mut definitions = IndexMap::new();
    for schema in [
        &bundle.document,
        &bundle.file_format,
        &bundle.meta,
        &bundle.user,
    ] {
        if let Some(defs) = schema.get("definitions").and_then(Value::as_object) {
            for (key, definition) in defs {
                definitions.insert(key.clone(), definition.clone());
            }
        }
    }
    definitions
}

/// A `oneOf` of `$ref`s over every definition matching the predicate, in
/// definition order.
fn ref_union<F>(
    definitions: &IndexMap<String, Value>,
    description: &str,
    id: &str,
    predicate: F,
) -> Value
where
    F: Fn(&Value) -> bool,
{
    let refs: Vec<Value> = definitions
        .values()
        .filter(|schema| predicate(schema))
        .filter_map(|schema| schema.get("$id"))
        .map(|target| json!({ "$ref": target }))
        .collect();
    json!({
        "description": description,
        "$id": id,
        "oneOf": refs,
    })
}

fn reidentified(schema: &Value, id: &str) -> Value {
    let mut schema = schema.clone();
    if let Some(object) = schema.as_object_mut() {
        object.insert("$id".to_string(), json!(id));
    }
    schema
}

/// The merged definitions plus the six synthetic top-level schemas.
fn with_synthetic_definitions(
    definitions: &IndexMap<String, Value>,
    class_values: &[String],
    bundle: &SchemaBundle,
) -> IndexMap<String, Value> {
    let mut all = definitions.clone();
    all.insert(
        "Contents".to_string(),
        reidentified(&bundle.file_format, "#Contents"),
    );
    all.insert(
        "Document".to_string(),
        reidentified(&bundle.document, "#Document"),
    );
    all.insert(
        "AnyLayer".to_string(),
        ref_union(
            definitions,
            "Union of all layers",
            "#AnyLayer",
            classify::is_layer_schema,
        ),
    );
    all.insert(
        "AnyGroup".to_string(),
        ref_union(
            definitions,
            "Union of all group layers",
            "#AnyGroup",
            classify::is_group_schema,
        ),
    );
    all.insert(
        "AnyObject".to_string(),
        ref_union(
            definitions,
            "Union of all objects, i.e. objects with a _class property",
            "#AnyObject",
            classify::is_object_schema,
        ),
    );
    all.insert(
        "ClassValue".to_string(),
        json!({
            "description": "Enum of all possible _class property values",
            "$id": "#ClassValue",
            "enum": class_values,
            "enumDescriptions": class_values,
        }),
    );
    all
}

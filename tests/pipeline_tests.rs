//! Full-pipeline generation tests
//!
//! Runs the whole codegen pipeline over a small synthetic schema bundle
//! and checks the wiring that only shows up at module scope: umbrella
//! definitions, decoder injection, the discriminator table, and emit
//! idempotence.

use serde_json::json;
use sketch_document::codegen::generate_module;
use sketch_document::schemas::SchemaBundle;
use sketch_document::SketchError;

fn sample_bundle() -> SchemaBundle {
    let document = json!({
        "type": "object",
        "properties": {
            "_class": {"const": "document"},
            "do_objectID": {"type": "string"},
            "pages": {"type": "array", "items": {"$ref": "#Artboard"}}
        },
        "required": ["_class", "do_objectID", "pages"],
        "definitions": {
            "Rect": {
                "$id": "#Rect",
                "type": "object",
                "properties": {
                    "_class": {"const": "rect"},
                    "x": {"type": "number"},
                    "y": {"type": "number"}
                },
                "required": ["_class", "x", "y"]
            },
            "Artboard": {
                "$id": "#Artboard",
                "type": "object",
                "properties": {
                    "_class": {"const": "artboard"},
                    "do_objectID": {"type": "string"},
                    "frame": {"$ref": "#Rect"},
                    "layers": {
                        "type": "array",
                        "items": {"oneOf": [{"$ref": "#Artboard"}, {"$ref": "#Text"}]}
                    },
                    "name": {"type": "string"}
                },
                "required": ["_class", "do_objectID", "frame", "layers"]
            },
            "Text": {
                "$id": "#Text",
                "type": "object",
                "properties": {
                    "_class": {"const": "text"},
                    "do_objectID": {"type": "string"},
                    "frame": {"$ref": "#Rect"},
                    "stringValue": {"type": "string"}
                },
                "required": ["_class", "do_objectID", "frame"]
            }
        }
    });
    let file_format = json!({
        "type": "object",
        "properties": {
            "document": {"$ref": "#Document"},
            "meta": {"$ref": "#Meta"}
        },
        "required": ["document", "meta"],
        "definitions": {}
    });
    let meta = json!({
        "type": "object",
        "properties": {"version": {"enum": [135, 136]}},
        "definitions": {
            "Meta": {
                "$id": "#Meta",
                "type": "object",
                "properties": {"version": {"type": "integer"}}
            }
        }
    });
    let user = json!({"definitions": {}});
    let page = json!({});

    SchemaBundle {
        version: 136,
        versions: vec![135, 136],
        document,
        file_format,
        meta,
        page,
        user,
    }
}

#[test]
fn test_emit_is_idempotent() {
    let bundle = sample_bundle();
    let first = generate_module(&bundle).unwrap();
    let second = generate_module(&bundle).unwrap();
    assert_eq!(first.source, second.source);
}

#[test]
fn test_umbrella_definitions() {
    let source = generate_module(&sample_bundle()).unwrap().source;
    // Artboard and Text are layers; only Artboard carries a layers array.
    assert!(source.contains("AnyLayer = Union['Artboard', 'Text']"));
    assert!(source.contains("AnyGroup = 'Artboard'"));
    assert!(source.contains("AnyObject = Union['Rect', 'Artboard', 'Text']"));
    assert!(source.contains("class Contents(JSONMixin):"));
    assert!(source.contains("class Document(JSONMixin):"));
}

#[test]
fn test_class_value_enum() {
    let source = generate_module(&sample_bundle()).unwrap().source;
    assert!(source.contains("class ClassValue(Enum):"));
    assert!(source.contains("    Artboard = 'artboard'"));
    assert!(source.contains("    Rect = 'rect'"));
    assert!(source.contains("    Text = 'text'"));
}

#[test]
fn test_discriminator_table() {
    let source = generate_module(&sample_bundle()).unwrap().source;
    assert!(source.contains(
        "class_map: Dict[str, Type[JSONMixin]] = \
         {'artboard': Artboard, 'rect': Rect, 'text': Text}"
    ));
    assert_eq!(source.matches("def to_object").count(), 1);
}

#[test]
fn test_decoder_injected_on_layer_list() {
    let source = generate_module(&sample_bundle()).unwrap().source;
    assert!(source.contains(
        "layers: List[Union['Artboard', 'Text']] = \
         field(metadata={'fastclasses_json': {'decoder': lambda lst: [to_object(x) for x in lst]}})"
    ));
    // Plain optional fields stay undecoded.
    assert!(source.contains("name: Optional[str] = None"));
}

#[test]
fn test_discriminator_fields_are_renamed() {
    let source = generate_module(&sample_bundle()).unwrap().source;
    assert!(source.contains(
        "class_: Literal['artboard'] = \
         field(metadata={'fastclasses_json': {'field_name': '_class'}})"
    ));
}

#[test]
fn test_declaration_identifiers_are_unique() {
    let source = generate_module(&sample_bundle()).unwrap().source;
    for name in ["Rect", "Artboard", "Text", "Meta", "Contents", "Document"] {
        assert_eq!(
            source.matches(&format!("class {name}(JSONMixin):")).count(),
            1,
            "expected exactly one class {name}"
        );
    }
}

#[test]
fn test_number_enum_in_definitions_aborts() {
    let mut bundle = sample_bundle();
    bundle.document["definitions"]["Bad"] =
        json!({"$id": "#Bad", "type": "number", "enum": [1.5, 2.5]});
    let err = generate_module(&bundle).unwrap_err();
    assert!(matches!(err, SketchError::UnsupportedSchema(_)));
}

//! Python source renderer
//!
//! Consumes the declaration IR only; no raw schema JSON reaches this
//! module. Output formatting mirrors what CPython's `ast.unparse` produces
//! for the same tree: single-quoted strings, one blank line around class
//! and function definitions, adjacent single-line statements packed
//! together. Given the same graph and imports the renderer produces
//! byte-identical source.

use indexmap::IndexMap;

use super::decl::{
    Annotation, ClassDecl, DeclGraph, Declaration, Decoder, EnumDecl, Field, LiteralValue,
};
use super::imports::ImportRegistry;

const INDENT: &str = "    ";

/// The runtime dispatch function emitted ahead of the class declarations.
/// Unknown discriminators and non-dict inputs pass through unchanged.
pub const TO_OBJECT_DEF: &str = "\
def to_object(obj: 'Any') -> Optional['Any']:
    if obj is not None and isinstance(obj, dict) and '_class' in obj.keys() and (obj['_class'] in class_map.keys()):
        return class_map[obj['_class']].from_dict(obj)
    else:
        return obj";

/// Kinds of top-level blocks; spacing between blocks depends on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    /// An import or other single-line statement.
    Statement,
    /// A class or function definition.
    Definition,
}

fn join_blocks(blocks: &[(BlockKind, String)]) -> String {
    let mut output = String::new();
    for (index, (kind, text)) in blocks.iter().enumerate() {
        if index > 0 {
            let previous = blocks[index - 1].0;
            if previous == BlockKind::Definition || *kind == BlockKind::Definition {
                output.push_str("\n\n");
            } else {
                output.push('\n');
            }
        }
        output.push_str(text);
    }
    output
}

/// Escape a string for a single-quoted Python literal.
fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

fn render_literal(value: &LiteralValue) -> String {
    match value {
        LiteralValue::Str(s) => format!("'{}'", escape(s)),
        LiteralValue::Int(i) => i.to_string(),
        LiteralValue::Float(f) => format!("{f:?}"),
        LiteralValue::Bool(true) => "True".to_string(),
        LiteralValue::Bool(false) => "False".to_string(),
        LiteralValue::Null => "None".to_string(),
    }
}

/// Render an annotation expression.
pub fn render_annotation(annotation: &Annotation) -> String {
    match annotation {
        Annotation::Primitive(p) => p.as_str().to_string(),
        Annotation::Literal(value) => format!("Literal[{}]", render_literal(value)),
        Annotation::Union(items) => {
            let rendered: Vec<String> = items.iter().map(render_annotation).collect();
            format!("Union[{}]", rendered.join(", "))
        }
        Annotation::Optional(inner) => format!("Optional[{}]", render_annotation(inner)),
        Annotation::List(inner) => format!("List[{}]", render_annotation(inner)),
        Annotation::Dict(key, value) => format!(
            "Dict[{}, {}]",
            render_annotation(key),
            render_annotation(value)
        ),
        Annotation::Any => "Any".to_string(),
        Annotation::Named { id, quoted } => {
            if *quoted {
                format!("'{id}'")
            } else {
                id.clone()
            }
        }
    }
}

fn decoder_expr(decoder: Decoder) -> &'static str {
    match decoder {
        Decoder::ToObject => "to_object",
        Decoder::ListToObject => "lambda lst: [to_object(x) for x in lst]",
    }
}

fn render_field(field: &Field) -> String {
    let annotation = render_annotation(&field.annotation);
    let renamed = field.name != field.key;

    if !renamed && field.decoder.is_none() {
        if field.required {
            return format!("{}: {}", field.name, annotation);
        }
        return format!("{}: {} = None", field.name, annotation);
    }

    let mut metadata: Vec<String> = Vec::new();
    if renamed {
        metadata.push(format!("'field_name': '{}'", escape(&field.key)));
    }
    if let Some(decoder) = field.decoder {
        metadata.push(format!("'decoder': {}", decoder_expr(decoder)));
    }
    let default = if field.required { "" } else { ", default=None" };
    format!(
        "{}: {} = field(metadata={{'fastclasses_json': {{{}}}}}{})",
        field.name,
        annotation,
        metadata.join(", "),
        default
    )
}

fn render_class(class: &ClassDecl) -> String {
    let mut output = String::new();
    output.push_str("@dataclass_json\n");
    output.push_str("@dataclass\n");
    output.push_str(&format!("class {}(JSONMixin):\n", class.name));
    if class.fields.is_empty() {
        output.push_str(INDENT);
        output.push_str("pass");
        return output;
    }
    let lines: Vec<String> = class
        .fields
        .iter()
        .map(|f| format!("{INDENT}{}", render_field(f)))
        .collect();
    output.push_str(&lines.join("\n"));
    output
}

fn render_enum(decl: &EnumDecl) -> String {
    let mut output = String::new();
    output.push_str(&format!("class {}(Enum):\n", decl.name));
    if decl.members.is_empty() {
        output.push_str(INDENT);
        output.push_str("pass");
        return output;
    }
    let lines: Vec<String> = decl
        .members
        .iter()
        .map(|(name, value)| format!("{INDENT}{} = {}", name, render_literal(value)))
        .collect();
    output.push_str(&lines.join("\n"));
    // Unknown values decode to the first member.
    let (first, _) = &decl.members[0];
    output.push_str("\n\n");
    output.push_str(&format!(
        "{INDENT}@classmethod\n{INDENT}def _missing_(cls, value):\n{INDENT}{INDENT}return {}.{}",
        decl.name, first
    ));
    output
}

fn declaration_block(decl: &Declaration) -> (BlockKind, String) {
    match decl {
        Declaration::Class(class) => (BlockKind::Definition, render_class(class)),
        Declaration::Enum(e) => (BlockKind::Definition, render_enum(e)),
        Declaration::Alias(alias) => (
            BlockKind::Statement,
            format!("{} = {}", alias.name, render_annotation(&alias.annotation)),
        ),
    }
}

/// Render only the registered declarations, in insertion order.
pub fn render_declarations(graph: &DeclGraph) -> String {
    let blocks: Vec<(BlockKind, String)> = graph
        .iter()
        .map(|(_, entry)| declaration_block(&entry.decl))
        .collect();
    join_blocks(&blocks)
}

/// Render the discriminator table literal.
pub fn render_class_map(class_map: &IndexMap<String, String>) -> String {
    let entries: Vec<String> = class_map
        .iter()
        .map(|(key, class)| format!("'{}': {}", escape(key), class))
        .collect();
    format!(
        "class_map: Dict[str, Type[JSONMixin]] = {{{}}}",
        entries.join(", ")
    )
}

/// Assemble the full module: imports, prelude definitions, declarations,
/// then epilogue statements.
pub fn render_module(
    imports: &ImportRegistry,
    preludes: &[String],
    graph: &DeclGraph,
    epilogues: &[String],
) -> String {
    let mut blocks: Vec<(BlockKind, String)> = Vec::new();
    for line in imports.render_lines() {
        blocks.push((BlockKind::Statement, line));
    }
    for prelude in preludes {
        blocks.push((BlockKind::Definition, prelude.clone()));
    }
    for (_, entry) in graph.iter() {
        blocks.push(declaration_block(&entry.decl));
    }
    for epilogue in epilogues {
        blocks.push((BlockKind::Statement, epilogue.clone()));
    }
    join_blocks(&blocks)
}

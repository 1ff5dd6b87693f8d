//! Declaration graph and annotation IR
//!
//! The translator lowers every schema into this intermediate form before
//! any source text exists. Annotations mirror the `typing` spellings of
//! the emission target; declarations are the three top-level forms the
//! generated module can contain. The graph is an append-only ordered map,
//! so insertion order is emission order: nested anonymous classes are
//! registered before the class whose field refers to them.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{Result, SketchError};

/// Primitive annotation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Str,
    Int,
    Float,
    Bool,
}

impl Primitive {
    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::Str => "str",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Bool => "bool",
        }
    }
}

/// A constant usable inside `Literal[...]` or as an enum member value.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl LiteralValue {
    /// Narrow a JSON constant to a literal value.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(LiteralValue::Str(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(LiteralValue::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(LiteralValue::Float(f))
                } else {
                    Err(SketchError::UnsupportedSchema(format!(
                        "unsupported literal value {n}"
                    )))
                }
            }
            Value::Bool(b) => Ok(LiteralValue::Bool(*b)),
            Value::Null => Ok(LiteralValue::Null),
            other => Err(SketchError::UnsupportedSchema(format!(
                "unsupported literal value {other}"
            ))),
        }
    }
}

/// A type annotation in the emitted module.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Primitive(Primitive),
    Literal(LiteralValue),
    Union(Vec<Annotation>),
    Optional(Box<Annotation>),
    List(Box<Annotation>),
    Dict(Box<Annotation>, Box<Annotation>),
    Any,
    /// Reference to a declared name; `quoted` marks a forward reference
    /// that must be emitted as a string literal.
    Named { id: String, quoted: bool },
}

/// Decoder attached to a union-bearing field during polymorphism wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    /// `to_object`
    ToObject,
    /// `lambda lst: [to_object(x) for x in lst]`
    ListToObject,
}

/// A typed field of a generated class.
///
/// `name` is the minted Python identifier, `key` the original schema
/// property key; when they differ the emitter writes a rename entry into
/// the field metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub key: String,
    pub annotation: Annotation,
    pub required: bool,
    pub decoder: Option<Decoder>,
}

/// A generated dataclass.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub fields: Vec<Field>,
}

/// A generated enum with symbolic members bound to constants.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: String,
    pub members: Vec<(String, LiteralValue)>,
}

/// A generated type alias.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasDecl {
    pub name: String,
    pub annotation: Annotation,
}

/// One top-level declaration of the emitted module.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Class(ClassDecl),
    Enum(EnumDecl),
    Alias(AliasDecl),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Class(c) => &c.name,
            Declaration::Enum(e) => &e.name,
            Declaration::Alias(a) => &a.name,
        }
    }
}

/// A registered declaration together with the schema it came from.
#[derive(Debug, Clone)]
pub struct DeclEntry {
    pub schema: Value,
    pub decl: Declaration,
}

/// Append-only ordered mapping from identifier to declaration.
#[derive(Debug, Clone, Default)]
pub struct DeclGraph {
    entries: IndexMap<String, DeclEntry>,
}

impl DeclGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    /// Register a declaration. Re-insertion of an identifier is an error.
    pub fn insert(
        &mut self,
        identifier: impl Into<String>,
        schema: Value,
        decl: Declaration,
    ) -> Result<()> {
        let identifier = identifier.into();
        if self.entries.contains_key(&identifier) {
            return Err(SketchError::DuplicateDeclaration(identifier));
        }
        self.entries.insert(identifier, DeclEntry { schema, decl });
        Ok(())
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DeclEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate declarations mutably, in insertion order.
    pub fn decls_mut(&mut self) -> impl Iterator<Item = &mut Declaration> {
        self.entries.values_mut().map(|e| &mut e.decl)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

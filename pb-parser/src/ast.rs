//! The proto3 parse tree. Field types are retained exactly as written in
//! source (`MessageOrEnum` is not yet resolved to a message-vs-enum kind —
//! that is the Lookup Helper's job, one layer up in `pb-schema`).

use crate::lexer::Loc;

#[derive(Debug, Clone, PartialEq)]
pub struct OptionDecl {
    pub name: String,
    pub value: OptionValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub path: String,
    pub public: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Int32,
    Sint32,
    Uint32,
    Int64,
    Sint64,
    Uint64,
    Fixed32,
    Sfixed32,
    Fixed64,
    Sfixed64,
    Float,
    Double,
    Bool,
    String,
    Bytes,
}

impl ScalarType {
    pub fn from_keyword(s: &str) -> Option<ScalarType> {
        Some(match s {
            "int32" => ScalarType::Int32,
            "sint32" => ScalarType::Sint32,
            "uint32" => ScalarType::Uint32,
            "int64" => ScalarType::Int64,
            "sint64" => ScalarType::Sint64,
            "uint64" => ScalarType::Uint64,
            "fixed32" => ScalarType::Fixed32,
            "sfixed32" => ScalarType::Sfixed32,
            "fixed64" => ScalarType::Fixed64,
            "sfixed64" => ScalarType::Sfixed64,
            "float" => ScalarType::Float,
            "double" => ScalarType::Double,
            "bool" => ScalarType::Bool,
            "string" => ScalarType::String,
            "bytes" => ScalarType::Bytes,
            _ => return None,
        })
    }
}

/// A field's declared type, exactly as written.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldTypeName {
    Scalar(ScalarType),
    /// A message or enum name, possibly dotted (`pkg.Type`); not yet
    /// resolved to one or the other.
    Named(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldNode {
    pub doc: Option<String>,
    pub name: String,
    pub type_name: FieldTypeName,
    pub number: i32,
    pub repeated: bool,
    /// The proto3 `optional` keyword (explicit field presence), distinct
    /// from optionality inferred later from a `google.protobuf.*Value`
    /// wrapper type — both end up setting the schema model's `optional` flag.
    pub explicit_optional: bool,
    pub deprecated: bool,
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapFieldNode {
    pub doc: Option<String>,
    pub name: String,
    pub key_type: ScalarType,
    pub value_type: FieldTypeName,
    pub number: i32,
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OneofNode {
    pub doc: Option<String>,
    pub name: String,
    pub fields: Vec<FieldNode>,
}

/// Something that appeared in place of a field but wasn't one the builder
/// recognizes as a field or oneof (spec.md §7 `UnknownElement`).
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownElement {
    pub description: String,
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReservedRange {
    pub from: i32,
    pub to: i32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageNode {
    pub doc: Option<String>,
    pub name: String,
    pub fields: Vec<FieldNode>,
    pub map_fields: Vec<MapFieldNode>,
    pub oneofs: Vec<OneofNode>,
    pub nested_messages: Vec<MessageNode>,
    pub nested_enums: Vec<EnumNode>,
    pub reserved_numbers: Vec<ReservedRange>,
    pub reserved_names: Vec<String>,
    pub options: Vec<OptionDecl>,
    pub unknown_elements: Vec<UnknownElement>,
    pub deprecated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueNode {
    pub doc: Option<String>,
    pub name: String,
    pub number: i32,
    pub deprecated: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnumNode {
    pub doc: Option<String>,
    pub name: String,
    pub values: Vec<EnumValueNode>,
    pub options: Vec<OptionDecl>,
}

#[derive(Debug, Clone, PartialEq, Copy, Eq)]
pub enum Syntax {
    Proto2,
    Proto3,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProtoFile {
    pub syntax: Option<Syntax>,
    pub package: Option<String>,
    pub imports: Vec<Import>,
    pub options: Vec<OptionDecl>,
    pub messages: Vec<MessageNode>,
    pub enums: Vec<EnumNode>,
    pub unknown_elements: Vec<UnknownElement>,
}

impl Default for Syntax {
    fn default() -> Self {
        Syntax::Proto3
    }
}

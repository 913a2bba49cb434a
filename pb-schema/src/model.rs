//! The normalized schema model (spec.md §3). Built once per compile and
//! immutable thereafter — nothing here is mutated after `build()` returns.

use std::rc::Rc;

/// The eleven `google.protobuf.*Value` wrapper types that collapse to a
/// scalar `optional` field rather than a MESSAGE reference (spec.md §4.2).
pub const WRAPPER_TYPES: &[(&str, WireType)] = &[
    ("google.protobuf.StringValue", WireType::String),
    ("google.protobuf.Int32Value", WireType::Int32),
    ("google.protobuf.UInt32Value", WireType::UInt32),
    ("google.protobuf.SInt32Value", WireType::SInt32),
    ("google.protobuf.Int64Value", WireType::Int64),
    ("google.protobuf.UInt64Value", WireType::UInt64),
    ("google.protobuf.SInt64Value", WireType::SInt64),
    ("google.protobuf.FloatValue", WireType::Float),
    ("google.protobuf.DoubleValue", WireType::Double),
    ("google.protobuf.BoolValue", WireType::Bool),
    ("google.protobuf.BytesValue", WireType::Bytes),
];

/// Strips a leading `.` and, if present, the `google.protobuf.` package
/// prefix so both `StringValue` and `.google.protobuf.StringValue` match.
pub fn wrapper_wire_type(type_name: &str) -> Option<WireType> {
    let trimmed = type_name.trim_start_matches('.');
    WRAPPER_TYPES
        .iter()
        .find(|(name, _)| *name == trimmed)
        .map(|(_, wt)| *wt)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Int32,
    SInt32,
    UInt32,
    Int64,
    SInt64,
    UInt64,
    Fixed32,
    SFixed32,
    Fixed64,
    SFixed64,
    Float,
    Double,
    Bool,
    String,
    Bytes,
    Enum,
    Message,
}

impl WireType {
    /// Whether a zero-valued scalar of this type elides from the wire per
    /// proto3 canonical encoding (spec.md §4.4.3, S5/S6).
    pub fn is_scalar(self) -> bool {
        !matches!(self, WireType::Message)
    }
}

/// A resolved reference to a message or enum type, filled in once the
/// symbol table is complete (spec.md §4.3 `UnresolvedReference`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub fully_qualified_name: String,
}

#[derive(Debug, Clone)]
pub struct SingleField {
    pub name: String,
    pub number: i32,
    pub wire_type: WireType,
    pub repeated: bool,
    /// True for proto3 `optional` scalars and for wrapper-optional fields
    /// normalized from a `google.protobuf.*Value` reference.
    pub optional: bool,
    /// Set only when `wire_type` is `Enum` or `Message`.
    pub type_ref: Option<TypeRef>,
    pub doc: Option<String>,
    pub deprecated: bool,
    /// Name of the enclosing oneof, if this field is one of its branches.
    pub oneof_parent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OneOfField {
    pub name: String,
    pub children: Vec<SingleField>,
    /// `<Name>OneOfType`, e.g. `choice` → `ChoiceOneOfType`.
    pub discriminant_enum_name: String,
    pub doc: Option<String>,
}

impl OneOfField {
    /// `UNSET = 0` plus one discriminant per child, keyed by the child's
    /// own field number (spec.md §3 invariant 4).
    pub fn discriminant_values(&self) -> Vec<(String, i32)> {
        let mut values = vec![("UNSET".to_string(), 0)];
        for child in &self.children {
            values.push((camel_to_upper_snake(&child.name), child.number));
        }
        values
    }
}

#[derive(Debug, Clone)]
pub enum Field {
    Single(SingleField),
    OneOf(OneOfField),
}

impl Field {
    pub fn name(&self) -> &str {
        match self {
            Field::Single(f) => &f.name,
            Field::OneOf(f) => &f.name,
        }
    }

    /// Field numbers occupied by this field, for duplicate-number checks —
    /// a oneof occupies the numbers of all of its children.
    pub fn numbers(&self) -> Vec<i32> {
        match self {
            Field::Single(f) => vec![f.number],
            Field::OneOf(f) => f.children.iter().map(|c| c.number).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub name: String,
    pub doc: Option<String>,
    pub fields: Vec<Field>,
    pub nested_messages: Vec<Rc<Message>>,
    pub nested_enums: Vec<Rc<Enum>>,
    pub deprecated: bool,
}

impl Message {
    pub fn single_fields(&self) -> impl Iterator<Item = &SingleField> {
        self.fields.iter().filter_map(|f| match f {
            Field::Single(s) => Some(s),
            Field::OneOf(_) => None,
        })
    }

    pub fn oneof_fields(&self) -> impl Iterator<Item = &OneOfField> {
        self.fields.iter().filter_map(|f| match f {
            Field::OneOf(o) => Some(o),
            Field::Single(_) => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
    pub deprecated: bool,
    pub doc: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Enum {
    pub name: String,
    pub doc: Option<String>,
    pub values: Vec<EnumValue>,
}

impl Enum {
    /// proto3 requires the first declared value to be the `0` default.
    pub fn default_value(&self) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.number == 0)
    }
}

/// One input `.proto` file's contribution to the schema model (spec.md §3).
#[derive(Debug, Clone)]
pub struct SchemaFile {
    pub path: String,
    /// The `option java_package`-equivalent namespace override, if set
    /// (spec.md §6).
    pub namespace_override: Option<String>,
    /// Lowercase bucket derived from the file's containing directory, used
    /// by the Lookup Helper to compute each artifact's final namespace.
    pub dir_bucket: String,
    pub messages: Vec<Rc<Message>>,
    pub enums: Vec<Rc<Enum>>,
}

pub fn camel_to_upper_snake(s: &str) -> String {
    let mut out = String::new();
    let mut prev_lower_or_digit = false;
    for c in s.chars() {
        if c.is_uppercase() && prev_lower_or_digit {
            out.push('_');
        }
        out.extend(c.to_uppercase());
        prev_lower_or_digit = c.is_lowercase() || c.is_ascii_digit();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_to_upper_snake_handles_typical_names() {
        assert_eq!("X", camel_to_upper_snake("x"));
        assert_eq!("MY_FIELD", camel_to_upper_snake("myField"));
        assert_eq!("HTTP_CODE", camel_to_upper_snake("hTTPCode"));
    }

    #[test]
    fn wrapper_wire_type_matches_with_and_without_leading_dot() {
        assert_eq!(
            Some(WireType::String),
            wrapper_wire_type("google.protobuf.StringValue")
        );
        assert_eq!(
            Some(WireType::Bool),
            wrapper_wire_type(".google.protobuf.BoolValue")
        );
        assert_eq!(None, wrapper_wire_type("google.protobuf.Duration"));
    }

    #[test]
    fn oneof_discriminant_values_start_with_unset() {
        let oneof = OneOfField {
            name: "choice".to_string(),
            children: vec![
                SingleField {
                    name: "x".to_string(),
                    number: 1,
                    wire_type: WireType::Int32,
                    repeated: false,
                    optional: false,
                    type_ref: None,
                    doc: None,
                    deprecated: false,
                    oneof_parent: Some("choice".to_string()),
                },
                SingleField {
                    name: "y".to_string(),
                    number: 2,
                    wire_type: WireType::String,
                    repeated: false,
                    optional: false,
                    type_ref: None,
                    doc: None,
                    deprecated: false,
                    oneof_parent: Some("choice".to_string()),
                },
            ],
            discriminant_enum_name: "ChoiceOneOfType".to_string(),
            doc: None,
        };
        assert_eq!(
            vec![
                ("UNSET".to_string(), 0),
                ("X".to_string(), 1),
                ("Y".to_string(), 2),
            ],
            oneof.discriminant_values()
        );
    }
}

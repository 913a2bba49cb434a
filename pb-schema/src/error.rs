use std::fmt;

/// Errors raised while building or resolving the schema model (spec.md §7).
/// `ParseError` itself lives in `pb-parser`; by the time these are raised the
/// file has already parsed successfully.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A field, oneof branch, or map value refers to a message/enum name
    /// that no loaded `.proto` file declares.
    UnresolvedReference {
        referencing_message: String,
        field_name: String,
        type_name: String,
    },
    /// `map<K,V>` was encountered. Recognized by the parser, rejected here.
    UnsupportedMap {
        message_name: String,
        field_name: String,
    },
    /// Two fields (or a field and a oneof) in the same message share a
    /// field number.
    DuplicateFieldNumber {
        message_name: String,
        number: i32,
    },
    /// Two enum values in the same enum share a number without
    /// `option allow_alias = true;` set.
    DuplicateEnumNumber {
        enum_name: String,
        number: i32,
    },
    /// An enum declared no value with number `0` (proto3 requires one as
    /// the default).
    EnumMissingZeroValue {
        enum_name: String,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::UnresolvedReference {
                referencing_message,
                field_name,
                type_name,
            } => write!(
                f,
                "{}.{}: unresolved type reference `{}`",
                referencing_message, field_name, type_name
            ),
            SchemaError::UnsupportedMap {
                message_name,
                field_name,
            } => write!(
                f,
                "{}.{}: map fields are not supported",
                message_name, field_name
            ),
            SchemaError::DuplicateFieldNumber {
                message_name,
                number,
            } => write!(
                f,
                "{}: field number {} used more than once",
                message_name, number
            ),
            SchemaError::DuplicateEnumNumber { enum_name, number } => write!(
                f,
                "{}: enum value number {} used more than once (without allow_alias)",
                enum_name, number
            ),
            SchemaError::EnumMissingZeroValue { enum_name } => write!(
                f,
                "{}: enum must declare a value with number 0",
                enum_name
            ),
        }
    }
}

impl std::error::Error for SchemaError {}

pub type SchemaResult<T> = Result<T, SchemaError>;

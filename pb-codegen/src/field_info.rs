//! The field-introspection surface every emitter shares (spec.md §4.4:
//! "Emitters share a common field-introspection interface so they never
//! re-parse"). Each emitter asks these functions for a field's Rust type,
//! default expression, and accessor-name fragments instead of switching on
//! `WireType` itself.

use pb_schema::{SingleField, TypeRef, WireType};

use crate::rust_types::{scalar_default_literal, scalar_rust_type, upper_camel};

/// A named type reference's Rust identifier. Nested proto names
/// (`Outer.Inner`) flatten to their last segment — this generator emits one
/// flat module per package rather than mirroring proto nesting with Rust
/// module nesting.
pub fn simple_type_name(type_ref: &TypeRef) -> String {
    type_ref
        .fully_qualified_name
        .rsplit('.')
        .next()
        .unwrap_or(&type_ref.fully_qualified_name)
        .to_string()
}

/// The Rust type of one element of the field, ignoring `repeated`/
/// `optional` wrapping. MESSAGE fields are held behind `Rc` so cyclic
/// schemas (spec.md §9 "Cyclic schemas") don't require an infinite-size
/// struct.
pub fn element_type(field: &SingleField) -> String {
    match field.wire_type {
        WireType::Enum => simple_type_name(field.type_ref.as_ref().expect("ENUM field has no type_ref")),
        WireType::Message => format!(
            "std::rc::Rc<{}>",
            simple_type_name(field.type_ref.as_ref().expect("MESSAGE field has no type_ref"))
        ),
        other => scalar_rust_type(other).to_string(),
    }
}

/// The full field type as it appears in the generated struct: `repeated`
/// wraps in `Vec`, and MESSAGE fields are always `Option` (protobuf message
/// presence is always trackable, independent of the `optional` keyword) —
/// any other `optional` field also wraps in `Option`.
pub fn field_rust_type(field: &SingleField) -> String {
    let elem = element_type(field);
    if field.repeated {
        format!("Vec<{}>", elem)
    } else if field.optional || field.wire_type == WireType::Message {
        format!("Option<{}>", elem)
    } else {
        elem
    }
}

/// The `DEFAULT`-constant expression for this field (spec.md §4.4.1 "a
/// `DEFAULT` constant ... with all zero-values").
pub fn field_default_expr(field: &SingleField) -> String {
    if field.repeated {
        return "Vec::new()".to_string();
    }
    if field.optional || field.wire_type == WireType::Message {
        return "None".to_string();
    }
    match field.wire_type {
        WireType::Enum => format!(
            "{}::DEFAULT",
            simple_type_name(field.type_ref.as_ref().expect("ENUM field has no type_ref"))
        ),
        other => scalar_default_literal(other).to_string(),
    }
}

/// `foo` → `Foo` for accessor method fragments like `has_foo`/`foo_or_else`.
pub fn accessor_fragment(field_name: &str) -> String {
    upper_camel(field_name)
}

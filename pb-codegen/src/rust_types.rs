//! Maps schema `WireType`s to the Rust types/expressions the emitters
//! stitch into generated source — the field-introspection surface spec.md
//! §4.4 says every emitter shares so none of them re-parse the schema.

use pb_schema::WireType;

/// The bare Rust scalar type for a field's wire type (ignoring
/// `optional`/`repeated` wrapping, and ignoring ENUM/MESSAGE which need the
/// resolved type name instead).
pub fn scalar_rust_type(wire_type: WireType) -> &'static str {
    match wire_type {
        WireType::Int32 | WireType::SInt32 | WireType::SFixed32 => "i32",
        WireType::UInt32 | WireType::Fixed32 => "u32",
        WireType::Int64 | WireType::SInt64 | WireType::SFixed64 => "i64",
        WireType::UInt64 | WireType::Fixed64 => "u64",
        WireType::Float => "f32",
        WireType::Double => "f64",
        WireType::Bool => "bool",
        WireType::String => "String",
        WireType::Bytes => "pb_runtime::Bytes",
        WireType::Enum | WireType::Message => {
            unreachable!("enum/message fields need the resolved type name, not a scalar mapping")
        }
    }
}

/// The zero/default-value literal for a scalar wire type (proto3 default,
/// spec.md §4.4.3 "default-value elision").
pub fn scalar_default_literal(wire_type: WireType) -> &'static str {
    match wire_type {
        WireType::Int32
        | WireType::SInt32
        | WireType::SFixed32
        | WireType::UInt32
        | WireType::Fixed32
        | WireType::Int64
        | WireType::SInt64
        | WireType::SFixed64
        | WireType::UInt64
        | WireType::Fixed64 => "0",
        WireType::Float | WireType::Double => "0.0",
        WireType::Bool => "false",
        WireType::String => "String::new()",
        WireType::Bytes => "pb_runtime::Bytes::empty()",
        WireType::Enum | WireType::Message => {
            unreachable!("enum/message defaults are resolved per-type, not via a scalar literal")
        }
    }
}

/// The protobuf wire-type tag's low 3 bits (spec.md §6 "standard protobuf3
/// wire format"): 0 = varint, 1 = 64-bit, 2 = length-delimited, 5 = 32-bit.
pub fn wire_tag_kind(wire_type: WireType) -> u32 {
    match wire_type {
        WireType::Int32
        | WireType::SInt32
        | WireType::UInt32
        | WireType::Int64
        | WireType::SInt64
        | WireType::UInt64
        | WireType::Bool
        | WireType::Enum => 0,
        WireType::Fixed64 | WireType::SFixed64 | WireType::Double => 1,
        WireType::String | WireType::Bytes | WireType::Message => 2,
        WireType::Fixed32 | WireType::SFixed32 | WireType::Float => 5,
    }
}

/// Whether this wire type zig-zags its varint encoding.
pub fn is_zigzag(wire_type: WireType) -> bool {
    matches!(wire_type, WireType::SInt32 | WireType::SInt64)
}

/// Whether a `repeated` field of this wire type uses protobuf's packed
/// encoding (spec.md §6 "packed encoding for repeated scalars is the
/// default"). Length-delimited element types (STRING/BYTES/MESSAGE) are
/// never packed — each element keeps its own tag.
pub fn is_packable(wire_type: WireType) -> bool {
    wire_tag_kind(wire_type) != 2
}

/// The base-128 varint length of a *compile-time-known* tag value. The
/// writer emitter only ever calls this on a field's tag (number and wire
/// type are both fixed at generation time), so the length itself becomes a
/// literal in the generated source rather than a runtime computation.
pub fn const_varint32_len(mut value: u32) -> u64 {
    let mut len = 1u64;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

/// The wire tag (`(field_number << 3) | wire_type_kind`) for a field, as a
/// compile-time literal.
pub fn tag_value(number: i32, wire_type: WireType) -> u32 {
    tag_value_kind(number, wire_tag_kind(wire_type))
}

pub fn tag_value_kind(number: i32, kind: u32) -> u32 {
    ((number as u32) << 3) | kind
}

/// `snake_case` → `UpperCamelCase`, used for enum/struct identifiers
/// synthesized by the builder (oneof discriminant names already arrive
/// pre-cased from `pb-schema`; this is for field-derived identifiers the
/// emitters themselves invent, like accessor method name fragments).
pub fn upper_camel(s: &str) -> String {
    let mut out = String::new();
    let mut capitalize_next = true;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
            continue;
        }
        if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_rust_type_maps_common_cases() {
        assert_eq!("i32", scalar_rust_type(WireType::Int32));
        assert_eq!("u64", scalar_rust_type(WireType::Fixed64));
        assert_eq!("String", scalar_rust_type(WireType::String));
    }

    #[test]
    fn wire_tag_kind_matches_protobuf_encoding_rules() {
        assert_eq!(0, wire_tag_kind(WireType::Int32));
        assert_eq!(1, wire_tag_kind(WireType::Double));
        assert_eq!(2, wire_tag_kind(WireType::Bytes));
        assert_eq!(5, wire_tag_kind(WireType::Float));
    }

    #[test]
    fn upper_camel_converts_snake_case() {
        assert_eq!("MyField", upper_camel("my_field"));
        assert_eq!("X", upper_camel("x"));
    }

    #[test]
    fn is_packable_excludes_length_delimited_types() {
        assert!(is_packable(WireType::Int32));
        assert!(is_packable(WireType::Double));
        assert!(is_packable(WireType::Enum));
        assert!(!is_packable(WireType::String));
        assert!(!is_packable(WireType::Bytes));
        assert!(!is_packable(WireType::Message));
    }

    #[test]
    fn const_varint32_len_matches_known_boundaries() {
        assert_eq!(1, const_varint32_len(0));
        assert_eq!(1, const_varint32_len(127));
        assert_eq!(2, const_varint32_len(128));
        assert_eq!(2, const_varint32_len(16383));
        assert_eq!(3, const_varint32_len(16384));
    }

    #[test]
    fn tag_value_packs_field_number_and_wire_kind() {
        assert_eq!(0x08, tag_value(1, WireType::Int32));
        assert_eq!(0x12, tag_value(2, WireType::String));
    }
}

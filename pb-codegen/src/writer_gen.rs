//! The writer emitter (spec.md §4.4.3): serializes a model value to a
//! `WritableSequentialData` in field-number order, eliding proto3 default
//! scalars. MESSAGE-typed fields use a pre-pass `measured_size` call to know
//! their length prefix rather than a two-buffer strategy — the spec leaves
//! that choice open and a recursive size pass avoids a second allocation.

use pb_schema::{Field, Message, OneOfField, SingleField, WireType};

use crate::code_writer::CodeWriter;
use crate::field_info::{accessor_fragment, simple_type_name};
use crate::rust_types::{const_varint32_len, is_packable, tag_value, tag_value_kind};

pub fn emit_writer(message: &Message) -> String {
    let mut w = CodeWriter::new();
    let writer_name = format!("{}Writer", message.name);

    let mut fields: Vec<&Field> = message.fields.iter().collect();
    fields.sort_by_key(|f| f.numbers().into_iter().min().unwrap_or(i32::MAX));

    w.doc_comment(&format!(
        "Serializes a [`{}`] to the protobuf wire format.",
        message.name
    ));
    w.pub_struct(&writer_name, |_| {});
    w.write_line("");
    w.impl_self_block(&writer_name, |w| {
        w.pub_fn(
            &format!(
                "write(value: &{}, output: &mut dyn pb_runtime::WritableSequentialData) -> pb_runtime::WireFormatResult<()>",
                message.name
            ),
            |w| {
                for field in &fields {
                    match field {
                        Field::Single(f) => emit_write_single(w, f),
                        Field::OneOf(o) => emit_write_oneof(w, o),
                    }
                }
                w.write_line("Ok(())");
            },
        );
        w.write_line("");
        w.doc_comment("Pre-pass length computation; MESSAGE fields recurse into their own writer's `measured_size`.");
        w.pub_fn(&format!("measured_size(value: &{}) -> u64", message.name), |w| {
            w.write_line("let mut size: u64 = 0;");
            for field in &fields {
                match field {
                    Field::Single(f) => emit_measure_single(w, f),
                    Field::OneOf(o) => emit_measure_oneof(w, o),
                }
            }
            w.write_line("size");
        });
        w.write_line("");
        w.pub_fn(
            &format!(
                "write_to_vec(value: &{}) -> pb_runtime::WireFormatResult<Vec<u8>>",
                message.name
            ),
            |w| {
                w.write_line(&format!(
                    "let mut out = pb_runtime::GrowableWriter::with_capacity({}::measured_size(value) as usize);",
                    writer_name
                ));
                w.write_line(&format!("{}::write(value, &mut out)?;", writer_name));
                w.write_line("Ok(out.into_vec())");
            },
        );
    });

    w.finish()
}

fn emit_write_single(w: &mut CodeWriter, field: &SingleField) {
    let base = format!("value.{}", field.name);
    if field.repeated {
        emit_write_repeated(w, field, &base);
        return;
    }
    if field.optional || field.wire_type == WireType::Message {
        w.if_let_stmt("Some(v)", &format!("&{}", base), |w| {
            let tag = tag_value(field.number, field.wire_type);
            w.write_line(&format!("output.write_varint32({})?;", tag));
            if field.wire_type == WireType::Message {
                emit_write_submessage(w, field, "v");
            } else {
                emit_write_value(w, field, "v", true);
            }
        });
        return;
    }
    let cond = nonzero_check_expr(field, &base, false);
    w.if_stmt(&cond, |w| {
        let tag = tag_value(field.number, field.wire_type);
        w.write_line(&format!("output.write_varint32({})?;", tag));
        emit_write_value(w, field, &base, false);
    });
}

fn emit_write_repeated(w: &mut CodeWriter, field: &SingleField, base: &str) {
    if is_packable(field.wire_type) {
        w.if_stmt(&format!("!{}.is_empty()", base), |w| {
            let tag = tag_value_kind(field.number, 2);
            w.write_line(&format!("output.write_varint32({})?;", tag));
            w.write_line(&format!(
                "let packed_len: u64 = {}.iter().map(|v| {}).sum();",
                base,
                packed_elem_len_expr(field)
            ));
            w.write_line("output.write_varint32(packed_len as u32)?;");
            w.write_line(&format!("for v in &{} {{", base));
            w.indented(|w| emit_write_value(w, field, "v", true));
            w.write_line("}");
        });
    } else {
        w.write_line(&format!("for v in &{} {{", base));
        w.indented(|w| {
            let tag = tag_value(field.number, field.wire_type);
            w.write_line(&format!("output.write_varint32({})?;", tag));
            if field.wire_type == WireType::Message {
                emit_write_submessage(w, field, "v");
            } else {
                emit_write_value(w, field, "v", true);
            }
        });
        w.write_line("}");
    }
}

fn emit_write_submessage(w: &mut CodeWriter, field: &SingleField, var: &str) {
    let type_name = simple_type_name(field.type_ref.as_ref().expect("MESSAGE field has no type_ref"));
    w.write_line(&format!("let child_len = {}Writer::measured_size({});", type_name, var));
    w.write_line("output.write_varint32(child_len as u32)?;");
    w.write_line(&format!("{}Writer::write({}, output)?;", type_name, var));
}

fn emit_write_oneof(w: &mut CodeWriter, oneof: &OneOfField) {
    w.match_block(&format!("&value.{}", oneof.name), |w| {
        w.case_block(&format!("{}::Unset", oneof.discriminant_enum_name), |_| {});
        for child in &oneof.children {
            let frag = accessor_fragment(&child.name);
            w.case_block(
                &format!("{}::{}(v)", oneof.discriminant_enum_name, frag),
                |w| {
                    if child.wire_type == WireType::Message {
                        let tag = tag_value(child.number, child.wire_type);
                        w.write_line(&format!("output.write_varint32({})?;", tag));
                        emit_write_submessage(w, child, "v");
                    } else {
                        // spec.md §8 S6: a oneof branch holding its scalar
                        // zero value elides exactly like an ordinary
                        // default-valued scalar — the branch is then
                        // indistinguishable from UNSET on the wire.
                        let cond = nonzero_check_expr(child, "v", true);
                        w.if_stmt(&cond, |w| {
                            let tag = tag_value(child.number, child.wire_type);
                            w.write_line(&format!("output.write_varint32({})?;", tag));
                            emit_write_value(w, child, "v", true);
                        });
                    }
                },
            );
        }
    });
}

fn emit_measure_single(w: &mut CodeWriter, field: &SingleField) {
    let base = format!("value.{}", field.name);
    if field.repeated {
        emit_measure_repeated(w, field, &base);
        return;
    }
    if field.optional || field.wire_type == WireType::Message {
        w.if_let_stmt("Some(v)", &format!("&{}", base), |w| {
            let tag_len = const_varint32_len(tag_value(field.number, field.wire_type));
            if field.wire_type == WireType::Message {
                emit_measure_submessage(w, field, "v", tag_len);
            } else {
                w.write_line(&format!(
                    "size += {}u64 + {};",
                    tag_len,
                    measured_value_len_expr(field, "v", true)
                ));
            }
        });
        return;
    }
    let cond = nonzero_check_expr(field, &base, false);
    w.if_stmt(&cond, |w| {
        let tag_len = const_varint32_len(tag_value(field.number, field.wire_type));
        w.write_line(&format!(
            "size += {}u64 + {};",
            tag_len,
            measured_value_len_expr(field, &base, false)
        ));
    });
}

fn emit_measure_repeated(w: &mut CodeWriter, field: &SingleField, base: &str) {
    if is_packable(field.wire_type) {
        w.if_stmt(&format!("!{}.is_empty()", base), |w| {
            let tag_len = const_varint32_len(tag_value_kind(field.number, 2));
            w.write_line(&format!(
                "let packed_len: u64 = {}.iter().map(|v| {}).sum();",
                base,
                packed_elem_len_expr(field)
            ));
            w.write_line(&format!(
                "size += {}u64 + pb_runtime::varint::varint32_encoded_len(packed_len as u32) as u64 + packed_len;",
                tag_len
            ));
        });
    } else {
        let tag_len = const_varint32_len(tag_value(field.number, field.wire_type));
        w.write_line(&format!("for v in &{} {{", base));
        w.indented(|w| {
            if field.wire_type == WireType::Message {
                emit_measure_submessage(w, field, "v", tag_len);
            } else {
                w.write_line(&format!(
                    "size += {}u64 + {};",
                    tag_len,
                    measured_value_len_expr(field, "v", true)
                ));
            }
        });
        w.write_line("}");
    }
}

fn emit_measure_submessage(w: &mut CodeWriter, field: &SingleField, var: &str, tag_len: u64) {
    let type_name = simple_type_name(field.type_ref.as_ref().expect("MESSAGE field has no type_ref"));
    w.write_line(&format!("let child_len = {}Writer::measured_size({});", type_name, var));
    w.write_line(&format!(
        "size += {}u64 + pb_runtime::varint::varint32_encoded_len(child_len as u32) as u64 + child_len;",
        tag_len
    ));
}

fn emit_measure_oneof(w: &mut CodeWriter, oneof: &OneOfField) {
    w.match_block(&format!("&value.{}", oneof.name), |w| {
        w.case_block(&format!("{}::Unset", oneof.discriminant_enum_name), |_| {});
        for child in &oneof.children {
            let frag = accessor_fragment(&child.name);
            w.case_block(
                &format!("{}::{}(v)", oneof.discriminant_enum_name, frag),
                |w| {
                    let tag_len = const_varint32_len(tag_value(child.number, child.wire_type));
                    if child.wire_type == WireType::Message {
                        emit_measure_submessage(w, child, "v", tag_len);
                    } else {
                        let cond = nonzero_check_expr(child, "v", true);
                        w.if_stmt(&cond, |w| {
                            w.write_line(&format!(
                                "size += {}u64 + {};",
                                tag_len,
                                measured_value_len_expr(child, "v", true)
                            ));
                        });
                    }
                },
            );
        }
    });
}

/// `base` is either a direct struct-field place (`value.field`, not a
/// reference) or an `if let`/`match`-bound name (a reference already).
fn numeric(base: &str, base_is_ref: bool) -> String {
    if base_is_ref {
        format!("*{}", base)
    } else {
        base.to_string()
    }
}

fn string_ref(base: &str, base_is_ref: bool) -> String {
    if base_is_ref {
        base.to_string()
    } else {
        format!("&{}", base)
    }
}

fn nonzero_check_expr(field: &SingleField, base: &str, base_is_ref: bool) -> String {
    match field.wire_type {
        WireType::Bool => numeric(base, base_is_ref),
        WireType::Float | WireType::Double => format!("{} != 0.0", numeric(base, base_is_ref)),
        WireType::String => format!("!{}.is_empty()", base),
        WireType::Bytes => format!("!{}.as_slice().is_empty()", base),
        WireType::Enum => format!("{}.number() != 0", base),
        WireType::Message => unreachable!("message fields are always Option-wrapped"),
        _ => format!("{} != 0", numeric(base, base_is_ref)),
    }
}

/// Writes one value's raw encoding (tag already written by the caller).
fn emit_write_value(w: &mut CodeWriter, field: &SingleField, base: &str, base_is_ref: bool) {
    match field.wire_type {
        // Plain (non-zigzag) int32: protobuf sign-extends negative values to
        // 64 bits before varint-encoding them, so a negative value is always
        // ten bytes on the wire, never five — going through `write_varint32`
        // would zero-extend instead and produce a non-canonical encoding.
        WireType::Int32 => w.write_line(&format!(
            "output.write_varint64(({} as i64) as u64)?;",
            numeric(base, base_is_ref)
        )),
        WireType::UInt32 => w.write_line(&format!("output.write_varint32({})?;", numeric(base, base_is_ref))),
        WireType::SInt32 => w.write_line(&format!("output.write_sint32({})?;", numeric(base, base_is_ref))),
        WireType::Fixed32 => w.write_line(&format!("output.write_fixed32({})?;", numeric(base, base_is_ref))),
        WireType::SFixed32 => w.write_line(&format!("output.write_fixed32({} as u32)?;", numeric(base, base_is_ref))),
        WireType::Int64 => w.write_line(&format!("output.write_varint64({} as u64)?;", numeric(base, base_is_ref))),
        WireType::UInt64 => w.write_line(&format!("output.write_varint64({})?;", numeric(base, base_is_ref))),
        WireType::SInt64 => w.write_line(&format!("output.write_sint64({})?;", numeric(base, base_is_ref))),
        WireType::Fixed64 => w.write_line(&format!("output.write_fixed64({})?;", numeric(base, base_is_ref))),
        WireType::SFixed64 => w.write_line(&format!("output.write_fixed64({} as u64)?;", numeric(base, base_is_ref))),
        WireType::Float => w.write_line(&format!("output.write_float({})?;", numeric(base, base_is_ref))),
        WireType::Double => w.write_line(&format!("output.write_double({})?;", numeric(base, base_is_ref))),
        WireType::Bool => w.write_line(&format!("output.write_bool({})?;", numeric(base, base_is_ref))),
        WireType::String => {
            let s = string_ref(base, base_is_ref);
            w.write_line(&format!(
                "output.write_varint32(pb_runtime::utf8::encoded_length({}) as u32)?;",
                s
            ));
            w.write_line(&format!("output.write_utf8({})?;", s));
        }
        WireType::Bytes => {
            w.write_line(&format!("output.write_varint32({}.as_slice().len() as u32)?;", base));
            w.write_line(&format!("output.write_bytes({}.as_slice())?;", base));
        }
        WireType::Enum => w.write_line(&format!("output.write_varint32({}.number() as u32)?;", base)),
        WireType::Message => unreachable!("message fields use emit_write_submessage"),
    }
}

/// The length of one value's raw encoding, for the `measured_size` pass.
/// For STRING/BYTES this already includes their own length-prefix varint
/// (those wire types are always length-delimited, even as scalars).
fn measured_value_len_expr(field: &SingleField, base: &str, base_is_ref: bool) -> String {
    match field.wire_type {
        WireType::Int32 => format!(
            "pb_runtime::varint::varint64_encoded_len(({} as i64) as u64) as u64",
            numeric(base, base_is_ref)
        ),
        WireType::UInt32 => format!(
            "pb_runtime::varint::varint32_encoded_len({}) as u64",
            numeric(base, base_is_ref)
        ),
        WireType::SInt32 => format!(
            "pb_runtime::varint::varint32_encoded_len(pb_runtime::varint::zigzag_encode32({})) as u64",
            numeric(base, base_is_ref)
        ),
        WireType::Int64 => format!(
            "pb_runtime::varint::varint64_encoded_len({} as u64) as u64",
            numeric(base, base_is_ref)
        ),
        WireType::UInt64 => format!(
            "pb_runtime::varint::varint64_encoded_len({}) as u64",
            numeric(base, base_is_ref)
        ),
        WireType::SInt64 => format!(
            "pb_runtime::varint::varint64_encoded_len(pb_runtime::varint::zigzag_encode64({})) as u64",
            numeric(base, base_is_ref)
        ),
        WireType::Fixed32 | WireType::SFixed32 | WireType::Float => "4u64".to_string(),
        WireType::Fixed64 | WireType::SFixed64 | WireType::Double => "8u64".to_string(),
        WireType::Bool => "1u64".to_string(),
        WireType::String => {
            let s = string_ref(base, base_is_ref);
            format!(
                "{{ let len = pb_runtime::utf8::encoded_length({}); pb_runtime::varint::varint32_encoded_len(len as u32) as u64 + len }}",
                s
            )
        }
        WireType::Bytes => format!(
            "{{ let len = {}.as_slice().len() as u64; pb_runtime::varint::varint32_encoded_len(len as u32) as u64 + len }}",
            base
        ),
        WireType::Enum => format!(
            "pb_runtime::varint::varint32_encoded_len({}.number() as u32) as u64",
            base
        ),
        WireType::Message => unreachable!("message fields carry their own length prefix"),
    }
}

/// The per-element size contributed to a packed repeated field's payload —
/// no per-element tag, since packed elements share the one outer tag.
fn packed_elem_len_expr(field: &SingleField) -> String {
    match field.wire_type {
        WireType::Int32 => {
            "pb_runtime::varint::varint64_encoded_len((*v as i64) as u64) as u64".to_string()
        }
        WireType::UInt32 => "pb_runtime::varint::varint32_encoded_len(*v) as u64".to_string(),
        WireType::SInt32 => {
            "pb_runtime::varint::varint32_encoded_len(pb_runtime::varint::zigzag_encode32(*v)) as u64".to_string()
        }
        WireType::Int64 => "pb_runtime::varint::varint64_encoded_len(*v as u64) as u64".to_string(),
        WireType::UInt64 => "pb_runtime::varint::varint64_encoded_len(*v) as u64".to_string(),
        WireType::SInt64 => {
            "pb_runtime::varint::varint64_encoded_len(pb_runtime::varint::zigzag_encode64(*v)) as u64".to_string()
        }
        WireType::Fixed32 | WireType::SFixed32 | WireType::Float => "4u64".to_string(),
        WireType::Fixed64 | WireType::SFixed64 | WireType::Double => "8u64".to_string(),
        WireType::Bool => "1u64".to_string(),
        WireType::Enum => "pb_runtime::varint::varint32_encoded_len(v.number() as u32) as u64".to_string(),
        other => unreachable!("{:?} is not packable", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_schema::TypeRef;

    fn scalar_field(name: &str, number: i32, wire_type: WireType) -> SingleField {
        SingleField {
            name: name.to_string(),
            number,
            wire_type,
            repeated: false,
            optional: false,
            type_ref: None,
            doc: None,
            deprecated: false,
            oneof_parent: None,
        }
    }

    fn message(fields: Vec<Field>) -> Message {
        Message {
            name: "Foo".to_string(),
            doc: None,
            fields,
            nested_messages: Vec::new(),
            nested_enums: Vec::new(),
            deprecated: false,
        }
    }

    #[test]
    fn elides_zero_valued_scalars() {
        let m = message(vec![
            Field::Single(scalar_field("a", 1, WireType::Int32)),
            Field::Single(scalar_field("b", 2, WireType::String)),
        ]);
        let out = emit_writer(&m);
        assert!(out.contains("if value.a != 0 {"));
        assert!(out.contains("if !value.b.is_empty() {"));
    }

    #[test]
    fn repeated_packable_field_writes_packed_length_delimited() {
        let mut field = scalar_field("nums", 3, WireType::Int32);
        field.repeated = true;
        let m = message(vec![Field::Single(field)]);
        let out = emit_writer(&m);
        assert!(out.contains("if !value.nums.is_empty() {"));
        assert!(out.contains("packed_len"));
    }

    #[test]
    fn plain_int32_writer_sign_extends_through_varint64() {
        let m = message(vec![Field::Single(scalar_field("a", 1, WireType::Int32))]);
        let out = emit_writer(&m);
        assert!(out.contains("output.write_varint64((value.a as i64) as u64)?;"));
        assert!(!out.contains("write_varint32(value.a"));
    }

    #[test]
    fn message_field_uses_premeasured_length_prefix() {
        let mut field = scalar_field("child", 1, WireType::Message);
        field.type_ref = Some(TypeRef {
            fully_qualified_name: "Child".to_string(),
        });
        let m = message(vec![Field::Single(field)]);
        let out = emit_writer(&m);
        assert!(out.contains("ChildWriter::measured_size(v)"));
        assert!(out.contains("ChildWriter::write(v, output)?;"));
    }

    #[test]
    fn oneof_scalar_branch_still_elides_zero_s6() {
        let oneof = OneOfField {
            name: "choice".to_string(),
            children: vec![
                scalar_field("x", 1, WireType::Int32),
                scalar_field("y", 2, WireType::String),
            ],
            discriminant_enum_name: "ChoiceOneOfType".to_string(),
            doc: None,
        };
        let m = message(vec![Field::OneOf(oneof)]);
        let out = emit_writer(&m);
        assert!(out.contains("ChoiceOneOfType::Unset => {}"));
        assert!(out.contains("if *v != 0 {"));
    }
}

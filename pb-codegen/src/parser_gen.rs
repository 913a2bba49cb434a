//! The parser emitter (spec.md §4.4.2): decodes bytes into a model value
//! using the runtime's `ReadableSequentialData`, dispatching on field number,
//! skipping unknown fields by wire type, and assembling the result through
//! the generated `Builder`.

use pb_schema::{Field, Message, OneOfField, SingleField, WireType};

use crate::code_writer::CodeWriter;
use crate::field_info::{accessor_fragment, simple_type_name};
use crate::rust_types::wire_tag_kind;

pub fn emit_parser(message: &Message) -> String {
    let mut w = CodeWriter::new();
    let parser_name = format!("{}Parser", message.name);
    let builder_name = format!("{}Builder", message.name);

    w.doc_comment(&format!("Decodes wire bytes into a [`{}`].", message.name));
    w.pub_struct(&parser_name, |_| {});
    w.write_line("");
    w.impl_self_block(&parser_name, |w| {
        w.pub_fn(
            &format!(
                "parse(input: &mut dyn pb_runtime::ReadableSequentialData) -> pb_runtime::WireFormatResult<{}>",
                message.name
            ),
            |w| {
                w.write_line(&format!("let mut builder = {}::new();", builder_name));
                w.while_block("input.has_remaining()", |w| {
                    w.write_line("let tag = input.read_varint32()?;");
                    w.write_line("let field_number = tag >> 3;");
                    w.write_line("let wire_type = (tag & 0x7) as u8;");
                    w.match_block("field_number", |w| {
                        for field in &message.fields {
                            match field {
                                Field::Single(f) => emit_field_case(w, f),
                                Field::OneOf(o) => emit_oneof_case(w, o),
                            }
                        }
                        w.case_block("_", |w| {
                            w.write_line("skip_field(input, wire_type)?;");
                        });
                    });
                });
                w.write_line("Ok(builder.build())");
            },
        );
    });
    w.write_line("");
    emit_skip_field_helper(&mut w);
    w.finish()
}

fn emit_skip_field_helper(w: &mut CodeWriter) {
    w.comment("Reads and discards one field's value per its wire type (spec.md §4.4.2 \"unknown fields are skipped\").");
    w.def_fn(
        "skip_field(input: &mut dyn pb_runtime::ReadableSequentialData, wire_type: u8) -> pb_runtime::WireFormatResult<()>",
        |w| {
            w.match_block("wire_type", |w| {
                w.case_block("0", |w| w.write_line("input.read_varint64().map(|_| ())"));
                w.case_block("1", |w| w.write_line("input.read_fixed64().map(|_| ())"));
                w.case_block("2", |w| {
                    w.write_line("let len = input.read_varint32()? as usize;");
                    w.write_line("input.read_bytes(len).map(|_| ())");
                });
                w.case_block("5", |w| w.write_line("input.read_fixed32().map(|_| ())"));
                w.case_block("other", |w| {
                    w.write_line("Err(pb_runtime::WireFormatError::UnknownWireType(other))");
                });
            });
        },
    );
}

fn emit_field_case(w: &mut CodeWriter, field: &SingleField) {
    w.case_block(&field.number.to_string(), |w| {
        if field.repeated {
            emit_repeated_read(w, field);
        } else {
            let value_expr = read_expr(field);
            let assign = wrap_single_assignment(field, &value_expr);
            w.write_line(&format!("builder.{} = {};", field.name, assign));
        }
    });
}

fn emit_oneof_case(w: &mut CodeWriter, oneof: &OneOfField) {
    for child in &oneof.children {
        w.case_block(&child.number.to_string(), |w| {
            let value_expr = read_expr(child);
            let frag = accessor_fragment(&child.name);
            w.write_line(&format!("let v = {};", value_expr));
            w.write_line(&format!(
                "builder.{} = {}::{}(v);",
                oneof.name, oneof.discriminant_enum_name, frag
            ));
        });
    }
}

fn wrap_single_assignment(field: &SingleField, value_expr: &str) -> String {
    if field.optional || field.wire_type == WireType::Message {
        format!("Some({})", value_expr)
    } else {
        value_expr.to_string()
    }
}

fn emit_repeated_read(w: &mut CodeWriter, field: &SingleField) {
    let packable = matches!(wire_tag_kind(field.wire_type), 0 | 1 | 5) && field.wire_type != WireType::Message;
    if packable {
        // Accept both packed (length-delimited) and unpacked (repeated tag)
        // encodings, since either is valid wire input for a packable type.
        w.if_stmt("wire_type == 2", |w| {
            w.write_line("let len = input.read_varint32()? as u64;");
            w.write_line("let end = input.position() + len;");
            w.while_block("input.position() < end", |w| {
                let value_expr = read_expr(field);
                w.write_line(&format!("builder.{}.push({});", field.name, value_expr));
            });
        });
        w.block("else", |w| {
            let value_expr = read_expr(field);
            w.write_line(&format!("builder.{}.push({});", field.name, value_expr));
        });
    } else {
        let value_expr = read_expr(field);
        w.write_line(&format!("builder.{}.push({});", field.name, value_expr));
    }
}

/// The expression that reads one value of this field's element type off
/// `input`, assuming the tag has already been consumed.
fn read_expr(field: &SingleField) -> String {
    match field.wire_type {
        WireType::Int32 => "input.read_varint32()? as i32".to_string(),
        WireType::SInt32 => "input.read_sint32()?".to_string(),
        WireType::UInt32 => "input.read_varint32()?".to_string(),
        WireType::Fixed32 => "input.read_fixed32()?".to_string(),
        WireType::SFixed32 => "input.read_fixed32()? as i32".to_string(),
        WireType::Int64 => "input.read_varint64()? as i64".to_string(),
        WireType::SInt64 => "input.read_sint64()?".to_string(),
        WireType::UInt64 => "input.read_varint64()?".to_string(),
        WireType::Fixed64 => "input.read_fixed64()?".to_string(),
        WireType::SFixed64 => "input.read_fixed64()? as i64".to_string(),
        WireType::Float => "input.read_float()?".to_string(),
        WireType::Double => "input.read_double()?".to_string(),
        WireType::Bool => "input.read_bool()?".to_string(),
        WireType::String => "{ let len = input.read_varint32()? as usize; input.read_utf8(len)? }".to_string(),
        WireType::Bytes => {
            "{ let len = input.read_varint32()? as usize; pb_runtime::Bytes::from_vec(input.read_bytes(len)?) }"
                .to_string()
        }
        WireType::Enum => {
            let type_name = simple_type_name(field.type_ref.as_ref().expect("ENUM field has no type_ref"));
            format!(
                "{}::from_number(input.read_varint32()? as i32).unwrap_or({}::DEFAULT)",
                type_name, type_name
            )
        }
        WireType::Message => {
            let type_name = simple_type_name(field.type_ref.as_ref().expect("MESSAGE field has no type_ref"));
            format!(
                "{{ let msg_len = input.read_varint32()? as u64; let saved_limit = input.limit(); input.set_limit(input.position() + msg_len)?; let value = {}::parse_from(input)?; input.set_limit(saved_limit)?; std::rc::Rc::new(value) }}",
                type_name
            )
        }
    }
}

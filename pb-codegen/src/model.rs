//! The model emitter (spec.md §4.4.1): the immutable value type, its
//! `Builder`, accessor conveniences, `hashCode`, and the static codec
//! references.
//!
//! This generator bundles a message's four artifacts (`M`, `MParser`,
//! `MWriter`, `MTest`) into one Rust source file rather than four separate
//! files — the teacher's own generated output co-locates a message struct
//! with its parsing/writing/reflection `impl` blocks in a single `.rs` file
//! per message, and Rust's module granularity favors that over a
//! one-artifact-per-file split. See `DESIGN.md` for the full rationale.

use pb_schema::{Field, Message, OneOfField, SingleField, WireType};

use crate::code_writer::CodeWriter;
use crate::field_info::{
    accessor_fragment, element_type, field_default_expr, field_rust_type, simple_type_name,
};

/// Emits the struct, its oneof enums, inherent accessors, `DEFAULT`,
/// `compute_hash_code`, the static codec constants, and the `Builder`.
pub fn emit_model(message: &Message) -> String {
    let mut w = CodeWriter::new();

    if let Some(doc) = &message.doc {
        w.doc_comment(doc);
    }
    if message.deprecated {
        w.write_line("#[deprecated]");
    }
    w.derive(&["Debug", "Clone", "PartialEq"]);
    w.pub_struct(&message.name, |w| {
        for field in &message.fields {
            match field {
                Field::Single(f) => {
                    if f.deprecated {
                        w.write_line("#[deprecated]");
                    }
                    w.pub_field_decl(&f.name, &field_rust_type(f));
                }
                Field::OneOf(o) => w.pub_field_decl(&o.name, &o.discriminant_enum_name),
            }
        }
    });
    w.write_line("");

    for field in &message.fields {
        if let Field::OneOf(oneof) = field {
            emit_oneof_enum(&mut w, oneof);
            w.write_line("");
        }
    }

    emit_inherent_impl(&mut w, message);
    emit_proto_message_impl(&mut w, message);
    emit_builder(&mut w, message);

    w.finish()
}

fn emit_oneof_enum(w: &mut CodeWriter, oneof: &OneOfField) {
    if let Some(doc) = &oneof.doc {
        w.doc_comment(doc);
    }
    w.derive(&["Debug", "Clone", "PartialEq"]);
    w.write_line(&format!("pub enum {} {{", oneof.discriminant_enum_name));
    w.indented(|w| {
        w.write_line("Unset,");
        for child in &oneof.children {
            w.write_line(&format!(
                "{}({}),",
                accessor_fragment(&child.name),
                element_type(child)
            ));
        }
    });
    w.write_line("}");
    w.write_line("");
    w.block(
        &format!("impl Default for {}", oneof.discriminant_enum_name),
        |w| {
            w.def_fn("default() -> Self", |w| {
                w.write_line(&format!("{}::Unset", oneof.discriminant_enum_name));
            });
        },
    );
}

fn emit_inherent_impl(w: &mut CodeWriter, message: &Message) {
    w.impl_self_block(&message.name, |w| {
        emit_default_accessor(w, message);
        w.write_line("");
        for field in &message.fields {
            match field {
                Field::Single(f) if f.wire_type == WireType::Message && !f.repeated => {
                    emit_message_field_accessors(w, f);
                    w.write_line("");
                }
                Field::OneOf(o) => {
                    emit_oneof_accessors(w, o);
                    w.write_line("");
                }
                _ => {}
            }
        }
        emit_hash_code(w, message);
        w.write_line("");
        emit_codec_constants(w, message);
    });
    w.write_line("");
}

fn emit_codec_constants(w: &mut CodeWriter, message: &Message) {
    w.write_line(&format!(
        "pub const PROTOBUF: pb_runtime::ProtobufCodec<{}> = pb_runtime::ProtobufCodec::new();",
        message.name
    ));
    w.write_line("#[cfg(feature = \"serde\")]");
    w.write_line(&format!(
        "pub const JSON: pb_runtime::JsonCodec<{}> = pb_runtime::JsonCodec::new();",
        message.name
    ));
}

fn emit_default_accessor(w: &mut CodeWriter, message: &Message) {
    w.comment("Lazily built once; OnceLock guarantees the same reference on every call.");
    w.pub_fn(&format!("default_instance() -> &'static {}", message.name), |w| {
        w.write_line(&format!(
            "static DEFAULT: std::sync::OnceLock<{}> = std::sync::OnceLock::new();",
            message.name
        ));
        w.write_line("DEFAULT.get_or_init(|| {");
        w.indented(|w| {
            w.write_line(&format!("{} {{", message.name));
            w.indented(|w| {
                for field in &message.fields {
                    match field {
                        Field::Single(f) => w.field_entry(&f.name, &field_default_expr(f)),
                        Field::OneOf(o) => {
                            w.field_entry(&o.name, &format!("{}::Unset", o.discriminant_enum_name))
                        }
                    }
                }
            });
            w.write_line("}");
        });
        w.write_line("})");
    });
}

fn emit_message_field_accessors(w: &mut CodeWriter, field: &SingleField) {
    let frag = accessor_fragment(&field.name);
    let elem = element_type(field);
    w.pub_fn(&format!("has_{}(&self) -> bool", field.name), |w| {
        w.write_line(&format!("self.{}.is_some()", field.name));
    });
    w.pub_fn(
        &format!("{}_or_else<'a>(&'a self, default: &'a {}) -> &'a {}", field.name, elem, elem),
        |w| {
            w.write_line(&format!("self.{}.as_deref().unwrap_or(default)", field.name));
        },
    );
    w.pub_fn(&format!("{}_or_throw(&self) -> &{}", field.name, elem), |w| {
        w.write_line(&format!(
            "self.{}.as_deref().expect(\"{} is not set\")",
            field.name, field.name
        ));
    });
    w.pub_fn(
        &format!("if_{}(&self, consumer: impl FnOnce(&{}))", frag, elem),
        |w| {
            w.if_let_stmt("Some(v)", &format!("&self.{}", field.name), |w| {
                w.write_line("consumer(v);");
            });
        },
    );
}

fn emit_oneof_accessors(w: &mut CodeWriter, oneof: &OneOfField) {
    for child in &oneof.children {
        let frag = accessor_fragment(&child.name);
        let elem = element_type(child);
        w.pub_fn(&format!("{}(&self) -> Option<&{}>", child.name, elem), |w| {
            w.match_block(&format!("&self.{}", oneof.name), |w| {
                w.case_block(
                    &format!("{}::{}(v)", oneof.discriminant_enum_name, frag),
                    |w| w.write_line("Some(v)"),
                );
                w.case_block("_", |w| w.write_line("None"));
            });
        });
        w.pub_fn(&format!("has_{}(&self) -> bool", child.name), |w| {
            w.write_line(&format!("self.{}().is_some()", child.name));
        });
        w.pub_fn(
            &format!("{}_or_else<'a>(&'a self, default: &'a {}) -> &'a {}", child.name, elem, elem),
            |w| w.write_line(&format!("self.{}().unwrap_or(default)", child.name)),
        );
        w.pub_fn(&format!("{}_or_throw(&self) -> &{}", child.name, elem), |w| {
            w.write_line(&format!(
                "self.{}().expect(\"{} branch is not set\")",
                child.name, child.name
            ));
        });
    }
}

/// Spec.md §4.4.1.b: `result = 1`, fold each field in declaration order via
/// polynomial-31 `mix`, then run the fixed avalanche sequence once.
fn emit_hash_code(w: &mut CodeWriter, message: &Message) {
    w.pub_fn("compute_hash_code(&self) -> i32", |w| {
        w.write_line("let mut result: i32 = 1;");
        for field in &message.fields {
            match field {
                Field::Single(f) => emit_field_hash_fold(w, f),
                Field::OneOf(o) => emit_oneof_hash_fold(w, o),
            }
        }
        w.write_line("pb_runtime::hash::avalanche(result)");
    });
}

fn emit_field_hash_fold(w: &mut CodeWriter, field: &SingleField) {
    if field.repeated {
        w.write_line(&format!("for v in &self.{} {{", field.name));
        w.indented(|w| {
            let per_elem = scalar_field_hash_expr(field, "v");
            w.write_line(&format!("result = pb_runtime::hash::mix(result, {});", per_elem));
        });
        w.write_line("}");
    } else if field.optional || field.wire_type == WireType::Message {
        w.write_line(&format!("match &self.{} {{", field.name));
        w.indented(|w| {
            let inner_expr = scalar_field_hash_expr_named(field, "v");
            w.write_line(&format!("Some(v) => result = pb_runtime::hash::mix(result, {}),", inner_expr));
            w.write_line("None => result = pb_runtime::hash::mix(result, 0),");
        });
        w.write_line("}");
    } else {
        let expr = scalar_field_hash_expr_named(field, &format!("self.{}", field.name));
        w.write_line(&format!("result = pb_runtime::hash::mix(result, {});", expr));
    }
}

fn emit_oneof_hash_fold(w: &mut CodeWriter, oneof: &OneOfField) {
    w.write_line(&format!("match &self.{} {{", oneof.name));
    w.indented(|w| {
        w.write_line(&format!("{}::Unset => result = pb_runtime::hash::mix(result, 0),", oneof.discriminant_enum_name));
        for child in &oneof.children {
            let frag = accessor_fragment(&child.name);
            let inner = scalar_field_hash_expr_named(child, "v");
            w.write_line(&format!(
                "{}::{}(v) => result = pb_runtime::hash::mix(result, {}),",
                oneof.discriminant_enum_name, frag, inner
            ));
        }
    });
    w.write_line("}");
}

/// `name` is either `self.<field>` (required scalar) or `v` (bound inside a
/// `match`/`for` arm unwrapping an `Option`/`Vec` element).
fn scalar_field_hash_expr_named(field: &SingleField, name: &str) -> String {
    match field.wire_type {
        WireType::Int32 | WireType::SInt32 | WireType::UInt32 | WireType::Fixed32 | WireType::SFixed32 => {
            format!("{} as i32", name)
        }
        WireType::Int64 | WireType::SInt64 | WireType::UInt64 | WireType::Fixed64 | WireType::SFixed64 => {
            format!("pb_runtime::hash::hash_long({} as i64)", name)
        }
        WireType::Float => format!("{}.to_bits() as i32", name),
        WireType::Double => format!("pb_runtime::hash::hash_long({}.to_bits() as i64)", name),
        WireType::Bool => format!("if {} {{ 1 }} else {{ 0 }}", name),
        WireType::String => format!("pb_runtime::hash::hash_bytes({}.as_bytes())", name),
        WireType::Bytes => format!("pb_runtime::hash::hash_bytes({}.as_slice())", name),
        WireType::Enum => format!("{}.number()", name),
        WireType::Message => format!("{}.compute_hash_code()", name),
    }
}

fn emit_proto_message_impl(w: &mut CodeWriter, message: &Message) {
    w.impl_for_block("pb_runtime::ProtoMessage", &message.name, |w| {
        w.def_fn(
            "parse_from(input: &mut dyn pb_runtime::ReadableSequentialData) -> pb_runtime::WireFormatResult<Self>",
            |w| w.write_line(&format!("{}Parser::parse(input)", message.name)),
        );
        w.def_fn(
            "write_to(&self, output: &mut dyn pb_runtime::WritableSequentialData) -> pb_runtime::WireFormatResult<()>",
            |w| w.write_line(&format!("{}Writer::write(self, output)", message.name)),
        );
        w.def_fn("measured_size(&self) -> u64", |w| {
            w.write_line(&format!("{}Writer::measured_size(self)", message.name))
        });
    });
    w.write_line("");
}

fn emit_builder(w: &mut CodeWriter, message: &Message) {
    let builder_name = format!("{}Builder", message.name);
    w.derive(&["Debug", "Clone", "Default"]);
    w.pub_struct(&builder_name, |w| {
        for field in &message.fields {
            match field {
                Field::Single(f) => w.pub_field_decl(&f.name, &field_rust_type(f)),
                Field::OneOf(o) => w.pub_field_decl(&o.name, &o.discriminant_enum_name),
            }
        }
    });
    w.write_line("");
    w.impl_self_block(&builder_name, |w| {
        w.pub_fn("new() -> Self", |w| w.write_line("Self::default()"));
        w.write_line("");
        for field in &message.fields {
            if let Field::Single(f) = field {
                emit_builder_setter(w, f);
                w.write_line("");
            }
        }
        w.pub_fn(&format!("build(self) -> {}", message.name), |w| {
            w.write_line(&format!("{} {{", message.name));
            w.indented(|w| {
                for field in &message.fields {
                    let name = field.name();
                    w.field_entry(name, &format!("self.{}", name));
                }
            });
            w.write_line("}");
        });
    });
    w.write_line("");
    w.impl_self_block(&message.name, |w| {
        w.pub_fn(&format!("copy_builder(&self) -> {}", builder_name), |w| {
            w.write_line(&format!("{} {{", builder_name));
            w.indented(|w| {
                for field in &message.fields {
                    let name = field.name();
                    w.field_entry(name, &format!("self.{}.clone()", name));
                }
            });
            w.write_line("}");
        });
    });
}

fn emit_builder_setter(w: &mut CodeWriter, field: &SingleField) {
    if field.repeated {
        let elem = element_type(field);
        w.pub_fn(
            &format!("{}(mut self, values: impl IntoIterator<Item = {}>) -> Self", field.name, elem),
            |w| {
                w.write_line(&format!("self.{} = values.into_iter().collect();", field.name));
                w.write_line("self");
            },
        );
        return;
    }
    let ty = field_rust_type(field);
    w.pub_fn(&format!("{}(mut self, value: {}) -> Self", field.name, ty), |w| {
        w.write_line(&format!("self.{} = value;", field.name));
        w.write_line("self");
    });
    if field.wire_type == WireType::Message {
        emit_message_builder_overload(w, field);
    }
}

/// spec.md §4.4.1: "an overload accepting a builder for nested messages" —
/// lets a caller pass a child `Builder` directly instead of calling `build()`
/// first. Named distinctly from the plain setter since Rust has no method
/// overloading.
fn emit_message_builder_overload(w: &mut CodeWriter, field: &SingleField) {
    let type_name = simple_type_name(field.type_ref.as_ref().expect("MESSAGE field has no type_ref"));
    w.pub_fn(
        &format!("{}_builder(mut self, builder: {}Builder) -> Self", field.name, type_name),
        |w| {
            w.write_line(&format!(
                "self.{} = Some(std::rc::Rc::new(builder.build()));",
                field.name
            ));
            w.write_line("self");
        },
    );
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

    #[test]
    fn struct_has_one_field_per_declared_field() {
        let message = Message {
            name: "Foo".to_string(),
            doc: None,
            fields: vec![
                Field::Single(scalar_field("a", 1, WireType::Int32)),
                Field::Single(scalar_field("b", 2, WireType::String)),
            ],
            nested_messages: Vec::new(),
            nested_enums: Vec::new(),
            deprecated: false,
        };
        let out = emit_model(&message);
        assert!(out.contains("pub struct Foo {"));
        assert!(out.contains("pub a: i32,"));
        assert!(out.contains("pub b: String,"));
    }

    #[test]
    fn oneof_generates_discriminant_enum_with_unset() {
        let oneof = OneOfField {
            name: "choice".to_string(),
            children: vec![scalar_field("x", 1, WireType::Int32)],
            discriminant_enum_name: "ChoiceOneOfType".to_string(),
            doc: None,
        };
        let message = Message {
            name: "Foo".to_string(),
            doc: None,
            fields: vec![Field::OneOf(oneof)],
            nested_messages: Vec::new(),
            nested_enums: Vec::new(),
            deprecated: false,
        };
        let out = emit_model(&message);
        assert!(out.contains("pub enum ChoiceOneOfType {"));
        assert!(out.contains("Unset,"));
        assert!(out.contains("X(i32),"));
    }

    #[test]
    fn message_field_gets_builder_overload() {
        let mut field = scalar_field("child", 1, WireType::Message);
        field.type_ref = Some(TypeRef {
            fully_qualified_name: "Child".to_string(),
        });
        let message = Message {
            name: "Foo".to_string(),
            doc: None,
            fields: vec![Field::Single(field)],
            nested_messages: Vec::new(),
            nested_enums: Vec::new(),
            deprecated: false,
        };
        let out = emit_model(&message);
        assert!(out.contains("pub fn child_builder(mut self, builder: ChildBuilder) -> Self {"));
        assert!(out.contains("self.child = Some(std::rc::Rc::new(builder.build()));"));
    }

    #[test]
    fn deprecated_field_and_message_get_the_attribute() {
        let mut field = scalar_field("a", 1, WireType::Int32);
        field.deprecated = true;
        let message = Message {
            name: "Foo".to_string(),
            doc: None,
            fields: vec![Field::Single(field), Field::Single(scalar_field("b", 2, WireType::Int32))],
            nested_messages: Vec::new(),
            nested_enums: Vec::new(),
            deprecated: true,
        };
        let out = emit_model(&message);
        let struct_attr_idx = out.find("#[deprecated]").expect("message-level attribute present");
        let struct_idx = out.find("pub struct Foo {").unwrap();
        assert!(struct_attr_idx < struct_idx);
        let field_a_idx = out.find("pub a: i32,").unwrap();
        let field_b_idx = out.find("pub b: i32,").unwrap();
        let second_attr_idx = out[struct_attr_idx + 1..].find("#[deprecated]").unwrap() + struct_attr_idx + 1;
        assert!(second_attr_idx < field_a_idx);
        assert!(second_attr_idx < field_b_idx);
    }

    #[test]
    fn hash_code_uses_avalanche_as_final_step() {
        let message = Message {
            name: "Foo".to_string(),
            doc: None,
            fields: vec![Field::Single(scalar_field("a", 1, WireType::Int32))],
            nested_messages: Vec::new(),
            nested_enums: Vec::new(),
            deprecated: false,
        };
        let out = emit_model(&message);
        assert!(out.contains("let mut result: i32 = 1;"));
        assert!(out.contains("pb_runtime::hash::avalanche(result)"));
    }
}

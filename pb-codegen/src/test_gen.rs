//! The test emitter (spec.md §4.4.4): `createModelTestArguments`-style
//! sample data per field, cartesian-lite combined into N sample models, plus
//! a round-trip test that writes, parses, and compares. MESSAGE/ENUM fields
//! need to resolve sibling types by name, and cyclic schemas need a
//! configured cut set, so unlike the other emitters this one takes a small
//! [`TestEmitterConfig`] alongside the `Message` it is generating.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use pb_schema::{Enum, Field, Message, OneOfField, SingleField, WireType};

use crate::code_writer::CodeWriter;
use crate::field_info::{accessor_fragment, simple_type_name};
use crate::rust_types::upper_camel;

/// Registry of sibling types and the cycle-break blacklist (spec.md §4.4.4
/// "Cycle-break"), assembled once per compile by the orchestrator and handed
/// to every call of [`emit_test`].
pub struct TestEmitterConfig<'a> {
    pub messages: &'a HashMap<String, Rc<Message>>,
    pub enums: &'a HashMap<String, Rc<Enum>>,
    pub cycle_break: &'a HashSet<String>,
}

pub fn emit_test(message: &Message, config: &TestEmitterConfig) -> String {
    let mut w = CodeWriter::new();
    let test_name = format!("{}Test", message.name);

    w.doc_comment(&format!(
        "Representative sample values and a round-trip check for [`{}`].",
        message.name
    ));
    w.write_line("#[cfg(test)]");
    w.pub_struct(&test_name, |_| {});
    w.write_line("");
    w.write_line("#[cfg(test)]");
    w.impl_self_block(&test_name, |w| {
        w.doc_comment("spec.md §4.4.4 `createModelTestArguments`: the i-th of N models takes `min(i, list.len()-1)` from each field's sample list.");
        w.pub_fn(&format!("sample_values() -> Vec<{}>", message.name), |w| {
            emit_sample_values_body(w, message, config);
        });
    });
    w.write_line("");
    w.write_line("#[cfg(test)]");
    w.write_line("#[test]");
    w.def_fn(
        &format!("{}_round_trips_through_wire_bytes()", snake_case(&message.name)),
        |w| {
            w.write_line(&format!("for model in {}::sample_values() {{", test_name));
            w.indented(|w| {
                w.write_line(&format!(
                    "let bytes = {}Writer::write_to_vec(&model).expect(\"write succeeds\");",
                    message.name
                ));
                w.write_line(&format!(
                    "assert_eq!(bytes.len() as u64, {}Writer::measured_size(&model));",
                    message.name
                ));
                w.write_line("let mut buf = pb_runtime::BufferedData::wrap(bytes);");
                w.write_line(&format!(
                    "let decoded = {}Parser::parse(&mut buf).expect(\"parse succeeds\");",
                    message.name
                ));
                w.write_line("assert_eq!(model, decoded);");
            });
            w.write_line("}");
        },
    );

    w.finish()
}

fn emit_sample_values_body(w: &mut CodeWriter, message: &Message, config: &TestEmitterConfig) {
    let literals = build_model_literals(message, config);
    w.write_line("vec![");
    w.indented(|w| {
        for literal in &literals {
            w.write_line(&format!("{},", literal));
        }
    });
    w.write_line("]");
}

/// Builds one struct-literal expression per sample model, shared between the
/// top-level message being emitted and any MESSAGE field that recurses into
/// a sibling message's own sample space.
fn build_model_literals(message: &Message, config: &TestEmitterConfig) -> Vec<String> {
    let mut fields: Vec<&Field> = message.fields.iter().collect();
    fields.sort_by_key(|f| f.numbers().into_iter().min().unwrap_or(i32::MAX));

    if fields.is_empty() {
        return vec![format!("{} {{ }}", message.name)];
    }

    let per_field: Vec<(String, Vec<String>)> = fields
        .iter()
        .map(|field| {
            let samples = match field {
                Field::Single(f) => field_value_samples(f, config),
                Field::OneOf(o) => oneof_value_samples(o, config),
            };
            (field.name().to_string(), samples)
        })
        .collect();

    let n = per_field.iter().map(|(_, v)| v.len()).max().unwrap_or(1).max(1);

    (0..n)
        .map(|i| {
            let parts: Vec<String> = per_field
                .iter()
                .map(|(name, samples)| {
                    let idx = i.min(samples.len().saturating_sub(1));
                    let expr = samples
                        .get(idx)
                        .cloned()
                        .unwrap_or_else(|| "Default::default()".to_string());
                    format!("{}: {}", name, expr)
                })
                .collect();
            format!("{} {{ {} }}", message.name, parts.join(", "))
        })
        .collect()
}

/// The sample list for a whole field (after `repeated`/`optional` wrapping),
/// built from the element-type sample list via [`scalar_sample_exprs`].
fn field_value_samples(field: &SingleField, config: &TestEmitterConfig) -> Vec<String> {
    if field.repeated {
        let elems = scalar_sample_exprs(field, config);
        if elems.is_empty() {
            return vec!["Vec::new()".to_string()];
        }
        let mut shapes = vec!["Vec::new()".to_string(), format!("vec![{}]", elems[0])];
        if elems.len() > 1 {
            shapes.push(format!("vec![{}]", elems.join(", ")));
        }
        return shapes;
    }
    if field.optional || field.wire_type == WireType::Message {
        let elems = scalar_sample_exprs(field, config);
        let mut samples = vec!["None".to_string()];
        samples.extend(elems.into_iter().map(|e| format!("Some({})", e)));
        return samples;
    }
    scalar_sample_exprs(field, config)
}

/// `UNSET` plus, for each branch, its own element samples mapped through the
/// discriminant constructor (spec.md §4.4.4 OneOf row). MESSAGE branches
/// naming a cycle-break message contribute nothing, via
/// [`scalar_sample_exprs`]'s own cycle-break check.
fn oneof_value_samples(oneof: &OneOfField, config: &TestEmitterConfig) -> Vec<String> {
    let mut samples = vec![format!("{}::Unset", oneof.discriminant_enum_name)];
    for child in &oneof.children {
        let frag = accessor_fragment(&child.name);
        for elem in scalar_sample_exprs(child, config) {
            samples.push(format!("{}::{}({})", oneof.discriminant_enum_name, frag, elem));
        }
    }
    samples
}

/// The sample list for one field's *element* type, ignoring `repeated`/
/// `optional` wrapping (spec.md §4.4.4 table).
///
/// FIXED32/FIXED64 are unsigned fixed-width integers on the wire (the same
/// family as UINT32/UINT64, just not varint-encoded), so they share the
/// UINT32/UINT64 integer sample lists here rather than the floating-point
/// lists spec.md's table lists under those names — see `DESIGN.md`.
fn scalar_sample_exprs(field: &SingleField, config: &TestEmitterConfig) -> Vec<String> {
    match field.wire_type {
        WireType::Int32 | WireType::SInt32 | WireType::SFixed32 => {
            ["i32::MIN", "-42", "-21", "0", "21", "42", "i32::MAX"]
                .iter()
                .map(|s| s.to_string())
                .collect()
        }
        WireType::UInt32 | WireType::Fixed32 => ["0u32", "1u32", "2u32", "u32::MAX"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        WireType::Int64 | WireType::SInt64 | WireType::SFixed64 => [
            "i64::MIN", "-42i64", "-21i64", "0i64", "21i64", "42i64", "i64::MAX",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        WireType::UInt64 | WireType::Fixed64 => ["0u64", "21u64", "42u64", "u64::MAX"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        WireType::Float => [
            "f32::NEG_INFINITY",
            "f32::MIN",
            "-102.7f32",
            "-5f32",
            "1.7f32",
            "0f32",
            "3f32",
            "5.2f32",
            "42.1f32",
            "f32::MAX",
            "f32::INFINITY",
            "f32::NAN",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        WireType::Double => [
            "f64::NEG_INFINITY",
            "f64::MIN",
            "-102.7f64",
            "-5f64",
            "1.7f64",
            "0f64",
            "3f64",
            "5.2f64",
            "42.1f64",
            "f64::MAX",
            "f64::INFINITY",
            "f64::NAN",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        WireType::Bool => vec!["true".to_string(), "false".to_string()],
        WireType::String => vec!["String::new()".to_string(), "\"Dude\".to_string()".to_string()],
        WireType::Bytes => vec![
            "pb_runtime::Bytes::empty()".to_string(),
            "pb_runtime::Bytes::from_vec(vec![0b001])".to_string(),
            "pb_runtime::Bytes::from_vec(vec![0b001, 0b010, 0b011])".to_string(),
        ],
        WireType::Enum => {
            let type_name = simple_type_name(field.type_ref.as_ref().expect("ENUM field has no type_ref"));
            match config.enums.get(&type_name) {
                Some(en) if !en.values.is_empty() => en
                    .values
                    .iter()
                    .map(|v| format!("{}::{}", type_name, upper_camel(&v.name)))
                    .collect(),
                _ => vec![format!("{}::DEFAULT", type_name)],
            }
        }
        WireType::Message => {
            let type_name = simple_type_name(field.type_ref.as_ref().expect("MESSAGE field has no type_ref"));
            if config.cycle_break.contains(&type_name) {
                return Vec::new();
            }
            match config.messages.get(&type_name) {
                Some(child) => build_model_literals(child, config)
                    .into_iter()
                    .map(|literal| format!("std::rc::Rc::new({})", literal))
                    .collect(),
                None => Vec::new(),
            }
        }
    }
}

fn snake_case(name: &str) -> String {
    let mut out = String::new();
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_schema::EnumValue;

    fn empty_config() -> (HashMap<String, Rc<Message>>, HashMap<String, Rc<Enum>>, HashSet<String>) {
        (HashMap::new(), HashMap::new(), HashSet::new())
    }

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
    fn bool_field_has_two_samples() {
        let (messages, enums, cycle_break) = empty_config();
        let config = TestEmitterConfig {
            messages: &messages,
            enums: &enums,
            cycle_break: &cycle_break,
        };
        let message = Message {
            name: "Foo".to_string(),
            doc: None,
            fields: vec![Field::Single(scalar_field("flag", 1, WireType::Bool))],
            nested_messages: Vec::new(),
            nested_enums: Vec::new(),
            deprecated: false,
        };
        let out = emit_test(&message, &config);
        assert!(out.contains("flag: true"));
        assert!(out.contains("flag: false"));
    }

    #[test]
    fn cycle_break_message_contributes_no_samples() {
        let (messages, enums, mut cycle_break) = empty_config();
        cycle_break.insert("Self".to_string());
        let config = TestEmitterConfig {
            messages: &messages,
            enums: &enums,
            cycle_break: &cycle_break,
        };
        let mut field = scalar_field("next", 1, WireType::Message);
        field.type_ref = Some(pb_schema::TypeRef {
            fully_qualified_name: "Self".to_string(),
        });
        let message = Message {
            name: "Self".to_string(),
            doc: None,
            fields: vec![Field::Single(field)],
            nested_messages: Vec::new(),
            nested_enums: Vec::new(),
            deprecated: false,
        };
        let out = emit_test(&message, &config);
        assert!(out.contains("next: None"));
        assert!(!out.contains("Rc::new"));
    }

    #[test]
    fn enum_field_enumerates_all_declared_values() {
        let (messages, mut enums, cycle_break) = empty_config();
        enums.insert(
            "Color".to_string(),
            Rc::new(Enum {
                name: "Color".to_string(),
                doc: None,
                values: vec![
                    EnumValue {
                        name: "RED".to_string(),
                        number: 0,
                        deprecated: false,
                        doc: None,
                    },
                    EnumValue {
                        name: "BLUE".to_string(),
                        number: 1,
                        deprecated: false,
                        doc: None,
                    },
                ],
            }),
        );
        let config = TestEmitterConfig {
            messages: &messages,
            enums: &enums,
            cycle_break: &cycle_break,
        };
        let mut field = scalar_field("color", 1, WireType::Enum);
        field.type_ref = Some(pb_schema::TypeRef {
            fully_qualified_name: "Color".to_string(),
        });
        let message = Message {
            name: "Foo".to_string(),
            doc: None,
            fields: vec![Field::Single(field)],
            nested_messages: Vec::new(),
            nested_enums: Vec::new(),
            deprecated: false,
        };
        let out = emit_test(&message, &config);
        assert!(out.contains("color: Color::Red"));
        assert!(out.contains("color: Color::Blue"));
    }
}

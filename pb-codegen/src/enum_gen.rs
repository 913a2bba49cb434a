//! Emits a proto3 `Enum` as a fieldless Rust enum with the protobuf integer
//! value as its explicit discriminant, plus the `number()`/`from_number()`
//! conversions and `DEFAULT` constant generated code and the parser/writer
//! emitters rely on.

use pb_schema::Enum;

use crate::code_writer::CodeWriter;
use crate::rust_types::upper_camel;

pub fn emit_enum(en: &Enum) -> String {
    let mut w = CodeWriter::new();

    if let Some(doc) = &en.doc {
        w.doc_comment(doc);
    }
    w.derive(&["Debug", "Clone", "Copy", "PartialEq", "Eq"]);
    w.write_line(&format!("pub enum {} {{", en.name));
    w.indented(|w| {
        for value in &en.values {
            if value.deprecated {
                w.write_line("#[deprecated]");
            }
            if let Some(doc) = &value.doc {
                w.doc_comment(doc);
            }
            w.write_line(&format!("{} = {},", upper_camel(&value.name), value.number));
        }
    });
    w.write_line("}");
    w.write_line("");

    let default_variant = upper_camel(
        &en.default_value()
            .expect("schema builder guarantees every enum has a 0 value")
            .name,
    );

    w.impl_self_block(&en.name, |w| {
        w.write_line(&format!(
            "pub const DEFAULT: {} = {}::{};",
            en.name, en.name, default_variant
        ));
        w.write_line("");
        w.pub_fn("number(&self) -> i32", |w| w.write_line("*self as i32"));
        w.write_line("");
        w.pub_fn(&format!("from_number(n: i32) -> Option<{}>", en.name), |w| {
            w.match_block("n", |w| {
                for value in &en.values {
                    w.case_block(&value.number.to_string(), |w| {
                        w.write_line(&format!("Some({}::{})", en.name, upper_camel(&value.name)))
                    });
                }
                w.case_block("_", |w| w.write_line("None"));
            });
        });
    });
    w.write_line("");

    w.block(&format!("impl Default for {}", en.name), |w| {
        w.def_fn("default() -> Self", |w| w.write_line(&format!("{}::DEFAULT", en.name)));
    });

    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_schema::EnumValue;

    #[test]
    fn emits_fieldless_enum_with_explicit_discriminants() {
        let en = Enum {
            name: "Color".to_string(),
            doc: None,
            values: vec![
                EnumValue {
                    name: "UNKNOWN".to_string(),
                    number: 0,
                    deprecated: false,
                    doc: None,
                },
                EnumValue {
                    name: "RED".to_string(),
                    number: 1,
                    deprecated: false,
                    doc: None,
                },
            ],
        };
        let out = emit_enum(&en);
        assert!(out.contains("pub enum Color {"));
        assert!(out.contains("Unknown = 0,"));
        assert!(out.contains("Red = 1,"));
        assert!(out.contains("pub const DEFAULT: Color = Color::Unknown;"));
    }
}

//! Walks one or more parse trees and constructs the immutable schema model
//! (spec.md §4.2). Building happens in two passes across the whole input
//! set: first a name scan so every field can tell whether a named type
//! reference is an enum or a message (needed to distinguish `WireType::Enum`
//! from `WireType::Message` before the symbol table — which is itself built
//! from the *output* of this pass — exists), then the real construction.
//! A final validation pass against the completed `SymbolTable` raises
//! `UnresolvedReference` for anything still dangling.

use std::collections::HashSet;
use std::rc::Rc;

use pb_parser::ast::{
    EnumNode, FieldNode, FieldTypeName, MessageNode, OneofNode, ProtoFile, ScalarType,
};

use crate::error::{SchemaError, SchemaResult};
use crate::model::{
    camel_to_upper_snake, wrapper_wire_type, Enum, EnumValue, Field, Message, OneOfField,
    SchemaFile, SingleField, WireType,
};
use crate::symbols::{NamespaceConfig, SymbolTable};

/// One file's AST plus the bookkeeping the builder needs to locate it in
/// the eventual output layout.
pub struct FileInput {
    pub path: String,
    pub dir_bucket: String,
    pub ast: ProtoFile,
}

/// Builds the full schema model for a compile: every `SchemaFile`, and the
/// completed `SymbolTable` those files resolve against.
pub fn build_schema(
    inputs: &[FileInput],
    namespaces: NamespaceConfig,
) -> SchemaResult<(Vec<SchemaFile>, SymbolTable)> {
    let mut enum_names = HashSet::new();
    let mut message_names = HashSet::new();
    for input in inputs {
        collect_names(
            &input.ast.messages,
            &input.ast.enums,
            "",
            &mut enum_names,
            &mut message_names,
        );
    }

    let mut files = Vec::with_capacity(inputs.len());
    for input in inputs {
        for unknown in &input.ast.unknown_elements {
            log::warn!(
                "{}:{}: unrecognized top-level element: {}",
                input.path,
                unknown.loc,
                unknown.description
            );
        }
        let messages = input
            .ast
            .messages
            .iter()
            .map(|m| build_message(m, &input.path, &enum_names, &message_names, &[]))
            .collect::<SchemaResult<Vec<_>>>()?;
        let enums = input
            .ast
            .enums
            .iter()
            .map(|e| build_enum(e, &input.path))
            .collect::<SchemaResult<Vec<_>>>()?;
        files.push(SchemaFile {
            path: input.path.clone(),
            namespace_override: find_java_package(&input.ast),
            dir_bucket: input.dir_bucket.clone(),
            messages,
            enums,
        });
    }

    let table = SymbolTable::build(&files, namespaces);
    validate_references(&files, &table)?;
    Ok((files, table))
}

fn find_java_package(ast: &ProtoFile) -> Option<String> {
    ast.options.iter().find_map(|opt| {
        if opt.name == "java_package" {
            match &opt.value {
                pb_parser::ast::OptionValue::Str(s) => Some(s.clone()),
                _ => None,
            }
        } else {
            None
        }
    })
}

fn collect_names(
    messages: &[MessageNode],
    enums: &[EnumNode],
    prefix: &str,
    enum_names: &mut HashSet<String>,
    message_names: &mut HashSet<String>,
) {
    for en in enums {
        enum_names.insert(qualify(prefix, &en.name));
    }
    for message in messages {
        let qualified = qualify(prefix, &message.name);
        message_names.insert(qualified.clone());
        collect_names(
            &message.nested_messages,
            &message.nested_enums,
            &qualified,
            enum_names,
            message_names,
        );
    }
}

fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Resolves a named field type against the enclosing scope chain, innermost
/// first, the way protoc itself resolves relative type names — falling back
/// to the bare name if no enclosing scope has it. A name not found in
/// either set is still classified as MESSAGE (the common case); its
/// non-existence surfaces later as `UnresolvedReference` once the full
/// `SymbolTable` is available.
fn resolve_named_type(
    name: &str,
    scopes: &[String],
    enum_names: &HashSet<String>,
    message_names: &HashSet<String>,
) -> (WireType, String) {
    let trimmed = name.trim_start_matches('.');
    let mut candidates: Vec<String> = scopes
        .iter()
        .rev()
        .map(|scope| qualify(scope, trimmed))
        .collect();
    candidates.push(trimmed.to_string());

    for candidate in &candidates {
        if enum_names.contains(candidate) {
            return (WireType::Enum, candidate.clone());
        }
    }
    for candidate in &candidates {
        if message_names.contains(candidate) {
            return (WireType::Message, candidate.clone());
        }
    }
    (WireType::Message, trimmed.to_string())
}

fn build_message(
    node: &MessageNode,
    path: &str,
    enum_names: &HashSet<String>,
    message_names: &HashSet<String>,
    scopes: &[String],
) -> SchemaResult<Rc<Message>> {
    let mut child_scopes = scopes.to_vec();
    child_scopes.push(qualify(scopes.last().map(String::as_str).unwrap_or(""), &node.name));

    for unknown in &node.unknown_elements {
        log::warn!(
            "{}:{}: unrecognized element inside message {}: {}",
            path,
            unknown.loc,
            node.name,
            unknown.description
        );
    }
    for map_field in &node.map_fields {
        return Err(SchemaError::UnsupportedMap {
            message_name: node.name.clone(),
            field_name: map_field.name.clone(),
        });
    }

    let mut fields = Vec::new();
    for field_node in &node.fields {
        fields.push(Field::Single(build_single_field(
            field_node,
            enum_names,
            message_names,
            &child_scopes,
            None,
        )));
    }
    for oneof_node in &node.oneofs {
        fields.push(Field::OneOf(build_oneof(
            oneof_node,
            enum_names,
            message_names,
            &child_scopes,
        )));
    }

    check_duplicate_numbers(&node.name, &fields)?;

    let nested_messages = node
        .nested_messages
        .iter()
        .map(|m| build_message(m, path, enum_names, message_names, &child_scopes))
        .collect::<SchemaResult<Vec<_>>>()?;
    let nested_enums = node
        .nested_enums
        .iter()
        .map(|e| build_enum(e, &node.name))
        .collect::<SchemaResult<Vec<_>>>()?;

    Ok(Rc::new(Message {
        name: node.name.clone(),
        doc: node.doc.clone(),
        fields,
        nested_messages,
        nested_enums,
        deprecated: node.deprecated,
    }))
}

fn check_duplicate_numbers(message_name: &str, fields: &[Field]) -> SchemaResult<()> {
    let mut seen = HashSet::new();
    for field in fields {
        for number in field.numbers() {
            if !seen.insert(number) {
                return Err(SchemaError::DuplicateFieldNumber {
                    message_name: message_name.to_string(),
                    number,
                });
            }
        }
    }
    Ok(())
}

fn build_single_field(
    node: &FieldNode,
    enum_names: &HashSet<String>,
    message_names: &HashSet<String>,
    scopes: &[String],
    oneof_parent: Option<&str>,
) -> SingleField {
    let (wire_type, optional, type_ref) = match &node.type_name {
        FieldTypeName::Scalar(scalar) => (scalar_wire_type(*scalar), node.explicit_optional, None),
        FieldTypeName::Named(name) => {
            if let Some(wrapped) = wrapper_wire_type(name) {
                (wrapped, true, None)
            } else {
                let (wt, qualified) = resolve_named_type(name, scopes, enum_names, message_names);
                (wt, node.explicit_optional, Some(qualified))
            }
        }
    };

    SingleField {
        name: node.name.clone(),
        number: node.number,
        wire_type,
        repeated: node.repeated,
        optional,
        type_ref: type_ref.map(|fully_qualified_name| crate::model::TypeRef {
            fully_qualified_name,
        }),
        doc: node.doc.clone(),
        deprecated: node.deprecated,
        oneof_parent: oneof_parent.map(str::to_string),
    }
}

fn scalar_wire_type(scalar: ScalarType) -> WireType {
    match scalar {
        ScalarType::Int32 => WireType::Int32,
        ScalarType::Sint32 => WireType::SInt32,
        ScalarType::Uint32 => WireType::UInt32,
        ScalarType::Int64 => WireType::Int64,
        ScalarType::Sint64 => WireType::SInt64,
        ScalarType::Uint64 => WireType::UInt64,
        ScalarType::Fixed32 => WireType::Fixed32,
        ScalarType::Sfixed32 => WireType::SFixed32,
        ScalarType::Fixed64 => WireType::Fixed64,
        ScalarType::Sfixed64 => WireType::SFixed64,
        ScalarType::Float => WireType::Float,
        ScalarType::Double => WireType::Double,
        ScalarType::Bool => WireType::Bool,
        ScalarType::String => WireType::String,
        ScalarType::Bytes => WireType::Bytes,
    }
}

fn build_oneof(
    node: &OneofNode,
    enum_names: &HashSet<String>,
    message_names: &HashSet<String>,
    scopes: &[String],
) -> OneOfField {
    let children = node
        .fields
        .iter()
        .map(|f| build_single_field(f, enum_names, message_names, scopes, Some(&node.name)))
        .collect();
    OneOfField {
        name: node.name.clone(),
        children,
        discriminant_enum_name: format!("{}OneOfType", to_pascal_case(&node.name)),
        doc: node.doc.clone(),
    }
}

fn to_pascal_case(s: &str) -> String {
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

fn build_enum(node: &EnumNode, _owner: &str) -> SchemaResult<Rc<Enum>> {
    let allow_alias = node.options.iter().any(|opt| {
        opt.name == "allow_alias" && matches!(opt.value, pb_parser::ast::OptionValue::Bool(true))
    });

    if !allow_alias {
        let mut seen = HashSet::new();
        for value in &node.values {
            if !seen.insert(value.number) {
                return Err(SchemaError::DuplicateEnumNumber {
                    enum_name: node.name.clone(),
                    number: value.number,
                });
            }
        }
    }

    if !node.values.iter().any(|v| v.number == 0) {
        return Err(SchemaError::EnumMissingZeroValue {
            enum_name: node.name.clone(),
        });
    }

    let values = node
        .values
        .iter()
        .map(|v| EnumValue {
            name: v.name.clone(),
            number: v.number,
            deprecated: v.deprecated,
            doc: v.doc.clone(),
        })
        .collect();

    Ok(Rc::new(Enum {
        name: node.name.clone(),
        doc: node.doc.clone(),
        values,
    }))
}

fn validate_references(files: &[SchemaFile], table: &SymbolTable) -> SchemaResult<()> {
    for file in files {
        for message in &file.messages {
            validate_message_references(message, table)?;
        }
    }
    Ok(())
}

fn validate_message_references(message: &Message, table: &SymbolTable) -> SchemaResult<()> {
    for field in message.single_fields_recursive() {
        if let Some(type_ref) = &field.type_ref {
            if table.resolve(&type_ref.fully_qualified_name).is_none() {
                return Err(SchemaError::UnresolvedReference {
                    referencing_message: message.name.clone(),
                    field_name: field.name.clone(),
                    type_name: type_ref.fully_qualified_name.clone(),
                });
            }
        }
    }
    for nested in &message.nested_messages {
        validate_message_references(nested, table)?;
    }
    Ok(())
}

impl Message {
    /// All single fields directly on this message, including oneof
    /// children, but not descending into nested messages.
    fn single_fields_recursive(&self) -> Vec<&SingleField> {
        let mut out = Vec::new();
        for field in &self.fields {
            match field {
                Field::Single(f) => out.push(f),
                Field::OneOf(o) => out.extend(o.children.iter()),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_parser::Parser;

    fn parse(src: &str) -> ProtoFile {
        Parser::parse_file(src).unwrap()
    }

    fn namespaces() -> NamespaceConfig {
        NamespaceConfig {
            model_base: "gen.model".to_string(),
            parser_base: "gen.parser".to_string(),
            writer_base: "gen.writer".to_string(),
            test_base: "gen.test".to_string(),
            codec_base: "gen.model".to_string(),
            json_codec_base: "gen.model".to_string(),
        }
    }

    #[test]
    fn builds_simple_message_with_scalar_fields() {
        let ast = parse("message Foo { int32 a = 1; string b = 2; }");
        let inputs = vec![FileInput {
            path: "foo.proto".to_string(),
            dir_bucket: "".to_string(),
            ast,
        }];
        let (files, _table) = build_schema(&inputs, namespaces()).unwrap();
        let message = &files[0].messages[0];
        assert_eq!(2, message.fields.len());
    }

    #[test]
    fn recognizes_wrapper_optional_and_drops_message_dependency() {
        let ast = parse("message Foo { google.protobuf.StringValue name = 1; }");
        let inputs = vec![FileInput {
            path: "foo.proto".to_string(),
            dir_bucket: "".to_string(),
            ast,
        }];
        let (files, _table) = build_schema(&inputs, namespaces()).unwrap();
        match &files[0].messages[0].fields[0] {
            Field::Single(f) => {
                assert!(f.optional);
                assert_eq!(WireType::String, f.wire_type);
                assert!(f.type_ref.is_none());
            }
            _ => panic!("expected single field"),
        }
    }

    #[test]
    fn resolves_enum_field_reference() {
        let ast = parse(
            r#"
            enum Color { UNKNOWN = 0; RED = 1; }
            message Foo { Color c = 1; }
            "#,
        );
        let inputs = vec![FileInput {
            path: "foo.proto".to_string(),
            dir_bucket: "".to_string(),
            ast,
        }];
        let (files, _table) = build_schema(&inputs, namespaces()).unwrap();
        match &files[0].messages[0].fields[0] {
            Field::Single(f) => assert_eq!(WireType::Enum, f.wire_type),
            _ => panic!("expected single field"),
        }
    }

    #[test]
    fn unresolved_message_reference_is_an_error() {
        let ast = parse("message Foo { Bar b = 1; }");
        let inputs = vec![FileInput {
            path: "foo.proto".to_string(),
            dir_bucket: "".to_string(),
            ast,
        }];
        let err = build_schema(&inputs, namespaces()).unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedReference { .. }));
    }

    #[test]
    fn map_field_is_rejected_with_unsupported_map() {
        let ast = parse("message Foo { map<string, int32> counts = 1; }");
        let inputs = vec![FileInput {
            path: "foo.proto".to_string(),
            dir_bucket: "".to_string(),
            ast,
        }];
        let err = build_schema(&inputs, namespaces()).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedMap { .. }));
    }

    #[test]
    fn oneof_builds_discriminant_enum_name_and_children() {
        let ast = parse(
            r#"
            message Foo {
              oneof my_choice {
                int32 x = 1;
                string y = 2;
              }
            }
            "#,
        );
        let inputs = vec![FileInput {
            path: "foo.proto".to_string(),
            dir_bucket: "".to_string(),
            ast,
        }];
        let (files, _table) = build_schema(&inputs, namespaces()).unwrap();
        match &files[0].messages[0].fields[0] {
            Field::OneOf(o) => {
                assert_eq!("MyChoiceOneOfType", o.discriminant_enum_name);
                assert_eq!(2, o.children.len());
            }
            _ => panic!("expected oneof field"),
        }
    }

    #[test]
    fn duplicate_field_numbers_are_rejected() {
        let ast = parse("message Foo { int32 a = 1; string b = 1; }");
        let inputs = vec![FileInput {
            path: "foo.proto".to_string(),
            dir_bucket: "".to_string(),
            ast,
        }];
        let err = build_schema(&inputs, namespaces()).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateFieldNumber { .. }));
    }

    #[test]
    fn enum_without_a_zero_value_is_rejected() {
        let ast = parse("enum Color { RED = 1; GREEN = 2; }");
        let inputs = vec![FileInput {
            path: "foo.proto".to_string(),
            dir_bucket: "".to_string(),
            ast,
        }];
        let err = build_schema(&inputs, namespaces()).unwrap_err();
        assert!(matches!(err, SchemaError::EnumMissingZeroValue { .. }));
    }

    #[test]
    fn duplicate_enum_numbers_are_rejected() {
        let ast = parse("enum Color { UNKNOWN = 0; RED = 1; ALSO_RED = 1; }");
        let inputs = vec![FileInput {
            path: "foo.proto".to_string(),
            dir_bucket: "".to_string(),
            ast,
        }];
        let err = build_schema(&inputs, namespaces()).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateEnumNumber { .. }));
    }

    #[test]
    fn nested_enum_resolves_within_enclosing_message_scope() {
        let ast = parse(
            r#"
            message Outer {
              enum Kind { UNKNOWN = 0; }
              Kind kind = 1;
            }
            "#,
        );
        let inputs = vec![FileInput {
            path: "foo.proto".to_string(),
            dir_bucket: "".to_string(),
            ast,
        }];
        let (files, _table) = build_schema(&inputs, namespaces()).unwrap();
        match &files[0].messages[0].fields[0] {
            Field::Single(f) => assert_eq!(WireType::Enum, f.wire_type),
            _ => panic!("expected single field"),
        }
    }
}

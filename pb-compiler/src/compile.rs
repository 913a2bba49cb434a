//! Ties the pipeline together: walk, load, build the schema, then emit
//! every message and enum through `pb-codegen` (spec.md §2, full pipeline).

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

use pb_schema::{build_schema, Enum, Field, FileInput, Message, SingleField, SymbolTable};

use crate::config::Config;
use crate::error::CompileError;
use crate::loader::load_with_imports;
use crate::walk::find_proto_files;

/// One rendered Rust source file, grouped by the package (dir bucket) it
/// belongs to — spec.md §4.4's four artifacts bundled per message, several
/// messages per file, matching how `pb-codegen`'s own emitters describe
/// themselves as producing "one flat module per package" rather than
/// mirroring proto nesting with Rust module nesting. Any field whose
/// MESSAGE/ENUM reference resolves to a different bucket is preceded by a
/// `use crate::<bucket>::<Type>;` line in `source`, so this file never
/// needs its siblings inlined to type-check.
#[derive(Debug, Clone)]
pub struct CompiledFile {
    pub relative_path: String,
    pub source: String,
}

pub fn compile(config: &Config) -> Result<Vec<CompiledFile>, CompileError> {
    let proto_paths = find_proto_files(&config.input_dir)?;
    let loaded = load_with_imports(&config.input_dir, &proto_paths)?;

    let inputs: Vec<FileInput> = loaded
        .into_iter()
        .map(|f| FileInput {
            path: f.relative_path,
            dir_bucket: f.dir_bucket,
            ast: f.ast,
        })
        .collect();

    let (files, table) = build_schema(&inputs, config.namespaces.clone())
        .map_err(|source| CompileError::Schema { source })?;

    let mut messages_by_name: HashMap<String, Rc<Message>> = HashMap::new();
    let mut enums_by_name: HashMap<String, Rc<Enum>> = HashMap::new();
    for file in &files {
        for message in &file.messages {
            index_messages(&mut messages_by_name, &mut enums_by_name, message);
        }
        for en in &file.enums {
            enums_by_name.insert(en.name.clone(), en.clone());
        }
    }

    let test_config = pb_codegen::TestEmitterConfig {
        messages: &messages_by_name,
        enums: &enums_by_name,
        cycle_break: &config.cycle_break,
    };

    // One body plus one cross-bucket `use` set per directory bucket — the
    // Lookup Helper's packages (spec.md §4.3) collapse to dir buckets here
    // since this generator emits one flat module per package rather than
    // per artifact kind (see field_info::simple_type_name).
    let mut bodies_by_bucket: BTreeMap<String, String> = BTreeMap::new();
    let mut imports_by_bucket: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for file in &files {
        let body = bodies_by_bucket.entry(file.dir_bucket.clone()).or_default();
        let imports = imports_by_bucket.entry(file.dir_bucket.clone()).or_default();
        for message in &file.messages {
            collect_cross_bucket_imports(message, &file.dir_bucket, &table, imports);
            emit_message_bundle(message, &test_config, body);
        }
        for en in &file.enums {
            body.push_str(&pb_codegen::emit_enum(en));
            body.push('\n');
        }
    }

    Ok(bodies_by_bucket
        .into_iter()
        .map(|(bucket, body)| {
            let imports = imports_by_bucket.remove(&bucket).unwrap_or_default();
            let mut source = String::new();
            for import in &imports {
                source.push_str(import);
                source.push('\n');
            }
            if !imports.is_empty() {
                source.push('\n');
            }
            source.push_str(&body);
            CompiledFile {
                relative_path: if bucket.is_empty() {
                    "root.rs".to_string()
                } else {
                    format!("{}.rs", bucket.to_lowercase())
                },
                source,
            }
        })
        .collect())
}

/// Walks every field reachable from `message` (including oneof children and
/// nested messages) and records a sorted `use crate::<bucket>::<Type>;` for
/// each MESSAGE/ENUM reference that resolves to a different bucket than
/// `current_bucket` — spec.md §4.4's "compute the import/use set by walking
/// fields… import sets must be sorted" for a multi-file schema.
fn collect_cross_bucket_imports(
    message: &Message,
    current_bucket: &str,
    table: &SymbolTable,
    out: &mut BTreeSet<String>,
) {
    for field in &message.fields {
        match field {
            Field::Single(f) => add_field_import(f, current_bucket, table, out),
            Field::OneOf(o) => {
                for child in &o.children {
                    add_field_import(child, current_bucket, table, out);
                }
            }
        }
    }
    for nested in &message.nested_messages {
        collect_cross_bucket_imports(nested, current_bucket, table, out);
    }
}

fn add_field_import(
    field: &SingleField,
    current_bucket: &str,
    table: &SymbolTable,
    out: &mut BTreeSet<String>,
) {
    if let Some(type_ref) = &field.type_ref {
        if let Some(symbol) = table.resolve(&type_ref.fully_qualified_name) {
            if symbol.dir_bucket != current_bucket {
                let module = bucket_module_name(&symbol.dir_bucket);
                let type_name = pb_codegen::field_info::simple_type_name(type_ref);
                out.insert(format!("use crate::{}::{};", module, type_name));
            }
        }
    }
}

/// The Rust module a bucket's generated file is expected to live at —
/// matches `relative_path`'s `"root.rs"`/`"<bucket>.rs"` naming so a
/// `use` line here resolves under whatever `mod` declarations the host
/// build script writes for these files.
fn bucket_module_name(bucket: &str) -> String {
    if bucket.is_empty() {
        "root".to_string()
    } else {
        bucket.to_lowercase()
    }
}

fn index_messages(
    messages: &mut HashMap<String, Rc<Message>>,
    enums: &mut HashMap<String, Rc<Enum>>,
    message: &Rc<Message>,
) {
    messages.insert(message.name.clone(), message.clone());
    for nested in &message.nested_messages {
        index_messages(messages, enums, nested);
    }
    for nested in &message.nested_enums {
        enums.insert(nested.name.clone(), nested.clone());
    }
}

fn emit_message_bundle(message: &Rc<Message>, test_config: &pb_codegen::TestEmitterConfig, out: &mut String) {
    out.push_str(&pb_codegen::emit_model(message));
    out.push('\n');
    out.push_str(&pb_codegen::emit_parser(message));
    out.push('\n');
    out.push_str(&pb_codegen::emit_writer(message));
    out.push('\n');
    out.push_str(&pb_codegen::emit_test(message, test_config));
    out.push('\n');

    for nested in &message.nested_messages {
        emit_message_bundle(nested, test_config, out);
    }
    for nested in &message.nested_enums {
        out.push_str(&pb_codegen::emit_enum(nested));
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;

    use pb_schema::NamespaceConfig;

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
    fn compiles_a_single_file_into_one_bundle_per_package() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("foo.proto"),
            "message Foo { int32 a = 1; string b = 2; }",
        )
        .unwrap();

        let config = Config {
            input_dir: dir.path().to_path_buf(),
            namespaces: namespaces(),
            cycle_break: HashSet::new(),
        };

        let outputs = compile(&config).unwrap();
        assert_eq!(1, outputs.len());
        assert_eq!("root.rs", outputs[0].relative_path);
        assert!(outputs[0].source.contains("pub struct Foo"));
        assert!(outputs[0].source.contains("pub struct FooParser"));
        assert!(outputs[0].source.contains("pub struct FooWriter"));
    }

    #[test]
    fn groups_files_by_directory_bucket() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("accounts")).unwrap();
        fs::write(
            dir.path().join("accounts/user.proto"),
            "message User { int32 id = 1; }",
        )
        .unwrap();
        fs::write(dir.path().join("top.proto"), "message Root { int32 x = 1; }").unwrap();

        let config = Config {
            input_dir: dir.path().to_path_buf(),
            namespaces: namespaces(),
            cycle_break: HashSet::new(),
        };

        let mut outputs = compile(&config).unwrap();
        outputs.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        assert_eq!(2, outputs.len());
        assert_eq!("accounts.rs", outputs[0].relative_path);
        assert_eq!("root.rs", outputs[1].relative_path);
    }

    #[test]
    fn cross_bucket_reference_emits_a_use_statement() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("common")).unwrap();
        fs::write(
            dir.path().join("common/base.proto"),
            "message Base { int32 x = 1; }",
        )
        .unwrap();
        fs::write(
            dir.path().join("top.proto"),
            "import \"common/base.proto\";\nmessage Top { Base b = 1; }",
        )
        .unwrap();

        let config = Config {
            input_dir: dir.path().to_path_buf(),
            namespaces: namespaces(),
            cycle_break: HashSet::new(),
        };

        let mut outputs = compile(&config).unwrap();
        outputs.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        let paths: Vec<&str> = outputs.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(vec!["common.rs", "root.rs"], paths);

        let root = &outputs[1];
        assert!(root.source.starts_with("use crate::common::Base;\n"));
        assert!(root.source.contains("pub struct Top"));
        assert!(!outputs[0].source.contains("use crate::"));
    }

    #[test]
    fn same_bucket_reference_emits_no_use_statement() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("foo.proto"),
            "message Inner { int32 x = 1; } message Outer { Inner i = 1; }",
        )
        .unwrap();

        let config = Config {
            input_dir: dir.path().to_path_buf(),
            namespaces: namespaces(),
            cycle_break: HashSet::new(),
        };

        let outputs = compile(&config).unwrap();
        assert_eq!(1, outputs.len());
        assert!(!outputs[0].source.contains("use crate::"));
    }

    #[test]
    fn unresolved_reference_surfaces_as_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("foo.proto"), "message Foo { Bar b = 1; }").unwrap();

        let config = Config {
            input_dir: dir.path().to_path_buf(),
            namespaces: namespaces(),
            cycle_break: HashSet::new(),
        };

        let err = compile(&config).unwrap_err();
        assert!(matches!(err, CompileError::Schema { .. }));
    }
}

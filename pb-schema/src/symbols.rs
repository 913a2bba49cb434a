//! The Lookup Helper (spec.md §4.3): a global, read-only-after-build
//! symbol table plus the per-artifact-kind namespace computation the
//! emitters need.

use std::collections::HashMap;
use std::rc::Rc;

use crate::model::{Enum, Message, SchemaFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Model,
    Parser,
    Writer,
    Test,
    Codec,
    JsonCodec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Message,
    Enum,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub dir_bucket: String,
}

/// Base namespace (before the `.<dirBucket>` suffix) for each artifact
/// kind, supplied by `pb-compiler::Config` (spec.md §4.3).
#[derive(Debug, Clone)]
pub struct NamespaceConfig {
    pub model_base: String,
    pub parser_base: String,
    pub writer_base: String,
    pub test_base: String,
    pub codec_base: String,
    pub json_codec_base: String,
}

impl NamespaceConfig {
    fn base_for(&self, kind: ArtifactKind) -> &str {
        match kind {
            ArtifactKind::Model => &self.model_base,
            ArtifactKind::Parser => &self.parser_base,
            ArtifactKind::Writer => &self.writer_base,
            ArtifactKind::Test => &self.test_base,
            ArtifactKind::Codec => &self.codec_base,
            ArtifactKind::JsonCodec => &self.json_codec_base,
        }
    }
}

/// Aggregates all loaded `SchemaFile`s into a name → (namespace, kind) map,
/// built once after every file has parsed and before any emitter runs.
pub struct SymbolTable {
    namespaces: NamespaceConfig,
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn build(files: &[SchemaFile], namespaces: NamespaceConfig) -> SymbolTable {
        let mut symbols = HashMap::new();
        for file in files {
            for message in &file.messages {
                index_message(&mut symbols, message, &file.dir_bucket, "");
            }
            for en in &file.enums {
                index_enum(&mut symbols, en, &file.dir_bucket, "");
            }
        }
        SymbolTable {
            namespaces,
            symbols,
        }
    }

    pub fn resolve(&self, fully_qualified_name: &str) -> Option<&Symbol> {
        self.symbols
            .get(fully_qualified_name.trim_start_matches('.'))
    }

    pub fn get_model_package(&self, dir_bucket: &str) -> String {
        self.package_for(ArtifactKind::Model, dir_bucket)
    }

    pub fn get_parser_package(&self, dir_bucket: &str) -> String {
        self.package_for(ArtifactKind::Parser, dir_bucket)
    }

    pub fn get_writer_package(&self, dir_bucket: &str) -> String {
        self.package_for(ArtifactKind::Writer, dir_bucket)
    }

    pub fn get_test_package(&self, dir_bucket: &str) -> String {
        self.package_for(ArtifactKind::Test, dir_bucket)
    }

    fn package_for(&self, kind: ArtifactKind, dir_bucket: &str) -> String {
        let base = self.namespaces.base_for(kind);
        if dir_bucket.is_empty() {
            base.to_string()
        } else {
            format!("{}.{}", base, dir_bucket.to_lowercase())
        }
    }

    pub fn get_unqualified_class_for_message(&self, kind: ArtifactKind, message: &Message) -> String {
        match kind {
            ArtifactKind::Model => message.name.clone(),
            ArtifactKind::Parser => format!("{}Parser", message.name),
            ArtifactKind::Writer => format!("{}Writer", message.name),
            ArtifactKind::Test => format!("{}Test", message.name),
            ArtifactKind::Codec | ArtifactKind::JsonCodec => message.name.clone(),
        }
    }

    pub fn get_package_for_message(&self, kind: ArtifactKind, message: &Message) -> Option<String> {
        self.symbols
            .get(&message.name)
            .map(|sym| self.package_for(kind, &sym.dir_bucket))
    }

    pub fn get_fully_qualified_message_classname(
        &self,
        kind: ArtifactKind,
        message: &Message,
    ) -> String {
        let class = self.get_unqualified_class_for_message(kind, message);
        match self.get_package_for_message(kind, message) {
            Some(pkg) if !pkg.is_empty() => format!("{}.{}", pkg, class),
            _ => class,
        }
    }
}

fn index_message(
    symbols: &mut HashMap<String, Symbol>,
    message: &Rc<Message>,
    dir_bucket: &str,
    prefix: &str,
) {
    let qualified = qualify(prefix, &message.name);
    symbols.insert(
        qualified.clone(),
        Symbol {
            kind: SymbolKind::Message,
            dir_bucket: dir_bucket.to_string(),
        },
    );
    for nested in &message.nested_messages {
        index_message(symbols, nested, dir_bucket, &qualified);
    }
    for nested in &message.nested_enums {
        index_enum(symbols, nested, dir_bucket, &qualified);
    }
}

fn index_enum(symbols: &mut HashMap<String, Symbol>, en: &Rc<Enum>, dir_bucket: &str, prefix: &str) {
    let qualified = qualify(prefix, &en.name);
    symbols.insert(
        qualified,
        Symbol {
            kind: SymbolKind::Enum,
            dir_bucket: dir_bucket.to_string(),
        },
    );
}

fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Message};

    fn config() -> NamespaceConfig {
        NamespaceConfig {
            model_base: "gen.model".to_string(),
            parser_base: "gen.parser".to_string(),
            writer_base: "gen.writer".to_string(),
            test_base: "gen.test".to_string(),
            codec_base: "gen.model".to_string(),
            json_codec_base: "gen.model".to_string(),
        }
    }

    fn bare_message(name: &str) -> Rc<Message> {
        Rc::new(Message {
            name: name.to_string(),
            doc: None,
            fields: Vec::new(),
            nested_messages: Vec::new(),
            nested_enums: Vec::new(),
            deprecated: false,
        })
    }

    #[test]
    fn resolves_top_level_and_nested_messages() {
        let mut outer = (*bare_message("Outer")).clone();
        outer.nested_messages.push(bare_message("Inner"));
        let file = SchemaFile {
            path: "a/b.proto".to_string(),
            namespace_override: None,
            dir_bucket: "accounts".to_string(),
            messages: vec![Rc::new(outer)],
            enums: Vec::new(),
        };
        let table = SymbolTable::build(&[file], config());
        assert!(table.resolve("Outer").is_some());
        assert!(table.resolve("Outer.Inner").is_some());
        assert!(table.resolve(".Outer").is_some());
        assert!(table.resolve("Missing").is_none());
    }

    #[test]
    fn package_names_append_lowercased_dir_bucket() {
        let file = SchemaFile {
            path: "a/b.proto".to_string(),
            namespace_override: None,
            dir_bucket: "Accounts".to_string(),
            messages: vec![bare_message("Foo")],
            enums: Vec::new(),
        };
        let table = SymbolTable::build(&[file], config());
        assert_eq!("gen.model.accounts", table.get_model_package("Accounts"));
        assert_eq!("gen.parser.accounts", table.get_parser_package("Accounts"));
    }

    #[test]
    fn fully_qualified_classname_combines_package_and_class() {
        let message = bare_message("Foo");
        let file = SchemaFile {
            path: "a/b.proto".to_string(),
            namespace_override: None,
            dir_bucket: "accounts".to_string(),
            messages: vec![message.clone()],
            enums: Vec::new(),
        };
        let table = SymbolTable::build(&[file], config());
        assert_eq!(
            "gen.parser.accounts.FooParser",
            table.get_fully_qualified_message_classname(ArtifactKind::Parser, &message)
        );
    }
}

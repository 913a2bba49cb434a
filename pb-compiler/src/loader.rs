//! Transitive import resolution (spec.md §3.2; spec.md §2 "proto file
//! bytes -> parse tree -> schema model (per file) -> merged global symbol
//! table"). Every file an entry point reaches through `import` is parsed
//! before the schema builder ever sees any of them, so cross-file
//! references always resolve against a complete set.
//!
//! Grounded in `tafia-protobuf-parser`'s `parse_with_dependencies`: a
//! visited-set recursion that short-circuits import cycles. That function
//! resolves each import against a list of include directories; this
//! compiler has exactly one root, so resolution is a plain join against it.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use pb_parser::ast::{ProtoFile, Syntax};
use pb_parser::Parser;

use crate::error::CompileError;

/// One parsed file plus the bookkeeping `pb_schema::FileInput` needs.
pub struct LoadedFile {
    pub relative_path: String,
    pub dir_bucket: String,
    pub ast: ProtoFile,
}

/// Parses every file reachable from `entry_paths`, transitively through
/// `import` declarations, resolving import paths against `root`.
pub fn load_with_imports(root: &Path, entry_paths: &[PathBuf]) -> Result<Vec<LoadedFile>, CompileError> {
    let mut visited = HashSet::new();
    let mut loaded = Vec::new();
    for entry in entry_paths {
        load_one(root, entry, &mut visited, &mut loaded)?;
    }
    loaded.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(loaded)
}

fn load_one(
    root: &Path,
    fs_path: &Path,
    visited: &mut HashSet<String>,
    loaded: &mut Vec<LoadedFile>,
) -> Result<(), CompileError> {
    let relative_path = fs_path
        .strip_prefix(root)
        .map_err(|_| CompileError::OutsideInputDir { path: fs_path.to_path_buf() })?;
    let protobuf_path = to_protobuf_path(relative_path);

    if !visited.insert(protobuf_path.clone()) {
        return Ok(());
    }

    let content = fs::read_to_string(fs_path)
        .map_err(|source| CompileError::Io { path: fs_path.to_path_buf(), source })?;
    let ast = Parser::parse_file(&content)
        .map_err(|source| CompileError::Parse { path: protobuf_path.clone(), source })?;

    if ast.syntax == Some(Syntax::Proto2) {
        return Err(CompileError::Proto2NotSupported { path: protobuf_path });
    }

    for import in &ast.imports {
        load_one(root, &root.join(&import.path), visited, loaded)?;
    }

    let dir_bucket = dir_bucket_of(relative_path);
    loaded.push(LoadedFile { relative_path: protobuf_path, dir_bucket, ast });
    Ok(())
}

fn to_protobuf_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn dir_bucket_of(relative_path: &Path) -> String {
    relative_path
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_a_single_file_with_no_imports() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.proto"), "message Foo { int32 x = 1; }").unwrap();
        let loaded = load_with_imports(dir.path(), &[dir.path().join("a.proto")]).unwrap();
        assert_eq!(1, loaded.len());
        assert_eq!("a.proto", loaded[0].relative_path);
        assert_eq!("", loaded[0].dir_bucket);
    }

    #[test]
    fn follows_transitive_imports_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("common")).unwrap();
        fs::write(
            dir.path().join("common/base.proto"),
            "message Base { int32 x = 1; }",
        )
        .unwrap();
        fs::write(
            dir.path().join("mid.proto"),
            "import \"common/base.proto\";\nmessage Mid { Base b = 1; }",
        )
        .unwrap();
        fs::write(
            dir.path().join("top.proto"),
            "import \"mid.proto\";\nimport \"common/base.proto\";\nmessage Top { Mid m = 1; }",
        )
        .unwrap();

        let loaded = load_with_imports(dir.path(), &[dir.path().join("top.proto")]).unwrap();
        let mut paths: Vec<&str> = loaded.iter().map(|f| f.relative_path.as_str()).collect();
        paths.sort();
        assert_eq!(vec!["common/base.proto", "mid.proto", "top.proto"], paths);
    }

    #[test]
    fn import_cycle_does_not_loop_forever() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.proto"), "import \"b.proto\";\nmessage A { int32 x = 1; }").unwrap();
        fs::write(dir.path().join("b.proto"), "import \"a.proto\";\nmessage B { int32 y = 1; }").unwrap();

        let loaded = load_with_imports(dir.path(), &[dir.path().join("a.proto")]).unwrap();
        assert_eq!(2, loaded.len());
    }

    #[test]
    fn rejects_proto2_syntax() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("legacy.proto"),
            "syntax = \"proto2\";\nmessage Foo { optional int32 x = 1; }",
        )
        .unwrap();
        let err = load_with_imports(dir.path(), &[dir.path().join("legacy.proto")]).unwrap_err();
        assert!(matches!(err, CompileError::Proto2NotSupported { .. }));
    }

    #[test]
    fn dir_bucket_is_the_immediate_containing_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("accounts")).unwrap();
        fs::write(dir.path().join("accounts/user.proto"), "message User { int32 id = 1; }").unwrap();
        let loaded = load_with_imports(dir.path(), &[dir.path().join("accounts/user.proto")]).unwrap();
        assert_eq!("accounts", loaded[0].dir_bucket);
    }
}

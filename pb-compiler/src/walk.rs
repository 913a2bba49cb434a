//! Directory walk (spec.md §3.1): every `.proto` file under a root,
//! sorted for deterministic downstream processing order.

use std::path::{Path, PathBuf};

use crate::error::CompileError;

/// Recursively collects `*.proto` paths under `root`. No `.gitignore`-style
/// filtering; symlinks are followed however `glob` itself follows them.
pub fn find_proto_files(root: &Path) -> Result<Vec<PathBuf>, CompileError> {
    let pattern = format!("{}/**/*.proto", root.display());
    let paths = glob::glob(&pattern).map_err(|source| CompileError::Pattern { source })?;

    let mut found = Vec::new();
    for entry in paths {
        found.push(entry.map_err(|source| CompileError::Walk { source })?);
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_proto_files_recursively_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("accounts")).unwrap();
        fs::write(dir.path().join("b.proto"), "").unwrap();
        fs::write(dir.path().join("accounts/a.proto"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let found = find_proto_files(dir.path()).unwrap();
        assert_eq!(2, found.len());
        assert!(found[0] < found[1]);
        assert!(found.iter().all(|p| p.extension().unwrap() == "proto"));
    }

    #[test]
    fn empty_directory_yields_no_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_proto_files(dir.path()).unwrap().is_empty());
    }
}

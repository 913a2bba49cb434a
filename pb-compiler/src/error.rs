//! Errors raised while orchestrating a compile (spec.md §7): everything
//! from a bad directory walk down through a single file's syntax error is
//! folded into one enum so a caller has exactly one `Result` to match on.

use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum CompileError {
    /// The glob pattern used for directory discovery was malformed. Only
    /// possible if `Config::input_dir` contains characters `glob` treats
    /// specially; not reachable for an ordinary filesystem path.
    Pattern { source: glob::PatternError },
    /// A single directory entry could not be read while walking for
    /// `.proto` files (permissions, a broken symlink, etc).
    Walk { source: glob::GlobError },
    /// An import or entry path resolved outside `Config::input_dir`. Every
    /// `.proto` file is expected to live under one root so dir buckets and
    /// cross-file imports both resolve relative to the same place.
    OutsideInputDir { path: PathBuf },
    Io { path: PathBuf, source: io::Error },
    Parse { path: String, source: pb_parser::ParseErrorWithLocation },
    Schema { source: pb_schema::SchemaError },
    /// `syntax = "proto2";` was declared. Only proto3 input is supported
    /// (spec.md §1 Non-goals).
    Proto2NotSupported { path: String },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Pattern { source } => write!(f, "invalid input directory pattern: {}", source),
            CompileError::Walk { source } => write!(f, "directory walk failed: {}", source),
            CompileError::OutsideInputDir { path } => {
                write!(f, "{}: not under the configured input directory", path.display())
            }
            CompileError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            CompileError::Parse { path, source } => write!(f, "{}: {}", path, source),
            CompileError::Schema { source } => write!(f, "{}", source),
            CompileError::Proto2NotSupported { path } => {
                write!(f, "{}: proto2 syntax is not supported", path)
            }
        }
    }
}

impl std::error::Error for CompileError {}

pub type CompileResult<T> = Result<T, CompileError>;

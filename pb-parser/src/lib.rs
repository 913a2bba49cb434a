//! Lexing and parsing of proto3 source text into an untyped parse tree.
//!
//! This crate knows nothing about cross-file resolution, well-known wrapper
//! types, or oneof discriminants — it only turns `.proto` text into an
//! [`ast::ProtoFile`]. That tree is the input to `pb-schema`'s model builder.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::ProtoFile;
pub use error::{ParseError, ParseErrorWithLocation, ParseResult};
pub use lexer::{Lexer, Loc, Token};
pub use parser::Parser;

//! The normalized schema model (L1) and cross-file symbol resolution (L2).
//!
//! Consumes parse trees from `pb-parser` and produces immutable `Message`/
//! `Enum`/`Field` graphs plus a completed `SymbolTable`, ready for the
//! emitters in `pb-codegen` to walk.

pub mod builder;
pub mod error;
pub mod model;
pub mod symbols;

pub use builder::{build_schema, FileInput};
pub use error::{SchemaError, SchemaResult};
pub use model::{
    Enum, EnumValue, Field, Message, OneOfField, SchemaFile, SingleField, TypeRef, WireType,
};
pub use symbols::{ArtifactKind, NamespaceConfig, Symbol, SymbolKind, SymbolTable};

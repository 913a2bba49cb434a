//! Renders a resolved schema `Message`/`Enum` into the four generated Rust
//! artifacts spec.md §4.4 names: Model, Parser, Writer, and Test. Each
//! emitter takes the normalized types from `pb-schema` and returns a string
//! of Rust source; nothing here touches the filesystem — that is
//! `pb-compiler`'s job.

pub mod code_writer;
pub mod enum_gen;
pub mod field_info;
pub mod model;
pub mod parser_gen;
pub mod rust_types;
pub mod test_gen;
pub mod writer_gen;

pub use enum_gen::emit_enum;
pub use model::emit_model;
pub use parser_gen::emit_parser;
pub use test_gen::{emit_test, TestEmitterConfig};
pub use writer_gen::emit_writer;

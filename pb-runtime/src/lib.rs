//! Wire-format runtime primitives that generated protobuf code depends on:
//! an immutable shareable byte sequence ([`Bytes`]), sequential read/write
//! cursors, a mutable buffer implementing both, and the UTF-8 and varint
//! helpers the wire format needs. Independent of the schema compiler; has
//! its own test suite.

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

pub mod buffered;
pub mod bytes;
pub mod codec;
pub mod error;
pub mod hash;
pub mod sequential;
pub mod utf8;
pub mod varint;

pub use buffered::{BufferedData, GrowableWriter};
pub use bytes::{Bytes, RandomAccessData};
pub use codec::{Codec, ProtoMessage, ProtobufCodec};
#[cfg(feature = "serde")]
pub use codec::JsonCodec;
pub use error::{OutOfBounds, WireFormatError, WireFormatResult};
pub use sequential::{ReadableSequentialData, WritableSequentialData};

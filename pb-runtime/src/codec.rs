//! The `Codec` abstraction generated model types expose as `Self::PROTOBUF`
//! and (when the `serde` feature is enabled) `Self::JSON`.

use std::marker::PhantomData;

use crate::error::WireFormatResult;
use crate::sequential::{ReadableSequentialData, WritableSequentialData};

/// Parses and writes one wire representation of `T`.
pub trait Codec<T> {
    fn parse(&self, input: &mut dyn ReadableSequentialData) -> WireFormatResult<T>;
    fn write(&self, value: &T, output: &mut dyn WritableSequentialData) -> WireFormatResult<()>;
    fn measure(&self, value: &T) -> u64;
}

/// Implemented by every generated model type, tying it to its generated
/// `<Name>Parser` / `<Name>Writer`. The model emitter (L3) writes this impl;
/// `ProtobufCodec<T>` is what the model's `PROTOBUF` constant resolves to.
pub trait ProtoMessage: Sized {
    fn parse_from(input: &mut dyn ReadableSequentialData) -> WireFormatResult<Self>;
    fn write_to(&self, output: &mut dyn WritableSequentialData) -> WireFormatResult<()>;
    fn measured_size(&self) -> u64;
}

/// The protobuf wire-format `Codec` for any [`ProtoMessage`].
pub struct ProtobufCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> ProtobufCodec<T> {
    pub const fn new() -> ProtobufCodec<T> {
        ProtobufCodec {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for ProtobufCodec<T> {
    fn default() -> Self {
        ProtobufCodec::new()
    }
}

impl<T: ProtoMessage> Codec<T> for ProtobufCodec<T> {
    fn parse(&self, input: &mut dyn ReadableSequentialData) -> WireFormatResult<T> {
        T::parse_from(input)
    }

    fn write(&self, value: &T, output: &mut dyn WritableSequentialData) -> WireFormatResult<()> {
        value.write_to(output)
    }

    fn measure(&self, value: &T) -> u64 {
        value.measured_size()
    }
}

/// The JSON `Codec` for any [`serde`]-enabled model type. Present only to
/// give generated code a fully-qualified `Self::JSON` reference (spec.md
/// §4.4.1); the JSON wire format itself is outside this compiler's core.
#[cfg(feature = "serde")]
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

#[cfg(feature = "serde")]
impl<T> JsonCodec<T> {
    pub const fn new() -> JsonCodec<T> {
        JsonCodec {
            _marker: PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        JsonCodec::new()
    }
}

#[cfg(feature = "serde")]
impl<T> JsonCodec<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    pub fn to_json(&self, value: &T) -> serde_json::Result<String> {
        serde_json::to_string(value)
    }

    pub fn from_json(&self, json: &str) -> serde_json::Result<T> {
        serde_json::from_str(json)
    }
}

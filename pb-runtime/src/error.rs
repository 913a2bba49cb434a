use std::fmt;

/// A read or write that fell outside the bounds of the buffer it targeted.
///
/// Bounds violations are errors, not silent truncations: every caller gets
/// back exactly what it asked for, or an error explaining why not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutOfBounds {
    pub requested_offset: u64,
    pub requested_length: u64,
    pub available: u64,
}

impl fmt::Display for OutOfBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "out of bounds: requested {} byte(s) at offset {}, but only {} available",
            self.requested_length, self.requested_offset, self.available
        )
    }
}

impl std::error::Error for OutOfBounds {}

/// Failure decoding or encoding the protobuf wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireFormatError {
    /// Attempted to read past the end of the available data.
    UnexpectedEof,
    /// A varint ran past 10 bytes without a terminating byte.
    MalformedVarint,
    /// A length-delimited field's length prefix did not fit any remaining data.
    InvalidLengthPrefix(i64),
    /// Bytes claimed to be UTF-8 were not.
    InvalidUtf8,
    /// A tag's wire type nibble was not one of the five defined wire types.
    UnknownWireType(u8),
    /// A bounds violation on the underlying buffer.
    OutOfBounds(OutOfBounds),
}

impl From<OutOfBounds> for WireFormatError {
    fn from(e: OutOfBounds) -> Self {
        WireFormatError::OutOfBounds(e)
    }
}

impl fmt::Display for WireFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireFormatError::UnexpectedEof => write!(f, "unexpected end of input"),
            WireFormatError::MalformedVarint => write!(f, "malformed varint"),
            WireFormatError::InvalidLengthPrefix(n) => {
                write!(f, "invalid length-delimited prefix: {}", n)
            }
            WireFormatError::InvalidUtf8 => write!(f, "invalid UTF-8 in length-delimited field"),
            WireFormatError::UnknownWireType(t) => write!(f, "unknown wire type: {}", t),
            WireFormatError::OutOfBounds(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for WireFormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WireFormatError::OutOfBounds(e) => Some(e),
            _ => None,
        }
    }
}

pub type WireFormatResult<T> = Result<T, WireFormatError>;

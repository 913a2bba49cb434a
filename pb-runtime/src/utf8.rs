//! UTF-8 length and encode/decode helpers shared by generated readers and writers.

use crate::error::{WireFormatError, WireFormatResult};
use crate::sequential::WritableSequentialData;

/// Byte length of `s` encoded as UTF-8. `str` in Rust is always valid UTF-8
/// already, so this is just `s.len()`, but the helper exists so generated
/// code never has to reason about whether `len()` means bytes or chars.
pub fn encoded_length(s: &str) -> u64 {
    s.len() as u64
}

/// Writes the UTF-8 bytes of `s` with no length prefix.
pub fn encode_utf8(s: &str, out: &mut dyn WritableSequentialData) -> WireFormatResult<()> {
    out.write_bytes(s.as_bytes())
}

/// Decodes `bytes` as UTF-8, failing with [`WireFormatError::InvalidUtf8`]
/// rather than lossily substituting replacement characters.
pub fn decode_utf8(bytes: &[u8]) -> WireFormatResult<String> {
    String::from_utf8(bytes.to_vec()).map_err(|_| WireFormatError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffered::BufferedData;
    use crate::sequential::ReadableSequentialData;

    #[test]
    fn encoded_length_matches_native_byte_count() {
        for s in ["", "a", "Dude", "héllo", "✅", "日本語"] {
            assert_eq!(s.as_bytes().len() as u64, encoded_length(s));
        }
    }

    #[test]
    fn encode_utf8_writes_checkmark_bytes_s4() {
        let mut buf = BufferedData::allocate(16);
        assert_eq!(3, encoded_length("✅"));
        encode_utf8("✅", &mut buf).unwrap();
        buf.flip();
        let bytes = buf.read_bytes(3).unwrap();
        assert_eq!(vec![0xE2, 0x9C, 0x85], bytes);
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        assert!(decode_utf8(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn decode_roundtrips_native_strings() {
        for s in ["", "plain", "✅ 日本語"] {
            assert_eq!(s, decode_utf8(s.as_bytes()).unwrap());
        }
    }
}

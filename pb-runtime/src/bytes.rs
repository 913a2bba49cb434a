use std::fmt;
use std::sync::Arc;

use crate::error::{OutOfBounds, WireFormatResult};

/// Absolute-offset, bounds-checked reads over a byte sequence.
///
/// Implemented by [`Bytes`] (immutable, shareable) and by
/// [`crate::buffered::BufferedData`] (mutable, single-owner). All offsets
/// are relative to the implementor's own view — a slice's offset `0` is the
/// first byte of the slice, not of whatever it was sliced from.
pub trait RandomAccessData {
    /// Number of bytes visible through this view.
    fn length(&self) -> u64;

    /// Single byte at `offset`.
    fn get_byte(&self, offset: u64) -> WireFormatResult<u8>;

    /// Big-endian 32-bit integer starting at `offset`.
    fn get_int(&self, offset: u64) -> WireFormatResult<i32> {
        let mut buf = [0u8; 4];
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.get_byte(offset + i as u64)?;
        }
        Ok(i32::from_be_bytes(buf))
    }

    /// Big-endian 64-bit integer starting at `offset`.
    fn get_long(&self, offset: u64) -> WireFormatResult<i64> {
        let mut buf = [0u8; 8];
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.get_byte(offset + i as u64)?;
        }
        Ok(i64::from_be_bytes(buf))
    }

    /// Copies `min(length, self.length() - src_offset)` bytes into
    /// `dst[dst_offset..]`, returning the count actually copied.
    ///
    /// Fails with [`OutOfBounds`] if the destination range
    /// `dst_offset + length` does not fit in `dst`.
    fn get_bytes(
        &self,
        src_offset: u64,
        dst: &mut [u8],
        dst_offset: usize,
        length: usize,
    ) -> Result<usize, OutOfBounds> {
        if dst_offset + length > dst.len() {
            return Err(OutOfBounds {
                requested_offset: dst_offset as u64,
                requested_length: length as u64,
                available: dst.len() as u64,
            });
        }
        let available = self.length().saturating_sub(src_offset);
        let to_copy = (length as u64).min(available) as usize;
        for i in 0..to_copy {
            // get_byte cannot fail here: i < available by construction.
            dst[dst_offset + i] = self
                .get_byte(src_offset + i as u64)
                .expect("index within computed bounds");
        }
        Ok(to_copy)
    }

    /// A zero-copy, bounds-checked view of `length` bytes starting at `offset`.
    fn slice(&self, offset: u64, length: u64) -> WireFormatResult<Bytes>;

    /// True iff this data begins with exactly `prefix`.
    fn matches_prefix(&self, prefix: &[u8]) -> bool {
        if prefix.len() as u64 > self.length() {
            return false;
        }
        prefix
            .iter()
            .enumerate()
            .all(|(i, &b)| self.get_byte(i as u64) == Ok(b))
    }

    /// True iff `needle` fits at `offset` and matches byte-for-byte.
    fn contains(&self, offset: u64, needle: &[u8]) -> bool {
        if offset + needle.len() as u64 > self.length() {
            return false;
        }
        needle
            .iter()
            .enumerate()
            .all(|(i, &b)| self.get_byte(offset + i as u64) == Ok(b))
    }
}

/// An immutable, shareable byte sequence.
///
/// Cloning is O(1): the backing storage is reference-counted and slices
/// share it rather than copying. A `Bytes` never observes mutation of its
/// storage, so it is `Send + Sync` without interior locking.
#[derive(Clone)]
pub struct Bytes {
    storage: Arc<[u8]>,
    start: usize,
    len: usize,
}

impl Bytes {
    pub fn empty() -> Bytes {
        Bytes {
            storage: Arc::from(Vec::new().into_boxed_slice()),
            start: 0,
            len: 0,
        }
    }

    pub fn copy_from(data: &[u8]) -> Bytes {
        let len = data.len();
        Bytes {
            storage: Arc::from(data.to_vec().into_boxed_slice()),
            start: 0,
            len,
        }
    }

    pub fn from_vec(data: Vec<u8>) -> Bytes {
        let len = data.len();
        Bytes {
            storage: Arc::from(data.into_boxed_slice()),
            start: 0,
            len,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.storage[self.start..self.start + self.len]
    }

    /// Full-range UTF-8 decode of this view.
    pub fn as_utf8_string(&self) -> WireFormatResult<String> {
        crate::utf8::decode_utf8(self.as_slice())
    }
}

impl RandomAccessData for Bytes {
    fn length(&self) -> u64 {
        self.len as u64
    }

    fn get_byte(&self, offset: u64) -> WireFormatResult<u8> {
        let idx = usize::try_from(offset).map_err(|_| oob(offset, 1, self.len as u64))?;
        self.as_slice()
            .get(idx)
            .copied()
            .ok_or_else(|| oob(offset, 1, self.len as u64).into())
    }

    fn slice(&self, offset: u64, length: u64) -> WireFormatResult<Bytes> {
        let offset_usize =
            usize::try_from(offset).map_err(|_| oob(offset, length, self.len as u64))?;
        let length_usize =
            usize::try_from(length).map_err(|_| oob(offset, length, self.len as u64))?;
        if offset_usize + length_usize > self.len {
            return Err(oob(offset, length, self.len as u64).into());
        }
        Ok(Bytes {
            storage: Arc::clone(&self.storage),
            start: self.start + offset_usize,
            len: length_usize,
        })
    }
}

fn oob(offset: u64, length: u64, available: u64) -> OutOfBounds {
    OutOfBounds {
        requested_offset: offset,
        requested_length: length,
        available,
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(data: Vec<u8>) -> Bytes {
        Bytes::from_vec(data)
    }
}

impl<'a> From<&'a [u8]> for Bytes {
    fn from(data: &'a [u8]) -> Bytes {
        Bytes::copy_from(data)
    }
}

impl PartialEq for Bytes {
    fn eq(&self, other: &Bytes) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Bytes {}

impl std::hash::Hash for Bytes {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes({} byte(s))", self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_bytes_exact_s1() {
        // Scenario S1 from the spec's testable properties.
        let b = Bytes::copy_from(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let mut dst = [0u8; 8];
        let n = b.get_bytes(4, &mut dst, 0, 4).unwrap();
        assert_eq!(4, n);
        assert_eq!([4, 5, 6, 7, 0, 0, 0, 0], dst);
    }

    #[test]
    fn get_bytes_clamped_to_available_s2() {
        let b = Bytes::copy_from(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let mut dst = [0u8; 8];
        let n = b.get_bytes(3, &mut dst, 0, 6).unwrap();
        assert_eq!(5, n);
        assert_eq!([3, 4, 5, 6, 7, 0, 0, 0], dst);
    }

    #[test]
    fn get_bytes_dst_overflow_is_out_of_bounds_s3() {
        let b = Bytes::copy_from(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let mut dst = [0u8; 8];
        let err = b.get_bytes(4, &mut dst, 6, 4).unwrap_err();
        assert_eq!(6, err.requested_offset);
        assert_eq!(4, err.requested_length);
        assert_eq!(8, err.available);
    }

    #[test]
    fn slice_is_zero_copy_view() {
        let d = Bytes::copy_from(&[10, 11, 12, 13, 14, 15]);
        let s = d.slice(1, 4).unwrap();
        assert_eq!(4, s.length());
        for i in 0..4 {
            assert_eq!(d.get_byte(1 + i).unwrap(), s.get_byte(i).unwrap());
        }
    }

    #[test]
    fn slice_out_of_bounds() {
        let d = Bytes::copy_from(&[1, 2, 3]);
        assert!(d.slice(2, 5).is_err());
    }

    #[test]
    fn big_endian_int_and_long() {
        let d = Bytes::copy_from(&[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(0x01020304, d.get_int(0).unwrap());

        let d = Bytes::copy_from(&[0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(1, d.get_long(0).unwrap());
    }

    #[test]
    fn slice_int_matches_offset_on_parent() {
        let d = Bytes::copy_from(&[0xff, 0x01, 0x02, 0x03, 0x04, 0xff]);
        let s = d.slice(1, 5).unwrap();
        assert_eq!(s.get_int(0).unwrap(), d.get_int(1).unwrap());
    }

    #[test]
    fn matches_prefix_reflexive_and_empty() {
        let d = Bytes::copy_from(&[1, 2, 3]);
        assert!(d.matches_prefix(&[1, 2, 3]));
        assert!(d.matches_prefix(&[]));
        assert!(Bytes::empty().matches_prefix(&[]));
        assert!(!d.matches_prefix(&[1, 2, 3, 4]));
        assert!(!d.matches_prefix(&[1, 2, 9]));
    }

    #[test]
    fn as_utf8_string_roundtrip() {
        let d = Bytes::copy_from("✅".as_bytes());
        assert_eq!("✅", d.as_utf8_string().unwrap());
    }

    #[test]
    fn contains_respects_slice_bounds() {
        let d = Bytes::copy_from(&[1, 2, 3, 4, 5]);
        let s = d.slice(1, 3).unwrap(); // {2,3,4}
        assert!(s.contains(0, &[2, 3]));
        assert!(!s.contains(2, &[4, 5])); // 5 is outside the slice
    }
}

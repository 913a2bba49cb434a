use crate::bytes::{Bytes, RandomAccessData};
use crate::error::{OutOfBounds, WireFormatError, WireFormatResult};
use crate::sequential::{ReadableSequentialData, WritableSequentialData};

/// A mutable, exclusively-owned buffer implementing both
/// [`ReadableSequentialData`] and [`WritableSequentialData`].
///
/// Starts in write mode after [`BufferedData::allocate`]: `position` is `0`
/// and `limit` equals `capacity`, so writes fill the buffer from the front.
/// [`BufferedData::flip`] swaps to read mode by setting `limit = position`
/// and rewinding `position` to `0`, the same convention as `java.nio.Buffer`.
pub struct BufferedData {
    data: Vec<u8>,
    position: u64,
    limit: u64,
}

impl BufferedData {
    /// Allocates a zero-filled buffer of exactly `capacity` bytes.
    pub fn allocate(capacity: usize) -> BufferedData {
        BufferedData {
            data: vec![0u8; capacity],
            position: 0,
            limit: capacity as u64,
        }
    }

    /// Wraps an existing vector as a full buffer in read mode (`position =
    /// 0`, `limit = data.len()`).
    pub fn wrap(data: Vec<u8>) -> BufferedData {
        let limit = data.len() as u64;
        BufferedData {
            data,
            position: 0,
            limit,
        }
    }

    /// Swaps from write mode to read mode: `limit` becomes the current
    /// `position` (how much was written), and `position` rewinds to `0`.
    pub fn flip(&mut self) {
        self.limit = self.position;
        self.position = 0;
    }

    /// Rewinds `position` to `0` without touching `limit`.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Direct, position-independent copy out of the buffer, mirroring
    /// [`RandomAccessData::get_bytes`] but writing into a caller-owned slice.
    pub fn get_bytes(&self, offset: u64, dst: &mut [u8]) -> Result<usize, OutOfBounds> {
        RandomAccessData::get_bytes(self, offset, dst, 0, dst.len())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data[..]
    }

    /// Copies the buffer's full backing storage out as an immutable [`Bytes`].
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from(&self.data)
    }
}

impl RandomAccessData for BufferedData {
    fn length(&self) -> u64 {
        self.data.len() as u64
    }

    fn get_byte(&self, offset: u64) -> WireFormatResult<u8> {
        let idx = usize::try_from(offset)
            .map_err(|_| oob(offset, 1, self.data.len() as u64))?;
        self.data
            .get(idx)
            .copied()
            .ok_or_else(|| oob(offset, 1, self.data.len() as u64).into())
    }

    fn slice(&self, offset: u64, length: u64) -> WireFormatResult<Bytes> {
        let offset_usize = usize::try_from(offset)
            .map_err(|_| oob(offset, length, self.data.len() as u64))?;
        let length_usize = usize::try_from(length)
            .map_err(|_| oob(offset, length, self.data.len() as u64))?;
        if offset_usize + length_usize > self.data.len() {
            return Err(oob(offset, length, self.data.len() as u64).into());
        }
        Ok(Bytes::copy_from(
            &self.data[offset_usize..offset_usize + length_usize],
        ))
    }
}

fn oob(offset: u64, length: u64, available: u64) -> OutOfBounds {
    OutOfBounds {
        requested_offset: offset,
        requested_length: length,
        available,
    }
}

impl ReadableSequentialData for BufferedData {
    fn capacity(&self) -> u64 {
        self.data.len() as u64
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn set_position(&mut self, position: u64) -> WireFormatResult<()> {
        if position > self.limit {
            return Err(crate::sequential::range_error(position, self.limit).into());
        }
        self.position = position;
        Ok(())
    }

    fn limit(&self) -> u64 {
        self.limit
    }

    fn set_limit(&mut self, limit: u64) -> WireFormatResult<()> {
        if limit > self.capacity() {
            return Err(crate::sequential::range_error(limit, self.capacity()).into());
        }
        self.limit = limit;
        if self.position > self.limit {
            self.position = self.limit;
        }
        Ok(())
    }

    fn read_byte(&mut self) -> WireFormatResult<u8> {
        if self.position >= self.limit {
            return Err(WireFormatError::UnexpectedEof);
        }
        let b = self.data[self.position as usize];
        self.position += 1;
        Ok(b)
    }
}

impl WritableSequentialData for BufferedData {
    fn capacity(&self) -> u64 {
        self.data.len() as u64
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn set_position(&mut self, position: u64) -> WireFormatResult<()> {
        if position > self.limit {
            return Err(crate::sequential::range_error(position, self.limit).into());
        }
        self.position = position;
        Ok(())
    }

    fn limit(&self) -> u64 {
        self.limit
    }

    fn set_limit(&mut self, limit: u64) -> WireFormatResult<()> {
        if limit > self.capacity() {
            return Err(crate::sequential::range_error(limit, self.capacity()).into());
        }
        self.limit = limit;
        if self.position > self.limit {
            self.position = self.limit;
        }
        Ok(())
    }

    fn write_byte(&mut self, value: u8) -> WireFormatResult<()> {
        if self.position >= self.limit {
            return Err(WireFormatError::UnexpectedEof);
        }
        self.data[self.position as usize] = value;
        self.position += 1;
        Ok(())
    }
}

/// A `WritableSequentialData` that grows rather than failing at capacity,
/// used by the writer emitter's `write_to_vec`-style entry points where the
/// final size is not known ahead of a pre-pass.
pub struct GrowableWriter {
    data: Vec<u8>,
}

impl GrowableWriter {
    pub fn new() -> GrowableWriter {
        GrowableWriter { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> GrowableWriter {
        GrowableWriter {
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl Default for GrowableWriter {
    fn default() -> Self {
        GrowableWriter::new()
    }
}

impl WritableSequentialData for GrowableWriter {
    fn capacity(&self) -> u64 {
        u64::MAX
    }

    fn position(&self) -> u64 {
        self.data.len() as u64
    }

    fn set_position(&mut self, position: u64) -> WireFormatResult<()> {
        let position = position as usize;
        if position <= self.data.len() {
            self.data.truncate(position);
            Ok(())
        } else {
            self.data.resize(position, 0);
            Ok(())
        }
    }

    fn limit(&self) -> u64 {
        u64::MAX
    }

    fn set_limit(&mut self, _limit: u64) -> WireFormatResult<()> {
        Ok(())
    }

    fn write_byte(&mut self, value: u8) -> WireFormatResult<()> {
        self.data.push(value);
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> WireFormatResult<()> {
        self.data.extend_from_slice(bytes);
        Ok(())
    }
}

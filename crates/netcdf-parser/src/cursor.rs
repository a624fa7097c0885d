//! Seekable byte cursor with explicit endianness.
//!
//! [`ByteCursor`] wraps a fixed byte region and keeps a movable position.
//! Reads are bounds checked and advance the position by the width of the
//! type read. Writes grow the region by doubling when they would run past
//! its end, so the same type can be used to build test streams.
//!
//! Reading borrows the source without copying; the first write to a
//! borrowed region takes an owned copy.

use std::borrow::Cow;

use crate::error::{NetCdfError, NetCdfResult};

/// Byte order used for multi-byte reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    /// Most significant byte first (the NetCDF byte order).
    #[default]
    Big,
    /// Least significant byte first.
    Little,
}

/// A read/write cursor over a byte region.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: Cow<'a, [u8]>,
    position: usize,
    endianness: Endianness,
    mark: usize,
    marks: Vec<usize>,
    last_written: usize,
}

macro_rules! read_number {
    ($(#[$doc:meta] $name:ident => $ty:ty),+ $(,)?) => {
        $(
            #[$doc]
            pub fn $name(&mut self) -> NetCdfResult<$ty> {
                let bytes = self.take::<{ std::mem::size_of::<$ty>() }>()?;
                Ok(match self.endianness {
                    Endianness::Big => <$ty>::from_be_bytes(bytes),
                    Endianness::Little => <$ty>::from_le_bytes(bytes),
                })
            }
        )+
    };
}

macro_rules! write_number {
    ($(#[$doc:meta] $name:ident => $ty:ty),+ $(,)?) => {
        $(
            #[$doc]
            pub fn $name(&mut self, value: $ty) -> &mut Self {
                let bytes = match self.endianness {
                    Endianness::Big => value.to_be_bytes(),
                    Endianness::Little => value.to_le_bytes(),
                };
                self.put(&bytes)
            }
        )+
    };
}

impl<'a> ByteCursor<'a> {
    /// Create a big-endian cursor reading from `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            last_written: data.len(),
            data: Cow::Borrowed(data),
            position: 0,
            endianness: Endianness::Big,
            mark: 0,
            marks: Vec::new(),
        }
    }

    /// Create an empty, owned cursor with `capacity` zeroed bytes for writing.
    pub fn with_capacity(capacity: usize) -> ByteCursor<'static> {
        ByteCursor {
            data: Cow::Owned(vec![0; capacity]),
            position: 0,
            endianness: Endianness::Big,
            mark: 0,
            marks: Vec::new(),
            last_written: 0,
        }
    }

    /// Length of the backing region in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left between the position and the end of the region.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// True if `n` more bytes can be read from the current position.
    pub fn available(&self, n: usize) -> bool {
        self.position
            .checked_add(n)
            .is_some_and(|end| end <= self.data.len())
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn set_endianness(&mut self, endianness: Endianness) -> &mut Self {
        self.endianness = endianness;
        self
    }

    /// Move the position `n` bytes forward.
    pub fn skip(&mut self, n: usize) -> &mut Self {
        self.position = self.position.saturating_add(n);
        self
    }

    /// Move the position to `position`.
    pub fn seek(&mut self, position: usize) -> &mut Self {
        self.position = position;
        self
    }

    /// Move the position back to 0.
    pub fn rewind(&mut self) -> &mut Self {
        self.position = 0;
        self
    }

    /// Remember the current position in the single mark slot.
    pub fn mark(&mut self) -> &mut Self {
        self.mark = self.position;
        self
    }

    /// Return to the position saved by [`ByteCursor::mark`].
    pub fn reset(&mut self) -> &mut Self {
        self.position = self.mark;
        self
    }

    /// Push the current position onto the mark stack.
    pub fn push_mark(&mut self) -> &mut Self {
        self.marks.push(self.position);
        self
    }

    /// Pop the mark stack and seek to the popped position.
    pub fn pop_mark(&mut self) -> NetCdfResult<&mut Self> {
        let position = self
            .marks
            .pop()
            .ok_or_else(|| NetCdfError::illegal_state("mark stack empty"))?;
        self.position = position;
        Ok(self)
    }

    fn check(&self, n: usize) -> NetCdfResult<()> {
        if self.available(n) {
            Ok(())
        } else {
            Err(NetCdfError::OutOfBounds {
                position: self.position,
                requested: n,
                length: self.data.len(),
            })
        }
    }

    fn take<const N: usize>(&mut self) -> NetCdfResult<[u8; N]> {
        self.check(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.position..self.position + N]);
        self.position += N;
        Ok(out)
    }

    /// Read `n` raw bytes.
    pub fn read_bytes(&mut self, n: usize) -> NetCdfResult<&[u8]> {
        self.check(n)?;
        let start = self.position;
        self.position += n;
        Ok(&self.data[start..start + n])
    }

    /// Read `n` bytes as UTF-8 text. Invalid sequences become U+FFFD.
    pub fn read_chars(&mut self, n: usize) -> NetCdfResult<String> {
        Ok(String::from_utf8_lossy(self.read_bytes(n)?).into_owned())
    }

    /// Read one byte as a boolean (any non-zero value is true).
    pub fn read_bool(&mut self) -> NetCdfResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    read_number! {
        /// Read a signed 8-bit integer.
        read_i8 => i8,
        /// Read an unsigned 8-bit integer.
        read_u8 => u8,
        /// Read a signed 16-bit integer.
        read_i16 => i16,
        /// Read an unsigned 16-bit integer.
        read_u16 => u16,
        /// Read a signed 32-bit integer.
        read_i32 => i32,
        /// Read an unsigned 32-bit integer.
        read_u32 => u32,
        /// Read a 32-bit float.
        read_f32 => f32,
        /// Read a 64-bit float.
        read_f64 => f64,
    }

    /// Grow the region so `n` bytes fit after the position.
    ///
    /// The new length is twice the length needed.
    pub fn ensure_available(&mut self, n: usize) -> &mut Self {
        if !self.available(n) {
            let needed = self.position + n;
            self.data.to_mut().resize(needed * 2, 0);
        }
        self
    }

    fn put(&mut self, bytes: &[u8]) -> &mut Self {
        self.ensure_available(bytes.len());
        let start = self.position;
        self.data.to_mut()[start..start + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();
        self.last_written = self.last_written.max(self.position);
        self
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.put(bytes)
    }

    /// Write the UTF-8 bytes of `s`.
    pub fn write_chars(&mut self, s: &str) -> &mut Self {
        self.put(s.as_bytes())
    }

    /// Write `0xff` for true and `0x00` for false.
    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.write_u8(if value { 0xff } else { 0x00 })
    }

    write_number! {
        /// Write a signed 8-bit integer.
        write_i8 => i8,
        /// Write an unsigned 8-bit integer.
        write_u8 => u8,
        /// Write a signed 16-bit integer.
        write_i16 => i16,
        /// Write an unsigned 16-bit integer.
        write_u16 => u16,
        /// Write a signed 32-bit integer.
        write_i32 => i32,
        /// Write an unsigned 32-bit integer.
        write_u32 => u32,
        /// Write a 32-bit float.
        write_f32 => f32,
        /// Write a 64-bit float.
        write_f64 => f64,
    }

    /// The bytes up to the furthest position written (or the whole source
    /// for a read cursor).
    pub fn as_written(&self) -> &[u8] {
        &self.data[..self.last_written]
    }

    /// Consume the cursor and return the written bytes.
    pub fn into_vec(self) -> Vec<u8> {
        let mut data = self.data.into_owned();
        data.truncate(self.last_written);
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_big_endian_by_default() {
        let data = [0x00, 0x00, 0x01, 0x02, 0xff, 0xfe];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_u32().unwrap(), 0x0102);
        assert_eq!(cursor.read_i16().unwrap(), -2);
        assert_eq!(cursor.position(), 6);
    }

    #[test]
    fn test_little_endian_flag() {
        let data = [0x02, 0x01];
        let mut cursor = ByteCursor::new(&data);
        cursor.set_endianness(Endianness::Little);
        assert_eq!(cursor.read_u16().unwrap(), 0x0102);
    }

    #[test]
    fn test_read_past_end_is_out_of_bounds() {
        let data = [0x01, 0x02, 0x03];
        let mut cursor = ByteCursor::new(&data);
        let err = cursor.read_u32().unwrap_err();
        assert_eq!(
            err,
            NetCdfError::OutOfBounds {
                position: 0,
                requested: 4,
                length: 3
            }
        );
        // A failed read leaves the position untouched
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_mark_and_reset() {
        let data = [1, 2, 3, 4];
        let mut cursor = ByteCursor::new(&data);
        cursor.skip(1).mark();
        assert_eq!(cursor.read_u8().unwrap(), 2);
        cursor.reset();
        assert_eq!(cursor.read_u8().unwrap(), 2);
    }

    #[test]
    fn test_mark_stack() {
        let data = [1, 2, 3, 4];
        let mut cursor = ByteCursor::new(&data);
        cursor.push_mark();
        cursor.seek(2).push_mark();
        cursor.seek(3);
        assert_eq!(cursor.pop_mark().unwrap().position(), 2);
        assert_eq!(cursor.pop_mark().unwrap().position(), 0);
        assert!(matches!(
            cursor.pop_mark(),
            Err(NetCdfError::IllegalState(_))
        ));
    }

    #[test]
    fn test_read_chars() {
        let data = b"CDF\x01";
        let mut cursor = ByteCursor::new(data);
        assert_eq!(cursor.read_chars(3).unwrap(), "CDF");
        assert_eq!(cursor.read_u8().unwrap(), 1);
    }

    #[test]
    fn test_read_chars_decodes_utf8() {
        let mut cursor = ByteCursor::with_capacity(16);
        cursor.write_chars("température");
        let written = cursor.into_vec();
        assert_eq!(written.len(), 12);

        let mut cursor = ByteCursor::new(&written);
        assert_eq!(cursor.read_chars(12).unwrap(), "température");

        let mut cursor = ByteCursor::new(b"t\xe9mp");
        assert_eq!(cursor.read_chars(4).unwrap(), "t\u{fffd}mp");
    }

    #[test]
    fn test_write_grows_by_doubling() {
        let mut cursor = ByteCursor::with_capacity(2);
        cursor.write_u32(7);
        // 4 bytes needed from position 0, so the region doubles to 8
        assert_eq!(cursor.len(), 8);
        cursor.write_f64(1.5);
        assert_eq!(cursor.len(), 24);
        assert_eq!(cursor.as_written().len(), 12);

        let bytes = cursor.into_vec();
        let mut reader = ByteCursor::new(&bytes);
        assert_eq!(reader.read_u32().unwrap(), 7);
        assert_eq!(reader.read_f64().unwrap(), 1.5);
    }

    #[test]
    fn test_write_on_borrowed_source_copies() {
        let data = [0u8; 4];
        let mut cursor = ByteCursor::new(&data);
        cursor.write_i16(-1);
        assert_eq!(&cursor.as_written()[..2], &[0xff, 0xff]);
        assert_eq!(data, [0u8; 4]);
    }

    #[test]
    fn test_float_reads() {
        let mut cursor = ByteCursor::with_capacity(0);
        cursor.write_f32(-2.5).write_f64(1e300);
        let bytes = cursor.into_vec();
        let mut reader = ByteCursor::new(&bytes);
        assert_eq!(reader.read_f32().unwrap(), -2.5);
        assert_eq!(reader.read_f64().unwrap(), 1e300);
        assert_eq!(reader.remaining(), 0);
    }
}

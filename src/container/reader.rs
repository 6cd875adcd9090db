//! Bounds-checked little-endian reader over container bytes.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{CharexError, Result};
use crate::types::{Rect, Vec2};

/// Cursor wrapper whose errors are `CorruptContainer` with absolute offsets.
pub(crate) struct ByteReader<'a> {
    inner: Cursor<&'a [u8]>,
    /// Offset of `inner`'s first byte within the whole container.
    base: u64,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8], base: u64) -> Self {
        Self {
            inner: Cursor::new(bytes),
            base,
        }
    }

    /// Absolute offset of the next byte to be read.
    pub fn offset(&self) -> u64 {
        self.base + self.inner.position()
    }

    pub fn remaining(&self) -> usize {
        let len = self.inner.get_ref().len() as u64;
        len.saturating_sub(self.inner.position()) as usize
    }

    /// Run one fixed-size read; a short read reports where the field began.
    fn read<T>(
        &mut self,
        what: &str,
        f: impl FnOnce(&mut Cursor<&'a [u8]>) -> std::io::Result<T>,
    ) -> Result<T> {
        let start = self.inner.position();
        f(&mut self.inner).map_err(|_| {
            self.inner.set_position(start);
            CharexError::corrupt(
                self.base + start,
                format!("unexpected end of data reading {}", what),
            )
        })
    }

    pub fn u8(&mut self, what: &str) -> Result<u8> {
        self.read(what, |c| c.read_u8())
    }

    pub fn u16(&mut self, what: &str) -> Result<u16> {
        self.read(what, |c| c.read_u16::<LittleEndian>())
    }

    pub fn u32(&mut self, what: &str) -> Result<u32> {
        self.read(what, |c| c.read_u32::<LittleEndian>())
    }

    pub fn i32(&mut self, what: &str) -> Result<i32> {
        self.read(what, |c| c.read_i32::<LittleEndian>())
    }

    pub fn u64(&mut self, what: &str) -> Result<u64> {
        self.read(what, |c| c.read_u64::<LittleEndian>())
    }

    pub fn f32(&mut self, what: &str) -> Result<f32> {
        self.read(what, |c| c.read_f32::<LittleEndian>())
    }

    pub fn vec2(&mut self, what: &str) -> Result<Vec2> {
        Ok(Vec2::new(self.f32(what)?, self.f32(what)?))
    }

    pub fn rect(&mut self, what: &str) -> Result<Rect> {
        Ok(Rect::new(
            self.f32(what)?,
            self.f32(what)?,
            self.f32(what)?,
            self.f32(what)?,
        ))
    }

    /// Borrow the next `len` bytes without copying.
    pub fn bytes(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(CharexError::corrupt(
                self.offset(),
                format!(
                    "{} needs {} bytes but only {} remain",
                    what,
                    len,
                    self.remaining()
                ),
            ));
        }
        let start = self.inner.position() as usize;
        let slice: &'a [u8] = *self.inner.get_ref();
        self.inner.set_position((start + len) as u64);
        Ok(&slice[start..start + len])
    }

    /// Read a `u16`-length-prefixed UTF-8 string.
    pub fn string(&mut self, what: &str) -> Result<String> {
        let len = self.u16(what)? as usize;
        let start = self.offset();
        let raw = self.bytes(len, what)?;
        String::from_utf8(raw.to_vec())
            .map_err(|_| CharexError::corrupt(start, format!("{} is not valid UTF-8", what)))
    }

    /// Read exactly `N` bytes into an array.
    pub fn array<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
        self.read(what, |c| {
            let mut buf = [0u8; N];
            c.read_exact(&mut buf)?;
            Ok(buf)
        })
    }
}

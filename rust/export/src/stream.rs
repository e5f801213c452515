// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Growable output buffer with native-endian primitive writes.
//!
//! The stream format is host-dependent by definition: integers are native
//! `i32` and reals native `f64`. Growth goes through `try_reserve` so an
//! allocation failure surfaces as an error instead of aborting.

use byteorder::{NativeEndian, WriteBytesExt};
use std::io::Write;

use crate::config::ExportConfig;
use crate::error::{Error, Result};

/// In-memory output stream.
#[derive(Debug)]
pub struct ByteStream {
    buf: Vec<u8>,
    growth_chunk: usize,
}

impl ByteStream {
    /// Creates a stream with the configured initial capacity.
    pub fn new(config: &ExportConfig) -> Result<Self> {
        let mut buf = Vec::new();
        buf.try_reserve(config.initial_capacity)?;
        Ok(Self {
            buf,
            growth_chunk: config.growth_chunk.max(1),
        })
    }

    /// Ensures room for `additional` more bytes, growing in whole chunks.
    fn reserve(&mut self, additional: usize) -> Result<()> {
        if self.buf.capacity() - self.buf.len() < additional {
            self.buf.try_reserve(additional.max(self.growth_chunk))?;
        }
        Ok(())
    }

    /// Current stream length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.reserve(4)?;
        self.buf.write_i32::<NativeEndian>(value)?;
        Ok(())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.reserve(8)?;
        self.buf.write_f64::<NativeEndian>(value)?;
        Ok(())
    }

    pub fn write_i32s(&mut self, values: &[i32]) -> Result<()> {
        self.reserve(4 * values.len())?;
        for &v in values {
            self.buf.write_i32::<NativeEndian>(v)?;
        }
        Ok(())
    }

    pub fn write_f64s(&mut self, values: &[f64]) -> Result<()> {
        self.reserve(8 * values.len())?;
        for &v in values {
            self.buf.write_f64::<NativeEndian>(v)?;
        }
        Ok(())
    }

    /// Writes a count or 1-based index, which must fit an `i32`.
    pub fn write_count(&mut self, count: usize) -> Result<()> {
        let value = i32::try_from(count).map_err(|_| Error::Overflow(count))?;
        self.write_i32(value)
    }

    /// Writes a bounding box or other fixed group of reals.
    pub fn write_box(&mut self, values: &[f64; 6]) -> Result<()> {
        self.write_f64s(values)
    }

    /// Writes a length-prefixed, NUL-terminated string. `None` is written as
    /// a zero length with no payload.
    pub fn write_string(&mut self, value: Option<&str>) -> Result<()> {
        match value {
            None => self.write_i32(0),
            Some(s) => {
                self.write_count(s.len() + 1)?;
                self.reserve(s.len() + 1)?;
                self.buf.write_all(s.as_bytes())?;
                self.buf.write_u8(0)?;
                Ok(())
            }
        }
    }

    /// Consumes the stream and returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> ByteStream {
        ByteStream::new(&ExportConfig {
            initial_capacity: 2,
            growth_chunk: 3,
            ..ExportConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn primitives_are_native_endian() {
        let mut s = small();
        s.write_i32(-2).unwrap();
        s.write_f64(1.5).unwrap();
        let bytes = s.into_bytes();
        assert_eq!(&bytes[..4], &(-2i32).to_ne_bytes());
        assert_eq!(&bytes[4..12], &1.5f64.to_ne_bytes());
    }

    #[test]
    fn grows_past_initial_capacity() {
        let mut s = small();
        s.write_f64s(&[0.0; 100]).unwrap();
        assert_eq!(s.len(), 800);
    }

    #[test]
    fn strings_count_their_terminator() {
        let mut s = small();
        s.write_string(Some("ab")).unwrap();
        s.write_string(None).unwrap();
        let bytes = s.into_bytes();
        assert_eq!(&bytes[..4], &3i32.to_ne_bytes());
        assert_eq!(&bytes[4..7], b"ab\0");
        assert_eq!(&bytes[7..], &0i32.to_ne_bytes());
    }

    #[test]
    fn oversized_counts_are_rejected() {
        let mut s = small();
        assert!(matches!(
            s.write_count(usize::MAX),
            Err(Error::Overflow(_))
        ));
    }
}

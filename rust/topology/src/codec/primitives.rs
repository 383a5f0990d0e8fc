// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Byte-order aware primitive reads and writes with offset tracking.
//!
//! Every error carries the current context (header, table or attribute
//! block) and the byte offset at which the failing primitive started.

use std::io::{Read, Write};

use crate::config::ByteOrder;
use crate::error::{Error, Result};

pub(crate) struct PrimitiveWriter<W: Write> {
    inner: W,
    order: ByteOrder,
    offset: u64,
    context: &'static str,
}

impl<W: Write> PrimitiveWriter<W> {
    pub(crate) fn new(inner: W, order: ByteOrder) -> Self {
        Self {
            inner,
            order,
            offset: 0,
            context: "header",
        }
    }

    pub(crate) fn set_context(&mut self, context: &'static str) {
        self.context = context;
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes).map_err(|source| Error::Stream {
            context: self.context.to_string(),
            offset: self.offset,
            source,
        })?;
        self.offset += bytes.len() as u64;
        Ok(())
    }

    pub(crate) fn write_u32(&mut self, value: u32) -> Result<()> {
        let bytes = match self.order {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        };
        self.write_bytes(&bytes)
    }

    pub(crate) fn write_i32(&mut self, value: i32) -> Result<()> {
        let bytes = match self.order {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        };
        self.write_bytes(&bytes)
    }

    pub(crate) fn write_f64(&mut self, value: f64) -> Result<()> {
        let bytes = match self.order {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        };
        self.write_bytes(&bytes)
    }

    /// Writes a length or count as `u32`.
    pub(crate) fn write_len(&mut self, len: usize) -> Result<()> {
        let value = u32::try_from(len).map_err(|_| Error::Corrupt {
            context: self.context.to_string(),
            offset: self.offset,
            reason: format!("count {len} does not fit in 32 bits"),
        })?;
        self.write_u32(value)
    }

    pub(crate) fn write_indices(&mut self, indices: &[u32]) -> Result<()> {
        self.write_len(indices.len())?;
        for &i in indices {
            self.write_u32(i)?;
        }
        Ok(())
    }

    /// Writes a string as a `u32` byte length followed by UTF-8 bytes.
    pub(crate) fn write_str(&mut self, value: &str) -> Result<()> {
        self.write_len(value.len())?;
        self.write_bytes(value.as_bytes())
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(|source| Error::Stream {
            context: self.context.to_string(),
            offset: self.offset,
            source,
        })
    }

    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }
}

pub(crate) struct PrimitiveReader<R: Read> {
    inner: R,
    order: ByteOrder,
    offset: u64,
    context: &'static str,
    max_len: u32,
}

impl<R: Read> PrimitiveReader<R> {
    pub(crate) fn new(inner: R, max_len: u32) -> Self {
        Self {
            inner,
            order: ByteOrder::native(),
            offset: 0,
            context: "header",
            max_len,
        }
    }

    pub(crate) fn set_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    pub(crate) fn set_context(&mut self, context: &'static str) {
        self.context = context;
    }

    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }

    pub(crate) fn corrupt_at(&self, offset: u64, reason: impl Into<String>) -> Error {
        Error::Corrupt {
            context: self.context.to_string(),
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf).map_err(|source| Error::Stream {
            context: self.context.to_string(),
            offset: self.offset,
            source,
        })?;
        self.offset += N as u64;
        Ok(buf)
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf).map_err(|source| Error::Stream {
            context: self.context.to_string(),
            offset: self.offset,
            source,
        })?;
        self.offset += len as u64;
        Ok(buf)
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_array::<4>()?;
        Ok(match self.order {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        })
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.read_array::<4>()?;
        Ok(match self.order {
            ByteOrder::Little => i32::from_le_bytes(bytes),
            ByteOrder::Big => i32::from_be_bytes(bytes),
        })
    }

    pub(crate) fn read_f64(&mut self) -> Result<f64> {
        let bytes = self.read_array::<8>()?;
        Ok(match self.order {
            ByteOrder::Little => f64::from_le_bytes(bytes),
            ByteOrder::Big => f64::from_be_bytes(bytes),
        })
    }

    /// Reads a count and rejects values above the configured bound.
    pub(crate) fn read_count(&mut self) -> Result<usize> {
        let start = self.offset;
        let count = self.read_u32()?;
        if count > self.max_len {
            return Err(self.corrupt_at(
                start,
                format!("count {count} exceeds limit {}", self.max_len),
            ));
        }
        Ok(count as usize)
    }

    pub(crate) fn read_indices(&mut self) -> Result<Vec<u32>> {
        let n = self.read_count()?;
        (0..n).map(|_| self.read_u32()).collect()
    }

    pub(crate) fn read_string(&mut self) -> Result<String> {
        let start = self.offset;
        let len = self.read_count()?;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes).map_err(|e| self.corrupt_at(start, format!("invalid UTF-8: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    #[test]
    fn big_endian_layout() {
        let mut buf = Vec::new();
        let mut w = PrimitiveWriter::new(&mut buf, ByteOrder::Big);
        w.write_u32(0x0102_0304).unwrap();
        w.write_i32(-1).unwrap();
        assert_eq!(w.offset(), 8);
        assert_eq!(buf, vec![1, 2, 3, 4, 0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn reads_follow_order() {
        let mut buf = Vec::new();
        let mut w = PrimitiveWriter::new(&mut buf, ByteOrder::Little);
        w.write_f64(0.001).unwrap();
        w.write_str("ENTITY_TOL").unwrap();

        let mut r = PrimitiveReader::new(buf.as_slice(), 1024);
        r.set_order(ByteOrder::Little);
        assert_eq!(r.read_f64().unwrap(), 0.001);
        assert_eq!(r.read_string().unwrap(), "ENTITY_TOL");
        assert_eq!(r.offset(), 8 + 4 + 10);
    }

    #[test]
    fn truncated_input_is_corrupt() {
        let bytes = [1u8, 2];
        let mut r = PrimitiveReader::new(&bytes[..], 1024);
        let err = r.read_u32().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Corrupt);
    }

    #[test]
    fn count_above_limit_is_corrupt() {
        let mut buf = Vec::new();
        PrimitiveWriter::new(&mut buf, ByteOrder::Little)
            .write_u32(5000)
            .unwrap();

        let mut r = PrimitiveReader::new(buf.as_slice(), 100);
        r.set_order(ByteOrder::Little);
        r.set_context("Loop table");
        let err = r.read_count().unwrap_err();
        assert!(matches!(err, Error::Corrupt { offset: 0, .. }));
        assert!(err.to_string().contains("Loop table"));
    }
}

//! Big-endian data streams.
//!
//! The binary layout format is a sequence of fixed-width big-endian integers,
//! single-byte booleans, and length-prefixed UTF-8 strings (`u16` byte length).
//! [`DataOutput`] and [`DataInput`] wrap any `io::Write` / `io::Read`; they do
//! no buffering of their own and never seek, so non-seekable sources work.

use std::io::{self, Read, Write};

use crate::error::CodecError;

/// Writer half of the binary framing.
#[derive(Debug)]
pub struct DataOutput<W> {
    inner: W,
}

impl<W: Write> DataOutput<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), CodecError> {
        self.inner.write_all(&[value])?;
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<(), CodecError> {
        self.write_u8(u8::from(value))
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), CodecError> {
        self.inner.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<(), CodecError> {
        self.inner.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<(), CodecError> {
        self.inner.write_all(&value.to_bits().to_be_bytes())?;
        Ok(())
    }

    /// Write a count or index; fails if it does not fit a signed 32-bit field.
    pub fn write_len(&mut self, value: usize) -> Result<(), CodecError> {
        let value = i32::try_from(value)
            .map_err(|_| CodecError::malformed(format!("length {value} exceeds i32 range")))?;
        self.write_i32(value)
    }

    /// Write a `u16`-length-prefixed UTF-8 string.
    pub fn write_utf(&mut self, value: &str) -> Result<(), CodecError> {
        let bytes = value.as_bytes();
        let len = u16::try_from(bytes.len()).map_err(|_| {
            CodecError::malformed(format!("string of {} bytes is too long", bytes.len()))
        })?;
        self.write_u16(len)?;
        self.inner.write_all(bytes)?;
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        self.inner.write_all(bytes)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), CodecError> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Reader half of the binary framing.
#[derive(Debug)]
pub struct DataInput<R> {
    inner: R,
}

impl<R: Read> DataInput<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fill(&mut self, buf: &mut [u8], what: &str) -> Result<(), CodecError> {
        self.inner.read_exact(buf).map_err(|err| match err.kind() {
            io::ErrorKind::UnexpectedEof => {
                CodecError::malformed(format!("end of stream while reading {what}"))
            }
            _ => CodecError::Io(err),
        })
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        let mut buf = [0u8; 1];
        self.fill(&mut buf, "byte")?;
        Ok(buf[0])
    }

    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::malformed(format!("invalid boolean byte {other}"))),
        }
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        let mut buf = [0u8; 2];
        self.fill(&mut buf, "u16")?;
        Ok(u16::from_be_bytes(buf))
    }

    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf, "i32")?;
        Ok(i32::from_be_bytes(buf))
    }

    pub fn read_f64(&mut self) -> Result<f64, CodecError> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf, "f64")?;
        Ok(f64::from_bits(u64::from_be_bytes(buf)))
    }

    /// Read a count or index written by [`DataOutput::write_len`].
    pub fn read_len(&mut self) -> Result<usize, CodecError> {
        let value = self.read_i32()?;
        usize::try_from(value)
            .map_err(|_| CodecError::malformed(format!("negative length {value}")))
    }

    /// Read a payload length and check it against `limit` before any payload
    /// byte is consumed.
    pub fn read_bounded_len(&mut self, limit: u32) -> Result<u32, CodecError> {
        let value = self.read_i32()?;
        let len = u32::try_from(value)
            .map_err(|_| CodecError::malformed(format!("negative payload length {value}")))?;
        if len > limit {
            return Err(CodecError::PayloadTooLarge { len, limit });
        }
        Ok(len)
    }

    pub fn read_utf(&mut self) -> Result<String, CodecError> {
        let len = usize::from(self.read_u16()?);
        let mut buf = vec![0u8; len];
        self.fill(&mut buf, "string")?;
        String::from_utf8(buf).map_err(|err| CodecError::malformed(format!("invalid UTF-8: {err}")))
    }

    /// Read exactly `len` bytes into a fresh buffer.
    pub fn read_bytes(&mut self, len: u32) -> Result<Vec<u8>, CodecError> {
        let mut buf = vec![0u8; len as usize];
        self.fill(&mut buf, "payload")?;
        Ok(buf)
    }

    /// Consume and discard exactly `len` bytes.
    ///
    /// Reads through the stream instead of seeking.
    pub fn skip(&mut self, len: u32) -> Result<(), CodecError> {
        let wanted = u64::from(len);
        let skipped = io::copy(&mut self.inner.by_ref().take(wanted), &mut io::sink())?;
        if skipped < wanted {
            return Err(CodecError::malformed(format!(
                "end of stream after skipping {skipped} of {wanted} bytes"
            )));
        }
        Ok(())
    }
}

//! Big-endian SSH wire primitives.
//!
//! [`Reader`] is a cursor over an immutable buffer: each read advances the
//! position instead of slicing off a new buffer, so decoding a certificate
//! with many fields stays linear.

use crate::error::{Result, SshCertError};

/// Cursor over an encoded SSH buffer.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The unread part of the buffer.
    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    pub fn is_finished(&self) -> bool {
        self.pos == self.bytes.len()
    }

    /// Fails if any bytes are left unread.
    pub fn finish(self) -> Result<()> {
        if self.is_finished() {
            Ok(())
        } else {
            Err(SshCertError::InvalidData(format!(
                "{} trailing bytes after the last field",
                self.bytes.len() - self.pos
            )))
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let available = self.bytes.len() - self.pos;
        if len > available {
            return Err(SshCertError::DecodingError(format!(
                "needed {len} bytes at offset {}, only {available} left",
                self.pos
            )));
        }
        let out = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_be_bytes(buf))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_be_bytes(buf))
    }

    /// Reads a 4-byte length prefix and that many bytes.
    pub fn read_string(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32()? as usize;
        self.take(len)
    }

    /// Reads a length-prefixed string and checks it is UTF-8.
    pub fn read_utf8(&mut self) -> Result<&'a str> {
        let bytes = self.read_string()?;
        std::str::from_utf8(bytes)
            .map_err(|e| SshCertError::InvalidData(format!("string is not UTF-8: {e}")))
    }
}

/// Writer helpers for building SSH buffers in a `Vec<u8>`.
pub trait WriteExt {
    fn put_u8(&mut self, value: u8);
    fn put_u32(&mut self, value: u32);
    fn put_u64(&mut self, value: u64);
    /// Writes a 4-byte length prefix followed by the bytes.
    fn put_string(&mut self, bytes: &[u8]) -> Result<()>;
}

impl WriteExt for Vec<u8> {
    fn put_u8(&mut self, value: u8) {
        self.push(value);
    }

    fn put_u32(&mut self, value: u32) {
        self.extend_from_slice(&value.to_be_bytes());
    }

    fn put_u64(&mut self, value: u64) {
        self.extend_from_slice(&value.to_be_bytes());
    }

    fn put_string(&mut self, bytes: &[u8]) -> Result<()> {
        let len = u32::try_from(bytes.len()).map_err(|_| {
            SshCertError::IntegerOverflow(format!(
                "string of {} bytes exceeds the 32-bit length prefix",
                bytes.len()
            ))
        })?;
        self.put_u32(len);
        self.extend_from_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_walks_concatenated_values() {
        let mut buf = Vec::new();
        buf.put_u8(1);
        buf.put_u32(0xdead_beef);
        buf.put_u64(u64::MAX);
        buf.put_string(b"abc").unwrap();

        let mut reader = Reader::new(&buf);
        assert_eq!(reader.read_u8().unwrap(), 1);
        assert_eq!(reader.read_u32().unwrap(), 0xdead_beef);
        assert_eq!(reader.read_u64().unwrap(), u64::MAX);
        assert_eq!(reader.read_string().unwrap(), b"abc");
        assert!(reader.is_finished());
        reader.finish().unwrap();
    }

    #[test]
    fn test_truncated_string_fails_closed() {
        // Length prefix claims 16 bytes, only 2 follow.
        let buf = [0, 0, 0, 16, b'h', b'i'];
        let mut reader = Reader::new(&buf);
        let err = reader.read_string().unwrap_err();
        assert!(matches!(err, SshCertError::DecodingError(_)));
    }

    #[test]
    fn test_finish_rejects_trailing_bytes() {
        let buf = [0, 0, 0, 0, 7];
        let mut reader = Reader::new(&buf);
        assert_eq!(reader.read_string().unwrap(), b"");
        assert_eq!(reader.remaining(), &[7]);
        assert!(reader.finish().is_err());
    }
}

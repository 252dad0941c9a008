//! Byte-level primitives of the calldata format.
//!
//! Variable-size integers use a one-byte length followed by that many
//! big-endian value bytes, with leading zero bytes stripped:
//!
//! ```text
//! value = 40962 (0xa002)   ->  02 a0 02
//! value = 1                ->  01 01
//! value = 0                ->  01 00
//! ```
//!
//! The same encoding is used for slot addresses, payload byte counts and
//! ring buffer row indices. Zero is written as a single `0x00` byte, which is
//! what the sequencer emits; a zero-length field also reads back as zero.

use adfs_types::U256;

use crate::error::DecodeError;

/// Widest value a length prefix may describe, in bytes.
pub const MAX_PREFIXED_LEN: usize = 32;

/// Appends `value` as `len(1) ++ value(len)` using the minimal number of bytes.
pub fn write_length_prefixed(out: &mut Vec<u8>, value: &U256) {
    let bytes = value.to_be_bytes::<MAX_PREFIXED_LEN>();
    let first = bytes
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(MAX_PREFIXED_LEN - 1);
    let trimmed = &bytes[first..];

    out.push(trimmed.len() as u8);
    out.extend_from_slice(trimmed);
}

/// Reads a `len(1) ++ value(len)` field at `cursor`, returning the value and
/// the cursor positioned after it.
pub fn read_length_prefixed(buf: &[u8], cursor: usize) -> Result<(U256, usize), DecodeError> {
    let mut reader = ByteReader::at(buf, cursor);
    let value = reader.read_length_prefixed()?;
    Ok((value, reader.offset()))
}

/// Forward-only cursor over a calldata buffer.
///
/// Every read is bounds checked; running past the end yields
/// [`DecodeError::TruncatedInput`] carrying the offset of the failed read.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::at(buf, 0)
    }

    pub fn at(buf: &'a [u8], offset: usize) -> Self {
        Self { buf, offset }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.offset)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if len > self.remaining() {
            return Err(DecodeError::TruncatedInput {
                offset: self.offset,
                needed: len,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.buf[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_array::<1>()?[0])
    }

    #[inline]
    pub fn read_u32_be(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    #[inline]
    pub fn read_u64_be(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    pub fn read_length_prefixed(&mut self) -> Result<U256, DecodeError> {
        let prefix_at = self.offset;
        let len = self.read_u8()? as usize;
        if len > MAX_PREFIXED_LEN {
            return Err(DecodeError::LengthPrefixTooWide {
                offset: prefix_at,
                len,
            });
        }
        let bytes = self.read_bytes(len)?;
        // at most 32 bytes, always fits
        Ok(U256::try_from_be_slice(bytes).unwrap_or_default())
    }
}

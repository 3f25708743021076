//! Bit-level reader over the payload of one compressed chunk
//!
//! Bits are consumed least-significant first within each byte. The payload is
//! pulled from the underlying source in fixed-size blocks, never past the
//! length the chunk declared.

use crate::common::HEADER_SIZE;
use crate::{DecodeError, Result};
use log::trace;
use std::io::{self, Read};

/// Reads single bits and small bit groups from a chunk payload
#[derive(Debug)]
pub struct BitCursor<R: Read> {
    reader: R,
    buffer: Vec<u8>,
    /// Valid bytes in `buffer`
    filled: usize,
    /// Current byte in `buffer`
    byte_pos: usize,
    /// Bits of the current byte already consumed (0..=8)
    bit_pos: u8,
    /// Payload bytes not yet loaded from `reader`
    remaining: u32,
    /// Payload bytes loaded before the current block
    loaded_before: u64,
    declared: u32,
    failure: Option<DecodeError>,
}

impl<R: Read> BitCursor<R> {
    /// Create a cursor over `payload_len` bytes of `reader` and load the
    /// first block.
    pub fn new(reader: R, payload_len: u32, buffer_size: usize) -> Result<Self> {
        let mut cursor = Self {
            reader,
            buffer: vec![0; buffer_size.max(1)],
            filled: 0,
            byte_pos: 0,
            bit_pos: 0,
            remaining: payload_len,
            loaded_before: 0,
            declared: payload_len.saturating_add(HEADER_SIZE as u32),
            failure: None,
        };

        if payload_len == 0 {
            return Err(cursor.fail(DecodeError::UnexpectedEndOfChunk {
                declared: cursor.declared,
            }));
        }

        cursor.fill_buffer()?;
        Ok(cursor)
    }

    /// Read the next bit
    pub fn read_bit(&mut self) -> Result<u8> {
        self.check()?;
        if self.bit_pos == 8 {
            self.advance_byte()?;
        }

        let bit = (self.buffer[self.byte_pos] >> self.bit_pos) & 1;
        self.bit_pos += 1;
        Ok(bit)
    }

    /// Read `count` bits (at most 8); the first bit read is the least
    /// significant bit of the result.
    pub fn read_bits(&mut self, count: u8) -> Result<u8> {
        debug_assert!(count <= 8, "at most 8 bits per read");
        self.check()?;
        if self.bit_pos == 8 {
            self.advance_byte()?;
        }

        let current = u16::from(self.buffer[self.byte_pos]);
        if self.bit_pos + count > 8 {
            // Tail of this byte, then the head of the next one
            let low_len = 8 - self.bit_pos;
            let high_len = count - low_len;
            let low = current >> self.bit_pos;

            self.advance_byte()?;
            let next = u16::from(self.buffer[self.byte_pos]);
            let high = next & ((1 << high_len) - 1);

            self.bit_pos = high_len;
            Ok((low | (high << low_len)) as u8)
        } else {
            let value = (current >> self.bit_pos) & ((1 << count) - 1);
            self.bit_pos += count;
            Ok(value as u8)
        }
    }

    /// Number of payload bytes touched so far
    pub fn bytes_consumed(&self) -> u64 {
        let partial = u64::from(self.bit_pos > 0);
        self.loaded_before + self.byte_pos as u64 + partial
    }

    /// Declared chunk length, header included
    pub fn declared_len(&self) -> u32 {
        self.declared
    }

    /// Whether a read has already failed
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Give back the underlying reader
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn check(&self) -> Result<()> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn advance_byte(&mut self) -> Result<()> {
        self.byte_pos += 1;
        self.bit_pos = 0;

        if self.byte_pos >= self.filled {
            if self.remaining == 0 {
                return Err(self.fail(DecodeError::UnexpectedEndOfChunk {
                    declared: self.declared,
                }));
            }
            self.fill_buffer()?;
        }

        Ok(())
    }

    fn fill_buffer(&mut self) -> Result<()> {
        let block = self.buffer.len().min(self.remaining as usize);

        if let Err(err) = self.reader.read_exact(&mut self.buffer[..block]) {
            let err = match err.kind() {
                io::ErrorKind::UnexpectedEof => DecodeError::UnexpectedEndOfChunk {
                    declared: self.declared,
                },
                _ => DecodeError::from(err),
            };
            return Err(self.fail(err));
        }

        self.loaded_before += self.filled as u64;
        self.filled = block;
        self.byte_pos = 0;
        self.remaining -= block as u32;

        trace!(
            "loaded {} payload bytes, {} left in chunk",
            block,
            self.remaining
        );
        Ok(())
    }

    fn fail(&mut self, err: DecodeError) -> DecodeError {
        self.failure = Some(err.clone());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn cursor(bytes: &[u8], buffer_size: usize) -> BitCursor<Cursor<Vec<u8>>> {
        BitCursor::new(
            Cursor::new(bytes.to_vec()),
            bytes.len() as u32,
            buffer_size,
        )
        .unwrap()
    }

    #[test]
    fn test_bits_are_lsb_first() {
        let mut bits = cursor(&[0b0000_0101], 16);
        assert_eq!(bits.read_bit().unwrap(), 1);
        assert_eq!(bits.read_bit().unwrap(), 0);
        assert_eq!(bits.read_bit().unwrap(), 1);
        assert_eq!(bits.read_bits(5).unwrap(), 0);
    }

    #[test]
    fn test_read_bits_within_byte() {
        let mut bits = cursor(&[0b1011_0110], 16);
        assert_eq!(bits.read_bits(2).unwrap(), 0b10);
        assert_eq!(bits.read_bits(3).unwrap(), 0b101);
        assert_eq!(bits.read_bits(3).unwrap(), 0b101);
    }

    #[test]
    fn test_read_bits_spans_bytes() {
        let mut bits = cursor(&[0xF0, 0x0F, 0x81], 16);
        assert_eq!(bits.read_bits(4).unwrap(), 0x0);
        assert_eq!(bits.read_bits(8).unwrap(), 0xFF);
        assert_eq!(bits.read_bits(4).unwrap(), 0x0);
        // Whole byte after a byte boundary
        assert_eq!(bits.read_bits(8).unwrap(), 0x81);
    }

    #[test]
    fn test_literal_byte_at_odd_offset() {
        // Same layout as a literal following a one-bit flag
        let mut bits = cursor(&[0x82, 0x24], 16);
        assert_eq!(bits.read_bit().unwrap(), 0);
        assert_eq!(bits.read_bits(8).unwrap(), b'A');
    }

    #[test]
    fn test_end_of_chunk_is_sticky() {
        let mut bits = cursor(&[0xAA], 16);
        assert_eq!(bits.read_bits(8).unwrap(), 0xAA);

        let err = bits.read_bit().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnexpectedEndOfChunk { declared: 3 }
        ));
        assert!(bits.is_failed());
        assert!(matches!(
            bits.read_bits(1),
            Err(DecodeError::UnexpectedEndOfChunk { .. })
        ));
    }

    #[test]
    fn test_refill_in_small_blocks() {
        let mut bits = cursor(&[0x01, 0x02, 0x03], 1);
        assert_eq!(bits.read_bits(8).unwrap(), 0x01);
        assert_eq!(bits.read_bits(4).unwrap(), 0x02);
        assert_eq!(bits.read_bits(8).unwrap(), 0x30);
        assert_eq!(bits.bytes_consumed(), 3);
        assert!(bits.read_bits(5).is_err());
    }

    #[test]
    fn test_never_reads_past_declared_length() {
        let source = Cursor::new(vec![0x11, 0x22, 0x33, 0x44]);
        let mut bits = BitCursor::new(source, 2, 16).unwrap();
        assert_eq!(bits.read_bits(8).unwrap(), 0x11);
        assert_eq!(bits.read_bits(8).unwrap(), 0x22);
        assert!(bits.read_bit().is_err());

        let source = bits.into_inner();
        assert_eq!(source.position(), 2);
    }

    #[test]
    fn test_short_source() {
        // Fails up front when the first block cannot be filled
        let err = BitCursor::new(Cursor::new(vec![1u8, 2]), 4, 16).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnexpectedEndOfChunk { declared: 6 }
        ));

        // Fails at the refill otherwise
        let mut bits = BitCursor::new(Cursor::new(vec![1u8, 2]), 4, 1).unwrap();
        assert_eq!(bits.read_bits(8).unwrap(), 1);
        assert_eq!(bits.read_bits(8).unwrap(), 2);
        assert!(matches!(
            bits.read_bit(),
            Err(DecodeError::UnexpectedEndOfChunk { .. })
        ));
    }

    #[test]
    fn test_empty_payload() {
        let err = BitCursor::new(Cursor::new(Vec::new()), 0, 16).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedEndOfChunk { .. }));
    }
}

//! Copy length and copy offset decoding
//!
//! Both codes are fixed prefix codes walked bit by bit from the cursor. Bit
//! groups are read least-significant first, so a group read as `0b01` was
//! stored as `1` then `0`.

use super::cursor::BitCursor;
use crate::tables::{REVERSE_3, REVERSE_4};
use crate::Result;
use std::io::Read;

/// Decode a copy length.
///
/// Returns 2..=518 for a real copy. 519 marks the end of the stream and is
/// returned as-is for the caller to act on.
pub fn decode_copy_length<R: Read>(bits: &mut BitCursor<R>) -> Result<u16> {
    let length = match bits.read_bits(2)? {
        // 11
        0b11 => 3,
        // 10x
        0b01 => 4 - 2 * u16::from(bits.read_bit()?),
        // 011, 010x
        0b10 => {
            if bits.read_bit()? == 1 {
                5
            } else {
                7 - u16::from(bits.read_bit()?)
            }
        }
        // 00
        _ => match bits.read_bits(2)? {
            0b11 => 8,
            0b01 => {
                if bits.read_bit()? == 1 {
                    9
                } else {
                    10 + u16::from(bits.read_bit()?)
                }
            }
            0b10 => {
                if bits.read_bit()? == 1 {
                    12 + u16::from(bits.read_bits(2)?)
                } else {
                    16 + u16::from(bits.read_bits(3)?)
                }
            }
            // 0000
            _ => match bits.read_bits(2)? {
                0b11 => 24 + u16::from(bits.read_bits(4)?),
                0b01 => 40 + u16::from(bits.read_bits(5)?),
                0b10 => 72 + u16::from(bits.read_bits(6)?),
                _ => {
                    if bits.read_bit()? == 1 {
                        136 + u16::from(bits.read_bits(7)?)
                    } else {
                        264 + u16::from(bits.read_bits(8)?)
                    }
                }
            },
        },
    };

    Ok(length)
}

/// Decode the high part of a copy offset (0..=63)
pub fn decode_copy_offset_high<R: Read>(bits: &mut BitCursor<R>) -> Result<u16> {
    let high = match bits.read_bits(2)? {
        0b11 => 0,
        0b01 => match bits.read_bits(2)? {
            0b00 => 0x6 - u16::from(bits.read_bit()?),
            0b01 => 0x2,
            0b10 => 0x4 - u16::from(bits.read_bit()?),
            _ => 0x1,
        },
        0b10 => {
            let suffix = bits.read_bits(4)?;
            if suffix == 0 {
                0x17 - u16::from(bits.read_bit()?)
            } else {
                0x16 - u16::from(REVERSE_4[usize::from(suffix)])
            }
        }
        _ => match bits.read_bits(2)? {
            0b11 => 0x1f - u16::from(REVERSE_3[usize::from(bits.read_bits(3)?)]),
            0b01 => 0x27 - u16::from(REVERSE_3[usize::from(bits.read_bits(3)?)]),
            0b10 => 0x2f - u16::from(REVERSE_3[usize::from(bits.read_bits(3)?)]),
            _ => 0x3f - u16::from(REVERSE_4[usize::from(bits.read_bits(4)?)]),
        },
    };

    Ok(high)
}

/// Decode a full copy offset for a copy of `length` bytes.
///
/// Two-byte copies carry 2 raw low bits; longer copies carry `dict_bits`.
/// An offset of 0 addresses the most recently emitted byte.
pub fn decode_copy_offset<R: Read>(
    bits: &mut BitCursor<R>,
    length: u16,
    dict_bits: u8,
) -> Result<u16> {
    let low_bits = if length == 2 { 2 } else { dict_bits };

    let high = decode_copy_offset_high(bits)?;
    let low = u16::from(bits.read_bits(low_bits)?);
    Ok((high << low_bits) | low)
}

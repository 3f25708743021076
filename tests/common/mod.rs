//! Test helpers: hand-assembled chunks
//!
//! `ChunkBuilder` writes literal and copy codes exactly as listed; it does no
//! match finding of its own.

#![allow(dead_code)]

/// Packs bit groups least-significant bit first
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    acc: u32,
    filled: u8,
}

impl BitWriter {
    pub fn write_bits(&mut self, value: u16, width: u8) {
        assert!(width <= 8);
        assert!(u32::from(value) < (1 << width) || width == 0 && value == 0);
        self.acc |= u32::from(value) << self.filled;
        self.filled += width;
        while self.filled >= 8 {
            self.bytes.push(self.acc as u8);
            self.acc >>= 8;
            self.filled -= 8;
        }
    }

    /// Flush the partial byte, zero padded
    pub fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.bytes.push(self.acc as u8);
        }
        self.bytes
    }
}

/// Bit reversal of a `width`-bit value
pub fn reverse(value: u16, width: u8) -> u16 {
    (0..width).fold(0, |acc, bit| acc | (((value >> bit) & 1) << (width - 1 - bit)))
}

/// Assembles a chunk from a list of literals and copies
#[derive(Debug)]
pub struct ChunkBuilder {
    dict_bits: u8,
    bits: BitWriter,
}

impl ChunkBuilder {
    /// `dict_bits` is the header size code: 4, 5 or 6
    pub fn new(dict_bits: u8) -> Self {
        Self {
            dict_bits,
            bits: BitWriter::default(),
        }
    }

    pub fn literal(mut self, byte: u8) -> Self {
        self.bits.write_bits(0, 1);
        self.bits.write_bits(u16::from(byte), 8);
        self
    }

    pub fn literals(self, bytes: &[u8]) -> Self {
        bytes.iter().fold(self, |builder, &byte| builder.literal(byte))
    }

    /// `offset` 0 replays the most recent byte
    pub fn copy(mut self, length: u16, offset: u16) -> Self {
        assert!((2..=518).contains(&length));
        self.bits.write_bits(1, 1);
        write_length(&mut self.bits, length);
        write_offset(&mut self.bits, length, offset, self.dict_bits);
        self
    }

    /// Append the end-of-stream marker and return the chunk
    pub fn end(mut self) -> Vec<u8> {
        self.bits.write_bits(1, 1);
        write_length(&mut self.bits, 519);
        self.finish_without_end()
    }

    /// Return the chunk with no end-of-stream marker
    pub fn finish_without_end(self) -> Vec<u8> {
        let mut chunk = vec![0, self.dict_bits];
        chunk.extend(self.bits.finish());
        chunk
    }
}

fn write_length(bits: &mut BitWriter, length: u16) {
    let mut w = |value: u16, width: u8| bits.write_bits(value, width);
    match length {
        2 => {
            w(0b01, 2);
            w(1, 1);
        }
        3 => w(0b11, 2),
        4 => {
            w(0b01, 2);
            w(0, 1);
        }
        5 => {
            w(0b10, 2);
            w(1, 1);
        }
        6 | 7 => {
            w(0b10, 2);
            w(0, 1);
            w(7 - length, 1);
        }
        8 => {
            w(0, 2);
            w(0b11, 2);
        }
        9 => {
            w(0, 2);
            w(0b01, 2);
            w(1, 1);
        }
        10 | 11 => {
            w(0, 2);
            w(0b01, 2);
            w(0, 1);
            w(length - 10, 1);
        }
        12..=15 => {
            w(0, 2);
            w(0b10, 2);
            w(1, 1);
            w(length - 12, 2);
        }
        16..=23 => {
            w(0, 2);
            w(0b10, 2);
            w(0, 1);
            w(length - 16, 3);
        }
        24..=39 => {
            w(0, 2);
            w(0, 2);
            w(0b11, 2);
            w(length - 24, 4);
        }
        40..=71 => {
            w(0, 2);
            w(0, 2);
            w(0b01, 2);
            w(length - 40, 5);
        }
        72..=135 => {
            w(0, 2);
            w(0, 2);
            w(0b10, 2);
            w(length - 72, 6);
        }
        136..=263 => {
            w(0, 2);
            w(0, 2);
            w(0, 2);
            w(1, 1);
            w(length - 136, 7);
        }
        264..=519 => {
            w(0, 2);
            w(0, 2);
            w(0, 2);
            w(0, 1);
            w(length - 264, 8);
        }
        _ => panic!("length {length} has no code"),
    }
}

fn write_offset(bits: &mut BitWriter, length: u16, offset: u16, dict_bits: u8) {
    let low_bits = if length == 2 { 2 } else { dict_bits };
    let high = offset >> low_bits;
    assert!(high < 64, "offset {offset} too far for a {length} byte copy");

    {
        let mut w = |value: u16, width: u8| bits.write_bits(value, width);
        match high {
            0 => w(0b11, 2),
            1 => {
                w(0b01, 2);
                w(0b11, 2);
            }
            2 => {
                w(0b01, 2);
                w(0b01, 2);
            }
            3 | 4 => {
                w(0b01, 2);
                w(0b10, 2);
                w(4 - high, 1);
            }
            5 | 6 => {
                w(0b01, 2);
                w(0b00, 2);
                w(6 - high, 1);
            }
            7..=21 => {
                w(0b10, 2);
                w(reverse(0x16 - high, 4), 4);
            }
            22 | 23 => {
                w(0b10, 2);
                w(0, 4);
                w(0x17 - high, 1);
            }
            24..=31 => {
                w(0, 2);
                w(0b11, 2);
                w(reverse(0x1f - high, 3), 3);
            }
            32..=39 => {
                w(0, 2);
                w(0b01, 2);
                w(reverse(0x27 - high, 3), 3);
            }
            40..=47 => {
                w(0, 2);
                w(0b10, 2);
                w(reverse(0x2f - high, 3), 3);
            }
            _ => {
                w(0, 2);
                w(0b00, 2);
                w(reverse(0x3f - high, 4), 4);
            }
        }
    }

    bits.write_bits(offset & ((1 << low_bits) - 1), low_bits);
}

/// Replays `ops` the straightforward way; `offset` 0 is the newest byte
pub fn reference_output(ops: &[Op]) -> Vec<u8> {
    let mut out = Vec::new();
    for op in ops {
        match *op {
            Op::Literal(byte) => out.push(byte),
            Op::Copy { length, offset } => {
                for _ in 0..length {
                    let byte = out[out.len() - 1 - usize::from(offset)];
                    out.push(byte);
                }
            }
        }
    }
    out
}

/// One code in a hand-assembled chunk
#[derive(Debug, Clone, Copy)]
pub enum Op {
    Literal(u8),
    Copy { length: u16, offset: u16 },
}

/// Assemble `ops` into a terminated chunk
pub fn build_chunk(dict_bits: u8, ops: &[Op]) -> Vec<u8> {
    ops.iter()
        .fold(ChunkBuilder::new(dict_bits), |builder, op| match *op {
            Op::Literal(byte) => builder.literal(byte),
            Op::Copy { length, offset } => builder.copy(length, offset),
        })
        .end()
}

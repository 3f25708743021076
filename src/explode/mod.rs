//! PKWare DCL explode (decompression) for save-file chunks
//!
//! A chunk is a 2-byte header followed by a bitstream of literals and
//! dictionary copies. Decoding stops at the end-of-stream copy length (519);
//! reading past the declared chunk length is an error.

mod cursor;
mod decoder;
mod dictionary;
mod reader;
mod state;

pub use cursor::BitCursor;
pub use decoder::{decode_copy_length, decode_copy_offset, decode_copy_offset_high};
pub use dictionary::SlidingDictionary;
pub use reader::ExplodeReader;
pub use state::{DecodeMode, DecoderState};

use crate::common::DEFAULT_BUFFER_SIZE;
use crate::Result;
use std::io::Read;

/// Tuning for how compressed input is pulled from the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplodeOptions {
    /// Bytes read from the source per refill
    pub buffer_size: usize,
}

impl Default for ExplodeOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ExplodeOptions {
    /// Smaller refills for sources where each read is cheap
    pub fn small() -> Self {
        Self { buffer_size: 512 }
    }

    /// Larger refills for slow or unbuffered sources
    pub fn large() -> Self {
        Self {
            buffer_size: 64 * 1024,
        }
    }

    /// Set the refill size; 0 is treated as 1
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }
}

/// Decompress a whole chunk held in memory
pub fn explode_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let declared = u32::try_from(data.len()).unwrap_or(u32::MAX);
    explode_chunk(data, declared)
}

/// Decompress one chunk of `declared_len` bytes from `reader`
pub fn explode_chunk<R: Read>(reader: R, declared_len: u32) -> Result<Vec<u8>> {
    ExplodeReader::new(reader, declared_len)?.decode_to_end()
}

//! Common types and constants for the explode decoder and the save reader
//!
//! This module defines the chunk header, dictionary sizes, the error type and
//! the statistics record shared by the decoder and the save-file container.

use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Dictionary size declared in a chunk header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionarySize {
    /// 1024 bytes (1KB) dictionary
    Size1K = 1024,
    /// 2048 bytes (2KB) dictionary
    Size2K = 2048,
    /// 4096 bytes (4KB) dictionary
    Size4K = 4096,
}

impl DictionarySize {
    /// Number of raw low bits used for copy offsets (4, 5 or 6)
    pub fn bits(&self) -> u8 {
        match self {
            DictionarySize::Size1K => 4,
            DictionarySize::Size2K => 5,
            DictionarySize::Size4K => 6,
        }
    }

    /// Capacity of the sliding dictionary in bytes
    pub fn capacity(&self) -> usize {
        *self as usize
    }

    /// Create a DictionarySize from the header's size code
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            4 => Ok(DictionarySize::Size1K),
            5 => Ok(DictionarySize::Size2K),
            6 => Ok(DictionarySize::Size4K),
            _ => Err(DecodeError::UnknownDictionarySize(bits)),
        }
    }
}

/// The two header bytes at the start of every compressed chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Dictionary mode byte; only 0 (no static dictionary) is supported
    pub dictionary_mode: u8,
    /// Dictionary size resolved from the size code
    pub dict_size: DictionarySize,
}

impl ChunkHeader {
    /// Validate the raw header bytes
    pub fn parse(bytes: [u8; HEADER_SIZE]) -> Result<Self> {
        if bytes[0] != 0 {
            return Err(DecodeError::UnsupportedStaticDictionary(bytes[0]));
        }

        Ok(Self {
            dictionary_mode: bytes[0],
            dict_size: DictionarySize::from_bits(bytes[1])?,
        })
    }
}

/// Error type for decoding and save-file operations
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// Header requests a static (pretrained) dictionary
    #[error("Static dictionary not supported (mode byte {0})")]
    UnsupportedStaticDictionary(u8),

    /// Header carries an unknown dictionary size code
    #[error("Unknown dictionary size code: {0} (expected 4, 5, or 6)")]
    UnknownDictionarySize(u8),

    /// Declared chunk length cannot even hold the header
    #[error("Chunk too small: {0} bytes declared")]
    ChunkTooSmall(u32),

    /// The bitstream ran past the declared chunk length
    #[error("Unexpected end of chunk ({declared} bytes declared)")]
    UnexpectedEndOfChunk {
        /// Declared chunk length, header included
        declared: u32,
    },

    /// Length prefix in front of a chunk is negative
    #[error("Negative chunk length: {0}")]
    NegativeChunkLength(i32),

    /// Decoded terrain chunk ended before the grid was filled
    #[error("Terrain chunk truncated: expected {expected} bytes, got {actual}")]
    TruncatedTerrain {
        /// Bytes required for the grid
        expected: usize,
        /// Bytes the chunk actually produced
        actual: usize,
    },

    /// Grid side length whose cell count does not fit in memory
    #[error("Terrain grid too large: {0}x{0}")]
    GridTooLarge(usize),

    /// I/O error from the underlying byte source
    #[error("I/O error: {0}")]
    Io(Arc<io::Error>),
}

impl DecodeError {
    /// Whether the error rejects the chunk header or its declared length
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            DecodeError::UnsupportedStaticDictionary(_)
                | DecodeError::UnknownDictionarySize(_)
                | DecodeError::ChunkTooSmall(_)
        )
    }
}

impl From<io::Error> for DecodeError {
    fn from(err: io::Error) -> Self {
        DecodeError::Io(Arc::new(err))
    }
}

impl From<DecodeError> for io::Error {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Io(inner) => io::Error::new(inner.kind(), DecodeError::Io(inner)),
            DecodeError::UnexpectedEndOfChunk { .. } | DecodeError::TruncatedTerrain { .. } => {
                io::Error::new(io::ErrorKind::UnexpectedEof, err)
            }
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

/// Result type alias for decoding operations
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Size of the chunk header in bytes
pub const HEADER_SIZE: usize = 2;

/// Default block size used to buffer the compressed input
pub const DEFAULT_BUFFER_SIZE: usize = 0x1000;

/// Decoded copy length reserved as the end-of-stream marker
pub const END_OF_STREAM_LENGTH: u16 = 519;

/// Longest real copy a chunk can encode
pub const MAX_COPY_LENGTH: u16 = END_OF_STREAM_LENGTH - 1;

/// Statistics gathered while decoding a chunk
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExplodeStats {
    /// Number of literal bytes decoded
    pub literal_count: usize,
    /// Number of dictionary copies decoded
    pub copy_count: usize,
    /// Total bytes emitted so far
    pub bytes_emitted: usize,
    /// Longest copy seen
    pub longest_copy: usize,
}

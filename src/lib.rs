//! c3save - terrain extraction for Caesar III save files
//!
//! Save files store their map grids as chunks compressed with the PKWare Data
//! Compression Library "implode" format. This crate provides a pure Rust
//! decoder for those chunks and a small reader that pulls the terrain grid
//! out of a save.
//!
//! # Features
//!
//! - Pull-based explode decoder: one byte per pull, `Iterator` and `Read`
//! - 1KB, 2KB and 4KB dictionaries
//! - Strict bounds: never reads past a chunk's declared length
//! - Sticky errors: a failed decoder keeps reporting the same error
//! - Terrain grid decoding and text rendering
//! - Optional async front-end (`async` feature)
//!
//! # Example - Decompression
//!
//! ```
//! use c3save::explode_bytes;
//!
//! let chunk = [0x00, 0x04, 0x82, 0x24, 0x25, 0x8f, 0x80, 0x7f];
//! assert_eq!(explode_bytes(&chunk)?, b"AIAIAIAIAIAIA");
//! # Ok::<(), c3save::DecodeError>(())
//! ```
//!
//! # Example - Terrain
//!
//! ```no_run
//! use c3save::SaveReader;
//!
//! let mut save = SaveReader::open("rome.sav")?;
//! let terrain = save.read_terrain()?;
//! print!("{terrain}");
//! # Ok::<(), c3save::DecodeError>(())
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

// Public modules
pub mod common;
pub mod error;
pub mod explode;
pub mod save;
pub mod tables;

// Async modules (only available with async feature)
#[cfg(feature = "async")]
pub mod async_batch;
#[cfg(feature = "async")]
pub mod async_explode;

// Re-export commonly used types
pub use common::{
    ChunkHeader, DecodeError, DictionarySize, ExplodeStats, Result, END_OF_STREAM_LENGTH,
    MAX_COPY_LENGTH,
};
pub use explode::{ExplodeOptions, ExplodeReader};
pub use save::{SaveLayout, SaveReader, TerrainFlags, TerrainGrid};

// Re-export async types when async feature is enabled
#[cfg(feature = "async")]
pub use async_batch::AsyncBatchProcessor;
#[cfg(feature = "async")]
pub use async_explode::{
    explode_chunk_async, read_compressed_chunk_async, skip_compressed_chunk_async,
};

// Convenience functions

/// Decompress a whole chunk held in memory
///
/// # Arguments
/// * `data` - The chunk, header included
///
/// # Returns
/// The decoded bytes up to the end-of-stream marker
pub fn explode_bytes(data: &[u8]) -> Result<Vec<u8>> {
    explode::explode_bytes(data)
}

/// Decompress one chunk from a byte source
///
/// # Arguments
/// * `reader` - Source positioned at the chunk header
/// * `declared_len` - Chunk length, header included
///
/// # Returns
/// The decoded bytes up to the end-of-stream marker
pub fn explode_chunk<R: std::io::Read>(reader: R, declared_len: u32) -> Result<Vec<u8>> {
    explode::explode_chunk(reader, declared_len)
}

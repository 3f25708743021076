//! Async chunk reading
//!
//! The compressed payload of a chunk is pulled through tokio, then decoded
//! in memory. Decoding itself stays synchronous.

#[cfg(feature = "async")]
/// Chunk reading and skipping over tokio sources
pub mod reader {
    use crate::common::HEADER_SIZE;
    use crate::explode::explode_bytes;
    use crate::{ChunkHeader, DecodeError, Result};
    use bytes::Bytes;
    use log::debug;
    use std::io::{self, SeekFrom};
    use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

    /// Read a chunk of `declared_len` bytes and decode it.
    ///
    /// The header is validated before the payload is read, and the payload
    /// buffer only grows as bytes arrive.
    pub async fn explode_chunk_async<R: AsyncRead + Unpin>(
        reader: &mut R,
        declared_len: u32,
    ) -> Result<Bytes> {
        if declared_len <= HEADER_SIZE as u32 {
            return Err(DecodeError::ChunkTooSmall(declared_len));
        }

        let mut header = [0u8; HEADER_SIZE];
        reader
            .read_exact(&mut header)
            .await
            .map_err(|err| match err.kind() {
                io::ErrorKind::UnexpectedEof => DecodeError::UnexpectedEndOfChunk {
                    declared: declared_len,
                },
                _ => DecodeError::from(err),
            })?;
        ChunkHeader::parse(header)?;

        let payload_len = u64::from(declared_len) - HEADER_SIZE as u64;
        let mut chunk = header.to_vec();
        let read = (&mut *reader).take(payload_len).read_to_end(&mut chunk).await?;
        if (read as u64) < payload_len {
            return Err(DecodeError::UnexpectedEndOfChunk {
                declared: declared_len,
            });
        }

        let output = explode_bytes(&chunk)?;
        debug!(
            "async chunk decoded: {} -> {} bytes",
            declared_len,
            output.len()
        );
        Ok(Bytes::from(output))
    }

    /// Read a length-prefixed chunk and decode it
    pub async fn read_compressed_chunk_async<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Bytes> {
        let length = reader.read_i32_le().await?;
        let length = u32::try_from(length).map_err(|_| DecodeError::NegativeChunkLength(length))?;
        explode_chunk_async(reader, length).await
    }

    /// Seek past a length-prefixed chunk; returns its length
    pub async fn skip_compressed_chunk_async<R: AsyncRead + AsyncSeek + Unpin>(
        reader: &mut R,
    ) -> Result<u32> {
        let length = reader.read_i32_le().await?;
        let length = u32::try_from(length).map_err(|_| DecodeError::NegativeChunkLength(length))?;
        reader.seek(SeekFrom::Current(i64::from(length))).await?;
        Ok(length)
    }
}

#[cfg(feature = "async")]
pub use reader::{explode_chunk_async, read_compressed_chunk_async, skip_compressed_chunk_async};

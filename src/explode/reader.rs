//! ExplodeReader - pull-based decoder for one compressed chunk
//!
//! Each pull yields exactly one decoded byte, reports the end of the stream,
//! or fails. The reader also implements `Iterator` and `std::io::Read` on top
//! of the same pull.

use super::cursor::BitCursor;
use super::decoder::{decode_copy_length, decode_copy_offset};
use super::dictionary::SlidingDictionary;
use super::state::{DecodeMode, DecoderState};
use super::ExplodeOptions;
use crate::common::{ChunkHeader, END_OF_STREAM_LENGTH, HEADER_SIZE};
use crate::{DecodeError, ExplodeStats, Result};
use log::{debug, warn};
use std::io::{self, Read};

/// Streaming decompressor over a single chunk
#[derive(Debug)]
pub struct ExplodeReader<R: Read> {
    bits: BitCursor<R>,
    dictionary: SlidingDictionary,
    header: ChunkHeader,
    state: DecoderState,
    stats: ExplodeStats,
}

impl<R: Read> ExplodeReader<R> {
    /// Start decoding a chunk of `declared_len` bytes (header included)
    pub fn new(reader: R, declared_len: u32) -> Result<Self> {
        Self::with_options(reader, declared_len, ExplodeOptions::default())
    }

    /// Start decoding with explicit options
    pub fn with_options(mut reader: R, declared_len: u32, options: ExplodeOptions) -> Result<Self> {
        if declared_len <= HEADER_SIZE as u32 {
            return Err(DecodeError::ChunkTooSmall(declared_len));
        }

        let mut raw = [0u8; HEADER_SIZE];
        reader.read_exact(&mut raw).map_err(|err| match err.kind() {
            io::ErrorKind::UnexpectedEof => DecodeError::UnexpectedEndOfChunk {
                declared: declared_len,
            },
            _ => DecodeError::from(err),
        })?;
        let header = ChunkHeader::parse(raw)?;

        debug!(
            "chunk header accepted: {} byte dictionary, {} bytes declared",
            header.dict_size.capacity(),
            declared_len
        );

        let bits = BitCursor::new(
            reader,
            declared_len - HEADER_SIZE as u32,
            options.buffer_size,
        )?;

        Ok(Self {
            bits,
            dictionary: SlidingDictionary::new(header.dict_size),
            header,
            state: DecoderState::default(),
            stats: ExplodeStats::default(),
        })
    }

    /// Produce the next decoded byte.
    ///
    /// Returns `Ok(None)` once the end-of-stream marker has been read. After
    /// an error every call returns that same error.
    pub fn next_byte(&mut self) -> Result<Option<u8>> {
        match &self.state {
            DecoderState::Finished => return Ok(None),
            DecoderState::Failed(err) => return Err(err.clone()),
            DecoderState::Decoding(_) => {}
        }

        match self.step() {
            Ok(Some(byte)) => {
                self.stats.bytes_emitted += 1;
                Ok(Some(byte))
            }
            Ok(None) => {
                debug!(
                    "end of stream after {} bytes ({} literals, {} copies)",
                    self.stats.bytes_emitted, self.stats.literal_count, self.stats.copy_count
                );
                self.state = DecoderState::Finished;
                Ok(None)
            }
            Err(err) => {
                warn!(
                    "chunk decode failed after {} bytes: {}",
                    self.stats.bytes_emitted, err
                );
                self.state = DecoderState::Failed(err.clone());
                Err(err)
            }
        }
    }

    fn step(&mut self) -> Result<Option<u8>> {
        if let DecoderState::Decoding(DecodeMode::Copying { remaining, offset }) = self.state {
            let byte = self.dictionary.get(usize::from(offset));
            self.state = DecoderState::Decoding(if remaining > 1 {
                DecodeMode::Copying {
                    remaining: remaining - 1,
                    offset,
                }
            } else {
                DecodeMode::Literal
            });
            return Ok(Some(byte));
        }

        if self.bits.read_bit()? == 0 {
            let byte = self.bits.read_bits(8)?;
            self.dictionary.put(byte);
            self.stats.literal_count += 1;
            return Ok(Some(byte));
        }

        let length = decode_copy_length(&mut self.bits)?;
        if length >= END_OF_STREAM_LENGTH {
            return Ok(None);
        }

        let offset = decode_copy_offset(&mut self.bits, length, self.header.dict_size.bits())?;
        self.stats.copy_count += 1;
        self.stats.longest_copy = self.stats.longest_copy.max(usize::from(length));

        // Lengths are at least 2, so there is always a remainder to replay
        self.state = DecoderState::Decoding(DecodeMode::Copying {
            remaining: length - 1,
            offset,
        });
        Ok(Some(self.dictionary.get(usize::from(offset))))
    }

    /// Decode everything up to the end-of-stream marker
    pub fn decode_to_end(&mut self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        while let Some(byte) = self.next_byte()? {
            output.push(byte);
        }
        Ok(output)
    }

    /// The accepted chunk header
    pub fn header(&self) -> &ChunkHeader {
        &self.header
    }

    /// Counters gathered so far
    pub fn stats(&self) -> &ExplodeStats {
        &self.stats
    }

    /// Current state of the decoder
    pub fn state(&self) -> &DecoderState {
        &self.state
    }

    /// Whether the end-of-stream marker has been reached
    pub fn is_finished(&self) -> bool {
        matches!(self.state, DecoderState::Finished)
    }

    /// Compressed payload bytes consumed so far, header excluded
    pub fn compressed_bytes_consumed(&self) -> u64 {
        self.bits.bytes_consumed()
    }

    /// Give back the underlying reader, positioned after the last block loaded
    pub fn into_inner(self) -> R {
        self.bits.into_inner()
    }
}

impl<R: Read> Iterator for ExplodeReader<R> {
    type Item = Result<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_byte().transpose()
    }
}

impl<R: Read> Read for ExplodeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut written = 0;
        while written < buf.len() {
            match self.next_byte() {
                Ok(Some(byte)) => {
                    buf[written] = byte;
                    written += 1;
                }
                Ok(None) => break,
                Err(err) if written == 0 => return Err(err.into()),
                // Reported by the next call; the error is sticky
                Err(_) => break,
            }
        }
        Ok(written)
    }
}

//! Length-prefixed compressed chunks inside a save file
//!
//! Every chunk is preceded by its compressed length as a little-endian
//! signed 32-bit integer.

use crate::explode::{ExplodeOptions, ExplodeReader};
use crate::{DecodeError, Result};
use log::debug;
use std::io::{Read, Seek, SeekFrom};

/// Read the length prefix of the next chunk
pub fn read_chunk_length<R: Read>(reader: &mut R) -> Result<u32> {
    let mut raw = [0u8; 4];
    reader.read_exact(&mut raw)?;

    let length = i32::from_le_bytes(raw);
    u32::try_from(length).map_err(|_| DecodeError::NegativeChunkLength(length))
}

/// Seek past the next chunk without decoding it; returns its length
pub fn skip_compressed_chunk<R: Read + Seek>(reader: &mut R) -> Result<u32> {
    let length = read_chunk_length(reader)?;
    reader.seek(SeekFrom::Current(i64::from(length)))?;

    debug!("skipped compressed chunk of {} bytes", length);
    Ok(length)
}

/// Decode the next chunk through `read`.
///
/// The source is only borrowed for the duration of `read`. It is left
/// wherever the decoder stopped pulling input, which may be short of the end
/// of the chunk if `read` did not drain it.
pub fn read_compressed_chunk<R, T, F>(reader: &mut R, options: ExplodeOptions, read: F) -> Result<T>
where
    R: Read,
    F: FnOnce(&mut ExplodeReader<&mut R>) -> Result<T>,
{
    let length = read_chunk_length(reader)?;
    let mut chunk = ExplodeReader::with_options(&mut *reader, length, options)?;
    read(&mut chunk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const AIAI: [u8; 8] = [0x00, 0x04, 0x82, 0x24, 0x25, 0x8f, 0x80, 0x7f];

    fn framed(chunk: &[u8]) -> Vec<u8> {
        let mut out = (chunk.len() as i32).to_le_bytes().to_vec();
        out.extend_from_slice(chunk);
        out
    }

    #[test]
    fn test_read_chunk_length() {
        let mut source = Cursor::new(vec![0x10, 0x00, 0x00, 0x00]);
        assert_eq!(read_chunk_length(&mut source).unwrap(), 16);

        let mut source = Cursor::new((-5i32).to_le_bytes().to_vec());
        assert!(matches!(
            read_chunk_length(&mut source),
            Err(DecodeError::NegativeChunkLength(-5))
        ));

        let mut source = Cursor::new(vec![0x10, 0x00]);
        assert!(matches!(
            read_chunk_length(&mut source),
            Err(DecodeError::Io(_))
        ));
    }

    #[test]
    fn test_skip_then_read() {
        let mut data = framed(&[0xAB; 20]);
        data.extend(framed(&AIAI));
        let mut source = Cursor::new(data);

        assert_eq!(skip_compressed_chunk(&mut source).unwrap(), 20);
        assert_eq!(source.position(), 24);

        let output =
            read_compressed_chunk(&mut source, ExplodeOptions::default(), |chunk| {
                chunk.decode_to_end()
            })
            .unwrap();
        assert_eq!(output, b"AIAIAIAIAIAIA");
        assert_eq!(source.position(), 36);
    }

    #[test]
    fn test_read_rejects_bad_header() {
        let mut source = Cursor::new(framed(&[0x01, 0x04, 0x00]));
        let result = read_compressed_chunk(&mut source, ExplodeOptions::default(), |chunk| {
            chunk.decode_to_end()
        });
        assert!(matches!(
            result,
            Err(DecodeError::UnsupportedStaticDictionary(1))
        ));
    }
}

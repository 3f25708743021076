//! Decoder state machine
//!
//! A decoder is created once its header has been accepted, then moves from
//! `Decoding` to either `Finished` or `Failed`. Both are terminal.

use crate::DecodeError;

/// What the next pull does while decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// Read a flag bit and decode a literal or the start of a copy
    Literal,
    /// Replay history from an in-progress copy
    Copying {
        /// Bytes of the copy still to emit
        remaining: u16,
        /// Distance back into the dictionary, 0 being the newest byte
        offset: u16,
    },
}

/// Lifecycle of an [`ExplodeReader`](super::ExplodeReader)
#[derive(Debug, Clone)]
pub enum DecoderState {
    /// Producing bytes
    Decoding(DecodeMode),
    /// End-of-stream marker reached
    Finished,
    /// A pull failed; every later pull reports the same error
    Failed(DecodeError),
}

impl DecoderState {
    /// Whether no further bytes can be produced
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DecoderState::Decoding(_))
    }
}

impl Default for DecoderState {
    fn default() -> Self {
        DecoderState::Decoding(DecodeMode::Literal)
    }
}

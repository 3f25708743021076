//! Error handling for decoding and save-file operations
//!
//! The error type lives in [`crate::common`]; this module re-exports it so
//! callers can `use c3save::error::DecodeError` the way they would expect.

pub use crate::common::DecodeError;
pub use crate::common::Result;

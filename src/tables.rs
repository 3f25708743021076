//! Fixed tables used by the copy length and copy offset codes
//!
//! The offset code stores some of its suffix bits in reversed order. The two
//! permutations are spelled out in full rather than computed.

/// Reversal of a 3-bit suffix
pub const REVERSE_3: [u8; 8] = [0, 4, 2, 6, 1, 5, 3, 7];

/// Reversal of a 4-bit suffix
pub const REVERSE_4: [u8; 16] = [0, 8, 4, 12, 2, 10, 6, 14, 1, 9, 5, 13, 3, 11, 7, 15];

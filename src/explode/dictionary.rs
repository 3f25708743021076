//! Sliding dictionary holding the most recently decoded bytes

use crate::DictionarySize;

/// Fixed-size ring of decoded history.
///
/// Reading a byte back also appends it, so a copy may run over bytes it has
/// just produced.
#[derive(Debug, Clone)]
pub struct SlidingDictionary {
    buffer: Box<[u8]>,
    /// Slot of the most recent byte
    first: usize,
}

impl SlidingDictionary {
    /// Create an empty dictionary; unwritten history reads as zero
    pub fn new(size: DictionarySize) -> Self {
        let capacity = size.capacity();
        Self {
            buffer: vec![0; capacity].into_boxed_slice(),
            first: capacity - 1,
        }
    }

    /// Capacity in bytes
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Append a byte as the newest entry
    pub fn put(&mut self, byte: u8) {
        self.first = (self.first + 1) % self.buffer.len();
        self.buffer[self.first] = byte;
    }

    /// Read the byte `offset` positions before the newest one and append it
    pub fn get(&mut self, offset: usize) -> u8 {
        let capacity = self.buffer.len();
        let index = (self.first + capacity - offset % capacity) % capacity;
        let byte = self.buffer[index];
        self.put(byte);
        byte
    }
}

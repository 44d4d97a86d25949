//! Fixed-capacity batch of encoded commands waiting for the socket

use super::protocol::{encode_pixel, MAX_COMMAND_LEN};
use crate::canvas::Rgba;

/// Default capacity in bytes
pub const DEFAULT_CAPACITY: usize = 1024;

/// Append-only byte batch that is compacted as the socket accepts a prefix
///
/// Commands are only appended whole: [`OutputBuffer::has_room`] must hold
/// before [`OutputBuffer::push_pixel`], which guarantees the longest possible
/// command fits.
#[derive(Debug, Clone)]
pub struct OutputBuffer {
    bytes: Vec<u8>,
    capacity: usize,
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl OutputBuffer {
    /// Create a buffer; capacities below one command are raised to fit one
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(MAX_COMMAND_LEN);
        Self {
            bytes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.bytes.len()
    }

    /// Whether the longest possible command still fits
    pub fn has_room(&self) -> bool {
        self.remaining() >= MAX_COMMAND_LEN
    }

    /// Bytes not yet accepted by the socket
    pub fn pending(&self) -> &[u8] {
        &self.bytes
    }

    /// Encode one pixel command; the caller has checked [`OutputBuffer::has_room`]
    pub fn push_pixel(&mut self, x: u32, y: u32, color: Rgba) -> usize {
        debug_assert!(self.has_room());
        encode_pixel(&mut self.bytes, x, y, color)
    }

    /// Drop the first `n` bytes after the socket accepted them
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.bytes.len());
        self.bytes.drain(..n);
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_for_commands() {
        let mut buf = OutputBuffer::with_capacity(2 * MAX_COMMAND_LEN);
        assert!(buf.has_room());
        buf.push_pixel(u32::MAX, u32::MAX, Rgba::WHITE);
        assert!(buf.has_room());
        buf.push_pixel(u32::MAX, u32::MAX, Rgba::WHITE);
        assert!(!buf.has_room());
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn test_consume_compacts_prefix() {
        let mut buf = OutputBuffer::default();
        buf.push_pixel(1, 2, Rgba::RED);
        buf.push_pixel(3, 4, Rgba::BLUE);
        buf.consume(5);
        assert_eq!(buf.pending(), b"2 ff0000ff\nPX 3 4 0000ffff\n");
        buf.consume(1000);
        assert!(buf.is_empty());
        assert_eq!(buf.remaining(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_tiny_capacity_still_fits_one_command() {
        let buf = OutputBuffer::with_capacity(1);
        assert_eq!(buf.capacity(), MAX_COMMAND_LEN);
        assert!(buf.has_room());
    }
}

//! Sliding tag window.
//!
//! Collects candidate tag bytes and, when a full candidate is rejected, slides
//! forward by exactly one byte so that a tag overlapping the rejected window is
//! still found.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TagWindow {
    buf: Vec<u8>,
    collected: usize,
}

impl TagWindow {
    pub(crate) fn new(tag_len: usize) -> Self {
        Self {
            buf: vec![0; tag_len],
            collected: 0,
        }
    }

    pub(crate) fn tag_len(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn collected(&self) -> usize {
        self.collected
    }

    pub(crate) fn is_full(&self) -> bool {
        self.collected == self.buf.len()
    }

    /// Bytes collected so far.
    pub(crate) fn candidate(&self) -> &[u8] {
        &self.buf[..self.collected]
    }

    /// Copy as many bytes of `input` as still fit. Returns the count taken.
    pub(crate) fn fill(&mut self, input: &[u8]) -> usize {
        let n = input.len().min(self.buf.len() - self.collected);
        self.buf[self.collected..self.collected + n].copy_from_slice(&input[..n]);
        self.collected += n;
        n
    }

    /// Append one byte. The window must not be full.
    pub(crate) fn push(&mut self, byte: u8) {
        debug_assert!(!self.is_full());
        self.buf[self.collected] = byte;
        self.collected += 1;
    }

    /// Drop the first byte of a full window and shift the rest to the front.
    /// Returns the dropped byte. With a one-byte window this only empties it.
    pub(crate) fn slide(&mut self) -> u8 {
        debug_assert!(self.is_full());
        let dropped = self.buf[0];
        self.buf.copy_within(1.., 0);
        self.collected = self.buf.len() - 1;
        dropped
    }

    pub(crate) fn clear(&mut self) {
        self.collected = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_stops_at_tag_len() {
        let mut window = TagWindow::new(4);
        assert_eq!(window.fill(&[1, 2]), 2);
        assert!(!window.is_full());
        assert_eq!(window.fill(&[3, 4, 5, 6]), 2);
        assert!(window.is_full());
        assert_eq!(window.candidate(), &[1, 2, 3, 4]);
        assert_eq!(window.fill(&[7]), 0);
    }

    #[test]
    fn slide_drops_only_first_byte() {
        let mut window = TagWindow::new(4);
        window.fill(&[0xAA, 0xDA, 0xBB, 0xAD]);
        assert_eq!(window.slide(), 0xAA);
        assert_eq!(window.collected(), 3);
        assert_eq!(window.candidate(), &[0xDA, 0xBB, 0xAD]);

        window.push(0x00);
        assert!(window.is_full());
        assert_eq!(window.candidate(), &[0xDA, 0xBB, 0xAD, 0x00]);
    }

    #[test]
    fn slide_single_byte_window_empties_it() {
        let mut window = TagWindow::new(1);
        window.push(0x22);
        assert_eq!(window.slide(), 0x22);
        assert_eq!(window.collected(), 0);
        assert_eq!(window.tag_len(), 1);
    }

    #[test]
    fn clear_keeps_length() {
        let mut window = TagWindow::new(3);
        window.fill(&[1, 2, 3]);
        window.clear();
        assert_eq!(window.collected(), 0);
        assert_eq!(window.tag_len(), 3);
        assert!(window.candidate().is_empty());
    }
}

//! An append-only log that lets a single-pass source be read more than once.
//!
//! Entries are addressed by absolute index. The trim frontier is the lowest index
//! still retained; everything below it is gone for good and the frontier never
//! moves backwards.

use std::collections::VecDeque;

use tracing::trace;

use crate::Error;

/// Recorded elements between the trim frontier and the end of the log.
#[derive(Debug, Clone)]
pub struct ReplayBuffer<T> {
    entries: VecDeque<T>,
    frontier: usize,
}

impl<T> Default for ReplayBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ReplayBuffer<T> {
    pub fn new() -> Self {
        ReplayBuffer {
            entries: VecDeque::new(),
            frontier: 0,
        }
    }

    /// Record one element at index [`end`](ReplayBuffer::end).
    pub fn append(&mut self, value: T) {
        self.entries.push_back(value);
    }

    /// Read the entry at absolute `index`.
    ///
    /// ```rust
    /// use enumerant::{Error, ReplayBuffer};
    ///
    /// let mut buffer = ReplayBuffer::new();
    /// buffer.append('a');
    /// buffer.append('b');
    /// buffer.advance_frontier(1);
    ///
    /// assert_eq!(buffer.read_at(1).unwrap(), &'b');
    /// assert!(matches!(buffer.read_at(0), Err(Error::IndexDiscarded { index: 0, frontier: 1 })));
    /// assert!(matches!(buffer.read_at(2), Err(Error::Exhausted)));
    /// ```
    pub fn read_at(&self, index: usize) -> Result<&T, Error> {
        if index < self.frontier {
            return Err(Error::IndexDiscarded {
                index,
                frontier: self.frontier,
            });
        }
        self.entries
            .get(index - self.frontier)
            .ok_or(Error::Exhausted)
    }

    /// Discard every entry below `new_min`. Does nothing unless `new_min` is
    /// above the current frontier.
    ///
    /// The frontier may move past [`end`](ReplayBuffer::end); entries appended
    /// later then start at the frontier's index.
    pub fn advance_frontier(&mut self, new_min: usize) {
        if new_min <= self.frontier {
            return;
        }
        let drop = (new_min - self.frontier).min(self.entries.len());
        self.entries.drain(..drop);
        trace!(
            from = self.frontier,
            to = new_min,
            retained = self.entries.len(),
            "frontier advanced"
        );
        self.frontier = new_min;
        if self.entries.is_empty() {
            self.entries.shrink_to(16);
        }
    }

    pub fn frontier(&self) -> usize {
        self.frontier
    }

    /// One past the last recorded index.
    pub fn end(&self) -> usize {
        self.frontier + self.entries.len()
    }

    /// Number of entries still held.
    pub fn retained(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(n: usize) -> ReplayBuffer<usize> {
        let mut buffer = ReplayBuffer::new();
        for i in 0..n {
            buffer.append(i * 10);
        }
        buffer
    }

    #[test]
    fn test_reads_by_absolute_index_after_trim() {
        let mut buffer = filled(5);
        buffer.advance_frontier(3);
        assert_eq!(buffer.frontier(), 3);
        assert_eq!(buffer.retained(), 2);
        assert_eq!(*buffer.read_at(3).unwrap(), 30);
        assert_eq!(*buffer.read_at(4).unwrap(), 40);
        assert_eq!(buffer.end(), 5);
    }

    #[test]
    fn test_frontier_never_moves_back() {
        let mut buffer = filled(4);
        buffer.advance_frontier(2);
        buffer.advance_frontier(1);
        buffer.advance_frontier(2);
        assert_eq!(buffer.frontier(), 2);
        assert!(matches!(
            buffer.read_at(1),
            Err(Error::IndexDiscarded { index: 1, frontier: 2 })
        ));
    }

    #[test]
    fn test_frontier_past_end_keeps_indices_absolute() {
        let mut buffer = filled(2);
        buffer.advance_frontier(3);
        assert!(buffer.is_empty());
        assert_eq!(buffer.end(), 3);
        buffer.append(99);
        assert_eq!(*buffer.read_at(3).unwrap(), 99);
    }

    #[test]
    fn test_read_past_end_is_exhausted() {
        let buffer = filled(1);
        assert!(buffer.read_at(1).unwrap_err().is_exhausted());
    }
}

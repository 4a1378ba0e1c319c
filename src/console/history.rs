//! Command history ring
//!
//! Fixed depth `D`, each slot a full [`CommandLine`]. Recording overwrites
//! the oldest slot once the ring is full.
//!
//! Scrolling moves a cursor around the whole ring and wraps at `D`, so
//! slots never written yet come back as empty lines.

use super::line::CommandLine;

/// Command history ring buffer
pub struct History<const N: usize, const D: usize> {
    slots: [CommandLine<N>; D],
    /// Next slot to write
    write_idx: usize,
    /// Number of recorded lines (saturates at D)
    count: usize,
    /// Slot shown by the last scroll; equals `write_idx` after a record
    scroll_idx: usize,
}

impl<const N: usize, const D: usize> History<N, D> {
    /// Create empty history
    pub const fn new() -> Self {
        assert!(D > 0, "History depth must be at least 1");

        Self {
            slots: [CommandLine::new(); D],
            write_idx: 0,
            count: 0,
            scroll_idx: 0,
        }
    }

    /// Copy a completed line into the next slot
    pub fn record(&mut self, line: &CommandLine<N>) {
        self.slots[self.write_idx] = *line;
        self.write_idx = (self.write_idx + 1) % D;
        self.count = (self.count + 1).min(D);
        self.scroll_idx = self.write_idx;
    }

    /// Step to the previous (older) slot
    pub fn scroll_up(&mut self) -> &CommandLine<N> {
        self.scroll_idx = (self.scroll_idx + D - 1) % D;
        &self.slots[self.scroll_idx]
    }

    /// Step to the next (newer) slot
    pub fn scroll_down(&mut self) -> &CommandLine<N> {
        self.scroll_idx = (self.scroll_idx + 1) % D;
        &self.slots[self.scroll_idx]
    }

    /// Raw ring slot (0-based, not age-ordered)
    pub fn slot(&self, idx: usize) -> Option<&CommandLine<N>> {
        self.slots.get(idx)
    }

    /// Entry by age (0 = newest)
    pub fn newest(&self, age: usize) -> Option<&CommandLine<N>> {
        if age >= self.count {
            return None;
        }
        Some(&self.slots[(self.write_idx + D - 1 - age) % D])
    }

    /// Number of recorded lines (at most D)
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl<const N: usize, const D: usize> Default for History<N, D> {
    fn default() -> Self {
        Self::new()
    }
}

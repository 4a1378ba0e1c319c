//! Current command line buffer

/// Bounded line of raw bytes.
///
/// The cursor is always at the end (no mid-line editing), so the length
/// doubles as the cursor position.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CommandLine<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> CommandLine<N> {
    /// Create empty line
    pub const fn new() -> Self {
        Self {
            buf: [0u8; N],
            len: 0,
        }
    }

    /// Append a byte. Returns `false` (and stores nothing) when full.
    pub fn push(&mut self, c: u8) -> bool {
        if self.len < N {
            self.buf[self.len] = c;
            self.len += 1;
            true
        } else {
            false
        }
    }

    /// Remove and return the last byte
    pub fn pop(&mut self) -> Option<u8> {
        if self.len > 0 {
            self.len -= 1;
            Some(self.buf[self.len])
        } else {
            None
        }
    }

    /// Clear the line and zero its storage
    pub fn clear(&mut self) {
        self.buf = [0u8; N];
        self.len = 0;
    }

    /// Replace contents, truncating at capacity
    pub fn set(&mut self, bytes: &[u8]) {
        let copy_len = bytes.len().min(N);
        self.buf[..copy_len].copy_from_slice(&bytes[..copy_len]);
        self.buf[copy_len..].fill(0);
        self.len = copy_len;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Line as text, empty if it holds non-UTF-8 bytes
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(self.as_bytes()).unwrap_or("")
    }

    /// Cursor position (== length)
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }
}

impl<const N: usize> Default for CommandLine<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Debug for CommandLine<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "CommandLine({:?})", self.as_bytes())
    }
}

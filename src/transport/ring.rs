//! Receive ring: hardware-written DMA area plus the software read cursor.
//!
//! ```text
//!            tail (RxPump)          head = N - remaining (DMA engine)
//!              │                      │
//!   [ . . . . x x x x x x x x x x x x . . . . ]
//!              └──── unread bytes ────┘
//! ```
//!
//! Single writer per field: the DMA engine writes bytes and the count
//! register, the pump writes `tail`. Software never writes the buffer.

use core::cell::UnsafeCell;

/// Memory the DMA engine writes received bytes into.
///
/// Software only reads it, with volatile loads, so the compiler never
/// caches bytes the engine is still filling in.
pub struct DmaBuffer<const N: usize> {
    bytes: UnsafeCell<[u8; N]>,
}

// SAFETY: The only writer is the DMA engine; software performs volatile
// reads of bytes the count register reports as complete.
unsafe impl<const N: usize> Sync for DmaBuffer<N> {}

impl<const N: usize> DmaBuffer<N> {
    /// Create a zeroed buffer.
    pub const fn new() -> Self {
        assert!(N > 0, "DMA buffer must not be empty");

        Self {
            bytes: UnsafeCell::new([0; N]),
        }
    }

    /// Address handed to the DMA engine when arming the transfer.
    #[inline]
    pub fn as_mut_ptr(&self) -> *mut u8 {
        self.bytes.get().cast::<u8>()
    }

    /// Read the byte at `idx` (wrapped into the buffer).
    #[inline]
    pub fn read(&self, idx: usize) -> u8 {
        // SAFETY: idx is reduced mod N and the pointer covers N bytes.
        unsafe { self.as_mut_ptr().add(idx % N).read_volatile() }
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for DmaBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Read cursor over a circular DMA area of `N` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxRing<const N: usize> {
    tail: usize,
}

impl<const N: usize> RxRing<N> {
    pub const fn new() -> Self {
        assert!(N > 0, "ring must not be empty");
        Self { tail: 0 }
    }

    /// Derive the hardware write offset from the remaining-count register.
    ///
    /// A count of 0 (wrap in progress) and a count of `N` (freshly
    /// reloaded) both mean offset 0. Out-of-range counts clamp to `N`.
    #[inline]
    pub fn head_from_remaining(remaining: usize) -> usize {
        (N - remaining.min(N)) % N
    }

    /// Next unread offset. Always `< N`.
    #[inline]
    pub fn tail(&self) -> usize {
        self.tail
    }

    /// Unread bytes between `tail` and `head`, wrapping at `N`.
    #[inline]
    pub fn pending(&self, head: usize) -> usize {
        if head >= self.tail {
            head - self.tail
        } else {
            (N - self.tail) + head
        }
    }

    /// Mark `n` bytes as consumed.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.tail = (self.tail + n) % N;
    }

    /// Forget everything unread (after re-arming the DMA).
    #[inline]
    pub fn reset(&mut self) {
        self.tail = 0;
    }
}

impl<const N: usize> Default for RxRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

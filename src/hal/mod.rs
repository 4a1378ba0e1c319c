//! Hardware boundary for the serial transport.
//!
//! The transport never touches peripheral registers directly. Board code
//! (or the ESP-IDF adapters in [`esp`]) implements these traits:
//!
//! ```text
//! DMA engine ──▶ RxDma::remaining() ──▶ RxPump (reads, never writes)
//! RxPump ──▶ RxDma::consumed(tail) ──▶ DMA engine (read cursor)
//! TxPump ──▶ TxDma::start_transmit() ──▶ DMA engine ──▶ ChannelEvents (ISR)
//! ```

#[cfg(feature = "espidf")]
pub mod esp;

/// Receive side of a circular DMA channel.
pub trait RxDma {
    /// Read the hardware remaining-count register.
    ///
    /// Counts down from the armed length to 1 and reloads on wrap.
    fn remaining(&self) -> usize;

    /// Arm a circular receive transfer into `buf[..len]`.
    ///
    /// The engine writes into this memory until the channel is torn down.
    fn start_receive(&mut self, buf: *mut u8, len: usize) -> Result<(), DmaError>;

    /// The pump's read cursor moved to `tail`.
    ///
    /// Hardware engines overwrite regardless and ignore this. Software
    /// writers use it to stop short of bytes that are still unread.
    fn consumed(&mut self, _tail: usize) {}
}

/// Transmit side of a DMA channel.
pub trait TxDma {
    /// Start one transfer of `bytes`.
    ///
    /// The slice must stay untouched until the transfer completes; the
    /// transmit pump guarantees this by holding the completion signal.
    fn start_transmit(&mut self, bytes: &[u8]) -> Result<TxStart, DmaError>;
}

/// How a transmit request was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStart {
    /// Transfer in flight, completion arrives from interrupt context.
    Pending,
    /// Driver copied the bytes synchronously, no completion event follows.
    Completed,
}

/// Time source and cooperative yield used by the pumps.
pub trait Clock {
    /// Monotonic time in microseconds.
    fn now_us(&self) -> i64;

    /// Give up the CPU for one scheduler tick.
    fn delay_tick(&mut self);
}

/// Driver-level DMA failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaError {
    /// Channel busy or not configured.
    Busy,
    /// Buffer rejected (alignment, length, memory region).
    InvalidBuffer,
    /// Underlying driver returned an error code.
    Driver(i32),
}

impl DmaError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Busy => "D01",
            Self::InvalidBuffer => "D02",
            Self::Driver(_) => "D03",
        }
    }
}

impl core::fmt::Display for DmaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Busy => write!(f, "{}: dma busy", self.code()),
            Self::InvalidBuffer => write!(f, "{}: invalid dma buffer", self.code()),
            Self::Driver(err) => write!(f, "{}: driver error {}", self.code(), err),
        }
    }
}

//! Per-channel transport statistics.
//!
//! Transport hiccups (full inbound queue, transfer errors, line errors)
//! are recovered inside the transport and never reach command handlers.
//! They still leave a trace here so a diagnostics command can show them.
//!
//! Interrupt callbacks and pumps only increment; nothing is reset except
//! by an explicit [`ChannelStats::clear`].

use core::sync::atomic::{AtomicU32, Ordering};

/// Lock-free counters for one serial channel.
///
/// # Usage
///
/// ```ignore
/// // In the transmit-complete ISR:
/// stats.record_tx_error();
///
/// // In a command handler:
/// let snap = stats.snapshot();
/// writeln!(out, "tx errors: {}", snap.tx_errors);
/// ```
pub struct ChannelStats {
    /// Bytes moved from the ring into the inbound queue.
    rx_bytes: AtomicU32,
    /// Polls that stopped early on a full inbound queue.
    rx_deferrals: AtomicU32,
    /// Receive-side DMA errors reported by the driver.
    rx_errors: AtomicU32,
    /// Framing/overrun errors on the line.
    line_errors: AtomicU32,
    /// Bytes handed to the transmit DMA.
    tx_bytes: AtomicU32,
    /// Transmit transfers started.
    tx_transfers: AtomicU32,
    /// Transmit transfers that ended in error (their bytes are lost).
    tx_errors: AtomicU32,
    /// Completion-signal waits that timed out.
    tx_timeouts: AtomicU32,
    /// Response bytes dropped because the outbound queue was full.
    tx_dropped: AtomicU32,
}

macro_rules! counter {
    ($record:ident, $get:ident, $field:ident) => {
        #[inline]
        pub fn $record(&self) {
            self.$field.fetch_add(1, Ordering::Relaxed);
        }

        #[inline]
        pub fn $get(&self) -> u32 {
            self.$field.load(Ordering::Relaxed)
        }
    };
}

impl ChannelStats {
    /// Create zeroed counters.
    pub const fn new() -> Self {
        Self {
            rx_bytes: AtomicU32::new(0),
            rx_deferrals: AtomicU32::new(0),
            rx_errors: AtomicU32::new(0),
            line_errors: AtomicU32::new(0),
            tx_bytes: AtomicU32::new(0),
            tx_transfers: AtomicU32::new(0),
            tx_errors: AtomicU32::new(0),
            tx_timeouts: AtomicU32::new(0),
            tx_dropped: AtomicU32::new(0),
        }
    }

    counter!(record_rx_deferral, rx_deferrals, rx_deferrals);
    counter!(record_rx_error, rx_errors, rx_errors);
    counter!(record_line_error, line_errors, line_errors);
    counter!(record_tx_error, tx_errors, tx_errors);
    counter!(record_tx_timeout, tx_timeouts, tx_timeouts);

    /// Count bytes delivered to the inbound queue.
    #[inline]
    pub fn add_rx_bytes(&self, n: usize) {
        self.rx_bytes.fetch_add(n as u32, Ordering::Relaxed);
    }

    /// Count one transfer of `n` bytes.
    #[inline]
    pub fn add_tx_transfer(&self, n: usize) {
        self.tx_bytes.fetch_add(n as u32, Ordering::Relaxed);
        self.tx_transfers.fetch_add(1, Ordering::Relaxed);
    }

    /// Count response bytes the outbound queue refused.
    #[inline]
    pub fn add_tx_dropped(&self, n: usize) {
        self.tx_dropped.fetch_add(n as u32, Ordering::Relaxed);
    }

    /// Zero every counter.
    pub fn clear(&self) {
        for counter in [
            &self.rx_bytes,
            &self.rx_deferrals,
            &self.rx_errors,
            &self.line_errors,
            &self.tx_bytes,
            &self.tx_transfers,
            &self.tx_errors,
            &self.tx_timeouts,
            &self.tx_dropped,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Get a snapshot of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            rx_bytes: self.rx_bytes.load(Ordering::Relaxed),
            rx_deferrals: self.rx_deferrals(),
            rx_errors: self.rx_errors(),
            line_errors: self.line_errors(),
            tx_bytes: self.tx_bytes.load(Ordering::Relaxed),
            tx_transfers: self.tx_transfers.load(Ordering::Relaxed),
            tx_errors: self.tx_errors(),
            tx_timeouts: self.tx_timeouts(),
            tx_dropped: self.tx_dropped.load(Ordering::Relaxed),
        }
    }
}

impl Default for ChannelStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters at a point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub rx_bytes: u32,
    pub rx_deferrals: u32,
    pub rx_errors: u32,
    pub line_errors: u32,
    pub tx_bytes: u32,
    pub tx_transfers: u32,
    pub tx_errors: u32,
    pub tx_timeouts: u32,
    pub tx_dropped: u32,
}

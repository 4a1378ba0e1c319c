//! Single-slot transmit completion signal.
//!
//! ```text
//! TxPump                      CompletionSignal            ISR
//! ──────                      ────────────────            ───
//! acquire() ── takes permit ─▶ [ 0 ]
//! start_transmit()
//!                              [ 1 ] ◀── release() ─── on_transmit_complete()
//! acquire() ── takes permit ─▶ [ 0 ]                      on_transmit_error()
//! ```
//!
//! The permit count is 0 or 1, so at most one transfer is ever in flight.

use core::sync::atomic::{AtomicBool, Ordering};

use super::TransportError;
use crate::hal::Clock;

/// Bound on how long the transmit pump waits for the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// Wait until the completion event arrives.
    #[default]
    Forever,
    /// Give up after this many milliseconds.
    Millis(u32),
}

/// Binary semaphore released from interrupt context.
pub struct CompletionSignal {
    ready: AtomicBool,
}

impl CompletionSignal {
    /// Create a released signal (hardware idle).
    pub const fn new() -> Self {
        Self {
            ready: AtomicBool::new(true),
        }
    }

    /// Release the permit. Safe to call from an ISR.
    ///
    /// Releasing an already released signal leaves a single permit.
    #[inline]
    pub fn release(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Take the permit if available.
    #[inline]
    pub fn try_acquire(&self) -> bool {
        self.ready
            .compare_exchange(true, false, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Whether the permit is currently available.
    #[inline]
    pub fn is_released(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Take the permit, yielding one tick at a time until it is released
    /// or `timeout` expires.
    pub fn acquire<C: Clock>(&self, timeout: Timeout, clock: &mut C) -> Result<(), TransportError> {
        if self.try_acquire() {
            return Ok(());
        }

        let start = clock.now_us();
        loop {
            clock.delay_tick();

            if self.try_acquire() {
                return Ok(());
            }

            if let Timeout::Millis(ms) = timeout {
                if clock.now_us().wrapping_sub(start) >= i64::from(ms) * 1000 {
                    return Err(TransportError::TransmitTimeout);
                }
            }
        }
    }
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TickClock {
        now: i64,
        ticks: u32,
    }

    impl Clock for TickClock {
        fn now_us(&self) -> i64 {
            self.now
        }

        fn delay_tick(&mut self) {
            self.now += 1000;
            self.ticks += 1;
        }
    }

    #[test]
    fn test_starts_released() {
        let signal = CompletionSignal::new();
        assert!(signal.is_released());
        assert!(signal.try_acquire());
        assert!(!signal.try_acquire());
    }

    #[test]
    fn test_double_release_is_one_permit() {
        let signal = CompletionSignal::new();
        assert!(signal.try_acquire());

        signal.release();
        signal.release();

        assert!(signal.try_acquire());
        assert!(!signal.try_acquire());
    }

    #[test]
    fn test_acquire_times_out() {
        let signal = CompletionSignal::new();
        let mut clock = TickClock { now: 0, ticks: 0 };
        assert!(signal.try_acquire());

        let result = signal.acquire(Timeout::Millis(5), &mut clock);

        assert_eq!(result, Err(TransportError::TransmitTimeout));
        assert_eq!(clock.ticks, 5);
    }

    #[test]
    fn test_acquire_immediate_when_released() {
        let signal = CompletionSignal::new();
        let mut clock = TickClock { now: 0, ticks: 0 };

        assert!(signal.acquire(Timeout::Millis(0), &mut clock).is_ok());
        assert_eq!(clock.ticks, 0);
    }
}

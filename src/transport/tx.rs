//! DMA transmit pump.
//!
//! Drains the outbound queue one burst at a time:
//!
//! 1. acquire the completion signal (the only blocking point)
//! 2. pop up to `BURST` bytes into the scratch buffer
//! 3. start exactly one transfer of the bytes actually popped
//!
//! The completion or error interrupt releases the signal. An errored
//! transfer still releases it, so the pump never deadlocks; the bytes of
//! that burst are lost and counted.

use super::queue::ByteConsumer;
use super::signal::{CompletionSignal, Timeout};
use super::TransportError;
use crate::hal::{Clock, TxDma, TxStart};
use crate::logging::LOG_STREAM;
use crate::stats::ChannelStats;
use crate::{chan_error, chan_warn};

/// Transmit pump for one channel.
pub struct TxPump<'a, D, C, const OUT: usize, const BURST: usize> {
    outbound: ByteConsumer<'a, OUT>,
    scratch: &'a mut [u8; BURST],
    dma: D,
    clock: C,
    signal: &'a CompletionSignal,
    stats: &'a ChannelStats,
    timeout: Timeout,
    channel: u8,
    seen_tx_errors: u32,
}

impl<'a, D: TxDma, C: Clock, const OUT: usize, const BURST: usize> TxPump<'a, D, C, OUT, BURST> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        outbound: ByteConsumer<'a, OUT>,
        scratch: &'a mut [u8; BURST],
        dma: D,
        clock: C,
        signal: &'a CompletionSignal,
        stats: &'a ChannelStats,
        timeout: Timeout,
        channel: u8,
    ) -> Self {
        Self {
            outbound,
            scratch,
            dma,
            clock,
            signal,
            stats,
            timeout,
            channel,
            seen_tx_errors: stats.tx_errors(),
        }
    }

    /// Whether the outbound queue holds bytes.
    #[inline]
    pub fn has_pending(&self) -> bool {
        self.outbound.ready()
    }

    /// Whether a transfer is currently outstanding.
    #[inline]
    pub fn in_flight(&self) -> bool {
        !self.signal.is_released()
    }

    /// Change the completion wait bound.
    pub fn set_timeout(&mut self, timeout: Timeout) {
        self.timeout = timeout;
    }

    /// Send the next burst from the outbound queue.
    ///
    /// # Returns
    ///
    /// - `Ok(0)` - Nothing queued
    /// - `Ok(n)` - Transfer of `n` bytes started
    /// - `Err(TransmitTimeout)` - Previous transfer never completed; queued
    ///   bytes are untouched
    /// - `Err(Dma(_))` - Driver refused the transfer; the burst is dropped
    pub fn flush_transmit(&mut self) -> Result<usize, TransportError> {
        if !self.outbound.ready() {
            return Ok(0);
        }

        if let Err(err) = self.signal.acquire(self.timeout, &mut self.clock) {
            self.stats.record_tx_timeout();
            chan_error!(LOG_STREAM, self.clock.now_us(), self.channel, "{}", err);
            return Err(err);
        }

        self.report_errors();

        let mut len = 0;
        while len < BURST {
            match self.outbound.dequeue() {
                Some(byte) => {
                    self.scratch[len] = byte;
                    len += 1;
                }
                None => break,
            }
        }

        if len == 0 {
            self.signal.release();
            return Ok(0);
        }

        match self.dma.start_transmit(&self.scratch[..len]) {
            Ok(TxStart::Pending) => {
                self.stats.add_tx_transfer(len);
                Ok(len)
            }
            Ok(TxStart::Completed) => {
                self.stats.add_tx_transfer(len);
                self.signal.release();
                Ok(len)
            }
            Err(err) => {
                self.stats.record_tx_error();
                self.seen_tx_errors = self.stats.tx_errors();
                self.signal.release();
                chan_warn!(
                    LOG_STREAM,
                    self.clock.now_us(),
                    self.channel,
                    "tx start failed ({}), {} bytes dropped",
                    err,
                    len
                );
                Err(TransportError::Dma(err))
            }
        }
    }

    /// Log transfer errors the interrupt layer counted since the last burst.
    fn report_errors(&mut self) {
        let tx_errors = self.stats.tx_errors();
        if tx_errors != self.seen_tx_errors {
            chan_warn!(
                LOG_STREAM,
                self.clock.now_us(),
                self.channel,
                "{} tx transfers failed, bytes dropped",
                tx_errors.wrapping_sub(self.seen_tx_errors)
            );
            self.seen_tx_errors = tx_errors;
        }
    }
}

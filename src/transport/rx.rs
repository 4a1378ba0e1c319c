//! DMA receive pump.
//!
//! Moves bytes from the circular DMA area into the inbound queue. Runs on
//! a fixed period or right after a half/full notification; never blocks.
//!
//! The read cursor only advances over bytes the queue accepted. When the
//! queue is full the pump stops, and the same bytes are offered again on
//! the next poll, so nothing is dropped as long as the consumer keeps up
//! within one ring length.

use core::sync::atomic::{compiler_fence, AtomicBool, Ordering};

use super::queue::ByteProducer;
use super::ring::{DmaBuffer, RxRing};
use super::TransportError;
use crate::hal::{Clock, RxDma};
use crate::logging::LOG_STREAM;
use crate::stats::ChannelStats;
use crate::{chan_debug, chan_warn};

/// Outcome of one [`RxPump::poll_receive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RxReport {
    /// Bytes pushed into the inbound queue.
    pub delivered: usize,
    /// Bytes left in the ring because the queue was full.
    pub deferred: usize,
}

/// Receive pump for one channel.
pub struct RxPump<'a, D, C, const RX: usize, const IN: usize> {
    buffer: &'a DmaBuffer<RX>,
    ring: RxRing<RX>,
    inbound: ByteProducer<'a, IN>,
    dma: D,
    clock: C,
    stats: &'a ChannelStats,
    notify: &'a AtomicBool,
    channel: u8,
    deferring: bool,
    seen_line_errors: u32,
    seen_rx_errors: u32,
}

impl<'a, D: RxDma, C: Clock, const RX: usize, const IN: usize> RxPump<'a, D, C, RX, IN> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        buffer: &'a DmaBuffer<RX>,
        inbound: ByteProducer<'a, IN>,
        dma: D,
        clock: C,
        stats: &'a ChannelStats,
        notify: &'a AtomicBool,
        channel: u8,
    ) -> Self {
        Self {
            buffer,
            ring: RxRing::new(),
            inbound,
            dma,
            clock,
            stats,
            notify,
            channel,
            deferring: false,
            seen_line_errors: stats.line_errors(),
            seen_rx_errors: stats.rx_errors(),
        }
    }

    /// Arm the circular receive transfer over the whole ring.
    pub fn start(&mut self) -> Result<(), TransportError> {
        self.ring.reset();
        self.dma.start_receive(self.buffer.as_mut_ptr(), RX)?;
        Ok(())
    }

    /// Consume a pending half/full notification.
    ///
    /// The task loop polls immediately when this returns `true` instead of
    /// waiting for the next period.
    #[inline]
    pub fn take_notification(&self) -> bool {
        self.notify.swap(false, Ordering::Acquire)
    }

    /// Reconcile the hardware write cursor with `tail` and forward new
    /// bytes to the inbound queue.
    pub fn poll_receive(&mut self) -> RxReport {
        self.report_errors();

        let head = RxRing::<RX>::head_from_remaining(self.dma.remaining());
        // Bytes below the reported count are complete before we read them.
        compiler_fence(Ordering::Acquire);

        let count = self.ring.pending(head);
        let mut delivered = 0;
        while delivered < count {
            let byte = self.buffer.read(self.ring.tail() + delivered);
            if self.inbound.enqueue(byte).is_err() {
                break;
            }
            delivered += 1;
        }
        self.ring.advance(delivered);
        self.dma.consumed(self.ring.tail());
        self.stats.add_rx_bytes(delivered);

        let deferred = count - delivered;
        if deferred > 0 {
            self.stats.record_rx_deferral();
            if !self.deferring {
                chan_debug!(
                    LOG_STREAM,
                    self.clock.now_us(),
                    self.channel,
                    "inbound full, {} bytes deferred",
                    deferred
                );
            }
        }
        self.deferring = deferred > 0;

        RxReport { delivered, deferred }
    }

    /// Current read cursor.
    #[inline]
    pub fn tail(&self) -> usize {
        self.ring.tail()
    }

    /// Log line/DMA errors the interrupt layer counted since the last poll.
    fn report_errors(&mut self) {
        let line_errors = self.stats.line_errors();
        if line_errors != self.seen_line_errors {
            chan_warn!(
                LOG_STREAM,
                self.clock.now_us(),
                self.channel,
                "{} line errors (framing/overrun)",
                line_errors.wrapping_sub(self.seen_line_errors)
            );
            self.seen_line_errors = line_errors;
        }

        let rx_errors = self.stats.rx_errors();
        if rx_errors != self.seen_rx_errors {
            chan_warn!(
                LOG_STREAM,
                self.clock.now_us(),
                self.channel,
                "{} receive dma errors",
                rx_errors.wrapping_sub(self.seen_rx_errors)
            );
            self.seen_rx_errors = rx_errors;
        }
    }
}

//! DMA byte transport for one serial channel.
//!
//! # Architecture
//!
//! ```text
//!  UART ─▶ DmaBuffer ─▶ RxPump ─▶ inbound ─▶ ConsoleIo ─▶ Console
//!                                                          │
//!  UART ◀─ TxDma ◀──── TxPump ◀─ outbound ◀─ QueueSink ◀───┘
//!            │            ▲
//!            └─ ISR ──────┘ CompletionSignal (ChannelEvents)
//! ```
//!
//! [`SerialChannel`] owns every piece of state for a channel. Boards with
//! several UARTs create several channels; nothing is shared between them.
//! [`SerialChannel::split`] hands each piece to exactly one owner:
//!
//! - [`RxPump`] owns the read cursor and the inbound producer
//! - [`TxPump`] owns the scratch buffer and the outbound consumer
//! - [`ConsoleIo`] owns the inbound consumer and the outbound producer
//! - [`ChannelEvents`] is a `Copy` handle for interrupt callbacks

pub mod error;
pub mod queue;
pub mod ring;
pub mod rx;
pub mod signal;
pub mod tx;

pub use error::TransportError;
pub use queue::{ByteConsumer, ByteProducer, ByteQueue, QueueSink};
pub use ring::{DmaBuffer, RxRing};
pub use rx::{RxPump, RxReport};
pub use signal::{CompletionSignal, Timeout};
pub use tx::TxPump;

use core::sync::atomic::{AtomicBool, Ordering};

use crate::config::{ChannelConfig, DEFAULT_QUEUE_DEPTH, DEFAULT_RX_RING, DEFAULT_TX_BURST};
use crate::hal::{Clock, RxDma, TxDma};
use crate::stats::ChannelStats;

/// All state of one serial channel.
///
/// - `RX`: receive ring size (the armed circular DMA length)
/// - `IN`/`OUT`: inbound/outbound queue storage
/// - `BURST`: transmit scratch buffer, the largest single transfer
///
/// # Example
///
/// ```ignore
/// static CHANNEL: StaticCell<SerialChannel> = StaticCell::new();
///
/// let channel = CHANNEL.init(SerialChannel::new());
/// let parts = channel.split(rx_dma, tx_dma, clock, &ChannelConfig::default());
/// ```
pub struct SerialChannel<
    const RX: usize = { DEFAULT_RX_RING },
    const IN: usize = { DEFAULT_QUEUE_DEPTH },
    const OUT: usize = { DEFAULT_QUEUE_DEPTH },
    const BURST: usize = { DEFAULT_TX_BURST },
> {
    rx_buffer: DmaBuffer<RX>,
    tx_scratch: [u8; BURST],
    inbound: ByteQueue<IN>,
    outbound: ByteQueue<OUT>,
    tx_done: CompletionSignal,
    rx_notify: AtomicBool,
    stats: ChannelStats,
}

impl<const RX: usize, const IN: usize, const OUT: usize, const BURST: usize>
    SerialChannel<RX, IN, OUT, BURST>
{
    /// Create a channel with empty queues and an idle transmitter.
    pub const fn new() -> Self {
        assert!(BURST > 0, "Transmit burst must not be empty");

        Self {
            rx_buffer: DmaBuffer::new(),
            tx_scratch: [0; BURST],
            inbound: ByteQueue::new(),
            outbound: ByteQueue::new(),
            tx_done: CompletionSignal::new(),
            rx_notify: AtomicBool::new(false),
            stats: ChannelStats::new(),
        }
    }

    /// Channel counters.
    pub fn stats(&self) -> &ChannelStats {
        &self.stats
    }

    /// Hand out the pumps, the console endpoints and the ISR handle.
    pub fn split<'a, RD, TD, C>(
        &'a mut self,
        rx_dma: RD,
        tx_dma: TD,
        clock: C,
        config: &ChannelConfig,
    ) -> ChannelParts<'a, RD, TD, C, RX, IN, OUT, BURST>
    where
        RD: RxDma,
        TD: TxDma,
        C: Clock + Clone,
    {
        let Self {
            rx_buffer,
            tx_scratch,
            inbound,
            outbound,
            tx_done,
            rx_notify,
            stats,
        } = self;

        let (in_producer, in_consumer) = inbound.split();
        let (out_producer, out_consumer) = outbound.split();
        let rx_buffer: &'a DmaBuffer<RX> = rx_buffer;
        let tx_done: &'a CompletionSignal = tx_done;
        let rx_notify: &'a AtomicBool = rx_notify;
        let stats: &'a ChannelStats = stats;

        ChannelParts {
            rx: RxPump::new(
                rx_buffer,
                in_producer,
                rx_dma,
                clock.clone(),
                stats,
                rx_notify,
                config.channel,
            ),
            tx: TxPump::new(
                out_consumer,
                tx_scratch,
                tx_dma,
                clock,
                tx_done,
                stats,
                config.tx_timeout,
                config.channel,
            ),
            io: ConsoleIo {
                inbound: in_consumer,
                outbound: out_producer,
                stats,
            },
            events: ChannelEvents {
                tx_done,
                rx_notify,
                stats,
            },
            stats,
        }
    }
}

impl<const RX: usize, const IN: usize, const OUT: usize, const BURST: usize> Default
    for SerialChannel<RX, IN, OUT, BURST>
{
    fn default() -> Self {
        Self::new()
    }
}

/// Pieces of a split [`SerialChannel`].
pub struct ChannelParts<
    'a,
    RD,
    TD,
    C,
    const RX: usize,
    const IN: usize,
    const OUT: usize,
    const BURST: usize,
> {
    pub rx: RxPump<'a, RD, C, RX, IN>,
    pub tx: TxPump<'a, TD, C, OUT, BURST>,
    pub io: ConsoleIo<'a, IN, OUT>,
    pub events: ChannelEvents<'a>,
    pub stats: &'a ChannelStats,
}

/// Application side of the queues: inbound bytes in, responses out.
pub struct ConsoleIo<'a, const IN: usize, const OUT: usize> {
    pub(crate) inbound: ByteConsumer<'a, IN>,
    pub(crate) outbound: ByteProducer<'a, OUT>,
    pub(crate) stats: &'a ChannelStats,
}

impl<'a, const IN: usize, const OUT: usize> ConsoleIo<'a, IN, OUT> {
    /// Next received byte, if any.
    #[inline]
    pub fn next_byte(&mut self) -> Option<u8> {
        self.inbound.dequeue()
    }

    /// Received bytes are waiting.
    #[inline]
    pub fn has_input(&self) -> bool {
        self.inbound.ready()
    }

    /// Bytes the outbound queue can still take.
    #[inline]
    pub fn outbound_free(&self) -> usize {
        self.outbound.capacity() - self.outbound.len()
    }

    /// Nothing queued for transmit.
    #[inline]
    pub fn outbound_empty(&self) -> bool {
        self.outbound.len() == 0
    }

    /// Sink that enqueues into the outbound queue.
    pub fn sink(&mut self) -> QueueSink<'_, 'a, OUT> {
        QueueSink::new(&mut self.outbound, self.stats)
    }

    /// Split into the byte source and the response sink at once.
    pub fn endpoints(&mut self) -> (&mut ByteConsumer<'a, IN>, QueueSink<'_, 'a, OUT>) {
        (
            &mut self.inbound,
            QueueSink::new(&mut self.outbound, self.stats),
        )
    }
}

/// Interrupt-context callbacks for one channel.
///
/// Every method only touches atomics, so it is safe to call from an ISR.
/// The driver clears the hardware error flags itself before calling in.
#[derive(Clone, Copy)]
pub struct ChannelEvents<'a> {
    tx_done: &'a CompletionSignal,
    rx_notify: &'a AtomicBool,
    stats: &'a ChannelStats,
}

impl ChannelEvents<'_> {
    /// Transmit transfer finished.
    #[inline]
    pub fn on_transmit_complete(&self) {
        self.tx_done.release();
    }

    /// Transmit transfer failed. Releases the signal; the burst is lost.
    #[inline]
    pub fn on_transmit_error(&self) {
        self.stats.record_tx_error();
        self.tx_done.release();
    }

    /// Framing/overrun on the line. No buffer state changes.
    #[inline]
    pub fn on_line_error(&self) {
        self.stats.record_line_error();
    }

    /// Receive DMA error. The pump continues from its last cursor.
    #[inline]
    pub fn on_receive_error(&self) {
        self.stats.record_rx_error();
    }

    /// Half/full transfer notification: ask the pump to poll now.
    #[inline]
    pub fn on_receive_progress(&self) {
        self.rx_notify.store(true, Ordering::Release);
    }
}

//! Inbound/outbound byte queues.
//!
//! Both directions are `heapless` SPSC queues split into a producer and a
//! consumer half, so the single-producer/single-consumer rule is carried by
//! ownership. A queue of storage `N` holds at most `N - 1` bytes.

use heapless::spsc::{Consumer, Producer, Queue};

use crate::console::ResponseSink;
use crate::stats::ChannelStats;

/// Bounded byte FIFO.
pub type ByteQueue<const N: usize> = Queue<u8, N>;

/// Producer half of a [`ByteQueue`].
pub type ByteProducer<'a, const N: usize> = Producer<'a, u8, N>;

/// Consumer half of a [`ByteQueue`].
pub type ByteConsumer<'a, const N: usize> = Consumer<'a, u8, N>;

/// Response sink writing into the outbound queue.
///
/// Never blocks, since the transmit pump usually runs on the same task and
/// could not drain a blocked handler. [`Console::run`] stops after each
/// line so the caller can flush in between; only a single response larger
/// than the whole queue still loses bytes, and those are counted.
///
/// [`Console::run`]: crate::console::Console::run
pub struct QueueSink<'q, 'a, const N: usize> {
    producer: &'q mut ByteProducer<'a, N>,
    stats: &'q ChannelStats,
}

impl<'q, 'a, const N: usize> QueueSink<'q, 'a, N> {
    pub fn new(producer: &'q mut ByteProducer<'a, N>, stats: &'q ChannelStats) -> Self {
        Self { producer, stats }
    }
}

impl<const N: usize> ResponseSink for QueueSink<'_, '_, N> {
    fn emit(&mut self, bytes: &[u8]) -> usize {
        let mut written = 0;
        for &byte in bytes {
            if self.producer.enqueue(byte).is_err() {
                break;
            }
            written += 1;
        }

        if written < bytes.len() {
            self.stats.add_tx_dropped(bytes.len() - written);
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_sink_drops_overflow() {
        let mut queue: ByteQueue<4> = ByteQueue::new();
        let stats = ChannelStats::new();
        let (mut producer, mut consumer) = queue.split();

        let written = QueueSink::new(&mut producer, &stats).emit(b"abcdef");

        assert_eq!(written, 3);
        assert_eq!(stats.snapshot().tx_dropped, 3);
        assert_eq!(consumer.dequeue(), Some(b'a'));
        assert_eq!(consumer.dequeue(), Some(b'b'));
        assert_eq!(consumer.dequeue(), Some(b'c'));
        assert_eq!(consumer.dequeue(), None);
    }
}

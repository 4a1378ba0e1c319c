//! Non-blocking logging for the serial transport.
//!
//! ```text
//! RxPump / TxPump        LogStream             log_drain
//! ───────────────        ─────────             ─────────
//!
//! chan_warn!() ───────▶ [L0][L1][L2] ───────▶ log UART / host writer
//! formats on stack       lock-free ring        blocking ok
//! never blocks           drops when full       own task
//! ```
//!
//! Interrupt callbacks never log. They bump counters in
//! [`ChannelStats`](crate::stats::ChannelStats) and the pumps report what
//! changed on their next run.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 96;

/// Log buffer size (number of entries).
pub const LOG_BUFFER_SIZE: usize = 64;

/// Crate-wide log ring shared by every channel's pumps.
pub static LOG_STREAM: LogStream = LogStream::new();

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    /// Convert to string for output.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    /// Convert from raw u8 value (saturates at Trace).
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

/// A single log entry.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct LogEntry {
    /// Timestamp in microseconds.
    pub timestamp_us: i64,
    /// Log level.
    pub level: LogLevel,
    /// Serial channel the event belongs to.
    pub channel: u8,
    /// Message length.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: LogEntry = LogEntry {
        timestamp_us: 0,
        level: LogLevel::Info,
        channel: 0,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text, or a placeholder if it is not valid UTF-8.
    pub fn message(&self) -> &str {
        core::str::from_utf8(&self.msg[..self.len as usize]).unwrap_or("<invalid utf8>")
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Lock-free log ring (multiple producers, single consumer).
///
/// - Producers reserve a slot with a CAS on `write_idx`, so a full ring
///   never advances the write index
/// - Each slot carries a commit flag; the drain stops at the first slot
///   whose writer has not finished yet
/// - Entries above the configured level are discarded without counting
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    entries: UnsafeCell<[LogEntry; N]>,
    committed: [AtomicBool; N],
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
    max_level: AtomicU8,
}

// SAFETY: Producers own the slot they reserved until they set its commit
// flag; the single consumer only reads committed slots.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    /// Create a new empty log stream at `Info` level.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log buffer size must be power of 2");

        Self {
            entries: UnsafeCell::new([LogEntry::EMPTY; N]),
            committed: [const { AtomicBool::new(false) }; N],
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
            max_level: AtomicU8::new(LogLevel::Info as u8),
        }
    }

    /// Set the most verbose level that is still recorded.
    pub fn set_level(&self, level: LogLevel) {
        self.max_level.store(level as u8, Ordering::Relaxed);
    }

    /// Current level filter.
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.max_level.load(Ordering::Relaxed))
    }

    /// Whether an entry at `level` would be recorded.
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level as u8 <= self.max_level.load(Ordering::Relaxed)
    }

    /// Push a log entry (never blocks).
    ///
    /// Returns `true` if the message was queued, `false` if filtered out or
    /// dropped because the ring is full.
    pub fn push(&self, timestamp_us: i64, level: LogLevel, channel: u8, msg: &[u8]) -> bool {
        if !self.enabled(level) {
            return false;
        }

        let mut write = self.write_idx.load(Ordering::Relaxed);
        loop {
            let read = self.read_idx.load(Ordering::Acquire);
            if write.wrapping_sub(read) >= N as u32 {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return false;
            }
            match self.write_idx.compare_exchange_weak(
                write,
                write.wrapping_add(1),
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(current) => write = current,
            }
        }

        let idx = (write as usize) & Self::MASK;

        // SAFETY: The CAS above gave this producer exclusive ownership of
        // slot `idx` until its commit flag is set.
        unsafe {
            let entry = &mut (*self.entries.get())[idx];
            let len = msg.len().min(MAX_MSG_LEN);
            entry.timestamp_us = timestamp_us;
            entry.level = level;
            entry.channel = channel;
            entry.len = len as u8;
            entry.msg[..len].copy_from_slice(&msg[..len]);
        }

        self.committed[idx].store(true, Ordering::Release);
        true
    }

    /// Drain next log entry (single consumer).
    ///
    /// Returns `None` if nothing is available or the oldest reserved slot is
    /// still being written.
    pub fn drain(&self) -> Option<LogEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        let idx = (read as usize) & Self::MASK;
        if !self.committed[idx].load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: Slot is committed and only this consumer reads it.
        let entry = unsafe { (*self.entries.get())[idx] };

        self.committed[idx].store(false, Ordering::Relaxed);
        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    /// Get count of dropped messages.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset dropped counter (e.g., after reporting).
    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Get number of entries waiting to be drained.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a message into a buffer, truncating at the end.
///
/// Returns the number of bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    let mut writer = SliceWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// `core::fmt::Write` over a fixed slice, silently truncating.
pub(crate) struct SliceWriter<'a> {
    pub(crate) buf: &'a mut [u8],
    pub(crate) pos: usize,
}

impl core::fmt::Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let remaining = self.buf.len() - self.pos;
        let to_write = bytes.len().min(remaining);
        self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
        self.pos += to_write;
        Ok(())
    }
}

/// Channel log macro.
///
/// # Example
///
/// ```ignore
/// chan_log!(LogLevel::Warn, LOG_STREAM, now_us, chan, "tx error, {} bytes lost", n);
/// ```
#[macro_export]
macro_rules! chan_log {
    ($level:expr, $stream:expr, $timestamp:expr, $channel:expr, $($arg:tt)*) => {{
        if $stream.enabled($level) {
            let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
            let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
            $stream.push($timestamp, $level, $channel, &buf[..len]);
        }
    }};
}

/// Channel info log.
#[macro_export]
macro_rules! chan_info {
    ($stream:expr, $timestamp:expr, $channel:expr, $($arg:tt)*) => {
        $crate::chan_log!($crate::logging::LogLevel::Info, $stream, $timestamp, $channel, $($arg)*)
    };
}

/// Channel warning log.
#[macro_export]
macro_rules! chan_warn {
    ($stream:expr, $timestamp:expr, $channel:expr, $($arg:tt)*) => {
        $crate::chan_log!($crate::logging::LogLevel::Warn, $stream, $timestamp, $channel, $($arg)*)
    };
}

/// Channel error log.
#[macro_export]
macro_rules! chan_error {
    ($stream:expr, $timestamp:expr, $channel:expr, $($arg:tt)*) => {
        $crate::chan_log!($crate::logging::LogLevel::Error, $stream, $timestamp, $channel, $($arg)*)
    };
}

/// Channel debug log.
#[macro_export]
macro_rules! chan_debug {
    ($stream:expr, $timestamp:expr, $channel:expr, $($arg:tt)*) => {
        $crate::chan_log!($crate::logging::LogLevel::Debug, $stream, $timestamp, $channel, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_stream_basic() {
        let stream = LogStream::<16>::new();

        assert!(stream.push(1000, LogLevel::Info, 2, b"test message"));
        assert_eq!(stream.pending(), 1);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.timestamp_us, 1000);
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.channel, 2);
        assert_eq!(entry.message(), "test message");

        assert!(stream.drain().is_none());
    }

    #[test]
    fn test_log_stream_full_does_not_skew_indices() {
        let stream = LogStream::<4>::new();

        for i in 0..4 {
            assert!(stream.push(i, LogLevel::Warn, 0, b"x"));
        }

        assert!(!stream.push(5, LogLevel::Warn, 0, b"5"));
        assert!(!stream.push(6, LogLevel::Warn, 0, b"6"));
        assert_eq!(stream.dropped(), 2);
        assert_eq!(stream.pending(), 4);

        assert_eq!(stream.drain().unwrap().timestamp_us, 0);
        assert!(stream.push(7, LogLevel::Warn, 0, b"7"));

        let drained: Vec<i64> = core::iter::from_fn(|| stream.drain())
            .map(|e| e.timestamp_us)
            .collect();
        assert_eq!(drained, vec![1, 2, 3, 7]);
    }

    #[test]
    fn test_level_filter() {
        let stream = LogStream::<8>::new();

        assert!(!stream.push(1, LogLevel::Debug, 0, b"hidden"));
        assert_eq!(stream.dropped(), 0);

        stream.set_level(LogLevel::Debug);
        assert!(stream.push(2, LogLevel::Debug, 0, b"shown"));
        assert_eq!(stream.level(), LogLevel::Debug);
    }

    #[test]
    fn test_macro_formats_message() {
        let stream = LogStream::<8>::new();
        crate::chan_warn!(stream, 42, 1, "lost {} bytes", 17);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.level, LogLevel::Warn);
        assert_eq!(entry.message(), "lost 17 bytes");
    }

    #[test]
    fn test_format_to_buffer_truncates() {
        let mut buf = [0u8; 4];
        let len = format_to_buffer(&mut buf, format_args!("Hello {}", 42));
        assert_eq!(&buf[..len], b"Hell");
    }

    #[test]
    fn test_concurrent_producers() {
        use std::sync::Arc;
        use std::thread;

        let stream = Arc::new(LogStream::<64>::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let stream = Arc::clone(&stream);
                thread::spawn(move || {
                    for j in 0..10 {
                        let msg = format!("T{} m{}", i, j);
                        stream.push(j, LogLevel::Info, i as u8, msg.as_bytes());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let count = core::iter::from_fn(|| stream.drain()).count();
        assert_eq!(count, 40);
    }
}

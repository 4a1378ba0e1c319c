//! Log output.
//!
//! Drains [`LOG_STREAM`](crate::logging::LOG_STREAM) into a byte writer.
//! On target this is a dedicated TX-only UART (`UartLogWriter`);
//! on the host any `core::fmt::Write` works.
//!
//! Line format: `[timestamp_us] LEVEL chN: message\r\n`

use core::fmt::Write;

use crate::logging::{LogEntry, LogStream, SliceWriter};

/// Longest formatted log line.
pub const LINE_BUF_SIZE: usize = 160;

/// Format log entry into `buf`, truncating.
///
/// Returns the number of bytes written.
pub fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    let mut writer = SliceWriter { buf, pos: 0 };

    let _ = write!(
        writer,
        "[{:10}] {} ch{}: {}\r\n",
        entry.timestamp_us,
        entry.level.as_str(),
        entry.channel,
        entry.message()
    );

    writer.pos
}

/// Write every pending entry to `out`, then report drops once.
///
/// Returns the number of entries written.
pub fn drain_logs<const N: usize, W: Write>(stream: &LogStream<N>, out: &mut W) -> usize {
    let mut line = [0u8; LINE_BUF_SIZE];
    let mut count = 0;

    while let Some(entry) = stream.drain() {
        let len = format_log_entry(&entry, &mut line);
        let _ = out.write_str(core::str::from_utf8(&line[..len]).unwrap_or(""));
        count += 1;
    }

    let dropped = stream.dropped();
    if dropped > 0 {
        let _ = write!(out, "[WARN] log dropped: {}\r\n", dropped);
        stream.reset_dropped();
    }

    count
}

/// `core::fmt::Write` over a TX-only UART (target only).
#[cfg(feature = "espidf")]
pub struct UartLogWriter<'u, 'd>(pub &'u mut esp_idf_svc::hal::uart::UartTxDriver<'d>);

#[cfg(feature = "espidf")]
impl Write for UartLogWriter<'_, '_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.0.write(s.as_bytes()).map(|_| ()).map_err(|_| core::fmt::Error)
    }
}

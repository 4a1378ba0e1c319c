//! Response output for the editor echo and command handlers.

use core::fmt;

use super::CommandError;

/// Destination for response bytes.
///
/// Handlers and the line editor write here; the transport implementation
/// ([`QueueSink`](crate::transport::QueueSink)) feeds the outbound queue.
pub trait ResponseSink {
    /// Enqueue bytes. Returns how many were accepted.
    fn emit(&mut self, bytes: &[u8]) -> usize;

    fn emit_str(&mut self, s: &str) -> usize {
        self.emit(s.as_bytes())
    }

    /// Formatted output, truncated if the sink fills up.
    fn emit_fmt(&mut self, args: fmt::Arguments<'_>) {
        let _ = fmt::write(&mut FmtAdapter(self), args);
    }

    /// Report a handler error as `E02: invalid value\r\n`.
    fn error(&mut self, err: CommandError) {
        self.emit_fmt(format_args!("{}\r\n", err));
    }
}

struct FmtAdapter<'s, S: ?Sized>(&'s mut S);

impl<S: ResponseSink + ?Sized> fmt::Write for FmtAdapter<'_, S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.emit(s.as_bytes());
        Ok(())
    }
}

/// Fixed-capacity capture buffer, useful on the host and for responses
/// assembled before they are queued.
impl<const N: usize> ResponseSink for heapless::Vec<u8, N> {
    fn emit(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(N - self.len());
        // Length checked above.
        let _ = self.extend_from_slice(&bytes[..n]);
        n
    }
}

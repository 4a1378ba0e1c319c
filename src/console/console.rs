//! Console: line editor wired to a command table

use super::dispatch::CommandTable;
use super::editor::{EditEvent, LineEditor};
use super::ResponseSink;
use crate::transport::ConsoleIo;

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

/// Per-channel console.
///
/// - `N`: maximum line length
/// - `D`: history depth
/// - `M`: command table capacity
pub struct Console<'t, Ctx, const N: usize, const D: usize, const M: usize> {
    editor: LineEditor<N, D>,
    table: &'t CommandTable<Ctx, M>,
}

impl<'t, Ctx, const N: usize, const D: usize, const M: usize> Console<'t, Ctx, N, D, M> {
    /// Create console over a finished command table
    pub fn new(table: &'t CommandTable<Ctx, M>, prompt: &'static str) -> Self {
        Self {
            editor: LineEditor::new().with_prompt(prompt),
            table,
        }
    }

    /// Process a single input byte, dispatching on CR.
    pub fn feed_byte(&mut self, byte: u8, ctx: &mut Ctx, out: &mut dyn ResponseSink) -> EditEvent {
        let table = self.table;
        self.editor.feed_byte(byte, out, |line, out| {
            table.dispatch(line, ctx, out);
        })
    }

    /// Feed bytes from the inbound queue until one line is dispatched.
    ///
    /// Also stops early when the outbound queue cannot hold the echo of the
    /// next byte (a recall redraws the whole line). Unread bytes stay in
    /// the inbound queue, where the receive pump holds back the rest, so
    /// the caller flushes the transmit side and calls again while
    /// [`ConsoleIo::has_input`] is true.
    ///
    /// Returns the number of bytes processed. Handlers run to completion
    /// inside this call.
    pub fn run<const IN: usize, const OUT: usize>(
        &mut self,
        io: &mut ConsoleIo<'_, IN, OUT>,
        ctx: &mut Ctx,
    ) -> usize {
        let headroom = self.editor.echo_headroom();
        let mut processed = 0;
        loop {
            // An empty queue always takes the next byte.
            if io.outbound_free() < headroom && !io.outbound_empty() {
                break;
            }

            let (inbound, mut sink) = io.endpoints();
            let Some(byte) = inbound.dequeue() else {
                break;
            };
            let event = self.feed_byte(byte, ctx, &mut sink);
            processed += 1;

            if event == EditEvent::Submitted {
                break;
            }
        }
        processed
    }

    /// Print welcome banner
    pub fn print_banner(&self, out: &mut dyn ResponseSink) {
        out.emit_fmt(format_args!("\r\n{}\r\n", VERSION));
        self.editor.print_prompt(out);
    }

    pub fn editor(&self) -> &LineEditor<N, D> {
        &self.editor
    }
}

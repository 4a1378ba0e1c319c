//! Line editor with history recall.
//!
//! Consumes one input byte at a time:
//!
//! ```text
//!             ESC              '['              'A' / 'B'
//! Accumulating ──▶ EscapeSeq1 ──▶ EscapeSeq2 ──────────▶ recall ──▶ Accumulating
//!      ▲               │               │
//!      └─── any other byte (sequence abandoned, bytes kept) ──┘
//! ```
//!
//! - Backspace (`0x08`/`0x7F`) drops the last byte and echoes `BS SP BS`,
//!   also on an empty line
//! - CR completes the line: echo CRLF, hand it to the dispatcher, record it
//!   in history, clear it
//! - LF is ignored so CRLF terminals do not submit twice
//! - Everything else is upper-cased, appended and echoed
//!
//! Escape bytes are appended like any other byte but not echoed; when a
//! sequence completes, the bytes it added are stripped again before the
//! history entry replaces the line. A line that ends in `ESC [ A` or
//! `ESC [ B` after editing (the state was reset by a backspace in between)
//! also counts as a completed sequence.

use super::history::History;
use super::line::CommandLine;
use super::ResponseSink;

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;
const ESC: u8 = 0x1B;
const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// Visual erase of one character.
const ERASE_CHAR: &[u8] = b"\x08 \x08";

/// Erase the whole display line and return to column 0.
pub const ERASE_LINE: &[u8] = b"\x1b[2K\r";

/// Escape-sequence recognition state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Accumulating,
    /// Saw ESC
    EscapeSeq1,
    /// Saw ESC '['
    EscapeSeq2,
}

/// History scroll direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recall {
    Up,
    Down,
}

/// What a single byte did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditEvent {
    /// Byte ignored or swallowed (LF, overflow, escape prefix)
    None,
    Appended,
    Erased,
    /// A non-empty line went to the dispatcher
    Submitted,
    /// Current line replaced from history
    Recalled(Recall),
}

/// Line editor state: current line, history and escape tracking.
pub struct LineEditor<const N: usize, const D: usize> {
    line: CommandLine<N>,
    history: History<N, D>,
    state: EditState,
    /// Escape-sequence bytes actually stored in `line`
    held: usize,
    prompt: &'static str,
}

impl<const N: usize, const D: usize> LineEditor<N, D> {
    /// Create editor with no prompt
    pub const fn new() -> Self {
        Self {
            line: CommandLine::new(),
            history: History::new(),
            state: EditState::Accumulating,
            held: 0,
            prompt: "",
        }
    }

    /// Printed after each submitted line and after a recall.
    pub const fn with_prompt(mut self, prompt: &'static str) -> Self {
        self.prompt = prompt;
        self
    }

    /// Process a single input byte.
    ///
    /// `on_line` runs synchronously with the completed line before it is
    /// recorded in history.
    pub fn feed_byte<F>(&mut self, byte: u8, out: &mut dyn ResponseSink, on_line: F) -> EditEvent
    where
        F: FnOnce(&[u8], &mut dyn ResponseSink),
    {
        match byte {
            BACKSPACE | DELETE => {
                self.reset_escape();
                self.line.pop();
                out.emit(ERASE_CHAR);
                EditEvent::Erased
            }
            CR => {
                self.reset_escape();
                self.submit(out, on_line)
            }
            LF => EditEvent::None,
            _ => self.append(byte.to_ascii_uppercase(), out),
        }
    }

    fn append(&mut self, byte: u8, out: &mut dyn ResponseSink) -> EditEvent {
        let stored = self.line.push(byte);

        match (self.state, byte) {
            (_, ESC) => {
                self.state = EditState::EscapeSeq1;
                self.held = usize::from(stored);
                EditEvent::None
            }
            (EditState::EscapeSeq1, b'[') => {
                self.state = EditState::EscapeSeq2;
                self.held += usize::from(stored);
                EditEvent::None
            }
            (EditState::EscapeSeq2, b'A') => {
                self.held += usize::from(stored);
                self.recall(Recall::Up, out)
            }
            (EditState::EscapeSeq2, b'B') => {
                self.held += usize::from(stored);
                self.recall(Recall::Down, out)
            }
            (_, b'A' | b'B') if stored && self.ends_with_escape(byte) => {
                // Sequence rebuilt after a backspace reset the state.
                self.held = 3;
                let direction = if byte == b'A' { Recall::Up } else { Recall::Down };
                self.recall(direction, out)
            }
            _ => {
                // An abandoned sequence keeps its bytes in the line.
                self.reset_escape();
                if stored {
                    out.emit(&[byte]);
                    EditEvent::Appended
                } else {
                    EditEvent::None
                }
            }
        }
    }

    /// Line ends in `ESC [ <final>`.
    fn ends_with_escape(&self, final_byte: u8) -> bool {
        self.line.as_bytes().ends_with(&[ESC, b'[', final_byte])
    }

    fn recall(&mut self, direction: Recall, out: &mut dyn ResponseSink) -> EditEvent {
        for _ in 0..self.held {
            self.line.pop();
        }
        self.reset_escape();

        out.emit(ERASE_LINE);
        out.emit_str(self.prompt);

        let entry = match direction {
            Recall::Up => self.history.scroll_up(),
            Recall::Down => self.history.scroll_down(),
        };
        self.line.set(entry.as_bytes());
        out.emit(self.line.as_bytes());

        EditEvent::Recalled(direction)
    }

    fn submit<F>(&mut self, out: &mut dyn ResponseSink, on_line: F) -> EditEvent
    where
        F: FnOnce(&[u8], &mut dyn ResponseSink),
    {
        out.emit(b"\r\n");

        let event = if self.line.is_empty() {
            EditEvent::None
        } else {
            on_line(self.line.as_bytes(), out);
            self.history.record(&self.line);
            self.line.clear();
            EditEvent::Submitted
        };

        self.print_prompt(out);
        event
    }

    fn reset_escape(&mut self) {
        self.state = EditState::Accumulating;
        self.held = 0;
    }

    /// Print the prompt (if any)
    pub fn print_prompt(&self, out: &mut dyn ResponseSink) {
        out.emit_str(self.prompt);
    }

    /// Worst-case output of one input byte, handler output aside: a
    /// recall redraws erase sequence, prompt and a full line; a submit
    /// writes CRLF and the prompt.
    pub fn echo_headroom(&self) -> usize {
        ERASE_LINE.len() + self.prompt.len() + N
    }

    /// Line being edited
    pub fn line(&self) -> &CommandLine<N> {
        &self.line
    }

    pub fn history(&self) -> &History<N, D> {
        &self.history
    }

    pub fn state(&self) -> EditState {
        self.state
    }
}

impl<const N: usize, const D: usize> Default for LineEditor<N, D> {
    fn default() -> Self {
        Self::new()
    }
}

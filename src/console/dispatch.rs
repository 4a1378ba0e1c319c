//! Prefix command dispatcher
//!
//! The table is scanned in registration order and the first entry whose
//! prefix starts the line wins. When one prefix is a strict prefix of
//! another (`#PPS` and `#PPSS`), the longer one must be registered first
//! or it is never reached; [`CommandTable::find_shadowed`] reports such
//! ordering mistakes.

use super::parser::ParsedCommand;
use super::{CommandError, ResponseSink};

/// Command handler.
///
/// `Ctx` is the board context (drivers, settings) the handler operates on.
pub type Handler<Ctx> = fn(&mut Ctx, &ParsedCommand<'_>, &mut dyn ResponseSink);

/// Command descriptor
pub struct CommandEntry<Ctx> {
    /// Byte-exact, upper-case line prefix
    pub prefix: &'static str,
    pub handler: Handler<Ctx>,
}

impl<Ctx> Clone for CommandEntry<Ctx> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Ctx> Copy for CommandEntry<Ctx> {}

/// Result of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handled by the entry at this table index
    Matched(usize),
    /// No prefix matched; the fallback handler ran
    Unrecognized,
}

/// Ordered prefix table with at most `M` entries.
pub struct CommandTable<Ctx, const M: usize> {
    entries: heapless::Vec<CommandEntry<Ctx>, M>,
    fallback: Handler<Ctx>,
}

impl<Ctx, const M: usize> CommandTable<Ctx, M> {
    /// Empty table answering `?` to everything.
    pub fn new() -> Self {
        Self {
            entries: heapless::Vec::new(),
            fallback: unrecognized::<Ctx>,
        }
    }

    /// Append an entry after all previously registered ones.
    pub fn register_command(
        &mut self,
        prefix: &'static str,
        handler: Handler<Ctx>,
    ) -> Result<(), CommandError> {
        self.entries
            .push(CommandEntry { prefix, handler })
            .map_err(|_| CommandError::TableFull)
    }

    /// Replace the handler used when nothing matches.
    pub fn set_fallback(&mut self, handler: Handler<Ctx>) {
        self.fallback = handler;
    }

    /// Route `line` to the first matching handler.
    pub fn dispatch(
        &self,
        line: &[u8],
        ctx: &mut Ctx,
        out: &mut dyn ResponseSink,
    ) -> DispatchOutcome {
        for (index, entry) in self.entries.iter().enumerate() {
            if line.starts_with(entry.prefix.as_bytes()) {
                let cmd = ParsedCommand::new(line, entry.prefix);
                (entry.handler)(ctx, &cmd, out);
                return DispatchOutcome::Matched(index);
            }
        }

        let cmd = ParsedCommand::new(line, "");
        (self.fallback)(ctx, &cmd, out);
        DispatchOutcome::Unrecognized
    }

    /// First pair `(earlier, later)` where the earlier prefix makes the
    /// later entry unreachable.
    pub fn find_shadowed(&self) -> Option<(usize, usize)> {
        self.entries.iter().enumerate().find_map(|(later, entry)| {
            self.entries[..later]
                .iter()
                .position(|earlier| entry.prefix.starts_with(earlier.prefix))
                .map(|earlier| (earlier, later))
        })
    }

    /// All prefixes in scan order
    pub fn prefixes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.prefix)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<Ctx, const M: usize> Default for CommandTable<Ctx, M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Default fallback: a single `?`.
pub fn unrecognized<Ctx>(_ctx: &mut Ctx, _cmd: &ParsedCommand<'_>, out: &mut dyn ResponseSink) {
    out.emit(b"?");
}

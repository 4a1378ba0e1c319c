//! Argument splitting for matched command lines
//!
//! The dispatcher matches on the raw prefix; whatever follows it is split
//! on whitespace, max 4 arguments.

use super::CommandError;

/// Maximum number of arguments kept per command.
pub const MAX_ARGS: usize = 4;

/// A command line matched against a table entry.
#[derive(Debug, Clone)]
pub struct ParsedCommand<'a> {
    /// The full line as received (already upper-cased by the editor)
    pub line: &'a [u8],
    /// The table prefix that matched (empty for the fallback handler)
    pub prefix: &'a str,
    /// Whitespace-separated words after the prefix
    pub args: [Option<&'a str>; MAX_ARGS],
}

impl<'a> ParsedCommand<'a> {
    /// Split `line` after `prefix`.
    ///
    /// A remainder that is not UTF-8 yields no arguments; handlers can
    /// still inspect [`rest`](Self::rest).
    pub fn new(line: &'a [u8], prefix: &'a str) -> Self {
        let mut args = [None; MAX_ARGS];
        let rest = line.get(prefix.len()..).unwrap_or(&[]);

        if let Ok(text) = core::str::from_utf8(rest) {
            for (slot, word) in args.iter_mut().zip(text.split_whitespace()) {
                *slot = Some(word);
            }
        }

        Self { line, prefix, args }
    }

    /// Bytes after the prefix
    pub fn rest(&self) -> &'a [u8] {
        self.line.get(self.prefix.len()..).unwrap_or(&[])
    }

    /// Get argument by index (0-based)
    pub fn arg(&self, idx: usize) -> Option<&'a str> {
        self.args.get(idx).copied().flatten()
    }

    /// Number of arguments present
    pub fn arg_count(&self) -> usize {
        self.args.iter().take_while(|a| a.is_some()).count()
    }

    /// Parse argument `idx`, mapping failures to console errors.
    pub fn parse_arg<T: core::str::FromStr>(&self, idx: usize) -> Result<T, CommandError> {
        self.arg(idx)
            .ok_or(CommandError::MissingArg)?
            .parse()
            .map_err(|_| CommandError::InvalidValue)
    }
}

//! Command error types
//!
//! Handlers report their own failures through the response sink; the
//! dispatcher never inspects them.

/// Handler-level failure, printed as `Exx: message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Sub-command or mode the handler does not know
    UnknownCommand,
    /// Argument present but not parseable
    InvalidValue,
    MissingArg,
    /// Parsed, but outside what the peripheral accepts
    OutOfRange,
    /// Registration refused: table capacity reached
    TableFull,
    /// Peripheral driver reported a failure
    Hardware,
}

impl CommandError {
    const fn describe(self) -> (&'static str, &'static str) {
        match self {
            Self::UnknownCommand => ("E01", "unknown command"),
            Self::InvalidValue => ("E02", "invalid value"),
            Self::MissingArg => ("E03", "missing argument"),
            Self::OutOfRange => ("E04", "out of range"),
            Self::TableFull => ("E05", "command table full"),
            Self::Hardware => ("E06", "hardware error"),
        }
    }

    /// Stable code for scripted test rigs.
    pub const fn code(self) -> &'static str {
        self.describe().0
    }

    pub const fn message(self) -> &'static str {
        self.describe().1
    }
}

impl core::fmt::Display for CommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

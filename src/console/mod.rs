//! Serial command console
//!
//! Line editing with history recall, prefix dispatch to board handlers.
//! Zero heap allocation - all buffers sized by const generics.

pub mod console;
pub mod dispatch;
pub mod editor;
pub mod error;
pub mod history;
pub mod line;
pub mod parser;
pub mod sink;

pub use console::{Console, VERSION};
pub use dispatch::{unrecognized, CommandEntry, CommandTable, DispatchOutcome, Handler};
pub use editor::{EditEvent, EditState, LineEditor, Recall};
pub use error::CommandError;
pub use history::History;
pub use line::CommandLine;
pub use parser::{ParsedCommand, MAX_ARGS};
pub use sink::ResponseSink;

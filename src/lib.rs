//! # DmaUartConsole
//!
//! DMA-driven serial transport plus a line-oriented command console.
//!
//! ## Architecture
//!
//! ```text
//! hardware ─▶ DmaBuffer ─▶ RxPump ─▶ inbound queue ─▶ LineEditor ─▶ CommandTable
//!                                                                      │
//! hardware ◀─ TxDma ◀─── TxPump ◀─ outbound queue ◀─ ResponseSink ◀────┘
//! ```
//!
//! - One [`SerialChannel`] per UART, no state shared between channels
//! - Single writer per field: DMA engine owns `head`, [`RxPump`] owns `tail`
//! - The transmit completion signal is the only blocking point
//! - Nothing allocates; every capacity is a const generic

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod console;
pub mod hal;
pub mod log_drain;
pub mod logging;
pub mod stats;
pub mod transport;

pub use config::ChannelConfig;
pub use console::{CommandTable, Console, LineEditor, ParsedCommand, ResponseSink};
pub use hal::{Clock, DmaError, RxDma, TxDma, TxStart};
pub use logging::LOG_STREAM;
pub use stats::{ChannelStats, StatsSnapshot};
pub use transport::{
    ChannelEvents, ChannelParts, ConsoleIo, RxPump, SerialChannel, Timeout, TransportError,
    TxPump,
};

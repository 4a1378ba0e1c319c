//! Module: config
//!
//! Purpose: Per-channel configuration and default capacities.
//!
//! Capacities are `const` generics on the channel and console types so
//! every buffer is statically sized; the defaults here match a small
//! board test channel. Runtime knobs live in [`ChannelConfig`]. Pin
//! assignment is board wiring and stays with the firmware entry point,
//! which owns the typed GPIO peripherals.

use crate::transport::Timeout;

/// Receive ring (circular DMA area) size in bytes.
pub const DEFAULT_RX_RING: usize = 256;

/// Inbound/outbound queue storage (usable depth is one less).
pub const DEFAULT_QUEUE_DEPTH: usize = 256;

/// Largest single transmit transfer.
pub const DEFAULT_TX_BURST: usize = 64;

/// Maximum command line length.
pub const DEFAULT_LINE_SIZE: usize = 64;

/// Number of history entries.
pub const DEFAULT_HISTORY_DEPTH: usize = 4;

/// Maximum number of registered commands.
pub const DEFAULT_MAX_COMMANDS: usize = 32;

/// Runtime configuration of one serial channel.
#[derive(Debug, Clone, Copy)]
pub struct ChannelConfig {
    /// Channel id used in log lines.
    pub channel: u8,
    pub baud_rate: u32,
    /// Pump period when no half/full notification arrives.
    pub poll_period_ms: u32,
    /// Wait bound for the transmit completion signal.
    pub tx_timeout: Timeout,
    /// Printed after every dispatched line; empty disables it.
    pub prompt: &'static str,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            channel: 0,
            baud_rate: 115200,
            poll_period_ms: 20,
            tx_timeout: Timeout::Forever,
            prompt: "> ",
        }
    }
}

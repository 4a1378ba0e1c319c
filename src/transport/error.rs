//! Transport error types

use crate::hal::DmaError;

/// Errors surfaced by the pumps to the task loop that owns them.
///
/// None of these reach the command dispatcher or handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// T01: Completion signal not released within the configured timeout
    TransmitTimeout,
    /// T02: DMA driver refused a request
    Dma(DmaError),
}

impl TransportError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::TransmitTimeout => "T01",
            Self::Dma(_) => "T02",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::TransmitTimeout => "transmit completion timed out",
            Self::Dma(_) => "dma request failed",
        }
    }
}

impl From<DmaError> for TransportError {
    fn from(err: DmaError) -> Self {
        Self::Dma(err)
    }
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Dma(err) => write!(f, "{}: {} ({})", self.code(), self.message(), err),
            _ => write!(f, "{}: {}", self.code(), self.message()),
        }
    }
}

//! ESP-IDF adapters.
//!
//! The ESP32 UART peripheral has no circular DMA with a remaining-count
//! register; the IDF driver moves bytes into its own ring from the UART
//! ISR. [`UartRxAdapter`] copies those bytes into the channel's
//! [`DmaBuffer`](crate::transport::DmaBuffer) and keeps a software count
//! that behaves like the hardware register, so the receive pump runs
//! unchanged. It is the only writer of that memory.
//!
//! Unlike a real engine it knows the pump's read cursor (through
//! [`RxDma::consumed`]) and never writes past it: at most `len - 1` bytes
//! are unread at any time. What does not fit stays in the IDF ring, which
//! applies flow control or counts its own overruns.
//!
//! ```text
//! UART ISR ─▶ IDF ring ─▶ UartRxAdapter::remaining() ─▶ DmaBuffer ─▶ RxPump
//! ```

use core::cell::Cell;

use esp_idf_svc::hal::delay::NON_BLOCK;
use esp_idf_svc::hal::uart::{UartRxDriver, UartTxDriver};
use esp_idf_svc::sys;

use super::{Clock, DmaError, RxDma, TxDma, TxStart};

/// esp_timer time base and FreeRTOS tick delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct EspClock;

impl Clock for EspClock {
    fn now_us(&self) -> i64 {
        // SAFETY: esp_timer_get_time is always safe to call
        unsafe { sys::esp_timer_get_time() }
    }

    fn delay_tick(&mut self) {
        // SAFETY: vTaskDelay is always safe to call from a task
        unsafe { sys::vTaskDelay(1) }
    }
}

/// Circular receive emulation on top of the IDF UART driver.
pub struct UartRxAdapter<'d> {
    uart: UartRxDriver<'d>,
    buf: *mut u8,
    len: usize,
    /// Next write offset in `buf`
    head: Cell<usize>,
    /// Pump read cursor as last reported
    tail: usize,
}

impl<'d> UartRxAdapter<'d> {
    pub fn new(uart: UartRxDriver<'d>) -> Self {
        Self {
            uart,
            buf: core::ptr::null_mut(),
            len: 0,
            head: Cell::new(0),
            tail: 0,
        }
    }

    /// Unread bytes between the pump's cursor and `head`.
    fn unread(&self) -> usize {
        (self.head.get() + self.len - self.tail) % self.len
    }

    /// Copy what the IDF driver holds, up to the free part of the ring.
    fn fill(&self) {
        if self.buf.is_null() {
            return;
        }

        // One slot stays empty: head == tail means nothing unread.
        let mut budget = self.len - 1 - self.unread();
        while budget > 0 {
            let head = self.head.get();
            let chunk = budget.min(self.len - head);

            // SAFETY: `buf[..len]` was handed over in start_receive and the
            // pump never writes it; `head + chunk <= len` and the chunk
            // ends before the pump's cursor.
            let dst = unsafe { core::slice::from_raw_parts_mut(self.buf.add(head), chunk) };
            let n = match self.uart.read(dst, NON_BLOCK) {
                Ok(n) => n,
                Err(_) => 0,
            };
            if n == 0 {
                break;
            }

            self.head.set((head + n) % self.len);
            budget -= n;
        }
    }
}

impl RxDma for UartRxAdapter<'_> {
    fn remaining(&self) -> usize {
        self.fill();
        self.len - self.head.get()
    }

    fn start_receive(&mut self, buf: *mut u8, len: usize) -> Result<(), DmaError> {
        if buf.is_null() || len == 0 {
            return Err(DmaError::InvalidBuffer);
        }
        self.buf = buf;
        self.len = len;
        self.head.set(0);
        self.tail = 0;
        Ok(())
    }

    fn consumed(&mut self, tail: usize) {
        self.tail = tail;
    }
}

/// Buffered transmit through the IDF UART driver.
///
/// `write` copies into the driver's TX ring and returns, so every request
/// completes synchronously.
pub struct UartTxAdapter<'d> {
    uart: UartTxDriver<'d>,
}

impl<'d> UartTxAdapter<'d> {
    pub fn new(uart: UartTxDriver<'d>) -> Self {
        Self { uart }
    }
}

impl TxDma for UartTxAdapter<'_> {
    fn start_transmit(&mut self, bytes: &[u8]) -> Result<TxStart, DmaError> {
        let mut sent = 0;
        while sent < bytes.len() {
            sent += self
                .uart
                .write(&bytes[sent..])
                .map_err(|e| DmaError::Driver(e.code()))?;
        }
        Ok(TxStart::Completed)
    }
}

//! Simulated UART hardware for host tests

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use dma_uart_console::{Clock, DmaError, ResponseSink, RxDma, TxDma, TxStart};

/// Line side of a simulated circular receive DMA.
///
/// Tests keep one handle and push bytes; the pump owns a [`SimRxDma`]
/// pointing at the same state.
#[derive(Default)]
pub struct SimRxLine {
    buf: Cell<Option<*mut u8>>,
    len: Cell<usize>,
    head: Cell<usize>,
    /// Read cursor last reported by the pump.
    consumed: Cell<usize>,
    /// Count register override, used to fake a mid-reload read.
    forced_remaining: Cell<Option<usize>>,
}

impl SimRxLine {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Write bytes into the armed area like the DMA engine would.
    pub fn receive(&self, bytes: &[u8]) {
        let buf = self.buf.get().expect("receive before start_receive");
        let len = self.len.get();
        for &b in bytes {
            let head = self.head.get();
            // SAFETY: the area was armed with `len` bytes and outlives the test.
            unsafe { buf.add(head).write_volatile(b) };
            self.head.set((head + 1) % len);
        }
    }

    /// Write bytes like a software copier that respects the pump's cursor:
    /// stops once `len - 1` bytes are unread. Returns how many were taken.
    pub fn offer(&self, bytes: &[u8]) -> usize {
        let len = self.len.get();
        let unread = (self.head.get() + len - self.consumed.get()) % len;
        let take = bytes.len().min(len - 1 - unread);
        self.receive(&bytes[..take]);
        take
    }

    pub fn force_remaining(&self, remaining: Option<usize>) {
        self.forced_remaining.set(remaining);
    }

    pub fn head(&self) -> usize {
        self.head.get()
    }

    pub fn consumed(&self) -> usize {
        self.consumed.get()
    }
}

/// Pump-side handle to a [`SimRxLine`].
pub struct SimRxDma(pub Rc<SimRxLine>);

impl RxDma for SimRxDma {
    fn remaining(&self) -> usize {
        if let Some(forced) = self.0.forced_remaining.get() {
            return forced;
        }
        self.0.len.get() - self.0.head.get()
    }

    fn start_receive(&mut self, buf: *mut u8, len: usize) -> Result<(), DmaError> {
        if buf.is_null() || len == 0 {
            return Err(DmaError::InvalidBuffer);
        }
        self.0.buf.set(Some(buf));
        self.0.len.set(len);
        self.0.head.set(0);
        self.0.consumed.set(0);
        Ok(())
    }

    fn consumed(&mut self, tail: usize) {
        self.0.consumed.set(tail);
    }
}

/// How the simulated transmitter answers a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    /// Transfer stays in flight until the test completes it
    Async,
    /// Driver copies synchronously
    Sync,
}

/// Recording transmit DMA.
pub struct SimTxLine {
    pub mode: Cell<TxMode>,
    pub transfers: RefCell<Vec<Vec<u8>>>,
    pub in_flight: Cell<usize>,
    pub max_in_flight: Cell<usize>,
    /// Refuse the next start request with this error.
    pub fail_next: Cell<Option<DmaError>>,
}

impl SimTxLine {
    pub fn new(mode: TxMode) -> Rc<Self> {
        Rc::new(Self {
            mode: Cell::new(mode),
            transfers: RefCell::new(Vec::new()),
            in_flight: Cell::new(0),
            max_in_flight: Cell::new(0),
            fail_next: Cell::new(None),
        })
    }

    /// Hardware side of a completion interrupt.
    pub fn finish(&self) {
        self.in_flight.set(self.in_flight.get().saturating_sub(1));
    }

    /// Every transmitted byte in order.
    pub fn wire(&self) -> Vec<u8> {
        self.transfers.borrow().concat()
    }
}

/// Pump-side handle to a [`SimTxLine`].
pub struct SimTxDma(pub Rc<SimTxLine>);

impl TxDma for SimTxDma {
    fn start_transmit(&mut self, bytes: &[u8]) -> Result<TxStart, DmaError> {
        if let Some(err) = self.0.fail_next.take() {
            return Err(err);
        }

        self.0.transfers.borrow_mut().push(bytes.to_vec());
        match self.0.mode.get() {
            TxMode::Async => {
                let n = self.0.in_flight.get() + 1;
                self.0.in_flight.set(n);
                self.0.max_in_flight.set(self.0.max_in_flight.get().max(n));
                Ok(TxStart::Pending)
            }
            TxMode::Sync => {
                self.0.max_in_flight.set(self.0.max_in_flight.get().max(1));
                Ok(TxStart::Completed)
            }
        }
    }
}

/// Manual clock; every yield advances one 1 ms tick.
#[derive(Clone, Default)]
pub struct FakeClock {
    now: Rc<Cell<i64>>,
    pub ticks: Rc<Cell<u32>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for FakeClock {
    fn now_us(&self) -> i64 {
        self.now.get()
    }

    fn delay_tick(&mut self) {
        self.now.set(self.now.get() + 1000);
        self.ticks.set(self.ticks.get() + 1);
    }
}

/// Unbounded capture sink.
#[derive(Default)]
pub struct Capture(pub Vec<u8>);

impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl ResponseSink for Capture {
    fn emit(&mut self, bytes: &[u8]) -> usize {
        self.0.extend_from_slice(bytes);
        bytes.len()
    }
}

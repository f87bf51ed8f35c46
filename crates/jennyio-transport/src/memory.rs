use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::{ConnectionState, Transport, TransportEvent};

/// An in-process transport with no I/O behind it.
///
/// Clones share state, so a caller can hand one clone to a multiplexer and
/// keep another as a probe: inspect what was sent, and manufacture the events
/// a real connection would produce.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    inner: Rc<RefCell<MemoryInner>>,
}

#[derive(Debug)]
struct MemoryInner {
    state: ConnectionState,
    sent: Vec<String>,
    dropped: Vec<String>,
    close_requested: bool,
}

impl MemoryTransport {
    /// Create a transport in the `Connecting` phase.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemoryInner {
                state: ConnectionState::Connecting,
                sent: Vec::new(),
                dropped: Vec::new(),
                close_requested: false,
            })),
        }
    }

    /// Complete the handshake and return the matching event.
    ///
    /// Has no effect once closed; the returned event is still `Open` so the
    /// caller can check that late opens are ignored downstream.
    pub fn open(&self) -> TransportEvent {
        let mut inner = self.inner.borrow_mut();
        if inner.state == ConnectionState::Connecting {
            inner.state = ConnectionState::Open;
        }
        TransportEvent::Open
    }

    /// Produce an inbound text frame.
    pub fn deliver(&self, text: impl Into<String>) -> TransportEvent {
        TransportEvent::Text(text.into())
    }

    /// Simulate the remote side closing the connection.
    pub fn remote_close(&self, code: u16, reason: &str) -> TransportEvent {
        self.inner.borrow_mut().state = ConnectionState::Closed;
        TransportEvent::Closed {
            code: Some(code),
            reason: reason.to_string(),
        }
    }

    /// Frames accepted while open, in send order.
    pub fn sent(&self) -> Vec<String> {
        self.inner.borrow().sent.clone()
    }

    /// Drain the accepted frames.
    pub fn take_sent(&self) -> Vec<String> {
        std::mem::take(&mut self.inner.borrow_mut().sent)
    }

    /// Frames rejected because the connection was not open.
    pub fn dropped(&self) -> Vec<String> {
        self.inner.borrow().dropped.clone()
    }

    /// Whether `close()` has been called.
    pub fn close_requested(&self) -> bool {
        self.inner.borrow().close_requested
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MemoryTransport {
    fn send_text(&self, text: String) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        match inner.state {
            ConnectionState::Open => {
                inner.sent.push(text);
                Ok(())
            }
            ConnectionState::Connecting => {
                inner.dropped.push(text);
                Err(TransportError::NotOpen)
            }
            ConnectionState::Closed => {
                inner.dropped.push(text);
                Err(TransportError::Closed)
            }
        }
    }

    fn close(&self) {
        let mut inner = self.inner.borrow_mut();
        if !inner.close_requested {
            debug!(state = %inner.state, "closing memory transport");
        }
        inner.close_requested = true;
        inner.state = ConnectionState::Closed;
    }

    fn state(&self) -> ConnectionState {
        self.inner.borrow().state
    }
}

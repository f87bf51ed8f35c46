use std::fmt;

use crate::error::Result;

/// Lifecycle phase of a connection.
///
/// Phases only move forward: `Connecting -> Open -> Closed`, or straight from
/// `Connecting` to `Closed` when the handshake fails. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

impl ConnectionState {
    pub fn is_open(self) -> bool {
        self == ConnectionState::Open
    }

    pub fn is_closed(self) -> bool {
        self == ConnectionState::Closed
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Something that happened on the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The handshake completed; frames may now be sent.
    Open,
    /// An inbound text frame.
    Text(String),
    /// A transport-level failure. A `Closed` event follows.
    Error(String),
    /// The connection is gone for good.
    Closed { code: Option<u16>, reason: String },
}

/// A single persistent bidirectional text connection.
///
/// Sends are fire-and-forget: `send_text` returns as soon as the frame has
/// been handed to the connection. A frame offered while the connection is not
/// open is rejected with [`TransportError::NotOpen`](crate::TransportError::NotOpen)
/// and is not queued.
pub trait Transport {
    /// Hand one text frame to the connection.
    fn send_text(&self, text: String) -> Result<()>;

    /// Begin closing the connection. Idempotent.
    fn close(&self);

    /// Current lifecycle phase as seen by the transport.
    fn state(&self) -> ConnectionState;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send_text(&self, text: String) -> Result<()> {
        (**self).send_text(text)
    }

    fn close(&self) {
        (**self).close()
    }

    fn state(&self) -> ConnectionState {
        (**self).state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_display_names() {
        assert_eq!(ConnectionState::Connecting.to_string(), "connecting");
        assert_eq!(ConnectionState::Open.to_string(), "open");
        assert_eq!(ConnectionState::Closed.to_string(), "closed");
    }

    #[test]
    fn state_predicates() {
        assert!(ConnectionState::Open.is_open());
        assert!(!ConnectionState::Connecting.is_open());
        assert!(ConnectionState::Closed.is_closed());
        assert!(!ConnectionState::Open.is_closed());
    }
}

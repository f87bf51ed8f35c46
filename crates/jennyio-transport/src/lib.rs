//! Connection abstraction for the jennyio channel protocol.
//!
//! A transport carries JSON text frames between the console page and the
//! server's `/io/io` endpoint. Two implementations are provided:
//! - [`MemoryTransport`] records outbound frames and lets the caller drive
//!   the connection phases by hand
//! - `WsTransport` (feature `ws`) speaks WebSocket via `tokio-tungstenite`
//!
//! This is the lowest layer of jennyio. Everything else builds on the
//! [`Transport`] trait provided here.

pub mod error;
pub mod memory;
pub mod traits;

#[cfg(feature = "ws")]
pub mod ws;

pub use error::{Result, TransportError};
pub use memory::MemoryTransport;
pub use traits::{ConnectionState, Transport, TransportEvent};

#[cfg(feature = "ws")]
pub use ws::{EventReceiver, WsTransport};

//! Publish/subscribe channel client for the administration console.
//!
//! jennyio multiplexes named channels over the single WebSocket a console page
//! keeps open to `/io/io`: subscribe to a channel, publish to it, and let the
//! server push `message` and `reload` envelopes back.
//!
//! # Crate Structure
//!
//! - [`transport`]: Connection abstraction (in-memory, WebSocket)
//! - [`envelope`]: JSON envelope codec
//! - [`client`]: Channel multiplexer (behind `client` feature)

/// Re-export transport types.
pub mod transport {
    pub use jennyio_transport::*;
}

/// Re-export envelope types.
pub mod envelope {
    pub use jennyio_envelope::*;
}

/// Re-export client types (requires `client` feature).
#[cfg(feature = "client")]
pub mod client {
    pub use jennyio_client::*;
}

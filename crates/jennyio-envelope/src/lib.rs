//! JSON envelope codec for the jennyio channel protocol.
//!
//! Every text frame on the connection is one JSON object with a `type`
//! discriminator:
//! - `reload` asks the page to reload itself
//! - `message` carries a `channel` name and an opaque `data` value
//! - `subscribe` / `unsubscribe` carry a `channel` name
//!
//! Decoding never panics; anything that is not one of the four shapes comes
//! back as an [`EnvelopeError`].

pub mod envelope;
pub mod error;
pub mod kind;

pub use envelope::{decode, encode, Envelope};
pub use error::{EnvelopeError, Result};
pub use kind::{MESSAGE, RELOAD, SUBSCRIBE, UNSUBSCRIBE};

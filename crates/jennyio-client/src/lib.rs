//! Channel-multiplexing publish/subscribe client.
//!
//! One [`ChannelMultiplexer`] owns one connection to the console's `/io/io`
//! endpoint and routes inbound `message` envelopes to per-channel handlers.
//! Subscribing, unsubscribing and publishing are fire-and-forget.
//!
//! ```ignore
//! let page = StaticPage::new(Url::parse("https://console.example:8443/app")?);
//! let (io, mut events) = jennyio_client::connect(page)?;
//! io.on_ready(|io| {
//!     io.subscribe("jobs.export", |data| println!("progress {data}"));
//! });
//! io.run(&mut events).await;
//! ```

#[cfg(feature = "ws")]
pub mod connector;
pub mod endpoint;
pub mod error;
pub mod handlers;
pub mod multiplexer;
pub mod page;
pub mod ready;

#[cfg(feature = "ws")]
pub use connector::{connect, connect_with_config};
pub use endpoint::{derive_endpoint, ClientConfig, DEFAULT_PATH, DEFAULT_PROTOCOL};
pub use error::{ClientError, Result};
pub use handlers::{Handler, HandlerTable, Lookup};
pub use jennyio_transport::{ConnectionState, TransportEvent};
pub use multiplexer::{ChannelMultiplexer, Dispatch, Subscription};
pub use page::{Page, StaticPage};
pub use ready::{ReadyCallback, ReadyQueue};

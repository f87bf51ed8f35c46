use jennyio_transport::{EventReceiver, WsTransport};
use tracing::info;

use crate::endpoint::{derive_endpoint, ClientConfig};
use crate::error::Result;
use crate::multiplexer::ChannelMultiplexer;
use crate::page::Page;

/// Connect a page to its console's channel endpoint.
///
/// The connection starts immediately; the returned multiplexer is in the
/// `Connecting` phase. Drive it by passing the event receiver to
/// [`ChannelMultiplexer::run`]. Must be called from within a Tokio runtime.
pub fn connect(page: impl Page + 'static) -> Result<(ChannelMultiplexer, EventReceiver)> {
    connect_with_config(page, &ClientConfig::default())
}

/// Connect with explicit configuration.
pub fn connect_with_config(
    page: impl Page + 'static,
    config: &ClientConfig,
) -> Result<(ChannelMultiplexer, EventReceiver)> {
    let endpoint = derive_endpoint(page.location(), config)?;
    let (transport, events) = WsTransport::connect(&endpoint, &config.protocol)?;
    info!(%endpoint, protocol = %config.protocol, "channel connection started");
    Ok((ChannelMultiplexer::new(transport, page), events))
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::error::ClientError;
    use crate::page::StaticPage;

    #[test]
    fn connect_rejects_non_web_page_before_spawning() {
        let page = StaticPage::new(Url::parse("file:///srv/index.html").unwrap());
        assert!(matches!(
            connect(page),
            Err(ClientError::UnsupportedScheme(_))
        ));
    }

    #[tokio::test]
    async fn connect_starts_in_connecting_phase() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let page = StaticPage::new(Url::parse(&format!("http://{addr}/console")).unwrap());

        let (io, _events) = connect(page).expect("connect should start");
        assert_eq!(io.state(), jennyio_transport::ConnectionState::Connecting);
        assert!(!io.is_ready());
        drop(listener);
    }
}

use url::Url;

use crate::error::{ClientError, Result};

/// Path of the channel endpoint on the console host.
pub const DEFAULT_PATH: &str = "/io/io";

/// WebSocket sub-protocol token offered during the handshake.
pub const DEFAULT_PROTOCOL: &str = "monitor";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Endpoint path, appended to the page's host.
    pub path: String,
    /// Sub-protocol token.
    pub protocol: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_PATH.to_string(),
            protocol: DEFAULT_PROTOCOL.to_string(),
        }
    }
}

/// Derive the WebSocket endpoint for a page.
///
/// The endpoint reuses the page's security level (`https` pages get `wss`,
/// `http` pages get `ws`) and its host and port. The page's own path, query
/// and fragment are not carried over.
pub fn derive_endpoint(page: &Url, config: &ClientConfig) -> Result<Url> {
    let scheme = match page.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => return Err(ClientError::UnsupportedScheme(other.to_string())),
    };
    let host = page
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| ClientError::MissingHost(page.to_string()))?;

    let authority = match page.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    let path = if config.path.starts_with('/') {
        config.path.clone()
    } else {
        format!("/{}", config.path)
    };

    Ok(Url::parse(&format!("{scheme}://{authority}{path}"))?)
}

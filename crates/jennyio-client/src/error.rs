/// Errors that can occur in client operations.
///
/// None of these reach subscriber callbacks. They are returned from
/// construction and from the typed send helpers only; connection and dispatch
/// problems at runtime are logged.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] jennyio_transport::TransportError),

    /// Envelope-level error.
    #[error("envelope error: {0}")]
    Envelope(#[from] jennyio_envelope::EnvelopeError),

    /// A payload could not be converted to JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The endpoint URL could not be built.
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// The page was not loaded over a scheme the endpoint can be derived from.
    #[error("unsupported page scheme '{0}'")]
    UnsupportedScheme(String),

    /// The page URL has no host to connect back to.
    #[error("page url has no host: {0}")]
    MissingHost(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

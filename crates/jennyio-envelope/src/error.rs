/// Errors that can occur during envelope encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// The frame is not a JSON object of the expected shape.
    #[error("malformed envelope: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The object has no `type` field.
    #[error("envelope has no type")]
    MissingType,

    /// The `type` field names a message kind this client does not know.
    #[error("unknown envelope type '{0}'")]
    UnknownType(String),

    /// A channel-scoped envelope arrived without a `channel` field.
    #[error("{kind} envelope has no channel")]
    MissingChannel { kind: &'static str },

    /// The envelope could not be serialized.
    #[error("envelope encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EnvelopeError>;

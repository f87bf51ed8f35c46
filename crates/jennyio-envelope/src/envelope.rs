use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::error::{EnvelopeError, Result};
use crate::kind::{self, MESSAGE, RELOAD, SUBSCRIBE, UNSUBSCRIBE};

/// One protocol message.
///
/// Wire format (one JSON object per text frame, fields in this order):
/// ```text
/// { "type": "reload" }
/// { "type": "message",     "channel": "<string>", "data": <any> }
/// { "type": "subscribe",   "channel": "<string>" }
/// { "type": "unsubscribe", "channel": "<string>" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Envelope {
    Reload,
    Message { channel: String, data: Value },
    Subscribe { channel: String },
    Unsubscribe { channel: String },
}

impl Envelope {
    /// Create a `message` envelope.
    pub fn message(channel: impl Into<String>, data: Value) -> Self {
        Self::Message {
            channel: channel.into(),
            data,
        }
    }

    /// Create a `subscribe` envelope.
    pub fn subscribe(channel: impl Into<String>) -> Self {
        Self::Subscribe {
            channel: channel.into(),
        }
    }

    /// Create an `unsubscribe` envelope.
    pub fn unsubscribe(channel: impl Into<String>) -> Self {
        Self::Unsubscribe {
            channel: channel.into(),
        }
    }

    /// The `type` discriminator of this envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::Reload => RELOAD,
            Envelope::Message { .. } => MESSAGE,
            Envelope::Subscribe { .. } => SUBSCRIBE,
            Envelope::Unsubscribe { .. } => UNSUBSCRIBE,
        }
    }

    /// The channel this envelope is scoped to, if any.
    pub fn channel(&self) -> Option<&str> {
        match self {
            Envelope::Reload => None,
            Envelope::Message { channel, .. }
            | Envelope::Subscribe { channel }
            | Envelope::Unsubscribe { channel } => Some(channel),
        }
    }
}

/// Loosely-typed view of an inbound object, so a bad `type` can be told
/// apart from bad JSON.
#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    channel: Value,
    #[serde(default)]
    data: Value,
}

fn scoped_kind(kind: &str) -> &'static str {
    match kind {
        MESSAGE => MESSAGE,
        SUBSCRIBE => SUBSCRIBE,
        _ => UNSUBSCRIBE,
    }
}

/// Encode an envelope as a JSON text frame.
pub fn encode(envelope: &Envelope) -> Result<String> {
    serde_json::to_string(envelope).map_err(EnvelopeError::Encode)
}

/// Decode a JSON text frame.
///
/// A `message` without `data` decodes with `data: null`. Unknown extra
/// fields, and fields a kind does not use, are ignored.
pub fn decode(text: &str) -> Result<Envelope> {
    let raw: RawEnvelope = serde_json::from_str(text).map_err(EnvelopeError::Malformed)?;
    let kind = raw.kind.ok_or(EnvelopeError::MissingType)?;
    if !kind::is_known(&kind) {
        return Err(EnvelopeError::UnknownType(kind));
    }

    if !kind::is_channel_scoped(&kind) {
        trace!(kind = %kind, "decoded envelope");
        return Ok(Envelope::Reload);
    }

    let channel: String = match raw.channel {
        Value::Null => {
            return Err(EnvelopeError::MissingChannel {
                kind: scoped_kind(&kind),
            })
        }
        other => serde_json::from_value(other).map_err(EnvelopeError::Malformed)?,
    };
    let envelope = match kind.as_str() {
        MESSAGE => Envelope::Message {
            channel,
            data: raw.data,
        },
        SUBSCRIBE => Envelope::Subscribe { channel },
        _ => Envelope::Unsubscribe { channel },
    };
    trace!(kind = envelope.kind(), channel = ?envelope.channel(), "decoded envelope");
    Ok(envelope)
}

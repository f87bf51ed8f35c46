//! Envelope `type` discriminators.

/// Server asks the page to reload from its current location.
pub const RELOAD: &str = "reload";

/// Payload routed to a channel.
pub const MESSAGE: &str = "message";

/// Client registers interest in a channel.
pub const SUBSCRIBE: &str = "subscribe";

/// Client drops interest in a channel.
pub const UNSUBSCRIBE: &str = "unsubscribe";

/// Returns true if `kind` is one of the four known discriminators.
pub fn is_known(kind: &str) -> bool {
    matches!(kind, RELOAD | MESSAGE | SUBSCRIBE | UNSUBSCRIBE)
}

/// Returns true if envelopes of this kind carry a `channel` field.
pub fn is_channel_scoped(kind: &str) -> bool {
    matches!(kind, MESSAGE | SUBSCRIBE | UNSUBSCRIBE)
}

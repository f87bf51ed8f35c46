use std::cell::{Cell, RefCell};
use std::fmt;

use jennyio_envelope::{decode, encode, Envelope, EnvelopeError};
use jennyio_transport::{ConnectionState, Transport, TransportEvent};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::handlers::{self, Handler, HandlerTable, Lookup};
use crate::page::Page;
use crate::ready::ReadyQueue;

/// What happened to one inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A channel handler ran.
    Delivered,
    /// The channel was unsubscribed; the message was dropped.
    Disabled,
    /// Nobody ever subscribed to the channel; the message was dropped.
    NoHandler,
    /// The page was asked to reload.
    Reloaded,
    /// The envelope was valid JSON but not something a client acts on.
    Ignored,
    /// The frame could not be decoded.
    Malformed,
}

/// One connection, many named channels.
///
/// All methods take `&self` and return immediately. Inbound frames are fed in
/// through [`handle_event`](Self::handle_event) (or [`run`](Self::run)), one at
/// a time, so handlers never run concurrently with each other or with
/// `subscribe`/`send`. Handlers and ready callbacks may call back into the
/// multiplexer.
pub struct ChannelMultiplexer {
    transport: Box<dyn Transport>,
    page: Box<dyn Page>,
    state: Cell<ConnectionState>,
    handlers: RefCell<HandlerTable>,
    ready: RefCell<ReadyQueue>,
}

impl ChannelMultiplexer {
    /// Build a multiplexer over an already-connecting transport.
    pub fn new(transport: impl Transport + 'static, page: impl Page + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            page: Box::new(page),
            state: Cell::new(ConnectionState::Connecting),
            handlers: RefCell::new(HandlerTable::new()),
            ready: RefCell::new(ReadyQueue::new()),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// True once the connection has opened (and until it closes).
    pub fn is_ready(&self) -> bool {
        self.state.get().is_open()
    }

    pub fn page(&self) -> &dyn Page {
        self.page.as_ref()
    }

    /// Run `callback` once the connection is usable.
    ///
    /// If the connection is already open the callback runs right here, before
    /// this call returns. Otherwise it is queued and runs when the connection
    /// opens, after every callback registered before it. A callback registered
    /// after the connection closed never runs.
    pub fn on_ready(&self, callback: impl FnOnce(&ChannelMultiplexer) + 'static) {
        match self.state.get() {
            ConnectionState::Open => callback(self),
            ConnectionState::Connecting => self.ready.borrow_mut().push(Box::new(callback)),
            ConnectionState::Closed => debug!("connection closed, ready callback discarded"),
        }
    }

    /// Route messages for `channel` to `handler` and tell the server.
    ///
    /// Replaces any handler already registered for `channel`. The subscribe
    /// envelope is sent whatever the connection state; if the connection is
    /// not open yet it is lost, so subscribe from an [`on_ready`](Self::on_ready)
    /// callback.
    pub fn subscribe(
        &self,
        channel: &str,
        handler: impl FnMut(Value) + 'static,
    ) -> Subscription<'_> {
        let replaced = self
            .handlers
            .borrow_mut()
            .insert(channel, handlers::handler(handler));
        if replaced {
            debug!(channel, "replaced existing handler");
        }
        self.transmit(Envelope::subscribe(channel));
        Subscription {
            multiplexer: self,
            channel: channel.to_string(),
        }
    }

    /// Stop routing messages for `channel` and tell the server.
    pub fn unsubscribe(&self, channel: &str) {
        if !self.handlers.borrow_mut().disable(channel) {
            debug!(channel, "unsubscribing channel with no active handler");
        }
        self.transmit(Envelope::unsubscribe(channel));
    }

    /// Publish `data` on `channel`.
    ///
    /// No local handler is consulted and nothing is echoed back locally.
    pub fn send(&self, channel: &str, data: Value) {
        self.transmit(Envelope::message(channel, data));
    }

    /// Publish any serializable payload on `channel`.
    pub fn send_json<T: Serialize + ?Sized>(&self, channel: &str, data: &T) -> Result<()> {
        let data = serde_json::to_value(data)?;
        self.send(channel, data);
        Ok(())
    }

    pub fn is_subscribed(&self, channel: &str) -> bool {
        self.handlers.borrow().is_active(channel)
    }

    /// Channels with an active handler, sorted.
    pub fn subscriptions(&self) -> Vec<String> {
        let handlers = self.handlers.borrow();
        let mut channels: Vec<String> = handlers.active_channels().map(str::to_string).collect();
        channels.sort_unstable();
        channels
    }

    /// Feed one transport event through the multiplexer.
    ///
    /// Returns the dispatch outcome for inbound text frames, `None` for
    /// lifecycle events.
    pub fn handle_event(&self, event: TransportEvent) -> Option<Dispatch> {
        match event {
            TransportEvent::Open => {
                self.opened();
                None
            }
            TransportEvent::Text(text) => Some(self.dispatch(&text)),
            TransportEvent::Error(message) => {
                error!(error = %message, "connection error");
                None
            }
            TransportEvent::Closed { code, reason } => {
                self.closed(code, &reason);
                None
            }
        }
    }

    /// Decode one inbound frame and act on it.
    pub fn dispatch(&self, text: &str) -> Dispatch {
        let envelope = match decode(text) {
            Ok(envelope) => envelope,
            Err(EnvelopeError::UnknownType(kind)) => {
                warn!(kind = %kind, "no handler for message type");
                return Dispatch::Ignored;
            }
            Err(err) => {
                warn!(error = %err, "dropping malformed envelope");
                return Dispatch::Malformed;
            }
        };

        match envelope {
            Envelope::Reload => {
                self.page.reload();
                Dispatch::Reloaded
            }
            Envelope::Message { channel, data } => self.deliver(&channel, data),
            other => {
                warn!(
                    kind = other.kind(),
                    channel = ?other.channel(),
                    "ignoring client-side envelope from server"
                );
                Dispatch::Ignored
            }
        }
    }

    /// Pump events until the connection closes or the stream ends.
    #[cfg(feature = "ws")]
    pub async fn run(&self, events: &mut jennyio_transport::EventReceiver) {
        while let Some(event) = events.recv().await {
            let closed = matches!(event, TransportEvent::Closed { .. });
            self.handle_event(event);
            if closed {
                break;
            }
        }
        debug!("event stream finished");
    }

    /// Close the connection. No reconnect follows.
    pub fn close(&self) {
        if self.state.replace(ConnectionState::Closed) != ConnectionState::Closed {
            info!("closing connection");
            self.ready.borrow_mut().drain();
        }
        self.transport.close();
    }

    fn opened(&self) {
        match self.state.get() {
            ConnectionState::Connecting => {}
            ConnectionState::Open => {
                debug!("duplicate open event ignored");
                return;
            }
            ConnectionState::Closed => {
                warn!("open event after close ignored");
                return;
            }
        }

        self.state.set(ConnectionState::Open);
        let callbacks = self.ready.borrow_mut().drain();
        info!(ready_callbacks = callbacks.len(), "connection open");
        let mut callbacks = callbacks.into_iter();
        while let Some(callback) = callbacks.next() {
            if self.state.get().is_closed() {
                debug!(
                    discarded = callbacks.len() + 1,
                    "connection closed during ready callbacks"
                );
                break;
            }
            callback(self);
        }
    }

    fn closed(&self, code: Option<u16>, reason: &str) {
        if self.state.replace(ConnectionState::Closed) == ConnectionState::Closed {
            debug!(?code, reason, "connection close confirmed");
            return;
        }
        let discarded = self.ready.borrow_mut().drain();
        info!(
            ?code,
            reason,
            discarded_ready_callbacks = discarded.len(),
            "connection closed"
        );
    }

    fn deliver(&self, channel: &str, data: Value) -> Dispatch {
        let lookup = self.handlers.borrow().lookup(channel);
        match lookup {
            Lookup::Active(handler) => invoke(channel, &handler, data),
            Lookup::Disabled => {
                debug!(channel, "dropping message for unsubscribed channel");
                Dispatch::Disabled
            }
            Lookup::Missing => {
                warn!(channel, "no handler for channel");
                Dispatch::NoHandler
            }
        }
    }

    fn transmit(&self, envelope: Envelope) {
        let text = match encode(&envelope) {
            Ok(text) => text,
            Err(err) => {
                warn!(kind = envelope.kind(), error = %err, "dropping unencodable envelope");
                return;
            }
        };
        match self.transport.send_text(text) {
            Ok(()) => debug!(kind = envelope.kind(), channel = ?envelope.channel(), "sent envelope"),
            Err(err) => warn!(
                kind = envelope.kind(),
                channel = ?envelope.channel(),
                error = %err,
                "envelope not sent"
            ),
        }
    }
}

fn invoke(channel: &str, handler: &Handler, data: Value) -> Dispatch {
    match handler.try_borrow_mut() {
        Ok(mut callback) => {
            (*callback)(data);
            Dispatch::Delivered
        }
        Err(_) => {
            warn!(channel, "handler is already running, message dropped");
            Dispatch::Ignored
        }
    }
}

impl Drop for ChannelMultiplexer {
    fn drop(&mut self) {
        self.transport.close();
    }
}

impl fmt::Debug for ChannelMultiplexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelMultiplexer")
            .field("state", &self.state.get())
            .field("handlers", &*self.handlers.borrow())
            .field("ready", &*self.ready.borrow())
            .finish_non_exhaustive()
    }
}

/// Handle returned by [`ChannelMultiplexer::subscribe`], bound to one channel.
#[derive(Clone)]
pub struct Subscription<'a> {
    multiplexer: &'a ChannelMultiplexer,
    channel: String,
}

impl Subscription<'_> {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn unsubscribe(&self) {
        self.multiplexer.unsubscribe(&self.channel);
    }

    pub fn send(&self, data: Value) {
        self.multiplexer.send(&self.channel, data);
    }

    pub fn send_json<T: Serialize + ?Sized>(&self, data: &T) -> Result<()> {
        self.multiplexer.send_json(&self.channel, data)
    }
}

impl fmt::Debug for Subscription<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .finish()
    }
}

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::frame::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Result, TransportError};
use crate::traits::{ConnectionState, Transport, TransportEvent};

const SUBPROTOCOL_HEADER: &str = "Sec-WebSocket-Protocol";

const CONNECTING: u8 = 0;
const OPEN: u8 = 1;
const CLOSED: u8 = 2;

/// Normal closure status code.
const CLOSE_NORMAL: u16 = 1000;

/// Receiving half of a WebSocket connection's event stream.
pub type EventReceiver = mpsc::UnboundedReceiver<TransportEvent>;

enum Command {
    Text(String),
    Close,
}

/// WebSocket transport backed by a `tokio-tungstenite` I/O task.
///
/// The socket itself lives on a spawned task. This handle only enqueues
/// outbound frames; everything the socket observes comes back through the
/// [`EventReceiver`] returned by [`WsTransport::connect`].
#[derive(Debug, Clone)]
pub struct WsTransport {
    commands: mpsc::UnboundedSender<Command>,
    state: Arc<AtomicU8>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Text(text) => f.debug_tuple("Text").field(&text.len()).finish(),
            Command::Close => f.write_str("Close"),
        }
    }
}

impl WsTransport {
    /// Start connecting to `endpoint`, offering `protocol` as sub-protocol.
    ///
    /// Returns immediately; the handshake runs on a spawned task and its
    /// outcome arrives as an `Open` or `Error` + `Closed` event. Must be called
    /// from within a Tokio runtime.
    pub fn connect(endpoint: &Url, protocol: &str) -> Result<(Self, EventReceiver)> {
        let request = build_request(endpoint, protocol)?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let state = Arc::new(AtomicU8::new(CONNECTING));

        debug!(%endpoint, protocol, "connecting websocket");
        tokio::spawn(run_socket(request, state.clone(), command_rx, event_tx));

        Ok((
            Self {
                commands: command_tx,
                state,
            },
            event_rx,
        ))
    }
}

impl Transport for WsTransport {
    fn send_text(&self, text: String) -> Result<()> {
        match decode_state(self.state.load(Ordering::Acquire)) {
            ConnectionState::Connecting => Err(TransportError::NotOpen),
            ConnectionState::Closed => Err(TransportError::Closed),
            ConnectionState::Open => self
                .commands
                .send(Command::Text(text))
                .map_err(|_| TransportError::Closed),
        }
    }

    fn close(&self) {
        if self.state.swap(CLOSED, Ordering::AcqRel) != CLOSED {
            let _ = self.commands.send(Command::Close);
        }
    }

    fn state(&self) -> ConnectionState {
        decode_state(self.state.load(Ordering::Acquire))
    }
}

fn build_request(endpoint: &Url, protocol: &str) -> Result<Request> {
    let invalid = |reason: String| TransportError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    let mut request = endpoint
        .as_str()
        .into_client_request()
        .map_err(|err| invalid(err.to_string()))?;
    let value = HeaderValue::from_str(protocol)
        .map_err(|err| invalid(format!("bad sub-protocol '{protocol}': {err}")))?;
    request.headers_mut().insert(SUBPROTOCOL_HEADER, value);
    Ok(request)
}

fn decode_state(raw: u8) -> ConnectionState {
    match raw {
        CONNECTING => ConnectionState::Connecting,
        OPEN => ConnectionState::Open,
        _ => ConnectionState::Closed,
    }
}

async fn run_socket(
    request: Request,
    state: Arc<AtomicU8>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let socket = match connect_async(request).await {
        Ok((socket, response)) => {
            debug!(
                status = %response.status(),
                protocol = ?response.headers().get(SUBPROTOCOL_HEADER),
                "websocket handshake complete"
            );
            socket
        }
        Err(err) => {
            state.store(CLOSED, Ordering::Release);
            let _ = events.send(TransportEvent::Error(format!("connect failed: {err}")));
            let _ = events.send(TransportEvent::Closed {
                code: None,
                reason: String::new(),
            });
            return;
        }
    };

    let (mut sink, mut stream) = socket.split();

    // close() may have raced the handshake.
    if state
        .compare_exchange(CONNECTING, OPEN, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        let _ = sink.close().await;
        let _ = events.send(TransportEvent::Closed {
            code: Some(CLOSE_NORMAL),
            reason: String::new(),
        });
        return;
    }
    let _ = events.send(TransportEvent::Open);

    let (code, reason) = loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Text(text)) => {
                    if let Err(err) = sink.send(Message::text(text)).await {
                        let _ = events.send(TransportEvent::Error(format!("send failed: {err}")));
                        break (None, String::new());
                    }
                }
                Some(Command::Close) | None => {
                    let frame = CloseFrame {
                        code: CloseCode::Normal,
                        reason: String::new().into(),
                    };
                    let _ = sink.send(Message::Close(Some(frame))).await;
                    break (Some(CLOSE_NORMAL), String::new());
                }
            },
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(TransportEvent::Text(text.to_string()));
                }
                Some(Ok(Message::Binary(data))) => {
                    warn!(len = data.len(), "ignoring binary frame");
                }
                Some(Ok(Message::Close(frame))) => {
                    break match frame {
                        Some(frame) => (Some(u16::from(frame.code)), frame.reason.to_string()),
                        None => (None, String::new()),
                    };
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    let _ = events.send(TransportEvent::Error(format!("receive failed: {err}")));
                    break (None, String::new());
                }
                None => break (None, String::new()),
            },
        }
    };

    state.store(CLOSED, Ordering::Release);
    let _ = sink.close().await;
    let _ = events.send(TransportEvent::Closed { code, reason });
}

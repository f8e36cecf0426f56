//! Transport abstraction and WebSocket implementation.
//!
//! The supervisor talks to the wire through the [`Connector`] and
//! [`StreamLink`] traits, injected at construction time. Production
//! uses [`WsConnector`] over tokio-tungstenite; tests substitute a
//! scripted fake without touching global state.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Timeout for establishing a connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// LinkEvent
// ============================================================================

/// One event read from an open link.
#[derive(Debug)]
pub enum LinkEvent {
    /// A text frame arrived.
    Text(String),

    /// The remote closed the link. `code` is `None` when the stream
    /// ended without a close handshake (abnormal termination).
    Closed {
        /// WebSocket close code, if a close frame was received.
        code: Option<u16>,
    },

    /// The link failed at the transport level.
    Failed(Error),
}

// ============================================================================
// StreamLink
// ============================================================================

/// An open, bidirectional text link.
///
/// Owned by the supervisor's event loop; all calls happen from that
/// single task.
#[async_trait]
pub trait StreamLink: Send {
    /// Sends one text frame.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the link is no longer writable.
    async fn send_text(&mut self, text: &str) -> Result<()>;

    /// Reads the next event. Binary and control frames are skipped
    /// internally; this only ever yields text, close, or failure.
    async fn next_event(&mut self) -> LinkEvent;

    /// Closes the link, best effort.
    async fn close(&mut self);
}

// ============================================================================
// Connector
// ============================================================================

/// Factory for [`StreamLink`]s.
///
/// Injected into the supervisor so deterministic tests can substitute
/// a fake transport.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Opens a new link to the endpoint.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the connection cannot be
    /// established.
    async fn connect(&self, url: &Url) -> Result<Box<dyn StreamLink>>;
}

// ============================================================================
// WsConnector
// ============================================================================

/// Production connector over tokio-tungstenite.
#[derive(Debug, Clone, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &Url) -> Result<Box<dyn StreamLink>> {
        let attempt = connect_async(url.as_str());

        let (stream, _response) = timeout(CONNECT_TIMEOUT, attempt)
            .await
            .map_err(|_| Error::connection_timeout(CONNECT_TIMEOUT.as_millis() as u64))?
            .map_err(|e| Error::connection(e.to_string()))?;

        debug!(url = %url, "Streaming connection established");

        Ok(Box::new(WsLink { stream }))
    }
}

// ============================================================================
// WsLink
// ============================================================================

/// A live tokio-tungstenite link.
struct WsLink {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl StreamLink for WsLink {
    async fn send_text(&mut self, text: &str) -> Result<()> {
        self.stream
            .send(Message::Text(text.to_string().into()))
            .await
            .map_err(Error::from)
    }

    async fn next_event(&mut self) -> LinkEvent {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return LinkEvent::Text(text.as_str().to_owned());
                }

                Some(Ok(Message::Close(frame))) => {
                    let code = frame.map(|f| u16::from(f.code));
                    debug!(?code, "Link closed by remote");
                    return LinkEvent::Closed { code };
                }

                // WS-level ping/pong and binary frames are not part of
                // this protocol; the application heartbeat is literal
                // text handled by the supervisor.
                Some(Ok(other)) => {
                    trace!(kind = ?message_kind(&other), "Ignoring non-text frame");
                }

                Some(Err(e)) => return LinkEvent::Failed(Error::from(e)),

                None => {
                    debug!("Link stream ended without close handshake");
                    return LinkEvent::Closed { code: None };
                }
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}

/// Short label for a skipped message, for trace logging.
fn message_kind(message: &Message) -> &'static str {
    match message {
        Message::Text(_) => "text",
        Message::Binary(_) => "binary",
        Message::Ping(_) => "ping",
        Message::Pong(_) => "pong",
        Message::Close(_) => "close",
        Message::Frame(_) => "frame",
    }
}

// ============================================================================
// Tests
// ============================================================================

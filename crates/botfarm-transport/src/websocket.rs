//! WebSocket client connections.
//!
//! [`WsConnection::connect`] dials a URL and spawns a task owning the socket.
//! The caller gets back a handle for outbound text frames and a receiver of
//! [`WsEvent`]s. Backend protocols (framing, heartbeats, acks) live in the
//! adapters; this layer only moves text frames.
//!
//! The connection does not reconnect. When the socket ends, a final
//! [`WsEvent::Closed`] is delivered and the handle stops accepting frames.

use std::sync::Arc;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, info, trace, warn};

use botfarm_core::{TransportError, TransportResult};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

const CHANNEL_CAPACITY: usize = 256;

/// Something that happened on the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsEvent {
    /// A text frame arrived.
    Text(String),
    /// The socket is gone; no further events follow.
    Closed {
        /// Why it closed.
        reason: String,
    },
}

/// Handle to a running WebSocket client connection.
#[derive(Debug, Clone)]
pub struct WsConnection {
    url: String,
    outbound: mpsc::Sender<String>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl WsConnection {
    /// Connects to `url` and starts the connection task.
    pub async fn connect(url: &str) -> TransportResult<(Self, mpsc::Receiver<WsEvent>)> {
        info!(url = %url, "Connecting to WebSocket server");

        let (ws_stream, _response) =
            connect_async(url)
                .await
                .map_err(|e| TransportError::ConnectionFailed {
                    url: url.to_owned(),
                    reason: format!("WebSocket connection failed: {e}"),
                })?;
        let (ws_tx, ws_rx) = ws_stream.split();

        let (outbound_tx, outbound_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (events_tx, events_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(run_client_loop(
            ws_tx,
            ws_rx,
            outbound_rx,
            events_tx,
            shutdown_rx,
            url.to_owned(),
        ));

        info!(url = %url, "WebSocket client connected");
        Ok((
            Self {
                url: url.to_owned(),
                outbound: outbound_tx,
                shutdown: Arc::new(shutdown_tx),
            },
            events_rx,
        ))
    }

    /// The URL this connection was opened with.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Queues a text frame.
    pub async fn send_text(&self, text: String) -> TransportResult<()> {
        self.outbound
            .send(text)
            .await
            .map_err(|_| TransportError::ConnectionClosed {
                reason: "WebSocket task has stopped".into(),
            })
    }

    /// Returns true once the connection task has stopped.
    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }

    /// Asks the connection task to close the socket.
    pub fn close(&self) {
        let _ = self.shutdown.send(true);
    }
}

async fn run_client_loop(
    mut ws_tx: WsSink,
    mut ws_rx: WsSource,
    mut outbound_rx: mpsc::Receiver<String>,
    events_tx: mpsc::Sender<WsEvent>,
    mut shutdown_rx: watch::Receiver<bool>,
    url: String,
) {
    let reason = loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    let _ = ws_tx.close().await;
                    break "closed locally".to_owned();
                }
            }

            Some(text) = outbound_rx.recv() => {
                trace!(url = %url, len = text.len(), "Sending text");
                if let Err(e) = ws_tx.send(Message::Text(text.into())).await {
                    warn!(url = %url, error = %e, "Failed to send frame");
                    break format!("send failed: {e}");
                }
            }

            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        trace!(url = %url, len = text.len(), "Received text");
                        if events_tx.send(WsEvent::Text(text.as_str().to_owned())).await.is_err() {
                            debug!(url = %url, "Event receiver dropped");
                            let _ = ws_tx.close().await;
                            break "receiver dropped".to_owned();
                        }
                    }
                    Some(Ok(Message::Binary(data))) => {
                        trace!(url = %url, len = data.len(), "Ignoring binary frame");
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_tx.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Pong(_))) | Some(Ok(Message::Frame(_))) => {}
                    Some(Ok(Message::Close(frame))) => {
                        let reason = frame
                            .map(|f| format!("{} {}", u16::from(f.code), f.reason.as_str()))
                            .unwrap_or_else(|| "server closed connection".to_owned());
                        break reason;
                    }
                    Some(Err(e)) => {
                        warn!(url = %url, error = %e, "WebSocket error");
                        break e.to_string();
                    }
                    None => break "stream ended".to_owned(),
                }
            }
        }
    };

    info!(url = %url, reason = %reason, "WebSocket client stopped");
    outbound_rx.close();
    let _ = events_tx.send(WsEvent::Closed { reason }).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn echo_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            while let Some(Ok(msg)) = ws.next().await {
                if msg.is_text() {
                    ws.send(msg).await.unwrap();
                } else if msg.is_close() {
                    break;
                }
            }
        });
        format!("ws://{addr}")
    }

    #[tokio::test]
    async fn echoes_text_and_reports_close() {
        let url = echo_server().await;
        let (conn, mut events) = WsConnection::connect(&url).await.unwrap();

        conn.send_text(r#"{"type":"ping","id":1}"#.into())
            .await
            .unwrap();
        assert_eq!(
            events.recv().await,
            Some(WsEvent::Text(r#"{"type":"ping","id":1}"#.into()))
        );

        conn.close();
        assert!(matches!(events.recv().await, Some(WsEvent::Closed { .. })));
    }

    #[tokio::test]
    async fn unreachable_url_fails_to_connect() {
        let err = WsConnection::connect("ws://127.0.0.1:1").await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectionFailed { .. }));
    }
}

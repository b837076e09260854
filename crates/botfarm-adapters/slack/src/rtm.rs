//! Realtime socket client.
//!
//! Outbound messages carry an increasing `id`; the server acknowledges each
//! one with a `reply_to` frame. [`SlackRtmClient::send_message`] waits for
//! that acknowledgment (bounded by the configured timeout) and resolves with
//! the timestamp of the created message.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

use botfarm_core::{
    EventListeners, SentMessage, TeamChatEvent, TeamChatRealtime, TransportError, TransportResult,
};
use botfarm_transport::{WsConnection, WsEvent};

use crate::config::SlackConfig;
use crate::model::{OutgoingFrame, Reply, RtmFrame};

type PendingAcks = Mutex<HashMap<u64, oneshot::Sender<Reply>>>;

/// A connected realtime socket.
pub struct SlackRtmClient {
    conn: WsConnection,
    events: EventListeners<TeamChatEvent>,
    pending: PendingAcks,
    /// Set under the `pending` lock once the read loop has ended.
    closed: AtomicBool,
    next_id: AtomicU64,
    ack_timeout: Duration,
}

impl SlackRtmClient {
    /// Opens the realtime socket at `url` and starts reading frames.
    ///
    /// `url` is normally the one returned by `rtm.connect`.
    pub async fn connect_url(url: &str, config: &SlackConfig) -> TransportResult<Arc<Self>> {
        let (conn, inbound) = WsConnection::connect(url).await?;
        let client = Arc::new(Self {
            conn,
            events: EventListeners::new(),
            pending: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
            ack_timeout: config.ack_timeout(),
        });

        tokio::spawn(read_loop(Arc::clone(&client), inbound));
        if let Some(interval) = config.ping_interval() {
            tokio::spawn(ping_loop(Arc::downgrade(&client), interval));
        }
        Ok(client)
    }

    /// Returns true while the socket is open.
    pub fn is_connected(&self) -> bool {
        !self.closed.load(Ordering::Acquire) && !self.conn.is_closed()
    }

    /// Number of sent messages still waiting for an acknowledgment.
    pub fn pending_ack_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Closes the socket. Waiting sends fail with `ConnectionClosed`.
    pub fn close(&self) {
        self.conn.close();
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn send_frame(&self, frame: &OutgoingFrame<'_>) -> TransportResult<()> {
        let text = serde_json::to_string(frame)?;
        self.conn.send_text(text).await
    }

    fn handle_frame(&self, text: &str) {
        let frame = match RtmFrame::parse(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Failed to decode realtime frame");
                return;
            }
        };

        match frame {
            RtmFrame::Message(event) => {
                trace!(channel = %event.channel, ts = %event.ts, "Message event");
                self.events.emit(&event);
            }
            RtmFrame::Reply(reply) => {
                let waiter = self.pending.lock().remove(&reply.reply_to);
                match waiter {
                    Some(tx) => {
                        let _ = tx.send(reply);
                    }
                    None => trace!(reply_to = reply.reply_to, "Unsolicited acknowledgment"),
                }
            }
            RtmFrame::Hello => info!("Realtime session established"),
            RtmFrame::Goodbye => info!("Server announced disconnect"),
            RtmFrame::Other(kind) => trace!(kind = %kind, "Ignoring event"),
        }
    }

    fn fail_pending(&self) {
        let mut pending = self.pending.lock();
        self.closed.store(true, Ordering::Release);
        if !pending.is_empty() {
            warn!(
                count = pending.len(),
                "Dropping unacknowledged messages due to disconnect"
            );
            pending.clear();
        }
    }
}

async fn read_loop(client: Arc<SlackRtmClient>, mut inbound: mpsc::Receiver<WsEvent>) {
    while let Some(event) = inbound.recv().await {
        match event {
            WsEvent::Text(text) => client.handle_frame(&text),
            WsEvent::Closed { reason } => {
                warn!(reason = %reason, "Realtime socket closed");
                break;
            }
        }
    }
    client.fail_pending();
}

async fn ping_loop(client: Weak<SlackRtmClient>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let Some(client) = client.upgrade() else {
            break;
        };
        if !client.is_connected() {
            break;
        }
        let id = client.next_id();
        if let Err(e) = client.send_frame(&OutgoingFrame::ping(id)).await {
            debug!(error = %e, "Keep-alive ping failed");
            break;
        }
    }
}

fn ack_result(id: u64, reply: Reply) -> TransportResult<SentMessage> {
    if reply.ok {
        return Ok(SentMessage::new(reply.ts.unwrap_or_default()));
    }
    let message = reply
        .error
        .map(|e| format!("{} (code {})", e.msg, e.code))
        .unwrap_or_else(|| "message rejected".to_owned());
    Err(TransportError::api(format!("message #{id}"), message))
}

#[async_trait]
impl TeamChatRealtime for SlackRtmClient {
    fn events(&self) -> &EventListeners<TeamChatEvent> {
        &self.events
    }

    async fn send_message(&self, text: &str, channel: &str) -> TransportResult<SentMessage> {
        let id = self.next_id();
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock();
            if self.closed.load(Ordering::Acquire) {
                return Err(TransportError::ConnectionClosed {
                    reason: "realtime socket closed".into(),
                });
            }
            pending.insert(id, tx);
        }

        if let Err(e) = self.send_frame(&OutgoingFrame::message(id, channel, text)).await {
            self.pending.lock().remove(&id);
            return Err(e);
        }
        debug!(id, channel, "Message sent, awaiting acknowledgment");

        match timeout(self.ack_timeout, rx).await {
            Ok(Ok(reply)) => ack_result(id, reply),
            Ok(Err(_)) => Err(TransportError::ConnectionClosed {
                reason: "realtime socket closed before acknowledgment".into(),
            }),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(TransportError::Timeout(format!(
                    "acknowledgment of message #{id}"
                )))
            }
        }
    }

    async fn send_typing(&self, channel: &str) -> TransportResult<()> {
        let id = self.next_id();
        self.send_frame(&OutgoingFrame::typing(id, channel)).await
    }
}

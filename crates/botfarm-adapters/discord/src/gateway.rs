//! Gateway client.
//!
//! The gateway session goes through these steps:
//!
//! 1. The server sends `HELLO` with the heartbeat interval.
//! 2. The client answers with `IDENTIFY` and starts heartbeating.
//! 3. The server dispatches `READY`, then events such as `MESSAGE_CREATE`.
//!
//! Every `MESSAGE_CREATE` is turned into a [`GuildChatEvent`] carrying a
//! shared [`DiscordChannel`] handle (one per channel id) and emitted to the
//! gateway's listeners.
//!
//! `RECONNECT` and `INVALID_SESSION` close the socket. Session resume is
//! not implemented.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use botfarm_core::{
    EventListeners, GuildAuthor, GuildChannel, GuildChatEvent, GuildChatGateway, TransportResult,
};
use botfarm_transport::{WsConnection, WsEvent};

use crate::channel::DiscordChannel;
use crate::config::DiscordConfig;
use crate::model::{GatewayPayload, Hello, MessageCreate, Ready, opcode};
use crate::rest::DiscordRest;

/// A connected gateway.
pub struct DiscordGateway {
    config: DiscordConfig,
    conn: WsConnection,
    rest: Arc<DiscordRest>,
    events: EventListeners<GuildChatEvent>,
    channels: Mutex<HashMap<String, Arc<DiscordChannel>>>,
    seq: Mutex<Option<u64>>,
    ready: Mutex<Option<Ready>>,
    heartbeat: CancellationToken,
}

impl DiscordGateway {
    /// Logs in: opens the gateway socket from the configuration.
    pub async fn connect(config: DiscordConfig) -> TransportResult<Arc<Self>> {
        let url = config.gateway_url.clone();
        Self::connect_url(&url, config).await
    }

    /// Opens the gateway socket at `url`.
    pub async fn connect_url(url: &str, config: DiscordConfig) -> TransportResult<Arc<Self>> {
        let rest = Arc::new(DiscordRest::new(&config)?);
        let (conn, inbound) = WsConnection::connect(url).await?;
        let gateway = Arc::new(Self {
            config,
            conn,
            rest,
            events: EventListeners::new(),
            channels: Mutex::new(HashMap::new()),
            seq: Mutex::new(None),
            ready: Mutex::new(None),
            heartbeat: CancellationToken::new(),
        });
        tokio::spawn(read_loop(Arc::clone(&gateway), inbound));
        Ok(gateway)
    }

    /// The bot user, once `READY` arrived.
    pub fn current_user(&self) -> Option<GuildAuthor> {
        self.ready.lock().as_ref().map(|r| r.user.clone())
    }

    /// Returns true while the socket is open.
    pub fn is_connected(&self) -> bool {
        !self.conn.is_closed()
    }

    /// The shared handle for `channel_id`.
    pub fn channel(&self, channel_id: &str) -> Arc<DiscordChannel> {
        let mut channels = self.channels.lock();
        let channel = channels.entry(channel_id.to_owned()).or_insert_with(|| {
            Arc::new(DiscordChannel::new(
                channel_id,
                Arc::clone(&self.rest),
                self.config.typing_interval(),
            ))
        });
        Arc::clone(channel)
    }

    /// Closes the socket and stops heartbeating.
    pub fn close(&self) {
        self.heartbeat.cancel();
        self.conn.close();
    }

    async fn send(&self, payload: &GatewayPayload) -> TransportResult<()> {
        self.conn.send_text(serde_json::to_string(payload)?).await
    }

    async fn send_heartbeat(&self) -> TransportResult<()> {
        let seq = *self.seq.lock();
        self.send(&GatewayPayload::heartbeat(seq)).await
    }

    async fn handle_frame(self: &Arc<Self>, text: &str) -> TransportResult<()> {
        let payload: GatewayPayload = serde_json::from_str(text)?;
        match payload.op {
            opcode::HELLO => {
                let hello: Hello = serde_json::from_value(payload.d)?;
                debug!(interval_ms = hello.heartbeat_interval, "Gateway hello");
                self.send(&GatewayPayload::identify(
                    &self.config.token,
                    self.config.intents,
                ))
                .await?;
                tokio::spawn(heartbeat_loop(
                    Arc::downgrade(self),
                    Duration::from_millis(hello.heartbeat_interval),
                    self.heartbeat.child_token(),
                ));
            }
            opcode::DISPATCH => {
                if let Some(seq) = payload.s {
                    *self.seq.lock() = Some(seq);
                }
                self.dispatch(payload.t.as_deref().unwrap_or_default(), payload.d)?;
            }
            opcode::HEARTBEAT => self.send_heartbeat().await?,
            opcode::HEARTBEAT_ACK => trace!("Heartbeat acknowledged"),
            opcode::RECONNECT => {
                warn!("Gateway requested reconnect; closing");
                self.close();
            }
            opcode::INVALID_SESSION => {
                warn!("Gateway session invalidated; closing");
                self.close();
            }
            op => trace!(op, "Ignoring gateway opcode"),
        }
        Ok(())
    }

    fn dispatch(&self, kind: &str, data: serde_json::Value) -> TransportResult<()> {
        match kind {
            "READY" => {
                let ready: Ready = serde_json::from_value(data)?;
                info!(
                    user = %ready.user.username,
                    session = %ready.session_id,
                    "Guild-chat gateway ready"
                );
                *self.ready.lock() = Some(ready);
            }
            "MESSAGE_CREATE" => {
                let msg: MessageCreate = serde_json::from_value(data)?;
                let channel: Arc<dyn GuildChannel> = self.channel(&msg.channel_id);
                let event = GuildChatEvent {
                    id: msg.id,
                    content: msg.content,
                    channel_id: msg.channel_id,
                    guild_id: msg.guild_id,
                    author: msg.author,
                    channel,
                };
                trace!(channel = %event.channel_id, message = %event.id, "Message event");
                self.events.emit(&event);
            }
            other => trace!(event = %other, "Ignoring dispatch"),
        }
        Ok(())
    }
}

impl GuildChatGateway for DiscordGateway {
    fn events(&self) -> &EventListeners<GuildChatEvent> {
        &self.events
    }
}

impl std::fmt::Debug for DiscordGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordGateway")
            .field("url", &self.conn.url())
            .field("connected", &self.is_connected())
            .field("user", &self.current_user())
            .finish_non_exhaustive()
    }
}

async fn read_loop(gateway: Arc<DiscordGateway>, mut inbound: mpsc::Receiver<WsEvent>) {
    while let Some(event) = inbound.recv().await {
        match event {
            WsEvent::Text(text) => {
                if let Err(e) = gateway.handle_frame(&text).await {
                    warn!(error = %e, "Failed to handle gateway frame");
                }
            }
            WsEvent::Closed { reason } => {
                warn!(reason = %reason, "Gateway socket closed");
                break;
            }
        }
    }
    gateway.heartbeat.cancel();
}

async fn heartbeat_loop(gateway: Weak<DiscordGateway>, every: Duration, stop: CancellationToken) {
    loop {
        tokio::select! {
            _ = stop.cancelled() => break,
            _ = tokio::time::sleep(every) => {
                let Some(gateway) = gateway.upgrade() else {
                    break;
                };
                if let Err(e) = gateway.send_heartbeat().await {
                    debug!(error = %e, "Heartbeat failed");
                    break;
                }
            }
        }
    }
}

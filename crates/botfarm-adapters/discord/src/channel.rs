//! Channel handles embedded in guild-chat events.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use botfarm_core::{GuildChannel, SentMessage, TransportResult};

use crate::rest::{DiscordRest, MAX_MESSAGE_LEN, split_content};

/// A text channel.
///
/// The platform's typing indicator lasts about ten seconds, so
/// [`start_typing`](GuildChannel::start_typing) keeps refreshing it until
/// [`stop_typing`](GuildChannel::stop_typing) is called.
pub struct DiscordChannel {
    id: String,
    rest: Arc<DiscordRest>,
    typing_interval: Duration,
    typing: Arc<Mutex<Option<CancellationToken>>>,
}

impl DiscordChannel {
    pub fn new(id: impl Into<String>, rest: Arc<DiscordRest>, typing_interval: Duration) -> Self {
        Self {
            id: id.into(),
            rest,
            typing_interval,
            typing: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns true while a typing indicator is being kept alive.
    pub fn is_typing(&self) -> bool {
        self.typing.lock().is_some()
    }
}

#[async_trait]
impl GuildChannel for DiscordChannel {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send(&self, text: &str) -> TransportResult<Vec<SentMessage>> {
        let mut sent = Vec::new();
        for chunk in split_content(text, MAX_MESSAGE_LEN) {
            sent.push(self.rest.create_message(&self.id, &chunk).await?);
        }
        Ok(sent)
    }

    async fn start_typing(&self) -> TransportResult<()> {
        self.rest.trigger_typing(&self.id).await?;

        let token = {
            let mut typing = self.typing.lock();
            if typing.is_some() {
                return Ok(());
            }
            let token = CancellationToken::new();
            *typing = Some(token.clone());
            token
        };

        let rest = Arc::clone(&self.rest);
        let slot = Arc::clone(&self.typing);
        let channel_id = self.id.clone();
        let every = self.typing_interval;
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(every) => {
                        if let Err(e) = rest.trigger_typing(&channel_id).await {
                            debug!(channel = %channel_id, error = %e, "Typing refresh failed");
                            // A cancelled token has already left the slot.
                            let mut typing = slot.lock();
                            if !token.is_cancelled() {
                                typing.take();
                            }
                            break;
                        }
                        trace!(channel = %channel_id, "Typing refreshed");
                    }
                }
            }
        });
        Ok(())
    }

    async fn stop_typing(&self) -> TransportResult<()> {
        if let Some(token) = self.typing.lock().take() {
            token.cancel();
        }
        Ok(())
    }

    async fn react(&self, message_id: &str, emoji: &str) -> TransportResult<()> {
        self.rest.add_reaction(&self.id, message_id, emoji).await
    }
}

impl Drop for DiscordChannel {
    fn drop(&mut self) {
        if let Some(token) = self.typing.lock().take() {
            token.cancel();
        }
    }
}

impl std::fmt::Debug for DiscordChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordChannel")
            .field("id", &self.id)
            .field("typing", &self.is_typing())
            .finish_non_exhaustive()
    }
}

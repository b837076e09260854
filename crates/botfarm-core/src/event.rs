//! Raw inbound events as delivered by the backend adapters.
//!
//! The two backends shape their messages differently: the team-chat stream
//! carries flat records (text, timestamp, channel, user), while the
//! guild-chat gateway delivers a native message object that embeds a handle
//! to the channel it was posted in. [`RawEvent`] is the one thing they share:
//! a text field the router can match against.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::adapter::GuildChannel;
use crate::backend::Backend;

/// Common view over raw events of either backend.
pub trait RawEvent: Clone + Send + Sync + 'static {
    /// The backend this event type belongs to.
    const BACKEND: Backend;

    /// The text field matched against listener patterns.
    fn text(&self) -> &str;
}

// ============================================================================
// Team-chat
// ============================================================================

/// A `message` event from the team-chat realtime stream.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeamChatEvent {
    /// Optional subtype (`bot_message`, `message_changed`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    /// Message text; empty when the event carries none.
    #[serde(default)]
    pub text: String,
    /// Message timestamp, which doubles as the message id.
    #[serde(default)]
    pub ts: String,
    /// Channel id.
    #[serde(default)]
    pub channel: String,
    /// Author user id.
    #[serde(default)]
    pub user: String,
}

impl TeamChatEvent {
    /// Creates a plain user message event.
    pub fn new(
        channel: impl Into<String>,
        user: impl Into<String>,
        ts: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            subtype: None,
            text: text.into(),
            ts: ts.into(),
            channel: channel.into(),
            user: user.into(),
        }
    }
}

impl RawEvent for TeamChatEvent {
    const BACKEND: Backend = Backend::TeamChat;

    fn text(&self) -> &str {
        &self.text
    }
}

// ============================================================================
// Guild-chat
// ============================================================================

/// Author of a guild-chat message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GuildAuthor {
    /// User id (snowflake).
    pub id: String,
    /// Username.
    pub username: String,
    /// Whether the author is a bot account.
    #[serde(default)]
    pub bot: bool,
}

/// The guild-chat platform's native message object.
#[derive(Clone)]
pub struct GuildChatEvent {
    /// Message id (snowflake).
    pub id: String,
    /// Message content.
    pub content: String,
    /// Channel id.
    pub channel_id: String,
    /// Guild id; `None` for direct messages.
    pub guild_id: Option<String>,
    /// Message author.
    pub author: GuildAuthor,
    /// Handle to the channel the message was posted in.
    pub channel: Arc<dyn GuildChannel>,
}

impl GuildChatEvent {
    /// Adds a reaction to this message through its channel.
    pub async fn react(&self, emoji: &str) -> crate::TransportResult<()> {
        self.channel.react(&self.id, emoji).await
    }
}

impl RawEvent for GuildChatEvent {
    const BACKEND: Backend = Backend::GuildChat;

    fn text(&self) -> &str {
        &self.content
    }
}

impl fmt::Debug for GuildChatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuildChatEvent")
            .field("id", &self.id)
            .field("content", &self.content)
            .field("channel_id", &self.channel_id)
            .field("guild_id", &self.guild_id)
            .field("author", &self.author)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_chat_event_tolerates_missing_fields() {
        let evt: TeamChatEvent =
            serde_json::from_str(r#"{"subtype":"message_changed","channel":"C1"}"#).unwrap();
        assert_eq!(evt.subtype.as_deref(), Some("message_changed"));
        assert_eq!(evt.text(), "");
        assert_eq!(evt.channel, "C1");
    }
}

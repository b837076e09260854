//! Backend adapter traits.
//!
//! The concrete clients live in the `botfarm-adapter-*` crates; the core only
//! depends on the event and capability shapes defined here.
//!
//! # Team-chat
//!
//! The team-chat backend has two transports that are **not**
//! interchangeable:
//!
//! - [`TeamChatRealtime`]: the realtime socket, used to receive events and
//!   to send plain text and typing indicators.
//! - [`TeamChatApi`]: the persistent Web API client, required for rich
//!   payloads (attachments, custom username/avatar) and for reactions.
//!
//! # Guild-chat
//!
//! The guild-chat backend delivers messages through a gateway
//! ([`GuildChatGateway`]); every message embeds a [`GuildChannel`] handle that
//! carries the outbound operations for that channel.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportResult;
use crate::event::{GuildChatEvent, TeamChatEvent};
use crate::listeners::EventListeners;

// =============================================================================
// Shared types
// =============================================================================

/// Identifier of a message created by an outbound send.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SentMessage {
    /// Message id (the timestamp on team-chat, a snowflake on guild-chat).
    pub id: String,
}

impl SentMessage {
    /// Creates a new sent-message identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

// =============================================================================
// Team-chat
// =============================================================================

/// The bot's own user on the team-chat backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfIdentity {
    /// User id, used to build mention-style command prefixes.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// The workspace the team-chat connection belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeamIdentity {
    /// Team id.
    pub id: String,
    /// Team name.
    pub name: String,
    /// Team domain.
    #[serde(default)]
    pub domain: String,
}

/// Identity information captured when the realtime connection starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamChatIdentity {
    /// The bot's own user.
    #[serde(rename = "self")]
    pub user: SelfIdentity,
    /// The team.
    pub team: TeamIdentity,
}

/// A legacy message attachment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
}

/// Arguments for a rich message posted through the Web API.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RichMessage {
    /// Target channel. Left empty, `reply_complex` fills in the channel of
    /// the message being replied to.
    pub channel: String,
    /// Message text (also the notification fallback).
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    /// Custom username; requires `as_user = false`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Custom avatar URL; requires `as_user = false`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_user: Option<bool>,
    /// Parent message timestamp when replying in a thread.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
}

impl RichMessage {
    /// Creates a rich message with text only.
    pub fn new(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    /// Adds an attachment.
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Posts under a custom identity instead of the bot user.
    pub fn custom_identity(
        mut self,
        username: impl Into<String>,
        icon_url: Option<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.icon_url = icon_url;
        self.as_user = Some(false);
        self
    }
}

/// The team-chat realtime socket.
#[async_trait]
pub trait TeamChatRealtime: Send + Sync {
    /// Inbound `message` events.
    fn events(&self) -> &EventListeners<TeamChatEvent>;

    /// Sends a plain text message; resolves once the backend acknowledged it.
    async fn send_message(&self, text: &str, channel: &str) -> TransportResult<SentMessage>;

    /// Sends a typing indicator. Indicators expire server-side; there is no
    /// explicit stop signal.
    async fn send_typing(&self, channel: &str) -> TransportResult<()>;
}

/// The team-chat Web API client.
#[async_trait]
pub trait TeamChatApi: Send + Sync {
    /// Posts a rich message.
    async fn post_message(&self, message: RichMessage) -> TransportResult<SentMessage>;

    /// Adds a reaction (by emoji name) to the message at `timestamp`.
    async fn add_reaction(&self, name: &str, channel: &str, timestamp: &str)
    -> TransportResult<()>;

    /// Removes a reaction (by emoji name) from the message at `timestamp`.
    async fn remove_reaction(
        &self,
        name: &str,
        channel: &str,
        timestamp: &str,
    ) -> TransportResult<()>;
}

/// Everything a session needs from a connected team-chat backend.
#[derive(Clone)]
pub struct TeamChatHandles {
    /// The realtime socket.
    pub realtime: Arc<dyn TeamChatRealtime>,
    /// The Web API client.
    pub api: Arc<dyn TeamChatApi>,
    /// Identity captured at connect time, if the backend reported one.
    pub identity: Option<TeamChatIdentity>,
}

impl std::fmt::Debug for TeamChatHandles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamChatHandles")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// Connects the team-chat backend on demand.
///
/// Implementations share one connection between all sessions.
#[async_trait]
pub trait TeamChatProvider: Send + Sync {
    /// Starts (or reuses) the realtime connection.
    async fn connect(&self) -> TransportResult<TeamChatHandles>;
}

// =============================================================================
// Guild-chat
// =============================================================================

/// Outbound operations of one guild-chat channel.
#[async_trait]
pub trait GuildChannel: Send + Sync {
    /// Channel id.
    fn id(&self) -> &str;

    /// Sends a text message. Long content may be split, yielding several
    /// created messages in order.
    async fn send(&self, text: &str) -> TransportResult<Vec<SentMessage>>;

    /// Shows the typing indicator until [`stop_typing`](Self::stop_typing).
    async fn start_typing(&self) -> TransportResult<()>;

    /// Stops the typing indicator.
    async fn stop_typing(&self) -> TransportResult<()>;

    /// Adds a reaction to a message in this channel.
    async fn react(&self, message_id: &str, emoji: &str) -> TransportResult<()>;
}

/// The guild-chat gateway.
pub trait GuildChatGateway: Send + Sync {
    /// Inbound message events.
    fn events(&self) -> &EventListeners<GuildChatEvent>;
}

/// A shared team-chat provider.
pub type BoxedTeamChatProvider = Arc<dyn TeamChatProvider>;

/// A shared guild-chat gateway.
pub type BoxedGuildChatGateway = Arc<dyn GuildChatGateway>;

//! The Unified Message.
//!
//! A [`Message`] is built from a raw backend event plus the capture groups of
//! the pattern that matched it. The shared capabilities (text, match groups,
//! reply, typing) are available on every message; backend-specific
//! capabilities live on the variant payloads and are reached by matching on
//! the enum or through [`Message::as_team_chat`] / [`Message::as_guild_chat`].
//!
//! # Example
//!
//! ```rust,ignore
//! session.hear("ping", |msg: Message| async move {
//!     msg.reply("PONG").await?;
//!     if let Message::TeamChat(team) = &msg {
//!         team.react("table_tennis_paddle_and_ball").await?;
//!     }
//!     Ok::<_, TransportError>(())
//! })?;
//! ```

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use crate::adapter::{RichMessage, SentMessage, TeamChatApi, TeamChatHandles, TeamChatRealtime};
use crate::backend::Backend;
use crate::error::{CapabilityError, CapabilityResult, TransportError, TransportResult};
use crate::event::{GuildChatEvent, RawEvent, TeamChatEvent};

// =============================================================================
// Match groups
// =============================================================================

/// Capture groups of the pattern that matched a message.
///
/// Index 0 is the matched text; unmatched optional groups are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchGroups(Vec<Option<String>>);

impl MatchGroups {
    /// Builds match groups from explicit values.
    pub fn new(groups: Vec<Option<String>>) -> Self {
        Self(groups)
    }

    /// Copies every group out of a set of captures.
    pub fn from_captures(captures: &regex_lite::Captures<'_>) -> Self {
        Self(
            captures
                .iter()
                .map(|m| m.map(|m| m.as_str().to_owned()))
                .collect(),
        )
    }

    /// Returns group `index`, if it participated in the match.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).and_then(|g| g.as_deref())
    }

    /// Number of groups, including group 0.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no groups at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over all groups.
    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> {
        self.0.iter().map(|g| g.as_deref())
    }
}

impl Index<usize> for MatchGroups {
    type Output = str;

    /// Returns group `index`, or `""` for a group that did not participate.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    fn index(&self, index: usize) -> &str {
        match &self.0[index] {
            Some(s) => s,
            None => "",
        }
    }
}

// =============================================================================
// Team-chat variant
// =============================================================================

/// A message received from the team-chat backend.
#[derive(Clone)]
pub struct TeamChatMessage {
    event: TeamChatEvent,
    matches: MatchGroups,
    realtime: Arc<dyn TeamChatRealtime>,
    api: Arc<dyn TeamChatApi>,
}

impl TeamChatMessage {
    /// Wraps a raw team-chat event.
    pub fn new(event: TeamChatEvent, matches: MatchGroups, handles: &TeamChatHandles) -> Self {
        Self {
            event,
            matches,
            realtime: Arc::clone(&handles.realtime),
            api: Arc::clone(&handles.api),
        }
    }

    /// The raw event.
    pub fn original(&self) -> &TeamChatEvent {
        &self.event
    }

    /// Replies with plain text over the realtime socket.
    ///
    /// The returned id is the timestamp from the backend's acknowledgment.
    pub async fn reply(&self, text: &str) -> TransportResult<SentMessage> {
        self.realtime.send_message(text, &self.event.channel).await
    }

    /// Replies with a rich payload through the Web API client.
    ///
    /// An empty `channel` is filled in with this message's channel.
    pub async fn reply_complex(&self, mut message: RichMessage) -> TransportResult<SentMessage> {
        if message.channel.is_empty() {
            message.channel = self.event.channel.clone();
        }
        self.api.post_message(message).await
    }

    /// Adds a reaction to this message.
    pub async fn react(&self, name: &str) -> TransportResult<()> {
        self.api
            .add_reaction(name, &self.event.channel, &self.event.ts)
            .await
    }

    /// Removes a reaction from this message.
    pub async fn remove_reaction(&self, name: &str) -> TransportResult<()> {
        self.api
            .remove_reaction(name, &self.event.channel, &self.event.ts)
            .await
    }

    /// Sends a typing indicator to this message's channel.
    pub async fn start_typing(&self) -> TransportResult<()> {
        self.realtime.send_typing(&self.event.channel).await
    }

    /// Resolves immediately: the realtime protocol has no stop signal and
    /// indicators expire on their own.
    pub async fn stop_typing(&self) -> TransportResult<()> {
        Ok(())
    }
}

impl fmt::Debug for TeamChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeamChatMessage")
            .field("event", &self.event)
            .field("matches", &self.matches)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Guild-chat variant
// =============================================================================

/// A message received from the guild-chat backend.
#[derive(Debug, Clone)]
pub struct GuildChatMessage {
    event: GuildChatEvent,
    matches: MatchGroups,
}

impl GuildChatMessage {
    /// Wraps a raw guild-chat event.
    pub fn new(event: GuildChatEvent, matches: MatchGroups) -> Self {
        Self { event, matches }
    }

    /// The platform's native message object.
    pub fn original(&self) -> &GuildChatEvent {
        &self.event
    }

    /// Replies through the channel the message was posted in.
    ///
    /// When the send produced several messages, the first one's id is
    /// reported.
    pub async fn reply(&self, text: &str) -> TransportResult<SentMessage> {
        self.event
            .channel
            .send(text)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::SendFailed("backend created no message".into()))
    }

    /// Starts the channel's typing indicator.
    pub async fn start_typing(&self) -> TransportResult<()> {
        self.event.channel.start_typing().await
    }

    /// Stops the channel's typing indicator.
    pub async fn stop_typing(&self) -> TransportResult<()> {
        self.event.channel.stop_typing().await
    }
}

// =============================================================================
// Message
// =============================================================================

/// A message from either backend.
#[derive(Debug, Clone)]
pub enum Message {
    /// Team-chat origin.
    TeamChat(TeamChatMessage),
    /// Guild-chat origin.
    GuildChat(GuildChatMessage),
}

impl Message {
    /// Wraps a team-chat event. Pure construction, no I/O.
    pub fn wrap_team_chat(
        event: TeamChatEvent,
        matches: MatchGroups,
        handles: &TeamChatHandles,
    ) -> Self {
        Self::TeamChat(TeamChatMessage::new(event, matches, handles))
    }

    /// Wraps a guild-chat event. Pure construction, no I/O.
    pub fn wrap_guild_chat(event: GuildChatEvent, matches: MatchGroups) -> Self {
        Self::GuildChat(GuildChatMessage::new(event, matches))
    }

    /// The backend this message came from.
    pub fn backend(&self) -> Backend {
        match self {
            Self::TeamChat(_) => Backend::TeamChat,
            Self::GuildChat(_) => Backend::GuildChat,
        }
    }

    /// Display text of the message.
    pub fn text(&self) -> &str {
        match self {
            Self::TeamChat(m) => m.event.text(),
            Self::GuildChat(m) => m.event.text(),
        }
    }

    /// Capture groups of the pattern that matched.
    pub fn matches(&self) -> &MatchGroups {
        match self {
            Self::TeamChat(m) => &m.matches,
            Self::GuildChat(m) => &m.matches,
        }
    }

    /// Replies in the channel the message came from.
    pub async fn reply(&self, text: &str) -> TransportResult<SentMessage> {
        match self {
            Self::TeamChat(m) => m.reply(text).await,
            Self::GuildChat(m) => m.reply(text).await,
        }
    }

    /// Starts the typing indicator.
    pub async fn start_typing(&self) -> TransportResult<()> {
        match self {
            Self::TeamChat(m) => m.start_typing().await,
            Self::GuildChat(m) => m.start_typing().await,
        }
    }

    /// Stops the typing indicator (a no-op on team-chat).
    pub async fn stop_typing(&self) -> TransportResult<()> {
        match self {
            Self::TeamChat(m) => m.stop_typing().await,
            Self::GuildChat(m) => m.stop_typing().await,
        }
    }

    /// Team-chat capabilities, or an error for a guild-chat message.
    pub fn as_team_chat(&self) -> CapabilityResult<&TeamChatMessage> {
        match self {
            Self::TeamChat(m) => Ok(m),
            other => Err(CapabilityError::WrongBackend {
                expected: Backend::TeamChat,
                actual: other.backend(),
            }),
        }
    }

    /// Guild-chat capabilities, or an error for a team-chat message.
    pub fn as_guild_chat(&self) -> CapabilityResult<&GuildChatMessage> {
        match self {
            Self::GuildChat(m) => Ok(m),
            other => Err(CapabilityError::WrongBackend {
                expected: Backend::GuildChat,
                actual: other.backend(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::GuildChannel;
    use crate::event::GuildAuthor;
    use crate::listeners::EventListeners;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingTeamChat {
        events: EventListeners<TeamChatEvent>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TeamChatRealtime for RecordingTeamChat {
        fn events(&self) -> &EventListeners<TeamChatEvent> {
            &self.events
        }

        async fn send_message(&self, text: &str, channel: &str) -> TransportResult<SentMessage> {
            self.calls.lock().push(format!("send {channel} {text}"));
            Ok(SentMessage::new("1700000000.000100"))
        }

        async fn send_typing(&self, channel: &str) -> TransportResult<()> {
            self.calls.lock().push(format!("typing {channel}"));
            Ok(())
        }
    }

    #[async_trait]
    impl TeamChatApi for RecordingTeamChat {
        async fn post_message(&self, message: RichMessage) -> TransportResult<SentMessage> {
            self.calls
                .lock()
                .push(format!("post {} {}", message.channel, message.text));
            Ok(SentMessage::new("1700000000.000200"))
        }

        async fn add_reaction(&self, name: &str, channel: &str, ts: &str) -> TransportResult<()> {
            self.calls.lock().push(format!("react+ {name} {channel} {ts}"));
            Ok(())
        }

        async fn remove_reaction(
            &self,
            name: &str,
            channel: &str,
            ts: &str,
        ) -> TransportResult<()> {
            self.calls.lock().push(format!("react- {name} {channel} {ts}"));
            Ok(())
        }
    }

    struct MultiSendChannel {
        created: Vec<&'static str>,
    }

    #[async_trait]
    impl GuildChannel for MultiSendChannel {
        fn id(&self) -> &str {
            "chan"
        }

        async fn send(&self, _text: &str) -> TransportResult<Vec<SentMessage>> {
            Ok(self.created.iter().copied().map(SentMessage::new).collect())
        }

        async fn start_typing(&self) -> TransportResult<()> {
            Ok(())
        }

        async fn stop_typing(&self) -> TransportResult<()> {
            Ok(())
        }

        async fn react(&self, _message_id: &str, _emoji: &str) -> TransportResult<()> {
            Ok(())
        }
    }

    fn team_chat_message(backend: &Arc<RecordingTeamChat>) -> Message {
        let handles = TeamChatHandles {
            realtime: Arc::clone(backend) as Arc<dyn TeamChatRealtime>,
            api: Arc::clone(backend) as Arc<dyn TeamChatApi>,
            identity: None,
        };
        let event = TeamChatEvent::new("C1", "U1", "1699999999.000001", "hello there");
        Message::wrap_team_chat(
            event,
            MatchGroups::new(vec![Some("hello".into())]),
            &handles,
        )
    }

    fn guild_chat_message(created: Vec<&'static str>) -> Message {
        let event = GuildChatEvent {
            id: "m1".into(),
            content: "$ping".into(),
            channel_id: "chan".into(),
            guild_id: Some("g1".into()),
            author: GuildAuthor::default(),
            channel: Arc::new(MultiSendChannel { created }),
        };
        Message::wrap_guild_chat(event, MatchGroups::new(vec![Some("ping".into())]))
    }

    #[tokio::test]
    async fn team_chat_routes_through_both_transports() {
        let backend = Arc::new(RecordingTeamChat::default());
        let msg = team_chat_message(&backend);
        let team = msg.as_team_chat().unwrap();

        let sent = msg.reply("hi").await.unwrap();
        assert_eq!(sent.id, "1700000000.000100");
        team.reply_complex(RichMessage {
            text: "rich".into(),
            ..Default::default()
        })
        .await
        .unwrap();
        team.react("wave").await.unwrap();
        team.remove_reaction("wave").await.unwrap();

        assert_eq!(
            *backend.calls.lock(),
            vec![
                "send C1 hi",
                "post C1 rich",
                "react+ wave C1 1699999999.000001",
                "react- wave C1 1699999999.000001",
            ]
        );
    }

    #[tokio::test]
    async fn team_chat_stop_typing_sends_nothing() {
        let backend = Arc::new(RecordingTeamChat::default());
        let msg = team_chat_message(&backend);

        msg.start_typing().await.unwrap();
        msg.stop_typing().await.unwrap();
        assert_eq!(*backend.calls.lock(), vec!["typing C1"]);
    }

    #[tokio::test]
    async fn guild_chat_reply_reports_first_created_message() {
        let msg = guild_chat_message(vec!["first", "second", "third"]);
        assert_eq!(msg.reply("long").await.unwrap().id, "first");
    }

    #[tokio::test]
    async fn guild_chat_reply_without_created_message_fails() {
        let msg = guild_chat_message(vec![]);
        assert!(matches!(
            msg.reply("x").await,
            Err(TransportError::SendFailed(_))
        ));
    }

    #[test]
    fn wrong_variant_access_is_an_error() {
        let msg = guild_chat_message(vec!["1"]);
        assert_eq!(msg.backend(), Backend::GuildChat);
        assert_eq!(msg.text(), "$ping");
        assert_eq!(&msg.matches()[0], "ping");
        assert_eq!(
            msg.as_team_chat().unwrap_err(),
            CapabilityError::WrongBackend {
                expected: Backend::TeamChat,
                actual: Backend::GuildChat,
            }
        );
        assert!(msg.as_guild_chat().is_ok());
    }

    #[test]
    fn match_groups_from_captures() {
        let re = regex_lite::Regex::new(r"(\w+)(-(\d+))?").unwrap();
        let caps = re.captures("abc").unwrap();
        let groups = MatchGroups::from_captures(&caps);
        assert_eq!(groups.len(), 4);
        assert_eq!(groups.get(1), Some("abc"));
        assert_eq!(groups.get(3), None);
        assert_eq!(&groups[3], "");
    }
}

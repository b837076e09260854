//! Wire types of the team-chat realtime protocol and Web API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use botfarm_core::{SelfIdentity, TeamChatEvent, TeamIdentity};

// =============================================================================
// Inbound realtime frames
// =============================================================================

/// Error object attached to a failed acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ReplyError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
}

/// Acknowledgment of a frame this client sent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Reply {
    /// Id of the frame being acknowledged.
    pub reply_to: u64,
    #[serde(default)]
    pub ok: bool,
    /// Timestamp of the created message.
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub error: Option<ReplyError>,
}

/// A decoded realtime frame.
#[derive(Debug, Clone, PartialEq)]
pub enum RtmFrame {
    /// A `message` event.
    Message(TeamChatEvent),
    /// The server accepted the connection.
    Hello,
    /// The server is about to close the connection.
    Goodbye,
    /// Acknowledgment of a sent message or ping.
    Reply(Reply),
    /// Any other event type.
    Other(String),
}

impl RtmFrame {
    /// Decodes a text frame.
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        if value.get("reply_to").is_some() {
            return Ok(Self::Reply(serde_json::from_value(value)?));
        }
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        Ok(match kind.as_str() {
            "message" => Self::Message(serde_json::from_value(value)?),
            "hello" => Self::Hello,
            "goodbye" => Self::Goodbye,
            _ => Self::Other(kind),
        })
    }
}

// =============================================================================
// Outbound realtime frames
// =============================================================================

/// A frame sent over the realtime socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingFrame<'a> {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
}

impl<'a> OutgoingFrame<'a> {
    pub fn message(id: u64, channel: &'a str, text: &'a str) -> Self {
        Self {
            id,
            kind: "message",
            channel: Some(channel),
            text: Some(text),
        }
    }

    pub fn typing(id: u64, channel: &'a str) -> Self {
        Self {
            id,
            kind: "typing",
            channel: Some(channel),
            text: None,
        }
    }

    pub fn ping(id: u64) -> Self {
        Self {
            id,
            kind: "ping",
            channel: None,
            text: None,
        }
    }
}

// =============================================================================
// Web API
// =============================================================================

/// Result of `rtm.connect`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RtmConnectResponse {
    /// Realtime socket URL.
    pub url: String,
    #[serde(rename = "self")]
    pub user: SelfIdentity,
    pub team: TeamIdentity,
}

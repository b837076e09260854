//! Gateway payloads and REST objects.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use botfarm_core::GuildAuthor;

/// Gateway opcodes.
pub mod opcode {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

/// Envelope of every gateway frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewayPayload {
    /// The `IDENTIFY` frame sent after `HELLO`.
    pub fn identify(token: &str, intents: u64) -> Self {
        Self {
            op: opcode::IDENTIFY,
            d: json!({
                "token": token,
                "intents": intents,
                "properties": {
                    "os": std::env::consts::OS,
                    "browser": "botfarm",
                    "device": "botfarm",
                },
            }),
            s: None,
            t: None,
        }
    }

    /// A heartbeat carrying the last sequence number seen.
    pub fn heartbeat(seq: Option<u64>) -> Self {
        Self {
            op: opcode::HEARTBEAT,
            d: seq.map_or(Value::Null, Value::from),
            s: None,
            t: None,
        }
    }
}

/// `HELLO` data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Hello {
    /// Milliseconds between heartbeats.
    pub heartbeat_interval: u64,
}

/// `READY` dispatch data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Ready {
    pub session_id: String,
    pub user: GuildAuthor,
}

/// `MESSAGE_CREATE` dispatch data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageCreate {
    pub id: String,
    pub channel_id: String,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub content: String,
    pub author: GuildAuthor,
}

/// A message returned by `POST /channels/{id}/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedMessage {
    pub id: String,
    pub channel_id: String,
}

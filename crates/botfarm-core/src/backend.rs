//! Backend tags.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The messaging backend an event or message originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Socket-based team-chat protocol (realtime socket plus a Web API client).
    #[serde(alias = "slack")]
    TeamChat,
    /// Gateway-based guild-chat protocol.
    #[serde(alias = "discord")]
    GuildChat,
}

impl Backend {
    /// All backends, in the order sessions subscribe to them.
    pub const ALL: [Backend; 2] = [Backend::TeamChat, Backend::GuildChat];

    /// Returns the tag as a string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TeamChat => "team-chat",
            Self::GuildChat => "guild-chat",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

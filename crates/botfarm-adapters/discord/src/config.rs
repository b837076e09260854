//! Configuration for the guild-chat adapter.
//!
//! ```toml
//! [guild_chat]
//! api_url = "https://discord.com/api/v10"
//! gateway_url = "wss://gateway.discord.gg/?v=10&encoding=json"
//! typing_interval_secs = 8
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// `GUILD_MESSAGES`
pub const INTENT_GUILD_MESSAGES: u64 = 1 << 9;
/// `DIRECT_MESSAGES`
pub const INTENT_DIRECT_MESSAGES: u64 = 1 << 12;
/// `MESSAGE_CONTENT` (privileged)
pub const INTENT_MESSAGE_CONTENT: u64 = 1 << 15;

/// Guild-chat adapter configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token.
    #[serde(skip)]
    pub token: String,

    /// REST API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Gateway socket URL.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Gateway intents.
    #[serde(default = "default_intents")]
    pub intents: u64,

    /// How often a running typing indicator is refreshed.
    #[serde(default = "default_typing_interval")]
    pub typing_interval_secs: u64,
}

fn default_api_url() -> String {
    "https://discord.com/api/v10".to_owned()
}

fn default_gateway_url() -> String {
    "wss://gateway.discord.gg/?v=10&encoding=json".to_owned()
}

fn default_intents() -> u64 {
    INTENT_GUILD_MESSAGES | INTENT_DIRECT_MESSAGES | INTENT_MESSAGE_CONTENT
}

fn default_typing_interval() -> u64 {
    8
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: default_api_url(),
            gateway_url: default_gateway_url(),
            intents: default_intents(),
            typing_interval_secs: default_typing_interval(),
        }
    }
}

impl DiscordConfig {
    /// Default configuration with the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Default::default()
        }
    }

    /// Replaces the token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub(crate) fn typing_interval(&self) -> Duration {
        Duration::from_secs(self.typing_interval_secs.max(1))
    }
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("gateway_url", &self.gateway_url)
            .field("intents", &self.intents)
            .field("typing_interval_secs", &self.typing_interval_secs)
            .finish()
    }
}

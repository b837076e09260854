//! Configuration for the team-chat adapter.
//!
//! ```toml
//! [team_chat]
//! api_url = "https://slack.com/api"
//! ack_timeout_secs = 30
//! ping_interval_secs = 30
//! ```
//!
//! The token is a secret and is not read from the file; the runtime resolves
//! it and passes it to [`SlackConfig::new`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Team-chat adapter configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Bot token.
    #[serde(skip)]
    pub token: String,

    /// Web API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// How long to wait for the acknowledgment of a sent message.
    #[serde(default = "default_ack_timeout")]
    pub ack_timeout_secs: u64,

    /// Interval of keep-alive pings on the realtime socket (0 to disable).
    #[serde(default = "default_ping_interval")]
    pub ping_interval_secs: u64,
}

fn default_api_url() -> String {
    "https://slack.com/api".to_owned()
}

fn default_ack_timeout() -> u64 {
    30
}

fn default_ping_interval() -> u64 {
    30
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: default_api_url(),
            ack_timeout_secs: default_ack_timeout(),
            ping_interval_secs: default_ping_interval(),
        }
    }
}

impl SlackConfig {
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

    /// Sets the Web API base URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub(crate) fn ack_timeout(&self) -> Duration {
        Duration::from_secs(self.ack_timeout_secs)
    }

    pub(crate) fn ping_interval(&self) -> Option<Duration> {
        (self.ping_interval_secs > 0).then(|| Duration::from_secs(self.ping_interval_secs))
    }
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("ack_timeout_secs", &self.ack_timeout_secs)
            .field("ping_interval_secs", &self.ping_interval_secs)
            .finish()
    }
}

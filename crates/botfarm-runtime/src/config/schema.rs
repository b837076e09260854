//! Configuration schema definitions.
//!
//! ```toml
//! [logging]
//! level = "debug"
//! format = "pretty"
//!
//! [logging.filters]
//! botfarm_transport = "warn"
//!
//! [team_chat]
//! ack_timeout_secs = 10
//!
//! [guild_chat]
//! typing_interval_secs = 8
//!
//! [bots.cbf-test]
//! greeting = "hi"
//! ```
//!
//! A backend is enabled by the presence of its section. Its token is a
//! secret and never read from the file; see [`secrets`](super::secrets).

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use figment::value::Value;
use serde::{Deserialize, Serialize};

use botfarm_adapter_discord::DiscordConfig;
use botfarm_adapter_slack::SlackConfig;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FarmConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Team-chat backend settings; `None` leaves the backend disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_chat: Option<SlackConfig>,

    /// Guild-chat backend settings; `None` leaves the backend disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_chat: Option<DiscordConfig>,

    /// Per-bot settings keyed by bot id, extracted on demand into each bot's
    /// own type.
    #[serde(default)]
    pub bots: BTreeMap<String, Value>,
}

// =============================================================================
// Logging
// =============================================================================

/// Log level names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// JSON lines; needs the `json-log` feature, otherwise `full` is used.
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base level; `RUST_LOG` takes precedence when set.
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file for `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Per-target levels, e.g. `botfarm_transport = "warn"`.
    #[serde(default)]
    pub filters: BTreeMap<String, LogLevel>,

    /// Include thread ids.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include file names and line numbers.
    #[serde(default)]
    pub file_location: bool,
}

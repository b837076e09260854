//! Session options.
//!
//! Options are plain serde structs so bot definitions can carry them in
//! configuration files as well as build them in code:
//!
//! ```rust,ignore
//! let options = SessionOptions::new("cbf-test")
//!     .with_team_chat(TeamChatOptions::new().command(CommandStyle::Mention))
//!     .with_guild_chat(GuildChatOptions::with_prefix("$"));
//! ```
//!
//! ```toml
//! id = "cbf-test"
//! providers = ["team-chat", "guild-chat"]
//!
//! [team_chat]
//! commands = ["mention"]
//!
//! [guild_chat]
//! prefix = "$"
//! ```

use serde::{Deserialize, Serialize};

use botfarm_core::Backend;

/// How a team-chat command may be invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStyle {
    /// Slash commands. Accepted for compatibility; installs no listener.
    Slash,
    /// `<@self> command`.
    Mention,
    /// `<prefix>command`.
    Prefix,
}

/// Team-chat connection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamChatMode {
    /// Realtime messaging socket.
    #[default]
    Rtm,
}

/// Team-chat options of a session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeamChatOptions {
    #[serde(default)]
    pub mode: TeamChatMode,
    /// Enabled command styles; each one installs its own listener per command.
    #[serde(default)]
    pub commands: Vec<CommandStyle>,
    /// Prefix for [`CommandStyle::Prefix`].
    #[serde(default)]
    pub prefix: Option<String>,
}

impl TeamChatOptions {
    /// Options with no command style enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables a command style.
    pub fn command(mut self, style: CommandStyle) -> Self {
        if !self.commands.contains(&style) {
            self.commands.push(style);
        }
        self
    }

    /// Sets the command prefix and enables [`CommandStyle::Prefix`].
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self.command(CommandStyle::Prefix)
    }
}

/// Guild-chat options of a session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GuildChatOptions {
    /// Command prefix.
    #[serde(default)]
    pub prefix: Option<String>,
}

impl GuildChatOptions {
    /// Options with the given command prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

/// Options for one bot session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Session id (the bot id). Namespaces the brain and scopes teardown.
    pub id: String,
    /// Backends this session listens on.
    #[serde(default)]
    pub providers: Vec<Backend>,
    #[serde(default, alias = "slack")]
    pub team_chat: Option<TeamChatOptions>,
    #[serde(default, alias = "discord")]
    pub guild_chat: Option<GuildChatOptions>,
}

impl SessionOptions {
    /// Options for a session with no backend.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            providers: Vec::new(),
            team_chat: None,
            guild_chat: None,
        }
    }

    /// Enables the team-chat backend.
    pub fn with_team_chat(mut self, options: TeamChatOptions) -> Self {
        self.enable(Backend::TeamChat);
        self.team_chat = Some(options);
        self
    }

    /// Enables the guild-chat backend.
    pub fn with_guild_chat(mut self, options: GuildChatOptions) -> Self {
        self.enable(Backend::GuildChat);
        self.guild_chat = Some(options);
        self
    }

    /// Returns true if the session listens on `backend`.
    pub fn uses(&self, backend: Backend) -> bool {
        self.providers.contains(&backend)
    }

    fn enable(&mut self, backend: Backend) {
        if !self.uses(backend) {
            self.providers.push(backend);
        }
    }
}

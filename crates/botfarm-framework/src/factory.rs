//! Session construction.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use botfarm_core::{Backend, BoxedGuildChatGateway, BoxedTeamChatProvider, Brain, FarmBus};

use crate::error::{SessionError, SessionResult};
use crate::options::SessionOptions;
use crate::session::BotSession;

/// Creates [`BotSession`]s from [`SessionOptions`].
///
/// The factory holds the farm-wide collaborators: the backend clients, the
/// brain and the bus. Backends are optional; creating a session that asks
/// for a missing one fails with [`SessionError::BackendUnavailable`].
#[derive(Clone)]
pub struct SessionFactory {
    team_chat: Option<BoxedTeamChatProvider>,
    guild_chat: Option<BoxedGuildChatGateway>,
    brain: Arc<dyn Brain>,
    bus: FarmBus,
}

impl SessionFactory {
    /// Creates a factory without backends.
    pub fn new(brain: Arc<dyn Brain>, bus: FarmBus) -> Self {
        Self {
            team_chat: None,
            guild_chat: None,
            brain,
            bus,
        }
    }

    /// Adds the team-chat provider.
    pub fn with_team_chat(mut self, provider: BoxedTeamChatProvider) -> Self {
        self.team_chat = Some(provider);
        self
    }

    /// Adds the guild-chat gateway.
    pub fn with_guild_chat(mut self, gateway: BoxedGuildChatGateway) -> Self {
        self.guild_chat = Some(gateway);
        self
    }

    /// The bus handed to every created session.
    pub fn bus(&self) -> &FarmBus {
        &self.bus
    }

    /// Creates a session.
    ///
    /// Connects the team-chat backend first if the session uses it (the
    /// provider shares one connection among all sessions), then attaches the
    /// guild-chat gateway and the brain scope for `options.id`.
    pub async fn create(&self, options: SessionOptions) -> SessionResult<BotSession> {
        let team_chat = if options.uses(Backend::TeamChat) {
            let provider = self
                .team_chat
                .as_ref()
                .ok_or(SessionError::BackendUnavailable {
                    backend: Backend::TeamChat,
                })?;
            let handles = provider
                .connect()
                .await
                .map_err(|source| SessionError::Connect {
                    backend: Backend::TeamChat,
                    source,
                })?;
            Some(handles)
        } else {
            None
        };

        let guild_chat = if options.uses(Backend::GuildChat) {
            let gateway = self
                .guild_chat
                .as_ref()
                .ok_or(SessionError::BackendUnavailable {
                    backend: Backend::GuildChat,
                })?;
            Some(Arc::clone(gateway))
        } else {
            None
        };

        let brain = self.brain.scope(&options.id);
        info!(bot_id = %options.id, providers = ?options.providers, "Session created");
        Ok(BotSession::new(
            options,
            team_chat,
            guild_chat,
            brain,
            self.bus.clone(),
        ))
    }
}

impl fmt::Debug for SessionFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionFactory")
            .field("team_chat", &self.team_chat.is_some())
            .field("guild_chat", &self.guild_chat.is_some())
            .field("bus", &self.bus)
            .finish()
    }
}

//! Bot sessions and the Listener Router.
//!
//! A [`BotSession`] is one activation of a bot definition. Bot code registers
//! listeners on it with [`hear`](BotSession::hear) and
//! [`command`](BotSession::command); every registration subscribes a raw-event
//! listener on each selected backend and records a cleanup on the
//! [`FarmBus`] under the session id, so a shutdown or a reload of that id
//! removes exactly the listeners this session installed.
//!
//! Registrations are never deduplicated: hearing the same pattern twice
//! installs two listeners and runs the callback twice per match.
//!
//! Matched callbacks run as spawned tasks. Tearing a listener down stops
//! future dispatch only; callbacks already running are left to finish.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use botfarm_core::{
    Backend, BoxedGuildChatGateway, BrainScope, FarmBus, GuildChatEvent, Message, RawEvent,
    TeamChatEvent, TeamChatHandles,
};

use crate::compat::HubotCompat;
use crate::error::{RegistrationError, RegistrationResult};
use crate::handler::{BoxedHandler, Handler, into_handler};
use crate::options::{CommandStyle, SessionOptions};
use crate::pattern::{CommandPrefix, CompiledPattern, Pattern};

struct SessionInner {
    options: SessionOptions,
    team_chat: Option<TeamChatHandles>,
    guild_chat: Option<BoxedGuildChatGateway>,
    brain: Arc<dyn BrainScope>,
    bus: FarmBus,
}

/// One activation of a bot definition.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct BotSession {
    inner: Arc<SessionInner>,
}

impl BotSession {
    /// Assembles a session from already connected backends.
    ///
    /// Usually called through [`SessionFactory::create`](crate::SessionFactory::create).
    pub fn new(
        options: SessionOptions,
        team_chat: Option<TeamChatHandles>,
        guild_chat: Option<BoxedGuildChatGateway>,
        brain: Arc<dyn BrainScope>,
        bus: FarmBus,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                options,
                team_chat,
                guild_chat,
                brain,
                bus,
            }),
        }
    }

    /// The session id.
    pub fn id(&self) -> &str {
        &self.inner.options.id
    }

    /// The options the session was created with.
    pub fn options(&self) -> &SessionOptions {
        &self.inner.options
    }

    /// Direct access to the team-chat backend, if the session uses it.
    pub fn team_chat(&self) -> Option<&TeamChatHandles> {
        self.inner.team_chat.as_ref()
    }

    /// Direct access to the guild-chat gateway, if the session uses it.
    pub fn guild_chat(&self) -> Option<&BoxedGuildChatGateway> {
        self.inner.guild_chat.as_ref()
    }

    /// The session's key-value scope.
    pub fn brain(&self) -> &Arc<dyn BrainScope> {
        &self.inner.brain
    }

    /// The lifecycle bus the session's listeners are registered on.
    pub fn bus(&self) -> &FarmBus {
        &self.inner.bus
    }

    /// The legacy framework adapter over this session's brain.
    pub fn hubot_compat(&self) -> HubotCompat {
        HubotCompat::new(Arc::clone(&self.inner.brain))
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Runs `handler` for every message on any backend of this session whose
    /// text matches `pattern`.
    ///
    /// Text patterns match case-insensitively.
    pub fn hear<P, H>(&self, pattern: P, handler: H) -> RegistrationResult<()>
    where
        P: Into<Pattern>,
        H: Handler,
    {
        self.hear_on(pattern, handler, None)
    }

    /// Like [`hear`](Self::hear), optionally narrowed by a backend filter.
    ///
    /// Only [`Backend::TeamChat`] acts as a filter value: `None` and
    /// `Some(TeamChat)` select every backend of the session, and
    /// `Some(GuildChat)` selects none: both backend branches test for the
    /// team-chat tag, so a guild-chat filter does not narrow to guild-chat.
    pub fn hear_on<P, H>(
        &self,
        pattern: P,
        handler: H,
        filter: Option<Backend>,
    ) -> RegistrationResult<()>
    where
        P: Into<Pattern>,
        H: Handler,
    {
        let pattern = Arc::new(pattern.into().compile()?);
        let handler = into_handler(handler);
        let selected = filter.is_none() || filter == Some(Backend::TeamChat);

        if selected && let Some(handles) = &self.inner.team_chat {
            self.subscribe_team_chat(handles, Arc::clone(&pattern), Arc::clone(&handler));
        }
        if selected && let Some(gateway) = &self.inner.guild_chat {
            self.subscribe_guild_chat(gateway, pattern, handler);
        }
        Ok(())
    }

    /// Runs `handler` for messages invoking `pattern` as a command.
    ///
    /// One listener is installed per enabled command style and backend (see
    /// [`CommandPrefix`]), so a session with both mention and prefix styles
    /// gets two independent team-chat listeners for the same command.
    ///
    /// Fails without installing anything when a prefix or the bot's own
    /// identity is needed but missing.
    pub fn command<P, H>(&self, pattern: P, handler: H) -> RegistrationResult<()>
    where
        P: Into<Pattern>,
        H: Handler,
    {
        let body = pattern.into();
        let compiled = self
            .command_prefixes()?
            .iter()
            .map(|rule| Ok((rule.backend(), Arc::new(rule.apply(&body)?))))
            .collect::<RegistrationResult<Vec<_>>>()?;
        let handler = into_handler(handler);

        for (backend, pattern) in compiled {
            match backend {
                Backend::TeamChat => {
                    if let Some(handles) = &self.inner.team_chat {
                        self.subscribe_team_chat(handles, pattern, Arc::clone(&handler));
                    }
                }
                Backend::GuildChat => {
                    if let Some(gateway) = &self.inner.guild_chat {
                        self.subscribe_guild_chat(gateway, pattern, Arc::clone(&handler));
                    }
                }
            }
        }
        Ok(())
    }

    /// Builds the prefix rules for every enabled command style.
    pub fn command_prefixes(&self) -> RegistrationResult<Vec<CommandPrefix>> {
        let mut rules = Vec::new();

        if let Some(handles) = &self.inner.team_chat {
            let options = self.inner.options.team_chat.as_ref().ok_or(
                RegistrationError::BackendNotConfigured {
                    backend: Backend::TeamChat,
                },
            )?;
            for style in &options.commands {
                match style {
                    CommandStyle::Slash => continue,
                    CommandStyle::Prefix => {
                        let prefix = non_empty(options.prefix.as_deref()).ok_or(
                            RegistrationError::MissingPrefix {
                                backend: Backend::TeamChat,
                            },
                        )?;
                        rules.push(CommandPrefix::TeamPrefix(prefix.to_owned()));
                    }
                    CommandStyle::Mention => {
                        let identity = handles.identity.as_ref().ok_or(
                            RegistrationError::MissingIdentity {
                                backend: Backend::TeamChat,
                            },
                        )?;
                        rules.push(CommandPrefix::TeamMention(identity.user.id.clone()));
                    }
                }
            }
        }

        if self.inner.guild_chat.is_some() {
            let prefix = self
                .inner
                .options
                .guild_chat
                .as_ref()
                .and_then(|o| non_empty(o.prefix.as_deref()))
                .ok_or(RegistrationError::MissingPrefix {
                    backend: Backend::GuildChat,
                })?;
            rules.push(CommandPrefix::GuildPrefix(prefix.to_owned()));
        }

        Ok(rules)
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    fn subscribe_team_chat(
        &self,
        handles: &TeamChatHandles,
        pattern: Arc<CompiledPattern>,
        handler: BoxedHandler,
    ) {
        let source = pattern.as_str().to_owned();
        let wrap_handles = handles.clone();
        let id = handles
            .realtime
            .events()
            .subscribe(move |event: &TeamChatEvent| {
                if let Some(groups) = pattern.match_text(event.text()) {
                    let msg = Message::wrap_team_chat(event.clone(), groups, &wrap_handles);
                    tokio::spawn(handler(msg));
                }
            });

        let realtime = Arc::clone(&handles.realtime);
        self.inner.bus.on_shutdown(self.id(), move || {
            realtime.events().unsubscribe(id);
            Ok(())
        });
        debug!(bot_id = %self.id(), backend = %Backend::TeamChat, pattern = %source, listener = %id, "Listener registered");
    }

    fn subscribe_guild_chat(
        &self,
        gateway: &BoxedGuildChatGateway,
        pattern: Arc<CompiledPattern>,
        handler: BoxedHandler,
    ) {
        let source = pattern.as_str().to_owned();
        let id = gateway.events().subscribe(move |event: &GuildChatEvent| {
            if let Some(groups) = pattern.match_text(event.text()) {
                let msg = Message::wrap_guild_chat(event.clone(), groups);
                tokio::spawn(handler(msg));
            }
        });

        let gateway = Arc::clone(gateway);
        self.inner.bus.on_shutdown(self.id(), move || {
            gateway.events().unsubscribe(id);
            Ok(())
        });
        debug!(bot_id = %self.id(), backend = %Backend::GuildChat, pattern = %source, listener = %id, "Listener registered");
    }
}

impl fmt::Debug for BotSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotSession")
            .field("id", &self.id())
            .field("providers", &self.inner.options.providers)
            .finish_non_exhaustive()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

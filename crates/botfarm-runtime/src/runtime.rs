//! Farm runtime: wires configuration, backends and bots together.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use botfarm_runtime::FarmRuntime;
//!
//! let runtime = FarmRuntime::builder()
//!     .config_file("botfarm.toml")
//!     .profile("production")
//!     .build()?;
//!
//! runtime.register_bot(ping_bot())?;
//! runtime.run().await?;
//! ```
//!
//! # Lifecycle
//!
//! [`start`](FarmRuntime::start) resolves backend tokens from the secret
//! sources, logs in to the guild-chat gateway, prepares the team-chat
//! provider (it connects when the first session asks for it) and activates
//! every registered bot in order. A bot whose activation fails is logged and
//! skipped; the others still start.
//!
//! [`reload`](FarmRuntime::reload) announces a reload for one bot on the bus,
//! which removes exactly that bot's listeners, then activates it again.
//!
//! [`shutdown`](FarmRuntime::shutdown) announces a global shutdown and closes
//! the backend connections. It runs at most once.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tokio::signal;
use tracing::{debug, error, info, warn};

use botfarm_adapter_discord::DiscordGateway;
use botfarm_adapter_slack::SlackProvider;
use botfarm_core::{
    Backend, BoxedGuildChatGateway, BoxedTeamChatProvider, Brain, FarmBus, InMemoryBrain,
};
use botfarm_framework::SessionFactory;

use crate::bot::{BotDefinition, BoxedBotDefinition, FarmContext};
use crate::config::{ConfigLoader, FarmConfig, SecretSource};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;
use crate::registry::BotRegistry;

/// Secret holding the team-chat bot token.
pub const TEAM_CHAT_TOKEN: &str = "SLACK_TOKEN";

/// Secret holding the guild-chat bot token.
pub const GUILD_CHAT_TOKEN: &str = "DISCORD_TOKEN";

struct Started {
    factory: SessionFactory,
    slack: Option<Arc<SlackProvider>>,
    discord: Option<Arc<DiscordGateway>>,
}

/// The process-wide bot host.
pub struct FarmRuntime {
    config: FarmConfig,
    registry: BotRegistry,
    bus: FarmBus,
    brain: Arc<dyn Brain>,
    team_chat: Option<BoxedTeamChatProvider>,
    guild_chat: Option<BoxedGuildChatGateway>,
    started: RwLock<Option<Started>>,
    shut_down: AtomicBool,
}

impl FarmRuntime {
    /// Creates a runtime builder that loads configuration from files and
    /// the environment.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already loaded configuration and installs
    /// logging from it.
    pub fn from_config(config: FarmConfig) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            log_level = %config.logging.level,
            team_chat = config.team_chat.is_some(),
            guild_chat = config.guild_chat.is_some(),
            "Runtime initialized from configuration"
        );

        Self {
            config,
            registry: BotRegistry::new(),
            bus: FarmBus::new(),
            brain: Arc::new(InMemoryBrain::new()),
            team_chat: None,
            guild_chat: None,
            started: RwLock::new(None),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Uses `provider` for team chat instead of the configured backend.
    pub fn with_team_chat(mut self, provider: BoxedTeamChatProvider) -> Self {
        self.team_chat = Some(provider);
        self
    }

    /// Uses `gateway` for guild chat instead of the configured backend.
    pub fn with_guild_chat(mut self, gateway: BoxedGuildChatGateway) -> Self {
        self.guild_chat = Some(gateway);
        self
    }

    /// Replaces the in-memory brain.
    pub fn with_brain(mut self, brain: Arc<dyn Brain>) -> Self {
        self.brain = brain;
        self
    }

    pub fn config(&self) -> &FarmConfig {
        &self.config
    }

    /// The Shutdown/Reload Bus shared by every session.
    pub fn bus(&self) -> &FarmBus {
        &self.bus
    }

    pub fn brain(&self) -> &Arc<dyn Brain> {
        &self.brain
    }

    pub fn registry(&self) -> &BotRegistry {
        &self.registry
    }

    /// Registers a bot. Bots registered after [`start`](Self::start) are not
    /// activated until [`activate`](Self::activate) is called for them.
    pub fn register_bot<B: BotDefinition>(&self, bot: B) -> RuntimeResult<()> {
        self.registry.register(bot)
    }

    pub fn is_started(&self) -> bool {
        self.started.read().is_some()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Connects the backends and activates every registered bot.
    pub async fn start(&self) -> RuntimeResult<()> {
        if self.is_started() {
            warn!("Runtime is already started");
            return Ok(());
        }

        info!("Starting botfarm runtime");
        let started = self.connect_backends().await?;
        *self.started.write() = Some(started);

        let bots = self.registry.all();
        let mut active = 0usize;
        for bot in &bots {
            match self.activate_definition(bot).await {
                Ok(()) => active += 1,
                Err(e) => error!(bot_id = %bot.id(), error = %e, "Bot failed to start"),
            }
        }

        info!(active, total = bots.len(), "Runtime started");
        Ok(())
    }

    /// Activates one registered bot.
    pub async fn activate(&self, bot_id: &str) -> RuntimeResult<()> {
        let bot = self
            .registry
            .get(bot_id)
            .ok_or_else(|| RuntimeError::BotNotFound(bot_id.to_owned()))?;
        self.activate_definition(&bot).await
    }

    /// Tears down one bot's listeners and activates it again.
    pub async fn reload(&self, bot_id: &str) -> RuntimeResult<()> {
        if self.registry.get(bot_id).is_none() {
            return Err(RuntimeError::BotNotFound(bot_id.to_owned()));
        }
        info!(bot_id, "Reloading bot");
        self.bus.announce_reload(bot_id)?;
        self.activate(bot_id).await
    }

    /// Announces shutdown and closes the backend connections.
    ///
    /// Only the first call does anything. Connections are closed even when a
    /// cleanup fails; the cleanup error is returned afterwards.
    pub async fn shutdown(&self) -> RuntimeResult<()> {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            debug!("Shutdown already announced");
            return Ok(());
        }

        info!(listeners = self.bus.pending(), "Shutting down botfarm runtime");
        let teardown = self.bus.announce_shutdown();
        if let Err(e) = &teardown {
            error!(bot_id = %e.bot_id, error = %e, "Shutdown cleanup failed");
        }

        let started = self.started.write().take();
        if let Some(started) = started {
            if let Some(slack) = started.slack {
                slack.shutdown();
            }
            if let Some(discord) = started.discord {
                info!("Closing guild-chat gateway");
                discord.close();
            }
        }

        info!("Runtime stopped");
        teardown.map_err(RuntimeError::from)
    }

    /// Starts, waits for Ctrl+C or SIGTERM, then shuts down.
    pub async fn run(&self) -> RuntimeResult<()> {
        self.start().await?;
        info!("botfarm is running. Press Ctrl+C to stop.");
        wait_for_shutdown().await;
        self.shutdown().await
    }

    /// Starts, waits for `shutdown` to resolve, then shuts down.
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        self.start().await?;
        shutdown.await;
        self.shutdown().await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn connect_backends(&self) -> RuntimeResult<Started> {
        let mut factory = SessionFactory::new(Arc::clone(&self.brain), self.bus.clone());
        let mut slack = None;
        let mut discord = None;

        if let Some(provider) = &self.team_chat {
            factory = factory.with_team_chat(Arc::clone(provider));
        } else if let Some(config) = &self.config.team_chat {
            let token = SecretSource::new(TEAM_CHAT_TOKEN).resolve()?;
            let provider = SlackProvider::new(config.clone().with_token(token)).map_err(
                |source| RuntimeError::Connect {
                    backend: Backend::TeamChat,
                    source,
                },
            )?;
            let provider = Arc::new(provider);
            factory = factory.with_team_chat(provider.clone());
            slack = Some(provider);
            debug!("Team-chat backend enabled");
        }

        if let Some(gateway) = &self.guild_chat {
            factory = factory.with_guild_chat(Arc::clone(gateway));
        } else if let Some(config) = &self.config.guild_chat {
            let token = SecretSource::new(GUILD_CHAT_TOKEN).resolve()?;
            let gateway = DiscordGateway::connect(config.clone().with_token(token))
                .await
                .map_err(|source| RuntimeError::Connect {
                    backend: Backend::GuildChat,
                    source,
                })?;
            info!("Guild-chat gateway connected");
            factory = factory.with_guild_chat(gateway.clone());
            discord = Some(gateway);
        }

        Ok(Started {
            factory,
            slack,
            discord,
        })
    }

    async fn activate_definition(&self, bot: &BoxedBotDefinition) -> RuntimeResult<()> {
        let factory = self
            .started
            .read()
            .as_ref()
            .map(|s| s.factory.clone())
            .ok_or(RuntimeError::NotStarted)?;

        let bot_id = bot.id().to_owned();
        let ctx = FarmContext::new(
            bot_id.clone(),
            factory,
            bot.config_defaults(),
            self.config.bots.get(&bot_id).cloned(),
        );

        bot.activate(ctx)
            .await
            .map_err(|source| RuntimeError::Activation {
                bot_id: bot_id.clone(),
                source,
            })?;
        info!(bot_id = %bot_id, listeners = self.bus.pending_for(&bot_id), "Bot activated");
        Ok(())
    }
}

impl std::fmt::Debug for FarmRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FarmRuntime")
            .field("registry", &self.registry)
            .field("bus", &self.bus)
            .field("started", &self.is_started())
            .field("shut_down", &self.shut_down.load(Ordering::SeqCst))
            .finish()
    }
}

/// Waits for Ctrl+C or, on unix, SIGTERM.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to register SIGTERM handler"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for a [`FarmRuntime`] with custom configuration sources.
///
/// ```rust,ignore
/// let runtime = FarmRuntime::builder()
///     .config_file("config/production.toml")
///     .set("logging.level", "debug")
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    /// Loads exactly this configuration file.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g. "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Enables `BOTFARM_*` environment overrides (enabled by default).
    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    /// Disables `BOTFARM_*` environment overrides.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges a configuration above every other source.
    pub fn merge(mut self, config: FarmConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Sets a single value by dotted key.
    pub fn set<T: serde::Serialize>(mut self, key: &str, value: T) -> Self {
        self.config_loader = self.config_loader.set(key, value);
        self
    }

    /// Loads the configuration and builds the runtime.
    pub fn build(self) -> RuntimeResult<FarmRuntime> {
        let config = self.config_loader.load()?;
        Ok(FarmRuntime::from_config(config))
    }
}

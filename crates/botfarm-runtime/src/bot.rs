//! Bot definitions.
//!
//! A bot is an id plus an async `activate` function. The runtime calls
//! `activate` once at startup and again after every reload of that id; the
//! bot creates its session(s) through the [`FarmContext`] and installs its
//! listeners.
//!
//! ```rust,ignore
//! use botfarm_runtime::{FarmContext, bot_fn};
//!
//! let ping = bot_fn("cbf-test", |ctx: FarmContext| async move {
//!     let session = ctx.create(options).await?;
//!     session.hear("ping", |msg: Message| async move { "PONG".to_owned() })?;
//!     Ok::<_, BoxError>(())
//! });
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use figment::Figment;
use figment::providers::Serialized;
use figment::value::Value;
use serde::de::DeserializeOwned;

use botfarm_core::{BoxError, FarmBus};
use botfarm_framework::{BotSession, SessionFactory, SessionOptions, SessionResult};

use crate::error::{RuntimeError, RuntimeResult};

/// A bot the runtime can activate.
#[async_trait]
pub trait BotDefinition: Send + Sync + 'static {
    /// Unique bot id; also the default session id.
    fn id(&self) -> &str;

    /// Defaults for the bot's `[bots.<id>]` settings.
    fn config_defaults(&self) -> Option<serde_json::Value> {
        None
    }

    /// Creates sessions and installs listeners.
    async fn activate(&self, ctx: FarmContext) -> Result<(), BoxError>;
}

/// A shared bot definition.
pub type BoxedBotDefinition = Arc<dyn BotDefinition>;

/// What a bot gets to work with during activation.
#[derive(Clone)]
pub struct FarmContext {
    bot_id: String,
    factory: SessionFactory,
    defaults: Option<serde_json::Value>,
    settings: Option<Value>,
}

impl FarmContext {
    pub(crate) fn new(
        bot_id: impl Into<String>,
        factory: SessionFactory,
        defaults: Option<serde_json::Value>,
        settings: Option<Value>,
    ) -> Self {
        Self {
            bot_id: bot_id.into(),
            factory,
            defaults,
            settings,
        }
    }

    /// Id of the bot being activated.
    pub fn bot_id(&self) -> &str {
        &self.bot_id
    }

    /// The process-wide Shutdown/Reload Bus.
    pub fn bus(&self) -> &FarmBus {
        self.factory.bus()
    }

    /// Creates a session.
    pub async fn create(&self, options: SessionOptions) -> SessionResult<BotSession> {
        self.factory.create(options).await
    }

    /// Extracts the bot's `[bots.<id>]` settings, layered over
    /// [`BotDefinition::config_defaults`].
    pub fn settings<T: DeserializeOwned>(&self) -> RuntimeResult<T> {
        let mut figment = Figment::new();
        if let Some(defaults) = &self.defaults {
            figment = figment.merge(Serialized::defaults(defaults));
        }
        if let Some(settings) = &self.settings {
            figment = figment.merge(Serialized::defaults(settings));
        }
        figment.extract().map_err(|e| RuntimeError::BotSettings {
            bot_id: self.bot_id.clone(),
            message: e.to_string(),
        })
    }
}

impl std::fmt::Debug for FarmContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FarmContext")
            .field("bot_id", &self.bot_id)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Closure-backed definitions
// =============================================================================

/// A bot defined by an id and an activation closure.
pub struct FnBot<F> {
    id: String,
    defaults: Option<serde_json::Value>,
    activate: F,
}

/// Defines a bot from a closure.
pub fn bot_fn<F, Fut>(id: impl Into<String>, activate: F) -> FnBot<F>
where
    F: Fn(FarmContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    FnBot {
        id: id.into(),
        defaults: None,
        activate,
    }
}

impl<F> FnBot<F> {
    /// Sets the settings defaults.
    pub fn with_defaults(mut self, defaults: serde_json::Value) -> Self {
        self.defaults = Some(defaults);
        self
    }
}

#[async_trait]
impl<F, Fut> BotDefinition for FnBot<F>
where
    F: Fn(FarmContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn config_defaults(&self) -> Option<serde_json::Value> {
        self.defaults.clone()
    }

    async fn activate(&self, ctx: FarmContext) -> Result<(), BoxError> {
        (self.activate)(ctx).await
    }
}

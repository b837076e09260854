//! Runtime error types.

use thiserror::Error;

use botfarm_core::{BoxError, TeardownError, TransportError};

use crate::config::ConfigError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or a secret could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A backend could not be connected at startup.
    #[error("Failed to connect {backend} backend: {source}")]
    Connect {
        backend: botfarm_core::Backend,
        #[source]
        source: TransportError,
    },

    /// A bot's activation failed.
    #[error("Failed to activate bot {bot_id}: {source}")]
    Activation {
        bot_id: String,
        #[source]
        source: BoxError,
    },

    /// A bot's `[bots.<id>]` section does not fit its settings type.
    #[error("Invalid settings for bot {bot_id}: {message}")]
    BotSettings { bot_id: String, message: String },

    /// The operation needs a started runtime.
    #[error("Runtime has not been started")]
    NotStarted,

    /// Bot not found.
    #[error("Bot not found: {0}")]
    BotNotFound(String),

    /// Bot already exists.
    #[error("Bot already exists: {0}")]
    BotExists(String),

    /// A cleanup failed while tearing listeners down.
    #[error(transparent)]
    Teardown(#[from] TeardownError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

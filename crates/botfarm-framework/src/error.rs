//! Error types for the botfarm framework.

use thiserror::Error;

use botfarm_core::{Backend, TransportError};

/// Raised when a listener cannot be registered.
///
/// Registration is all-or-nothing: when `command` returns one of these, no
/// listener of that call has been installed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Mention-style commands need the bot's own identity, which the backend
    /// did not report.
    #[error("{backend} self identity is unknown; mention commands cannot be built")]
    MissingIdentity {
        /// Backend lacking the identity.
        backend: Backend,
    },

    /// A prefix-style command was requested without a prefix string.
    #[error("{backend} command prefix is not configured")]
    MissingPrefix {
        /// Backend lacking the prefix.
        backend: Backend,
    },

    /// The session is connected to a backend but has no options for it.
    #[error("{backend} is connected but has no command options")]
    BackendNotConfigured {
        /// Backend lacking options.
        backend: Backend,
    },

    /// The pattern (or the prefixed command pattern) does not compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern source.
        pattern: String,
        /// Compiler message.
        reason: String,
    },
}

/// Raised when a session cannot be created.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The options name a backend the factory has no client for.
    #[error("{backend} backend is not available in this farm")]
    BackendUnavailable {
        /// The missing backend.
        backend: Backend,
    },

    /// Connecting the backend failed.
    #[error("failed to connect {backend}: {source}")]
    Connect {
        /// Backend that failed.
        backend: Backend,
        /// Underlying transport error.
        #[source]
        source: TransportError,
    },
}

/// Raised by the legacy compatibility shim.
#[derive(Debug, Error)]
pub enum CompatError {
    /// The legacy member has no mapping onto botfarm.
    #[error("{0} is not supported")]
    Unsupported(&'static str),

    /// A brain value could not be (de)serialized.
    #[error("brain value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for listener registration.
pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Result type for session creation.
pub type SessionResult<T> = Result<T, SessionError>;

/// Result type for the legacy shim.
pub type CompatResult<T> = Result<T, CompatError>;

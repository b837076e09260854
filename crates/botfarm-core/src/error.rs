//! Unified error types for the botfarm core.
//!
//! Framework-level errors (registration, session creation, the legacy shim)
//! are defined in `botfarm-framework`.

use thiserror::Error;

use crate::backend::Backend;

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors raised by outbound backend operations (send, typing, reactions).
///
/// These are propagated unchanged to whatever bot logic invoked the operation;
/// the core never retries or swallows them.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {url} - {reason}")]
    ConnectionFailed {
        /// The URL that failed to connect.
        url: String,
        /// Reason for failure.
        reason: String,
    },

    /// Connection closed.
    #[error("connection closed: {reason}")]
    ConnectionClosed {
        /// Reason for closure.
        reason: String,
    },

    /// The backend is not connected yet (or anymore).
    #[error("{backend} backend is not connected")]
    NotConnected {
        /// The backend that is not connected.
        backend: Backend,
    },

    /// Message send failed.
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// The backend API answered with an error.
    #[error("{method} failed: {message}")]
    Api {
        /// API method or route that failed.
        method: String,
        /// Error description returned by the backend.
        message: String,
    },

    /// The backend did not acknowledge in time.
    #[error("timed out waiting for {0}")]
    Timeout(String),

    /// Failed to serialize/deserialize a payload.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O or HTTP level error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl TransportError {
    /// Creates an API error.
    pub fn api(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            method: method.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// =============================================================================
// Capability Errors
// =============================================================================

/// Raised when a capability is requested that the active message variant or
/// interface does not provide.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    /// A variant-specific view was requested on a message of another backend.
    #[error("message originates from {actual}, not {expected}")]
    WrongBackend {
        /// The backend the caller asked for.
        expected: Backend,
        /// The backend the message actually came from.
        actual: Backend,
    },

    /// The capability has no mapping at all.
    #[error("{0} is not supported")]
    Unsupported(&'static str),
}

// =============================================================================
// Teardown Errors
// =============================================================================

/// Boxed error type returned by cleanup callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A cleanup callback failed while the bus was tearing listeners down.
///
/// Remaining cleanups of the same announcement are not run.
#[derive(Debug, Error)]
#[error("cleanup for bot '{bot_id}' failed: {source}")]
pub struct TeardownError {
    /// Bot id the failing cleanup was registered under.
    pub bot_id: String,
    /// The error raised by the cleanup.
    #[source]
    pub source: BoxError,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for capability lookups.
pub type CapabilityResult<T> = Result<T, CapabilityError>;

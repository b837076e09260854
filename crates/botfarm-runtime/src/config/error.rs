//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found at the specified path.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// The sources could not be merged into the schema.
    #[error("Failed to extract configuration: {0}")]
    Extract(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {message}")]
    Validation { message: String },

    /// Required environment variable is not set and has no default.
    #[error("Env var {name} not found and no default given")]
    EnvVarMissing { name: String },

    /// Secret is neither in the environment nor mounted as a file.
    #[error("Secret {key} not mounted")]
    SecretNotMounted { key: String },

    /// The file named by `<KEY>_FILE` could not be read.
    #[error("Failed to read secret {key} from {}", path.display())]
    SecretUnreadable {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Creates a validation error with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Extract(err.to_string())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

//! Environment and secret sources.
//!
//! A secret is looked up in this order:
//!
//! 1. An environment variable named after the secret (accepted with a
//!    warning).
//! 2. The file named by `<KEY>_FILE` (a mounted secret); its content is
//!    trimmed.
//! 3. The default given to the source.
//!
//! Otherwise resolution fails with [`ConfigError::SecretNotMounted`].
//!
//! ```rust,ignore
//! let token = SecretSource::new("SLACK_TOKEN").resolve()?;
//! ```

use std::path::PathBuf;

use tracing::{debug, warn};

use super::error::{ConfigError, ConfigResult};

/// A secret value such as a bot token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretSource {
    key: String,
    default: Option<String>,
}

impl SecretSource {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default: None,
        }
    }

    /// Value used when the secret is not provided.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Resolves against the process environment.
    pub fn resolve(&self) -> ConfigResult<String> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolves using `env` to read environment variables.
    pub fn resolve_with<F>(&self, env: F) -> ConfigResult<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = env(&self.key) {
            warn!(secret = %self.key, "Secret is set in the environment");
            return Ok(value);
        }

        let file_var = format!("{}_FILE", self.key);
        match env(&file_var) {
            Some(path) => {
                let path = PathBuf::from(path);
                let content = std::fs::read_to_string(&path).map_err(|source| {
                    ConfigError::SecretUnreadable {
                        key: self.key.clone(),
                        path: path.clone(),
                        source,
                    }
                })?;
                debug!(secret = %self.key, path = %path.display(), "Secret read from file");
                Ok(content.trim().to_owned())
            }
            None => match &self.default {
                Some(default) => {
                    debug!(secret = %self.key, "Using default for secret");
                    Ok(default.clone())
                }
                None => Err(ConfigError::SecretNotMounted {
                    key: self.key.clone(),
                }),
            },
        }
    }
}

/// A plain (non-secret) value read from an environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSource {
    name: String,
    default: Option<String>,
}

impl EnvSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn resolve(&self) -> ConfigResult<String> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    pub fn resolve_with<F>(&self, env: F) -> ConfigResult<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        env(&self.name)
            .or_else(|| self.default.clone())
            .ok_or_else(|| ConfigError::EnvVarMissing {
                name: self.name.clone(),
            })
    }
}

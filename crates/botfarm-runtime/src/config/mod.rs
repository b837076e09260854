//! Configuration for the botfarm runtime.
//!
//! Layered figment loading ([`ConfigLoader`]), the schema ([`FarmConfig`]),
//! validation, and the environment/secret sources used for tokens.

pub mod error;
pub mod loader;
pub mod schema;
pub mod secrets;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{FarmConfig, LogFormat, LogLevel, LogOutput, LoggingConfig};
pub use secrets::{EnvSource, SecretSource};
pub use validation::{validate_bot_id, validate_config};

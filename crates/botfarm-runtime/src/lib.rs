//! botfarm runtime: the process that hosts a farm of bots.
//!
//! This crate provides:
//! - Layered configuration (`botfarm.toml`, profiles, `BOTFARM_*` environment
//!   overrides) and secret resolution for backend tokens
//! - Logging setup from that configuration
//! - Bot definitions (`BotDefinition`, [`bot_fn`]) and their registry
//! - The [`FarmRuntime`], which connects the configured backends, activates
//!   bots, reloads them one at a time and shuts everything down
//!
//! ```ignore
//! use botfarm_runtime::{FarmContext, FarmRuntime, bot_fn};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = FarmRuntime::builder().build()?;
//!
//!     runtime.register_bot(bot_fn("cbf-test", |ctx: FarmContext| async move {
//!         let session = ctx.create(options).await?;
//!         session.hear("ping", |_msg: Message| async { "PONG".to_owned() })?;
//!         Ok(())
//!     }))?;
//!
//!     // Run until Ctrl+C
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! A backend is enabled when its section (`[team_chat]`, `[guild_chat]`) is
//! present. Tokens come from the `SLACK_TOKEN` and `DISCORD_TOKEN` secrets:
//! the variable itself, or a file named by `SLACK_TOKEN_FILE` /
//! `DISCORD_TOKEN_FILE`.

pub mod bot;
pub mod config;
pub mod error;
pub mod logging;
pub mod registry;
pub mod runtime;

pub use bot::{BotDefinition, BoxedBotDefinition, FarmContext, FnBot, bot_fn};
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, EnvSource, FarmConfig, Profile, SecretSource,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use registry::BotRegistry;
pub use runtime::{FarmRuntime, GUILD_CHAT_TOKEN, RuntimeBuilder, TEAM_CHAT_TOKEN};

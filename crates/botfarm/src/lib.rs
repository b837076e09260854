//! # botfarm
//!
//! Host a farm of chat bots on a team-chat backend (realtime socket plus Web
//! API) and a guild-chat backend (gateway plus REST) from one process.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌────────────────┐     ┌─────────────────────────────┐
//! │   Runtime   │────▶│ SessionFactory │────▶│ BotSession "cbf-test"       │──▶ hear / command
//! │ (backends)  │     │                │────▶│ BotSession "slash-vote"     │──▶ hear / command
//! └─────────────┘     └────────────────┘     └─────────────────────────────┘
//!        │                                                 │
//!        └──────────── FarmBus (shutdown / reload) ◀───────┘
//! ```
//!
//! - **Runtime**: loads configuration, connects backends, activates bots
//! - **Sessions**: one per bot; install pattern listeners on its backends
//! - **Messages**: a single [`Message`](prelude::Message) type over both
//!   backends with reply, typing and reaction capabilities
//! - **Bus**: tears listeners down per bot on reload, or all at shutdown
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use botfarm::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = FarmRuntime::builder().build()?;
//!
//!     runtime.register_bot(bot_fn("cbf-test", |ctx: FarmContext| async move {
//!         let session = ctx
//!             .create(
//!                 SessionOptions::new(ctx.bot_id())
//!                     .with_team_chat(TeamChatOptions::new())
//!                     .with_guild_chat(GuildChatOptions::with_prefix("$")),
//!             )
//!             .await?;
//!         session.command("ping", |_msg: Message| async { "PONG".to_owned() })?;
//!         Ok::<_, BoxError>(())
//!     }))?;
//!
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` (default): read `botfarm.toml`
//! - `yaml-config`: also read `botfarm.yaml`
//! - `json-log`: enable the JSON log format

pub use botfarm_adapter_discord as discord;
pub use botfarm_adapter_slack as slack;
pub use botfarm_core as core;
pub use botfarm_framework as framework;
pub use botfarm_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use botfarm::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use botfarm_runtime::{BotDefinition, FarmContext, FarmRuntime, bot_fn};

    // Sessions and their options
    pub use botfarm_framework::{
        BotSession, CommandStyle, GuildChatOptions, HubotCompat, SessionOptions, TeamChatMode,
        TeamChatOptions,
    };

    // Messages and what handlers return
    pub use botfarm_core::{
        Backend, BoxError, GuildChatMessage, Message, RichMessage, TeamChatMessage,
        TransportError,
    };
}

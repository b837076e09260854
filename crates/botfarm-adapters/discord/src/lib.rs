//! # Botfarm Guild-Chat Adapter
//!
//! Connects the guild-chat backend (Discord):
//!
//! - [`DiscordGateway`]: the gateway socket. Identifies, heartbeats and
//!   emits `MESSAGE_CREATE` events as
//!   [`GuildChatEvent`](botfarm_core::GuildChatEvent)s.
//! - [`DiscordChannel`]: the per-channel handle embedded in every event
//!   (send, typing, reactions), backed by [`DiscordRest`].
//!
//! ```rust,ignore
//! use botfarm_adapter_discord::{DiscordConfig, DiscordGateway};
//!
//! let gateway = DiscordGateway::connect(DiscordConfig::new(token)).await?;
//! let factory = SessionFactory::new(brain, bus).with_guild_chat(gateway);
//! ```

pub mod channel;
pub mod config;
pub mod gateway;
pub mod model;
pub mod rest;

pub use channel::DiscordChannel;
pub use config::DiscordConfig;
pub use gateway::DiscordGateway;
pub use model::{GatewayPayload, MessageCreate, Ready};
pub use rest::{DiscordRest, MAX_MESSAGE_LEN, split_content};

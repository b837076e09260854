//! # Botfarm Framework
//!
//! The bot-facing layer of botfarm.
//!
//! - [`SessionFactory`] turns [`SessionOptions`] into a connected
//!   [`BotSession`].
//! - [`BotSession`] is the Listener Router: [`hear`](BotSession::hear),
//!   [`hear_on`](BotSession::hear_on) and [`command`](BotSession::command)
//!   install pattern listeners whose lifetime is tied to the farm's
//!   Shutdown/Reload Bus.
//! - [`HubotCompat`] exposes the session brain under the legacy framework's
//!   interface.
//!
//! ## Example
//!
//! ```rust,ignore
//! use botfarm_framework::{GuildChatOptions, SessionFactory, SessionOptions};
//! use botfarm_core::Message;
//!
//! let session = factory
//!     .create(SessionOptions::new("cbf-test").with_guild_chat(GuildChatOptions::with_prefix("$")))
//!     .await?;
//!
//! session.command("ping", |msg: Message| async move {
//!     msg.reply("PONG").await.map(|_| ())
//! })?;
//! ```

pub mod compat;
pub mod error;
pub mod factory;
pub mod handler;
pub mod options;
pub mod pattern;
pub mod session;

pub use compat::{CompatBrain, HubotCompat, LegacyUser, ScopedHttp};
pub use error::{
    CompatError, CompatResult, RegistrationError, RegistrationResult, SessionError, SessionResult,
};
pub use factory::SessionFactory;
pub use handler::{BoxedHandler, HandleResponse, Handler, into_handler};
pub use options::{CommandStyle, GuildChatOptions, SessionOptions, TeamChatMode, TeamChatOptions};
pub use pattern::{CommandPrefix, CompiledPattern, Pattern};
pub use session::BotSession;

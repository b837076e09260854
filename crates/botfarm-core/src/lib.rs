//! # Botfarm Core
//!
//! The core of the botfarm chat-event routing layer.
//!
//! This crate holds the pieces every other botfarm crate builds on:
//!
//! - **Backends**: the [`Backend`] tag and the raw events each backend emits
//!   ([`TeamChatEvent`], [`GuildChatEvent`]).
//! - **Adapter seams**: the traits a backend client implements
//!   ([`TeamChatRealtime`], [`TeamChatApi`], [`TeamChatProvider`],
//!   [`GuildChatGateway`], [`GuildChannel`]) and the listener sets they emit
//!   events through ([`EventListeners`]).
//! - **Unified Message**: [`Message`], a sum type over both backends with a
//!   shared capability set.
//! - **Lifecycle**: the Shutdown/Reload Bus ([`FarmBus`]).
//! - **Storage**: the namespaced key-value brain ([`Brain`], [`BrainScope`],
//!   [`InMemoryBrain`]).
//!
//! ## Data flow
//!
//! ```text
//! ┌──────────────┐  raw event  ┌──────────┐  match   ┌─────────┐  callback  ┌──────────┐
//! │   Adapter    │────────────▶│ Listener │─────────▶│ Message │───────────▶│   Bot    │
//! │ (team/guild) │             │  (hear)  │          │  wrap   │            │  logic   │
//! └──────────────┘             └──────────┘          └─────────┘            └──────────┘
//!        ▲                                                                       │
//!        └───────────────────── reply / typing / react ──────────────────────────┘
//! ```

pub mod adapter;
pub mod backend;
pub mod brain;
pub mod bus;
pub mod error;
pub mod event;
pub mod listeners;
pub mod message;

pub use adapter::{
    Attachment, BoxedGuildChatGateway, BoxedTeamChatProvider, GuildChannel, GuildChatGateway,
    RichMessage, SelfIdentity, SentMessage, TeamChatApi, TeamChatHandles, TeamChatIdentity,
    TeamChatProvider, TeamChatRealtime, TeamIdentity,
};
pub use backend::Backend;
pub use brain::{Brain, BrainScope, InMemoryBrain};
pub use bus::FarmBus;
pub use error::{
    BoxError, CapabilityError, CapabilityResult, TeardownError, TransportError, TransportResult,
};
pub use event::{GuildAuthor, GuildChatEvent, RawEvent, TeamChatEvent};
pub use listeners::{EventListeners, Listener, ListenerId};
pub use message::{GuildChatMessage, MatchGroups, Message, TeamChatMessage};

/// A boxed, sendable future.
pub use futures::future::BoxFuture;

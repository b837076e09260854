//! # Botfarm Team-Chat Adapter
//!
//! Connects the team-chat backend (Slack) through two clients that are used
//! side by side:
//!
//! - [`SlackRtmClient`]: the realtime socket. Receives `message` events and
//!   sends plain text and typing indicators.
//! - [`SlackWebClient`]: the Web API. Handles `rtm.connect`, rich messages
//!   (`chat.postMessage`) and reactions.
//!
//! [`SlackProvider`] ties both together behind the
//! [`TeamChatProvider`](botfarm_core::TeamChatProvider) seam.
//!
//! ```rust,ignore
//! use botfarm_adapter_slack::{SlackConfig, SlackProvider};
//!
//! let provider = SlackProvider::new(SlackConfig::new(token))?;
//! let factory = SessionFactory::new(brain, bus).with_team_chat(Arc::new(provider));
//! ```

pub mod config;
pub mod model;
pub mod provider;
pub mod rtm;
pub mod web;

pub use config::SlackConfig;
pub use model::{OutgoingFrame, Reply, ReplyError, RtmConnectResponse, RtmFrame};
pub use provider::SlackProvider;
pub use rtm::SlackRtmClient;
pub use web::SlackWebClient;

//! # Botfarm Transport
//!
//! Network transports used by the botfarm backend adapters.
//!
//! ## Features
//!
//! - `ws-client`: WebSocket client connections ([`WsConnection`])
//! - `http-client`: JSON-over-HTTP client ([`JsonHttpClient`])
//! - `full`: both
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  Adapter Layer      │  (team-chat, guild-chat)
//! ├─────────────────────┤
//! │  botfarm-transport  │  <- This crate
//! ├─────────────────────┤
//! │  Network (TCP/HTTP) │
//! └─────────────────────┘
//! ```
//!
//! ```rust,ignore
//! use botfarm_transport::{JsonHttpClient, WsConnection, WsEvent};
//!
//! let api = JsonHttpClient::new("https://slack.com/api")?.with_bearer(&token);
//! let info = api.post_json("rtm.connect", &serde_json::json!({})).await?;
//!
//! let (conn, mut events) = WsConnection::connect(info["url"].as_str().unwrap_or_default()).await?;
//! while let Some(WsEvent::Text(frame)) = events.recv().await {
//!     // decode frame
//! }
//! ```

#[cfg(feature = "http-client")]
pub mod http;

#[cfg(feature = "ws-client")]
pub mod websocket;

#[cfg(feature = "http-client")]
pub use http::JsonHttpClient;

#[cfg(feature = "http-client")]
pub use reqwest::Method;

#[cfg(feature = "ws-client")]
pub use websocket::{WsConnection, WsEvent};

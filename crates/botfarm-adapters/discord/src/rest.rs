//! REST client for channel operations.

use reqwest::Url;
use serde_json::json;
use tracing::debug;

use botfarm_core::{SentMessage, TransportError, TransportResult};
use botfarm_transport::{JsonHttpClient, Method};

use crate::config::DiscordConfig;
use crate::model::CreatedMessage;

/// Maximum length of one message, in characters.
pub const MAX_MESSAGE_LEN: usize = 2000;

/// Authenticated REST client.
#[derive(Debug, Clone)]
pub struct DiscordRest {
    http: JsonHttpClient,
}

impl DiscordRest {
    pub fn new(config: &DiscordConfig) -> TransportResult<Self> {
        let http = JsonHttpClient::new(config.api_url.as_str())?
            .with_authorization(format!("Bot {}", config.token));
        Ok(Self { http })
    }

    /// Posts one message. `content` must already fit [`MAX_MESSAGE_LEN`].
    pub async fn create_message(
        &self,
        channel_id: &str,
        content: &str,
    ) -> TransportResult<SentMessage> {
        let path = format!("channels/{channel_id}/messages");
        let response = self
            .http
            .post_json(&path, &json!({ "content": content }))
            .await?;
        let created: CreatedMessage = serde_json::from_value(response)?;
        debug!(channel = %channel_id, message = %created.id, "Message created");
        Ok(SentMessage::new(created.id))
    }

    /// Shows the typing indicator for about ten seconds.
    pub async fn trigger_typing(&self, channel_id: &str) -> TransportResult<()> {
        let path = format!("channels/{channel_id}/typing");
        self.http.send_empty(Method::POST, &path).await.map(drop)
    }

    /// Reacts to a message with a unicode emoji or `name:id` custom emoji.
    pub async fn add_reaction(
        &self,
        channel_id: &str,
        message_id: &str,
        emoji: &str,
    ) -> TransportResult<()> {
        let emoji = encode_segment(emoji)?;
        let path = format!("channels/{channel_id}/messages/{message_id}/reactions/{emoji}/@me");
        self.http.send_empty(Method::PUT, &path).await.map(drop)
    }
}

/// Percent-encodes `value` as a single URL path segment.
fn encode_segment(value: &str) -> TransportResult<String> {
    let mut url = Url::parse("http://localhost/")
        .map_err(|e| TransportError::Serialization(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| TransportError::Serialization("cannot encode path segment".into()))?
        .pop_if_empty()
        .push(value);
    Ok(url.path().trim_start_matches('/').to_owned())
}

/// Splits `text` into chunks of at most `max` characters, preferring to break
/// after a newline. Empty text yields no chunks.
pub fn split_content(text: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let Some((limit, _)) = rest.char_indices().nth(max) else {
            chunks.push(rest.to_owned());
            break;
        };
        let head = &rest[..limit];
        let cut = match head.rfind('\n') {
            Some(0) | None => limit,
            Some(pos) => pos + 1,
        };
        let chunk = rest[..cut].trim_end_matches('\n');
        if !chunk.is_empty() {
            chunks.push(chunk.to_owned());
        }
        rest = &rest[cut..];
    }
    chunks
}

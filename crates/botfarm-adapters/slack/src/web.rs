//! Web API client.
//!
//! Every Web API method answers HTTP 200 with an `ok` flag; `ok: false`
//! responses are turned into [`TransportError::Api`] with the reported error
//! code.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use botfarm_core::{RichMessage, SentMessage, TeamChatApi, TransportError, TransportResult};
use botfarm_transport::JsonHttpClient;

use crate::config::SlackConfig;
use crate::model::RtmConnectResponse;

/// Persistent Web API client authenticated with the bot token.
#[derive(Debug, Clone)]
pub struct SlackWebClient {
    http: JsonHttpClient,
}

impl SlackWebClient {
    /// Creates a client from the adapter configuration.
    pub fn new(config: &SlackConfig) -> TransportResult<Self> {
        let http = JsonHttpClient::new(config.api_url.as_str())?.with_bearer(&config.token);
        Ok(Self { http })
    }

    /// Calls a Web API method and returns the full response object.
    pub async fn call<B>(&self, method: &str, body: &B) -> TransportResult<Value>
    where
        B: Serialize + ?Sized,
    {
        debug!(method, "Calling Web API");
        let response = self.http.post_json(method, body).await?;
        check_ok(method, response)
    }

    /// Asks for a realtime socket URL together with the bot and team identity.
    pub async fn rtm_connect(&self) -> TransportResult<RtmConnectResponse> {
        let response = self.call("rtm.connect", &json!({})).await?;
        Ok(serde_json::from_value(response)?)
    }
}

fn check_ok(method: &str, response: Value) -> TransportResult<Value> {
    if response.get("ok").and_then(Value::as_bool) == Some(true) {
        return Ok(response);
    }
    let error = response
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown_error");
    Err(TransportError::api(method, error))
}

#[async_trait]
impl TeamChatApi for SlackWebClient {
    async fn post_message(&self, message: RichMessage) -> TransportResult<SentMessage> {
        let response = self.call("chat.postMessage", &message).await?;
        let ts = response
            .get("ts")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Ok(SentMessage::new(ts))
    }

    async fn add_reaction(&self, name: &str, channel: &str, timestamp: &str) -> TransportResult<()> {
        let body = json!({ "name": name, "channel": channel, "timestamp": timestamp });
        self.call("reactions.add", &body).await.map(drop)
    }

    async fn remove_reaction(
        &self,
        name: &str,
        channel: &str,
        timestamp: &str,
    ) -> TransportResult<()> {
        let body = json!({ "name": name, "channel": channel, "timestamp": timestamp });
        self.call("reactions.remove", &body).await.map(drop)
    }
}

//! JSON-over-HTTP client.
//!
//! A thin wrapper over a shared `reqwest::Client` rooted at a base URL with
//! an optional `Authorization` header. Non-success statuses become
//! [`TransportError::Api`] carrying the status and the response body.

use std::time::Duration;

use reqwest::{Client, ClientBuilder, Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use botfarm_core::{TransportError, TransportResult};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for a JSON API.
#[derive(Debug, Clone)]
pub struct JsonHttpClient {
    client: Client,
    base_url: String,
    authorization: Option<String>,
}

impl JsonHttpClient {
    /// Creates a client for `base_url` with the default timeout.
    pub fn new(base_url: impl Into<String>) -> TransportResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> TransportResult<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Io(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            authorization: None,
        })
    }

    /// Sends `value` as the `Authorization` header on every request.
    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    /// Sends `Authorization: Bearer <token>` on every request.
    pub fn with_bearer(self, token: &str) -> Self {
        self.with_authorization(format!("Bearer {token}"))
    }

    /// The base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolves `path` against the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// POSTs a JSON body and returns the JSON response.
    pub async fn post_json<B>(&self, path: &str, body: &B) -> TransportResult<Value>
    where
        B: Serialize + ?Sized,
    {
        let req = self.request(Method::POST, path).json(body);
        self.execute(path, req).await
    }

    /// Sends a request without a body. An empty response yields `Value::Null`.
    pub async fn send_empty(&self, method: Method, path: &str) -> TransportResult<Value> {
        let req = self.request(method, path);
        self.execute(path, req).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self.client.request(method, self.url(path));
        if let Some(auth) = &self.authorization {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }
        req
    }

    async fn execute(&self, path: &str, req: RequestBuilder) -> TransportResult<Value> {
        let resp = req
            .send()
            .await
            .map_err(|e| TransportError::Io(e.to_string()))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| TransportError::Io(e.to_string()))?;
        trace!(path, status = status.as_u16(), len = text.len(), "HTTP response");

        if !status.is_success() {
            return Err(TransportError::api(
                path,
                format!("HTTP {}: {}", status.as_u16(), text),
            ));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

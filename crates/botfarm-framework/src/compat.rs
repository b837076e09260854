//! Legacy Compatibility Shim.
//!
//! [`HubotCompat`] presents a session's brain under the interface of the
//! older bot framework, so code migrated from it keeps its storage calls.
//! Brain values are stored as JSON under the `hubot/` key namespace of the
//! session scope.
//!
//! The listener registration members (`hear`, `respond`, `catch_all`,
//! `enter`) accept their arguments and do nothing; migrated bots register
//! through [`BotSession`](crate::BotSession) instead. Members with no
//! meaningful mapping return [`CompatError::Unsupported`].
//!
//! ```rust,ignore
//! let robot = session.hubot_compat();
//! robot.brain().set("greeting", &"hello")?;
//! let greeting: Option<String> = robot.brain().get("greeting")?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use regex_lite::Regex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use botfarm_core::BrainScope;

use crate::error::{CompatError, CompatResult};

const NAMESPACE: &str = "hubot/";

/// A user record of the legacy user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct LegacyUser {
    pub id: String,
    pub name: String,
}

// ============================================================================
// Brain
// ============================================================================

/// The legacy brain, layered on a session's key-value scope.
#[derive(Clone)]
pub struct CompatBrain {
    scope: Arc<dyn BrainScope>,
}

impl CompatBrain {
    /// Wraps a session scope.
    pub fn new(scope: Arc<dyn BrainScope>) -> Self {
        Self { scope }
    }

    /// Stores `value` as JSON.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> CompatResult<&Self> {
        self.scope
            .set(&namespaced(key), serde_json::to_string(value)?);
        Ok(self)
    }

    /// Reads a JSON value. `Ok(None)` if the key was never set.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> CompatResult<Option<T>> {
        self.scope
            .get(&namespaced(key))
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(CompatError::from)
    }

    /// Removes a key.
    pub fn remove(&self, key: &str) -> &Self {
        self.scope.remove(&namespaced(key));
        self
    }

    /// Stores every entry of `data` as JSON.
    pub fn merge_data(&self, data: &Map<String, Value>) -> CompatResult<()> {
        let payload = data
            .iter()
            .map(|(key, value)| Ok((namespaced(key), serde_json::to_string(value)?)))
            .collect::<CompatResult<HashMap<_, _>>>()?;
        self.scope.merge(payload);
        Ok(())
    }

    /// No-op: the underlying store decides about persistence.
    pub fn save(&self) {}

    /// No-op.
    pub fn close(&self) {}

    /// No-op.
    pub fn set_auto_save(&self, _enabled: bool) {}

    /// No-op.
    pub fn reset_save_interval(&self, _seconds: u64) {}

    pub fn users(&self) -> CompatResult<Vec<LegacyUser>> {
        Err(CompatError::Unsupported("brain.users"))
    }

    pub fn user_for_id(&self, _id: &str) -> CompatResult<LegacyUser> {
        Err(CompatError::Unsupported("brain.userForId"))
    }

    pub fn user_for_name(&self, _name: &str) -> CompatResult<LegacyUser> {
        Err(CompatError::Unsupported("brain.userForName"))
    }

    pub fn user_for_fuzzy_name(&self, _name: &str) -> CompatResult<LegacyUser> {
        Err(CompatError::Unsupported("brain.userForFuzzyName"))
    }

    pub fn user_for_raw_fuzzy_name(&self, _name: &str) -> CompatResult<Vec<LegacyUser>> {
        Err(CompatError::Unsupported("brain.userForRawFuzzyName"))
    }
}

fn namespaced(key: &str) -> String {
    format!("{NAMESPACE}{key}")
}

// ============================================================================
// HTTP
// ============================================================================

/// An HTTP client scoped to one URL.
#[derive(Debug, Clone)]
pub struct ScopedHttp {
    client: reqwest::Client,
    url: String,
}

impl ScopedHttp {
    /// The URL requests are sent to.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn get(&self) -> reqwest::RequestBuilder {
        self.client.get(&self.url)
    }

    pub fn post(&self) -> reqwest::RequestBuilder {
        self.client.post(&self.url)
    }

    pub fn put(&self) -> reqwest::RequestBuilder {
        self.client.put(&self.url)
    }

    pub fn delete(&self) -> reqwest::RequestBuilder {
        self.client.delete(&self.url)
    }
}

// ============================================================================
// Robot
// ============================================================================

/// The legacy robot interface.
#[derive(Clone)]
pub struct HubotCompat {
    /// Robot name. Always empty.
    pub name: String,
    /// Robot alias. Always empty.
    pub alias: String,
    brain: CompatBrain,
    http: reqwest::Client,
}

impl HubotCompat {
    /// Builds the shim over a session scope.
    pub fn new(scope: Arc<dyn BrainScope>) -> Self {
        Self {
            name: String::new(),
            alias: String::new(),
            brain: CompatBrain::new(scope),
            http: reqwest::Client::new(),
        }
    }

    /// The legacy brain.
    pub fn brain(&self) -> &CompatBrain {
        &self.brain
    }

    /// Returns an HTTP client scoped to `url`.
    pub fn http(&self, url: impl Into<String>) -> ScopedHttp {
        ScopedHttp {
            client: self.http.clone(),
            url: url.into(),
        }
    }

    /// Accepted and ignored.
    pub fn hear<F>(&self, _regex: &Regex, _callback: F) {}

    /// Accepted and ignored.
    pub fn respond<F>(&self, _regex: &Regex, _callback: F) {}

    /// Accepted and ignored.
    pub fn catch_all<F>(&self, _callback: F) {}

    /// Accepted and ignored.
    pub fn enter<F>(&self, _callback: F) {}

    pub fn topic<F>(&self, _callback: F) -> CompatResult<()> {
        Err(CompatError::Unsupported("topic"))
    }

    pub fn on<F>(&self, _event: &str, _callback: F) -> CompatResult<&Self> {
        Err(CompatError::Unsupported("on"))
    }

    pub fn emit(&self, _event: &str, _payload: Value) -> CompatResult<bool> {
        Err(CompatError::Unsupported("emit"))
    }

    pub fn load_file(&self, _path: &str, _file: &str) -> CompatResult<()> {
        Err(CompatError::Unsupported("loadFile"))
    }

    pub fn help_commands(&self) -> CompatResult<Vec<String>> {
        Err(CompatError::Unsupported("helpCommands"))
    }
}

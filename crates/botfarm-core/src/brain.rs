//! The key-value brain.
//!
//! Every bot session gets its own [`BrainScope`], a string map namespaced by
//! the session id. Individual calls are atomic; a read-modify-write sequence
//! that awaits between the read and the write is not, and the last writer
//! wins.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// A namespaced string map belonging to one bot session.
pub trait BrainScope: Send + Sync {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String);

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str);

    /// Stores every entry of `data`.
    fn merge(&self, data: HashMap<String, String>);
}

/// Creates brain scopes.
pub trait Brain: Send + Sync {
    /// Returns the scope for `namespace` (a bot session id).
    fn scope(&self, namespace: &str) -> Arc<dyn BrainScope>;
}

/// A brain kept in process memory.
///
/// Entries are kept per namespace, so a session re-created under the same id
/// sees what it stored before.
#[derive(Clone, Default)]
pub struct InMemoryBrain {
    space: Arc<RwLock<Space>>,
}

type Space = HashMap<String, HashMap<String, String>>;

impl InMemoryBrain {
    /// Creates an empty brain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored entries across all namespaces.
    pub fn len(&self) -> usize {
        self.space.read().values().map(HashMap::len).sum()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.space.read().values().all(HashMap::is_empty)
    }
}

impl Brain for InMemoryBrain {
    fn scope(&self, namespace: &str) -> Arc<dyn BrainScope> {
        Arc::new(InMemoryScope {
            namespace: namespace.to_owned(),
            space: Arc::clone(&self.space),
        })
    }
}

impl fmt::Debug for InMemoryBrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryBrain")
            .field("entries", &self.len())
            .finish()
    }
}

struct InMemoryScope {
    namespace: String,
    space: Arc<RwLock<Space>>,
}

impl BrainScope for InMemoryScope {
    fn get(&self, key: &str) -> Option<String> {
        self.space
            .read()
            .get(&self.namespace)
            .and_then(|entries| entries.get(key))
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.space
            .write()
            .entry(self.namespace.clone())
            .or_default()
            .insert(key.to_owned(), value);
    }

    fn remove(&self, key: &str) {
        if let Some(entries) = self.space.write().get_mut(&self.namespace) {
            entries.remove(key);
        }
    }

    fn merge(&self, data: HashMap<String, String>) {
        self.space
            .write()
            .entry(self.namespace.clone())
            .or_default()
            .extend(data);
    }
}

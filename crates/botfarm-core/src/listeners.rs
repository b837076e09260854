//! Raw-event listener sets.
//!
//! Every backend adapter exposes its inbound message stream as an
//! [`EventListeners`] set. Listeners are invoked synchronously, in
//! registration order, for every event the adapter emits; a listener that
//! needs to do asynchronous work spawns it.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::trace;

/// Identifies one subscription within an [`EventListeners`] set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// A type-erased raw-event listener.
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// An ordered set of listeners for one raw event type.
///
/// There is no deduplication: subscribing the same closure twice yields two
/// independent subscriptions.
pub struct EventListeners<E> {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(ListenerId, Listener<E>)>>,
}

impl<E> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventListeners<E> {
    /// Creates an empty listener set.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Adds a listener and returns its id.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, Arc::new(listener)));
        trace!(listener = %id, "Listener subscribed");
        id
    }

    /// Removes a listener.
    ///
    /// Returns `false` if it was already removed; that is not an error.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        let removed = listeners.len() != before;
        trace!(listener = %id, removed, "Listener unsubscribed");
        removed
    }

    /// Delivers `event` to every listener, in registration order.
    ///
    /// Works on a snapshot, so listeners may subscribe or unsubscribe while
    /// being called.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = self
            .listeners
            .read()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }

    /// Returns the number of active listeners.
    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    /// Returns true if there are no listeners.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> fmt::Debug for EventListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListeners")
            .field("len", &self.len())
            .finish()
    }
}

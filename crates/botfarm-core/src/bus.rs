//! The Shutdown/Reload Bus.
//!
//! One [`FarmBus`] exists per process. It is created by the runtime at startup
//! and handed to every component that installs listeners; those components
//! register a cleanup per listener under the id of the bot session that owns
//! it.
//!
//! - [`FarmBus::announce_shutdown`] runs every cleanup, in registration order.
//! - [`FarmBus::announce_reload`] runs the cleanups of one bot id only.
//!
//! Either way a cleanup runs at most once: it is removed from the bus before
//! it is called. A cleanup that fails aborts the announcement; the cleanups
//! that had not run yet stay registered.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error};

use crate::error::{BoxError, TeardownError};

type Cleanup = Box<dyn FnOnce() -> Result<(), BoxError> + Send>;

struct Registration {
    bot_id: String,
    cleanup: Cleanup,
}

/// Process-wide lifecycle bus coordinating listener teardown.
///
/// Cloning yields another handle to the same bus.
#[derive(Clone, Default)]
pub struct FarmBus {
    registrations: Arc<Mutex<Vec<Registration>>>,
}

impl FarmBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `cleanup` to run once on global shutdown or on a reload of
    /// `bot_id`, whichever comes first.
    pub fn on_shutdown<F>(&self, bot_id: impl Into<String>, cleanup: F)
    where
        F: FnOnce() -> Result<(), BoxError> + Send + 'static,
    {
        self.registrations.lock().push(Registration {
            bot_id: bot_id.into(),
            cleanup: Box::new(cleanup),
        });
    }

    /// Runs every registered cleanup in registration order.
    ///
    /// Stops at the first failing cleanup and returns its error.
    pub fn announce_shutdown(&self) -> Result<(), TeardownError> {
        let drained = std::mem::take(&mut *self.registrations.lock());
        debug!(cleanups = drained.len(), "Announcing shutdown");
        self.run_all(drained)
    }

    /// Runs the cleanups registered under `bot_id`, then forgets them.
    ///
    /// Cleanups of other bots are left untouched. A reload for an id with
    /// nothing registered is a no-op.
    pub fn announce_reload(&self, bot_id: &str) -> Result<(), TeardownError> {
        let selected = {
            let mut registrations = self.registrations.lock();
            let (selected, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut *registrations)
                .into_iter()
                .partition(|r| r.bot_id == bot_id);
            *registrations = kept;
            selected
        };
        debug!(bot_id, cleanups = selected.len(), "Announcing reload");
        self.run_all(selected)
    }

    /// Number of cleanups still registered.
    pub fn pending(&self) -> usize {
        self.registrations.lock().len()
    }

    /// Number of cleanups still registered for `bot_id`.
    pub fn pending_for(&self, bot_id: &str) -> usize {
        self.registrations
            .lock()
            .iter()
            .filter(|r| r.bot_id == bot_id)
            .count()
    }

    fn run_all(&self, registrations: Vec<Registration>) -> Result<(), TeardownError> {
        let mut remaining = registrations.into_iter();
        while let Some(Registration { bot_id, cleanup }) = remaining.next() {
            if let Err(source) = cleanup() {
                error!(bot_id = %bot_id, error = %source, "Cleanup failed, aborting teardown");
                let mut registrations = self.registrations.lock();
                let mut restored: Vec<_> = remaining.collect();
                restored.append(&mut registrations);
                *registrations = restored;
                return Err(TeardownError { bot_id, source });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FarmBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FarmBus")
            .field("pending", &self.pending())
            .finish()
    }
}

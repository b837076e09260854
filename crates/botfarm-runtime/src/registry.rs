//! Registry of bot definitions.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::bot::{BotDefinition, BoxedBotDefinition};
use crate::config::validate_bot_id;
use crate::error::{RuntimeError, RuntimeResult};

/// Bots known to the runtime, in registration order.
#[derive(Default)]
pub struct BotRegistry {
    bots: RwLock<Vec<BoxedBotDefinition>>,
}

impl BotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bot. Ids must be valid and unique.
    pub fn register<B: BotDefinition>(&self, bot: B) -> RuntimeResult<()> {
        self.register_arc(Arc::new(bot))
    }

    /// Adds an already shared bot.
    pub fn register_arc(&self, bot: BoxedBotDefinition) -> RuntimeResult<()> {
        validate_bot_id(bot.id())?;
        let mut bots = self.bots.write();
        if bots.iter().any(|b| b.id() == bot.id()) {
            return Err(RuntimeError::BotExists(bot.id().to_owned()));
        }
        debug!(bot_id = %bot.id(), "Registered bot");
        bots.push(bot);
        Ok(())
    }

    /// Looks a bot up by id.
    pub fn get(&self, id: &str) -> Option<BoxedBotDefinition> {
        self.bots.read().iter().find(|b| b.id() == id).cloned()
    }

    /// Snapshot of all bots in registration order.
    pub fn all(&self) -> Vec<BoxedBotDefinition> {
        self.bots.read().clone()
    }

    pub fn ids(&self) -> Vec<String> {
        self.bots.read().iter().map(|b| b.id().to_owned()).collect()
    }

    pub fn len(&self) -> usize {
        self.bots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.read().is_empty()
    }
}

impl std::fmt::Debug for BotRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotRegistry")
            .field("bots", &self.ids())
            .finish()
    }
}

//! Editor state and the host that applies its effects.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete editor state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::dispatch`]: Runs a message and applies the effects it queued

mod effects;
mod event_loop;
pub mod format;
mod model;
mod update;

pub use format::{Formatted, TextFormat, apply_format};
pub use model::{
    AttachTicket, EXPORT_FILE_NAME, Effect, Model, TextSelection, ToastLevel,
    edit_mode_from_fragment,
};
pub use update::{Message, update};

use crate::document::seed;
use crate::storage::{ContentLoader, ContentOrigin, RemoteSource, STORAGE_KEY, Storage};

/// Owns the storage backend and drives the store against a surface.
pub struct App {
    storage: Box<dyn Storage>,
    storage_key: String,
}

impl App {
    /// Create a host persisting into `storage`.
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self {
            storage,
            storage_key: STORAGE_KEY.to_string(),
        }
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Build the initial model through the tiered loader.
    pub fn load(&self, remote: Option<&dyn RemoteSource>) -> (Model, ContentOrigin) {
        let seed = seed();
        let loaded = ContentLoader::new(self.storage.as_ref(), &self.storage_key)
            .with_remote(remote)
            .load(&seed);
        tracing::debug!("loaded content from {}", loaded.origin.as_str());
        (Model::new(loaded.document, seed), loaded.origin)
    }

    /// Write the document under the storage key.
    pub fn persist(&self, model: &Model) -> crate::Result<()> {
        let _scope = crate::perf::scope("app.persist").with("key", &self.storage_key);
        let json = serde_json::to_string(&model.document)?;
        self.storage.set(&self.storage_key, &json)
    }
}

#[cfg(test)]
mod tests;

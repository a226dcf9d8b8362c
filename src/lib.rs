// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. storage::FileStorage)
    clippy::module_name_repetitions
)]

//! # Blockpage
//!
//! A block-based content editor for small educational micro-sites.
//!
//! A page is a JSON document of typed blocks (text, image, audio, youtube,
//! pdf, quote, callout, gallery, links). Blockpage:
//! - Normalizes any JSON into a well-formed document
//! - Renders blocks to HTML, with editing chrome in edit mode
//! - Mutates the document through a single store and persists it locally
//! - Loads content from the local cache, a published copy, or the seed
//!
//! ## Architecture
//!
//! Blockpage uses The Elm Architecture (TEA) pattern:
//! - **Model**: Editor state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions that queue effects
//! - **View**: Pure page model, applied through a [`ui::Surface`]
//!
//! ## Modules
//!
//! - [`app`]: Store, messages and the effect-applying host
//! - [`document`]: Block model, normalizer, sanitizers and seed
//! - [`markdown`]: The restricted Markdown renderer
//! - [`ui`]: View models and HTML
//! - [`storage`]: Local cache and tiered content loading
//! - [`media`]: Local files as data URLs
//! - [`watcher`]: File watching

pub mod app;
pub mod config;
pub mod document;
mod error;
pub mod markdown;
pub mod media;
pub mod perf;
pub mod storage;
pub mod ui;
pub mod watcher;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model, update};
    pub use crate::document::{Block, BlockKind, BlockType, Document};
    pub use crate::storage::{FileStorage, MemoryStorage, Storage};
    pub use crate::ui::{PageView, RecordingSurface, Surface};
}

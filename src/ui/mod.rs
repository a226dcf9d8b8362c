//! Page rendering.
//!
//! This module contains all UI-related code including:
//! - [`view`]: Pure document-to-view-model computation
//! - [`blocks`]: Per-variant preview markup
//! - [`editor`]: Per-variant editor forms
//! - [`theme`]: Theme custom properties and font links
//! - [`html`]: View model to HTML
//! - [`surface`]: The seam effects are applied through

pub mod blocks;
pub mod editor;
pub mod html;
pub mod surface;
pub mod theme;
pub mod view;

pub use blocks::{extract_youtube_id, render_block_view};
pub use html::{render_block, render_page};
pub use surface::{RecordingSurface, Surface, SurfaceCall, TerminalSurface};
pub use view::{BlockView, PageMode, PageView, Slot, block_view, page_view};

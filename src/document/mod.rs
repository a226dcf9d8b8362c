//! The block document model.
//!
//! This module handles:
//! - The typed document tree (site, theme, sections of blocks)
//! - Normalizing arbitrary JSON into that tree
//! - Field sanitizers shared by editing and loading
//! - The pipe-delimited gallery/links text encoding
//! - The embedded seed document

mod items;
mod normalize;
mod sanitize;
mod seed;
mod types;

pub use items::{parse_gallery, parse_links, serialize_gallery, serialize_links};
pub use normalize::{create_id, new_block, normalize_block, normalize_document};
pub(crate) use normalize::parse_scale;
pub use sanitize::{
    FONT_SIZE, FontChoice, IMAGE_WIDTH, LINE_HEIGHT, Range, sanitize_align, sanitize_color,
    sanitize_font_choice, sanitize_in, sanitize_number, system_font_stack,
};
pub use seed::{DEFAULT_TITLE, seed};
pub use types::{
    Block, BlockKind, BlockType, CalloutBlock, Document, GalleryBlock, GalleryItem, ImageBlock,
    Layout, LinkItem, LinksBlock, MediaBlock, MediaSource, QuoteBlock, Section, SiteMeta,
    SourceMode, TextBlock, ThemeConfig, ThemeMode, YoutubeBlock,
};

/// Parse JSON text and normalize it over `seed`.
///
/// Fails only on invalid JSON syntax; any well-formed value is accepted.
pub fn parse_document(text: &str, seed: &Document) -> crate::Result<Document> {
    let raw: serde_json::Value = serde_json::from_str(text)?;
    Ok(normalize_document(&raw, seed))
}

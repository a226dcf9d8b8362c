//! Core document types.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::Error;

use super::sanitize::FontChoice;

/// The full persisted content tree.
///
/// Only `sections[0]` is shown by the editor; any further sections are kept
/// so they survive a save/export round trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Site metadata shown in the header
    pub site: SiteMeta,
    /// Theme configuration
    pub theme: ThemeConfig,
    /// Ordered sections, never empty after normalization
    pub sections: Vec<Section>,
    /// Unrecognized top-level fields, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    /// Blocks of the edited section.
    pub fn blocks(&self) -> &[Block] {
        self.sections.first().map_or(&[], |section| &section.blocks)
    }

    /// Mutable blocks of the edited section, creating it if missing.
    pub fn blocks_mut(&mut self) -> &mut Vec<Block> {
        if self.sections.is_empty() {
            self.sections.push(Section::numbered(0));
        }
        &mut self.sections[0].blocks
    }

    /// Position of the block with `id` in the edited section.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.blocks().iter().position(|block| block.id == id)
    }
}

/// Free-form site metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteMeta {
    pub title: String,
    pub subtitle: String,
    pub description: String,
}

/// Color scheme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Auto,
    Light,
    Dark,
}

impl ThemeMode {
    /// Next mode in the fixed `auto → light → dark` rotation.
    pub const fn next(self) -> Self {
        match self {
            Self::Auto => Self::Light,
            Self::Light => Self::Dark,
            Self::Dark => Self::Auto,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Human label used in notifications.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Auto => "Automático",
            Self::Light => "Claro",
            Self::Dark => "Oscuro",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "auto" => Some(Self::Auto),
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

/// Content column layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Default,
    Narrow,
}

impl Layout {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Narrow => "narrow",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "default" => Some(Self::Default),
            "narrow" => Some(Self::Narrow),
            _ => None,
        }
    }
}

/// Theme configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeConfig {
    pub mode: ThemeMode,
    /// Primary color, normally `#rrggbb`
    pub color: String,
    /// Accent color, normally `#rrggbb`
    pub accent: String,
    /// Root font scale in rem, always positive
    pub scale: f64,
    /// Webfont family spec (e.g. `Inter:wght@400;600`), empty or `system` for none
    pub font: String,
    pub layout: Layout,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            mode: ThemeMode::Auto,
            color: "#1f6feb".to_string(),
            accent: "#d9480f".to_string(),
            scale: 1.0,
            font: "system".to_string(),
            layout: Layout::Default,
        }
    }
}

/// An ordered run of blocks with a title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Section {
    /// Empty section titled after its position (`Sección 1`, ...).
    pub fn numbered(index: usize) -> Self {
        Self {
            title: format!("Sección {}", index + 1),
            blocks: Vec::new(),
        }
    }
}

/// One addressable content unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    /// Opaque id, stable across edits, regenerated on duplication
    pub id: String,
    /// Variant payload, serialized with its `type` tag
    #[serde(flatten)]
    pub kind: BlockKind,
    /// Fields that do not belong to the variant, preserved but never rendered
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            kind,
            extra: Map::new(),
        }
    }

    pub const fn block_type(&self) -> BlockType {
        self.kind.block_type()
    }

    /// Source fields of image, audio and pdf blocks.
    pub const fn media_source(&self) -> Option<&MediaSource> {
        match &self.kind {
            BlockKind::Image(image) => Some(&image.source),
            BlockKind::Audio(media) | BlockKind::Pdf(media) => Some(&media.source),
            _ => None,
        }
    }

    pub const fn media_source_mut(&mut self) -> Option<&mut MediaSource> {
        match &mut self.kind {
            BlockKind::Image(image) => Some(&mut image.source),
            BlockKind::Audio(media) | BlockKind::Pdf(media) => Some(&mut media.source),
            _ => None,
        }
    }

    /// Assign a raw string to a named field of the variant.
    ///
    /// Returns `false` when the variant has no such string field; the value is
    /// then kept in [`Block::extra`].
    /// `id`, `type` and the variant's non-string fields are never written
    /// here, so `extra` cannot shadow a serialized field.
    pub fn assign(&mut self, field: &str, value: String) -> bool {
        if let Some(slot) = self.string_field_mut(field) {
            *slot = value;
            return true;
        }
        if field == "id" || field == "type" || self.block_type().fields().contains(&field) {
            return false;
        }
        self.extra.insert(field.to_string(), Value::String(value));
        false
    }

    fn string_field_mut(&mut self, field: &str) -> Option<&mut String> {
        match &mut self.kind {
            BlockKind::Text(text) => match field {
                "markdown" => Some(&mut text.markdown),
                "fontSize" => Some(&mut text.font_size),
                "lineHeight" => Some(&mut text.line_height),
                "textColor" => Some(&mut text.text_color),
                "align" => Some(&mut text.align),
                _ => None,
            },
            BlockKind::Image(image) => match field {
                "alt" => Some(&mut image.alt),
                "caption" => Some(&mut image.caption),
                "width" => Some(&mut image.width),
                _ => media_field_mut(&mut image.source, field),
            },
            BlockKind::Audio(media) | BlockKind::Pdf(media) => match field {
                "caption" => Some(&mut media.caption),
                _ => media_field_mut(&mut media.source, field),
            },
            BlockKind::Youtube(video) => match field {
                "url" => Some(&mut video.url),
                "caption" => Some(&mut video.caption),
                _ => None,
            },
            BlockKind::Quote(quote) => match field {
                "text" => Some(&mut quote.text),
                "cite" => Some(&mut quote.cite),
                _ => None,
            },
            BlockKind::Callout(callout) => (field == "text").then_some(&mut callout.text),
            BlockKind::Gallery(_) | BlockKind::Links(_) => None,
        }
    }
}

fn media_field_mut<'a>(source: &'a mut MediaSource, field: &str) -> Option<&'a mut String> {
    match field {
        "src" => Some(&mut source.src),
        "sourceName" => Some(&mut source.source_name),
        "repoPath" => Some(&mut source.repo_path),
        _ => None,
    }
}

/// Variant payloads, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BlockKind {
    Text(TextBlock),
    Image(ImageBlock),
    Audio(MediaBlock),
    Youtube(YoutubeBlock),
    Pdf(MediaBlock),
    Quote(QuoteBlock),
    Callout(CalloutBlock),
    Gallery(GalleryBlock),
    Links(LinksBlock),
}

impl BlockKind {
    /// Default payload for a freshly added block of `block_type`.
    pub fn empty(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Text => Self::Text(TextBlock::default()),
            BlockType::Image => Self::Image(ImageBlock::default()),
            BlockType::Audio => Self::Audio(MediaBlock::default()),
            BlockType::Youtube => Self::Youtube(YoutubeBlock::default()),
            BlockType::Pdf => Self::Pdf(MediaBlock::default()),
            BlockType::Quote => Self::Quote(QuoteBlock::default()),
            BlockType::Callout => Self::Callout(CalloutBlock::default()),
            BlockType::Gallery => Self::Gallery(GalleryBlock::default()),
            BlockType::Links => Self::Links(LinksBlock::default()),
        }
    }

    pub const fn block_type(&self) -> BlockType {
        match self {
            Self::Text(_) => BlockType::Text,
            Self::Image(_) => BlockType::Image,
            Self::Audio(_) => BlockType::Audio,
            Self::Youtube(_) => BlockType::Youtube,
            Self::Pdf(_) => BlockType::Pdf,
            Self::Quote(_) => BlockType::Quote,
            Self::Callout(_) => BlockType::Callout,
            Self::Gallery(_) => BlockType::Gallery,
            Self::Links(_) => BlockType::Links,
        }
    }
}

/// The closed set of block type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockType {
    Text,
    Image,
    Audio,
    Youtube,
    Pdf,
    Quote,
    Callout,
    Gallery,
    Links,
}

impl BlockType {
    /// All types in palette order.
    pub const ALL: [Self; 9] = [
        Self::Text,
        Self::Image,
        Self::Audio,
        Self::Youtube,
        Self::Pdf,
        Self::Quote,
        Self::Callout,
        Self::Gallery,
        Self::Links,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Youtube => "youtube",
            Self::Pdf => "pdf",
            Self::Quote => "quote",
            Self::Callout => "callout",
            Self::Gallery => "gallery",
            Self::Links => "links",
        }
    }

    /// Wire names of the variant's own fields, excluding `id` and `type`.
    pub const fn fields(self) -> &'static [&'static str] {
        match self {
            Self::Text => &[
                "markdown",
                "fontChoice",
                "fontSize",
                "lineHeight",
                "textColor",
                "align",
            ],
            Self::Image => &[
                "src",
                "sourceMode",
                "sourceName",
                "repoPath",
                "alt",
                "caption",
                "width",
            ],
            Self::Audio | Self::Pdf => &["src", "sourceMode", "sourceName", "repoPath", "caption"],
            Self::Youtube => &["url", "caption"],
            Self::Quote => &["text", "cite"],
            Self::Callout => &["text"],
            Self::Gallery | Self::Links => &["items"],
        }
    }

    /// Palette label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "Texto",
            Self::Image => "Imagen",
            Self::Audio => "Audio",
            Self::Youtube => "YouTube",
            Self::Pdf => "PDF",
            Self::Quote => "Cita",
            Self::Callout => "Aviso",
            Self::Gallery => "Galería",
            Self::Links => "Lista de enlaces",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| Error::UnknownBlockType(s.to_string()))
    }
}

/// Markdown text with optional style overrides.
///
/// Style fields hold sanitized strings; empty means "inherit from theme".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub markdown: String,
    pub font_choice: FontChoice,
    pub font_size: String,
    pub line_height: String,
    pub text_color: String,
    pub align: String,
}

/// Where a media file comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Repository-relative path such as `assets/images/x.png`
    #[default]
    Repo,
    /// Embedded data URL
    Local,
}

impl SourceMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Repo => "repo",
            Self::Local => "local",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "repo" => Some(Self::Repo),
            "local" => Some(Self::Local),
            _ => None,
        }
    }
}

/// Source fields shared by image, audio and pdf blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSource {
    pub src: String,
    pub source_mode: SourceMode,
    /// Original file name when embedded
    pub source_name: String,
    pub repo_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageBlock {
    #[serde(flatten)]
    pub source: MediaSource,
    pub alt: String,
    pub caption: String,
    /// Percentage 10–100 as a string, empty for full width
    pub width: String,
}

/// Audio and pdf payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MediaBlock {
    #[serde(flatten)]
    pub source: MediaSource,
    pub caption: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct YoutubeBlock {
    pub url: String,
    pub caption: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuoteBlock {
    pub text: String,
    pub cite: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CalloutBlock {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GalleryItem {
    pub src: String,
    pub alt: String,
    pub caption: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GalleryBlock {
    pub items: Vec<GalleryItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkItem {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinksBlock {
    pub items: Vec<LinkItem>,
}

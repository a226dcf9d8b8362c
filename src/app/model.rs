use std::collections::HashMap;
use std::ops::Range;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::document::{
    Block, BlockKind, BlockType, Document, FONT_SIZE, FontChoice, IMAGE_WIDTH, LINE_HEIGHT,
    Layout, MediaSource, SourceMode, ThemeMode, create_id, new_block, parse_document,
    parse_gallery, parse_links, parse_scale, sanitize_align, sanitize_color,
    sanitize_font_choice, sanitize_in,
};
use crate::{Error, Result};

use super::format::{TextFormat, apply_format};

/// File name offered by export.
pub const EXPORT_FILE_NAME: &str = "content.json";

const TOAST_DURATION: Duration = Duration::from_secs(4);

/// Whether a URL fragment asks for edit mode.
pub fn edit_mode_from_fragment(fragment: &str) -> bool {
    fragment.contains("edit")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Claim on a pending local file read for one block.
///
/// A later source edit on the same block, or a document import, makes the
/// ticket stale and its completion is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachTicket {
    pub block_id: String,
    pub generation: u64,
}

/// Side effects requested by a state transition, applied by the host in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Write the document to local storage
    Persist,
    /// Rebuild the whole page
    RenderAll,
    /// Refresh only the preview of the block at this index
    RefreshBlock(usize),
    /// Re-render header texts
    RenderSite,
    /// Re-apply theme properties and font link
    ApplyTheme,
    /// Ensure a per-block font is loaded
    LoadFont(FontChoice),
    ScrollIntoView(String),
    /// Ask before removing; confirmation sends `Message::RemoveConfirmed`
    ConfirmRemove { index: usize, id: String },
    /// Read a local file; completion sends `Message::MediaLoaded`
    ReadMedia { ticket: AttachTicket, path: PathBuf },
    Download { file_name: String, contents: String },
    ShowToast(String, ToastLevel),
}

/// Selection left in a block's text area after a toolbar action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSelection {
    pub index: usize,
    pub range: Range<usize>,
}

/// The complete editor state.
///
/// All state lives here - no global or scattered state. Mutations go through
/// the typed methods below, each of which queues the effects it needs.
pub struct Model {
    /// The edited document
    pub document: Document,
    /// Defaults used when normalizing imports
    seed: Document,
    /// Whether editing chrome is enabled
    pub edit_mode: bool,
    /// Whether editing chrome is temporarily hidden
    pub preview_mode: bool,
    /// Insert position of the open type picker
    pub inline_picker: Option<usize>,
    /// Selection after the last toolbar action
    pub selection: Option<TextSelection>,
    toast: Option<Toast>,
    effects: Vec<Effect>,
    attach_generations: HashMap<String, u64>,
    next_generation: u64,
}

impl Model {
    pub fn new(document: Document, seed: Document) -> Self {
        Self {
            document,
            seed,
            edit_mode: false,
            preview_mode: false,
            inline_picker: None,
            selection: None,
            toast: None,
            effects: Vec::new(),
            attach_generations: HashMap::new(),
            next_generation: 0,
        }
    }

    pub const fn with_edit_mode(mut self, edit_mode: bool) -> Self {
        self.edit_mode = edit_mode;
        self
    }

    pub const fn with_preview_mode(mut self, preview_mode: bool) -> Self {
        self.preview_mode = preview_mode && self.edit_mode;
        self
    }

    pub fn seed(&self) -> &Document {
        &self.seed
    }

    /// Drain queued effects.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub(crate) fn queue(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn pending_effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        let message = message.into();
        self.effects
            .push(Effect::ShowToast(message.clone(), level));
        self.toast = Some(Toast {
            level,
            message,
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    pub fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    /// Queue a full rebuild. A rebuild always closes the inline picker.
    fn request_full_render(&mut self) {
        self.inline_picker = None;
        self.effects.push(Effect::RenderAll);
    }

    fn out_of_range(&self, index: usize) -> Error {
        Error::IndexOutOfRange {
            index,
            len: self.document.blocks().len(),
        }
    }

    // Blocks

    /// Insert a default block of `block_type` at `position`, or at the end
    /// when absent or past the end. Returns the new block's id.
    pub fn insert_block(&mut self, block_type: BlockType, position: Option<usize>) -> String {
        let block = new_block(block_type);
        let id = block.id.clone();
        let blocks = self.document.blocks_mut();
        let position = position.filter(|p| *p <= blocks.len()).unwrap_or(blocks.len());
        blocks.insert(position, block);
        crate::perf::log_event(
            "store.insert",
            format!("type={block_type} position={position} id={id}"),
        );
        self.request_full_render();
        self.effects.push(Effect::Persist);
        self.effects.push(Effect::ScrollIntoView(id.clone()));
        id
    }

    /// Copy the block at `index` under a fresh id right after it.
    pub fn duplicate_block(&mut self, index: usize) -> Result<String> {
        let mut copy = self
            .document
            .blocks()
            .get(index)
            .cloned()
            .ok_or_else(|| self.out_of_range(index))?;
        copy.id = create_id();
        let id = copy.id.clone();
        self.document.blocks_mut().insert(index + 1, copy);
        self.request_full_render();
        self.effects.push(Effect::Persist);
        Ok(id)
    }

    /// Ask for confirmation before removing the block at `index`.
    pub fn request_remove(&mut self, index: usize) -> Result<()> {
        let id = self
            .document
            .blocks()
            .get(index)
            .map(|block| block.id.clone())
            .ok_or_else(|| self.out_of_range(index))?;
        self.effects.push(Effect::ConfirmRemove { index, id });
        Ok(())
    }

    /// Remove the block at `index` without asking.
    pub fn remove_block(&mut self, index: usize) -> Result<Block> {
        if index >= self.document.blocks().len() {
            return Err(self.out_of_range(index));
        }
        let removed = self.document.blocks_mut().remove(index);
        self.attach_generations.remove(&removed.id);
        crate::perf::log_event("store.remove", format!("index={index} id={}", removed.id));
        self.request_full_render();
        self.effects.push(Effect::Persist);
        Ok(removed)
    }

    /// Remove the block with `id`, wherever it now sits.
    pub fn remove_block_by_id(&mut self, id: &str) -> Result<Block> {
        let index = self
            .document
            .position_of(id)
            .ok_or_else(|| Error::UnknownField {
                path: format!("blocks.{id}"),
            })?;
        self.remove_block(index)
    }

    /// Move the block at `from` to `to`. Returns `false` when nothing moved.
    pub fn move_block(&mut self, from: usize, to: usize) -> Result<bool> {
        let len = self.document.blocks().len();
        if from >= len {
            return Err(self.out_of_range(from));
        }
        if from == to {
            return Ok(false);
        }
        let blocks = self.document.blocks_mut();
        let moved = blocks.remove(from);
        let to = to.min(blocks.len());
        blocks.insert(to, moved);
        crate::perf::log_event("store.move", format!("from={from} to={to}"));
        self.request_full_render();
        self.effects.push(Effect::Persist);
        Ok(true)
    }

    /// Write one field of the block at `index`.
    ///
    /// Item lists are parsed from their text encoding, style fields and image
    /// width are sanitized, and media `src` switches the block to a repository
    /// source. Anything else is assigned as given.
    pub fn update_block_field(&mut self, index: usize, field: &str, value: String) -> Result<()> {
        let len = self.document.blocks().len();
        let block = self
            .document
            .blocks_mut()
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        let outcome = route_block_input(block, field, value)?;
        let id = block.id.clone();
        match outcome {
            FieldOutcome::Font(choice) => self.effects.push(Effect::LoadFont(choice)),
            FieldOutcome::Source => {
                self.attach_generations.remove(&id);
            }
            FieldOutcome::Assigned => {}
        }
        self.effects.push(Effect::RefreshBlock(index));
        self.effects.push(Effect::Persist);
        Ok(())
    }

    /// Run a toolbar action over `selection` of a text block's markdown.
    pub fn apply_text_format(
        &mut self,
        index: usize,
        format: TextFormat,
        selection: Range<usize>,
    ) -> Result<()> {
        let markdown = match self.document.blocks().get(index).map(|block| &block.kind) {
            Some(BlockKind::Text(text)) => text.markdown.clone(),
            Some(_) => {
                return Err(Error::UnknownField {
                    path: "markdown".to_string(),
                });
            }
            None => return Err(self.out_of_range(index)),
        };
        let formatted = apply_format(&markdown, selection, format);
        self.update_block_field(index, "markdown", formatted.text)?;
        self.selection = Some(TextSelection {
            index,
            range: formatted.selection,
        });
        Ok(())
    }

    // Media

    /// Start embedding `path` into the media block at `index`.
    pub fn begin_attach(&mut self, index: usize, path: PathBuf) -> Result<AttachTicket> {
        let block = self
            .document
            .blocks()
            .get(index)
            .ok_or_else(|| self.out_of_range(index))?;
        if block.media_source().is_none() {
            return Err(Error::UnknownField {
                path: format!("{}.src", block.block_type()),
            });
        }
        let block_id = block.id.clone();
        self.next_generation += 1;
        let ticket = AttachTicket {
            block_id,
            generation: self.next_generation,
        };
        self.attach_generations
            .insert(ticket.block_id.clone(), ticket.generation);
        self.effects.push(Effect::ReadMedia {
            ticket: ticket.clone(),
            path,
        });
        Ok(ticket)
    }

    /// Apply a finished file read. Returns `false` for stale tickets.
    pub fn finish_attach(&mut self, ticket: &AttachTicket, file_name: &str, data_url: String) -> bool {
        if self.attach_generations.get(&ticket.block_id) != Some(&ticket.generation) {
            tracing::debug!(
                "dropping stale attachment for {} (generation {})",
                ticket.block_id,
                ticket.generation
            );
            return false;
        }
        self.attach_generations.remove(&ticket.block_id);
        if data_url.is_empty() {
            return false;
        }
        let Some(index) = self.document.position_of(&ticket.block_id) else {
            return false;
        };
        let Some(source) = self.document.blocks_mut()[index].media_source_mut() else {
            return false;
        };
        source.src = data_url;
        source.source_mode = SourceMode::Local;
        source.source_name = file_name.to_string();
        self.effects.push(Effect::RefreshBlock(index));
        self.effects.push(Effect::Persist);
        true
    }

    // Document fields

    /// Assign a dotted `site.*` or `theme.*` path.
    ///
    /// Values a typed theme field cannot hold are ignored.
    pub fn set_field(&mut self, path: &str, value: String) -> Result<()> {
        let site = &mut self.document.site;
        let theme = &mut self.document.theme;
        match path {
            "site.title" => site.title = value,
            "site.subtitle" => site.subtitle = value,
            "site.description" => site.description = value,
            "theme.mode" => match ThemeMode::parse(&value) {
                Some(mode) => theme.mode = mode,
                None => tracing::debug!("ignoring theme mode '{value}'"),
            },
            "theme.color" => theme.color = value,
            "theme.accent" => theme.accent = value,
            "theme.scale" => match parse_scale(&value) {
                Some(scale) => theme.scale = scale,
                None => tracing::debug!("ignoring theme scale '{value}'"),
            },
            "theme.font" => theme.font = value,
            "theme.layout" => match Layout::parse(&value) {
                Some(layout) => theme.layout = layout,
                None => tracing::debug!("ignoring layout '{value}'"),
            },
            _ => {
                return Err(Error::UnknownField {
                    path: path.to_string(),
                });
            }
        }
        if path.starts_with("theme.") {
            self.effects.push(Effect::ApplyTheme);
            if path == "theme.layout" {
                self.request_full_render();
            }
        }
        self.effects.push(Effect::RenderSite);
        self.effects.push(Effect::Persist);
        Ok(())
    }

    /// Advance the theme mode and announce it.
    pub fn toggle_theme_mode(&mut self) -> ThemeMode {
        let mode = self.document.theme.mode.next();
        self.document.theme.mode = mode;
        self.effects.push(Effect::ApplyTheme);
        self.effects.push(Effect::Persist);
        self.show_toast(ToastLevel::Info, format!("Modo del tema: {}.", mode.label()));
        mode
    }

    // Modes

    /// React to a URL fragment change. Returns whether edit mode flipped.
    pub fn set_fragment(&mut self, fragment: &str) -> bool {
        let edit_mode = edit_mode_from_fragment(fragment);
        if edit_mode == self.edit_mode {
            return false;
        }
        self.edit_mode = edit_mode;
        self.preview_mode = false;
        self.request_full_render();
        true
    }

    pub fn toggle_preview(&mut self) {
        if !self.edit_mode {
            return;
        }
        self.preview_mode = !self.preview_mode;
        self.request_full_render();
    }

    pub fn open_inline_picker(&mut self, position: usize) {
        if !self.edit_mode || self.preview_mode {
            return;
        }
        self.inline_picker = Some(position.min(self.document.blocks().len()));
        self.effects.push(Effect::RenderAll);
    }

    pub fn close_inline_picker(&mut self) {
        if self.inline_picker.take().is_some() {
            self.effects.push(Effect::RenderAll);
        }
    }

    // Persistence

    /// The document as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.document)?)
    }

    /// Replace the document with normalized `text`.
    ///
    /// Only invalid JSON syntax fails; the document is then left untouched.
    pub fn import_json(&mut self, text: &str) -> Result<()> {
        let document = parse_document(text, &self.seed)?;
        self.replace_document(document);
        self.effects.push(Effect::Persist);
        Ok(())
    }

    /// Swap in a whole document without persisting it.
    ///
    /// Pending attachments are dropped and the page is rebuilt.
    pub fn replace_document(&mut self, document: Document) {
        self.document = document;
        self.attach_generations.clear();
        self.selection = None;
        self.effects.push(Effect::RenderSite);
        self.effects.push(Effect::ApplyTheme);
        self.request_full_render();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldOutcome {
    Assigned,
    Font(FontChoice),
    /// Media source replaced; pending attachments are stale
    Source,
}

fn set_source_mode(source: &mut MediaSource, mode: SourceMode) {
    source.source_mode = mode;
    if mode == SourceMode::Repo {
        source.src.clone_from(&source.repo_path);
        source.source_name.clear();
    }
}

fn route_block_input(block: &mut Block, field: &str, value: String) -> Result<FieldOutcome> {
    if matches!(field, "id" | "type") {
        return Err(Error::UnknownField {
            path: field.to_string(),
        });
    }

    if let Some(source) = block.media_source_mut() {
        match field {
            "src" => {
                source.repo_path.clone_from(&value);
                source.src = value;
                source.source_mode = SourceMode::Repo;
                source.source_name.clear();
                return Ok(FieldOutcome::Source);
            }
            "sourceMode" => {
                let mode = SourceMode::parse(&value).ok_or_else(|| Error::UnknownField {
                    path: format!("sourceMode.{value}"),
                })?;
                set_source_mode(source, mode);
                return Ok(FieldOutcome::Source);
            }
            _ => {}
        }
    }

    match &mut block.kind {
        BlockKind::Gallery(gallery) if field == "items" => {
            gallery.items = parse_gallery(&value);
            return Ok(FieldOutcome::Assigned);
        }
        BlockKind::Links(links) if field == "items" => {
            links.items = parse_links(&value);
            return Ok(FieldOutcome::Assigned);
        }
        BlockKind::Text(text) => match field {
            "fontChoice" => {
                let choice = sanitize_font_choice(&value);
                text.font_choice = choice;
                return Ok(FieldOutcome::Font(choice));
            }
            "fontSize" => {
                text.font_size = sanitize_in(&value, FONT_SIZE);
                return Ok(FieldOutcome::Assigned);
            }
            "lineHeight" => {
                text.line_height = sanitize_in(&value, LINE_HEIGHT);
                return Ok(FieldOutcome::Assigned);
            }
            "textColor" => {
                text.text_color = sanitize_color(&value);
                return Ok(FieldOutcome::Assigned);
            }
            "align" => {
                text.align = sanitize_align(&value);
                return Ok(FieldOutcome::Assigned);
            }
            _ => {}
        },
        BlockKind::Image(image) if field == "width" => {
            image.width = sanitize_in(&value, IMAGE_WIDTH);
            return Ok(FieldOutcome::Assigned);
        }
        _ => {}
    }

    if !block.assign(field, value) && block.block_type().fields().contains(&field) {
        return Err(Error::UnknownField {
            path: format!("{}.{field}", block.block_type()),
        });
    }
    Ok(FieldOutcome::Assigned)
}

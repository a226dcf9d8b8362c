use std::path::PathBuf;

use crate::app::Model;
use crate::app::format::TextFormat;
use crate::app::model::{AttachTicket, EXPORT_FILE_NAME, Effect, ToastLevel};
use crate::document::BlockType;

/// All possible events and actions in the editor.
///
/// These represent user input from the page, completions of asynchronous
/// work, and host events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Blocks
    /// Insert a default block at a position, or at the end
    InsertBlock {
        block_type: BlockType,
        position: Option<usize>,
    },
    /// A palette token dropped into the content column; unknown types become text
    PaletteDrop {
        block_type: String,
        position: Option<usize>,
    },
    /// Write one field of a block
    UpdateBlockField {
        index: usize,
        field: String,
        value: String,
    },
    DuplicateBlock(usize),
    /// Ask to remove a block
    RemoveBlock(usize),
    /// Removal confirmed for the block with this id
    RemoveConfirmed(String),
    MoveBlock { from: usize, to: usize },
    /// Toolbar action over a byte range of a text block
    ApplyFormat {
        index: usize,
        format: TextFormat,
        start: usize,
        end: usize,
    },

    // Inline picker
    OpenInlinePicker(usize),
    CloseInlinePicker,
    /// Insert the chosen type at the open picker's position
    PickBlockType(BlockType),

    // Media
    /// Embed a local file into a media block
    BeginAttach { index: usize, path: PathBuf },
    /// A file read finished
    MediaLoaded {
        ticket: AttachTicket,
        file_name: String,
        data_url: String,
    },

    // Site and theme
    /// Assign a dotted `site.*` / `theme.*` path
    SetField { path: String, value: String },
    ToggleThemeMode,

    // Modes
    /// The URL fragment changed
    HashChanged(String),
    ToggleEdit,
    TogglePreview,
    /// Drop an expired toast
    Tick,

    // Persistence
    Save,
    Export,
    /// Replace the document with JSON text
    Import(String),
}

impl Message {
    /// Short name for logs; payloads may be whole documents.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::InsertBlock { .. } => "insert_block",
            Self::PaletteDrop { .. } => "palette_drop",
            Self::UpdateBlockField { .. } => "update_block_field",
            Self::DuplicateBlock(_) => "duplicate_block",
            Self::RemoveBlock(_) => "remove_block",
            Self::RemoveConfirmed(_) => "remove_confirmed",
            Self::MoveBlock { .. } => "move_block",
            Self::ApplyFormat { .. } => "apply_format",
            Self::OpenInlinePicker(_) => "open_inline_picker",
            Self::CloseInlinePicker => "close_inline_picker",
            Self::PickBlockType(_) => "pick_block_type",
            Self::BeginAttach { .. } => "begin_attach",
            Self::MediaLoaded { .. } => "media_loaded",
            Self::SetField { .. } => "set_field",
            Self::ToggleThemeMode => "toggle_theme_mode",
            Self::HashChanged(_) => "hash_changed",
            Self::ToggleEdit => "toggle_edit",
            Self::TogglePreview => "toggle_preview",
            Self::Tick => "tick",
            Self::Save => "save",
            Self::Export => "export",
            Self::Import(_) => "import",
        }
    }
}

/// Pure function that updates the model based on a message.
///
/// This is the core of The Elm Architecture - all state changes happen here.
/// Side effects are queued on the model and applied by the host afterwards.
pub fn update(mut model: Model, msg: Message) -> Model {
    let result = match msg {
        Message::InsertBlock {
            block_type,
            position,
        } => {
            model.insert_block(block_type, position);
            Ok(())
        }
        Message::PaletteDrop {
            block_type,
            position,
        } => {
            let block_type = block_type.parse().unwrap_or(BlockType::Text);
            model.insert_block(block_type, position);
            Ok(())
        }
        Message::UpdateBlockField {
            index,
            field,
            value,
        } => model.update_block_field(index, &field, value),
        Message::DuplicateBlock(index) => model.duplicate_block(index).map(|_| ()),
        Message::RemoveBlock(index) => model.request_remove(index),
        Message::RemoveConfirmed(id) => model.remove_block_by_id(&id).map(|_| ()),
        Message::MoveBlock { from, to } => model.move_block(from, to).map(|_| ()),
        Message::ApplyFormat {
            index,
            format,
            start,
            end,
        } => model.apply_text_format(index, format, start..end),

        Message::OpenInlinePicker(position) => {
            model.open_inline_picker(position);
            Ok(())
        }
        Message::CloseInlinePicker => {
            model.close_inline_picker();
            Ok(())
        }
        Message::PickBlockType(block_type) => {
            if let Some(position) = model.inline_picker {
                model.insert_block(block_type, Some(position));
            }
            Ok(())
        }

        Message::BeginAttach { index, path } => model.begin_attach(index, path).map(|_| ()),
        Message::MediaLoaded {
            ticket,
            file_name,
            data_url,
        } => {
            model.finish_attach(&ticket, &file_name, data_url);
            Ok(())
        }

        Message::SetField { path, value } => model.set_field(&path, value),
        Message::ToggleThemeMode => {
            model.toggle_theme_mode();
            Ok(())
        }

        Message::HashChanged(fragment) => {
            model.set_fragment(&fragment);
            Ok(())
        }
        Message::ToggleEdit => {
            let fragment = if model.edit_mode { "" } else { "#edit" };
            model.set_fragment(fragment);
            Ok(())
        }
        Message::TogglePreview => {
            model.toggle_preview();
            Ok(())
        }
        Message::Tick => {
            if model.expire_toast(std::time::Instant::now()) {
                model.queue(Effect::RenderAll);
            }
            Ok(())
        }

        Message::Save => {
            model.queue(Effect::Persist);
            model.show_toast(ToastLevel::Info, "Cambios guardados en este navegador.");
            Ok(())
        }
        Message::Export => model.export_json().map(|contents| {
            model.queue(Effect::Download {
                file_name: EXPORT_FILE_NAME.to_string(),
                contents,
            });
            model.show_toast(
                ToastLevel::Info,
                "Descarga iniciada. Sube el archivo a /data/content.json para publicar.",
            );
        }),
        Message::Import(text) => match model.import_json(&text) {
            Ok(()) => {
                model.show_toast(ToastLevel::Info, "Contenido importado correctamente.");
                Ok(())
            }
            Err(err) => {
                tracing::warn!("import failed: {err}");
                model.show_toast(ToastLevel::Error, "El archivo no es un JSON válido.");
                Ok(())
            }
        },
    };

    if let Err(err) = result {
        tracing::debug!("message ignored: {err}");
    }
    model
}

//! Document to view model.
//!
//! Pure computation of everything a page shows. Surfaces turn the result into
//! markup; tests inspect it directly.

use crate::app::{Model, ToastLevel};
use crate::document::{Block, BlockType, DEFAULT_TITLE, Document, Layout};

use super::blocks::render_block_view;
use super::editor::{EditorForm, editor_form};
use super::theme::{FontLink, ThemeVars, block_font_links, theme_vars};

pub const EMPTY_EDITING: &str = "No hay bloques aún. Usa la paleta para comenzar.";
pub const EMPTY_PUBLISHED: &str = "Aún no hay contenido publicado.";
pub const ADD_BLOCK_LABEL: &str = "+ Añadir bloque";

/// Which of the three page modes is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    Viewing,
    Editing,
    /// Edit mode with editing chrome hidden
    Previewing,
}

impl PageMode {
    pub const fn from_flags(edit_mode: bool, preview_mode: bool) -> Self {
        match (edit_mode, preview_mode) {
            (false, _) => Self::Viewing,
            (true, false) => Self::Editing,
            (true, true) => Self::Previewing,
        }
    }

    /// Whether block controls, editors and add affordances are shown.
    pub const fn shows_chrome(self) -> bool {
        matches!(self, Self::Editing)
    }

    /// Body class names for the mode.
    pub const fn body_classes(self) -> &'static str {
        match self {
            Self::Viewing => "is-viewing",
            Self::Editing => "is-editing",
            Self::Previewing => "is-editing preview-mode",
        }
    }
}

/// Header texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteHeader {
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    /// Document title
    pub page_title: String,
}

/// Visible actions and their labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionBar {
    pub toggle_edit: &'static str,
    /// Preview toggle, only in edit mode
    pub preview: Option<&'static str>,
    /// Save, export and import are shown together
    pub persistence: bool,
    pub toggle_theme: &'static str,
}

/// One bound control of the site/theme settings panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingField {
    /// Dotted document path
    pub path: &'static str,
    pub label: &'static str,
    pub value: String,
    /// Fixed options, `None` for free text
    pub options: Option<Vec<(&'static str, &'static str)>>,
}

/// A rendered block with its editing chrome.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockView {
    pub id: String,
    pub index: usize,
    pub block_type: BlockType,
    pub preview_html: String,
    /// Move, duplicate and delete controls
    pub controls: bool,
    pub editor: Option<EditorForm>,
}

/// Entries of the content column in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// "Add block here" affordance inserting at `position`
    AddBetween { position: usize },
    /// Open type picker inserting at `position`
    InlinePicker { position: usize },
    Block(BlockView),
    Empty(&'static str),
}

/// Everything one page shows.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub mode: PageMode,
    pub header: SiteHeader,
    pub actions: ActionBar,
    pub theme: ThemeVars,
    pub block_fonts: Vec<FontLink>,
    pub narrow: bool,
    pub slots: Vec<Slot>,
    /// Draggable block type tokens, only while editing
    pub palette: Vec<BlockType>,
    /// Site and theme settings, only while editing
    pub settings: Vec<SettingField>,
    pub toast: Option<(String, ToastLevel)>,
}

impl PageView {
    pub fn blocks(&self) -> impl Iterator<Item = &BlockView> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Block(view) => Some(view),
            _ => None,
        })
    }
}

/// Header texts for `document`.
pub fn site_header(document: &Document) -> SiteHeader {
    let site = &document.site;
    let non_empty = |value: &str| (!value.is_empty()).then(|| value.to_string());
    let title = non_empty(&site.title).unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let page_title = if site.title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        format!("{} · Micrositio", site.title)
    };
    SiteHeader {
        title,
        subtitle: non_empty(&site.subtitle),
        description: non_empty(&site.description),
        page_title,
    }
}

fn action_bar(mode: PageMode) -> ActionBar {
    match mode {
        PageMode::Viewing => ActionBar {
            toggle_edit: "Editar",
            preview: None,
            persistence: false,
            toggle_theme: "Tema",
        },
        PageMode::Editing | PageMode::Previewing => ActionBar {
            toggle_edit: "Salir de edición",
            preview: Some(if mode == PageMode::Previewing {
                "Volver a editar"
            } else {
                "Previsualizar"
            }),
            persistence: true,
            toggle_theme: "Tema",
        },
    }
}

fn settings(document: &Document) -> Vec<SettingField> {
    let text = |path, label, value: &str| SettingField {
        path,
        label,
        value: value.to_string(),
        options: None,
    };
    let theme = &document.theme;
    vec![
        text("site.title", "Título", &document.site.title),
        text("site.subtitle", "Subtítulo", &document.site.subtitle),
        text("site.description", "Descripción", &document.site.description),
        SettingField {
            path: "theme.mode",
            label: "Modo",
            value: theme.mode.as_str().to_string(),
            options: Some(vec![
                ("auto", "Automático"),
                ("light", "Claro"),
                ("dark", "Oscuro"),
            ]),
        },
        text("theme.color", "Color principal", &theme.color),
        text("theme.accent", "Color de acento", &theme.accent),
        text("theme.scale", "Escala de texto", &theme.scale.to_string()),
        text("theme.font", "Fuente (Google Fonts)", &theme.font),
        SettingField {
            path: "theme.layout",
            label: "Ancho del contenido",
            value: theme.layout.as_str().to_string(),
            options: Some(vec![("default", "Normal"), ("narrow", "Estrecho")]),
        },
    ]
}

/// View of the block at `index`, with chrome when `mode` shows it.
pub fn block_view(block: &Block, index: usize, mode: PageMode) -> BlockView {
    let chrome = mode.shows_chrome();
    BlockView {
        id: block.id.clone(),
        index,
        block_type: block.block_type(),
        preview_html: render_block_view(block),
        controls: chrome,
        editor: chrome.then(|| editor_form(block, index)),
    }
}

/// Content column slots.
///
/// In edit mode an add affordance precedes the first block and follows every
/// block; an open picker sits right after the affordance it belongs to.
pub fn slots(blocks: &[Block], mode: PageMode, inline_picker: Option<usize>) -> Vec<Slot> {
    let chrome = mode.shows_chrome();
    let mut slots = Vec::with_capacity(blocks.len() * 2 + 2);
    let add_between = |slots: &mut Vec<Slot>, position: usize| {
        if chrome {
            slots.push(Slot::AddBetween { position });
            if inline_picker == Some(position) {
                slots.push(Slot::InlinePicker { position });
            }
        }
    };

    add_between(&mut slots, 0);
    for (index, block) in blocks.iter().enumerate() {
        slots.push(Slot::Block(block_view(block, index, mode)));
        add_between(&mut slots, index + 1);
    }

    if blocks.is_empty() {
        let message = if mode == PageMode::Viewing {
            EMPTY_PUBLISHED
        } else {
            EMPTY_EDITING
        };
        slots.push(Slot::Empty(message));
    }
    slots
}

/// Build the page for the current model.
pub fn page_view(model: &Model) -> PageView {
    let document = &model.document;
    let mode = PageMode::from_flags(model.edit_mode, model.preview_mode);
    let _scope = crate::perf::scope("ui.page_view").with("blocks", document.blocks().len());
    let blocks = document.blocks();
    let editing = mode.shows_chrome();

    PageView {
        mode,
        header: site_header(document),
        actions: action_bar(mode),
        theme: theme_vars(&document.theme),
        block_fonts: block_font_links(blocks),
        narrow: document.theme.layout == Layout::Narrow,
        slots: slots(blocks, mode, model.inline_picker),
        palette: if editing {
            BlockType::ALL.to_vec()
        } else {
            Vec::new()
        },
        settings: if editing {
            settings(document)
        } else {
            Vec::new()
        },
        toast: model
            .active_toast()
            .map(|(message, level)| (message.to_string(), level)),
    }
}

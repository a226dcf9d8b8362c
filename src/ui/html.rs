//! View model to HTML.
//!
//! The imperative half of rendering. Data attributes mirror the store's
//! message vocabulary (`data-index`, `data-id`, `data-insert-at`, field
//! `name`s, `data-bind` paths) so a page script can route events back.

use std::fmt::Write;

use crate::app::ToastLevel;
use crate::markdown::escape_html;

use super::editor::{Control, EditorForm, Field, SOURCE_MODE_OPTIONS};
use super::theme::FontLink;
use super::view::{ADD_BLOCK_LABEL, BlockView, PageView, SettingField, Slot};

const PAGE_CSS: &str = include_str!("page.css");

fn attr(value: &str) -> String {
    escape_html(value)
}

fn font_link(link: &FontLink) -> String {
    format!(
        "<link rel=\"stylesheet\" id=\"{}\" href=\"{}\" />",
        attr(&link.id),
        attr(&link.href)
    )
}

/// A complete standalone page.
pub fn render_page(page: &PageView) -> String {
    let _scope = crate::perf::scope("ui.render_page").with("slots", page.slots.len());
    let mut html = String::with_capacity(8 * 1024);
    html.push_str("<!DOCTYPE html>\n");
    let _ = write!(
        html,
        "<html lang=\"es\" data-mode=\"{}\" style=\"{}\">",
        page.theme.mode.as_str(),
        attr(&page.theme.style_declarations())
    );
    html.push_str("<head><meta charset=\"utf-8\" />");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />");
    let _ = write!(html, "<title>{}</title>", escape_html(&page.header.page_title));
    if let Some(link) = &page.theme.font_link {
        html.push_str(&font_link(link));
    }
    for link in &page.block_fonts {
        html.push_str(&font_link(link));
    }
    let _ = write!(html, "<style>{PAGE_CSS}</style></head>");

    let _ = write!(
        html,
        "<body class=\"{}\" data-mode=\"{}\">",
        page.mode.body_classes(),
        page.theme.mode.as_str()
    );
    html.push_str(&render_header(page));

    let layout_class = if page.mode.shows_chrome() {
        "layout"
    } else {
        "layout view-mode"
    };
    let _ = write!(html, "<div class=\"{layout_class}\">");
    if !page.palette.is_empty() {
        html.push_str(&render_palette(page));
    }
    let content_class = if page.narrow {
        "content layout-narrow"
    } else {
        "content"
    };
    let _ = write!(html, "<main id=\"content\" class=\"{content_class}\">");
    html.push_str(&render_slots(&page.slots));
    html.push_str("</main>");
    if !page.settings.is_empty() {
        html.push_str(&render_settings(&page.settings));
    }
    html.push_str("</div>");

    if let Some((message, level)) = &page.toast {
        html.push_str(&render_toast(message, *level));
    }
    html.push_str("</body></html>\n");
    html
}

fn render_header(page: &PageView) -> String {
    let header = &page.header;
    let mut html = String::from("<header class=\"site-header\">");
    let _ = write!(html, "<h1 id=\"siteTitle\">{}</h1>", escape_html(&header.title));
    if let Some(subtitle) = &header.subtitle {
        let _ = write!(html, "<p id=\"siteSubtitle\">{}</p>", escape_html(subtitle));
    }
    if let Some(description) = &header.description {
        let _ = write!(
            html,
            "<p id=\"siteDescription\" class=\"muted\">{}</p>",
            escape_html(description)
        );
    }

    let actions = &page.actions;
    html.push_str("<nav class=\"actions\">");
    let _ = write!(
        html,
        "<button type=\"button\" data-action=\"toggle-edit\">{}</button>",
        actions.toggle_edit
    );
    if let Some(preview) = actions.preview {
        let _ = write!(
            html,
            "<button type=\"button\" data-action=\"preview\">{preview}</button>"
        );
    }
    if actions.persistence {
        html.push_str("<button type=\"button\" data-action=\"save\">Guardar</button>");
        html.push_str("<button type=\"button\" data-action=\"export\">Exportar</button>");
        html.push_str(
            "<label data-action=\"import\">Importar<input type=\"file\" accept=\"application/json\" /></label>",
        );
    }
    let _ = write!(
        html,
        "<button type=\"button\" data-action=\"toggle-theme\">{}</button>",
        actions.toggle_theme
    );
    html.push_str("</nav></header>");
    html
}

fn render_palette(page: &PageView) -> String {
    let mut html = String::from("<aside id=\"palette\" class=\"palette\">");
    for block_type in &page.palette {
        let _ = write!(
            html,
            "<div class=\"palette-item\"><button type=\"button\" data-add=\"{}\">{}</button></div>",
            block_type.as_str(),
            block_type.label()
        );
    }
    html.push_str("</aside>");
    html
}

fn render_inline_picker(position: usize) -> String {
    let mut html = format!("<div class=\"inline-picker\" data-insert-at=\"{position}\">");
    for block_type in crate::document::BlockType::ALL {
        let _ = write!(
            html,
            "<button type=\"button\" data-type=\"{}\">{}</button>",
            block_type.as_str(),
            block_type.label()
        );
    }
    html.push_str("</div>");
    html
}

/// Markup of the content column.
pub fn render_slots(slots: &[Slot]) -> String {
    let mut html = String::new();
    for slot in slots {
        match slot {
            Slot::AddBetween { position } => {
                let _ = write!(
                    html,
                    "<div class=\"add-between\"><button type=\"button\" data-insert-at=\"{position}\">{ADD_BLOCK_LABEL}</button></div>"
                );
            }
            Slot::InlinePicker { position } => html.push_str(&render_inline_picker(*position)),
            Slot::Block(view) => html.push_str(&render_block(view)),
            Slot::Empty(message) => {
                let _ = write!(html, "<p class=\"muted\">{message}</p>");
            }
        }
    }
    html
}

/// The `<section>` of one block.
pub fn render_block(view: &BlockView) -> String {
    let mut html = format!(
        "<section class=\"block block-{}\" data-id=\"{}\" data-index=\"{}\">",
        view.block_type.as_str(),
        attr(&view.id),
        view.index
    );
    if view.controls {
        html.push_str("<div class=\"block-controls\">");
        html.push_str("<button type=\"button\" class=\"drag-handle\">Mover</button>");
        html.push_str("<button type=\"button\" data-action=\"duplicate\">Duplicar</button>");
        html.push_str("<button type=\"button\" data-action=\"remove\">Eliminar</button>");
        html.push_str("</div>");
    }
    let _ = write!(
        html,
        "<div class=\"block-preview\">{}</div>",
        view.preview_html
    );
    if let Some(editor) = &view.editor {
        html.push_str(&render_editor(editor));
    }
    html.push_str("</section>");
    html
}

/// The editor pane of one block.
pub fn render_editor(form: &EditorForm) -> String {
    let mut html = format!("<div class=\"block-editor\" data-index=\"{}\">", form.index);
    for field in &form.fields {
        html.push_str(&render_field(field));
    }
    html.push_str("</div>");
    html
}

fn render_field(field: &Field) -> String {
    let hidden = if field.hidden { " hidden" } else { "" };
    let name = field.name;
    let value = attr(&field.value);
    let control = match &field.control {
        Control::Input => format!("<input name=\"{name}\" value=\"{value}\" />"),
        Control::Textarea { rows } => format!(
            "<textarea name=\"{name}\" rows=\"{rows}\">{value}</textarea>"
        ),
        Control::Number {
            min,
            max,
            step,
            placeholder,
        } => format!(
            "<input type=\"number\" name=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"{step}\" placeholder=\"{placeholder}\" value=\"{value}\" />"
        ),
        Control::Color => format!("<input type=\"color\" name=\"{name}\" value=\"{value}\" />"),
        Control::Select(options) => {
            let mut select = format!("<select name=\"{name}\">");
            for (option, label) in options {
                let selected = if *option == field.value { " selected" } else { "" };
                let _ = write!(select, "<option value=\"{option}\"{selected}>{label}</option>");
            }
            select.push_str("</select>");
            select
        }
        Control::SourceToggle => {
            let mut toggle = String::new();
            for (mode, label) in SOURCE_MODE_OPTIONS {
                let checked = if mode.as_str() == field.value { " checked" } else { "" };
                let _ = write!(
                    toggle,
                    "<label class=\"media-source-option\"><input type=\"radio\" name=\"{name}\" value=\"{}\"{checked} />{label}</label>",
                    mode.as_str()
                );
            }
            return format!(
                "<fieldset class=\"media-source-toggle\"><legend>{}</legend>{toggle}</fieldset>",
                field.label
            );
        }
        Control::File { accept } => {
            format!("<input type=\"file\" name=\"{name}\" accept=\"{accept}\" />")
        }
        Control::Toolbar(formats) => {
            let mut toolbar = format!(
                "<div class=\"text-toolbar\" role=\"group\" aria-label=\"{}\">",
                field.label
            );
            for format in formats {
                let _ = write!(
                    toolbar,
                    "<button type=\"button\" data-format=\"{}\">{}</button>",
                    format.as_str(),
                    format.label()
                );
            }
            toolbar.push_str("</div>");
            return toolbar;
        }
    };
    let reset = field.reset.map_or_else(String::new, |label| {
        format!("<button type=\"button\" data-reset=\"{name}\">{label}</button>")
    });
    let hint = field.hint.as_deref().map_or_else(String::new, |hint| {
        format!("<span class=\"field-hint\">{}</span>", escape_html(hint))
    });
    format!(
        "<label class=\"field\"{hidden}>{}{control}{reset}{hint}</label>",
        field.label
    )
}

fn render_settings(settings: &[SettingField]) -> String {
    let mut html = String::from("<aside id=\"editorPanel\" class=\"editor-panel\">");
    for setting in settings {
        let path = setting.path;
        let control = match &setting.options {
            Some(options) => {
                let mut select = format!("<select data-bind=\"{path}\">");
                for (option, label) in options {
                    let selected = if *option == setting.value { " selected" } else { "" };
                    let _ = write!(select, "<option value=\"{option}\"{selected}>{label}</option>");
                }
                select.push_str("</select>");
                select
            }
            None => format!(
                "<input data-bind=\"{path}\" value=\"{}\" />",
                attr(&setting.value)
            ),
        };
        let _ = write!(html, "<label>{}{control}</label>", setting.label);
    }
    html.push_str("</aside>");
    html
}

fn render_toast(message: &str, level: ToastLevel) -> String {
    let class = match level {
        ToastLevel::Info => "toast",
        ToastLevel::Warning => "toast toast-warning",
        ToastLevel::Error => "toast toast-error",
    };
    format!("<div class=\"{class}\" role=\"status\">{}</div>", escape_html(message))
}

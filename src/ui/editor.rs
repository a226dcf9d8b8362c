//! Per-variant editor forms.
//!
//! A form is a flat list of controls bound to block field names. The names are
//! the ones `Message::UpdateBlockField` accepts, so a surface can route any
//! control change straight back into the store.

use crate::app::TextFormat;
use crate::document::{
    Block, BlockKind, FontChoice, MediaSource, SourceMode, TextBlock, serialize_gallery,
    serialize_links,
};

/// Color shown by the text color picker when no override is set.
pub const DEFAULT_TEXT_COLOR: &str = "#1b1f24";

/// How a control is presented.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Input,
    Textarea {
        rows: u8,
    },
    Number {
        min: &'static str,
        max: &'static str,
        step: &'static str,
        placeholder: &'static str,
    },
    Color,
    Select(Vec<(&'static str, &'static str)>),
    /// Radio pair switching between repository and embedded sources
    SourceToggle,
    /// Local file picker for embedding
    File {
        accept: &'static str,
    },
    /// Markdown formatting buttons
    Toolbar(Vec<TextFormat>),
}

/// One bound control.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Block field the control writes
    pub name: &'static str,
    pub label: &'static str,
    pub control: Control,
    pub value: String,
    pub hint: Option<String>,
    /// Label of a button that writes an empty value back
    pub reset: Option<&'static str>,
    /// Hidden controls stay in the form but are not shown
    pub hidden: bool,
}

impl Field {
    fn new(name: &'static str, label: &'static str, control: Control, value: &str) -> Self {
        Self {
            name,
            label,
            control,
            value: value.to_string(),
            hint: None,
            reset: None,
            hidden: false,
        }
    }

    fn input(name: &'static str, label: &'static str, value: &str) -> Self {
        Self::new(name, label, Control::Input, value)
    }

    fn textarea(name: &'static str, label: &'static str, value: &str) -> Self {
        let rows = if name == "markdown" { 6 } else { 4 };
        Self::new(name, label, Control::Textarea { rows }, value)
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    const fn with_reset(mut self, label: &'static str) -> Self {
        self.reset = Some(label);
        self
    }

    const fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }
}

/// The editor pane of one block.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorForm {
    pub index: usize,
    pub fields: Vec<Field>,
}

impl EditorForm {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

struct MediaLabels {
    repo: &'static str,
    example: &'static str,
    local: &'static str,
    accept: &'static str,
}

const IMAGE_LABELS: MediaLabels = MediaLabels {
    repo: "Imagen en el repositorio (assets/images/...)",
    example: "Ej: assets/images/diagrama.png",
    local: "Selecciona una imagen local",
    accept: "image/*",
};

const AUDIO_LABELS: MediaLabels = MediaLabels {
    repo: "Audio en el repositorio (assets/audios/...)",
    example: "Ej: assets/audios/leccion.mp3",
    local: "Selecciona un audio local",
    accept: "audio/*",
};

const PDF_LABELS: MediaLabels = MediaLabels {
    repo: "PDF en el repositorio (assets/pdfs/...)",
    example: "Ej: assets/pdfs/apuntes.pdf",
    local: "Selecciona un PDF local",
    accept: "application/pdf,.pdf",
};

/// Build the editor form for the block at `index`.
pub fn editor_form(block: &Block, index: usize) -> EditorForm {
    let fields = match &block.kind {
        BlockKind::Text(text) => text_fields(text),
        BlockKind::Image(image) => {
            let mut fields = media_fields(&image.source, &IMAGE_LABELS);
            fields.push(Field::input("alt", "Texto alternativo", &image.alt));
            fields.push(Field::input("caption", "Pie de foto", &image.caption));
            fields.push(
                Field::new(
                    "width",
                    "Ancho máximo (%)",
                    Control::Number {
                        min: "10",
                        max: "100",
                        step: "5",
                        placeholder: "100",
                    },
                    &image.width,
                )
                .with_reset("Restablecer")
                .with_hint("Deja vacío para ocupar el ancho completo del bloque."),
            );
            fields
        }
        BlockKind::Audio(audio) => {
            let mut fields = media_fields(&audio.source, &AUDIO_LABELS);
            fields.push(Field::input("caption", "Descripción", &audio.caption));
            fields
        }
        BlockKind::Pdf(pdf) => {
            let mut fields = media_fields(&pdf.source, &PDF_LABELS);
            fields.push(Field::input("caption", "Descripción", &pdf.caption));
            fields
        }
        BlockKind::Youtube(video) => vec![
            Field::input("url", "URL del video", &video.url),
            Field::input("caption", "Leyenda", &video.caption),
        ],
        BlockKind::Quote(quote) => vec![
            Field::textarea("text", "Texto de la cita", &quote.text),
            Field::input("cite", "Autor o fuente", &quote.cite),
        ],
        BlockKind::Callout(callout) => {
            vec![Field::textarea("text", "Mensaje destacado", &callout.text)]
        }
        BlockKind::Gallery(gallery) => vec![Field::textarea(
            "items",
            "Elementos (src|alt|caption por línea)",
            &serialize_gallery(&gallery.items),
        )],
        BlockKind::Links(links) => vec![Field::textarea(
            "items",
            "Enlaces (label|url por línea)",
            &serialize_links(&links.items),
        )],
    };
    EditorForm { index, fields }
}

fn text_fields(text: &TextBlock) -> Vec<Field> {
    let fonts = FontChoice::ALL
        .into_iter()
        .map(|choice| (choice.as_str(), choice.label()))
        .collect();
    let color = if text.text_color.is_empty() {
        DEFAULT_TEXT_COLOR
    } else {
        &text.text_color
    };
    vec![
        Field::new(
            "format",
            "Formato rápido",
            Control::Toolbar(TextFormat::ALL.to_vec()),
            "",
        ),
        Field::textarea("markdown", "Contenido", &text.markdown),
        Field::new("fontChoice", "Fuente", Control::Select(fonts), text.font_choice.as_str()),
        Field::new(
            "align",
            "Alineación",
            Control::Select(vec![
                ("", "Hereda del tema"),
                ("left", "Izquierda"),
                ("center", "Centrada"),
                ("right", "Derecha"),
                ("justify", "Justificada"),
            ]),
            &text.align,
        ),
        Field::new(
            "fontSize",
            "Tamaño (rem)",
            Control::Number {
                min: "0.6",
                max: "3",
                step: "0.05",
                placeholder: "1 (tema)",
            },
            &text.font_size,
        )
        .with_reset("Restablecer"),
        Field::new(
            "lineHeight",
            "Interlineado",
            Control::Number {
                min: "1",
                max: "3",
                step: "0.05",
                placeholder: "1.6 (auto)",
            },
            &text.line_height,
        )
        .with_reset("Restablecer"),
        Field::new("textColor", "Color del texto", Control::Color, color).with_reset("Tema"),
    ]
}

fn media_fields(source: &MediaSource, labels: &MediaLabels) -> Vec<Field> {
    let local = source.source_mode == SourceMode::Local;
    let repo_value = if local || !source.repo_path.is_empty() {
        &source.repo_path
    } else {
        &source.src
    };
    let local_status = if local && !source.source_name.is_empty() {
        format!("Archivo actual: {}", source.source_name)
    } else {
        "El archivo se guardará incrustado en el JSON".to_string()
    };
    vec![
        Field::new(
            "sourceMode",
            "Origen del archivo",
            Control::SourceToggle,
            source.source_mode.as_str(),
        ),
        Field::input("src", labels.repo, repo_value)
            .with_hint(labels.example)
            .hidden(local),
        Field::new(
            "file",
            labels.local,
            Control::File {
                accept: labels.accept,
            },
            "",
        )
        .with_hint(local_status)
        .hidden(!local),
    ]
}

/// Labels of the source toggle options.
pub const SOURCE_MODE_OPTIONS: [(SourceMode, &str); 2] = [
    (SourceMode::Repo, "Repositorio (/assets/...)"),
    (SourceMode::Local, "Archivo local (se incrusta)"),
];

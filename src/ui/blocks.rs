//! Per-variant preview markup.
//!
//! Every function escapes what it interpolates and falls back to a bracketed
//! literal when a required field is missing. None of them can fail.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::{
    Block, BlockKind, CalloutBlock, FONT_SIZE, GalleryBlock, IMAGE_WIDTH, ImageBlock, LINE_HEIGHT,
    LinksBlock, MediaBlock, QuoteBlock, TextBlock, YoutubeBlock, sanitize_align, sanitize_color,
    sanitize_in,
};
use crate::markdown::{escape_html, render_markdown};

static YOUTUBE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtu\.be/|youtube\.com/(?:watch\?v=|embed/|shorts/))([A-Za-z0-9_-]{11})")
        .expect("valid youtube regex")
});

pub const IMAGE_FALLBACK: &str = "[Imagen no encontrada]";
pub const AUDIO_FALLBACK: &str = "[Audio no disponible]";
pub const VIDEO_FALLBACK: &str = "[Video no disponible]";
pub const PDF_FALLBACK: &str = "[PDF no disponible]";
pub const GALLERY_FALLBACK: &str = "[Galería vacía]";
pub const GALLERY_ITEM_FALLBACK: &str = "[Imagen]";
pub const LINKS_FALLBACK: &str = "[Sin enlaces]";

/// Preview markup for one block.
pub fn render_block_view(block: &Block) -> String {
    match &block.kind {
        BlockKind::Text(text) => text_view(text),
        BlockKind::Image(image) => image_view(image),
        BlockKind::Audio(audio) => format!("<div>{}</div>", audio_view(audio)),
        BlockKind::Youtube(video) => youtube_view(video),
        BlockKind::Pdf(pdf) => pdf_view(pdf),
        BlockKind::Quote(quote) => quote_view(quote),
        BlockKind::Callout(callout) => callout_view(callout),
        BlockKind::Gallery(gallery) => gallery_view(gallery),
        BlockKind::Links(links) => links_view(links),
    }
}

fn fallback(class: &str, text: &str) -> String {
    format!("<div class=\"{class}\">{text}</div>")
}

fn style_attr(declarations: &[String]) -> String {
    if declarations.is_empty() {
        String::new()
    } else {
        format!(" style=\"{}\"", escape_html(&declarations.join("; ")))
    }
}

/// Inline style declarations for a text block's overrides.
pub fn text_style(text: &TextBlock) -> Vec<String> {
    let mut styles = Vec::new();
    if let Some(css) = text.font_choice.css() {
        styles.push(format!("font-family: {css}"));
    }
    let size = sanitize_in(&text.font_size, FONT_SIZE);
    if !size.is_empty() {
        styles.push(format!("font-size: {size}rem"));
    }
    let line_height = sanitize_in(&text.line_height, LINE_HEIGHT);
    if !line_height.is_empty() {
        styles.push(format!("line-height: {line_height}"));
    }
    let color = sanitize_color(&text.text_color);
    if !color.is_empty() {
        styles.push(format!("color: {color}"));
    }
    let align = sanitize_align(&text.align);
    if !align.is_empty() {
        styles.push(format!("text-align: {align}"));
    }
    styles
}

fn text_view(text: &TextBlock) -> String {
    format!(
        "<div class=\"text-rich\"{}>{}</div>",
        style_attr(&text_style(text)),
        render_markdown(&text.markdown)
    )
}

fn image_view(image: &ImageBlock) -> String {
    let src = escape_html(&image.source.src);
    if src.is_empty() {
        return fallback("media-fallback", IMAGE_FALLBACK);
    }
    let width = sanitize_in(&image.width, IMAGE_WIDTH);
    let figure_style = if width.is_empty() {
        Vec::new()
    } else {
        vec![format!("width: {width}%"), "margin-inline: auto".to_string()]
    };
    format!(
        "<figure{}><img src=\"{src}\" alt=\"{}\" loading=\"lazy\" data-fallback=\"image\" />{}</figure>",
        style_attr(&figure_style),
        escape_html(&image.alt),
        figcaption(&image.caption)
    )
}

fn figcaption(caption: &str) -> String {
    if caption.is_empty() {
        String::new()
    } else {
        format!("<figcaption>{}</figcaption>", escape_html(caption))
    }
}

fn caption_paragraph(caption: &str) -> String {
    if caption.is_empty() {
        String::new()
    } else {
        format!("<p>{}</p>", escape_html(caption))
    }
}

fn audio_view(audio: &MediaBlock) -> String {
    let src = escape_html(&audio.source.src);
    if src.is_empty() {
        return fallback("audio-fallback", AUDIO_FALLBACK);
    }
    format!(
        "{}<audio controls preload=\"metadata\" data-fallback=\"audio\"><source src=\"{src}\" />Tu navegador no soporta audio HTML5.</audio>",
        caption_paragraph(&audio.caption)
    )
}

/// Video id from the common YouTube URL shapes, or from a `v` query parameter.
pub fn extract_youtube_id(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }
    if let Some(caps) = YOUTUBE_ID.captures(url) {
        return Some(caps[1].to_string());
    }
    let query = url.split('?').nth(1)?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

fn youtube_view(video: &YoutubeBlock) -> String {
    let Some(id) = extract_youtube_id(&video.url) else {
        return fallback("media-fallback", VIDEO_FALLBACK);
    };
    let caption = if video.caption.is_empty() {
        String::new()
    } else {
        format!("<p class=\"muted\">{}</p>", escape_html(&video.caption))
    };
    format!(
        "<div class=\"youtube-wrapper\"><iframe loading=\"lazy\" src=\"https://www.youtube.com/embed/{}\" title=\"Video de YouTube\" allowfullscreen></iframe></div>{caption}",
        escape_html(&id)
    )
}

fn pdf_view(pdf: &MediaBlock) -> String {
    let src = escape_html(&pdf.source.src);
    if src.is_empty() {
        return fallback("media-fallback", PDF_FALLBACK);
    }
    format!(
        "{}<object type=\"application/pdf\" data=\"{src}\" data-fallback=\"pdf\">Tu navegador no puede mostrar PDF.</object><p><a href=\"{src}\" download>Descargar PDF</a></p>",
        caption_paragraph(&pdf.caption)
    )
}

fn quote_view(quote: &QuoteBlock) -> String {
    let cite = if quote.cite.is_empty() {
        String::new()
    } else {
        format!("<cite>{}</cite>", escape_html(&quote.cite))
    };
    format!("<blockquote>{}{cite}</blockquote>", render_markdown(&quote.text))
}

fn callout_view(callout: &CalloutBlock) -> String {
    format!(
        "<div class=\"block-callout\">{}</div>",
        render_markdown(&callout.text)
    )
}

fn gallery_view(gallery: &GalleryBlock) -> String {
    if gallery.items.is_empty() {
        return fallback("media-fallback", GALLERY_FALLBACK);
    }
    let figures: String = gallery
        .items
        .iter()
        .map(|item| {
            let image = if item.src.is_empty() {
                fallback("media-fallback", GALLERY_ITEM_FALLBACK)
            } else {
                format!(
                    "<img src=\"{}\" alt=\"{}\" loading=\"lazy\" data-fallback=\"image\" />",
                    escape_html(&item.src),
                    escape_html(&item.alt)
                )
            };
            format!("<figure>{image}{}</figure>", figcaption(&item.caption))
        })
        .collect();
    format!("<div class=\"block-gallery\">{figures}</div>")
}

fn links_view(links: &LinksBlock) -> String {
    if links.items.is_empty() {
        return fallback("media-fallback", LINKS_FALLBACK);
    }
    let items: String = links
        .items
        .iter()
        .map(|item| {
            let url = if item.url.is_empty() { "#" } else { &item.url };
            let label = if item.label.is_empty() { url } else { &item.label };
            format!(
                "<li><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></li>",
                escape_html(url),
                escape_html(label)
            )
        })
        .collect();
    format!("<div class=\"block-links\"><ul>{items}</ul></div>")
}

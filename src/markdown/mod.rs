//! Restricted markdown to HTML.
//!
//! Supports headings (`#`, `##`, `###`), bold, italic, links, ordered and
//! unordered lists, and paragraphs. Input is HTML-escaped before any rule
//! runs, so raw markup in the source never reaches the output.

use std::sync::LazyLock;

use regex::Regex;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#+)\s+(.*)$").expect("valid heading regex"));
static ORDERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s+(.*)$").expect("valid ordered regex"));
static UNORDERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*]\s+(.*)$").expect("valid unordered regex"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold regex"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.+?)\*").expect("valid italic regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.+?)\]\((.+?)\)").expect("valid link regex"));

/// Deepest heading level emitted.
const MAX_HEADING_LEVEL: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Ordered,
    Unordered,
}

impl ListKind {
    const fn open_tag(self) -> &'static str {
        match self {
            Self::Ordered => "<ol>",
            Self::Unordered => "<ul>",
        }
    }

    const fn close_tag(self) -> &'static str {
        match self {
            Self::Ordered => "</ol>",
            Self::Unordered => "</ul>",
        }
    }
}

/// Escape text for safe interpolation into HTML content and attributes.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render markdown to an HTML string.
///
/// Never returns an empty string: empty input yields `<p></p>` so a block
/// keeps a visible height.
pub fn render_markdown(text: &str) -> String {
    let escaped = escape_html(text);
    let mut html = String::new();
    let mut open_list: Option<ListKind> = None;

    for line in escaped.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.trim().is_empty() {
            close_list(&mut html, &mut open_list);
            continue;
        }

        if let Some(caps) = HEADING.captures(line) {
            close_list(&mut html, &mut open_list);
            let level = caps[1].len().min(MAX_HEADING_LEVEL);
            html.push_str(&format!(
                "<h{level}>{}</h{level}>",
                format_inline(&caps[2])
            ));
            continue;
        }

        if let Some(caps) = ORDERED.captures(line) {
            switch_list(&mut html, &mut open_list, ListKind::Ordered);
            html.push_str(&format!("<li>{}</li>", format_inline(&caps[2])));
            continue;
        }

        if let Some(caps) = UNORDERED.captures(line) {
            switch_list(&mut html, &mut open_list, ListKind::Unordered);
            html.push_str(&format!("<li>{}</li>", format_inline(&caps[1])));
            continue;
        }

        close_list(&mut html, &mut open_list);
        html.push_str(&format!("<p>{}</p>", format_inline(line)));
    }
    close_list(&mut html, &mut open_list);

    if html.is_empty() {
        "<p></p>".to_string()
    } else {
        html
    }
}

/// Apply inline rules in fixed order: bold, then italic, then links.
///
/// Expects already-escaped text.
pub fn format_inline(text: &str) -> String {
    let bolded = BOLD.replace_all(text, "<strong>${1}</strong>");
    let italic = ITALIC.replace_all(&bolded, "<em>${1}</em>");
    LINK.replace_all(
        &italic,
        r#"<a href="${2}" target="_blank" rel="noopener noreferrer">${1}</a>"#,
    )
    .into_owned()
}

fn close_list(html: &mut String, open_list: &mut Option<ListKind>) {
    if let Some(kind) = open_list.take() {
        html.push_str(kind.close_tag());
    }
}

fn switch_list(html: &mut String, open_list: &mut Option<ListKind>, kind: ListKind) {
    if *open_list == Some(kind) {
        return;
    }
    close_list(html, open_list);
    html.push_str(kind.open_tag());
    *open_list = Some(kind);
}

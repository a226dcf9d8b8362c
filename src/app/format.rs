//! Quick formatting for markdown text areas.
//!
//! Offsets are byte offsets into the text. Out-of-range or mid-character
//! offsets are clamped to the nearest preceding character boundary.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::Error;

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([-*]\s+|\d+\.\s+)").expect("valid list marker regex"));

const INLINE_PLACEHOLDER: &str = "texto";
const LIST_PLACEHOLDER: &str = "Elemento de la lista";

/// Toolbar actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Bold,
    Italic,
    Bullets,
    Numbered,
}

impl TextFormat {
    pub const ALL: [Self; 4] = [Self::Bold, Self::Italic, Self::Bullets, Self::Numbered];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Bullets => "ul",
            Self::Numbered => "ol",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Bold => "Negrita",
            Self::Italic => "Itálica",
            Self::Bullets => "Viñetas",
            Self::Numbered => "Numerada",
        }
    }
}

impl fmt::Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| Error::UnknownField {
                path: format!("format.{s}"),
            })
    }
}

/// New text plus the range to leave selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatted {
    pub text: String,
    pub selection: Range<usize>,
}

fn floor_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Apply `format` to `selection` within `text`.
pub fn apply_format(text: &str, selection: Range<usize>, format: TextFormat) -> Formatted {
    let start = floor_boundary(text, selection.start);
    let end = floor_boundary(text, selection.end).max(start);
    match format {
        TextFormat::Bold => wrap(text, start..end, "**"),
        TextFormat::Italic => wrap(text, start..end, "*"),
        TextFormat::Bullets => list(text, start..end, false),
        TextFormat::Numbered => list(text, start..end, true),
    }
}

fn wrap(text: &str, selection: Range<usize>, marker: &str) -> Formatted {
    let selected = &text[selection.clone()];
    let content = if selected.is_empty() {
        INLINE_PLACEHOLDER
    } else {
        selected
    };
    let inner_start = selection.start + marker.len();
    Formatted {
        text: format!(
            "{}{marker}{content}{marker}{}",
            &text[..selection.start],
            &text[selection.end..]
        ),
        selection: inner_start..inner_start + content.len(),
    }
}

fn list(text: &str, selection: Range<usize>, ordered: bool) -> Formatted {
    let line_start = text[..selection.start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[selection.end..]
        .find('\n')
        .map_or(text.len(), |i| selection.end + i);
    let lines = match &text[line_start..line_end] {
        "" => LIST_PLACEHOLDER,
        lines => lines,
    };

    let formatted = lines
        .split('\n')
        .enumerate()
        .map(|(i, line)| {
            let counter = i + 1;
            let line = line.strip_suffix('\r').unwrap_or(line);
            let clean = LIST_MARKER.replace(line, "");
            let clean = clean.trim();
            let content = if clean.is_empty() {
                format!("Elemento {counter}")
            } else {
                clean.to_string()
            };
            if ordered {
                format!("{counter}. {content}")
            } else {
                format!("- {content}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    Formatted {
        text: format!("{}{formatted}{}", &text[..line_start], &text[line_end..]),
        selection: line_start..line_start + formatted.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_wraps_selection_and_selects_inner_text() {
        let result = apply_format("hola mundo", 5..10, TextFormat::Bold);
        assert_eq!(result.text, "hola **mundo**");
        assert_eq!(&result.text[result.selection], "mundo");
    }

    #[test]
    fn test_italic_inserts_placeholder_for_empty_selection() {
        let result = apply_format("ab", 1..1, TextFormat::Italic);
        assert_eq!(result.text, "a*texto*b");
        assert_eq!(&result.text[result.selection], "texto");
    }

    #[test]
    fn test_bullets_expand_to_whole_lines_and_strip_markers() {
        let text = "intro\n1. uno\n* dos\n\nfin";
        let result = apply_format(text, 8..14, TextFormat::Bullets);
        assert_eq!(result.text, "intro\n- uno\n- dos\n\nfin");
        assert_eq!(&result.text[result.selection], "- uno\n- dos");
    }

    #[test]
    fn test_numbered_fills_blank_lines() {
        let result = apply_format("a\n\nc", 0..4, TextFormat::Numbered);
        assert_eq!(result.text, "1. a\n2. Elemento 2\n3. c");
    }

    #[test]
    fn test_list_on_empty_text_uses_placeholder() {
        let result = apply_format("", 0..0, TextFormat::Bullets);
        assert_eq!(result.text, "- Elemento de la lista");
        assert_eq!(result.selection, 0..result.text.len());
    }

    #[test]
    fn test_offsets_are_clamped_to_char_boundaries() {
        let result = apply_format("añb", 2..99, TextFormat::Bold);
        assert_eq!(result.text, "a**ñb**");
    }

    #[test]
    fn test_format_parses_from_toolbar_names() {
        assert_eq!("ol".parse::<TextFormat>().unwrap(), TextFormat::Numbered);
        assert!("underline".parse::<TextFormat>().is_err());
    }
}

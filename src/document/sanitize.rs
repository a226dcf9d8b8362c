//! Field sanitizers.
//!
//! The single point of truth for field validity. Applied both when a field is
//! edited and when loaded JSON is normalized. All functions are total: invalid
//! input maps to the "unset" value instead of an error.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^#([0-9a-f]{3}|[0-9a-f]{6})$").expect("valid hex color regex")
});

/// Inclusive numeric bounds for a sanitized field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

/// Text block font size in rem.
pub const FONT_SIZE: Range = Range { min: 0.6, max: 3.0 };
/// Text block line height multiplier.
pub const LINE_HEIGHT: Range = Range { min: 1.0, max: 3.0 };
/// Image width as a percentage of the block.
pub const IMAGE_WIDTH: Range = Range {
    min: 10.0,
    max: 100.0,
};

const ALIGNMENTS: [&str; 4] = ["left", "center", "right", "justify"];

/// Clamp a numeric string into `[min, max]`.
///
/// Empty or non-finite input yields `""` (unset). Whole results are formatted
/// without a decimal point; others are rounded to two places.
pub fn sanitize_number(value: &str, min: f64, max: f64) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let Ok(number) = trimmed.parse::<f64>() else {
        return String::new();
    };
    if !number.is_finite() {
        return String::new();
    }
    let clamped = number.clamp(min, max);
    if clamped.fract() == 0.0 {
        format!("{clamped:.0}")
    } else {
        let rounded = (clamped * 100.0).round() / 100.0;
        format!("{rounded}")
    }
}

/// [`sanitize_number`] against a named [`Range`].
pub fn sanitize_in(value: &str, range: Range) -> String {
    sanitize_number(value, range.min, range.max)
}

/// Accept only `#abc` or `#aabbcc` hex colors (case-insensitive).
pub fn sanitize_color(value: &str) -> String {
    let trimmed = value.trim();
    if HEX_COLOR.is_match(trimmed) {
        trimmed.to_string()
    } else {
        String::new()
    }
}

/// Accept only `left`, `center`, `right`, `justify`.
pub fn sanitize_align(value: &str) -> String {
    if ALIGNMENTS.contains(&value) {
        value.to_string()
    } else {
        String::new()
    }
}

/// Map a font choice value onto the fixed table, defaulting to `inherit`.
pub fn sanitize_font_choice(value: &str) -> FontChoice {
    FontChoice::ALL
        .into_iter()
        .find(|choice| choice.as_str() == value)
        .unwrap_or_default()
}

const FONT_FALLBACK: &str =
    r#"system-ui, -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif"#;

/// System font stack used when the theme has no webfont.
pub const fn system_font_stack() -> &'static str {
    FONT_FALLBACK
}

/// Per-block font choices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontChoice {
    #[default]
    Inherit,
    Inter,
    Lato,
    Merriweather,
    Montserrat,
    Serif,
    Mono,
}

impl FontChoice {
    pub const ALL: [Self; 7] = [
        Self::Inherit,
        Self::Inter,
        Self::Lato,
        Self::Merriweather,
        Self::Montserrat,
        Self::Serif,
        Self::Mono,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inherit => "inherit",
            Self::Inter => "inter",
            Self::Lato => "lato",
            Self::Merriweather => "merriweather",
            Self::Montserrat => "montserrat",
            Self::Serif => "serif",
            Self::Mono => "mono",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Inherit => "Heredar del tema",
            Self::Inter => "Inter (sans)",
            Self::Lato => "Lato (sans)",
            Self::Merriweather => "Merriweather (serif)",
            Self::Montserrat => "Montserrat (sans)",
            Self::Serif => "Serif clásica",
            Self::Mono => "Monoespaciada",
        }
    }

    /// CSS `font-family` value, `None` for `inherit`.
    pub fn css(self) -> Option<String> {
        match self {
            Self::Inherit => None,
            Self::Inter => Some(format!("'Inter', {FONT_FALLBACK}")),
            Self::Lato => Some(format!("'Lato', {FONT_FALLBACK}")),
            Self::Merriweather => {
                Some(r#"'Merriweather', Georgia, "Times New Roman", serif"#.to_string())
            }
            Self::Montserrat => Some(format!("'Montserrat', {FONT_FALLBACK}")),
            Self::Serif => Some("Georgia, 'Times New Roman', serif".to_string()),
            Self::Mono => Some("'Source Code Pro', 'Courier New', monospace".to_string()),
        }
    }

    /// Webfont family spec to load, if the choice needs one.
    pub const fn webfont(self) -> Option<&'static str> {
        match self {
            Self::Inter => Some("Inter:wght@400;600"),
            Self::Lato => Some("Lato:wght@400;700"),
            Self::Merriweather => Some("Merriweather:wght@400;700"),
            Self::Montserrat => Some("Montserrat:wght@400;600"),
            Self::Mono => Some("Source+Code+Pro:wght@400;600"),
            Self::Inherit | Self::Serif => None,
        }
    }
}

//! Theme side effects expressed as data.
//!
//! The page root carries a handful of CSS custom properties and a `data-mode`
//! attribute; webfonts are pulled in through stylesheet links. Nothing here
//! touches a page directly, surfaces apply the result.

use std::collections::BTreeSet;

use crate::document::{Block, BlockKind, FontChoice, ThemeConfig, ThemeMode, system_font_stack};

/// Base URL of the webfont stylesheet service.
pub const FONTS_BASE_URL: &str = "https://fonts.googleapis.com/css2?family=";

/// Element id of the single theme font link.
pub const THEME_FONT_LINK_ID: &str = "dynamic-font";

const SOFT_ALPHA: f64 = 0.12;
const SOFT_FALLBACK_RGB: (u8, u8, u8) = (31, 111, 235);

/// A stylesheet link the page should contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontLink {
    pub id: String,
    pub href: String,
}

/// Everything the theme contributes to the page root.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeVars {
    /// CSS custom properties in application order
    pub properties: Vec<(&'static str, String)>,
    /// Value of the root `data-mode` attribute
    pub mode: ThemeMode,
    /// Theme webfont link, absent for the system font
    pub font_link: Option<FontLink>,
}

impl ThemeVars {
    /// The properties as an inline `style` declaration list.
    pub fn style_declarations(&self) -> String {
        self.properties
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Stylesheet URL for a webfont family spec such as `Inter:wght@400;600`.
pub fn font_stylesheet_url(family: &str) -> String {
    format!("{FONTS_BASE_URL}{family}&display=swap")
}

/// Whether the theme font names a webfont.
fn uses_webfont(font: &str) -> bool {
    let font = font.trim();
    !font.is_empty() && font != "system"
}

/// Compute the root properties, mode and font link for `theme`.
pub fn theme_vars(theme: &ThemeConfig) -> ThemeVars {
    let font = if uses_webfont(&theme.font) {
        let family = theme.font.split(':').next().unwrap_or_default();
        format!("'{family}', {}", system_font_stack())
    } else {
        system_font_stack().to_string()
    };

    let properties = vec![
        ("--color", theme.color.clone()),
        ("--color-soft", soft_color(&theme.color, SOFT_ALPHA)),
        ("--accent", theme.accent.clone()),
        ("--fs", format!("{}rem", theme.scale)),
        ("--font", font),
    ];

    let font_link = uses_webfont(&theme.font).then(|| FontLink {
        id: THEME_FONT_LINK_ID.to_string(),
        href: font_stylesheet_url(theme.font.trim()),
    });

    ThemeVars {
        properties,
        mode: theme.mode,
        font_link,
    }
}

/// `rgba(...)` of a hex color with `alpha`, or of the default primary color
/// when `color` is not hex.
pub fn soft_color(color: &str, alpha: f64) -> String {
    let (r, g, b) = hex_to_rgb(color).unwrap_or(SOFT_FALLBACK_RGB);
    format!("rgba({r}, {g}, {b}, {alpha})")
}

/// Parse `#abc` or `#aabbcc` into channels.
pub fn hex_to_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |digits: &str| u8::from_str_radix(digits, 16).ok();
    match hex.len() {
        3 => {
            let expanded: Vec<String> = hex.chars().map(|c| format!("{c}{c}")).collect();
            Some((
                channel(&expanded[0])?,
                channel(&expanded[1])?,
                channel(&expanded[2])?,
            ))
        }
        6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        _ => None,
    }
}

/// Link for a per-block font choice, if it needs a webfont.
pub fn block_font_link(choice: FontChoice) -> Option<FontLink> {
    choice.webfont().map(|family| FontLink {
        id: format!("block-font-{}", choice.as_str()),
        href: font_stylesheet_url(family),
    })
}

/// One link per distinct webfont used by a text block, in font table order.
pub fn block_font_links(blocks: &[Block]) -> Vec<FontLink> {
    let choices: BTreeSet<FontChoice> = blocks
        .iter()
        .filter_map(|block| match &block.kind {
            BlockKind::Text(text) => Some(text.font_choice),
            _ => None,
        })
        .collect();
    choices.into_iter().filter_map(block_font_link).collect()
}

//! The embedded default document.

use serde_json::{Map, Value};

use super::normalize::normalize_document;
use super::types::{Document, Section, SiteMeta, ThemeConfig};

const SEED_JSON: &str = include_str!("seed.json");

/// Title used when the site has none.
pub const DEFAULT_TITLE: &str = "Micrositio educativo";

/// Minimal document the seed is normalized over.
fn fallback() -> Document {
    Document {
        site: SiteMeta {
            title: DEFAULT_TITLE.to_string(),
            ..SiteMeta::default()
        },
        theme: ThemeConfig::default(),
        sections: vec![Section::numbered(0)],
        extra: Map::new(),
    }
}

/// The seed document compiled into the binary.
pub fn seed() -> Document {
    let raw = serde_json::from_str(SEED_JSON).unwrap_or_else(|err| {
        tracing::warn!("embedded seed is not valid JSON: {err}");
        Value::Null
    });
    normalize_document(&raw, &fallback())
}

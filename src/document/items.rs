//! Pipe-delimited text encoding for gallery and link lists.
//!
//! One item per line: `src|alt|caption` for galleries, `label|url` for links.
//! A literal `|` inside a field is read as a delimiter; there is no escaping.

use super::types::{GalleryItem, LinkItem};

/// Split `value` into trimmed, non-blank lines of trimmed `|` fields.
fn split_rows(value: &str) -> impl Iterator<Item = Vec<&str>> {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.split('|').map(str::trim).collect())
}

fn field<'a>(parts: &[&'a str], index: usize) -> &'a str {
    parts.get(index).copied().unwrap_or_default()
}

pub fn parse_gallery(value: &str) -> Vec<GalleryItem> {
    split_rows(value)
        .map(|parts| GalleryItem {
            src: field(&parts, 0).to_string(),
            alt: field(&parts, 1).to_string(),
            caption: field(&parts, 2).to_string(),
        })
        .collect()
}

pub fn serialize_gallery(items: &[GalleryItem]) -> String {
    items
        .iter()
        .map(|item| format!("{}|{}|{}", item.src, item.alt, item.caption))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn parse_links(value: &str) -> Vec<LinkItem> {
    split_rows(value)
        .map(|parts| LinkItem {
            label: field(&parts, 0).to_string(),
            url: field(&parts, 1).to_string(),
        })
        .collect()
}

pub fn serialize_links(items: &[LinkItem]) -> String {
    items
        .iter()
        .map(|item| format!("{}|{}", item.label, item.url))
        .collect::<Vec<_>>()
        .join("\n")
}

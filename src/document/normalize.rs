//! Coercion of arbitrary JSON into a fully defaulted document.
//!
//! Normalization never fails. Missing or malformed fields take their variant
//! defaults, unknown block types degrade to text, and every block leaves with
//! an id. Running a normalized block through again yields the same block.

use serde_json::{Map, Value};

use super::sanitize::{
    IMAGE_WIDTH, FONT_SIZE, LINE_HEIGHT, sanitize_align, sanitize_color, sanitize_font_choice,
    sanitize_in,
};
use super::types::{
    Block, BlockKind, BlockType, CalloutBlock, Document, GalleryBlock, GalleryItem, ImageBlock,
    Layout, LinkItem, LinksBlock, MediaBlock, MediaSource, QuoteBlock, Section, SiteMeta,
    SourceMode, TextBlock, ThemeConfig, ThemeMode, YoutubeBlock,
};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 6;

/// Generate a fresh block id such as `b-k3x9q0`.
pub fn create_id() -> String {
    let suffix: String = (0..ID_LEN)
        .map(|_| char::from(ID_ALPHABET[fastrand::usize(..ID_ALPHABET.len())]))
        .collect();
    format!("b-{suffix}")
}

/// A default-valued block of `block_type` with a fresh id.
pub fn new_block(block_type: BlockType) -> Block {
    Block::new(create_id(), BlockKind::empty(block_type))
}

/// Read a field as text: strings verbatim, numbers in JSON notation, anything
/// else as empty.
fn text(map: &Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Normalize one block.
///
/// Non-objects become an empty text block with a fresh id.
pub fn normalize_block(raw: &Value) -> Block {
    let Value::Object(map) = raw else {
        return new_block(BlockType::Text);
    };

    let id = match text(map, "id") {
        id if id.is_empty() => create_id(),
        id => id,
    };
    let block_type = text(map, "type").parse().unwrap_or(BlockType::Text);

    let kind = match block_type {
        BlockType::Text => BlockKind::Text(normalize_text(map)),
        BlockType::Image => BlockKind::Image(ImageBlock {
            source: normalize_source(map),
            alt: text(map, "alt"),
            caption: text(map, "caption"),
            width: sanitize_in(&text(map, "width"), IMAGE_WIDTH),
        }),
        BlockType::Audio => BlockKind::Audio(normalize_media(map)),
        BlockType::Pdf => BlockKind::Pdf(normalize_media(map)),
        BlockType::Youtube => BlockKind::Youtube(YoutubeBlock {
            url: text(map, "url"),
            caption: text(map, "caption"),
        }),
        BlockType::Quote => BlockKind::Quote(QuoteBlock {
            text: text(map, "text"),
            cite: text(map, "cite"),
        }),
        BlockType::Callout => BlockKind::Callout(CalloutBlock {
            text: text(map, "text"),
        }),
        BlockType::Gallery => BlockKind::Gallery(GalleryBlock {
            items: objects(map, "items")
                .map(|item| GalleryItem {
                    src: text(item, "src"),
                    alt: text(item, "alt"),
                    caption: text(item, "caption"),
                })
                .collect(),
        }),
        BlockType::Links => BlockKind::Links(LinksBlock {
            items: objects(map, "items")
                .map(|item| LinkItem {
                    label: text(item, "label"),
                    url: text(item, "url"),
                })
                .collect(),
        }),
    };

    let known = block_type.fields();
    let extra = map
        .iter()
        .filter(|(key, _)| key.as_str() != "id" && key.as_str() != "type")
        .filter(|(key, _)| !known.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Block { id, kind, extra }
}

fn normalize_text(map: &Map<String, Value>) -> TextBlock {
    TextBlock {
        markdown: text(map, "markdown"),
        font_choice: sanitize_font_choice(&text(map, "fontChoice")),
        font_size: sanitize_in(&text(map, "fontSize"), FONT_SIZE),
        line_height: sanitize_in(&text(map, "lineHeight"), LINE_HEIGHT),
        text_color: sanitize_color(&text(map, "textColor")),
        align: sanitize_align(&text(map, "align")),
    }
}

fn normalize_source(map: &Map<String, Value>) -> MediaSource {
    let src = text(map, "src");
    let source_mode = SourceMode::parse(&text(map, "sourceMode")).unwrap_or(
        if src.starts_with("data:") {
            SourceMode::Local
        } else {
            SourceMode::Repo
        },
    );
    let repo_path = match text(map, "repoPath") {
        path if path.is_empty() && source_mode == SourceMode::Repo => src.clone(),
        path => path,
    };
    MediaSource {
        src,
        source_mode,
        source_name: text(map, "sourceName"),
        repo_path,
    }
}

fn normalize_media(map: &Map<String, Value>) -> MediaBlock {
    MediaBlock {
        source: normalize_source(map),
        caption: text(map, "caption"),
    }
}

/// Items of an array field as objects; non-object entries read as empty.
fn objects<'a>(
    map: &'a Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = &'a Map<String, Value>> {
    static EMPTY: std::sync::LazyLock<Map<String, Value>> = std::sync::LazyLock::new(Map::new);
    map.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|item| item.as_object().unwrap_or(&EMPTY))
}

/// Overlay `raw` onto `seed`.
///
/// Top-level fields in `raw` win when present. A non-empty `sections` array
/// replaces the seed's sections wholesale; otherwise the seed's are kept.
pub fn normalize_document(raw: &Value, seed: &Document) -> Document {
    let empty = Map::new();
    let map = raw.as_object().unwrap_or(&empty);

    let site = match map.get("site") {
        Some(Value::Object(site)) => normalize_site(site, &seed.site),
        _ => seed.site.clone(),
    };
    let theme = match map.get("theme") {
        Some(Value::Object(theme)) => normalize_theme(theme, &seed.theme),
        _ => seed.theme.clone(),
    };

    let mut sections = match map.get("sections") {
        Some(Value::Array(raw_sections)) if !raw_sections.is_empty() => raw_sections
            .iter()
            .enumerate()
            .map(|(index, section)| normalize_section(index, section, seed))
            .collect(),
        _ => seed.sections.clone(),
    };
    if sections.is_empty() {
        sections.push(Section::numbered(0));
    }

    let mut extra = seed.extra.clone();
    for (key, value) in map {
        if !matches!(key.as_str(), "site" | "theme" | "sections") {
            extra.insert(key.clone(), value.clone());
        }
    }

    Document {
        site,
        theme,
        sections,
        extra,
    }
}

fn normalize_site(raw: &Map<String, Value>, base: &SiteMeta) -> SiteMeta {
    let pick = |key: &str, fallback: &String| {
        if raw.contains_key(key) {
            text(raw, key)
        } else {
            fallback.clone()
        }
    };
    SiteMeta {
        title: pick("title", &base.title),
        subtitle: pick("subtitle", &base.subtitle),
        description: pick("description", &base.description),
    }
}

fn normalize_theme(raw: &Map<String, Value>, base: &ThemeConfig) -> ThemeConfig {
    let pick = |key: &str, fallback: &String| {
        if raw.contains_key(key) {
            text(raw, key)
        } else {
            fallback.clone()
        }
    };
    ThemeConfig {
        mode: ThemeMode::parse(&text(raw, "mode")).unwrap_or(base.mode),
        color: pick("color", &base.color),
        accent: pick("accent", &base.accent),
        scale: parse_scale(&text(raw, "scale")).unwrap_or(base.scale),
        font: pick("font", &base.font),
        layout: Layout::parse(&text(raw, "layout")).unwrap_or(base.layout),
    }
}

/// A positive, finite scale factor.
pub(crate) fn parse_scale(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|scale| scale.is_finite() && *scale > 0.0)
}

fn normalize_section(index: usize, raw: &Value, seed: &Document) -> Section {
    let empty = Map::new();
    let map = raw.as_object().unwrap_or(&empty);
    let title = match text(map, "title") {
        title if !title.is_empty() => title,
        _ => seed
            .sections
            .get(index)
            .map(|section| section.title.clone())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| Section::numbered(index).title),
    };
    let blocks = map
        .get("blocks")
        .and_then(Value::as_array)
        .map(|blocks| blocks.iter().map(normalize_block).collect())
        .unwrap_or_default();
    Section { title, blocks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn renormalize(block: &Block) -> Block {
        normalize_block(&serde_json::to_value(block).unwrap())
    }

    #[test]
    fn test_unknown_type_degrades_to_text_with_fresh_id() {
        let block = normalize_block(&json!({"type": "mystery", "foo": 1}));
        assert_eq!(block.block_type(), BlockType::Text);
        let BlockKind::Text(text) = &block.kind else {
            panic!("expected text block");
        };
        assert_eq!(text.markdown, "");
        assert!(block.id.starts_with("b-"));
        assert_eq!(block.id.len(), 2 + ID_LEN);
        assert_eq!(block.extra.get("foo"), Some(&json!(1)));
    }

    #[test]
    fn test_non_object_becomes_empty_text_block() {
        for raw in [json!(null), json!(3), json!("text"), json!([1, 2])] {
            let block = normalize_block(&raw);
            assert_eq!(block.block_type(), BlockType::Text);
        }
    }

    #[test]
    fn test_missing_type_defaults_to_text_and_keeps_id() {
        let block = normalize_block(&json!({"id": "keep", "markdown": "hola"}));
        assert_eq!(block.id, "keep");
        let BlockKind::Text(text) = &block.kind else {
            panic!("expected text block");
        };
        assert_eq!(text.markdown, "hola");
    }

    #[test]
    fn test_text_style_fields_are_sanitized() {
        let block = normalize_block(&json!({
            "type": "text",
            "fontChoice": "papyrus",
            "fontSize": 9,
            "lineHeight": "1.5",
            "textColor": "blue",
            "align": "center"
        }));
        let BlockKind::Text(text) = &block.kind else {
            panic!("expected text block");
        };
        assert_eq!(text.font_choice.as_str(), "inherit");
        assert_eq!(text.font_size, "3");
        assert_eq!(text.line_height, "1.5");
        assert_eq!(text.text_color, "");
        assert_eq!(text.align, "center");
    }

    #[test]
    fn test_media_source_mode_is_inferred_from_data_url() {
        let local = normalize_block(&json!({"type": "audio", "src": "data:audio/mpeg;base64,AAAA"}));
        let source = local.media_source().unwrap();
        assert_eq!(source.source_mode, SourceMode::Local);
        assert_eq!(source.repo_path, "");

        let repo = normalize_block(&json!({"type": "pdf", "src": "assets/pdfs/a.pdf"}));
        let source = repo.media_source().unwrap();
        assert_eq!(source.source_mode, SourceMode::Repo);
        assert_eq!(source.repo_path, "assets/pdfs/a.pdf");
    }

    #[test]
    fn test_image_width_is_clamped() {
        let block = normalize_block(&json!({"type": "image", "src": "a.png", "width": "5"}));
        let BlockKind::Image(image) = &block.kind else {
            panic!("expected image block");
        };
        assert_eq!(image.width, "10");
    }

    #[test]
    fn test_gallery_items_default_missing_fields() {
        let block = normalize_block(&json!({
            "type": "gallery",
            "items": [{"src": "a.png"}, null, {"alt": "b", "caption": 7}]
        }));
        let BlockKind::Gallery(gallery) = &block.kind else {
            panic!("expected gallery block");
        };
        assert_eq!(gallery.items.len(), 3);
        assert_eq!(gallery.items[0].src, "a.png");
        assert_eq!(gallery.items[1], GalleryItem::default());
        assert_eq!(gallery.items[2].caption, "7");
    }

    #[test]
    fn test_links_non_array_items_become_empty() {
        let block = normalize_block(&json!({"type": "links", "items": "nope"}));
        let BlockKind::Links(links) = &block.kind else {
            panic!("expected links block");
        };
        assert!(links.items.is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent_for_every_type() {
        for ty in BlockType::ALL {
            let raw = json!({"type": ty.as_str(), "src": "x.png", "width": "55.555", "extra": true});
            let once = normalize_block(&raw);
            assert_eq!(renormalize(&once), once, "type {ty}");
        }
    }

    fn seed() -> Document {
        Document {
            site: SiteMeta {
                title: "Seed".to_string(),
                subtitle: "Sub".to_string(),
                description: String::new(),
            },
            theme: ThemeConfig::default(),
            sections: vec![Section {
                title: "Inicio".to_string(),
                blocks: vec![new_block(BlockType::Text)],
            }],
            extra: Map::new(),
        }
    }

    #[test]
    fn test_document_fields_override_seed_only_when_present() {
        let seed = seed();
        let doc = normalize_document(
            &json!({"site": {"title": "Mine"}, "theme": {"mode": "dark", "scale": "1.25"}}),
            &seed,
        );
        assert_eq!(doc.site.title, "Mine");
        assert_eq!(doc.site.subtitle, "Sub");
        assert_eq!(doc.theme.mode, ThemeMode::Dark);
        assert!((doc.theme.scale - 1.25).abs() < f64::EPSILON);
        assert_eq!(doc.theme.color, seed.theme.color);
        assert_eq!(doc.sections, seed.sections);
    }

    #[test]
    fn test_empty_sections_fall_back_to_seed() {
        let seed = seed();
        let doc = normalize_document(&json!({"sections": []}), &seed);
        assert_eq!(doc.sections, seed.sections);
    }

    #[test]
    fn test_sections_replace_seed_and_fill_titles() {
        let seed = seed();
        let doc = normalize_document(
            &json!({"sections": [{"blocks": [{"type": "quote", "text": "q"}]}, {"title": "Dos"}, 5]}),
            &seed,
        );
        assert_eq!(doc.sections.len(), 3);
        assert_eq!(doc.sections[0].title, "Inicio");
        assert_eq!(doc.sections[0].blocks[0].block_type(), BlockType::Quote);
        assert_eq!(doc.sections[1].title, "Dos");
        assert!(doc.sections[1].blocks.is_empty());
        assert_eq!(doc.sections[2].title, "Sección 3");
    }

    #[test]
    fn test_invalid_theme_values_keep_seed() {
        let seed = seed();
        let doc = normalize_document(
            &json!({"theme": {"mode": "neon", "scale": -2, "layout": "wide"}}),
            &seed,
        );
        assert_eq!(doc.theme.mode, seed.theme.mode);
        assert!((doc.theme.scale - seed.theme.scale).abs() < f64::EPSILON);
        assert_eq!(doc.theme.layout, seed.theme.layout);
    }

    #[test]
    fn test_non_object_document_is_seed() {
        let seed = seed();
        assert_eq!(normalize_document(&json!([1, 2, 3]), &seed), seed);
    }

    #[test]
    fn test_unknown_top_level_fields_are_preserved() {
        let doc = normalize_document(&json!({"version": 2}), &seed());
        assert_eq!(doc.extra.get("version"), Some(&json!(2)));
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["version"], json!(2));
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            "[a-z0-9#. ]{0,8}".prop_map(Value::String),
        ];
        let key = prop_oneof![
            Just("id".to_string()),
            Just("type".to_string()),
            Just("markdown".to_string()),
            Just("src".to_string()),
            Just("width".to_string()),
            Just("fontSize".to_string()),
            Just("sourceMode".to_string()),
            Just("items".to_string()),
            "[a-z]{1,6}",
        ];
        let ty = prop_oneof![
            Just(Value::String("text".to_string())),
            Just(Value::String("image".to_string())),
            Just(Value::String("audio".to_string())),
            Just(Value::String("gallery".to_string())),
            Just(Value::String("links".to_string())),
            Just(Value::String("mystery".to_string())),
        ];
        (proptest::collection::btree_map(key, leaf, 0..8), ty).prop_map(|(fields, ty)| {
            let mut map: Map<String, Value> = fields.into_iter().collect();
            map.insert("type".to_string(), ty);
            Value::Object(map)
        })
    }

    proptest! {
        #[test]
        fn prop_normalize_block_is_idempotent(raw in arb_json()) {
            let once = normalize_block(&raw);
            prop_assert_eq!(renormalize(&once), once);
        }
    }
}

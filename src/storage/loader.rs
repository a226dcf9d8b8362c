use serde_json::Value;
use url::Url;

use crate::Result;
use crate::document::{Document, normalize_document};

use super::Storage;

/// Fetches the published document text.
pub trait RemoteSource {
    fn fetch(&self) -> Result<String>;

    /// Where the text comes from, for logs.
    fn describe(&self) -> String;
}

/// Which tier produced the loaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentOrigin {
    Cache,
    Remote,
    Seed,
}

impl ContentOrigin {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Remote => "remote",
            Self::Seed => "seed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Loaded {
    pub document: Document,
    pub origin: ContentOrigin,
}

/// Whether a site served from `origin` should try the remote tier.
///
/// No origin, or a `file:` origin, means the page runs from a local file.
pub fn remote_tier_enabled(origin: Option<&Url>) -> bool {
    origin.is_some_and(|url| url.scheme() != "file")
}

/// Tiered content loading: local cache, then remote, then the seed.
///
/// Every tier falls through on absence or failure; loading never fails.
pub struct ContentLoader<'a> {
    storage: &'a dyn Storage,
    storage_key: &'a str,
    remote: Option<&'a dyn RemoteSource>,
}

impl<'a> ContentLoader<'a> {
    pub fn new(storage: &'a dyn Storage, storage_key: &'a str) -> Self {
        Self {
            storage,
            storage_key,
            remote: None,
        }
    }

    pub fn with_remote(mut self, remote: Option<&'a dyn RemoteSource>) -> Self {
        self.remote = remote;
        self
    }

    pub fn load(&self, seed: &Document) -> Loaded {
        let _scope = crate::perf::scope("storage.load").with("key", self.storage_key);
        if let Some(document) = self.from_cache(seed) {
            return self.loaded(document, ContentOrigin::Cache);
        }
        if let Some(document) = self.remote.and_then(|remote| from_remote(remote, seed)) {
            return self.loaded(document, ContentOrigin::Remote);
        }
        self.loaded(seed.clone(), ContentOrigin::Seed)
    }

    fn loaded(&self, document: Document, origin: ContentOrigin) -> Loaded {
        crate::perf::log_event(
            "storage.load",
            format!(
                "origin={} key={} blocks={}",
                origin.as_str(),
                self.storage_key,
                document.blocks().len()
            ),
        );
        Loaded { document, origin }
    }

    fn from_cache(&self, seed: &Document) -> Option<Document> {
        let text = match self.storage.get(self.storage_key) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!("local cache unavailable: {err}");
                return None;
            }
        };
        match parse_present(&text) {
            Ok(Some(raw)) => Some(normalize_document(&raw, seed)),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!("ignoring corrupt local cache: {err}");
                None
            }
        }
    }
}

fn from_remote(remote: &dyn RemoteSource, seed: &Document) -> Option<Document> {
    let parsed = remote.fetch().and_then(|text| parse_present(&text));
    match parsed {
        Ok(Some(raw)) => Some(normalize_document(&raw, seed)),
        Ok(None) => {
            tracing::warn!("remote content at {} is empty", remote.describe());
            None
        }
        Err(err) => {
            tracing::warn!("remote content at {} unavailable: {err}", remote.describe());
            None
        }
    }
}

/// Parse stored text; `null`, `false`, `0` and `""` count as absent.
fn parse_present(text: &str) -> Result<Option<Value>> {
    let raw: Value = serde_json::from_str(text)?;
    Ok((!is_falsy(&raw)).then_some(raw))
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64().is_none_or(|n| n == 0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

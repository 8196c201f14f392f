//! Display metadata recovered from an external cache file.
//!
//! The cache is keyed by whatever identifier the upstream tool chose, which is not
//! necessarily the image's filename. Resolution therefore tries, in order:
//!
//! 1. an entry keyed exactly by the filename stem,
//! 2. an entry whose `name` (or its own key when unnamed) equals the stem,
//! 3. an entry whose `src`/`url` basename, minus extension, equals the stem.
//!
//! Scans run in the cache file's own order and stop at the first hit.

use std::path::Path;

use serde_json::{Map, Value};

/// One record of the external cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheEntry {
    pub name: Option<String>,
    pub src: Option<String>,
    pub url: Option<String>,
}

impl CacheEntry {
    fn from_value(value: &Value) -> Self {
        let field = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        Self {
            name: field("name"),
            src: field("src"),
            url: field("url"),
        }
    }

    /// `src`, else `url`.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.src.as_deref().or(self.url.as_deref())
    }
}

/// Immutable, ordered snapshot of the cache file.
#[derive(Debug, Clone, Default)]
pub struct MetadataCache {
    entries: Vec<(String, CacheEntry)>,
}

impl MetadataCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a cache file. Missing or malformed files yield an empty cache.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "metadata cache unavailable, continuing without it");
                return Self::new();
            }
        };

        match Self::from_json_str(&data) {
            Ok(cache) => {
                tracing::info!(path = %path.display(), entries = cache.len(), "loaded metadata cache");
                cache
            }
            Err(reason) => {
                tracing::warn!(path = %path.display(), %reason, "could not parse metadata cache, continuing without it");
                Self::new()
            }
        }
    }

    /// Parse cache JSON. The top level must be an object.
    pub fn from_json_str(data: &str) -> Result<Self, String> {
        let value: Value = serde_json::from_str(data).map_err(|e| e.to_string())?;
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(format!("expected a JSON object, found {}", json_kind(&other))),
        }
    }

    fn from_map(map: Map<String, Value>) -> Self {
        let entries = map
            .iter()
            .map(|(key, value)| (key.clone(), CacheEntry::from_value(value)))
            .collect();
        Self { entries }
    }

    /// Build a cache from entries in the given order.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, CacheEntry)>,
        K: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CacheEntry)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Display name and source resolved for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMetadata {
    pub name: String,
    pub src: String,
}

/// Resolve the display name and source for `key`.
#[must_use]
pub fn resolve(key: &str, cache: &MetadataCache) -> ResolvedMetadata {
    let entry = cache
        .get(key)
        .or_else(|| {
            cache
                .iter()
                .find(|&(k, v)| v.name.as_deref().unwrap_or(k) == key)
                .map(|(_, v)| v)
        })
        .or_else(|| {
            cache
                .iter()
                .find(|&(_, v)| v.source().is_some_and(|src| source_stem(src) == key))
                .map(|(_, v)| v)
        });

    match entry {
        Some(entry) => ResolvedMetadata {
            name: entry.name.clone().unwrap_or_else(|| key.to_string()),
            src: entry.source().unwrap_or_default().to_string(),
        },
        None => ResolvedMetadata {
            name: key.to_string(),
            src: String::new(),
        },
    }
}

/// Basename of a path or URL with its final extension removed.
///
/// A leading dot does not start an extension (`.hidden` stays `.hidden`).
#[must_use]
pub fn source_stem(src: &str) -> &str {
    let base = src.rsplit(['/', '\\']).next().unwrap_or(src);
    let dots = base.len() - base.trim_start_matches('.').len();
    match base[dots..].rfind('.') {
        Some(idx) => &base[..dots + idx],
        None => base,
    }
}

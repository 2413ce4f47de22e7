//! Element -> class mapping for rendered markdown.
//!
//! A static JSON file maps element tags to class strings:
//!
//! ```json
//! {
//!   "h1": "text-3xl font-bold",
//!   "p": "my-2",
//!   "a": "underline text-blue-700"
//! }
//! ```
//!
//! Loaded once at startup, read-only afterwards.

use std::path::Path;

use anyhow::{Context, Result, bail};
use rustc_hash::FxHashMap;

/// Tag -> class-string mapping applied while rendering markdown.
#[derive(Debug, Clone, Default)]
pub struct ClassMap {
    map: FxHashMap<String, String>,
}

impl ClassMap {
    /// An empty mapping (no classes injected).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the mapping from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read class map {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("invalid class map {}", path.display()))
    }

    /// Parse the mapping from a JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        let value: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)?;

        let mut map = FxHashMap::default();
        for (tag, classes) in value {
            let Some(classes) = classes.as_str() else {
                bail!("class map entry `{tag}` must be a string");
            };
            map.insert(tag, classes.to_string());
        }
        Ok(Self { map })
    }

    /// Classes for a tag, if mapped.
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.map.get(tag).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let map = ClassMap::from_json(r#"{"h1": "title", "p": "body-text"}"#).unwrap();
        assert_eq!(map.get("h1"), Some("title"));
        assert_eq!(map.get("p"), Some("body-text"));
        assert_eq!(map.get("div"), None);
    }

    #[test]
    fn test_non_string_value_rejected() {
        assert!(ClassMap::from_json(r#"{"h1": 42}"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes.json");
        std::fs::write(&path, r#"{"a": "underline"}"#).unwrap();

        let map = ClassMap::load(&path).unwrap();
        assert_eq!(map.get("a"), Some("underline"));
    }

    #[test]
    fn test_empty() {
        assert!(ClassMap::empty().is_empty());
    }
}

//! Frontmatter metadata extraction from YAML (`---`) or TOML (`+++`) blocks.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Page metadata from frontmatter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageMeta {
    pub title: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub draft: bool,
    pub tags: Vec<String>,
    /// Custom fields, preserved as JSON values.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Extract frontmatter and return `(meta, body)`. Returns the whole input
/// as body when no frontmatter is present.
pub fn extract_frontmatter(content: &str) -> Result<(PageMeta, &str)> {
    match detect_frontmatter(content) {
        Some((fm, body, is_toml)) => {
            let meta = if is_toml {
                parse_toml(fm)?
            } else {
                parse_yaml_like(fm)
            };
            Ok((meta, body))
        }
        None => Ok((PageMeta::default(), content)),
    }
}

/// Detect and extract a frontmatter block.
/// Returns `(frontmatter, body, is_toml)` if found.
fn detect_frontmatter(content: &str) -> Option<(&str, &str, bool)> {
    let trimmed = content.trim_start();

    // YAML: ---...---
    if trimmed.starts_with("---")
        && let Some(end) = trimmed[3..].find("\n---")
    {
        let fm = trimmed[3..3 + end].trim();
        let body = trimmed[3 + end + 4..].trim_start_matches('\n');
        return Some((fm, body, false));
    }

    // TOML: +++...+++
    if trimmed.starts_with("+++")
        && let Some(end) = trimmed[3..].find("\n+++")
    {
        let fm = trimmed[3..3 + end].trim();
        let body = trimmed[3 + end + 4..].trim_start_matches('\n');
        return Some((fm, body, true));
    }

    None
}

/// Parse TOML frontmatter.
fn parse_toml(content: &str) -> Result<PageMeta> {
    toml::from_str(content).map_err(|e| anyhow::anyhow!("invalid TOML frontmatter: {e}"))
}

/// Parse simple YAML-like frontmatter (key: value).
///
/// Supports standard fields (title, date, etc.) and custom fields in `extra`.
fn parse_yaml_like(content: &str) -> PageMeta {
    let mut meta = PageMeta::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once(':') {
            let key_lower = key.trim().to_lowercase();
            let value = value.trim();

            match key_lower.as_str() {
                "title" => meta.title = Some(value.to_string()),
                "date" => meta.date = Some(value.to_string()),
                "author" => meta.author = Some(value.to_string()),
                "summary" => meta.summary = Some(value.to_string()),
                "draft" => meta.draft = value.eq_ignore_ascii_case("true"),
                "tags" => {
                    meta.tags = value
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect();
                }
                _ => {
                    // Custom field -> extra (preserve original key case)
                    let key = key.trim().to_string();
                    meta.extra.insert(key, parse_yaml_value(value));
                }
            }
        }
    }

    meta
}

/// Parse a YAML-like value string to a JSON value.
///
/// Supports booleans, numbers, comma-separated arrays, and plain strings.
fn parse_yaml_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(n) = s.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(n) = s.parse::<f64>()
        && let Some(num) = serde_json::Number::from_f64(n)
    {
        return Value::Number(num);
    }
    if s.contains(',') {
        let arr: Vec<Value> = s
            .split(',')
            .map(|item| item.trim())
            .filter(|item| !item.is_empty())
            .map(|item| Value::String(item.to_string()))
            .collect();
        return Value::Array(arr);
    }
    Value::String(s.to_string())
}

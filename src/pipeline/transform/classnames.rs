//! Build-wide CSS class-name mangling.
//!
//! The map is seeded once from the emitted stylesheet (selectors in order of
//! first appearance) and then applied to both the stylesheet and every HTML
//! document, so markup and styles stay consistent. Class names that never
//! appear in the stylesheet are left untouched.

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};

/// Class selector token, including CSS-escaped characters (`.md\:rounded`).
/// The first character must not be a digit, which keeps decimal values
/// (`0.5s`) out.
static CLASS_SELECTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.((?:\\.|[A-Za-z_-])(?:\\.|[A-Za-z0-9_-])*)").unwrap());

/// Spans that must never be scanned or rewritten: `url(...)` and string
/// literals (a `.png` inside a url is not a selector).
static PROTECTED_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"url\([^)]*\)|"[^"]*"|'[^']*'"#).unwrap());

/// `class` attribute with a quoted value.
static CLASS_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"class\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());

/// Deterministic class-name shortening map.
#[derive(Debug, Default)]
pub struct ClassNameMap {
    map: FxHashMap<String, String>,
}

impl ClassNameMap {
    /// Build the map from a stylesheet: class selectors get short names in
    /// order of first appearance. Generated names never collide with names
    /// already present in the stylesheet.
    pub fn from_css(css: &str) -> Self {
        let mut ordered = Vec::new();
        let mut seen = FxHashSet::default();
        for (protected, chunk) in split_protected(css) {
            if protected {
                continue;
            }
            for capture in CLASS_SELECTOR.captures_iter(chunk) {
                let name = unescape(&capture[1]);
                if seen.insert(name.clone()) {
                    ordered.push(name);
                }
            }
        }

        let mut map = FxHashMap::default();
        let mut next = 0usize;
        for name in ordered {
            let short = loop {
                let candidate = short_name(next);
                next += 1;
                if !seen.contains(&candidate) {
                    break candidate;
                }
            };
            map.insert(name, short);
        }

        Self { map }
    }

    /// Shortened name for a class, if the stylesheet defines it.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Rewrite class selectors in a stylesheet.
    pub fn rewrite_css(&self, css: &str) -> String {
        let mut out = String::with_capacity(css.len());
        for (protected, chunk) in split_protected(css) {
            if protected {
                out.push_str(chunk);
                continue;
            }
            out.push_str(&CLASS_SELECTOR.replace_all(chunk, |caps: &regex::Captures| {
                let name = unescape(&caps[1]);
                match self.get(&name) {
                    Some(short) => format!(".{short}"),
                    None => caps[0].to_string(),
                }
            }));
        }
        out
    }

    /// Rewrite `class` attribute values in an HTML document. Tokens absent
    /// from the map are preserved.
    pub fn rewrite_html(&self, html: &str) -> String {
        CLASS_ATTR
            .replace_all(html, |caps: &regex::Captures| {
                let value = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                let rewritten = value
                    .split_whitespace()
                    .map(|token| self.get(token).unwrap_or(token))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("class=\"{rewritten}\"")
            })
            .into_owned()
    }
}

/// Split a stylesheet into `(is_protected, chunk)` pieces.
fn split_protected(css: &str) -> Vec<(bool, &str)> {
    let mut parts = Vec::new();
    let mut last = 0;
    for span in PROTECTED_SPAN.find_iter(css) {
        if span.start() > last {
            parts.push((false, &css[last..span.start()]));
        }
        parts.push((true, span.as_str()));
        last = span.end();
    }
    if last < css.len() {
        parts.push((false, &css[last..]));
    }
    parts
}

/// Strip CSS escape backslashes: `md\:rounded` -> `md:rounded`.
fn unescape(name: &str) -> String {
    name.replace('\\', "")
}

/// Bijective base-26 short name: a, b, ..., z, aa, ab, ...
fn short_name(mut i: usize) -> String {
    let mut chars = Vec::new();
    loop {
        chars.push((b'a' + (i % 26) as u8) as char);
        i /= 26;
        if i == 0 {
            break;
        }
        i -= 1;
    }
    chars.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name_sequence() {
        assert_eq!(short_name(0), "a");
        assert_eq!(short_name(25), "z");
        assert_eq!(short_name(26), "aa");
        assert_eq!(short_name(27), "ab");
    }

    #[test]
    fn test_from_css_first_appearance_order() {
        let map =
            ClassNameMap::from_css(".post-list { margin: 0 } .hero, .post-list { color: red }");
        assert_eq!(map.get("post-list"), Some("a"));
        assert_eq!(map.get("hero"), Some("b"));
        assert_eq!(map.get("unknown"), None);
    }

    #[test]
    fn test_generated_names_avoid_existing() {
        let map = ClassNameMap::from_css(".a { x: 0 } .first { y: 1 }");
        // `.a` is taken by the stylesheet itself, so `first` skips past it
        assert_eq!(map.get("a"), Some("b"));
        assert_eq!(map.get("first"), Some("c"));
    }

    #[test]
    fn test_escaped_selector_matches_html_token() {
        let map = ClassNameMap::from_css(".md\\:rounded { border-radius: 4px }");
        assert_eq!(map.get("md:rounded"), Some("a"));

        let html = map.rewrite_html("<img class=\"md:rounded plain\">");
        assert_eq!(html, "<img class=\"a plain\">");
    }

    #[test]
    fn test_decimal_values_not_selectors() {
        let map = ClassNameMap::from_css(".fade { transition: all 0.5s ease; top: .5em }");
        assert_eq!(map.get("fade"), Some("a"));
        assert!(map.get("5s").is_none());
        assert!(map.get("5em").is_none());

        let css = map.rewrite_css(".fade { transition: all 0.5s ease }");
        assert!(css.contains("0.5s"));
    }

    #[test]
    fn test_url_contents_untouched() {
        let css = ".hero { background: url(photo.png) } .png { color: red }";
        let map = ClassNameMap::from_css(css);
        assert_eq!(map.get("hero"), Some("a"));
        assert_eq!(map.get("png"), Some("b"));

        let rewritten = map.rewrite_css(css);
        assert!(rewritten.contains("url(photo.png)"));
        assert!(rewritten.contains(".b { color: red }"));
    }

    #[test]
    fn test_rewrite_css_and_html_consistent() {
        let css = ".shadow { box-shadow: 0 } .hero { color: red }";
        let map = ClassNameMap::from_css(css);

        let rewritten_css = map.rewrite_css(css);
        let rewritten_html = map.rewrite_html("<div class=\"hero shadow\">x</div>");

        assert!(rewritten_css.contains(&format!(".{}", map.get("shadow").unwrap())));
        assert!(rewritten_css.contains(&format!(".{}", map.get("hero").unwrap())));
        assert_eq!(
            rewritten_html,
            format!(
                "<div class=\"{} {}\">x</div>",
                map.get("hero").unwrap(),
                map.get("shadow").unwrap()
            )
        );
    }

    #[test]
    fn test_single_quoted_attribute() {
        let map = ClassNameMap::from_css(".hero { color: red }");
        assert_eq!(
            map.rewrite_html("<p class='hero'>x</p>"),
            "<p class=\"a\">x</p>"
        );
    }

    #[test]
    fn test_empty_css() {
        let map = ClassNameMap::from_css("body { margin: 0 }");
        assert!(map.is_empty());
        assert_eq!(map.rewrite_html("<p class=\"x\">y</p>"), "<p class=\"x\">y</p>");
    }
}

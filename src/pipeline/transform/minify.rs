//! Production minification transform.
//!
//! Active only for HTML output in a production environment: class names are
//! rewritten with the build-wide map first, then the document is minified
//! (short doctype, comments stripped, whitespace collapsed).

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use minify_html::Cfg;

use crate::utils::path::is_html_path;

use super::ClassNameMap;

/// The minification transform.
pub struct Minify {
    active: bool,
    classnames: Option<Arc<ClassNameMap>>,
}

impl Minify {
    pub fn new(active: bool, classnames: Option<Arc<ClassNameMap>>) -> Self {
        Self { active, classnames }
    }

    /// Minify one document. Non-HTML output and non-production builds pass
    /// through unchanged.
    pub fn apply(&self, content: String, output_path: &Path) -> Result<String> {
        if !self.active || !is_html_path(output_path) {
            return Ok(content);
        }

        let content = match &self.classnames {
            Some(map) if !map.is_empty() => map.rewrite_html(&content),
            _ => content,
        };

        let minified = minify_html::minify(content.as_bytes(), &minify_cfg());
        String::from_utf8(minified).context("minified output is not valid UTF-8")
    }
}

fn minify_cfg() -> Cfg {
    Cfg {
        minify_css: true,
        ..Cfg::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn html_path() -> PathBuf {
        PathBuf::from("posts/hello/index.html")
    }

    #[test]
    fn test_inactive_passes_through() {
        let transform = Minify::new(false, None);
        let content = "<p>  lots    of   space  </p><!-- note -->".to_string();
        assert_eq!(
            transform.apply(content.clone(), &html_path()).unwrap(),
            content
        );
    }

    #[test]
    fn test_non_html_passes_through() {
        let transform = Minify::new(true, None);
        let content = "p {  color:  red;  }".to_string();
        assert_eq!(
            transform
                .apply(content.clone(), Path::new("styles/site.css"))
                .unwrap(),
            content
        );
    }

    #[test]
    fn test_strips_comments_and_collapses_whitespace() {
        let transform = Minify::new(true, None);
        let content =
            "<!DOCTYPE html><html><body>\n  <p>a    b</p>\n  <!-- gone -->\n</body></html>"
                .to_string();
        let minified = transform.apply(content, &html_path()).unwrap();

        assert!(!minified.contains("<!--"));
        assert!(!minified.contains("    "));
    }

    #[test]
    fn test_rewrites_class_names() {
        let map = Arc::new(ClassNameMap::from_css(".hero { color: red }"));
        let transform = Minify::new(true, Some(map.clone()));

        let content = "<html><body><div class=\"hero\">x</div></body></html>".to_string();
        let minified = transform.apply(content, &html_path()).unwrap();

        let short = map.get("hero").unwrap();
        assert!(minified.contains(&format!("class={short}")) || minified.contains(&format!("class=\"{short}\"")));
        assert!(!minified.contains("hero"));
    }
}

//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! content = "content"         # Markdown source directory (relative to site root)
//! output = "public"           # Output directory for generated HTML
//! posts = "posts"             # Posts directory (relative to content)
//! assets = "assets"           # Static assets directory (relative to site root)
//! minify = true               # Minify HTML output in production
//!
//! [build.markdown]
//! class_map = "markdown-classes.json"   # element -> class mapping
//!
//! [build.images]
//! widths = [320, 568, 768, 900]
//!
//! [build.css]
//! input = "assets/styles/site.css"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{CssConfig, ImagesConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Content source directory (markdown files).
    pub content: PathBuf,

    /// Build output directory.
    pub output: PathBuf,

    /// Posts directory, relative to `content`. Drives the posts collection.
    pub posts: PathBuf,

    /// Static assets directory, relative to site root. Copied verbatim.
    pub assets: PathBuf,

    /// Minify HTML output (applies in the production environment only).
    pub minify: bool,

    /// Clean output directory before building (CLI only).
    #[serde(skip)]
    pub clean: bool,

    /// Skip draft pages during build (CLI only).
    #[serde(skip)]
    pub skip_drafts: bool,

    /// Markdown rendering settings.
    pub markdown: MarkdownConfig,

    /// Responsive image settings.
    pub images: ImagesConfig,

    /// Stylesheet pipeline settings.
    pub css: CssConfig,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            content: "content".into(),
            output: "public".into(),
            posts: "posts".into(),
            assets: "assets".into(),
            minify: true,
            clean: false,
            skip_drafts: false,
            markdown: MarkdownConfig::default(),
            images: ImagesConfig::default(),
            css: CssConfig::default(),
        }
    }
}

/// `[build.markdown]` settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MarkdownConfig {
    /// JSON file mapping element tags to class strings, applied while
    /// rendering (relative to site root). Loaded once at startup.
    pub class_map: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BuildSectionConfig::default();
        assert_eq!(config.content, PathBuf::from("content"));
        assert_eq!(config.output, PathBuf::from("public"));
        assert_eq!(config.posts, PathBuf::from("posts"));
        assert!(config.minify);
        assert!(config.markdown.class_map.is_none());
    }
}

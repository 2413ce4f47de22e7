//! Content model: scanned pages, frontmatter metadata, collections.

pub mod collection;
mod meta;
mod scan;

pub use meta::PageMeta;
pub use scan::scan_content;

use std::path::PathBuf;

/// One markdown source document and everything derived from it during the
/// scan phase. Rendering happens later, per page.
#[derive(Debug, Clone)]
pub struct Page {
    /// Absolute source path.
    pub source: PathBuf,
    /// Source path relative to the content directory.
    pub rel: PathBuf,
    /// Output path relative to the output directory.
    pub route: PathBuf,
    /// Site URL for this page (`/posts/hello/`).
    pub url: String,
    /// Frontmatter metadata (defaults when absent).
    pub meta: PageMeta,
    /// Markdown body with frontmatter stripped.
    pub body: String,
}

impl Page {
    /// Display title: frontmatter title, else the file stem.
    pub fn title(&self) -> String {
        if let Some(title) = &self.meta.title {
            return title.clone();
        }
        self.rel
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

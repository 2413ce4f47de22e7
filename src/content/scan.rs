//! Content tree scanning.
//!
//! Walks the content directory, classifies markdown sources, extracts
//! frontmatter and computes output routes. The result is sorted by source
//! path so downstream ordering is deterministic.

use anyhow::{Context, Result};
use jwalk::WalkDir;

use crate::config::SiteConfig;
use crate::debug;
use crate::utils::path::{has_reserved_component, is_markdown_path, output_route, route_url};

use super::meta::extract_frontmatter;
use super::Page;

/// Scan the content directory into pages, sorted by source path.
///
/// Files and directories whose name starts with `_` are reserved for the
/// layout and config data and are skipped. Drafts are skipped only when
/// `--skip-drafts` was passed.
pub fn scan_content(config: &SiteConfig) -> Result<Vec<Page>> {
    let content_dir = &config.build.content;
    let mut pages = Vec::new();

    for entry in WalkDir::new(content_dir).sort(true) {
        let entry = entry.context("failed to read content directory entry")?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !is_markdown_path(&path) {
            continue;
        }

        let rel = path
            .strip_prefix(content_dir)
            .unwrap_or(&path)
            .to_path_buf();
        if has_reserved_component(&rel) {
            continue;
        }

        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let (meta, body) = extract_frontmatter(&source)
            .with_context(|| format!("invalid frontmatter in {}", path.display()))?;

        if meta.draft && config.build.skip_drafts {
            debug!("scan"; "skipping draft {}", rel.display());
            continue;
        }

        let route = output_route(&rel);
        let url = route_url(&route);

        pages.push(Page {
            source: path,
            rel,
            route,
            url,
            meta,
            body: body.to_string(),
        });
    }

    // jwalk sorts per directory level; make the full ordering explicit
    pages.sort_by(|a, b| a.rel.cmp(&b.rel));

    Ok(pages)
}

//! Static assets and the stylesheet pipeline.

mod css;

pub use css::{StylesheetOutput, process_stylesheet};

use std::path::Path;

use anyhow::{Context, Result};
use jwalk::WalkDir;

use crate::config::SiteConfig;
use crate::utils::path::{has_reserved_component, is_markdown_path};

/// Copy static files into the output tree.
///
/// Two sources: the assets directory (mirrored under the output as-is) and
/// non-markdown files in the content tree (so opted-out images and other
/// colocated files stay reachable). The stylesheet input is skipped here;
/// the stylesheet pipeline owns it. Returns the number of files copied.
pub fn copy_static_assets(config: &SiteConfig) -> Result<usize> {
    let mut copied = 0;

    let css_input = config
        .build
        .css
        .input
        .as_ref()
        .map(|input| config.root_join(input));

    // Assets directory -> output/<assets-name>/
    let assets_dir = config.root_join(&config.build.assets);
    if assets_dir.is_dir() {
        let dest_root = config
            .build
            .output
            .join(assets_dir.file_name().unwrap_or_default());
        copied += copy_tree(&assets_dir, &dest_root, &|path| {
            Some(path) != css_input.as_deref()
        })?;
    }

    // Non-markdown content files, mirrored
    let content_dir = &config.build.content;
    copied += copy_tree(content_dir, &config.build.output, &|path| {
        !is_markdown_path(path)
            && !path
                .strip_prefix(content_dir)
                .map(has_reserved_component)
                .unwrap_or(false)
    })?;

    Ok(copied)
}

/// Copy all files under `src` to `dest`, preserving relative paths.
fn copy_tree(src: &Path, dest: &Path, keep: &dyn Fn(&Path) -> bool) -> Result<usize> {
    let mut copied = 0;

    for entry in WalkDir::new(src).sort(true) {
        let entry = entry.context("failed to read asset directory entry")?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !keep(&path) {
            continue;
        }

        let rel = path.strip_prefix(src).unwrap_or(&path);
        let target = dest.join(rel);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::copy(&path, &target)
            .with_context(|| format!("failed to copy {}", path.display()))?;
        copied += 1;
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_copy_static_assets() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.root = dir.path().to_path_buf();
        config.build.content = dir.path().join("content");
        config.build.output = dir.path().join("public");

        fs::create_dir_all(dir.path().join("assets/fonts")).unwrap();
        fs::write(dir.path().join("assets/fonts/a.woff2"), b"font").unwrap();
        fs::create_dir_all(config.build.content.join("posts")).unwrap();
        fs::write(config.build.content.join("posts/post.md"), "# md").unwrap();
        fs::write(config.build.content.join("photo.jpg"), b"jpg").unwrap();
        fs::write(config.build.content.join("_layout.html"), "layout").unwrap();

        let copied = copy_static_assets(&config).unwrap();
        assert_eq!(copied, 2);
        assert!(dir.path().join("public/assets/fonts/a.woff2").exists());
        assert!(dir.path().join("public/photo.jpg").exists());
        // Markdown and reserved files are not copied
        assert!(!dir.path().join("public/posts/post.md").exists());
        assert!(!dir.path().join("public/_layout.html").exists());
    }

    #[test]
    fn test_css_input_not_copied_raw() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.root = dir.path().to_path_buf();
        config.build.content = dir.path().join("content");
        config.build.output = dir.path().join("public");
        config.build.css.input = Some("assets/styles/site.css".into());

        fs::create_dir_all(dir.path().join("assets/styles")).unwrap();
        fs::write(dir.path().join("assets/styles/site.css"), ".a{}").unwrap();
        fs::create_dir_all(&config.build.content).unwrap();

        copy_static_assets(&config).unwrap();
        assert!(!dir.path().join("public/assets/styles/site.css").exists());
    }
}

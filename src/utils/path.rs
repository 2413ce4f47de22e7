//! Path normalization and output route helpers.
//!
//! Pure functions, no side effects.

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Check if an output path has an HTML extension.
///
/// Transforms only apply to HTML output; everything else (xml, css, ...)
/// passes through untouched.
#[inline]
pub fn is_html_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html"))
}

/// Check if a path has a markdown extension.
#[inline]
pub fn is_markdown_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("markdown"))
}

/// Compute the output route for a markdown source path (relative to the
/// content directory).
///
/// - `index.md` -> `index.html`
/// - `about.md` -> `about/index.html`
/// - `posts/2024-01-01-hello.md` -> `posts/2024-01-01-hello/index.html`
pub fn output_route(rel: &Path) -> PathBuf {
    let stem = rel
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("index");
    let parent = rel.parent().unwrap_or(Path::new(""));

    if stem == "index" {
        parent.join("index.html")
    } else {
        parent.join(stem).join("index.html")
    }
}

/// Check if a content-relative path is reserved (any component starting
/// with `_`, e.g. `_layout.html`, `_config/`).
#[inline]
pub fn has_reserved_component(rel: &Path) -> bool {
    rel.components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('_'))
}

/// Compute the site URL for an output route.
///
/// Strips the trailing `index.html` and ensures leading/trailing slashes:
/// `posts/hello/index.html` -> `/posts/hello/`.
pub fn route_url(route: &Path) -> String {
    let mut url = String::from("/");
    if let Some(parent) = route.parent() {
        for part in parent.components() {
            url.push_str(&part.as_os_str().to_string_lossy());
            url.push('/');
        }
    }
    url
}

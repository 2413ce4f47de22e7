//! Markdown rendering.
//!
//! - [`classmap`]: element -> class mapping loaded from JSON
//! - [`convert`]: pulldown-cmark event stream to HTML

mod classmap;
mod convert;

pub use classmap::ClassMap;
pub use convert::{MarkdownOptions, render_markdown};

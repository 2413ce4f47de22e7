//! Configuration section definitions.

mod build;
mod css;
mod images;
mod site;

pub use build::{BuildSectionConfig, MarkdownConfig};
pub use css::CssConfig;
pub use images::{ImageFormat, ImagesConfig};
pub use site::SiteSectionConfig;

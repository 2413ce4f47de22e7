//! Per-document transforms.

mod classnames;
mod images;
mod minify;

pub use classnames::ClassNameMap;
pub use images::{MediaError, ResponsiveImages};
pub use minify::Minify;

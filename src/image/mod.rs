//! Responsive image artifact generation.
//!
//! - [`artifact`]: artifact set generation and the per-build cache
//! - [`encode`]: resize and encode to the target formats
//! - [`markup`]: `<picture>` markup generation

mod artifact;
mod encode;
mod markup;

pub use artifact::{Artifact, ArtifactSet, ImageService};
pub use markup::{ImgAttributes, MarkupError, OPT_OUT_ATTR, generate_markup};

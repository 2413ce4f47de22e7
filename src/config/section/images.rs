//! `[build.images]` section configuration.
//!
//! Settings for the responsive image pipeline. The defaults are the fixed
//! parameter set most sites want; widths larger than a source image are
//! clamped at generation time.
//!
//! # Example
//!
//! ```toml
//! [build.images]
//! widths = [320, 568, 768, 900]
//! formats = ["avif", "webp", "jpeg"]
//! output_dir = "assets/images"      # relative to the output directory
//! url_path = "/assets/images/"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output encodings for generated image artifacts.
///
/// `avif` is the next-gen lossy encoding, `webp` the next-gen lossless one,
/// `jpeg` the legacy raster fallback every browser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Avif,
    Webp,
    Jpeg,
}

impl ImageFormat {
    /// File extension for this format.
    pub const fn ext(self) -> &'static str {
        match self {
            Self::Avif => "avif",
            Self::Webp => "webp",
            Self::Jpeg => "jpeg",
        }
    }

    /// MIME type used in `<source type="...">`.
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Avif => "image/avif",
            Self::Webp => "image/webp",
            Self::Jpeg => "image/jpeg",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Target widths, ascending. Clamped to the source width and
    /// deduplicated per image.
    pub widths: Vec<u32>,

    /// Target encodings, in `<source>` order. The last raster format acts
    /// as the `<img>` fallback.
    pub formats: Vec<ImageFormat>,

    /// Artifact directory, relative to the output directory.
    pub output_dir: PathBuf,

    /// URL prefix under which artifacts are served.
    pub url_path: String,

    /// Presentation classes applied to the generated `<img>`.
    pub class: String,

    /// Inline style applied to the generated `<img>`.
    pub style: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            widths: vec![320, 568, 768, 900],
            formats: vec![ImageFormat::Avif, ImageFormat::Webp, ImageFormat::Jpeg],
            output_dir: "assets/images".into(),
            url_path: "/assets/images/".into(),
            class: "md:rounded shadow-sm my-2 sm:my-4 transform -translate-x-11 \
                    sm:translate-x-0 w-screen sm:w-full"
                .into(),
            style: "max-width: 100vw;".into(),
        }
    }
}

impl ImagesConfig {
    /// The `sizes` attribute value derived from the width list.
    pub fn sizes_attr(&self) -> String {
        self.widths
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The fallback (legacy raster) format: the last configured format.
    pub fn fallback_format(&self) -> ImageFormat {
        self.formats.last().copied().unwrap_or(ImageFormat::Jpeg)
    }
}

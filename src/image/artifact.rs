//! Image artifact set generation.
//!
//! One source image becomes a grid of (width x format) artifacts with
//! deterministic, content-hashed filenames. Generation happens once per
//! distinct source per build (process-wide cache); file writes are
//! idempotent, so concurrent documents referencing the same image are safe.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use dashmap::DashMap;
use rayon::prelude::*;
use url::Url;

use crate::config::{ImageFormat, ImagesConfig, SiteConfig};
use crate::debug;

use super::encode::{encode, resize_to_width};

/// One generated image file.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Site URL of the artifact.
    pub url: String,
    /// Absolute output path.
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

/// All artifacts generated for one source image, grouped by format in
/// configured order, widths ascending within each format.
#[derive(Debug, Clone, Default)]
pub struct ArtifactSet {
    pub entries: Vec<(ImageFormat, Vec<Artifact>)>,
}

impl ArtifactSet {
    /// Artifacts for a format, if generated.
    pub fn for_format(&self, format: ImageFormat) -> Option<&[Artifact]> {
        self.entries
            .iter()
            .find(|(f, _)| *f == format)
            .map(|(_, artifacts)| artifacts.as_slice())
    }

    /// `srcset` value for a format: `url 320w, url 568w, ...`.
    pub fn srcset(&self, format: ImageFormat) -> Option<String> {
        let artifacts = self.for_format(format)?;
        Some(
            artifacts
                .iter()
                .map(|a| format!("{} {}w", a.url, a.width))
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

/// Per-build artifact cache, keyed by resolved source.
static ARTIFACTS: LazyLock<DashMap<String, ArtifactSet>> = LazyLock::new(DashMap::new);

/// A resolved image source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    Local(PathBuf),
    Remote(Url),
}

impl SourceRef {
    fn cache_key(&self) -> String {
        match self {
            Self::Local(path) => path.display().to_string(),
            Self::Remote(url) => url.to_string(),
        }
    }
}

/// Resolves image sources and produces artifact sets.
///
/// Constructed once per build and shared (`Arc`) across document tasks.
pub struct ImageService {
    images: ImagesConfig,
    content_dir: PathBuf,
    root: PathBuf,
    output_dir: PathBuf,
}

impl ImageService {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            images: config.build.images.clone(),
            content_dir: config.build.content.clone(),
            root: config.root.clone(),
            output_dir: config.images_output_dir(),
        }
    }

    pub fn images_config(&self) -> &ImagesConfig {
        &self.images
    }

    /// Resolve an element `src` to a concrete source.
    ///
    /// A leading path separator means project-relative: the path is rooted
    /// at the content source directory. Other local paths resolve against
    /// the site root. `http(s)` URLs are fetched.
    pub fn resolve_source(&self, src: &str) -> Result<SourceRef> {
        if src.starts_with("http://") || src.starts_with("https://") {
            let url = Url::parse(src).with_context(|| format!("invalid image URL `{src}`"))?;
            return Ok(SourceRef::Remote(url));
        }

        let path = match src.strip_prefix('/') {
            Some(rest) => self.content_dir.join(rest),
            None => self.root.join(src),
        };
        Ok(SourceRef::Local(path))
    }

    /// Request the artifact set for an element `src`, generating it on
    /// first use and serving the per-build cache afterwards.
    pub async fn artifact_set(&self, src: &str) -> Result<ArtifactSet> {
        let source = self.resolve_source(src)?;
        let key = source.cache_key();

        if let Some(hit) = ARTIFACTS.get(&key) {
            debug!("image"; "cache hit for {key}");
            return Ok(hit.clone());
        }

        let bytes = self.load_source(&source).await?;

        let images = self.images.clone();
        let output_dir = self.output_dir.clone();
        let set = tokio::task::spawn_blocking(move || generate_set(&bytes, &images, &output_dir))
            .await
            .context("image generation task failed")??;

        ARTIFACTS.insert(key, set.clone());
        Ok(set)
    }

    /// Load raw source bytes.
    async fn load_source(&self, source: &SourceRef) -> Result<Vec<u8>> {
        match source {
            SourceRef::Local(path) => std::fs::read(path)
                .with_context(|| format!("failed to read image {}", path.display())),
            SourceRef::Remote(url) => {
                let response = reqwest::get(url.clone())
                    .await
                    .and_then(reqwest::Response::error_for_status)
                    .with_context(|| format!("failed to fetch image {url}"))?;
                let bytes = response
                    .bytes()
                    .await
                    .with_context(|| format!("failed to fetch image {url}"))?;
                Ok(bytes.to_vec())
            }
        }
    }
}

/// Decode, resize and encode the full width x format grid, writing
/// artifacts with deterministic names. Existing files are kept.
fn generate_set(bytes: &[u8], images: &ImagesConfig, output_dir: &Path) -> Result<ArtifactSet> {
    let img = image::load_from_memory(bytes).context("failed to decode image")?;

    let stem = hex::encode(&blake3::hash(bytes).as_bytes()[..5]);
    let widths = target_widths(&images.widths, img.width());
    if widths.is_empty() {
        bail!("no usable widths for image");
    }

    std::fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "failed to create image output dir {}",
            output_dir.display()
        )
    })?;

    // One resize per width, every format encoded from it
    let per_width: Vec<Vec<Artifact>> = widths
        .par_iter()
        .map(|&width| {
            let resized = resize_to_width(&img, width);
            images
                .formats
                .iter()
                .map(|&format| {
                    let data = encode(&resized, format)?;
                    write_artifact(&stem, &resized, format, data, images, output_dir)
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    // Regroup the grid by format, widths ascending
    let mut entries: Vec<(ImageFormat, Vec<Artifact>)> =
        images.formats.iter().map(|&f| (f, Vec::new())).collect();
    for artifacts in per_width {
        for artifact in artifacts {
            if let Some((_, group)) = entries.iter_mut().find(|(f, _)| *f == artifact.format) {
                group.push(artifact);
            }
        }
    }
    for (_, group) in &mut entries {
        group.sort_by_key(|a| a.width);
    }

    Ok(ArtifactSet { entries })
}

/// Write one artifact, skipping the write when the file already exists
/// (names are content-addressed, so an existing file is identical).
fn write_artifact(
    stem: &str,
    resized: &image::DynamicImage,
    format: ImageFormat,
    data: Vec<u8>,
    images: &ImagesConfig,
    output_dir: &Path,
) -> Result<Artifact> {
    let filename = format!("{stem}-{}w.{}", resized.width(), format.ext());
    let path = output_dir.join(&filename);

    if !path.exists() {
        std::fs::write(&path, data)
            .with_context(|| format!("failed to write artifact {}", path.display()))?;
    }

    Ok(Artifact {
        url: format!("{}{}", images.url_path, filename),
        path,
        width: resized.width(),
        height: resized.height(),
        format,
    })
}

/// Clamp target widths to the source width and deduplicate, ascending.
fn target_widths(widths: &[u32], source_width: u32) -> Vec<u32> {
    let mut clamped: Vec<u32> = widths
        .iter()
        .map(|&w| w.min(source_width))
        .filter(|&w| w > 0)
        .collect();
    clamped.sort_unstable();
    clamped.dedup();
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    #[test]
    fn test_target_widths_clamped_and_deduped() {
        assert_eq!(target_widths(&[320, 568, 768, 900], 600), vec![320, 568, 600]);
        assert_eq!(target_widths(&[320, 568, 768, 900], 2000), vec![320, 568, 768, 900]);
        assert_eq!(target_widths(&[320, 568], 100), vec![100]);
    }

    fn service(dir: &Path, formats: Vec<ImageFormat>) -> Arc<ImageService> {
        let mut config = SiteConfig::default();
        config.root = dir.to_path_buf();
        config.build.content = dir.join("content");
        config.build.output = dir.join("public");
        config.build.images.formats = formats;
        config.build.images.widths = vec![4, 8];
        Arc::new(ImageService::new(&config))
    }

    fn write_test_png(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(8, 8));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_resolve_source_leading_slash_is_content_relative() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path(), vec![ImageFormat::Jpeg]);

        let resolved = service.resolve_source("/photo.jpg").unwrap();
        assert_eq!(
            resolved,
            SourceRef::Local(dir.path().join("content").join("photo.jpg"))
        );
    }

    #[test]
    fn test_resolve_source_remote() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path(), vec![ImageFormat::Jpeg]);

        let resolved = service.resolve_source("https://example.com/a.png").unwrap();
        assert!(matches!(resolved, SourceRef::Remote(_)));
    }

    #[tokio::test]
    async fn test_artifact_set_generates_grid() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path(), vec![ImageFormat::Jpeg]);
        write_test_png(&dir.path().join("content").join("photo.png"));

        let set = service.artifact_set("/photo.png").await.unwrap();
        let jpegs = set.for_format(ImageFormat::Jpeg).unwrap();
        assert_eq!(jpegs.len(), 2);
        assert_eq!(jpegs[0].width, 4);
        assert_eq!(jpegs[1].width, 8);
        for artifact in jpegs {
            assert!(artifact.path.exists());
            assert!(artifact.url.starts_with("/assets/images/"));
            assert!(artifact.url.ends_with("w.jpeg"));
        }

        let srcset = set.srcset(ImageFormat::Jpeg).unwrap();
        assert!(srcset.contains(" 4w, "));
        assert!(srcset.ends_with(" 8w"));
    }

    #[tokio::test]
    async fn test_missing_source_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path(), vec![ImageFormat::Jpeg]);
        assert!(service.artifact_set("/nope.png").await.is_err());
    }
}

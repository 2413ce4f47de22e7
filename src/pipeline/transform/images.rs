//! Responsive image transform.
//!
//! Rewrites every qualifying `<img>` in a rendered document into a
//! `<picture>` fragment backed by a generated artifact set. Elements
//! carrying the opt-out marker are preserved verbatim.
//!
//! The transform snapshots qualifying elements first, computes all
//! replacements concurrently, then splices them back in a second pass, so
//! untouched markup is never reserialized.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use thiserror::Error;
use tokio::task::JoinSet;

use crate::image::{ImageService, ImgAttributes, OPT_OUT_ATTR, generate_markup};
use crate::utils::path::is_html_path;

/// Errors raised while reading image elements.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("missing `src` on <img> in {page}")]
    MissingSrc { page: String },
}

/// Snapshot of one qualifying image element.
#[derive(Debug)]
struct ImageRef {
    /// The element's raw source markup, spliced out on success.
    raw: String,
    src: Option<String>,
    /// `None` means the attribute was absent (distinct from `alt=""`).
    alt: Option<String>,
}

/// The responsive image transform.
pub struct ResponsiveImages {
    service: Arc<ImageService>,
}

impl ResponsiveImages {
    pub fn new(service: Arc<ImageService>) -> Self {
        Self { service }
    }

    /// Transform one document. Non-HTML output and documents without
    /// qualifying images pass through unchanged.
    ///
    /// All replacements for a document run concurrently; a single failure
    /// fails the whole document.
    pub async fn apply(&self, content: String, output_path: &Path) -> Result<String> {
        if !is_html_path(output_path) {
            return Ok(content);
        }

        let snapshot = collect_images(&content)?;
        if snapshot.is_empty() {
            return Ok(content);
        }

        let page = output_path.display().to_string();
        let images = self.service.images_config();
        let sizes = images.sizes_attr();
        let fallback = images.fallback_format();

        let mut tasks = JoinSet::new();
        for (index, image) in snapshot.iter().enumerate() {
            let Some(src) = image.src.clone() else {
                return Err(MediaError::MissingSrc { page: page.clone() }.into());
            };

            let attrs = ImgAttributes {
                src: src.clone(),
                alt: image.alt.clone(),
                sizes: sizes.clone(),
                class: images.class.clone(),
                style: images.style.clone(),
            };
            let service = Arc::clone(&self.service);

            tasks.spawn(async move {
                let set = service.artifact_set(&src).await?;
                let markup = generate_markup(&set, &attrs, fallback)?;
                anyhow::Ok((index, markup))
            });
        }

        let mut replacements: Vec<Option<String>> = vec![None; snapshot.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, markup) = joined
                .context("image task panicked")?
                .with_context(|| format!("responsive image transform failed for {page}"))?;
            replacements[index] = Some(markup);
        }

        let spliced = splice(&content, &snapshot, &replacements)?;
        Ok(ensure_doctype(spliced))
    }
}

/// Collect an immutable snapshot of qualifying `<img>` elements in
/// document order. DOM parsing is synchronous.
fn collect_images(content: &str) -> Result<Vec<ImageRef>> {
    let dom = tl::parse(content, tl::ParserOptions::default())
        .context("failed to parse document HTML")?;

    let mut snapshot = Vec::new();
    for node in dom.nodes() {
        let Some(tag) = node.as_tag() else {
            continue;
        };
        if tag.name().as_utf8_str() != "img" {
            continue;
        }

        let attributes = tag.attributes();
        if attributes.get(OPT_OUT_ATTR).is_some() {
            continue;
        }

        // Present-but-valueless attributes count as empty strings
        let src = attributes
            .get("src")
            .map(|v| v.map(|b| b.as_utf8_str().into_owned()).unwrap_or_default());
        let alt = attributes
            .get("alt")
            .map(|v| v.map(|b| b.as_utf8_str().into_owned()).unwrap_or_default());

        snapshot.push(ImageRef {
            raw: tag.raw().as_utf8_str().into_owned(),
            src,
            alt,
        });
    }

    Ok(snapshot)
}

/// Replace each snapshotted element with its computed markup, in document
/// order. Everything between elements is copied through untouched.
fn splice(
    content: &str,
    snapshot: &[ImageRef],
    replacements: &[Option<String>],
) -> Result<String> {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    for (image, replacement) in snapshot.iter().zip(replacements) {
        let Some(replacement) = replacement else {
            bail!("image replacement missing after join");
        };
        let Some(pos) = rest.find(&image.raw) else {
            bail!("image element `{}` not found during splice", image.raw);
        };
        out.push_str(&rest[..pos]);
        out.push_str(replacement);
        rest = &rest[pos + image.raw.len()..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Prefix the standard doctype when the document lacks one.
fn ensure_doctype(content: String) -> String {
    if content
        .trim_start()
        .get(..9)
        .is_some_and(|head| head.eq_ignore_ascii_case("<!doctype"))
    {
        content
    } else {
        format!("<!DOCTYPE html>\n{content}")
    }
}

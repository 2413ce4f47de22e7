//! Responsive `<picture>` markup generation.
//!
//! Builds the replacement fragment for one image element: one `<source>`
//! per next-gen format plus a legacy `<img>` fallback. The `alt` attribute
//! is a checked precondition here; an explicitly empty string is valid.

use thiserror::Error;

use crate::config::ImageFormat;
use crate::utils::html::escape_attr;

use super::ArtifactSet;

/// Attribute on image elements that suppresses the responsive transform.
/// The generated fallback `<img>` carries it too, so transformed output
/// never re-qualifies.
pub const OPT_OUT_ATTR: &str = "data-no-responsive";

/// Errors raised while generating responsive markup.
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("missing `alt` attribute for image `{src}` (use alt=\"\" for decorative images)")]
    MissingAlt { src: String },

    #[error("no artifacts generated for image `{src}`")]
    EmptyArtifactSet { src: String },
}

/// Attribute bag for the generated `<img>` fallback.
#[derive(Debug, Clone)]
pub struct ImgAttributes {
    /// Original element `src`, for error messages.
    pub src: String,
    /// Alt text; `None` means the attribute was absent on the source
    /// element and generation must fail.
    pub alt: Option<String>,
    pub sizes: String,
    pub class: String,
    pub style: String,
}

/// Generate the `<picture>` fragment for an artifact set.
///
/// `fallback` names the legacy raster format rendered as the `<img>`; every
/// other format in the set becomes a `<source>` in set order.
pub fn generate_markup(
    set: &ArtifactSet,
    attrs: &ImgAttributes,
    fallback: ImageFormat,
) -> Result<String, MarkupError> {
    let Some(alt) = &attrs.alt else {
        return Err(MarkupError::MissingAlt {
            src: attrs.src.clone(),
        });
    };

    let fallback_artifacts = set
        .for_format(fallback)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| MarkupError::EmptyArtifactSet {
            src: attrs.src.clone(),
        })?;

    let mut html = String::from("<picture>");

    for (format, artifacts) in &set.entries {
        if *format == fallback || artifacts.is_empty() {
            continue;
        }
        let srcset = set.srcset(*format).unwrap_or_default();
        html.push_str(&format!(
            "<source type=\"{}\" srcset=\"{}\" sizes=\"{}\">",
            format.mime(),
            srcset,
            escape_attr(&attrs.sizes),
        ));
    }

    // Smallest artifact as src, the full width run in srcset, dimensions
    // from the largest so the browser can reserve layout space
    let smallest = &fallback_artifacts[0];
    let largest = &fallback_artifacts[fallback_artifacts.len() - 1];
    let srcset = set.srcset(fallback).unwrap_or_default();

    html.push_str(&format!(
        "<img src=\"{}\" srcset=\"{}\" sizes=\"{}\" width=\"{}\" height=\"{}\" \
         alt=\"{}\" loading=\"lazy\" decoding=\"async\" class=\"{}\" style=\"{}\" {}>",
        smallest.url,
        srcset,
        escape_attr(&attrs.sizes),
        largest.width,
        largest.height,
        escape_attr(alt),
        escape_attr(&attrs.class),
        escape_attr(&attrs.style),
        OPT_OUT_ATTR,
    ));

    html.push_str("</picture>");
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Artifact;
    use std::path::PathBuf;

    fn artifact(format: ImageFormat, width: u32) -> Artifact {
        Artifact {
            url: format!("/assets/images/abc-{width}w.{}", format.ext()),
            path: PathBuf::from(format!("/out/abc-{width}w.{}", format.ext())),
            width,
            height: width / 2,
            format,
        }
    }

    fn test_set() -> ArtifactSet {
        ArtifactSet {
            entries: vec![
                (
                    ImageFormat::Avif,
                    vec![artifact(ImageFormat::Avif, 320), artifact(ImageFormat::Avif, 568)],
                ),
                (
                    ImageFormat::Webp,
                    vec![artifact(ImageFormat::Webp, 320), artifact(ImageFormat::Webp, 568)],
                ),
                (
                    ImageFormat::Jpeg,
                    vec![artifact(ImageFormat::Jpeg, 320), artifact(ImageFormat::Jpeg, 568)],
                ),
            ],
        }
    }

    fn attrs(alt: Option<&str>) -> ImgAttributes {
        ImgAttributes {
            src: "/photo.jpg".into(),
            alt: alt.map(String::from),
            sizes: "320, 568".into(),
            class: "shadow".into(),
            style: "max-width: 100vw;".into(),
        }
    }

    #[test]
    fn test_missing_alt_is_error() {
        let err = generate_markup(&test_set(), &attrs(None), ImageFormat::Jpeg).unwrap_err();
        assert!(matches!(err, MarkupError::MissingAlt { .. }));
    }

    #[test]
    fn test_empty_alt_is_valid() {
        let html = generate_markup(&test_set(), &attrs(Some("")), ImageFormat::Jpeg).unwrap();
        assert!(html.contains("alt=\"\""));
    }

    #[test]
    fn test_picture_structure() {
        let html = generate_markup(&test_set(), &attrs(Some("A photo")), ImageFormat::Jpeg).unwrap();

        assert!(html.starts_with("<picture>"));
        assert!(html.ends_with("</picture>"));
        assert!(html.contains("<source type=\"image/avif\""));
        assert!(html.contains("<source type=\"image/webp\""));
        // Fallback img: smallest src, largest dimensions, lazy attributes
        assert!(html.contains("src=\"/assets/images/abc-320w.jpeg\""));
        assert!(html.contains("srcset=\"/assets/images/abc-320w.jpeg 320w, /assets/images/abc-568w.jpeg 568w\""));
        assert!(html.contains("width=\"568\""));
        assert!(html.contains("alt=\"A photo\""));
        assert!(html.contains("loading=\"lazy\""));
        assert!(html.contains("decoding=\"async\""));
    }

    #[test]
    fn test_generated_img_opts_out() {
        let html = generate_markup(&test_set(), &attrs(Some("x")), ImageFormat::Jpeg).unwrap();
        assert!(html.contains(OPT_OUT_ATTR));
    }

    #[test]
    fn test_alt_is_escaped() {
        let html =
            generate_markup(&test_set(), &attrs(Some("a \"quoted\" alt")), ImageFormat::Jpeg)
                .unwrap();
        assert!(html.contains("alt=\"a &quot;quoted&quot; alt\""));
    }
}

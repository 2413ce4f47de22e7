//! Stylesheet pipeline.
//!
//! Input stylesheet -> optional external processor hook -> lightningcss
//! minification (production) -> class-name map extraction -> output file.
//! The class-name map seeds the per-document minify transform so markup and
//! stylesheet rewrite consistently.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use rustc_hash::FxHashMap;

use crate::config::SiteConfig;
use crate::core::EnvContext;
use crate::log;
use crate::pipeline::ClassNameMap;
use crate::utils::exec::{Cmd, resolve_args};

/// Output directory for the processed stylesheet, relative to the output
/// root.
const STYLES_DIR: &str = "assets/styles";

/// Result of the stylesheet pipeline.
pub struct StylesheetOutput {
    /// Site URL of the emitted stylesheet.
    pub href: String,
    /// Class-name map for the minify transform (production only).
    pub classnames: Option<Arc<ClassNameMap>>,
}

/// Run the stylesheet pipeline. Returns `None` when no input is configured.
pub fn process_stylesheet(
    config: &SiteConfig,
    env: &EnvContext,
) -> Result<Option<StylesheetOutput>> {
    let Some(input_rel) = &config.build.css.input else {
        return Ok(None);
    };

    let input = config.root_join(input_rel);
    if !input.exists() {
        bail!("stylesheet input '{}' does not exist", input.display());
    }

    let Some(filename) = input.file_name().and_then(|f| f.to_str()) else {
        bail!("stylesheet input '{}' has no file name", input.display());
    };
    let output = config.build.output.join(STYLES_DIR).join(filename);
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let minify = env.is_production() && config.build.minify;

    let css = match config.build.css.processor_command() {
        Some(argv) => run_processor(config, &argv, &input, &output, minify)?,
        None => std::fs::read_to_string(&input)
            .with_context(|| format!("failed to read stylesheet {}", input.display()))?,
    };

    let css = if minify { minify_css(&css)? } else { css };

    let (css, classnames) = if minify {
        let map = ClassNameMap::from_css(&css);
        let rewritten = map.rewrite_css(&css);
        (rewritten, Some(Arc::new(map)))
    } else {
        (css, None)
    };

    std::fs::write(&output, css)
        .with_context(|| format!("failed to write stylesheet {}", output.display()))?;

    Ok(Some(StylesheetOutput {
        href: format!("/{STYLES_DIR}/{filename}"),
        classnames,
    }))
}

/// Run the external CSS processor and read what it wrote.
fn run_processor(
    config: &SiteConfig,
    argv: &[String],
    input: &Path,
    output: &Path,
    minify: bool,
) -> Result<String> {
    let mut vars = FxHashMap::default();
    vars.insert("LOAM_INPUT".to_string(), input.display().to_string());
    vars.insert("LOAM_OUTPUT".to_string(), output.display().to_string());
    vars.insert("LOAM_MINIFY".to_string(), minify.to_string());

    let resolved = resolve_args(argv, &vars);
    let (program, args) = resolved
        .split_first()
        .ok_or_else(|| anyhow!("empty CSS processor command"))?;

    log!("css"; "running {}", program);
    Cmd::new(program)
        .args(args)
        .cwd(config.get_root())
        .env("LOAM_MINIFY", minify.to_string())
        .run()
        .context("CSS processor hook failed")?;

    std::fs::read_to_string(output).with_context(|| {
        format!(
            "CSS processor did not write its output to {}",
            output.display()
        )
    })
}

/// Minify CSS source code.
fn minify_css(source: &str) -> Result<String> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|e| anyhow!("failed to parse stylesheet: {e}"))?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("failed to print stylesheet: {e}"))?;
    Ok(result.code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Environment;
    use std::fs;

    fn site(dir: &Path, env: Environment) -> (SiteConfig, EnvContext) {
        let mut config = SiteConfig::default();
        config.root = dir.to_path_buf();
        config.build.content = dir.join("content");
        config.build.output = dir.join("public");
        config.build.css.input = Some("site.css".into());
        fs::write(
            dir.join("site.css"),
            ".hero { color: red; }\n.shadow { box-shadow: none; }\n",
        )
        .unwrap();
        let env = EnvContext {
            environment: env,
            token: None,
        };
        (config, env)
    }

    #[test]
    fn test_no_input_configured() {
        let config = SiteConfig::default();
        let env = EnvContext::default();
        assert!(process_stylesheet(&config, &env).unwrap().is_none());
    }

    #[test]
    fn test_development_copies_unminified() {
        let dir = tempfile::tempdir().unwrap();
        let (config, env) = site(dir.path(), Environment::Development);

        let out = process_stylesheet(&config, &env).unwrap().unwrap();
        assert_eq!(out.href, "/assets/styles/site.css");
        assert!(out.classnames.is_none());

        let written = fs::read_to_string(dir.path().join("public/assets/styles/site.css")).unwrap();
        assert!(written.contains(".hero"));
    }

    #[test]
    fn test_production_minifies_and_mangles() {
        let dir = tempfile::tempdir().unwrap();
        let (config, env) = site(dir.path(), Environment::Production);

        let out = process_stylesheet(&config, &env).unwrap().unwrap();
        let map = out.classnames.expect("class map in production");
        let short = map.get("hero").unwrap();

        let written = fs::read_to_string(dir.path().join("public/assets/styles/site.css")).unwrap();
        assert!(written.contains(&format!(".{short}")));
        assert!(!written.contains(".hero"));
        // Minified: no double spaces
        assert!(!written.contains("  "));
    }

    #[test]
    fn test_missing_input_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.root = dir.path().to_path_buf();
        config.build.output = dir.path().join("public");
        config.build.css.input = Some("nope.css".into());

        assert!(process_stylesheet(&config, &EnvContext::default()).is_err());
    }
}

//! Site configuration management for `loam.toml`.
//!
//! # Sections
//!
//! | Section            | Purpose                                        |
//! |--------------------|------------------------------------------------|
//! | `[site]`           | Site metadata (title, url, token_env)          |
//! | `[build]`          | Paths, minification, posts directory           |
//! | `[build.markdown]` | Element -> class mapping file                  |
//! | `[build.images]`   | Responsive image widths, formats, destinations |
//! | `[build.css]`      | Stylesheet input and processor hook            |

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{
    BuildSectionConfig, CssConfig, ImageFormat, ImagesConfig, MarkdownConfig, SiteSectionConfig,
};

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::cli::{BuildArgs, Cli, Commands};
use crate::log;
use crate::utils::path::normalize_path;

/// Root configuration structure representing loam.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Site metadata
    pub site: SiteSectionConfig,

    /// Build settings
    pub build: BuildSectionConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            site: SiteSectionConfig::default(),
            build: BuildSectionConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file; the project root
    /// is the config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let Some(config_path) = find_config_file(&cli.config) else {
            log!(
                "error";
                "config file '{}' not found in this directory or any parent",
                cli.config.display()
            );
            bail!(ConfigError::Validation("config file not found".into()));
        };

        let mut config = Self::from_path(&config_path)?;
        config.config_path = normalize_path(&config_path);
        config.finalize(cli);
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            log!("warning"; "unknown fields in {}, ignoring:", path.display());
            for field in &ignored {
                eprintln!("- {field}");
            }
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Finalize configuration after loading: resolve the root, normalize
    /// paths, apply CLI overrides.
    fn finalize(&mut self, cli: &Cli) {
        let root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        self.root = normalize_path(&root);

        // CLI path overrides, then make build paths absolute
        if let Some(content) = &cli.content {
            self.build.content = content.clone();
        }
        if let Some(output) = &cli.output {
            self.build.output = output.clone();
        }
        self.build.content = normalize_path(&self.root.join(&self.build.content));
        self.build.output = normalize_path(&self.root.join(&self.build.output));

        self.apply_command_options(cli);
    }

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { build_args } => self.apply_build_args(build_args),
        }
    }

    /// Apply build arguments from CLI.
    fn apply_build_args(&mut self, args: &BuildArgs) {
        // Set verbose mode globally
        crate::logger::set_verbose(args.verbose);

        if let Some(minify) = args.minify {
            self.build.minify = minify;
        }
        self.build.clean = args.clean;
        self.build.skip_drafts = args.skip_drafts;
    }

    /// Validate the loaded configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.build.content.exists() {
            bail!(ConfigError::Validation(format!(
                "content directory '{}' does not exist",
                self.build.content.display()
            )));
        }

        if !self.build.images.url_path.starts_with('/') {
            bail!(ConfigError::Validation(
                "[build.images] url_path must start with '/'".into()
            ));
        }

        if self.build.images.widths.is_empty() || self.build.images.formats.is_empty() {
            bail!(ConfigError::Validation(
                "[build.images] widths and formats must not be empty".into()
            ));
        }

        Ok(())
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Absolute artifact output directory for generated images.
    pub fn images_output_dir(&self) -> PathBuf {
        self.build.output.join(&self.build.images.output_dir)
    }
}

/// Search upward from the current directory for the config file.
fn find_config_file(name: &Path) -> Option<PathBuf> {
    if name.is_absolute() {
        return name.exists().then(|| name.to_path_buf());
    }

    let mut dir = std::env::current_dir().ok()?;
    loop {
        let candidate = dir.join(name);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Parse config from a TOML snippet.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(SiteConfig::from_str("[site\ntitle = \"My Blog\"").is_err());
    }

    #[test]
    fn test_site_config_default() {
        let config = SiteConfig::default();

        assert_eq!(config.config_path, PathBuf::new());
        assert_eq!(config.site.title, "");
        assert_eq!(config.site.token_env, "LOAM_TOKEN");
        assert!(config.build.minify);
        assert_eq!(config.build.images.widths, vec![320, 568, 768, 900]);
    }

    #[test]
    fn test_parse_sections() {
        let config = test_parse_config(
            "[site]\ntitle = \"Test\"\n\n[build]\ncontent = \"src\"\n\n[build.images]\nwidths = [100, 200]\n",
        );
        assert_eq!(config.site.title, "Test");
        assert_eq!(config.build.content, PathBuf::from("src"));
        assert_eq!(config.build.images.widths, vec![100, 200]);
        // Untouched sub-sections keep their defaults
        assert_eq!(config.build.images.url_path, "/assets/images/");
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[site]\ntitle = \"Test\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = SiteConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.site.title, "Test");
        assert!(!ignored.is_empty());
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let content = "[site]\ntitle = \"Test\"";
        let (_, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_validate_url_path() {
        let mut config = test_parse_config("[site]\ntitle = \"Test\"\n");
        config.build.content = std::env::temp_dir();
        config.build.images.url_path = "no-slash/".into();
        assert!(config.validate().is_err());
    }
}

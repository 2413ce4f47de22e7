//! `[site]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [site]
//! title = "My Blog"
//! description = "Notes and photos"
//! url = "https://example.com"
//! token_env = "LOAM_TOKEN"    # env var holding the deploy token for `${token}`
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSectionConfig {
    /// Site title, available to the layout as `${title}` on the index page.
    pub title: String,

    /// Short site description.
    pub description: String,

    /// Canonical site URL.
    pub url: Option<String>,

    /// Name of the environment variable holding the deploy token exposed
    /// to the layout. The value itself is never stored in config.
    pub token_env: String,
}

impl Default for SiteSectionConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            url: None,
            token_env: "LOAM_TOKEN".into(),
        }
    }
}

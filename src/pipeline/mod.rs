//! Document transform pipeline.
//!
//! Each transform is a function from `(content, output path)` to content,
//! applied once per document during the build's render phase:
//!
//! ```text
//! rendered HTML -> responsive images -> class mangling + minification
//! ```
//!
//! Non-HTML output passes through both stages unchanged. The first stage's
//! only side effect is writing image artifacts; the second is pure.

pub mod transform;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::config::SiteConfig;
use crate::core::EnvContext;
use crate::image::ImageService;

pub use transform::{ClassNameMap, MediaError, Minify, ResponsiveImages};

/// The transform chain applied to every document.
pub struct Transforms {
    images: ResponsiveImages,
    minify: Minify,
}

impl Transforms {
    /// Assemble the chain for one build. Minification activates only in a
    /// production environment (and can be vetoed via `[build] minify`).
    pub fn new(
        config: &SiteConfig,
        env: &EnvContext,
        service: Arc<ImageService>,
        classnames: Option<Arc<ClassNameMap>>,
    ) -> Self {
        let active = env.is_production() && config.build.minify;
        Self {
            images: ResponsiveImages::new(service),
            minify: Minify::new(active, classnames),
        }
    }

    /// Run one document through the full chain.
    pub async fn apply(&self, content: String, output_path: &Path) -> Result<String> {
        let content = self.images.apply(content, output_path).await?;
        self.minify.apply(content, output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Environment;

    fn transforms(env: Environment) -> Transforms {
        let dir = std::env::temp_dir();
        let mut config = SiteConfig::default();
        config.root = dir.clone();
        config.build.content = dir.clone();
        config.build.output = dir.join("loam-test-out");
        let env = EnvContext {
            environment: env,
            token: None,
        };
        let service = Arc::new(ImageService::new(&config));
        Transforms::new(&config, &env, service, None)
    }

    #[tokio::test]
    async fn test_non_html_is_identity() {
        let chain = transforms(Environment::Production);
        let content = "<feed>  <!-- xml comment -->  </feed>".to_string();
        let result = chain
            .apply(content.clone(), Path::new("feed.xml"))
            .await
            .unwrap();
        assert_eq!(result, content);
    }

    #[tokio::test]
    async fn test_development_keeps_html_readable() {
        let chain = transforms(Environment::Development);
        let content = "<html><body>\n  <p>spaced   out</p>\n</body></html>".to_string();
        let result = chain
            .apply(content.clone(), Path::new("index.html"))
            .await
            .unwrap();
        assert_eq!(result, content);
    }

    #[tokio::test]
    async fn test_production_minifies() {
        let chain = transforms(Environment::Production);
        let content =
            "<html><body>\n  <p>spaced   out</p>\n  <!-- gone -->\n</body></html>".to_string();
        let result = chain
            .apply(content, Path::new("index.html"))
            .await
            .unwrap();
        assert!(!result.contains("<!--"));
        assert!(!result.contains("   "));
    }
}

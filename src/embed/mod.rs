//! Page layout with typed variable injection.
//!
//! A layout is plain HTML with `${...}` placeholders. Sites can provide
//! `_layout.html` at the content root; otherwise the embedded default is
//! used. Variable sets implement [`TemplateVars`] so rendering stays typed.

use anyhow::{Context, Result};

use crate::config::SiteConfig;

/// Built-in fallback layout.
const DEFAULT_LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>${title}</title>
${styles}
</head>
<body>
<main class="content">
${content}
${posts}
</main>
</body>
</html>
"#;

/// Trait for template variable sets
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// A loaded page layout.
pub struct Layout {
    content: String,
}

impl Layout {
    /// Load `_layout.html` from the content root, falling back to the
    /// embedded default.
    pub fn load(config: &SiteConfig) -> Result<Self> {
        let path = config.build.content.join("_layout.html");
        let content = if path.exists() {
            std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read layout {}", path.display()))?
        } else {
            DEFAULT_LAYOUT.to_string()
        };
        Ok(Self { content })
    }

    #[cfg(test)]
    pub fn from_str(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    pub fn render<V: TemplateVars>(&self, vars: &V) -> String {
        vars.apply(&self.content)
    }
}

/// Variables available to page layouts.
pub struct PageVars<'a> {
    pub title: &'a str,
    /// Rendered article HTML.
    pub content: &'a str,
    /// Stylesheet URL, when the stylesheet pipeline ran.
    pub styles_href: Option<&'a str>,
    /// Posts collection markup (index page only; empty elsewhere).
    pub posts: &'a str,
    /// Deploy token from the environment, empty when unset.
    pub token: &'a str,
}

impl TemplateVars for PageVars<'_> {
    fn apply(&self, content: &str) -> String {
        let styles = match self.styles_href {
            Some(href) => format!("<link rel=\"stylesheet\" href=\"{href}\">"),
            None => String::new(),
        };

        content
            .replace("${title}", &crate::utils::html::escape(self.title))
            .replace("${content}", self.content)
            .replace("${styles}", &styles)
            .replace("${posts}", self.posts)
            .replace("${token}", self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars<'a>() -> PageVars<'a> {
        PageVars {
            title: "Hello",
            content: "<p>body</p>",
            styles_href: Some("/assets/styles/site.css"),
            posts: "",
            token: "",
        }
    }

    #[test]
    fn test_default_layout_render() {
        let layout = Layout {
            content: DEFAULT_LAYOUT.to_string(),
        };
        let html = layout.render(&vars());

        assert!(html.contains("<title>Hello</title>"));
        assert!(html.contains("<p>body</p>"));
        assert!(html.contains("<link rel=\"stylesheet\" href=\"/assets/styles/site.css\">"));
        assert!(!html.contains("${"));
    }

    #[test]
    fn test_title_is_escaped() {
        let layout = Layout::from_str("<title>${title}</title>");
        let mut v = vars();
        v.title = "a < b";
        assert_eq!(layout.render(&v), "<title>a &lt; b</title>");
    }

    #[test]
    fn test_token_placeholder() {
        let layout = Layout::from_str("<meta name=\"token\" content=\"${token}\">");
        let mut v = vars();
        v.token = "secret";
        assert!(layout.render(&v).contains("content=\"secret\""));
    }

    #[test]
    fn test_missing_styles_renders_empty() {
        let layout = Layout::from_str("${styles}");
        let mut v = vars();
        v.styles_href = None;
        assert_eq!(layout.render(&v), "");
    }
}

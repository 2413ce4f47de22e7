//! Posts collection.
//!
//! Filters the scanned content set to documents under the posts directory
//! and reverses their (ascending, path-ordered) sequence, so the collection
//! runs most-recent-first under the date-prefixed filename convention.

use crate::config::SiteConfig;

use super::Page;

/// Build the posts collection from the full, path-sorted page set.
///
/// An empty match set yields an empty collection; ordering is stable and
/// deterministic for a given input set.
pub fn posts<'a>(pages: &'a [Page], config: &SiteConfig) -> Vec<&'a Page> {
    let posts_dir = &config.build.posts;
    let mut posts: Vec<&Page> = pages
        .iter()
        .filter(|page| page.rel.starts_with(posts_dir))
        .collect();
    posts.reverse();
    posts
}

/// Render the collection as an HTML list for the `${posts}` placeholder.
pub fn posts_html(posts: &[&Page]) -> String {
    if posts.is_empty() {
        return String::new();
    }

    let mut html = String::from("<ul class=\"post-list\">\n");
    for post in posts {
        let title = crate::utils::html::escape(&post.title()).into_owned();
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            post.url, title
        ));
    }
    html.push_str("</ul>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PageMeta;
    use std::path::{Path, PathBuf};

    fn page(rel: &str) -> Page {
        let rel = PathBuf::from(rel);
        let route = crate::utils::path::output_route(&rel);
        let url = crate::utils::path::route_url(&route);
        Page {
            source: PathBuf::from("/content").join(&rel),
            rel,
            route,
            url,
            meta: PageMeta::default(),
            body: String::new(),
        }
    }

    #[test]
    fn test_posts_reverse_chronological() {
        let config = SiteConfig::default();
        let pages = vec![
            page("index.md"),
            page("posts/2024-01-01-first.md"),
            page("posts/2024-02-01-second.md"),
            page("posts/2024-03-01-third.md"),
        ];

        let posts = posts(&pages, &config);
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].rel, Path::new("posts/2024-03-01-third.md"));
        assert_eq!(posts[1].rel, Path::new("posts/2024-02-01-second.md"));
        assert_eq!(posts[2].rel, Path::new("posts/2024-01-01-first.md"));
    }

    #[test]
    fn test_posts_excludes_other_content() {
        let config = SiteConfig::default();
        let pages = vec![page("about.md"), page("notes/scratch.md")];
        assert!(posts(&pages, &config).is_empty());
    }

    #[test]
    fn test_posts_empty_input() {
        let config = SiteConfig::default();
        let pages: Vec<Page> = Vec::new();
        assert!(posts(&pages, &config).is_empty());
        assert_eq!(posts_html(&[]), "");
    }

    #[test]
    fn test_posts_html_links() {
        let config = SiteConfig::default();
        let pages = vec![page("posts/2024-01-01-hello.md")];
        let collection = posts(&pages, &config);
        let html = posts_html(&collection);
        assert!(html.contains("<a href=\"/posts/2024-01-01-hello/\">"));
        assert!(html.contains("2024-01-01-hello"));
    }
}

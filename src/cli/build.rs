//! Build command: compile the content tree into the output directory.
//!
//! Pages render and transform concurrently; the posts collection, class
//! maps and layout are assembled once up front and shared read-only.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tokio::task::JoinSet;

use crate::assets;
use crate::config::SiteConfig;
use crate::content::{Page, collection, scan_content};
use crate::core::EnvContext;
use crate::embed::{Layout, PageVars};
use crate::image::ImageService;
use crate::{debug, log};
use crate::logger::ProgressLine;
use crate::markdown::{ClassMap, MarkdownOptions, render_markdown};
use crate::pipeline::Transforms;

/// Shared, read-only state for page rendering.
struct RenderContext {
    classmap: ClassMap,
    markdown_options: MarkdownOptions,
    layout: Layout,
    transforms: Transforms,
    posts_html: String,
    styles_href: Option<String>,
    token: Option<String>,
    site_title: String,
    output_dir: std::path::PathBuf,
}

/// Build the whole site.
pub async fn build_site(config: &SiteConfig, env: &EnvContext) -> Result<()> {
    let output_dir = config.build.output.clone();

    if config.build.clean && output_dir.exists() {
        std::fs::remove_dir_all(&output_dir)
            .with_context(|| format!("failed to clean {}", output_dir.display()))?;
    }
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    // Scan phase: content, collections, stylesheet, static assets
    let pages = scan_content(config)?;
    let posts = collection::posts(&pages, config);
    let posts_html = collection::posts_html(&posts);
    let post_count = posts.len();

    let stylesheet = assets::process_stylesheet(config, env)?;
    let assets_copied = assets::copy_static_assets(config)?;

    let classmap = match &config.build.markdown.class_map {
        Some(path) => ClassMap::load(&config.root_join(path))?,
        None => ClassMap::empty(),
    };
    if classmap.is_empty() {
        debug!("build"; "no markdown class map configured");
    }
    let layout = Layout::load(config)?;

    let (styles_href, classnames) = match stylesheet {
        Some(out) => (Some(out.href), out.classnames),
        None => (None, None),
    };

    let service = Arc::new(ImageService::new(config));
    let transforms = Transforms::new(config, env, service, classnames);

    let ctx = Arc::new(RenderContext {
        classmap,
        markdown_options: MarkdownOptions::all(),
        layout,
        transforms,
        posts_html,
        styles_href,
        token: env.token.clone(),
        site_title: config.site.title.clone(),
        output_dir,
    });

    // Render phase: every page concurrently
    let page_count = pages.len();
    let progress = Arc::new(ProgressLine::new(&[("pages", page_count)]));

    let mut tasks = JoinSet::new();
    for page in pages {
        let ctx = Arc::clone(&ctx);
        let progress = Arc::clone(&progress);
        tasks.spawn(async move {
            let rel = page.rel.display().to_string();
            match render_page(&page, &ctx).await {
                Ok(()) => {
                    progress.inc("pages");
                    Ok(())
                }
                Err(err) => Err((rel, err)),
            }
        });
    }

    let mut failures: Vec<(String, anyhow::Error)> = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(failure)) => failures.push(failure),
            Err(err) => failures.push(("<render task>".into(), err.into())),
        }
    }

    if let Ok(progress) = Arc::try_unwrap(progress) {
        progress.finish();
    }

    log!(
        "build";
        "{} pages ({} posts), {} assets copied",
        page_count - failures.len(),
        post_count,
        assets_copied
    );

    if !failures.is_empty() {
        failures.sort_by(|a, b| a.0.cmp(&b.0));
        for (rel, err) in &failures {
            log!("error"; "{rel}: {err:#}");
        }
        bail!("{} page(s) failed to build", failures.len());
    }

    Ok(())
}

/// Render one page: markdown -> layout -> transforms -> disk.
async fn render_page(page: &Page, ctx: &RenderContext) -> Result<()> {
    let article = render_markdown(&page.body, &ctx.classmap, &ctx.markdown_options);

    let is_index = page.route == Path::new("index.html");
    let title = if is_index && !ctx.site_title.is_empty() {
        ctx.site_title.clone()
    } else {
        page.title()
    };

    let vars = PageVars {
        title: &title,
        content: &article,
        styles_href: ctx.styles_href.as_deref(),
        posts: if is_index { ctx.posts_html.as_str() } else { "" },
        token: ctx.token.as_deref().unwrap_or(""),
    };
    let html = ctx.layout.render(&vars);

    let html = ctx
        .transforms
        .apply(html, &page.route)
        .await
        .with_context(|| format!("transform failed for {}", page.source.display()))?;

    let target = ctx.output_dir.join(&page.route);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(&target, html)
        .with_context(|| format!("failed to write {}", target.display()))?;

    Ok(())
}

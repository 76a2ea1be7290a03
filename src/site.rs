//! Markdown blog assembly used by the command line.
//!
//! Turns a content directory into a registered [`Generator`]:
//!
//! ```text
//! content/
//! ├── routegen.toml        # Site config (optional)
//! ├── posts/*.md           # → /post/{slug}/, plus /page/{n}/ listings
//! ├── pages/*.md           # → /{slug}/
//! ├── assets/              # → /assets/ (style.css is linked when present)
//! └── 404.html             # → /404.html
//! ```
//!
//! Posts need front matter with at least a `title`; a post whose front
//! matter is missing or invalid is reported at commit like any other route
//! error. Posts with `draft: true` are skipped. Listings show posts newest
//! first by `date`, then by slug.

use crate::config::SiteConfig;
use crate::generate::Generator;
use crate::markdown::{MarkdownDocument, MarkdownError, MarkdownProcessor};
use crate::render::stylesheet;
use crate::routes::Routes;
use maud::{Markup, html};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

pub const POSTS_DIR: &str = "posts";
pub const PAGES_DIR: &str = "pages";
pub const ASSETS_DIR: &str = "assets";
pub const NOT_FOUND_PAGE: &str = "404.html";

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("markdown error: {0}")]
    Markdown(#[from] MarkdownError),
}

/// Post front matter.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMeta {
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub draft: bool,
}

/// Optional page front matter.
#[derive(Debug, Clone, Default, Deserialize)]
struct PageMeta {
    #[serde(default)]
    title: Option<String>,
}

/// One entry of a post listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub date: Option<String>,
    pub summary: Option<String>,
}

/// Build a generator for the content directory named by `config`.
///
/// `ROUTEGEN_DEST` / `ROUTEGEN_SRC` take precedence over the config roots.
pub fn build(config: SiteConfig) -> Result<Generator, SiteError> {
    let per_page = config.pagination.per_page;
    assemble(Generator::new(config), per_page)
}

/// Register the content found under `g`'s source root, listing `per_page`
/// posts per page.
pub fn assemble(mut g: Generator, per_page: usize) -> Result<Generator, SiteError> {
    let root = g.source().to_path_buf();
    let markdown = MarkdownProcessor::default();

    register_static(&mut g, &root);

    let posts = load_dir(&markdown, &root.join(POSTS_DIR))?
        .into_iter()
        .filter(|doc| !is_draft(doc))
        .collect::<Vec<_>>();
    let summaries = summarize(&posts);

    let posts_added = Routes::with_slug_fn("/post/{s}", posts, |doc| doc.slug.clone()).add_to(
        &mut g,
        |p| {
            let meta: PostMeta = p.item().front_matter()?;
            p.set_title(meta.title.clone());
            Ok(post_page(&meta, p.item()))
        },
    );

    let pages = load_dir(&markdown, &root.join(PAGES_DIR))?;
    let pages_added = Routes::with_slug_fn("/{s}", pages, |doc| doc.slug.clone())
        .title("{s}")
        .add_to(&mut g, |p| {
            let meta = match p.item().raw_front_matter() {
                Some(_) => p.item().front_matter::<PageMeta>()?,
                None => PageMeta::default(),
            };
            if let Some(title) = meta.title {
                p.set_title(title);
            }
            Ok(p.item().content_markup())
        });

    let latest: Vec<PostSummary> = summaries.iter().take(per_page).cloned().collect();
    let has_more = summaries.len() > per_page;
    g.add_route("/", index_page(&latest, has_more));

    let listings = Routes::paginated("/page/{s}", summaries, per_page)
        .title("Page {s}")
        .add_to(&mut g, |p| Ok(listing_page(p.item())));

    info!(
        posts = posts_added,
        pages = pages_added,
        listings,
        "site assembled"
    );
    Ok(g)
}

fn register_static(g: &mut Generator, root: &Path) {
    let assets = root.join(ASSETS_DIR);
    if assets.is_dir() {
        g.copy_dir(ASSETS_DIR, "/");
        if assets.join("style.css").is_file() {
            g.head.add(stylesheet("/assets/style.css"));
        }
    }
    if root.join(NOT_FOUND_PAGE).is_file() {
        g.copy_file(NOT_FOUND_PAGE, "/");
    }
}

fn load_dir(
    markdown: &MarkdownProcessor,
    dir: &Path,
) -> Result<Vec<MarkdownDocument>, MarkdownError> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "no content directory");
        return Ok(Vec::new());
    }
    markdown.parse_dir(dir)
}

fn is_draft(doc: &MarkdownDocument) -> bool {
    #[derive(Deserialize)]
    struct Draft {
        #[serde(default)]
        draft: bool,
    }
    doc.front_matter::<Draft>().is_ok_and(|d| d.draft)
}

/// Listing entries for posts whose front matter decodes, newest first.
fn summarize(posts: &[MarkdownDocument]) -> Vec<PostSummary> {
    let mut summaries: Vec<PostSummary> = posts
        .iter()
        .filter_map(|doc| {
            let meta: PostMeta = doc.front_matter().ok()?;
            Some(PostSummary {
                slug: doc.slug.clone(),
                title: meta.title,
                date: meta.date,
                summary: meta.summary,
            })
        })
        .collect();
    summaries.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
    summaries
}

fn post_page(meta: &PostMeta, doc: &MarkdownDocument) -> Markup {
    html! {
        article.post {
            header {
                h1 { (meta.title) }
                @if let Some(date) = &meta.date {
                    time datetime=(date) { (date) }
                }
            }
            @if !doc.toc.is_empty() {
                nav.toc { (doc.toc_markup()) }
            }
            (doc.content_markup())
        }
    }
}

fn post_list(posts: &[PostSummary]) -> Markup {
    html! {
        ul.posts {
            @for post in posts {
                li {
                    a href={ "/post/" (post.slug) "/" } { (post.title) }
                    @if let Some(date) = &post.date {
                        " " time datetime=(date) { (date) }
                    }
                    @if let Some(summary) = &post.summary {
                        p { (summary) }
                    }
                }
            }
        }
    }
}

fn index_page(latest: &[PostSummary], has_more: bool) -> Markup {
    html! {
        main {
            (post_list(latest))
            @if has_more {
                a.more href="/page/2/" { "Older posts" }
            }
        }
    }
}

fn listing_page(page: &crate::pagination::Pagination<PostSummary>) -> Markup {
    html! {
        main {
            (post_list(&page.chunk))
            nav.pagination {
                @if let Some(prev) = page.prev() {
                    a rel="prev" href={ "/page/" (prev) "/" } { "Newer" }
                }
                span { (page.current) " / " (page.total) }
                @if let Some(next) = page.next() {
                    a rel="next" href={ "/page/" (next) "/" } { "Older" }
                }
            }
        }
    }
}

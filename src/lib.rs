//! # routegen
//!
//! A static site generator built around declared routes. Every output file is
//! a route: a path bound to a component. Families of pages (posts, tag pages,
//! paginated listings) are declared once as a route set (a path template plus
//! the items to expand it with) and nothing is written until the whole site
//! has been registered.
//!
//! # Architecture: Register, Then Commit
//!
//! ```text
//! 1. Register   routes, route sets, copies  →  Generator   (no disk writes)
//! 2. Commit     Generator                   →  dist/       (one pass)
//! ```
//!
//! Registration never fails at the call site. Problems found while expanding a
//! route set (a template without `{s}`, a zero page size, a callback error)
//! are recorded and reported together when the site is committed, before
//! anything is written. Two routes claiming the same output file are refused
//! the same way.
//!
//! ```rust,ignore
//! use routegen::{Generator, Routes, SiteConfig};
//! use maud::html;
//!
//! let mut g = Generator::new(SiteConfig::default());
//! g.add_route("/", html! { h1 { "Home" } });
//! Routes::from_slugs("/post/{s}", ["first", "second"])
//!     .title("Post {s}")
//!     .add_to(&mut g, |p| Ok(html! { h1 { (p.slug()) } }));
//! g.commit()?;
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`generate`] | The [`Generator`]: route registry, pending copies, titles, commit |
//! | [`routes`] | Route sets: template + items + callback → one route per item |
//! | [`route`] | A single route: path, title, component, layout override |
//! | [`pagination`] | Splitting item lists into numbered pages |
//! | [`error`] | Registration errors and their aggregation |
//! | [`naming`] | Path normalization, terminal files, slug substitution |
//! | [`render`] | `Component` and `Layout` traits, the default HTML shell |
//! | [`markdown`] | Markdown files with front matter and a table of contents |
//! | [`copy`] | Recursive, mode-preserving static file copies |
//! | [`root`] | Confinement of all writes to the destination directory |
//! | [`config`] | `routegen.toml` loading, validation, environment overrides |
//! | [`site`] | Markdown blog assembly used by the command line |
//! | [`output`] | CLI output formatting for `build` and `check` |
//!
//! # Design Decisions
//!
//! ## Maud Components
//!
//! Pages are rendered with [Maud](https://maud.lambda.xyz/). A route's
//! component is anything implementing [`render::Component`]; `maud::Markup`
//! is one, so `html! { ... }` can be registered directly. The generator never
//! inspects what it renders.
//!
//! ## Directory Routes
//!
//! `/about` is written as `about/index.html` so URLs stay extension-free on any
//! static file server. A path whose last segment has an extension (`feed.xml`,
//! `404.html`) is written as-is.

pub mod config;
pub mod copy;
pub mod error;
pub mod generate;
pub mod markdown;
pub mod naming;
pub mod output;
pub mod pagination;
pub mod render;
pub mod root;
pub mod route;
pub mod routes;
pub mod site;

pub use config::{SiteConfig, TitleStyle};
pub use generate::{CommitError, CommitReport, Generator};
pub use pagination::Pagination;
pub use route::Route;
pub use routes::{RouteParam, Routes};

#[cfg(test)]
pub(crate) mod test_helpers;

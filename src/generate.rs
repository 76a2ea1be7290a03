//! The generator: route registry, pending copies, and the single commit.
//!
//! A [`Generator`] collects everything a site consists of and writes nothing
//! until [`commit`](Generator::commit) is called:
//!
//! ```rust,ignore
//! let mut g = Generator::new(config);
//! g.head.add(stylesheet("/assets/style.css"));
//! g.copy_dir("assets", "/");
//! g.add_route("/", html! { h1 { "Home" } }).set_title("Home");
//! Routes::from_slugs("/post/{s}", slugs).add_to(&mut g, |p| render_post(p));
//! let report = g.commit()?;
//! ```
//!
//! ## Commit
//!
//! Commit consumes the generator. Before touching the disk it checks that no
//! registration recorded an error and that no two routes write the same file.
//! It then, in order:
//!
//! 1. creates the destination directory
//! 2. performs directory copies, then file copies, in registration order
//! 3. renders each route, in registration order, to its output file
//!
//! The first failure aborts the commit. Files already written stay.
//!
//! ## Titles
//!
//! | route                 | page title                          |
//! |-----------------------|-------------------------------------|
//! | `no_title()`          | empty                               |
//! | empty title           | site name                           |
//! | `"About"`             | composed by the configured style    |

use crate::config::{SiteConfig, TitleStyle};
use crate::copy::{self, CopyError};
use crate::error::{ErrorAggregator, ExpandError, RouteErrors};
use crate::naming;
use crate::render::{
    self, BoxError, Component, Fragments, RenderContext, RenderError, render_to_markup,
};
use crate::root::{OutputRoot, RootError};
use crate::route::Route;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum CommitError {
    #[error(transparent)]
    Routes(#[from] RouteErrors),
    #[error("duplicate output files: {}", list_conflicts(.0))]
    Conflicts(Vec<OutputConflict>),
    #[error("cannot create destination {}: {source}", .path.display())]
    Destination { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Root(#[from] RootError),
    #[error("copy {} to {}: {source}", .src.display(), .dst.display())]
    Copy {
        src: PathBuf,
        dst: PathBuf,
        source: CopyError,
    },
    #[error("render \"{path}\": {source}")]
    Render { path: String, source: RenderError },
}

/// An output file claimed by more than one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputConflict {
    pub file: PathBuf,
    /// Paths of the claiming routes, in registration order.
    pub routes: Vec<String>,
}

impl fmt::Display for OutputConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (claimed by {} routes)",
            self.file.display(),
            self.routes.len()
        )
    }
}

fn list_conflicts(conflicts: &[OutputConflict]) -> String {
    conflicts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyKind {
    Directory,
    File,
}

/// A copy performed by a commit.
#[derive(Debug, Clone, Serialize)]
pub struct CopiedEntry {
    pub kind: CopyKind,
    pub source: PathBuf,
    /// Relative to the destination.
    pub destination: PathBuf,
    /// Number of files copied.
    pub files: usize,
}

/// A page planned or written by a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageEntry {
    /// Normalized route path.
    pub route: String,
    /// Output file, relative to the destination.
    pub file: PathBuf,
    /// Resolved page title.
    pub title: String,
}

/// What a successful commit did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommitReport {
    pub destination: PathBuf,
    pub copies: Vec<CopiedEntry>,
    pub pages: Vec<PageEntry>,
}

#[derive(Debug)]
struct PendingCopy {
    source: PathBuf,
    destination: PathBuf,
}

/// Site under construction.
pub struct Generator {
    /// Fragments appended to `<head>` of every default shell.
    pub head: Fragments,
    /// Fragments appended to `<body>` of every default shell, after the route.
    pub body: Fragments,
    source: PathBuf,
    destination: PathBuf,
    site_name: String,
    lang: String,
    title_style: TitleStyle,
    default_shell: bool,
    routes: Vec<Route>,
    dir_copies: Vec<PendingCopy>,
    file_copies: Vec<PendingCopy>,
    errors: ErrorAggregator,
}

impl Generator {
    /// Build a generator from `config`, with `ROUTEGEN_DEST` / `ROUTEGEN_SRC`
    /// taking precedence over its roots.
    pub fn new(config: SiteConfig) -> Self {
        Self::with_config(config.apply_env())
    }

    /// Build a generator from `config` exactly as given.
    pub fn with_config(config: SiteConfig) -> Self {
        let source = config.source_root();
        Self {
            head: Fragments::default(),
            body: Fragments::default(),
            source,
            destination: config.destination,
            site_name: config.site_name,
            lang: config.lang,
            title_style: config.title_style,
            default_shell: config.default_shell,
            routes: Vec::new(),
            dir_copies: Vec::new(),
            file_copies: Vec::new(),
            errors: ErrorAggregator::default(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn title_style(&self) -> TitleStyle {
        self.title_style
    }

    pub fn set_title_style(&mut self, style: TitleStyle) {
        self.title_style = style;
    }

    /// Wrap routes without a layout in the default shell. On by default.
    pub fn set_default_shell(&mut self, enabled: bool) {
        self.default_shell = enabled;
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn errors(&self) -> &ErrorAggregator {
        &self.errors
    }

    pub(crate) fn record_error(&mut self, key: impl Into<String>, err: ExpandError) {
        self.errors.record(key, err);
    }

    /// Register a route and return it for further configuration.
    pub fn add_route(&mut self, path: &str, component: impl Component + 'static) -> &mut Route {
        let route = Route::new(path, Box::new(component));
        debug!(route = %route.path(), "route registered");
        self.routes.push(route);
        let last = self.routes.len() - 1;
        &mut self.routes[last]
    }

    /// Register a route whose component is produced by a fallible callback.
    ///
    /// A failing callback is recorded against `path` and no route is added.
    pub fn add_route_with<C, F>(&mut self, path: &str, build: F) -> Option<&mut Route>
    where
        C: Component + 'static,
        F: FnOnce() -> Result<C, BoxError>,
    {
        match build() {
            Ok(component) => Some(self.add_route(path, component)),
            Err(err) => {
                self.record_error(path, ExpandError::callback(err));
                None
            }
        }
    }

    /// Copy the file `src` into `dst_dir` on commit, keeping its name.
    ///
    /// A relative `src` is resolved against the source root; `dst_dir` is
    /// relative to the destination.
    pub fn copy_file(&mut self, src: impl AsRef<Path>, dst_dir: &str) {
        let copy = self.pending_copy(src.as_ref(), dst_dir);
        debug!(
            src = %copy.source.display(),
            dst = %copy.destination.display(),
            "file copy registered"
        );
        self.file_copies.push(copy);
    }

    /// Copy the directory `src` into `dst_dir` on commit, keeping its name.
    ///
    /// Resolution follows [`copy_file`](Self::copy_file).
    pub fn copy_dir(&mut self, src: impl AsRef<Path>, dst_dir: &str) {
        let copy = self.pending_copy(src.as_ref(), dst_dir);
        debug!(
            src = %copy.source.display(),
            dst = %copy.destination.display(),
            "directory copy registered"
        );
        self.dir_copies.push(copy);
    }

    fn pending_copy(&self, src: &Path, dst_dir: &str) -> PendingCopy {
        let source = self.source.join(src);
        let mut destination = PathBuf::from(naming::normalize_path(dst_dir));
        if let Some(name) = src.file_name() {
            destination.push(name);
        }
        PendingCopy {
            source,
            destination,
        }
    }

    /// Page title for `route` under this generator's site name and style.
    pub fn resolve_title(&self, route: &Route) -> String {
        if route.is_title_suppressed() {
            String::new()
        } else if route.title().is_empty() {
            self.site_name.clone()
        } else {
            self.title_style.compose(&self.site_name, route.title())
        }
    }

    /// Every page a commit would write, in order.
    pub fn planned_pages(&self) -> Vec<PageEntry> {
        self.routes
            .iter()
            .map(|route| PageEntry {
                route: route.path().to_string(),
                file: route.output_file(),
                title: self.resolve_title(route),
            })
            .collect()
    }

    /// Run the commit gate without writing anything.
    pub fn check(&self) -> Result<(), CommitError> {
        self.errors.check()?;

        let mut claims: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();
        for route in &self.routes {
            claims
                .entry(route.output_file())
                .or_default()
                .push(route.path().to_string());
        }
        let conflicts: Vec<OutputConflict> = claims
            .into_iter()
            .filter(|(_, routes)| routes.len() > 1)
            .map(|(file, routes)| OutputConflict { file, routes })
            .collect();

        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(CommitError::Conflicts(conflicts))
        }
    }

    /// Write the site.
    pub fn commit(self) -> Result<CommitReport, CommitError> {
        self.check()?;

        fs::create_dir_all(&self.destination).map_err(|source| CommitError::Destination {
            path: self.destination.clone(),
            source,
        })?;
        let root = OutputRoot::open(&self.destination)?;
        let mut report = CommitReport {
            destination: self.destination.clone(),
            ..CommitReport::default()
        };

        for copy in &self.dir_copies {
            let dst = root.create_dir_all(&copy.destination)?;
            let files = copy::copy_dir(&copy.source, &dst).map_err(|source| CommitError::Copy {
                src: copy.source.clone(),
                dst: dst.clone(),
                source,
            })?;
            debug!(src = %copy.source.display(), files, "directory copied");
            report.copies.push(CopiedEntry {
                kind: CopyKind::Directory,
                source: copy.source.clone(),
                destination: copy.destination.clone(),
                files,
            });
        }

        for copy in &self.file_copies {
            let dst = root.prepare_file(&copy.destination)?;
            copy::copy_file(&copy.source, &dst).map_err(|source| CommitError::Copy {
                src: copy.source.clone(),
                dst: dst.clone(),
                source,
            })?;
            debug!(src = %copy.source.display(), "file copied");
            report.copies.push(CopiedEntry {
                kind: CopyKind::File,
                source: copy.source.clone(),
                destination: copy.destination.clone(),
                files: 1,
            });
        }

        for route in &self.routes {
            let page = self.write_route(&root, route)?;
            debug!(route = %page.route, file = %page.file.display(), "page written");
            report.pages.push(page);
        }

        info!(
            destination = %self.destination.display(),
            pages = report.pages.len(),
            copies = report.copies.len(),
            "site committed"
        );
        Ok(report)
    }

    fn write_route(&self, root: &OutputRoot, route: &Route) -> Result<PageEntry, CommitError> {
        let file = route.output_file();
        let title = self.resolve_title(route);
        let render_err = |source| CommitError::Render {
            path: route.path().to_string(),
            source,
        };

        let mut out = BufWriter::new(root.create_file(&file)?);
        self.render_route(route, &title, &mut out).map_err(render_err)?;
        out.flush().map_err(|e| render_err(RenderError::Io(e)))?;

        Ok(PageEntry {
            route: route.path().to_string(),
            file,
            title,
        })
    }

    fn render_route(
        &self,
        route: &Route,
        title: &str,
        out: &mut dyn Write,
    ) -> Result<(), RenderError> {
        let ctx = RenderContext {
            title,
            route_title: route.title(),
            lang: &self.lang,
        };

        if let Some(layout) = route.layout() {
            let children = render_to_markup(route.component(), &ctx)?;
            out.write_all(layout.wrap(&ctx, children).0.as_bytes())?;
        } else if self.default_shell {
            let page = render::render_shell(&ctx, &self.head, route.component(), &self.body)?;
            out.write_all(page.0.as_bytes())?;
        } else {
            route.component().render(&ctx, out)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("source", &self.source)
            .field("destination", &self.destination)
            .field("site_name", &self.site_name)
            .field("routes", &self.routes.len())
            .field("errors", &self.errors.len())
            .finish_non_exhaustive()
    }
}

//! A single output route.

use crate::naming;
use crate::render::{Component, Layout, RenderContext};
use maud::Markup;
use std::fmt;
use std::path::PathBuf;

/// One output path bound to one component.
///
/// Routes are created by [`Generator::add_route`](crate::generate::Generator::add_route)
/// or by route-set expansion and configured through the returned `&mut Route`:
///
/// ```rust,ignore
/// generator
///     .add_route("/about", html! { h1 { "About" } })
///     .set_title("About Us");
/// ```
///
/// The title stored here is the route's own title. Composition with the site
/// name happens at commit time.
pub struct Route {
    path: String,
    title: String,
    component: Box<dyn Component>,
    layout: Option<Box<dyn Layout>>,
    suppress_title: bool,
}

impl Route {
    pub(crate) fn new(path: &str, component: Box<dyn Component>) -> Self {
        Self {
            path: naming::normalize_path(path),
            title: String::new(),
            component,
            layout: None,
            suppress_title: false,
        }
    }

    /// Set the route title. An empty title falls back to the site name.
    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = title.into();
        self
    }

    /// Replace the default shell for this route.
    pub fn set_layout<F>(&mut self, layout: F) -> &mut Self
    where
        F: Fn(&RenderContext<'_>, Markup) -> Markup + 'static,
    {
        self.layout = Some(Box::new(layout));
        self
    }

    /// Like [`set_layout`](Self::set_layout), for named [`Layout`] types.
    pub fn set_layout_with(&mut self, layout: impl Layout + 'static) -> &mut Self {
        self.layout = Some(Box::new(layout));
        self
    }

    /// Render this route with an empty title, whatever the title style.
    pub fn no_title(&mut self) -> &mut Self {
        self.suppress_title = true;
        self
    }

    /// Normalized path, without the leading `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_title_suppressed(&self) -> bool {
        self.suppress_title
    }

    pub fn is_terminal_file(&self) -> bool {
        naming::is_terminal_file(&self.path)
    }

    /// File this route is written to, relative to the output root.
    pub fn output_file(&self) -> PathBuf {
        naming::output_file(&self.path)
    }

    pub(crate) fn component(&self) -> &dyn Component {
        self.component.as_ref()
    }

    pub(crate) fn layout(&self) -> Option<&dyn Layout> {
        self.layout.as_deref()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("title", &self.title)
            .field("layout", &self.layout.is_some())
            .field("suppress_title", &self.suppress_title)
            .finish_non_exhaustive()
    }
}

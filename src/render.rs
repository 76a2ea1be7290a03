//! Components, layouts, and the default page shell.
//!
//! The generator never looks inside what it renders. A route's artifact is a
//! [`Component`]: anything that can write itself to an output sink given a
//! [`RenderContext`]. [`Markup`] from [maud](https://maud.lambda.xyz/) is the
//! everyday component; [`from_fn`] lifts a closure that wants to see the
//! context (for example the route title) and [`Join`] concatenates several.
//!
//! ## Shell
//!
//! Unless disabled, every route is wrapped in the default shell:
//!
//! ```text
//! <!DOCTYPE html>
//! <html lang="{lang}">
//!   <head> meta, <title>{title}</title>, head fragments </head>
//!   <body> route component, body fragments </body>
//! </html>
//! ```
//!
//! A route can replace the shell with its own [`Layout`], which receives the
//! rendered component as its children.

use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::io::{self, Write};
use std::string::FromUtf8Error;
use thiserror::Error;

/// Boxed error returned by user callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("component produced invalid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
    #[error("component error: {0}")]
    Component(BoxError),
}

impl RenderError {
    pub fn component(err: impl Into<BoxError>) -> Self {
        Self::Component(err.into())
    }
}

/// Per-render values visible to components.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Final page title (site name composed in, possibly empty).
    pub title: &'a str,
    /// Title set on the route itself, before composition.
    pub route_title: &'a str,
    /// Document language.
    pub lang: &'a str,
}

/// Something that renders into an output sink.
pub trait Component {
    fn render(&self, ctx: &RenderContext<'_>, out: &mut dyn Write) -> Result<(), RenderError>;
}

impl Component for Markup {
    fn render(&self, _ctx: &RenderContext<'_>, out: &mut dyn Write) -> Result<(), RenderError> {
        out.write_all(self.0.as_bytes())?;
        Ok(())
    }
}

impl<C: Component + ?Sized> Component for Box<C> {
    fn render(&self, ctx: &RenderContext<'_>, out: &mut dyn Write) -> Result<(), RenderError> {
        (**self).render(ctx, out)
    }
}

/// Pre-escaped HTML used verbatim.
pub fn raw(html: impl Into<String>) -> Markup {
    PreEscaped(html.into())
}

/// `<link rel="stylesheet">` fragment for the document head.
pub fn stylesheet(href: &str) -> Markup {
    html! { link rel="stylesheet" href=(href); }
}

/// Deferred `<script>` fragment.
pub fn script(src: &str) -> Markup {
    html! { script src=(src) defer {} }
}

/// Component built from a closure over the render context.
pub struct FnComponent<F>(F);

pub fn from_fn<F>(f: F) -> FnComponent<F>
where
    F: Fn(&RenderContext<'_>) -> Markup,
{
    FnComponent(f)
}

impl<F> Component for FnComponent<F>
where
    F: Fn(&RenderContext<'_>) -> Markup,
{
    fn render(&self, ctx: &RenderContext<'_>, out: &mut dyn Write) -> Result<(), RenderError> {
        (self.0)(ctx).render(ctx, out)
    }
}

/// Several components rendered one after another.
#[derive(Default)]
pub struct Join(Vec<Box<dyn Component>>);

impl Join {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, component: impl Component + 'static) -> Self {
        self.push(component);
        self
    }

    pub fn push(&mut self, component: impl Component + 'static) {
        self.0.push(Box::new(component));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Component for Join {
    fn render(&self, ctx: &RenderContext<'_>, out: &mut dyn Write) -> Result<(), RenderError> {
        for component in &self.0 {
            component.render(ctx, out)?;
        }
        Ok(())
    }
}

/// Replacement for the default shell. Receives the rendered route component.
pub trait Layout {
    fn wrap(&self, ctx: &RenderContext<'_>, children: Markup) -> Markup;
}

impl<F> Layout for F
where
    F: Fn(&RenderContext<'_>, Markup) -> Markup,
{
    fn wrap(&self, ctx: &RenderContext<'_>, children: Markup) -> Markup {
        self(ctx, children)
    }
}

/// Ordered fragments injected into every shell, in the head or the body.
#[derive(Default)]
pub struct Fragments(Vec<Box<dyn Component>>);

impl Fragments {
    pub fn add(&mut self, component: impl Component + 'static) {
        self.0.push(Box::new(component));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn render_into(&self, ctx: &RenderContext<'_>, out: &mut dyn Write) -> Result<(), RenderError> {
        for fragment in &self.0 {
            fragment.render(ctx, out)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Fragments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fragments({})", self.0.len())
    }
}

/// Render a component to an in-memory [`Markup`].
pub fn render_to_markup(
    component: &dyn Component,
    ctx: &RenderContext<'_>,
) -> Result<Markup, RenderError> {
    let mut buf = Vec::new();
    component.render(ctx, &mut buf)?;
    Ok(PreEscaped(String::from_utf8(buf)?))
}

/// Wrap a component in the default shell.
///
/// The component comes first in `<body>`, followed by the body fragments.
pub fn render_shell(
    ctx: &RenderContext<'_>,
    head: &Fragments,
    component: &dyn Component,
    body: &Fragments,
) -> Result<Markup, RenderError> {
    let mut head_buf = Vec::new();
    head.render_into(ctx, &mut head_buf)?;

    let mut body_buf = Vec::new();
    component.render(ctx, &mut body_buf)?;
    body.render_into(ctx, &mut body_buf)?;

    Ok(base_document(
        ctx.title,
        ctx.lang,
        PreEscaped(String::from_utf8(head_buf)?),
        PreEscaped(String::from_utf8(body_buf)?),
    ))
}

/// Renders the base HTML document structure
fn base_document(title: &str, lang: &str, head: Markup, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                @if !title.is_empty() {
                    title { (title) }
                }
                (head)
            }
            body {
                (body)
            }
        }
    }
}

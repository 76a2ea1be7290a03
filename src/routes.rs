//! Route sets: one path template, many items, one route per item.
//!
//! A [`Routes`] value describes a family of pages sharing a path template such
//! as `/post/{s}`. Expanding it against a [`Generator`] calls the callback once
//! per item, in order, and registers the returned component under the
//! template with `{s}` replaced by the item's slug.
//!
//! ```rust,ignore
//! Routes::from_slugs("/post/{s}", ["first", "second"])
//!     .title("Post {s}")
//!     .add_to(&mut generator, |p| Ok(html! { h1 { (p.slug()) } }));
//! // post/first/index.html  "Post first"
//! // post/second/index.html "Post second"
//! ```
//!
//! ## Slugs
//!
//! Each item starts with a seeded slug, which the callback may replace with
//! [`RouteParam::set_slug`]:
//!
//! | constructor                  | seed                       |
//! |------------------------------|----------------------------|
//! | [`Routes::from_slugs`]       | the string itself          |
//! | [`Routes::new`]              | 1-based position           |
//! | [`Routes::with_slug_fn`]     | the given function         |
//! | [`Routes::paginated`]        | page number                |
//!
//! A trailing extension is stripped before substitution (`report.json` →
//! `report`).
//!
//! ## Errors
//!
//! Expansion never fails at the call site. A template without `{s}`, an
//! invalid pagination size or a failing callback is recorded against the
//! template and reported by [`Generator::commit`]. A failing callback stops
//! its own expansion; routes registered before it stay.

use crate::error::ExpandError;
use crate::generate::Generator;
use crate::naming;
use crate::pagination::{self, Pagination};
use crate::render::{BoxError, Component};
use tracing::debug;

/// Per-item view handed to the expansion callback.
pub struct RouteParam<'a, T> {
    item: &'a T,
    index: usize,
    slug: String,
    title: Option<String>,
}

impl<'a, T> RouteParam<'a, T> {
    pub fn item(&self) -> &'a T {
        self.item
    }

    /// 0-based position of the item in its set.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn set_slug(&mut self, slug: impl Into<String>) {
        self.slug = slug.into();
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Title for this item only. Takes precedence over the set's title template
    /// and may itself contain `{s}`.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }
}

enum SlugSeed<T> {
    Position,
    Item(Box<dyn Fn(&T) -> String>),
}

/// Descriptor for a family of routes sharing a path template.
///
/// Consumed by [`add_to`](Self::add_to).
pub struct Routes<T> {
    path: String,
    title: Option<String>,
    items: Vec<T>,
    seed: SlugSeed<T>,
    deferred: Option<ExpandError>,
}

impl Routes<String> {
    /// A set whose items are the slugs themselves.
    pub fn from_slugs<I, S>(path: impl Into<String>, slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_slug_fn(
            path,
            slugs.into_iter().map(Into::into).collect(),
            |s: &String| s.clone(),
        )
    }
}

impl<T> Routes<T> {
    /// A set of arbitrary items, slugged by 1-based position.
    pub fn new(path: impl Into<String>, items: Vec<T>) -> Self {
        Self {
            path: path.into(),
            title: None,
            items,
            seed: SlugSeed::Position,
            deferred: None,
        }
    }

    /// A set of arbitrary items, slugged by `slug`.
    pub fn with_slug_fn<F>(path: impl Into<String>, items: Vec<T>, slug: F) -> Self
    where
        F: Fn(&T) -> String + 'static,
    {
        Self {
            seed: SlugSeed::Item(Box::new(slug)),
            ..Self::new(path, items)
        }
    }

    /// Title template applied to every route, `{s}` replaced by the slug.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Expand into `generator`, calling `callback` once per item.
    ///
    /// Returns the number of routes registered.
    pub fn add_to<C, F>(self, generator: &mut Generator, mut callback: F) -> usize
    where
        C: Component + 'static,
        F: FnMut(&mut RouteParam<'_, T>) -> Result<C, BoxError>,
    {
        let Routes {
            path,
            title,
            items,
            seed,
            deferred,
        } = self;

        if let Some(err) = deferred {
            generator.record_error(path, err);
            return 0;
        }
        if !naming::has_placeholder(&path) {
            generator.record_error(path.clone(), ExpandError::MissingPlaceholder(path));
            return 0;
        }

        let mut added = 0;
        for (index, item) in items.iter().enumerate() {
            let slug = match &seed {
                SlugSeed::Position => (index + 1).to_string(),
                SlugSeed::Item(f) => f(item),
            };
            let mut param = RouteParam {
                item,
                index,
                slug,
                title: None,
            };

            let component = match callback(&mut param) {
                Ok(c) => c,
                Err(err) => {
                    generator.record_error(path.clone(), ExpandError::callback(err));
                    break;
                }
            };

            let slug = naming::strip_extension(&param.slug);
            let route_path = naming::substitute(&path, slug);
            let route_title = param
                .title
                .as_deref()
                .or(title.as_deref())
                .map(|t| naming::substitute(t, slug))
                .unwrap_or_default();

            debug!(template = %path, route = %route_path, "expanded route");
            generator
                .add_route(&route_path, component)
                .set_title(route_title);
            added += 1;
        }

        debug!(template = %path, routes = added, "route set expanded");
        added
    }
}

impl<T> Routes<Pagination<T>> {
    /// A set with one route per page of `size` items, slugged by page number.
    ///
    /// A zero `size` is recorded against the template on expansion.
    pub fn paginated(path: impl Into<String>, items: Vec<T>, size: usize) -> Self {
        match pagination::chunk(items, size) {
            // page numbers are 1-based positions
            Ok(pages) => Self::new(path, pages),
            Err(err) => Self {
                deferred: Some(err.into()),
                ..Self::new(path, Vec::new())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PaginationError;
    use crate::test_helpers::{generator, route_paths, route_titles};
    use maud::html;

    fn slug_page(p: &mut RouteParam<'_, String>) -> Result<maud::Markup, BoxError> {
        Ok(html! { h1 { (p.slug()) } })
    }

    #[test]
    fn one_route_per_slug_in_order() {
        let mut g = generator();
        let added =
            Routes::from_slugs("/post/{s}", ["first", "second", "third"]).add_to(&mut g, slug_page);

        assert_eq!(added, 3);
        assert_eq!(route_paths(&g), vec!["post/first", "post/second", "post/third"]);
        assert_eq!(
            g.routes()[2].output_file(),
            std::path::PathBuf::from("post/third/index.html")
        );
        assert!(g.errors().is_empty());
    }

    #[test]
    fn title_template_is_substituted() {
        let mut g = generator();
        Routes::from_slugs("/post/{s}", ["a", "b"])
            .title("Post {s}")
            .add_to(&mut g, slug_page);

        assert_eq!(route_titles(&g), vec!["Post a", "Post b"]);
    }

    #[test]
    fn per_item_title_beats_template() {
        let mut g = generator();
        Routes::from_slugs("/post/{s}", ["a", "b"])
            .title("Post {s}")
            .add_to(&mut g, |p| {
                if p.index() == 1 {
                    p.set_title("Special {s}");
                }
                Ok(html! {})
            });

        assert_eq!(route_titles(&g), vec!["Post a", "Special b"]);
    }

    #[test]
    fn no_title_template_leaves_title_empty() {
        let mut g = generator();
        Routes::from_slugs("/post/{s}", ["a"]).add_to(&mut g, slug_page);
        assert_eq!(route_titles(&g), vec![""]);
    }

    #[test]
    fn every_placeholder_is_replaced() {
        let mut g = generator();
        Routes::from_slugs("/{s}/{s}.html", ["x"]).add_to(&mut g, slug_page);
        assert_eq!(route_paths(&g), vec!["x/x.html"]);
    }

    #[test]
    fn slug_extension_is_stripped() {
        let mut g = generator();
        Routes::from_slugs("/data/{s}", ["report.json"]).add_to(&mut g, slug_page);
        assert_eq!(route_paths(&g), vec!["data/report"]);
    }

    #[test]
    fn callback_can_override_slug() {
        let mut g = generator();
        Routes::from_slugs("/post/{s}", ["Hello World"]).add_to(&mut g, |p| {
            let slug = p.slug().to_lowercase().replace(' ', "-");
            p.set_slug(slug);
            Ok(html! {})
        });
        assert_eq!(route_paths(&g), vec!["post/hello-world"]);
    }

    #[test]
    fn positional_slugs_are_one_based() {
        let mut g = generator();
        Routes::new("/item/{s}", vec![10i32, 20, 30]).add_to(&mut g, |p| {
            assert_eq!(*p.item(), (p.index() as i32 + 1) * 10);
            Ok(html! {})
        });
        assert_eq!(route_paths(&g), vec!["item/1", "item/2", "item/3"]);
    }

    #[test]
    fn slug_fn_seeds_from_item() {
        struct Post {
            slug: &'static str,
        }
        let posts = vec![Post { slug: "intro" }, Post { slug: "outro" }];

        let mut g = generator();
        Routes::with_slug_fn("/p/{s}", posts, |p| p.slug.to_string())
            .add_to(&mut g, |_| Ok(html! {}));
        assert_eq!(route_paths(&g), vec!["p/intro", "p/outro"]);
    }

    #[test]
    fn missing_placeholder_is_recorded_without_calling_back() {
        let mut g = generator();
        let mut calls = 0;
        let added = Routes::from_slugs("/post", ["a"]).add_to(&mut g, |_| {
            calls += 1;
            Ok(html! {})
        });

        assert_eq!(added, 0);
        assert_eq!(calls, 0);
        assert!(matches!(
            g.errors().get("/post"),
            Some(ExpandError::MissingPlaceholder(p)) if p == "/post"
        ));
    }

    #[test]
    fn callback_error_stops_expansion_and_keeps_earlier_routes() {
        let mut g = generator();
        let mut calls = 0;
        let added = Routes::from_slugs("/post/{s}", ["a", "b", "c"]).add_to(&mut g, |p| {
            calls += 1;
            if p.slug() == "b" {
                return Err("b is broken".into());
            }
            Ok(html! {})
        });

        assert_eq!(added, 1);
        assert_eq!(calls, 2);
        assert_eq!(route_paths(&g), vec!["post/a"]);
        let err = g.errors().get("/post/{s}").unwrap().to_string();
        assert!(err.contains("b is broken"), "{err}");
    }

    #[test]
    fn failing_set_does_not_affect_others() {
        let mut g = generator();
        Routes::from_slugs("/bad/{s}", ["x"]).add_to(&mut g, |_| {
            Err::<maud::Markup, _>("nope".into())
        });
        Routes::from_slugs("/good/{s}", ["y"]).add_to(&mut g, slug_page);

        assert_eq!(route_paths(&g), vec!["good/y"]);
        assert_eq!(g.errors().len(), 1);
    }

    #[test]
    fn empty_set_adds_nothing() {
        let mut g = generator();
        let added = Routes::from_slugs("/post/{s}", Vec::<String>::new()).add_to(&mut g, slug_page);
        assert_eq!(added, 0);
        assert!(g.routes().is_empty());
        assert!(g.errors().is_empty());
    }

    #[test]
    fn paginated_one_route_per_page() {
        let mut g = generator();
        let items: Vec<u32> = (1..=5).collect();
        Routes::paginated("/page/{s}", items, 2)
            .title("Page {s}")
            .add_to(&mut g, |p| {
                let page = p.item();
                assert_eq!(page.total, 3);
                Ok(html! { @for n in &page.chunk { (n) } })
            });

        assert_eq!(route_paths(&g), vec!["page/1", "page/2", "page/3"]);
        assert_eq!(route_titles(&g), vec!["Page 1", "Page 2", "Page 3"]);
    }

    #[test]
    fn paginated_zero_size_is_recorded() {
        let mut g = generator();
        let added =
            Routes::paginated("/page/{s}", vec![1, 2, 3], 0).add_to(&mut g, |_| Ok(html! {}));

        assert_eq!(added, 0);
        assert!(matches!(
            g.errors().get("/page/{s}"),
            Some(ExpandError::Pagination(PaginationError::ZeroSize))
        ));
    }

    #[test]
    fn paginated_empty_items_adds_nothing() {
        let mut g = generator();
        let added =
            Routes::paginated("/page/{s}", Vec::<u8>::new(), 3).add_to(&mut g, |_| Ok(html! {}));
        assert_eq!(added, 0);
        assert!(g.errors().is_empty());
    }
}

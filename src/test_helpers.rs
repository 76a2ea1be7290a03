//! Shared test utilities for the routegen test suite.
//!
//! Provides generator constructors that never read the process environment,
//! bulk extractors over registered routes, and output readers for committed
//! sites.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let mut g = generator_in(tmp.path());
//! g.add_route("/about", html! { h1 { "About" } });
//! assert_eq!(route_paths(&g), vec!["about"]);
//!
//! g.commit().unwrap();
//! assert!(read_output(tmp.path(), "about/index.html").contains("About"));
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::generate::Generator;
use crate::render::{Component, RenderContext, RenderError};

// =========================================================================
// Generators
// =========================================================================

/// Config with a recognizable site name and no filesystem roots.
pub fn test_config() -> SiteConfig {
    SiteConfig {
        site_name: "Test site".to_string(),
        ..SiteConfig::default()
    }
}

/// Generator for registration-only tests.
pub fn generator() -> Generator {
    Generator::with_config(test_config())
}

/// Generator reading sources from `dir` and writing to `dir/dist`.
pub fn generator_in(dir: &Path) -> Generator {
    Generator::with_config(SiteConfig {
        source: Some(dir.to_path_buf()),
        destination: dir.join("dist"),
        ..test_config()
    })
}

// =========================================================================
// Extractors
// =========================================================================

/// Normalized paths of all registered routes, in order.
pub fn route_paths(g: &Generator) -> Vec<&str> {
    g.routes().iter().map(|r| r.path()).collect()
}

/// Raw titles of all registered routes, in order.
pub fn route_titles(g: &Generator) -> Vec<&str> {
    g.routes().iter().map(|r| r.title()).collect()
}

/// Read a committed file from the `dist` directory of a [`generator_in`] site.
///
/// Panics with the missing path if the file was not written.
pub fn read_output(dir: &Path, rel: &str) -> String {
    let path: PathBuf = dir.join("dist").join(rel);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

// =========================================================================
// Components
// =========================================================================

/// Component whose render always fails.
pub struct FailingComponent;

impl Component for FailingComponent {
    fn render(&self, _ctx: &RenderContext<'_>, _out: &mut dyn Write) -> Result<(), RenderError> {
        Err(RenderError::component("component exploded"))
    }
}

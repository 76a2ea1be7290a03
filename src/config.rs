//! Site configuration.
//!
//! A generator is configured from a [`SiteConfig`]. The CLI loads it from an
//! optional `routegen.toml` in the content root; library users usually build
//! it in code. Either way, two environment variables take precedence over
//! whatever the config says:
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `ROUTEGEN_DEST` | `destination` |
//! | `ROUTEGEN_SRC` | `source` |
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! site_name = "My site"
//! destination = "dist"       # Output root
//! # source = "content"       # Base for copy sources (default: working directory)
//! lang = "en"                # <html lang>
//! title_style = "dash-back"  # dash-back | dash-front | colon-back | colon-front | none
//! default_shell = true       # Wrap routes in the built-in HTML shell
//!
//! [pagination]
//! per_page = 10
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Name of the config file looked up in the content root.
pub const CONFIG_FILENAME: &str = "routegen.toml";

/// Environment variable overriding the destination root.
pub const ENV_DESTINATION: &str = "ROUTEGEN_DEST";

/// Environment variable overriding the source root.
pub const ENV_SOURCE: &str = "ROUTEGEN_SRC";

const TITLE_STYLE_NAMES: &str = "dash-back, dash-front, colon-back, colon-front or none";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("unrecognized title style \"{0}\" (expected {names})", names = TITLE_STYLE_NAMES)]
    UnknownTitleStyle(String),
}

/// How the site name and a route title combine into the page `<title>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TitleStyle {
    /// `About - My site`
    #[default]
    DashBack,
    /// `My site - About`
    DashFront,
    /// `About: My site`
    ColonBack,
    /// `My site: About`
    ColonFront,
    /// `My site`
    SiteOnly,
}

impl TitleStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DashBack => "dash-back",
            Self::DashFront => "dash-front",
            Self::ColonBack => "colon-back",
            Self::ColonFront => "colon-front",
            Self::SiteOnly => "none",
        }
    }

    /// Compose the page title for a route with a non-empty `title`.
    pub fn compose(self, site_name: &str, title: &str) -> String {
        match self {
            Self::DashBack => format!("{title} - {site_name}"),
            Self::DashFront => format!("{site_name} - {title}"),
            Self::ColonBack => format!("{title}: {site_name}"),
            Self::ColonFront => format!("{site_name}: {title}"),
            Self::SiteOnly => site_name.to_string(),
        }
    }
}

impl FromStr for TitleStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dash-back" => Ok(Self::DashBack),
            "dash-front" => Ok(Self::DashFront),
            "colon-back" => Ok(Self::ColonBack),
            "colon-front" => Ok(Self::ColonFront),
            "none" | "site-only" => Ok(Self::SiteOnly),
            other => Err(ConfigError::UnknownTitleStyle(other.to_string())),
        }
    }
}

impl TryFrom<String> for TitleStyle {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TitleStyle> for String {
    fn from(style: TitleStyle) -> Self {
        style.as_str().to_string()
    }
}

impl fmt::Display for TitleStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generator configuration.
///
/// All fields have defaults; a config file only needs the values it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site name composed into every page title.
    pub site_name: String,
    /// Directory the site is written to.
    pub destination: PathBuf,
    /// Directory copy sources are resolved against. `None` means the working directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// Value of `<html lang>` in the default shell.
    pub lang: String,
    /// Title composition style.
    pub title_style: TitleStyle,
    /// Wrap routes without a layout in the built-in shell.
    pub default_shell: bool,
    /// Listing pagination used by the site builder.
    pub pagination: PaginationConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: "My site".to_string(),
            destination: PathBuf::from("dist"),
            source: None,
            lang: "en".to_string(),
            title_style: TitleStyle::default(),
            default_shell: true,
            pagination: PaginationConfig::default(),
        }
    }
}

/// Listing pagination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationConfig {
    /// Items per listing page.
    pub per_page: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { per_page: 10 }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lang.trim().is_empty() {
            return Err(ConfigError::Validation("lang must not be empty".into()));
        }
        if self.destination.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "destination must not be empty".into(),
            ));
        }
        if self.pagination.per_page == 0 {
            return Err(ConfigError::Validation(
                "pagination.per_page must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Apply `ROUTEGEN_DEST` / `ROUTEGEN_SRC` from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides using `lookup` to read variables.
    ///
    /// A variable that is set takes precedence over the configured value,
    /// even when empty.
    pub fn apply_env_with<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dest) = lookup(ENV_DESTINATION) {
            self.destination = PathBuf::from(dest);
        }
        if let Some(src) = lookup(ENV_SOURCE) {
            self.source = Some(PathBuf::from(src));
        }
        self
    }

    /// Source root, falling back to the working directory.
    pub fn source_root(&self) -> PathBuf {
        match &self.source {
            Some(src) if !src.as_os_str().is_empty() => src.clone(),
            _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

/// Load `routegen.toml` from `root`.
///
/// Returns the defaults when the file does not exist. Unknown keys and
/// invalid values are errors.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(SiteConfig::default());
    }
    let content = fs::read_to_string(&config_path)?;
    let config: SiteConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load the config for the content directory `source`, honoring the
/// environment overrides.
///
/// `ROUTEGEN_SRC` replaces `source` before `routegen.toml` is read, so the
/// config always comes from the directory the content is read from.
pub fn load_for_source(source: &Path) -> Result<SiteConfig, ConfigError> {
    load_for_source_with(source, |key| std::env::var(key).ok())
}

/// [`load_for_source`] with an injected variable lookup.
pub fn load_for_source_with<F>(source: &Path, lookup: F) -> Result<SiteConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let root = lookup(ENV_SOURCE)
        .map(PathBuf::from)
        .unwrap_or_else(|| source.to_path_buf());
    let mut config = load_config(&root)?;
    if config.source.is_none() {
        config.source = Some(root);
    }
    Ok(config.apply_env_with(lookup))
}

/// Returns a fully-commented stock `routegen.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# routegen configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# ROUTEGEN_DEST and ROUTEGEN_SRC, when set, override `destination` and
# `source`. Unknown keys will cause an error.

# Site name, composed into every page <title>.
site_name = "My site"

# Directory the generated site is written to.
destination = "dist"

# Directory copy sources are resolved against.
# Omit to use the working directory.
# source = "content"

# <html lang> of the default shell.
lang = "en"

# How the site name combines with a page title:
#   dash-back   -> "About - My site"
#   dash-front  -> "My site - About"
#   colon-back  -> "About: My site"
#   colon-front -> "My site: About"
#   none        -> "My site"
title_style = "dash-back"

# Wrap pages in the built-in HTML shell. Turn off when every page
# renders a complete document itself.
default_shell = true

# ---------------------------------------------------------------------------
# Listing pagination
# ---------------------------------------------------------------------------
[pagination]
# Posts per listing page (/page/1, /page/2, ...).
per_page = 10
"##
}

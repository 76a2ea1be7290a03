//! Registration-time errors and their aggregation.
//!
//! Registering routes never fails at the call site. Errors raised while
//! expanding a route set (or running a single-route callback) are recorded in
//! the generator's [`ErrorAggregator`], keyed by the path template, and
//! surface exactly once when the site is committed, as one [`RouteErrors`]
//! listing every failing template and its cause.

use crate::pagination::PaginationError;
use crate::render::BoxError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a route set (or single route callback) produced no further routes.
#[derive(Error, Debug, Clone)]
pub enum ExpandError {
    #[error("slug placeholder {{s}} not found in \"{0}\"")]
    MissingPlaceholder(String),
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error("error while rendering route: {0}")]
    Callback(Arc<dyn std::error::Error + Send + Sync>),
}

impl ExpandError {
    pub fn callback(err: BoxError) -> Self {
        Self::Callback(Arc::from(err))
    }
}

/// Path template → first error recorded for it, in recording order.
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    entries: Vec<(String, ExpandError)>,
}

impl ErrorAggregator {
    /// Record an error for `key`. Only the first error per key is kept.
    pub fn record(&mut self, key: impl Into<String>, err: ExpandError) {
        let key = key.into();
        if self.contains(&key) {
            debug!(path = %key, error = %err, "route error already recorded, ignoring");
            return;
        }
        warn!(path = %key, error = %err, "route error recorded");
        self.entries.push((key, err));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&ExpandError> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExpandError)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// `Ok` when nothing was recorded, otherwise the composite error.
    pub fn check(&self) -> Result<(), RouteErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(RouteErrors(self.entries.clone()))
        }
    }
}

/// Every route set that failed during registration, with its cause.
#[derive(Debug, Clone)]
pub struct RouteErrors(Vec<(String, ExpandError)>);

impl RouteErrors {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExpandError)> {
        self.0.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RouteErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "route error (")?;
        for (i, (path, err)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "\"{path}\": {err}")?;
        }
        write!(f, ")")
    }
}

impl std::error::Error for RouteErrors {}

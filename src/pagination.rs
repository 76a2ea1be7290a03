//! Fixed-size pagination of ordered data.
//!
//! A [`Pagination`] is one page's worth of items plus its position. Pages are
//! ordinary route-set items: [`Routes::paginated`](crate::routes::Routes::paginated)
//! feeds them through the same slug and title substitution as any other data,
//! and since the default slug is the 1-based position, `/page/{s}` yields
//! `/page/1`, `/page/2`, ... without any extra work.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaginationError {
    #[error("pagination size must be at least 1")]
    ZeroSize,
}

/// One page of chunked data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination<T> {
    /// 1-based page number.
    pub current: usize,
    /// Number of pages, which is also the last page number.
    pub total: usize,
    /// Items on this page, in source order. Only the last page may be shorter.
    pub chunk: Vec<T>,
}

impl<T> Pagination<T> {
    pub fn is_first(&self) -> bool {
        self.current == 1
    }

    pub fn is_last(&self) -> bool {
        self.current == self.total
    }

    /// Previous page number, if any.
    pub fn prev(&self) -> Option<usize> {
        (self.current > 1).then(|| self.current - 1)
    }

    /// Next page number, if any.
    pub fn next(&self) -> Option<usize> {
        (self.current < self.total).then(|| self.current + 1)
    }
}

/// Split `items` into pages of `size` items.
///
/// Produces `ceil(len / size)` pages; an empty input produces none. A size of
/// one is valid and yields one page per item.
pub fn chunk<T>(items: Vec<T>, size: usize) -> Result<Vec<Pagination<T>>, PaginationError> {
    if size == 0 {
        return Err(PaginationError::ZeroSize);
    }

    let total = items.len().div_ceil(size);
    let mut pages = Vec::with_capacity(total);
    let mut items = items.into_iter().peekable();
    let mut current = 1;

    while items.peek().is_some() {
        let chunk: Vec<T> = items.by_ref().take(size).collect();
        pages.push(Pagination {
            current,
            total,
            chunk,
        });
        current += 1;
    }

    Ok(pages)
}

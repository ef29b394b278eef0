//! Paginator - turns a counted, sliceable source into one page.
//!
//! The paginator issues two independent queries against the source: a full
//! count and a bounded range fetch. There is no snapshot isolation between
//! them. If the source is written to between the two calls, `total_count`
//! and the returned items may disagree. Callers that need a consistent view
//! must provide it themselves.

use crate::{error::Result, Error, PageRequest, PageSlice};
use async_trait::async_trait;

/// Boxed error returned by a [`QuerySource`].
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// An ordered, countable sequence that can be sliced.
///
/// The source is expected to be already filtered and sorted. Counting must not
/// depend on any state left behind by slicing.
#[async_trait]
pub trait QuerySource: Send + Sync {
    type Item: Send;

    /// Count every item in the source.
    async fn count(&self) -> std::result::Result<u64, SourceError>;

    /// Fetch at most `take` items after skipping `skip`.
    async fn slice(&self, skip: u64, take: u64) -> std::result::Result<Vec<Self::Item>, SourceError>;
}

/// Produces [`PageSlice`]s from [`QuerySource`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct Paginator;

impl Paginator {
    pub fn new() -> Self {
        Self
    }

    /// Fetch one page.
    ///
    /// Fails with [`Error::SourceQueryFailed`] if either the count or the
    /// slice fails. No partial page is returned.
    pub async fn fetch_page<S>(
        &self,
        source: &S,
        request: &PageRequest,
    ) -> Result<PageSlice<S::Item>>
    where
        S: QuerySource + ?Sized,
    {
        let count = source
            .count()
            .await
            .map_err(|e| Error::SourceQueryFailed(e.to_string()))?;

        let (skip, take) = (request.skip(), request.take());
        let mut items = source
            .slice(skip, take)
            .await
            .map_err(|e| Error::SourceQueryFailed(e.to_string()))?;

        // A misbehaving source must not break the page invariant
        items.truncate(take as usize);

        // Rows inserted between the two queries can outrun the count
        let seen = skip.saturating_add(items.len() as u64);
        let count = if seen > count {
            tracing::debug!(count, seen, "source grew while paging");
            seen
        } else {
            count
        };

        tracing::debug!(
            page = request.page_number(),
            size = request.page_size(),
            count,
            returned = items.len(),
            "fetched page"
        );

        PageSlice::new(items, count, request.page_number(), request.page_size())
    }
}

/// An in-memory [`QuerySource`] over a vector.
#[derive(Debug, Clone, Default)]
pub struct VecSource<T> {
    items: Vec<T>,
}

impl<T> VecSource<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn into_inner(self) -> Vec<T> {
        self.items
    }
}

impl<T> From<Vec<T>> for VecSource<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> QuerySource for VecSource<T> {
    type Item = T;

    async fn count(&self) -> std::result::Result<u64, SourceError> {
        Ok(self.items.len() as u64)
    }

    async fn slice(&self, skip: u64, take: u64) -> std::result::Result<Vec<T>, SourceError> {
        Ok(self
            .items
            .iter()
            .skip(skip as usize)
            .take(take as usize)
            .cloned()
            .collect())
    }
}

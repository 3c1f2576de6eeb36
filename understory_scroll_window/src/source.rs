// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Where window rows come from: an in-memory dataset or an async fetcher.

use std::fmt;
use std::sync::Arc;

use futures_util::future::{BoxFuture, join_all};
use smallvec::SmallVec;
use understory_dataset::{DatasetCommand, DatasetController};

use crate::FetchError;

/// Identifies one range request.
///
/// Tokens are issued in strictly increasing order by a single engine. Only
/// the resolution carrying the most recently issued token is ever applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Raw sequence number. `0` is the token of the initial, never-loaded state.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Asynchronous row provider, typically backed by a network service.
///
/// Positions are zero-based offsets into the provider's current ordering.
/// Implementors supply [`fetch_row`](Self::fetch_row); providers with a bulk
/// endpoint should override [`fetch_range`](Self::fetch_range) as well.
pub trait RowFetcher<R: Send + 'static>: Send + Sync + 'static {
    /// Number of rows the provider currently exposes.
    fn row_count(&self) -> usize;

    /// Fetch the row at `position`.
    fn fetch_row(&self, position: usize) -> BoxFuture<'static, Result<R, FetchError>>;

    /// Fetch every row in `start ..= end`.
    ///
    /// The default issues one [`fetch_row`](Self::fetch_row) per position and
    /// awaits them together; one failing row does not affect the others.
    fn fetch_range(
        &self,
        start: usize,
        end: usize,
    ) -> BoxFuture<'static, Vec<(usize, Result<R, FetchError>)>> {
        let pending: Vec<_> = (start..=end)
            .map(|position| {
                let row = self.fetch_row(position);
                async move { (position, row.await) }
            })
            .collect();
        Box::pin(join_all(pending))
    }

    /// Observe a user command. Providers that sort or filter server-side react
    /// here; the default ignores commands.
    fn on_command(&self, _command: &DatasetCommand) {}
}

/// One delivered row and its zero-based position.
#[derive(Debug)]
pub struct PositionedRow<R> {
    /// Dataset position of the row.
    pub position: usize,
    /// The row.
    pub row: Arc<R>,
}

/// The outcome of fetching one range: rows that arrived plus per-row failures.
#[derive(Debug)]
pub struct RangeFetch<R> {
    /// Delivered rows in ascending position order.
    pub rows: Vec<PositionedRow<R>>,
    /// Positions that could not be retrieved.
    pub failures: SmallVec<[FetchError; 4]>,
}

impl<R> Default for RangeFetch<R> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            failures: SmallVec::new(),
        }
    }
}

impl<R> RangeFetch<R> {
    /// Returns `true` if at least one row failed.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Rows served synchronously from a [`DatasetController`].
pub struct LocalSource<R> {
    dataset: Arc<DatasetController<R>>,
}

impl<R> LocalSource<R> {
    /// The underlying dataset.
    #[must_use]
    pub fn dataset(&self) -> &Arc<DatasetController<R>> {
        &self.dataset
    }

    fn len(&self) -> usize {
        self.dataset.len()
    }
}

impl<R> fmt::Debug for LocalSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSource")
            .field("dataset", &self.dataset)
            .finish()
    }
}

/// Rows served asynchronously by a [`RowFetcher`].
pub struct RemoteSource<R: Send + 'static> {
    fetcher: Arc<dyn RowFetcher<R>>,
}

impl<R: Send + 'static> RemoteSource<R> {
    /// The underlying fetcher.
    #[must_use]
    pub fn fetcher(&self) -> &Arc<dyn RowFetcher<R>> {
        &self.fetcher
    }

    fn len(&self) -> usize {
        self.fetcher.row_count()
    }

    /// Start fetching `start ..= end`. The returned future owns everything it
    /// needs and can be spawned.
    pub(crate) fn fetch(&self, start: usize, end: usize) -> BoxFuture<'static, RangeFetch<R>> {
        let pending = self.fetcher.fetch_range(start, end);
        Box::pin(async move {
            let mut results = pending.await;
            results.sort_by_key(|(position, _)| *position);
            let mut fetch = RangeFetch::default();
            for (position, result) in results {
                match result {
                    Ok(row) => fetch.rows.push(PositionedRow {
                        position,
                        row: Arc::new(row),
                    }),
                    Err(error) => fetch.failures.push(error),
                }
            }
            fetch
        })
    }
}

impl<R: Send + 'static> fmt::Debug for RemoteSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSource").finish_non_exhaustive()
    }
}

/// The row source behind a scroll window engine.
pub enum RangeSource<R: Send + 'static> {
    /// In-memory rows; ranges resolve immediately.
    Local(LocalSource<R>),
    /// Asynchronously fetched rows; ranges resolve later, possibly out of order.
    Remote(RemoteSource<R>),
}

impl<R: Send + 'static> fmt::Debug for RangeSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(local) => f.debug_tuple("Local").field(local).finish(),
            Self::Remote(remote) => f.debug_tuple("Remote").field(remote).finish(),
        }
    }
}

impl<R: Send + 'static> RangeSource<R> {
    /// A local source over `dataset`.
    #[must_use]
    pub fn local(dataset: Arc<DatasetController<R>>) -> Self {
        Self::Local(LocalSource { dataset })
    }

    /// A remote source over `fetcher`.
    #[must_use]
    pub fn remote(fetcher: impl RowFetcher<R>) -> Self {
        Self::remote_shared(Arc::new(fetcher))
    }

    /// A remote source over a fetcher the caller keeps a handle to.
    #[must_use]
    pub fn remote_shared(fetcher: Arc<dyn RowFetcher<R>>) -> Self {
        Self::Remote(RemoteSource { fetcher })
    }

    /// Number of rows currently exposed by the source.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Local(local) => local.len(),
            Self::Remote(remote) => remote.len(),
        }
    }

    /// Returns `true` if the source exposes no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` for [`RangeSource::Remote`].
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Published window state and engine configuration.

use std::sync::Arc;

use smallvec::SmallVec;
use understory_window_geometry::Window;

use crate::{FetchError, RequestToken};

/// A materialized row and the index it occupies.
#[derive(Debug)]
pub struct VisibleRow<R> {
    /// Index in the layout's index space.
    pub index: usize,
    /// The row.
    pub row: Arc<R>,
}

impl<R> Clone for VisibleRow<R> {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            row: Arc::clone(&self.row),
        }
    }
}

/// Everything a host needs to render the list at one moment.
///
/// The spacers and the rows between them always add up to `total_height`,
/// counting failed rows at full height:
/// `top + (visible_rows.len() + failed_indices.len()) * item_height + bottom`.
#[derive(Debug)]
pub struct WindowState<R> {
    /// Request that produced this state.
    pub token: RequestToken,
    /// First buffered index.
    pub anchor_index: usize,
    /// Number of buffered indices, including any that failed to load.
    pub count: usize,
    /// Height above the first buffered row.
    pub top_spacer_height: f64,
    /// Height below the last buffered row.
    pub bottom_spacer_height: f64,
    /// Height of the whole list.
    pub total_height: f64,
    /// Rows to render, in index order.
    ///
    /// In a degraded window this is shorter than `count`; the missing indices
    /// are in `failed_indices`.
    pub visible_rows: Vec<VisibleRow<R>>,
    /// Indices in the window whose rows a remote source could not deliver.
    ///
    /// Renderers must reserve one placeholder row of `item_height` at each of
    /// these indices for the rows and spacers to add up to `total_height`.
    pub failed_indices: SmallVec<[usize; 4]>,
    /// The failures behind `failed_indices`, in the same order.
    pub failures: SmallVec<[FetchError; 4]>,
    /// The list has no rows (for example, a filter matched nothing).
    pub is_empty: bool,
    /// Some rows in the window failed to load.
    pub is_degraded: bool,
}

impl<R> WindowState<R> {
    /// The state before any window has been computed.
    ///
    /// Not to be confused with an empty list: `is_empty` is `false` here.
    #[must_use]
    pub fn unloaded(min_index: usize) -> Self {
        Self {
            token: RequestToken::default(),
            anchor_index: min_index,
            count: 0,
            top_spacer_height: 0.0,
            bottom_spacer_height: 0.0,
            total_height: 0.0,
            visible_rows: Vec::new(),
            failed_indices: SmallVec::new(),
            failures: SmallVec::new(),
            is_empty: false,
            is_degraded: false,
        }
    }

    pub(crate) fn from_window(
        token: RequestToken,
        window: &Window<f64>,
        min_index: usize,
        visible_rows: Vec<VisibleRow<R>>,
        failures: SmallVec<[FetchError; 4]>,
    ) -> Self {
        Self {
            token,
            anchor_index: window.anchor_index,
            count: window.count,
            top_spacer_height: window.top_spacer,
            bottom_spacer_height: window.bottom_spacer,
            total_height: window.total_height,
            visible_rows,
            failed_indices: failures
                .iter()
                .map(|failure| failure.position + min_index)
                .collect(),
            is_degraded: !failures.is_empty(),
            failures,
            is_empty: window.is_empty(),
        }
    }
}

/// Where the engine is in its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnginePhase {
    /// No window computed yet, or shut down.
    #[default]
    Idle,
    /// The most recent request has not resolved.
    Loading,
    /// The published state reflects the most recent request.
    Settled,
}

/// Engine behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct EngineOptions {
    /// Abort superseded remote fetches instead of letting them finish and
    /// discarding their results.
    pub abort_superseded: bool,
}

impl EngineOptions {
    /// Sets [`abort_superseded`](Self::abort_superseded).
    #[must_use]
    pub const fn with_abort_superseded(mut self, abort: bool) -> Self {
        self.abort_superseded = abort;
        self
    }
}

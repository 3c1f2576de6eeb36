// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for the scroll window engine.

use std::sync::Arc;

use understory_window_geometry::LayoutError;

/// Result type alias for engine construction and configuration.
pub type Result<T, E = EngineError> = core::result::Result<T, E>;

/// Configuration defects that stop an engine from starting.
///
/// Nothing on the scroll or mutation path returns this: once an engine is
/// running, bad input is clamped and remote failures degrade the window.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The layout is unusable (zero viewport, non-positive row height, ...).
    #[error("invalid layout: {0}")]
    Layout(#[from] LayoutError),

    /// A remote source or the driver was set up outside a Tokio runtime.
    #[error("no Tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// A single row retrieval that failed in a remote source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to fetch row at position {position}: {message}")]
pub struct FetchError {
    /// Zero-based dataset position of the row.
    pub position: usize,
    /// Description supplied by the fetcher.
    pub message: Arc<str>,
}

impl FetchError {
    /// Creates a fetch error for `position`.
    pub fn new(position: usize, message: impl Into<Arc<str>>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

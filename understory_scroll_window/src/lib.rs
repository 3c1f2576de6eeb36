// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_scroll_window --heading-base-level=0

//! Understory Scroll Window: a windowing engine for long, fixed-height lists.
//!
//! [`ScrollWindowEngine`] takes scroll offsets, viewport resizes, and dataset
//! changes from a host and publishes a [`WindowState`]: the buffered rows to
//! render plus the two spacer heights that stand in for everything else.
//! Geometry comes from [`understory_window_geometry`]; rows come from a
//! [`RangeSource`], either a local [`DatasetController`](understory_dataset::DatasetController)
//! or a remote [`RowFetcher`].
//!
//! ## Ordering
//!
//! Every event issues a new [`RequestToken`]. Remote fetches can finish in any
//! order, but only the one carrying the latest token is applied; the rest are
//! dropped without touching the published state. A request that never
//! finishes therefore never blocks a later one.
//!
//! ## Failure
//!
//! Configuration mistakes (zero-height rows, an empty viewport, a remote
//! source without a Tokio runtime) fail at construction with [`EngineError`].
//! After that nothing fails: odd offsets are clamped, and rows a remote source
//! could not deliver are listed in [`WindowState::failures`] with the window
//! marked [`is_degraded`](WindowState::is_degraded).
//!
//! ## Minimal example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use understory_dataset::{DatasetController, FieldValue, Row};
//! use understory_scroll_window::{InitialPosition, RangeSource, ScrollWindowEngine};
//! use understory_window_geometry::LayoutConfig;
//!
//! struct Line(u32);
//!
//! impl Row for Line {
//!     type Key = u32;
//!     fn key(&self) -> u32 { self.0 }
//!     fn field(&self, name: &str) -> Option<FieldValue<'_>> {
//!         (name == "n").then(|| FieldValue::Integer(self.0.into()))
//!     }
//! }
//!
//! let dataset = Arc::new(DatasetController::new((0..100).map(Line)));
//! let layout = LayoutConfig::new(56.0, 6, 3).unwrap().with_min_index(1);
//! let mut engine = ScrollWindowEngine::new(layout, RangeSource::local(dataset)).unwrap();
//!
//! engine.on_initial_mount(InitialPosition::Top);
//! let window = engine.snapshot();
//! assert_eq!((window.anchor_index, window.count), (1, 12));
//! assert_eq!(window.bottom_spacer_height, 4928.0);
//! ```
//!
//! To run the engine as its own task, see [`spawn`].

mod driver;
mod engine;
mod error;
mod source;
mod state;

pub use driver::{EngineEvent, EngineHandle, spawn};
pub use engine::{InitialPosition, ResolutionOutcome, ScrollWindowEngine};
pub use error::{EngineError, FetchError, Result};
pub use source::{
    LocalSource, PositionedRow, RangeFetch, RangeSource, RemoteSource, RequestToken, RowFetcher,
};
pub use state::{EngineOptions, EnginePhase, VisibleRow, WindowState};

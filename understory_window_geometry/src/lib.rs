// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_window_geometry --heading-base-level=0

//! Understory Window Geometry: windowing math for fixed-height virtual lists.
//!
//! This crate turns a scroll offset and a small layout description into the
//! contiguous range of rows a host must materialize, plus the heights of the
//! spacers that stand in for every row it does not.
//!
//! The core concepts are:
//!
//! - [`Scalar`]: a small abstraction over `f32`/`f64` used for heights,
//!   offsets, and scroll positions.
//! - [`LayoutConfig`]: a validated description of the list: row height, how
//!   many rows fit the viewport, how many extra rows to buffer on each side
//!   (the tolerance), and the addressable index space `min_index ..= max_index`.
//! - [`compute_window`]: the pure function from `(layout, scroll_offset)` to a
//!   [`Window`] holding the anchor index, row count, and both spacer heights.
//! - [`scroll_offset_for_index`]: index-based scrolling with [`ScrollAlign`].
//! - [`LayoutSettings`]: a plain, optionally serde-enabled form of a layout
//!   for configuration files.
//!
//! There is no state and no I/O here. Data retrieval and reacting to scroll
//! events belong to the host (see `understory_scroll_window`).
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_window_geometry::{LayoutConfig, compute_window};
//!
//! // Rows 1..=100, 56 units tall, six visible, three buffered on each side.
//! let layout = LayoutConfig::new(56.0_f64, 6, 3)
//!     .unwrap()
//!     .with_index_bounds(1, 100)
//!     .unwrap();
//!
//! let window = compute_window(&layout, 0.0);
//! assert_eq!(window.anchor_index, 1);
//! assert_eq!(window.count, 12);
//! assert_eq!(window.top_spacer, 0.0);
//! assert_eq!(window.bottom_spacer, 4928.0);
//!
//! // Hosts now render a `top_spacer`-tall placeholder, rows
//! // `window.indices()`, and a `bottom_spacer`-tall placeholder.
//! ```
//!
//! ## Features
//!
//! - `serde`: derives `Serialize`/`Deserialize` for [`LayoutSettings`].
//!
//! This crate is `no_std`.

#![no_std]

mod align;
mod layout;
mod scalar;
mod window;

pub use align::{ScrollAlign, scroll_offset_for_index};
pub use layout::{LayoutConfig, LayoutError, LayoutSettings};
pub use scalar::Scalar;
pub use window::{Window, compute_window};

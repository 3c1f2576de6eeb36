// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Index-aligned scroll targets.

use crate::{LayoutConfig, Scalar};

/// Alignment mode when scrolling a specific index into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollAlign {
    /// Align the top edge of the row with the top of the viewport.
    #[default]
    Start,
    /// Center the row within the viewport.
    Center,
    /// Align the bottom edge of the row with the bottom of the viewport.
    End,
    /// Move just enough to make the row fully visible, preferring the
    /// smallest change from the current scroll offset.
    Nearest,
}

/// Scroll offset that brings `index` into view with the given alignment.
///
/// `index` is clamped into the layout's index space, and the result is
/// clamped into `0 ..= max_scroll_offset()`. An empty list always yields `0`.
pub fn scroll_offset_for_index<S: Scalar>(
    layout: &LayoutConfig<S>,
    index: usize,
    align: ScrollAlign,
    current_offset: S,
) -> S {
    let Some(max_index) = layout.max_index() else {
        return S::zero();
    };
    let index = index.clamp(layout.min_index(), max_index);
    let item_start = layout.offset_of(index);
    let item_end = item_start + layout.item_height();
    let viewport = layout.viewport_height();

    let target = match align {
        ScrollAlign::Start => item_start,
        ScrollAlign::End => item_end - viewport,
        ScrollAlign::Center => {
            let half = S::from_usize(2);
            (item_start + item_end) / half - viewport / half
        }
        ScrollAlign::Nearest => {
            let viewport_start = current_offset;
            let viewport_end = current_offset + viewport;
            if item_start >= viewport_start && item_end <= viewport_end {
                current_offset
            } else if item_start < viewport_start {
                item_start
            } else {
                item_end - viewport
            }
        }
    };

    target.max(S::zero()).min(layout.max_scroll_offset())
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Buffered index window and spacer computation.

use core::ops::Range;

use crate::{LayoutConfig, Scalar};

/// The contiguous run of rows to materialize for one scroll offset.
///
/// `top_spacer + count * item_height + bottom_spacer == total_height` for every
/// window produced by [`compute_window`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window<S: Scalar> {
    /// First buffered index (inclusive), in the layout's index space.
    pub anchor_index: usize,
    /// Number of buffered rows starting at `anchor_index`.
    pub count: usize,
    /// Height standing in for every row above the window.
    pub top_spacer: S,
    /// Height standing in for every row below the window.
    pub bottom_spacer: S,
    /// Height of the whole list.
    pub total_height: S,
}

impl<S: Scalar> Window<S> {
    /// The window over an empty list, anchored at `min_index`.
    #[must_use]
    pub fn empty(min_index: usize) -> Self {
        Self {
            anchor_index: min_index,
            count: 0,
            top_spacer: S::zero(),
            bottom_spacer: S::zero(),
            total_height: S::zero(),
        }
    }

    /// Returns `true` if no rows are buffered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Last buffered index (inclusive), if any.
    #[must_use]
    pub const fn end_index(&self) -> Option<usize> {
        if self.count == 0 {
            None
        } else {
            Some(self.anchor_index + self.count - 1)
        }
    }

    /// Buffered indices as a half-open range.
    #[must_use]
    pub const fn indices(&self) -> Range<usize> {
        self.anchor_index..self.anchor_index + self.count
    }

    /// Buffered rows as zero-based dataset positions, given the layout's `min_index`.
    #[must_use]
    pub const fn positions(&self, min_index: usize) -> Range<usize> {
        let start = self.anchor_index.saturating_sub(min_index);
        start..start + self.count
    }
}

/// Compute the buffered window for `scroll_offset`.
///
/// The anchor is the row `tolerance_item_count` rows above the one at the top
/// of the viewport, clamped into `min_index ..= max_index`; the window then
/// extends for `buffered_item_count` rows or until `max_index`.
///
/// Offsets are clamped, never rejected: a negative or non-finite offset acts
/// like `0`, and an offset past the end (which happens briefly after a filter
/// shrinks the list) anchors on the last row.
pub fn compute_window<S: Scalar>(layout: &LayoutConfig<S>, scroll_offset: S) -> Window<S> {
    let min_index = layout.min_index();
    let Some(max_index) = layout.max_index() else {
        return Window::empty(min_index);
    };

    let item_height = layout.item_height();
    let scroll_offset = if scroll_offset.is_finite() {
        scroll_offset.max(S::zero())
    } else {
        S::zero()
    };

    let rows_above = ((scroll_offset - layout.tolerance_height()) / item_height).floor_to_isize();
    let anchor_index = if rows_above <= 0 {
        min_index.saturating_sub(rows_above.unsigned_abs())
    } else {
        min_index.saturating_add(rows_above.unsigned_abs())
    }
    .clamp(min_index, max_index);

    let end_index = anchor_index
        .saturating_add(layout.buffered_item_count() - 1)
        .min(max_index);
    let count = end_index - anchor_index + 1;

    let total_height = layout.total_height();
    let top_spacer = (S::from_usize(anchor_index - min_index) * item_height).max(S::zero());
    let bottom_spacer =
        (total_height - top_spacer - S::from_usize(count) * item_height).max(S::zero());

    Window {
        anchor_index,
        count,
        top_spacer,
        bottom_spacer,
        total_height,
    }
}

#[cfg(test)]
mod tests {
    use super::{Window, compute_window};
    use crate::LayoutConfig;

    fn demo_layout() -> LayoutConfig<f64> {
        LayoutConfig::new(56.0, 6, 3)
            .unwrap()
            .with_index_bounds(1, 100)
            .unwrap()
    }

    #[test]
    fn top_of_list_buffers_viewport_and_both_tolerances() {
        let window = compute_window(&demo_layout(), 0.0);
        assert_eq!(window.anchor_index, 1);
        assert_eq!(window.count, 12);
        assert_eq!(window.top_spacer, 0.0);
        assert_eq!(window.bottom_spacer, 4928.0);
        assert_eq!(window.end_index(), Some(12));
    }

    #[test]
    fn scrolling_moves_anchor_by_whole_rows() {
        let layout = demo_layout();
        // Inside the first tolerance band the anchor stays put.
        assert_eq!(compute_window(&layout, 167.9).anchor_index, 1);
        // 168 = tolerance height; one more row moves the anchor by one.
        assert_eq!(compute_window(&layout, 224.0).anchor_index, 2);

        let window = compute_window(&layout, 1000.0);
        // floor((1000 - 168) / 56) = 14
        assert_eq!(window.anchor_index, 15);
        assert_eq!(window.top_spacer, 14.0 * 56.0);
        assert_eq!(
            window.top_spacer + 12.0 * 56.0 + window.bottom_spacer,
            window.total_height
        );
    }

    #[test]
    fn offsets_past_the_end_clamp_to_last_row() {
        let layout = demo_layout();
        let window = compute_window(&layout, 1.0e9);
        assert_eq!(window.anchor_index, 100);
        assert_eq!(window.end_index(), Some(100));
        assert_eq!(window.bottom_spacer, 0.0);

        let window = compute_window(&layout, layout.max_scroll_offset());
        assert_eq!(window.end_index(), Some(100));
        assert_eq!(window.bottom_spacer, 0.0);
    }

    #[test]
    fn invalid_offsets_act_like_zero() {
        let layout = demo_layout();
        let top = compute_window(&layout, 0.0);
        assert_eq!(compute_window(&layout, -500.0), top);
        assert_eq!(compute_window(&layout, f64::NAN), top);
        assert_eq!(compute_window(&layout, f64::NEG_INFINITY), top);
    }

    #[test]
    fn short_list_fits_in_one_window() {
        let layout = LayoutConfig::new(10.0_f32, 6, 3).unwrap().with_row_count(4);
        let window = compute_window(&layout, 0.0);
        assert_eq!(window.anchor_index, 0);
        assert_eq!(window.count, 4);
        assert_eq!(window.top_spacer, 0.0);
        assert_eq!(window.bottom_spacer, 0.0);
        assert_eq!(window.positions(0), 0..4);
    }

    #[test]
    fn empty_list_yields_empty_sentinel() {
        let layout = LayoutConfig::new(10.0_f64, 6, 3)
            .unwrap()
            .with_min_index(1);
        let window = compute_window(&layout, 250.0);
        assert_eq!(window, Window::empty(1));
        assert!(window.is_empty());
        assert_eq!(window.end_index(), None);
        assert_eq!(window.indices(), 1..1);
    }

    #[test]
    fn positions_are_relative_to_min_index() {
        let window = compute_window(&demo_layout(), 1000.0);
        assert_eq!(window.indices(), 15..27);
        assert_eq!(window.positions(1), 14..26);
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Validated layout configuration for a fixed-row-height window.

use crate::Scalar;

/// Reasons a [`LayoutConfig`] refuses to initialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum LayoutError {
    /// The row height was zero, negative, or not finite.
    #[error("row height must be positive and finite")]
    InvalidItemHeight,
    /// The viewport was configured to show no rows.
    #[error("viewport must show at least one row")]
    EmptyViewport,
    /// `max_index` lies more than one below `min_index`.
    #[error("index bounds are inverted: min {min_index}, max {max_index}")]
    InvertedBounds {
        /// Requested lower bound (inclusive).
        min_index: usize,
        /// Requested upper bound (inclusive).
        max_index: usize,
    },
    /// The viewport plus tolerance on both sides does not fit in a `usize`.
    #[error("buffer too large: viewport {viewport_item_count} rows, tolerance {tolerance_item_count} rows")]
    BufferTooLarge {
        /// Requested viewport row count.
        viewport_item_count: usize,
        /// Requested tolerance row count.
        tolerance_item_count: usize,
    },
}

/// Rejects layouts whose `viewport + 2 * tolerance` overflows.
fn check_buffer(
    viewport_item_count: usize,
    tolerance_item_count: usize,
) -> Result<(), LayoutError> {
    tolerance_item_count
        .checked_mul(2)
        .and_then(|tolerance| viewport_item_count.checked_add(tolerance))
        .map(|_| ())
        .ok_or(LayoutError::BufferTooLarge {
            viewport_item_count,
            tolerance_item_count,
        })
}

/// Layout of a list whose rows all share one height.
///
/// The addressable index space is `min_index ..= min_index + row_count - 1`;
/// a `row_count` of zero is an empty list. Everything else (viewport height,
/// tolerance height, total height) is derived on demand, so changing the row
/// count or the viewport size never leaves stale values behind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig<S: Scalar> {
    item_height: S,
    viewport_item_count: usize,
    tolerance_item_count: usize,
    min_index: usize,
    row_count: usize,
}

impl<S: Scalar> LayoutConfig<S> {
    /// Creates a layout over an empty index space starting at `0`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidItemHeight`] if `item_height` is not a
    /// positive finite number, [`LayoutError::EmptyViewport`] if
    /// `viewport_item_count` is zero, and [`LayoutError::BufferTooLarge`] if
    /// `viewport_item_count + 2 * tolerance_item_count` overflows.
    pub fn new(
        item_height: S,
        viewport_item_count: usize,
        tolerance_item_count: usize,
    ) -> Result<Self, LayoutError> {
        if !item_height.is_finite() || item_height <= S::zero() {
            return Err(LayoutError::InvalidItemHeight);
        }
        if viewport_item_count == 0 {
            return Err(LayoutError::EmptyViewport);
        }
        check_buffer(viewport_item_count, tolerance_item_count)?;
        Ok(Self {
            item_height,
            viewport_item_count,
            tolerance_item_count,
            min_index: 0,
            row_count: 0,
        })
    }

    /// Sets the first addressable index.
    #[must_use]
    pub const fn with_min_index(mut self, min_index: usize) -> Self {
        self.min_index = min_index;
        self
    }

    /// Sets the number of rows in the index space.
    #[must_use]
    pub const fn with_row_count(mut self, row_count: usize) -> Self {
        self.row_count = row_count;
        self
    }

    /// Sets inclusive index bounds. `max_index == min_index - 1` is an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvertedBounds`] if `max_index + 1 < min_index`.
    pub fn with_index_bounds(
        mut self,
        min_index: usize,
        max_index: usize,
    ) -> Result<Self, LayoutError> {
        let end = max_index.saturating_add(1);
        if end < min_index {
            return Err(LayoutError::InvertedBounds {
                min_index,
                max_index,
            });
        }
        self.min_index = min_index;
        self.row_count = end - min_index;
        Ok(self)
    }

    /// Updates the row count, typically after the dataset was filtered or reset.
    pub fn set_row_count(&mut self, row_count: usize) {
        self.row_count = row_count;
    }

    /// Updates how many rows fit in the viewport (a viewport resize).
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::EmptyViewport`] for zero and
    /// [`LayoutError::BufferTooLarge`] on overflow; the layout is unchanged.
    pub fn set_viewport_item_count(
        &mut self,
        viewport_item_count: usize,
    ) -> Result<(), LayoutError> {
        if viewport_item_count == 0 {
            return Err(LayoutError::EmptyViewport);
        }
        check_buffer(viewport_item_count, self.tolerance_item_count)?;
        self.viewport_item_count = viewport_item_count;
        Ok(())
    }

    /// Height of a single row.
    #[must_use]
    pub const fn item_height(&self) -> S {
        self.item_height
    }

    /// Rows that fit in the viewport.
    #[must_use]
    pub const fn viewport_item_count(&self) -> usize {
        self.viewport_item_count
    }

    /// Extra rows buffered above and below the viewport.
    #[must_use]
    pub const fn tolerance_item_count(&self) -> usize {
        self.tolerance_item_count
    }

    /// First addressable index.
    #[must_use]
    pub const fn min_index(&self) -> usize {
        self.min_index
    }

    /// Last addressable index, or `None` for an empty list.
    #[must_use]
    pub const fn max_index(&self) -> Option<usize> {
        if self.row_count == 0 {
            None
        } else {
            Some(self.min_index + self.row_count - 1)
        }
    }

    /// Number of rows in the index space.
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.row_count
    }

    /// Rows materialized per window: the viewport plus tolerance on both sides.
    #[must_use]
    pub const fn buffered_item_count(&self) -> usize {
        // Checked on construction and resize.
        self.viewport_item_count + 2 * self.tolerance_item_count
    }

    /// Height of the visible viewport.
    #[must_use]
    pub fn viewport_height(&self) -> S {
        S::from_usize(self.viewport_item_count) * self.item_height
    }

    /// Height of the tolerance band on one side of the viewport.
    #[must_use]
    pub fn tolerance_height(&self) -> S {
        S::from_usize(self.tolerance_item_count) * self.item_height
    }

    /// Height of every row stacked end to end.
    #[must_use]
    pub fn total_height(&self) -> S {
        S::from_usize(self.row_count) * self.item_height
    }

    /// Offset of the top edge of `index` from the top of the list.
    ///
    /// Indices below `min_index` map to `0`.
    #[must_use]
    pub fn offset_of(&self, index: usize) -> S {
        S::from_usize(index.saturating_sub(self.min_index)) * self.item_height
    }

    /// Largest scroll offset that keeps the viewport inside the content.
    #[must_use]
    pub fn max_scroll_offset(&self) -> S {
        (self.total_height() - self.viewport_height()).max(S::zero())
    }
}

/// Plain description of a layout, suitable for loading from configuration.
///
/// Defaults describe a six-row viewport of 56-unit rows with three rows of
/// tolerance, addressed from index `1`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct LayoutSettings {
    /// Height of a single row.
    pub item_height: f64,
    /// Rows that fit in the viewport.
    pub viewport_item_count: usize,
    /// Extra rows buffered above and below the viewport.
    pub tolerance_item_count: usize,
    /// First addressable index.
    pub min_index: usize,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            item_height: 56.0,
            viewport_item_count: 6,
            tolerance_item_count: 3,
            min_index: 1,
        }
    }
}

impl TryFrom<LayoutSettings> for LayoutConfig<f64> {
    type Error = LayoutError;

    fn try_from(settings: LayoutSettings) -> Result<Self, Self::Error> {
        Ok(Self::new(
            settings.item_height,
            settings.viewport_item_count,
            settings.tolerance_item_count,
        )?
        .with_min_index(settings.min_index))
    }
}

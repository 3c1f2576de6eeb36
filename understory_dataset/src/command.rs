// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sort keys, view markers, and user-originated dataset commands.

use std::sync::Arc;

/// Direction of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl SortDirection {
    /// The opposite direction.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// A field name plus a direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortKey {
    /// Name passed to [`Row::field`](crate::Row::field).
    pub field: Arc<str>,
    /// Sort direction.
    pub direction: SortDirection,
}

impl SortKey {
    /// Creates a sort key.
    pub fn new(field: impl Into<Arc<str>>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

bitflags::bitflags! {
    /// Transformations active on a dataset view.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ViewMarkers: u8 {
        /// A sort is active.
        const SORTED = 1 << 0;
        /// A filter is active.
        const FILTERED = 1 << 1;
    }
}

/// A dataset mutation requested from the user interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetCommand {
    /// Sort by a column in a given direction.
    Sort {
        /// Column to sort by.
        field: Arc<str>,
        /// Sort direction.
        direction: SortDirection,
    },
    /// Sort by a column, flipping the direction if it is already the sort column.
    ToggleSort {
        /// Column to sort by.
        field: Arc<str>,
    },
    /// Return to load order, keeping any filter.
    ClearSort,
    /// Free-text search within one column; a blank query clears the filter.
    FilterText {
        /// Column to search.
        field: Arc<str>,
        /// Text to look for, case-insensitively.
        query: String,
    },
    /// Drop the filter, keeping any sort.
    ClearFilter,
    /// Restore load order with no sort and no filter.
    Reset,
}

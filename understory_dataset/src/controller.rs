// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The ordered row collection and its sort/filter view.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::{DatasetCommand, Row, SortDirection, SortKey, ViewMarkers};

/// Shared, immutable sequence of rows.
pub type Rows<R> = Arc<[Arc<R>]>;

/// A named row predicate.
pub struct RowFilter<R> {
    label: Arc<str>,
    predicate: Arc<dyn Fn(&R) -> bool + Send + Sync>,
}

impl<R> RowFilter<R> {
    /// Creates a filter; `label` describes it in logs and debug output.
    pub fn new(
        label: impl Into<Arc<str>>,
        predicate: impl Fn(&R) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Returns the filter's label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns `true` if `row` passes the filter.
    pub fn matches(&self, row: &R) -> bool {
        (self.predicate)(row)
    }
}

impl<R> Clone for RowFilter<R> {
    fn clone(&self) -> Self {
        Self {
            label: Arc::clone(&self.label),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<R> fmt::Debug for RowFilter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowFilter")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// One immutable state of the dataset. Every mutation builds a new one.
struct View<R> {
    load_order: Rows<R>,
    /// Every loaded row in the active sort order, before filtering.
    ordered: Rows<R>,
    rows: Rows<R>,
    sort: Option<SortKey>,
    filter: Option<RowFilter<R>>,
    revision: u64,
}

/// Owns an ordered row collection and the sort/filter view over it.
///
/// The controller keeps every loaded row in the active sort order and shows
/// the rows of that ordering that pass the active filter. Sorting and
/// filtering therefore compose regardless of the order they were requested
/// in, and clearing one keeps the other.
///
/// Each sort stably re-sorts the current ordering, so rows that compare equal
/// keep the relative order they had before: sorting by team after sorting by
/// age leaves each team ordered by age. [`clear_sort`](Self::clear_sort) and
/// [`reset`](Self::reset) go back to load order.
///
/// Every mutation replaces the whole view with one atomic swap. Readers such as
/// [`slice`](Self::slice) load the view once, so a read racing with a
/// mutation sees either the complete old ordering or the complete new one.
/// Mutating methods take `&self`; share the controller with `Arc`.
pub struct DatasetController<R> {
    view: ArcSwap<View<R>>,
}

impl<R> DatasetController<R> {
    /// Creates a controller over `rows` in load order.
    pub fn new(rows: impl IntoIterator<Item = R>) -> Self {
        Self::from_shared(rows.into_iter().map(Arc::new).collect())
    }

    /// Creates a controller over rows that are already shared.
    pub fn from_shared(rows: Vec<Arc<R>>) -> Self {
        let load_order: Rows<R> = rows.into();
        Self {
            view: ArcSwap::from_pointee(View {
                ordered: Arc::clone(&load_order),
                rows: Arc::clone(&load_order),
                load_order,
                sort: None,
                filter: None,
                revision: 0,
            }),
        }
    }

    /// Number of rows in the current view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.view.load().rows.len()
    }

    /// Returns `true` if the current view has no rows.
    ///
    /// A filter that matches nothing makes the view empty; this is a valid
    /// state, not an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.view.load().rows.is_empty()
    }

    /// Number of rows that were loaded, ignoring any filter.
    #[must_use]
    pub fn loaded_len(&self) -> usize {
        self.view.load().load_order.len()
    }

    /// Rows at positions `start ..= end` of the current view.
    ///
    /// `end` is clamped to the last row. An empty vector is returned when the
    /// clamped range is empty; that is never an error.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> Vec<Arc<R>> {
        let view = self.view.load();
        let Some(last) = view.rows.len().checked_sub(1) else {
            return Vec::new();
        };
        let end = end.min(last);
        if start > end {
            return Vec::new();
        }
        view.rows[start..=end].to_vec()
    }

    /// The row at `position` in the current view.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<Arc<R>> {
        self.view.load().rows.get(position).cloned()
    }

    /// The whole current view.
    #[must_use]
    pub fn snapshot(&self) -> Rows<R> {
        Arc::clone(&self.view.load().rows)
    }

    /// The active sort, if any.
    #[must_use]
    pub fn sort_key(&self) -> Option<SortKey> {
        self.view.load().sort.clone()
    }

    /// The label of the active filter, if any.
    #[must_use]
    pub fn filter_label(&self) -> Option<Arc<str>> {
        self.view
            .load()
            .filter
            .as_ref()
            .map(|filter| Arc::clone(&filter.label))
    }

    /// Which transformations are active.
    #[must_use]
    pub fn markers(&self) -> ViewMarkers {
        let view = self.view.load();
        let mut markers = ViewMarkers::empty();
        markers.set(ViewMarkers::SORTED, view.sort.is_some());
        markers.set(ViewMarkers::FILTERED, view.filter.is_some());
        markers
    }

    /// Counter bumped by every mutation.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.view.load().revision
    }
}

impl<R: Row> DatasetController<R> {
    /// Replaces the loaded rows wholesale, dropping any sort or filter.
    pub fn load(&self, rows: impl IntoIterator<Item = R>) {
        let load_order: Rows<R> = rows.into_iter().map(Arc::new).collect::<Vec<_>>().into();
        self.view.rcu(|current| View {
            load_order: Arc::clone(&load_order),
            ordered: Arc::clone(&load_order),
            rows: Arc::clone(&load_order),
            sort: None,
            filter: None,
            revision: current.revision + 1,
        });
    }

    /// Sorts by `field` in `direction`, keeping any active filter.
    ///
    /// Rows lacking the field sort before rows that have it (after, when
    /// descending). Ties keep their order from before this call.
    pub fn sort(&self, field: impl Into<Arc<str>>, direction: SortDirection) {
        let key = SortKey::new(field, direction);
        self.update(|current| {
            (
                sorted(&current.ordered, &key),
                Some(key.clone()),
                current.filter.clone(),
            )
        });
    }

    /// Restores load order, keeping any active filter.
    pub fn clear_sort(&self) {
        self.update(|current| {
            (
                Arc::clone(&current.load_order),
                None,
                current.filter.clone(),
            )
        });
    }

    /// Keeps only rows matching `predicate`, replacing any previous filter.
    ///
    /// The filter applies on top of the active sort.
    pub fn filter(
        &self,
        label: impl Into<Arc<str>>,
        predicate: impl Fn(&R) -> bool + Send + Sync + 'static,
    ) {
        self.set_filter(RowFilter::new(label, predicate));
    }

    /// Replaces the active filter.
    pub fn set_filter(&self, filter: RowFilter<R>) {
        self.update(|current| {
            (
                Arc::clone(&current.ordered),
                current.sort.clone(),
                Some(filter.clone()),
            )
        });
    }

    /// Keeps rows whose text `field` contains `query`, ignoring case.
    ///
    /// A blank query clears the filter instead.
    pub fn filter_text(&self, field: impl Into<Arc<str>>, query: &str) {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            self.clear_filter();
            return;
        }
        let field: Arc<str> = field.into();
        let label = format!("{field} contains {query:?}");
        self.filter(label, move |row: &R| {
            row.field(&field)
                .and_then(|value| value.as_text().map(str::to_lowercase))
                .is_some_and(|text| text.contains(&query))
        });
    }

    /// Drops the active filter, keeping any active sort.
    pub fn clear_filter(&self) {
        self.update(|current| (Arc::clone(&current.ordered), current.sort.clone(), None));
    }

    /// Restores the original load order and clears both sort and filter.
    pub fn reset(&self) {
        self.update(|current| (Arc::clone(&current.load_order), None, None));
    }

    /// Applies a renderer-originated command.
    pub fn apply(&self, command: &DatasetCommand) {
        match command {
            DatasetCommand::Sort { field, direction } => self.sort(Arc::clone(field), *direction),
            DatasetCommand::ToggleSort { field } => {
                let direction = match self.sort_key() {
                    Some(active) if active.field == *field => active.direction.toggled(),
                    _ => SortDirection::Ascending,
                };
                self.sort(Arc::clone(field), direction);
            }
            DatasetCommand::ClearSort => self.clear_sort(),
            DatasetCommand::FilterText { field, query } => {
                self.filter_text(Arc::clone(field), query);
            }
            DatasetCommand::ClearFilter => self.clear_filter(),
            DatasetCommand::Reset => self.reset(),
        }
    }

    fn update(
        &self,
        select: impl Fn(&View<R>) -> (Rows<R>, Option<SortKey>, Option<RowFilter<R>>),
    ) {
        self.view.rcu(|current| {
            let (ordered, sort, filter) = select(&**current);
            View {
                load_order: Arc::clone(&current.load_order),
                rows: filtered(&ordered, filter.as_ref()),
                ordered,
                sort,
                filter,
                revision: current.revision + 1,
            }
        });
    }
}

impl<R> fmt::Debug for DatasetController<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.view.load();
        f.debug_struct("DatasetController")
            .field("len", &view.rows.len())
            .field("loaded_len", &view.load_order.len())
            .field("sort", &view.sort)
            .field("filter", &view.filter)
            .field("revision", &view.revision)
            .finish()
    }
}

fn sorted<R: Row>(ordered: &Rows<R>, key: &SortKey) -> Rows<R> {
    let mut rows = ordered.to_vec();
    // `sort_by` is stable; reversing the comparison keeps ties in place.
    rows.sort_by(|a, b| {
        let ordering = a.field(&key.field).cmp(&b.field(&key.field));
        match key.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    rows.into()
}

fn filtered<R>(ordered: &Rows<R>, filter: Option<&RowFilter<R>>) -> Rows<R> {
    match filter {
        Some(filter) => ordered
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect::<Vec<_>>()
            .into(),
        None => Arc::clone(ordered),
    }
}

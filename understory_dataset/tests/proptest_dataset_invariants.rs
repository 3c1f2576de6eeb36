// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for the dataset view.
//!
//! 1. Sorting twice by the same key equals sorting once.
//! 2. Sorting is stable: ties keep load order.
//! 3. Filter and sort commute, and `reset` restores load order.
//! 4. `slice` is clamped and never panics.

use proptest::prelude::*;
use understory_dataset::{DatasetController, FieldValue, Row, SortDirection};

#[derive(Debug, Clone)]
struct Item {
    id: usize,
    group: i64,
    label: String,
}

impl Row for Item {
    type Key = usize;

    fn key(&self) -> usize {
        self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "group" => Some(FieldValue::Integer(self.group)),
            "label" => Some(FieldValue::Text(&self.label)),
            _ => None,
        }
    }
}

fn items() -> impl Strategy<Value = Vec<Item>> {
    proptest::collection::vec((0_i64..5, "[a-c]{0,3}"), 0..60).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(id, (group, label))| Item { id, group, label })
            .collect()
    })
}

fn directions() -> impl Strategy<Value = SortDirection> {
    prop_oneof![Just(SortDirection::Ascending), Just(SortDirection::Descending)]
}

fn ids(dataset: &DatasetController<Item>) -> Vec<usize> {
    dataset.snapshot().iter().map(|row| row.id).collect()
}

proptest! {
    #[test]
    fn sort_is_idempotent(rows in items(), direction in directions()) {
        let dataset = DatasetController::new(rows);
        dataset.sort("group", direction);
        let once = ids(&dataset);
        dataset.sort("group", direction);
        prop_assert_eq!(ids(&dataset), once);
    }

    #[test]
    fn ties_keep_load_order(rows in items(), direction in directions()) {
        let dataset = DatasetController::new(rows);
        dataset.sort("group", direction);
        let sorted = dataset.snapshot();
        for pair in sorted.windows(2) {
            if pair[0].group == pair[1].group {
                prop_assert!(pair[0].id < pair[1].id);
            }
        }
    }

    #[test]
    fn filter_and_sort_commute(rows in items(), needle in "[a-c]") {
        let first = DatasetController::new(rows.clone());
        first.sort("label", SortDirection::Ascending);
        first.filter_text("label", &needle);

        let second = DatasetController::new(rows.clone());
        second.filter_text("label", &needle);
        second.sort("label", SortDirection::Ascending);

        prop_assert_eq!(ids(&first), ids(&second));

        first.reset();
        prop_assert_eq!(ids(&first), (0..rows.len()).collect::<Vec<_>>());
    }

    #[test]
    fn slice_is_clamped(rows in items(), start in 0_usize..80, span in 0_usize..80) {
        let len = rows.len();
        let dataset = DatasetController::new(rows);
        let slice = dataset.slice(start, start + span);
        let expected = if start >= len { 0 } else { (start + span).min(len - 1) - start + 1 };
        prop_assert_eq!(slice.len(), expected);
    }
}

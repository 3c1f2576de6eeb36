// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sorting, searching, and resetting a local table while scrolled.
//!
//! This example shows:
//! - `understory_dataset` holding a page of users with sort and filter,
//! - the engine recomputing the window after each `DatasetCommand`,
//! - a search that matches nothing producing an empty, not broken, window.
//!
//! Run:
//! - `cargo run -p understory_demos --example local_sort_filter`

use std::sync::Arc;

use understory_dataset::{DatasetCommand, DatasetController, FieldValue, Row, SortDirection};
use understory_scroll_window::{InitialPosition, RangeSource, ScrollWindowEngine};
use understory_window_geometry::{LayoutConfig, ScrollAlign};

#[derive(Debug)]
struct User {
    id: i64,
    company: &'static str,
    username: String,
}

impl Row for User {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Integer(self.id)),
            "company" => Some(FieldValue::Text(self.company)),
            "username" => Some(FieldValue::Text(&self.username)),
            _ => None,
        }
    }
}

fn show(engine: &ScrollWindowEngine<User>, label: &str) {
    let window = engine.snapshot();
    if window.is_empty {
        println!("{label}: no matching users");
        return;
    }
    let first: Vec<_> = window
        .visible_rows
        .iter()
        .take(4)
        .map(|visible| format!("{}@{}", visible.row.username, visible.row.company))
        .collect();
    println!(
        "{label}: rows {}..={} of {} [{}]",
        window.anchor_index,
        window.anchor_index + window.count - 1,
        engine.layout().row_count(),
        first.join(", ")
    );
}

fn main() {
    let companies = ["Acme", "Globex", "Initech"];
    let dataset = Arc::new(DatasetController::new((0..100).map(|id| User {
        id,
        company: companies[id as usize % companies.len()],
        username: format!("user{id:03}"),
    })));

    let layout = LayoutConfig::new(56.0, 6, 3)
        .expect("valid layout")
        .with_min_index(1);
    let mut engine = ScrollWindowEngine::new(layout, RangeSource::local(Arc::clone(&dataset)))
        .expect("local sources need no runtime");

    engine.on_initial_mount(InitialPosition::Index(6));
    show(&engine, "mounted at row 6");

    engine.scroll_to_index(60, ScrollAlign::Center);
    show(&engine, "centered on row 60");

    engine.on_command(&DatasetCommand::ToggleSort {
        field: "company".into(),
    });
    show(&engine, "company ascending");
    engine.on_command(&DatasetCommand::ToggleSort {
        field: "company".into(),
    });
    show(&engine, "company descending");

    engine.on_command(&DatasetCommand::FilterText {
        field: "username".into(),
        query: "user09".into(),
    });
    show(&engine, "search user09");

    engine.on_command(&DatasetCommand::FilterText {
        field: "username".into(),
        query: "nobody".into(),
    });
    show(&engine, "search nobody");

    engine.on_command(&DatasetCommand::Sort {
        field: "id".into(),
        direction: SortDirection::Descending,
    });
    engine.on_command(&DatasetCommand::Reset);
    show(&engine, "reset");
    println!("dataset markers after reset: {:?}", dataset.markers());
}

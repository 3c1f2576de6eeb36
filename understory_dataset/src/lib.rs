// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_dataset --heading-base-level=0

//! Understory Dataset: the ordered row collection behind a virtualized list.
//!
//! A [`DatasetController`] owns rows in their load order and maintains a view
//! over them: optionally sorted by one field ([`SortKey`]) and optionally
//! filtered by one predicate ([`RowFilter`]). Windowing code reads the view
//! through [`DatasetController::len`] and [`DatasetController::slice`] only.
//!
//! - Sorting is stable and uses the natural order of [`FieldValue`].
//! - Sorting and filtering compose; [`DatasetController::reset`] undoes both.
//! - An empty filter result is a valid, ordinary state.
//! - Mutations swap the whole view atomically, so a concurrent reader never
//!   observes a half-sorted sequence.
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_dataset::{DatasetController, FieldValue, Row, SortDirection};
//!
//! struct Fruit(&'static str, i64);
//!
//! impl Row for Fruit {
//!     type Key = &'static str;
//!     fn key(&self) -> &'static str { self.0 }
//!     fn field(&self, name: &str) -> Option<FieldValue<'_>> {
//!         match name {
//!             "name" => Some(FieldValue::Text(self.0)),
//!             "stock" => Some(FieldValue::Integer(self.1)),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let fruit = DatasetController::new([Fruit("pear", 3), Fruit("fig", 9), Fruit("kiwi", 3)]);
//! fruit.sort("stock", SortDirection::Descending);
//! let names: Vec<_> = fruit.slice(0, 2).iter().map(|f| f.0).collect();
//! assert_eq!(names, ["fig", "pear", "kiwi"]);
//!
//! fruit.filter_text("name", "I");
//! assert_eq!(fruit.len(), 2);
//!
//! fruit.reset();
//! assert_eq!(fruit.slice(0, 0)[0].0, "pear");
//! ```

mod command;
mod controller;
mod row;

pub use command::{DatasetCommand, SortDirection, SortKey, ViewMarkers};
pub use controller::{DatasetController, RowFilter, Rows};
pub use row::{FieldValue, Row};

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row records and their sortable field values.

use core::cmp::Ordering;
use core::fmt::Debug;
use core::hash::Hash;

/// A record in a [`DatasetController`](crate::DatasetController).
///
/// The windowing layer treats rows as opaque: it only forwards them to the
/// renderer, which uses [`Row::key`] to reconcile its list of children. Named
/// field access exists for sorting and filtering.
pub trait Row: Send + Sync + 'static {
    /// Stable identity of a row across sorts and filters.
    type Key: Clone + Eq + Hash + Debug + Send + Sync;

    /// Returns this row's identity.
    fn key(&self) -> Self::Key;

    /// Returns the value of the named field, or `None` if the row has no such field.
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

/// A borrowed field value with a total natural order.
///
/// Values of the same kind compare the obvious way (text lexicographically,
/// floats by [`f64::total_cmp`]). Values of different kinds order by kind:
/// `Bool < Integer < Float < Text`.
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    /// Boolean field.
    Bool(bool),
    /// Integer field.
    Integer(i64),
    /// Floating-point field.
    Float(f64),
    /// Text field.
    Text(&'a str),
}

impl FieldValue<'_> {
    const fn rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Integer(_) => 1,
            Self::Float(_) => 2,
            Self::Text(_) => 3,
        }
    }

    /// Returns the text if this is a [`FieldValue::Text`].
    #[must_use]
    pub const fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl Ord for FieldValue<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for FieldValue<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FieldValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FieldValue<'_> {}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue<'_> {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue<'_> {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue<'_> {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::FieldValue;

    #[test]
    fn same_kind_compares_naturally() {
        assert!(FieldValue::Text("abc") < FieldValue::Text("abd"));
        assert!(FieldValue::Integer(-3) < FieldValue::Integer(2));
        assert!(FieldValue::Float(0.5) < FieldValue::Float(1.5));
        assert!(FieldValue::Bool(false) < FieldValue::Bool(true));
        // NaN still has a place in the order.
        assert!(FieldValue::Float(1.0) < FieldValue::Float(f64::NAN));
    }

    #[test]
    fn mixed_kinds_order_by_kind() {
        assert!(FieldValue::Bool(true) < FieldValue::Integer(0));
        assert!(FieldValue::Integer(i64::MAX) < FieldValue::Float(f64::MIN));
        assert!(FieldValue::Float(1.0e300) < FieldValue::Text(""));
        // A missing field sorts before any present one.
        assert!(None < Some(FieldValue::Bool(false)));
    }
}

//! Categorical feature encoding transformers.
//!
//! # Available Encoders
//!
//! ## OrdinalEncoder
//! Maps each category to its rank among the sorted training categories.
//! Categories never seen during fit map to a sentinel (`-1` by default).
//!
//! ## OneHotEncoder
//! Expands each category to an indicator column. The first sorted category is
//! dropped as the reference level; unseen categories produce an all-zero row.
//!
//! # Design Notes
//!
//! Both encoders read named columns from a [`Table`](crate::table::Table) and
//! treat values as strings. Numeric columns are rendered with the same
//! formatting the CSV writer uses, so `3` and `"3"` are the same category.
//! Neither encoder ever fails on an unknown value: unseen categories are
//! logged as [`Anomaly::UnseenCategory`](crate::error::Anomaly) and mapped to
//! the sentinel.

mod one_hot;
mod ordinal;

pub use one_hot::{FittedOneHotEncoder, OneHotEncoder};
pub use ordinal::{FittedOrdinalEncoder, OrdinalEncoder, UNKNOWN_ORDINAL};

use crate::error::Anomaly;
use crate::table::Column;
use std::collections::BTreeSet;

/// Categorical view of a column: one optional string per row.
pub(crate) fn categorical_values(column: &Column) -> Vec<Option<String>> {
    (0..column.len()).map(|row| column.cell_to_string(row)).collect()
}

/// Sorted unique non-null categories.
pub(crate) fn unique_sorted(values: &[Option<String>]) -> Vec<String> {
    values
        .iter()
        .flatten()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Log each distinct unseen value of `column` once per transform call.
pub(crate) fn report_unseen(column: &str, unseen: BTreeSet<String>) {
    for value in unseen {
        Anomaly::UnseenCategory {
            column: column.to_string(),
            value,
        }
        .emit();
    }
}

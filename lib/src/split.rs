//! Seeded train/validation partitioning.
//!
//! Splits are reproducible: the same row count, configuration and seed always
//! give the same partitions. Both index lists are returned sorted so that the
//! partitions keep the table's row order.

use crate::error::{PipelineError, Result};
use crate::table::Table;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Split settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Share of rows that go to validation, in `(0, 1)`.
    pub fraction: f64,
    pub seed: u64,
    /// Column whose values define strata. `None` disables stratification.
    pub stratify_by: Option<String>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            fraction: 0.2,
            seed: 42,
            stratify_by: None,
        }
    }
}

/// Partition `0..n` into sorted `(train, valid)` index lists.
///
/// With `strata`, every stratum (null is a stratum of its own) contributes
/// `round(size * fraction)` rows to validation, clamped to `[1, size - 1]`.
/// Without it, validation gets `ceil(n * fraction)` rows.
///
/// # Errors
/// - `InvalidParameter` if `fraction` is outside `(0, 1)` or `strata` has the
///   wrong length.
/// - `Stratification` if a stratum has fewer than two rows.
/// - `EmptyData` if either partition would be empty.
pub fn train_valid_indices(
    n: usize,
    config: &SplitConfig,
    strata: Option<&[Option<String>]>,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let fraction = config.fraction;
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(PipelineError::InvalidParameter(format!(
            "validation fraction must be in (0, 1), got {}",
            fraction
        )));
    }
    if n == 0 {
        return Err(PipelineError::EmptyData("no rows to split".to_string()));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut valid = Vec::new();

    match strata {
        None => {
            let mut indices: Vec<usize> = (0..n).collect();
            indices.shuffle(&mut rng);
            let k = ((n as f64) * fraction).ceil() as usize;
            valid.extend_from_slice(&indices[..k.min(n)]);
        }
        Some(values) => {
            if values.len() != n {
                return Err(PipelineError::InvalidParameter(format!(
                    "{} stratum values for {} rows",
                    values.len(),
                    n
                )));
            }
            let mut groups: BTreeMap<Option<&str>, Vec<usize>> = BTreeMap::new();
            for (row, value) in values.iter().enumerate() {
                groups.entry(value.as_deref()).or_default().push(row);
            }

            for (stratum, mut members) in groups {
                let size = members.len();
                if size < 2 {
                    return Err(PipelineError::Stratification {
                        stratum: stratum.unwrap_or("<null>").to_string(),
                        count: size,
                    });
                }
                let k = ((size as f64) * fraction).round() as usize;
                let k = k.clamp(1, size - 1);
                members.shuffle(&mut rng);
                valid.extend_from_slice(&members[..k]);
            }
        }
    }

    valid.sort_unstable();
    let mut is_valid = vec![false; n];
    for &i in &valid {
        is_valid[i] = true;
    }
    let train: Vec<usize> = (0..n).filter(|&i| !is_valid[i]).collect();

    if train.is_empty() {
        return Err(PipelineError::EmptyData(
            "training partition is empty".to_string(),
        ));
    }

    tracing::debug!(
        train = train.len(),
        valid = valid.len(),
        stratified = strata.is_some(),
        "split rows"
    );
    Ok((train, valid))
}

/// Split a table into `(train, valid)` tables, stratifying on
/// `config.stratify_by` when set.
pub fn split_table(table: &Table, config: &SplitConfig) -> Result<(Table, Table)> {
    let strata = match &config.stratify_by {
        Some(column) => {
            let col = table.column(column).ok_or_else(|| PipelineError::Schema {
                column: column.clone(),
            })?;
            Some(
                (0..table.n_rows())
                    .map(|row| col.cell_to_string(row))
                    .collect::<Vec<_>>(),
            )
        }
        None => None,
    };

    let (train, valid) = train_valid_indices(table.n_rows(), config, strata.as_deref())?;
    Ok((table.take_rows(&train), table.take_rows(&valid)))
}

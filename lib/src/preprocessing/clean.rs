//! Normalization of raw CSV exports.
//!
//! The [`Cleaner`] turns a freshly loaded table (every cell text) into a table
//! with tidy strings, no parser artifacts and numeric columns where the data
//! is mostly numeric:
//!
//! 1. Column names are trimmed; `Unnamed*` index columns are dropped.
//! 2. Text cells get internal whitespace collapsed, surrounding quotes and
//!    whitespace stripped. Empty results become null.
//! 3. Rows that are entirely null, or have a null primary key, are dropped.
//! 4. Text columns whose non-null values are mostly numeric-looking are
//!    coerced to numbers. Values that fail coercion become null and are
//!    reported as a [`Anomaly::CoercionWarning`].
//! 5. Rows whose primary key is not an integer after coercion are dropped.

use crate::error::{Anomaly, PipelineError, Result};
use crate::table::{Column, Table};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Cleaner settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanConfig {
    /// Primary key column. Must be present.
    pub id_column: String,
    /// A text column is coerced to numeric when strictly more than this share
    /// of its non-null values look numeric.
    pub numeric_ratio: f64,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            id_column: "Land_ID".to_string(),
            numeric_ratio: 0.5,
        }
    }
}

/// Output of [`Cleaner::clean`].
#[derive(Clone, Debug)]
pub struct Cleaned {
    pub table: Table,
    pub anomalies: Vec<Anomaly>,
    /// Rows removed for being empty or lacking an integer primary key.
    pub rows_dropped: usize,
}

/// Raw-table normalizer.
#[derive(Debug)]
pub struct Cleaner {
    config: CleanConfig,
    whitespace: Regex,
    numeric_like: Regex,
    index_artifact: Regex,
}

impl Cleaner {
    /// Build a cleaner. Fails when `numeric_ratio` is outside `[0, 1)`.
    pub fn new(config: CleanConfig) -> Result<Self> {
        if !(0.0..1.0).contains(&config.numeric_ratio) {
            return Err(PipelineError::InvalidParameter(format!(
                "numeric_ratio must be in [0, 1), got {}",
                config.numeric_ratio
            )));
        }
        Ok(Self {
            config,
            whitespace: compile(r"\s+")?,
            numeric_like: compile(r"^[0-9.\-]+$")?,
            index_artifact: compile(r"^Unnamed")?,
        })
    }

    /// Clean `table`, returning a fresh table.
    pub fn clean(&self, table: &Table) -> Result<Cleaned> {
        let mut anomalies = Vec::new();

        let mut columns = Vec::with_capacity(table.n_cols());
        for (name, column) in table.columns() {
            let name = name.trim();
            if self.index_artifact.is_match(name) {
                tracing::debug!(column = %name, "dropping index artifact column");
                continue;
            }
            columns.push((name.to_string(), self.normalize_column(column)));
        }
        let normalized = Table::from_columns(columns)?;

        let key = &self.config.id_column;
        let Some(key_column) = normalized.column(key) else {
            return Err(PipelineError::Schema {
                column: key.clone(),
            });
        };

        let keep: Vec<bool> = (0..normalized.n_rows())
            .map(|row| {
                let all_null = normalized.columns().all(|(_, c)| c.is_null(row));
                !all_null && !key_column.is_null(row)
            })
            .collect();
        let mut cleaned = normalized.retain_rows(&keep);

        let names: Vec<String> = cleaned.column_names().to_vec();
        for name in names {
            let Some(Column::Text(values)) = cleaned.column(&name) else {
                continue;
            };
            if let Some((coerced, failed)) = self.coerce(values) {
                cleaned.insert_column(name.as_str(), coerced)?;
                if failed > 0 {
                    Anomaly::CoercionWarning {
                        column: name,
                        failed,
                    }
                    .record(&mut anomalies);
                }
            }
        }

        // Keys that did not survive coercion as integers
        let keyed: Vec<bool> = (0..cleaned.n_rows())
            .map(|row| cleaned.id_at(key, row).is_some())
            .collect();
        let unkeyed = keyed.iter().filter(|k| !**k).count();
        if unkeyed > 0 {
            tracing::warn!(column = %key, rows = unkeyed, "dropping rows without an integer key");
            cleaned = cleaned.retain_rows(&keyed);
        }
        let rows_dropped = table.n_rows() - cleaned.n_rows();

        tracing::debug!(
            rows = cleaned.n_rows(),
            columns = cleaned.n_cols(),
            rows_dropped,
            "cleaned table"
        );
        Ok(Cleaned {
            table: cleaned,
            anomalies,
            rows_dropped,
        })
    }

    /// Normalize one cell. Returns `None` if nothing is left.
    pub fn normalize_cell(&self, raw: &str) -> Option<String> {
        let collapsed = self.whitespace.replace_all(raw, " ");
        let stripped = collapsed
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .trim();
        (!stripped.is_empty()).then(|| stripped.to_string())
    }

    fn normalize_column(&self, column: &Column) -> Column {
        match column {
            Column::Numeric(_) => column.clone(),
            Column::Text(values) => Column::Text(
                values
                    .iter()
                    .map(|cell| cell.as_deref().and_then(|s| self.normalize_cell(s)))
                    .collect(),
            ),
        }
    }

    /// Numeric version of `values` and the number of failed cells, or `None`
    /// when the column is not numeric enough to coerce.
    fn coerce(&self, values: &[Option<String>]) -> Option<(Column, usize)> {
        let present: Vec<&str> = values.iter().flatten().map(String::as_str).collect();
        if present.is_empty() {
            return None;
        }
        let matching = present
            .iter()
            .filter(|s| self.numeric_like.is_match(s))
            .count();
        if matching as f64 / present.len() as f64 <= self.config.numeric_ratio {
            return None;
        }

        let mut failed = 0;
        let coerced = values
            .iter()
            .map(|cell| {
                let s = cell.as_deref()?;
                let parsed = self
                    .numeric_like
                    .is_match(s)
                    .then(|| s.parse::<f64>().ok())
                    .flatten()
                    .filter(|x| x.is_finite());
                if parsed.is_none() {
                    failed += 1;
                }
                parsed
            })
            .collect();
        Some((Column::Numeric(coerced), failed))
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| PipelineError::InvalidParameter(format!("bad pattern {}: {}", pattern, e)))
}

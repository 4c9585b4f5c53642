//! One-hot encoding for categorical features.
//!
//! Transforms categorical values to one-hot (dummy) encoded indicator columns.

use crate::error::{PipelineError, Result};
use crate::preprocessing::encoding::{categorical_values, report_unseen, unique_sorted};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::table::Table;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One-hot encoder for categorical features.
///
/// Each input column is treated as a categorical feature, and the encoder
/// learns the unique values present in each column during fitting. With
/// `drop_first` (the default) the first sorted category of every column is
/// the reference level and gets no indicator column.
///
/// # Example
/// ```ignore
/// // State: ["goa", "kerala", "assam"]
/// let encoder = OneHotEncoder::new(vec!["State".to_string()]);
/// let fitted = encoder.fit(&table)?;
///
/// // Columns: State_goa, State_kerala  (assam dropped as reference)
/// // [[1, 0],
/// //  [0, 1],
/// //  [0, 0]]
/// let encoded = fitted.transform(&table)?;
/// ```
#[derive(Clone, Debug)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    drop_first: bool,
}

impl OneHotEncoder {
    /// Create a new OneHotEncoder for the given columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            drop_first: true,
        }
    }

    /// Keep or drop the reference category of each column.
    pub fn with_drop_first(mut self, drop_first: bool) -> Self {
        self.drop_first = drop_first;
        self
    }
}

/// Fitted OneHotEncoder ready for inference.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FittedOneHotEncoder {
    /// Encoded columns, in output order.
    columns: Vec<String>,
    /// All categories (unique sorted values) seen for each column.
    categories_: Vec<Vec<String>>,
    /// Whether the first category of each column has no indicator.
    drop_first: bool,
}

impl FittedOneHotEncoder {
    /// Get the categories learned for each column (including dropped ones).
    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories_
    }

    /// Categories that receive an indicator column.
    fn encoded_categories(&self, col: usize) -> &[String] {
        let cats = &self.categories_[col];
        if self.drop_first && !cats.is_empty() {
            &cats[1..]
        } else {
            cats
        }
    }
}

impl Transformer for OneHotEncoder {
    type Input = Table;
    type Output = Array2<f64>;
    type Fitted = FittedOneHotEncoder;

    fn fit(&self, data: &Table) -> Result<FittedOneHotEncoder> {
        if data.is_empty() {
            return Err(PipelineError::EmptyData(
                "Cannot fit OneHotEncoder on empty data".to_string(),
            ));
        }

        let mut columns = Vec::new();
        let mut categories_ = Vec::new();
        for name in &self.columns {
            let Some(column) = data.column(name) else {
                tracing::debug!(column = %name, "one-hot column absent at fit, skipping");
                continue;
            };
            columns.push(name.clone());
            categories_.push(unique_sorted(&categorical_values(column)));
        }

        Ok(FittedOneHotEncoder {
            columns,
            categories_,
            drop_first: self.drop_first,
        })
    }
}

impl FittedTransformer for FittedOneHotEncoder {
    type Input = Table;
    type Output = Array2<f64>;

    fn transform(&self, data: &Table) -> Result<Array2<f64>> {
        let rows = data.n_rows();
        let n_out = self.n_features_out();
        let mut result = Array2::zeros((rows, n_out));

        let mut offset = 0;
        for (col, name) in self.columns.iter().enumerate() {
            let column = data
                .column(name)
                .ok_or_else(|| PipelineError::FeatureMismatch {
                    column: name.clone(),
                })?;
            let all_cats = &self.categories_[col];
            let encoded = self.encoded_categories(col);

            let mut unseen = BTreeSet::new();
            for (row, value) in categorical_values(column).into_iter().enumerate() {
                let Some(value) = value else { continue };
                match encoded.iter().position(|c| *c == value) {
                    Some(idx) => result[[row, offset + idx]] = 1.0,
                    // Reference level: all zeros
                    None if all_cats.contains(&value) => {}
                    None => {
                        unseen.insert(value);
                    }
                }
            }
            report_unseen(name, unseen);
            offset += encoded.len();
        }

        Ok(result)
    }

    fn n_features_in(&self) -> usize {
        self.columns.len()
    }

    fn feature_names_out(&self) -> Vec<String> {
        self.columns
            .iter()
            .enumerate()
            .flat_map(|(col, name)| {
                self.encoded_categories(col)
                    .iter()
                    .map(move |cat| format!("{}_{}", name, cat))
            })
            .collect()
    }
}

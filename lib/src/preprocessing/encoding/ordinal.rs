//! Ordinal encoding for categorical features.
//!
//! Maps categorical values to integer ordinals (0, 1, 2, ...).

use crate::error::{PipelineError, Result};
use crate::preprocessing::encoding::{categorical_values, report_unseen, unique_sorted};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::table::Table;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Value assigned to categories that were not seen during fit.
pub const UNKNOWN_ORDINAL: f64 = -1.0;

/// Ordinal encoder for categorical features.
///
/// Maps each unique category to an integer ordinal (0, 1, 2, ...).
/// The mapping is learned from the training data, with categories
/// sorted in ascending order.
///
/// # Example
/// ```ignore
/// // Soil_Type: ["red", "black", "red"]
/// let encoder = OrdinalEncoder::new(vec!["Soil_Type".to_string()]);
/// let fitted = encoder.fit(&table)?;
///
/// // Output: [[1], [0], [1]]  (black -> 0, red -> 1)
/// let encoded = fitted.transform(&table)?;
/// ```
#[derive(Clone, Debug)]
pub struct OrdinalEncoder {
    /// Columns to encode; columns absent at fit time are skipped.
    columns: Vec<String>,
    /// Value for unseen or null categories.
    unknown_value: f64,
}

impl OrdinalEncoder {
    /// Create a new OrdinalEncoder for the given columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            unknown_value: UNKNOWN_ORDINAL,
        }
    }

    /// Set the sentinel for unseen categories.
    pub fn with_unknown_value(mut self, value: f64) -> Self {
        self.unknown_value = value;
        self
    }
}

/// Fitted OrdinalEncoder ready for inference.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FittedOrdinalEncoder {
    /// Encoded columns, in output order.
    columns: Vec<String>,
    /// Categories (unique sorted values) for each column.
    categories_: Vec<Vec<String>>,
    /// Mapping from category to ordinal index for each column.
    mappings_: Vec<HashMap<String, usize>>,
    /// Value for unseen or null categories.
    unknown_value: f64,
}

impl FittedOrdinalEncoder {
    /// Get the categories learned for each column.
    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories_
    }

    /// Get the mapping (category -> ordinal) for a specific column.
    pub fn mapping(&self, column_idx: usize) -> Option<&HashMap<String, usize>> {
        self.mappings_.get(column_idx)
    }

    /// Map ordinals back to categories. Sentinels and out-of-range values
    /// decode to `None`.
    pub fn inverse_transform(&self, data: &Array2<f64>) -> Result<Vec<Vec<Option<String>>>> {
        if data.ncols() != self.columns.len() {
            return Err(PipelineError::InvalidShape {
                expected: self.columns.len(),
                got: data.ncols(),
            });
        }

        Ok(data
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .zip(&self.categories_)
                    .map(|(&code, cats)| {
                        if code < 0.0 || code.fract() != 0.0 {
                            None
                        } else {
                            cats.get(code as usize).cloned()
                        }
                    })
                    .collect()
            })
            .collect())
    }
}

impl Transformer for OrdinalEncoder {
    type Input = Table;
    type Output = Array2<f64>;
    type Fitted = FittedOrdinalEncoder;

    fn fit(&self, data: &Table) -> Result<FittedOrdinalEncoder> {
        if data.is_empty() {
            return Err(PipelineError::EmptyData(
                "Cannot fit OrdinalEncoder on empty data".to_string(),
            ));
        }

        let mut columns = Vec::new();
        let mut categories_ = Vec::new();
        let mut mappings_ = Vec::new();

        for name in &self.columns {
            let Some(column) = data.column(name) else {
                tracing::debug!(column = %name, "ordinal column absent at fit, skipping");
                continue;
            };

            let sorted_cats = unique_sorted(&categorical_values(column));
            let mapping: HashMap<String, usize> = sorted_cats
                .iter()
                .enumerate()
                .map(|(idx, cat)| (cat.clone(), idx))
                .collect();

            columns.push(name.clone());
            categories_.push(sorted_cats);
            mappings_.push(mapping);
        }

        Ok(FittedOrdinalEncoder {
            columns,
            categories_,
            mappings_,
            unknown_value: self.unknown_value,
        })
    }
}

impl FittedTransformer for FittedOrdinalEncoder {
    type Input = Table;
    type Output = Array2<f64>;

    fn transform(&self, data: &Table) -> Result<Array2<f64>> {
        let rows = data.n_rows();
        let mut result = Array2::from_elem((rows, self.columns.len()), self.unknown_value);

        for (col, name) in self.columns.iter().enumerate() {
            let column = data
                .column(name)
                .ok_or_else(|| PipelineError::FeatureMismatch {
                    column: name.clone(),
                })?;

            let mut unseen = BTreeSet::new();
            for (row, value) in categorical_values(column).into_iter().enumerate() {
                let Some(value) = value else { continue };
                match self.mappings_[col].get(&value) {
                    Some(&ordinal) => result[[row, col]] = ordinal as f64,
                    None => {
                        unseen.insert(value);
                    }
                }
            }
            report_unseen(name, unseen);
        }

        Ok(result)
    }

    fn n_features_in(&self) -> usize {
        self.columns.len()
    }

    fn feature_names_out(&self) -> Vec<String> {
        self.columns.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn soil_table(values: &[Option<&str>]) -> Table {
        Table::from_columns(vec![(
            "Soil_Type".to_string(),
            Column::Text(values.iter().map(|v| v.map(str::to_string)).collect()),
        )])
        .unwrap()
    }

    fn encoder() -> OrdinalEncoder {
        OrdinalEncoder::new(vec!["Soil_Type".to_string()])
    }

    #[test]
    fn test_ordinal_encoder_basic() {
        let data = soil_table(&[Some("red"), Some("black"), Some("red"), Some("alluvial")]);
        let fitted = encoder().fit(&data).unwrap();

        assert_eq!(fitted.n_features_in(), 1);
        assert_eq!(fitted.categories()[0], vec!["alluvial", "black", "red"]);

        let vals = fitted.transform(&data).unwrap();
        assert_eq!(vals.column(0).to_vec(), vec![2.0, 1.0, 2.0, 0.0]);
    }

    #[test]
    fn test_ordinal_encoder_unseen_maps_to_sentinel() {
        let train = soil_table(&[Some("red"), Some("black")]);
        let test = soil_table(&[Some("laterite"), Some("red")]);

        let fitted = encoder().fit(&train).unwrap();
        let vals = fitted.transform(&test).unwrap();

        assert_eq!(vals[[0, 0]], UNKNOWN_ORDINAL);
        assert_eq!(vals[[1, 0]], 1.0);
    }

    #[test]
    fn test_ordinal_encoder_null_maps_to_sentinel() {
        let train = soil_table(&[Some("red"), None]);
        let fitted = encoder().fit(&train).unwrap();

        assert_eq!(fitted.categories()[0], vec!["red"]);
        let vals = fitted.transform(&train).unwrap();
        assert_eq!(vals.column(0).to_vec(), vec![0.0, UNKNOWN_ORDINAL]);
    }

    #[test]
    fn test_ordinal_encoder_custom_sentinel() {
        let train = soil_table(&[Some("red")]);
        let test = soil_table(&[Some("sandy")]);
        let fitted = encoder().with_unknown_value(-99.0).fit(&train).unwrap();
        assert_eq!(fitted.transform(&test).unwrap()[[0, 0]], -99.0);
    }

    #[test]
    fn test_ordinal_encoder_inverse() {
        let data = soil_table(&[Some("red"), Some("black")]);
        let fitted = encoder().fit(&data).unwrap();

        let encoded = fitted.transform(&data).unwrap();
        let decoded = fitted.inverse_transform(&encoded).unwrap();
        assert_eq!(
            decoded,
            vec![vec![Some("red".to_string())], vec![Some("black".to_string())]]
        );
    }

    #[test]
    fn test_ordinal_encoder_inverse_sentinel_and_out_of_bounds() {
        let data = soil_table(&[Some("red"), Some("black")]);
        let fitted = encoder().fit(&data).unwrap();

        let codes = Array2::from_shape_vec((2, 1), vec![UNKNOWN_ORDINAL, 5.0]).unwrap();
        let decoded = fitted.inverse_transform(&codes).unwrap();
        assert_eq!(decoded, vec![vec![None], vec![None]]);
    }

    #[test]
    fn test_ordinal_encoder_inverse_shape_mismatch() {
        let data = soil_table(&[Some("red")]);
        let fitted = encoder().fit(&data).unwrap();
        let wrong = Array2::zeros((1, 3));
        assert!(fitted.inverse_transform(&wrong).is_err());
    }

    #[test]
    fn test_ordinal_encoder_empty_data() {
        let data = soil_table(&[]);
        assert!(matches!(
            encoder().fit(&data),
            Err(PipelineError::EmptyData(_))
        ));
    }

    #[test]
    fn test_ordinal_encoder_absent_column_skipped() {
        let data = soil_table(&[Some("red")]);
        let enc = OrdinalEncoder::new(vec![
            "Soil_Type".to_string(),
            "Approach_Road_Type".to_string(),
        ]);
        let fitted = enc.fit(&data).unwrap();
        assert_eq!(fitted.feature_names_out(), vec!["Soil_Type"]);
    }

    #[test]
    fn test_ordinal_encoder_missing_column_at_transform() {
        let train = soil_table(&[Some("red")]);
        let fitted = encoder().fit(&train).unwrap();

        let other = Table::from_columns(vec![(
            "State".to_string(),
            Column::Text(vec![Some("goa".into())]),
        )])
        .unwrap();
        assert!(matches!(
            fitted.transform(&other),
            Err(PipelineError::FeatureMismatch { .. })
        ));
    }

    #[test]
    fn test_ordinal_encoder_mapping() {
        let data = soil_table(&[Some("b"), Some("a"), Some("c")]);
        let fitted = encoder().fit(&data).unwrap();

        let mapping = fitted.mapping(0).unwrap();
        assert_eq!(mapping.get("a"), Some(&0));
        assert_eq!(mapping.get("c"), Some(&2));
    }

    #[test]
    fn test_ordinal_encoder_serialization() {
        let data = soil_table(&[Some("red"), Some("black")]);
        let fitted = encoder().fit(&data).unwrap();

        let temp_file = tempfile::NamedTempFile::new().unwrap();
        fitted.save_to_file(temp_file.path()).unwrap();
        let loaded = FittedOrdinalEncoder::load_from_file(temp_file.path()).unwrap();

        assert_eq!(loaded.categories(), fitted.categories());
        assert_eq!(
            loaded.transform(&data).unwrap(),
            fitted.transform(&data).unwrap()
        );
    }

    #[test]
    fn test_ordinal_encoder_fit_transform() {
        let data = soil_table(&[Some("y"), Some("x")]);
        let vals = encoder().fit_transform(&data).unwrap();
        assert_eq!(vals.column(0).to_vec(), vec![1.0, 0.0]);
    }
}

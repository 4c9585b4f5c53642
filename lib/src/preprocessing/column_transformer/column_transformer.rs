//! FeatureEncoder implementation.
//!
//! Applies a different transformer to each column group of a parcel table and
//! concatenates the results: ordinal group, then one-hot group, then numeric
//! group.

use crate::error::{PipelineError, Result};
use crate::preprocessing::encoding::{
    FittedOneHotEncoder, FittedOrdinalEncoder, OneHotEncoder, OrdinalEncoder,
};
use crate::preprocessing::matrix::{sanitize_feature_name, FeatureMatrix};
use crate::preprocessing::scaling::{FittedStandardScaler, StandardScaler};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::table::{Column, Table};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Treatment of the numeric group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericScaling {
    /// Values are used as-is (nulls become NaN).
    #[default]
    Passthrough,
    /// Z-score normalization fitted on the training rows.
    Standardize,
}

/// Column grouping for the feature encoder.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub target_column: String,
    pub id_column: String,
    /// Columns removed before grouping (coordinates).
    pub drop_columns: Vec<String>,
    /// Bookkeeping columns removed before grouping, matched case-insensitively.
    pub audit_columns: Vec<String>,
    pub ordinal_columns: Vec<String>,
    pub one_hot_columns: Vec<String>,
    pub numeric_scaling: NumericScaling,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        let strings = |v: &[&str]| v.iter().map(|s| s.to_string()).collect();
        Self {
            target_column: "Price_per_Acre".to_string(),
            id_column: "Land_ID".to_string(),
            drop_columns: strings(&["Latitude", "Longitude"]),
            audit_columns: strings(&["created_at", "updated_at", "id", "status"]),
            ordinal_columns: strings(&["Soil_Type", "Approach_Road_Type"]),
            one_hot_columns: strings(&["State", "District"]),
            numeric_scaling: NumericScaling::Passthrough,
        }
    }
}

impl EncoderConfig {
    fn is_excluded(&self, name: &str) -> bool {
        name == self.target_column
            || name == self.id_column
            || self.drop_columns.iter().any(|c| c == name)
            || self.audit_columns.iter().any(|c| c.eq_ignore_ascii_case(name))
    }

    fn in_fixed_group(&self, name: &str) -> bool {
        self.ordinal_columns.iter().any(|c| c == name)
            || self.one_hot_columns.iter().any(|c| c == name)
    }
}

/// Encoder turning a cleaned, imputed table into a [`FeatureMatrix`].
///
/// # Example
/// ```ignore
/// let encoder = FeatureEncoder::new(EncoderConfig::default());
/// let fitted = encoder.fit(&train)?;
/// let x_train = fitted.transform(&train)?;
/// let x_valid = fitted.transform(&valid)?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct FeatureEncoder {
    config: EncoderConfig,
}

impl FeatureEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Ordered names of numeric-group columns in `table`.
    fn numeric_columns(&self, table: &Table) -> Vec<String> {
        let mut numeric = Vec::new();
        for (name, column) in table.columns() {
            if self.config.is_excluded(name) || self.config.in_fixed_group(name) {
                continue;
            }
            if column.is_numeric() {
                numeric.push(name.to_string());
            } else {
                tracing::warn!(column = %name, "skipping text column outside the categorical groups");
            }
        }
        numeric
    }

    fn group(&self, columns: &[String]) -> Vec<String> {
        columns
            .iter()
            .filter(|c| !self.config.is_excluded(c))
            .cloned()
            .collect()
    }
}

impl Transformer for FeatureEncoder {
    type Input = Table;
    type Output = FeatureMatrix;
    type Fitted = FittedFeatureEncoder;

    fn fit(&self, data: &Table) -> Result<FittedFeatureEncoder> {
        if data.is_empty() {
            return Err(PipelineError::EmptyData(
                "Cannot fit FeatureEncoder on empty data".to_string(),
            ));
        }

        let ordinal = OrdinalEncoder::new(self.group(&self.config.ordinal_columns)).fit(data)?;
        let one_hot = OneHotEncoder::new(self.group(&self.config.one_hot_columns)).fit(data)?;
        let numeric_columns = self.numeric_columns(data);

        let scaler = match self.config.numeric_scaling {
            NumericScaling::Passthrough => None,
            NumericScaling::Standardize => {
                Some(StandardScaler::new().fit(&numeric_block(data, &numeric_columns)?)?)
            }
        };

        let feature_names = ordinal
            .feature_names_out()
            .into_iter()
            .chain(one_hot.feature_names_out())
            .chain(numeric_columns.iter().cloned())
            .map(|n| sanitize_feature_name(&n))
            .collect::<Vec<_>>();

        let mut seen = HashSet::new();
        if let Some(dup) = feature_names.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(PipelineError::InvalidParameter(format!(
                "duplicate feature name '{}' after sanitizing",
                dup
            )));
        }

        tracing::debug!(
            ordinal = ordinal.n_features_out(),
            one_hot = one_hot.n_features_out(),
            numeric = numeric_columns.len(),
            "fitted feature encoder"
        );

        Ok(FittedFeatureEncoder {
            ordinal,
            one_hot,
            numeric_columns,
            scaler,
            feature_names,
        })
    }
}

/// Fitted FeatureEncoder ready for inference.
///
/// Holds every learned parameter; transforming validation rows never looks at
/// training data again.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FittedFeatureEncoder {
    ordinal: FittedOrdinalEncoder,
    one_hot: FittedOneHotEncoder,
    numeric_columns: Vec<String>,
    scaler: Option<FittedStandardScaler>,
    feature_names: Vec<String>,
}

impl FittedFeatureEncoder {
    pub fn ordinal(&self) -> &FittedOrdinalEncoder {
        &self.ordinal
    }

    pub fn one_hot(&self) -> &FittedOneHotEncoder {
        &self.one_hot
    }

    /// Numeric-group columns in output order.
    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    /// Scaler fitted on the numeric group, if standardization is enabled.
    pub fn scaler(&self) -> Option<&FittedStandardScaler> {
        self.scaler.as_ref()
    }
}

/// Numeric group as a dense block; nulls become NaN.
fn numeric_block(data: &Table, columns: &[String]) -> Result<Array2<f64>> {
    let mut block = Array2::from_elem((data.n_rows(), columns.len()), f64::NAN);
    for (j, name) in columns.iter().enumerate() {
        let column = data
            .column(name)
            .ok_or_else(|| PipelineError::FeatureMismatch {
                column: name.clone(),
            })?;
        let converted;
        let values = match column {
            Column::Numeric(v) => v.as_slice(),
            Column::Text(_) => {
                converted = column.to_numeric();
                converted.as_numeric().unwrap_or_default()
            }
        };
        for (i, value) in values.iter().enumerate() {
            if let Some(x) = value {
                block[[i, j]] = *x;
            }
        }
    }
    Ok(block)
}

impl FittedTransformer for FittedFeatureEncoder {
    type Input = Table;
    type Output = FeatureMatrix;

    fn transform(&self, data: &Table) -> Result<FeatureMatrix> {
        let mut numeric = numeric_block(data, &self.numeric_columns)?;
        if let Some(scaler) = &self.scaler {
            numeric = scaler.transform(&numeric)?;
        }

        let values = ndarray::concatenate(
            ndarray::Axis(1),
            &[
                self.ordinal.transform(data)?.view(),
                self.one_hot.transform(data)?.view(),
                numeric.view(),
            ],
        )
        .map_err(|e| PipelineError::InvalidParameter(format!("cannot assemble features: {}", e)))?;

        FeatureMatrix::new(self.feature_names.clone(), values)
    }

    fn n_features_in(&self) -> usize {
        self.ordinal.n_features_in() + self.one_hot.n_features_in() + self.numeric_columns.len()
    }

    fn feature_names_out(&self) -> Vec<String> {
        self.feature_names.clone()
    }
}

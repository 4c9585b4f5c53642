//! Dense numeric output of the feature encoder.

use crate::error::{PipelineError, Result};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// A model-ready matrix with one name per column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    pub feature_names: Vec<String>,
    pub values: Array2<f64>,
}

impl FeatureMatrix {
    /// Wrap values, checking that there is one name per column.
    pub fn new(feature_names: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if feature_names.len() != values.ncols() {
            return Err(PipelineError::InvalidParameter(format!(
                "{} feature names for {} columns",
                feature_names.len(),
                values.ncols()
            )));
        }
        Ok(Self {
            feature_names,
            values,
        })
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of feature columns.
    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    /// Borrow a column by feature name.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        let idx = self.feature_names.iter().position(|n| n == name)?;
        Some(self.values.column(idx))
    }
}

/// Replace characters rejected by gradient-boosting libraries in feature names.
pub fn sanitize_feature_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '[' | ']' | '<' | '>' => '_',
            other => other,
        })
        .collect()
}

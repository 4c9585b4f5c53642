//! Core traits for preprocessing transformers.
//!
//! This module defines the two central traits:
//! - [`Transformer`]: Used during fitting; has hyperparameters and can learn from data.
//! - [`FittedTransformer`]: After fitting; ready for inference and serialization.
//!
//! Fitting happens on the training partition only. Everything a fitted
//! transformer needs at transform time lives in the fitted value, so applying
//! it to validation rows can never re-learn parameters.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Trait for unfitted transformers with hyperparameters.
///
/// # Example
/// ```ignore
/// use parcel_features::preprocessing::{OrdinalEncoder, Transformer, FittedTransformer};
///
/// let encoder = OrdinalEncoder::new(vec!["Soil_Type".to_string()]);
/// let fitted = encoder.fit(&train)?;
/// let encoded = fitted.transform(&valid)?;
/// ```
pub trait Transformer: Clone {
    /// Input data type for transformation.
    type Input;
    /// Output data type after transformation.
    type Output;
    /// The fitted transformer type ready for inference.
    type Fitted: FittedTransformer<Input = Self::Input, Output = Self::Output>;

    /// Fit the transformer to the training data.
    ///
    /// # Errors
    /// Returns [`crate::error::PipelineError`] if the data is empty or has
    /// values the transformer cannot learn from.
    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted>;

    /// Fit the transformer and transform the same data in one step.
    fn fit_transform(&self, data: &Self::Input) -> Result<Self::Output> {
        let fitted = self.fit(data)?;
        fitted.transform(data)
    }
}

/// Trait for fitted transformers ready for inference.
///
/// # Guarantees
/// - `save_to_file` / `load_from_file` is a round-trip.
/// - `feature_names_out().len()` equals the column count of every output.
pub trait FittedTransformer: Clone + Serialize + DeserializeOwned {
    /// Input data type for transformation.
    type Input;
    /// Output data type after transformation.
    type Output;

    /// Transform data using learned parameters.
    fn transform(&self, data: &Self::Input) -> Result<Self::Output>;

    /// Number of input columns seen during fit.
    fn n_features_in(&self) -> usize;

    /// Names of the produced feature columns, in output order.
    fn feature_names_out(&self) -> Vec<String>;

    /// Number of produced feature columns.
    fn n_features_out(&self) -> usize {
        self.feature_names_out().len()
    }

    /// Save the fitted transformer to a file.
    fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load a fitted transformer from a file.
    fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self>
    where
        Self: Sized,
    {
        let bytes = std::fs::read(path)?;
        Ok(bincode::deserialize(&bytes)?)
    }
}

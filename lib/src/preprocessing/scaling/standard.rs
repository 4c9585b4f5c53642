//! Standard Scaler (Z-score normalization).
//!
//! Transforms features by removing the mean and scaling to unit variance.
//!
//! The standard score of a sample `x` is calculated as:
//! ```text
//! z = (x - u) / s
//! ```
//! where `u` is the mean of the training samples, and `s` is the population
//! standard deviation. NaN entries (null cells) are ignored when fitting and
//! stay NaN after transform.
//!
//! # Example
//! ```ignore
//! use parcel_features::preprocessing::{FittedTransformer, StandardScaler, Transformer};
//!
//! let fitted = StandardScaler::new().fit(&x_train)?;
//! let scaled = fitted.transform(&x_valid)?;
//! ```

use crate::error::{PipelineError, Result};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Configuration for StandardScaler.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StandardScalerConfig {
    /// If True, center the data before scaling.
    pub with_mean: bool,
    /// If True, scale the data to unit variance.
    pub with_std: bool,
}

impl Default for StandardScalerConfig {
    fn default() -> Self {
        Self {
            with_mean: true,
            with_std: true,
        }
    }
}

/// StandardScaler transformer (unfitted).
#[derive(Clone, Debug, Default)]
pub struct StandardScaler {
    config: StandardScalerConfig,
}

impl StandardScaler {
    /// Create a new StandardScaler with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to center data by mean.
    pub fn with_mean(mut self, with_mean: bool) -> Self {
        self.config.with_mean = with_mean;
        self
    }

    /// Set whether to scale data to unit variance.
    pub fn with_std(mut self, with_std: bool) -> Self {
        self.config.with_std = with_std;
        self
    }
}

/// Mean and population std of the finite values in `column`.
/// A column with no finite values has mean 0 and std 1.
fn nan_mean_std(column: ndarray::ArrayView1<'_, f64>) -> (f64, f64) {
    let values: Vec<f64> = column.iter().copied().filter(|x| x.is_finite()).collect();
    if values.is_empty() {
        return (0.0, 1.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

impl Transformer for StandardScaler {
    type Input = Array2<f64>;
    type Output = Array2<f64>;
    type Fitted = FittedStandardScaler;

    fn fit(&self, data: &Array2<f64>) -> Result<FittedStandardScaler> {
        if data.nrows() == 0 {
            return Err(PipelineError::EmptyData(
                "Cannot fit StandardScaler on empty data".to_string(),
            ));
        }

        let (mean, std): (Vec<f64>, Vec<f64>) =
            data.axis_iter(Axis(1)).map(nan_mean_std).unzip();

        let mean = if self.config.with_mean {
            Array1::from(mean)
        } else {
            Array1::zeros(data.ncols())
        };

        // Constant features keep their scale
        let std = if self.config.with_std {
            Array1::from(std).mapv(|s| if s == 0.0 { 1.0 } else { s })
        } else {
            Array1::ones(data.ncols())
        };

        Ok(FittedStandardScaler {
            config: self.config.clone(),
            mean,
            std,
        })
    }
}

/// Fitted StandardScaler ready for inference.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FittedStandardScaler {
    config: StandardScalerConfig,
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl FittedStandardScaler {
    /// Get the mean values for each feature.
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Get the standard deviation values for each feature.
    pub fn std(&self) -> &Array1<f64> {
        &self.std
    }

    fn check_width(&self, data: &Array2<f64>) -> Result<()> {
        if data.ncols() != self.mean.len() {
            return Err(PipelineError::InvalidShape {
                expected: self.mean.len(),
                got: data.ncols(),
            });
        }
        Ok(())
    }

    /// Undo the scaling.
    pub fn inverse_transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_width(data)?;
        Ok(data * &self.std + &self.mean)
    }
}

impl FittedTransformer for FittedStandardScaler {
    type Input = Array2<f64>;
    type Output = Array2<f64>;

    fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_width(data)?;
        Ok((data - &self.mean) / &self.std)
    }

    fn n_features_in(&self) -> usize {
        self.mean.len()
    }

    fn feature_names_out(&self) -> Vec<String> {
        (0..self.mean.len()).map(|i| format!("x{}", i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn create_test_data() -> Array2<f64> {
        array![[0.0, 1.0], [0.0, 1.0], [1.0, 3.0]]
    }

    #[test]
    fn test_standard_scaler_fit() {
        let fitted = StandardScaler::new().fit(&create_test_data()).unwrap();

        // Mean: [1/3, 5/3]
        let mean = fitted.mean();
        assert!((mean[0] - 1.0 / 3.0).abs() < 1e-10);
        assert!((mean[1] - 5.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_standard_scaler_transform() {
        let data = create_test_data();
        let fitted = StandardScaler::new().fit(&data).unwrap();
        let transformed = fitted.transform(&data).unwrap();

        for col in transformed.axis_iter(Axis(1)) {
            let (mean, std) = nan_mean_std(col);
            assert!(mean.abs() < 1e-10, "mean = {}", mean);
            assert!((std - 1.0).abs() < 1e-8, "std = {}", std);
        }
    }

    #[test]
    fn test_standard_scaler_ignores_nan() {
        let data = array![[1.0], [f64::NAN], [3.0]];
        let fitted = StandardScaler::new().fit(&data).unwrap();

        assert!((fitted.mean()[0] - 2.0).abs() < 1e-10);
        assert!((fitted.std()[0] - 1.0).abs() < 1e-10);

        let transformed = fitted.transform(&data).unwrap();
        assert!((transformed[[0, 0]] + 1.0).abs() < 1e-10);
        assert!(transformed[[1, 0]].is_nan());
    }

    #[test]
    fn test_standard_scaler_constant_column() {
        let data = array![[5.0], [5.0]];
        let fitted = StandardScaler::new().fit(&data).unwrap();
        assert_eq!(fitted.std()[0], 1.0);
        assert_eq!(fitted.transform(&data).unwrap(), array![[0.0], [0.0]]);
    }

    #[test]
    fn test_standard_scaler_inverse_transform() {
        let data = create_test_data();
        let fitted = StandardScaler::new().fit(&data).unwrap();

        let recovered = fitted
            .inverse_transform(&fitted.transform(&data).unwrap())
            .unwrap();
        for (o, r) in data.iter().zip(recovered.iter()) {
            assert!((o - r).abs() < 1e-10);
        }
    }

    #[test]
    fn test_standard_scaler_without_mean() {
        let fitted = StandardScaler::new()
            .with_mean(false)
            .fit(&create_test_data())
            .unwrap();
        assert!(fitted.mean().iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_standard_scaler_without_std() {
        let fitted = StandardScaler::new()
            .with_std(false)
            .fit(&create_test_data())
            .unwrap();
        assert!(fitted.std().iter().all(|&s| s == 1.0));
    }

    #[test]
    fn test_standard_scaler_uses_training_parameters() {
        let train = array![[0.0], [2.0]];
        let valid = array![[100.0]];
        let fitted = StandardScaler::new().fit(&train).unwrap();

        // mean 1, std 1 from train only
        assert!((fitted.transform(&valid).unwrap()[[0, 0]] - 99.0).abs() < 1e-10);
    }

    #[test]
    fn test_standard_scaler_serialization() {
        let data = create_test_data();
        let fitted = StandardScaler::new().fit(&data).unwrap();

        let temp_file = tempfile::NamedTempFile::new().unwrap();
        fitted.save_to_file(temp_file.path()).unwrap();
        let restored = FittedStandardScaler::load_from_file(temp_file.path()).unwrap();

        let t1 = fitted.transform(&data).unwrap();
        let t2 = restored.transform(&data).unwrap();
        for (a, b) in t1.iter().zip(t2.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_standard_scaler_feature_mismatch() {
        let fitted = StandardScaler::new().fit(&create_test_data()).unwrap();
        let wrong_data = array![[1.0, 2.0, 3.0]];

        assert!(matches!(
            fitted.transform(&wrong_data),
            Err(PipelineError::InvalidShape {
                expected: 2,
                got: 3
            })
        ));
    }

    #[test]
    fn test_standard_scaler_empty_data() {
        let data = Array2::<f64>::zeros((0, 2));
        assert!(StandardScaler::new().fit(&data).is_err());
    }
}

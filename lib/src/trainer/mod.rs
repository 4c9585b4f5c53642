//! Model training and evaluation on prepared features.
//!
//! The regression model is an external collaborator: anything implementing
//! [`Regressor`] (for example a gradient-boosting binding) can be trained on a
//! [`PreparedData`] split. The [`Trainer`] fits it on the training partition,
//! scores it on both partitions and optionally persists the fitted model.

pub mod metrics;

pub use metrics::RegressionMetrics;

use crate::error::Result;
use crate::pipeline::PreparedData;
use crate::preprocessing::FeatureMatrix;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An unfitted regression model with its hyperparameters.
pub trait Regressor {
    /// The fitted model type ready for inference.
    type Model: FittedRegressor;

    /// Fit on a feature matrix and target vector with the same row count.
    fn fit(&self, x: &FeatureMatrix, y: &Array1<f64>) -> Result<Self::Model>;
}

/// A fitted regression model.
pub trait FittedRegressor {
    /// Predict one value per row of `x`.
    fn predict(&self, x: &FeatureMatrix) -> Result<Array1<f64>>;

    /// Persist the model to `path`.
    fn save(&self, path: &Path) -> Result<()>;
}

/// Training settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Persist the fitted model after evaluation.
    pub save_model: bool,
    /// Where the model is written when `save_model` is set.
    pub model_path: PathBuf,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            save_model: false,
            model_path: PathBuf::from("model.bin"),
        }
    }
}

/// Scores of one training run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub train: RegressionMetrics,
    pub valid: RegressionMetrics,
    /// Set when the model was saved.
    pub saved_to: Option<PathBuf>,
}

/// A fitted model together with its evaluation.
pub struct Trained<M> {
    pub model: M,
    pub report: TrainingReport,
}

/// Fits and evaluates a [`Regressor`] on prepared data.
///
/// # Example
/// ```ignore
/// let trainer = Trainer::new(TrainingConfig::default()).save_model(true);
/// let trained = trainer.train_and_evaluate(&prepared, &regressor)?;
/// println!("validation RMSE: {}", trained.report.valid.rmse);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn save_model(mut self, save: bool) -> Self {
        self.config.save_model = save;
        self
    }

    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.model_path = path.into();
        self
    }

    /// Fit on the training partition, score both partitions, and save the
    /// model if configured.
    pub fn train_and_evaluate<R: Regressor>(
        &self,
        prepared: &PreparedData,
        regressor: &R,
    ) -> Result<Trained<R::Model>> {
        tracing::info!(
            rows = prepared.x_train.n_rows(),
            features = prepared.x_train.n_features(),
            "training regressor"
        );
        let model = regressor.fit(&prepared.x_train, &prepared.y_train)?;

        let train_pred = model.predict(&prepared.x_train)?;
        let valid_pred = model.predict(&prepared.x_valid)?;
        let train = RegressionMetrics::compute(prepared.y_train.view(), train_pred.view())?;
        let valid = RegressionMetrics::compute(prepared.y_valid.view(), valid_pred.view())?;
        tracing::info!(
            train_rmse = train.rmse,
            valid_rmse = valid.rmse,
            valid_mae = valid.mae,
            valid_r2 = valid.r_squared,
            "evaluated regressor"
        );

        let saved_to = if self.config.save_model {
            model.save(&self.config.model_path)?;
            tracing::info!(path = %self.config.model_path.display(), "saved model");
            Some(self.config.model_path.clone())
        } else {
            None
        };

        Ok(Trained {
            model,
            report: TrainingReport {
                train,
                valid,
                saved_to,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::preprocessing::{EncoderConfig, FeatureEncoder, Transformer};
    use ndarray::array;

    /// Predicts the training mean for every row.
    struct MeanRegressor;

    struct FittedMean(f64);

    impl Regressor for MeanRegressor {
        type Model = FittedMean;

        fn fit(&self, _x: &FeatureMatrix, y: &Array1<f64>) -> Result<FittedMean> {
            y.mean()
                .map(FittedMean)
                .ok_or_else(|| PipelineError::Model("empty target".to_string()))
        }
    }

    impl FittedRegressor for FittedMean {
        fn predict(&self, x: &FeatureMatrix) -> Result<Array1<f64>> {
            Ok(Array1::from_elem(x.n_rows(), self.0))
        }

        fn save(&self, path: &Path) -> Result<()> {
            std::fs::write(path, self.0.to_string())?;
            Ok(())
        }
    }

    fn prepared() -> PreparedData {
        let x_train = FeatureMatrix::new(vec!["a".into()], array![[1.0], [2.0], [3.0]]).unwrap();
        let x_valid = FeatureMatrix::new(vec!["a".into()], array![[4.0]]).unwrap();
        let table = crate::table::Table::from_columns(vec![(
            "a".to_string(),
            crate::table::Column::Numeric(vec![Some(1.0)]),
        )])
        .unwrap();
        PreparedData {
            x_train,
            x_valid,
            y_train: array![1.0, 2.0, 3.0],
            y_valid: array![4.0],
            encoder: FeatureEncoder::new(EncoderConfig::default())
                .fit(&table)
                .unwrap(),
            anomalies: Vec::new(),
        }
    }

    #[test]
    fn test_trainer_defaults() {
        let trainer = Trainer::default();
        assert!(!trainer.config.save_model);
        assert_eq!(trainer.config.model_path, PathBuf::from("model.bin"));
    }

    #[test]
    fn test_train_and_evaluate() {
        let trained = Trainer::default()
            .train_and_evaluate(&prepared(), &MeanRegressor)
            .unwrap();

        assert!((trained.model.0 - 2.0).abs() < 1e-12);
        // valid: |4 - 2| = 2
        assert!((trained.report.valid.mae - 2.0).abs() < 1e-12);
        assert!((trained.report.train.r_squared).abs() < 1e-12);
        assert!(trained.report.saved_to.is_none());
    }

    #[test]
    fn test_model_saved_when_configured() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("price_model.bin");

        let trained = Trainer::default()
            .save_model(true)
            .model_path(&path)
            .train_and_evaluate(&prepared(), &MeanRegressor)
            .unwrap();

        assert_eq!(trained.report.saved_to, Some(path.clone()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "2");
    }
}

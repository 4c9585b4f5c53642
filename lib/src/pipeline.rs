//! End-to-end preparation of a parcel dataset.
//!
//! [`Pipeline`] threads one table through every stage. Each stage takes a
//! table by reference and returns a fresh one:
//!
//! ```text
//! raw CSV -> clean -> impute -> (attach_embeddings) -> split
//!         -> encoder.fit(train) -> transform(train), transform(valid)
//! ```

use crate::config::PipelineConfig;
use crate::embed::{Attached, EmbeddingAttacher, ImageEmbedder};
use crate::error::{Anomaly, PipelineError, Result};
use crate::preprocessing::{
    Cleaned, Cleaner, FeatureEncoder, FeatureMatrix, FittedFeatureEncoder, FittedTransformer,
    Imputed, Imputer, Transformer,
};
use crate::split::split_table;
use crate::table::{Column, Table};
use ndarray::Array1;
use std::path::Path;

/// Train/validation features and targets, ready for a regressor.
#[derive(Clone, Debug)]
pub struct PreparedData {
    pub x_train: FeatureMatrix,
    pub x_valid: FeatureMatrix,
    pub y_train: Array1<f64>,
    pub y_valid: Array1<f64>,
    /// The transform fitted on the training rows, for reuse at inference.
    pub encoder: FittedFeatureEncoder,
    /// Anomalies recovered while producing this data.
    pub anomalies: Vec<Anomaly>,
}

/// Cleaned and imputed table, before the split.
#[derive(Clone, Debug)]
pub struct Processed {
    pub table: Table,
    pub anomalies: Vec<Anomaly>,
}

/// Stage runner configured by a [`PipelineConfig`].
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    cleaner: Cleaner,
    imputer: Imputer,
}

impl Pipeline {
    /// Build a pipeline, validating stage settings.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let config = config.resolved();
        Ok(Self {
            cleaner: Cleaner::new(config.clean.clone())?,
            imputer: Imputer::new(config.impute.clone())?,
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Read a dataset CSV.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Table> {
        Table::read_csv(path)
    }

    pub fn clean(&self, table: &Table) -> Result<Cleaned> {
        self.cleaner.clean(table)
    }

    pub fn impute(&self, table: &Table) -> Result<Imputed> {
        self.imputer.impute(table)
    }

    /// Join image embeddings from `dir` onto `table`.
    pub fn attach_embeddings<E>(
        &self,
        dir: impl AsRef<Path>,
        table: &Table,
        embedder: &mut E,
    ) -> Result<Attached>
    where
        E: ImageEmbedder + ?Sized,
    {
        EmbeddingAttacher::new(self.config.embed.clone()).attach(dir, table, embedder)
    }

    /// Clean and impute.
    pub fn process(&self, raw: &Table) -> Result<Processed> {
        tracing::info!(rows = raw.n_rows(), columns = raw.n_cols(), "processing dataset");
        let cleaned = self.clean(raw)?;
        let imputed = self.impute(&cleaned.table)?;

        let mut anomalies = cleaned.anomalies;
        anomalies.extend(imputed.anomalies);
        Ok(Processed {
            table: imputed.table,
            anomalies,
        })
    }

    /// Split a processed table and encode both partitions.
    ///
    /// Rows with a null target are dropped. The encoder is fitted on the
    /// training rows only.
    pub fn prepare(&self, table: &Table) -> Result<PreparedData> {
        let target_name = &self.config.target_column;
        let target = table
            .column(target_name)
            .ok_or_else(|| PipelineError::Schema {
                column: target_name.clone(),
            })?
            .to_numeric();

        let keep: Vec<bool> = (0..table.n_rows()).map(|row| !target.is_null(row)).collect();
        let dropped = keep.iter().filter(|k| !**k).count();
        if dropped > 0 {
            tracing::info!(dropped, column = %target_name, "dropping rows with no target");
        }
        let mut labelled = table.retain_rows(&keep);
        labelled.insert_column(target_name.as_str(), target.take(&keep_indices(&keep)))?;

        let (train, valid) = split_table(&labelled, &self.config.split)?;

        let encoder = FeatureEncoder::new(self.config.encoder.clone()).fit(&train)?;
        let x_train = encoder.transform(&train)?;
        let x_valid = encoder.transform(&valid)?;

        tracing::info!(
            train_rows = x_train.n_rows(),
            valid_rows = x_valid.n_rows(),
            features = x_train.n_features(),
            "prepared features"
        );
        Ok(PreparedData {
            x_train,
            x_valid,
            y_train: target_values(&train, target_name)?,
            y_valid: target_values(&valid, target_name)?,
            encoder,
            anomalies: Vec::new(),
        })
    }

    /// Clean, impute, split and encode.
    pub fn run(&self, raw: &Table) -> Result<PreparedData> {
        let processed = self.process(raw)?;
        let mut prepared = self.prepare(&processed.table)?;
        prepared.anomalies = processed.anomalies;
        Ok(prepared)
    }
}

fn keep_indices(keep: &[bool]) -> Vec<usize> {
    keep.iter()
        .enumerate()
        .filter_map(|(i, &k)| k.then_some(i))
        .collect()
}

fn target_values(table: &Table, name: &str) -> Result<Array1<f64>> {
    match table.column(name) {
        Some(Column::Numeric(values)) => Ok(values.iter().map(|v| v.unwrap_or(f64::NAN)).collect()),
        _ => Err(PipelineError::Schema {
            column: name.to_string(),
        }),
    }
}

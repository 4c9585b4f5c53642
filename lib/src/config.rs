//! Pipeline configuration.
//!
//! Every setting has a default, so an empty TOML document is a valid
//! configuration. Sections mirror the stages:
//!
//! ```toml
//! id_column = "Land_ID"
//! target_column = "Price_per_Acre"
//!
//! [impute.soil_policy]
//! kind = "nearest"
//! radius_km = 25.0
//!
//! [encoder]
//! numeric_scaling = "standardize"
//!
//! [split]
//! fraction = 0.25
//! seed = 7
//! stratify_by = "State"
//!
//! [training]
//! save_model = true
//! model_path = "models/price.bin"
//! ```

use crate::capture::CaptureConfig;
use crate::embed::EmbedConfig;
use crate::error::Result;
use crate::preprocessing::{CleanConfig, EncoderConfig, ImputeConfig};
use crate::split::SplitConfig;
use crate::trainer::TrainingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for every stage of the pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Primary key column. Overrides the key of every stage section.
    pub id_column: String,
    /// Regression target column. Overrides `encoder.target_column`.
    pub target_column: String,
    pub clean: CleanConfig,
    pub impute: ImputeConfig,
    pub encoder: EncoderConfig,
    pub split: SplitConfig,
    pub embed: EmbedConfig,
    pub capture: CaptureConfig,
    pub training: TrainingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            id_column: "Land_ID".to_string(),
            target_column: "Price_per_Acre".to_string(),
            clean: CleanConfig::default(),
            impute: ImputeConfig::default(),
            encoder: EncoderConfig::default(),
            split: SplitConfig::default(),
            embed: EmbedConfig::default(),
            capture: CaptureConfig::default(),
            training: TrainingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(source)?;
        Ok(config.resolved())
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded pipeline config");
        Self::from_toml_str(&source)
    }

    /// Copy the top-level key and target names into every stage section.
    pub fn resolved(mut self) -> Self {
        self.clean.id_column = self.id_column.clone();
        self.impute.id_column = self.id_column.clone();
        self.encoder.id_column = self.id_column.clone();
        self.embed.id_column = self.id_column.clone();
        self.capture.geo.id = self.id_column.clone();
        self.encoder.target_column = self.target_column.clone();
        self
    }
}

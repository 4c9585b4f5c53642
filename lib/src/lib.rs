//! # parcel_features
//!
//! Turns a messy land-parcel CSV export into a model-ready numeric matrix for
//! price-per-acre regression, with a strict train/validation contract.
//!
//! ## Core Design Principles
//!
//! - **Immutable stages**: every stage takes a table by reference and returns
//!   a fresh one, so no stage can corrupt another's input.
//! - **Fit/transform separation**: transformers learn only from training rows;
//!   fitted transformers hold every parameter needed at inference and can be
//!   saved with `bincode`.
//! - **Recover, then report**: row-level problems (unknown IDs, unparsable
//!   numbers, unseen categories) are recovered with documented defaults and
//!   logged as [`error::Anomaly`]; only structural problems abort a run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parcel_features::config::PipelineConfig;
//! use parcel_features::pipeline::Pipeline;
//!
//! # fn main() -> parcel_features::error::Result<()> {
//! let pipeline = Pipeline::new(PipelineConfig::default())?;
//! let raw = pipeline.load("dataset1.csv")?;
//! let prepared = pipeline.run(&raw)?;
//!
//! println!(
//!     "{} training rows x {} features",
//!     prepared.x_train.n_rows(),
//!     prepared.x_train.n_features()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - `table`: Schema-evolving column store with CSV I/O
//! - `geo`: Parcel coordinate lookup and haversine distance
//! - `ids`: Parcel ID lists from JSON
//! - `preprocessing`: Cleaning, imputation and feature encoding
//! - `split`: Seeded, optionally stratified train/validation split
//! - `embed`: Image embeddings joined as `emb_*` columns
//! - `capture`: Map screenshots through an external browser
//! - `pipeline`: Stage orchestration
//! - `trainer`: Regressor training and evaluation

/// Schema-evolving tabular storage.
pub mod table;

/// Geographic helpers.
pub mod geo;

/// Parcel ID sources.
pub mod ids;

/// Data preprocessing stages and transformers.
pub mod preprocessing;

/// Train/validation partitioning.
pub mod split;

/// Image embedding attachment.
pub mod embed;

/// Map screenshot capture.
pub mod capture;

pub mod config;
pub mod error;
pub mod pipeline;

/// Regressor training and evaluation.
pub mod trainer;

pub use config::PipelineConfig;
pub use error::{Anomaly, PipelineError, Result};
pub use pipeline::{Pipeline, PreparedData};
pub use table::{Column, Table};

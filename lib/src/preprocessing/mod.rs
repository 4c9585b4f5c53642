//! Data preprocessing for parcel datasets.
//!
//! Stateless stages run on the whole table; fitted transformers learn from the
//! training partition only.
//!
//! # Core Traits
//!
//! - [`Transformer`]: Unfitted transformer with hyperparameters
//! - [`FittedTransformer`]: Fitted transformer ready for inference
//!
//! # Stages
//!
//! ## Cleaning
//! - [`Cleaner`]: Normalize raw text cells, drop artifacts and keyless rows,
//!   coerce mostly-numeric columns
//!
//! ## Imputation
//! - [`Imputer`]: Fixed defaults and nearest-neighbor soil imputation
//!
//! ## Encoding
//! - [`OrdinalEncoder`]: Rank among sorted categories, `-1` for unseen
//! - [`OneHotEncoder`]: Indicator columns with the first category dropped
//! - [`StandardScaler`]: Z-score normalization of the numeric group
//! - [`FeatureEncoder`]: All three groups combined into a [`FeatureMatrix`]
//!
//! # Example
//!
//! ```ignore
//! use parcel_features::preprocessing::{FeatureEncoder, FittedTransformer, Transformer};
//!
//! let fitted = FeatureEncoder::default().fit(&train)?;
//! let x_valid = fitted.transform(&valid)?;
//!
//! // Save for later use
//! fitted.save_to_file("encoder.bin")?;
//! let loaded = FittedFeatureEncoder::load_from_file("encoder.bin")?;
//! ```

pub mod clean;
pub mod column_transformer;
pub mod encoding;
pub mod imputation;
pub mod matrix;
pub mod scaling;
pub mod traits;

// Re-export main types
pub use clean::{CleanConfig, Cleaned, Cleaner};
pub use column_transformer::{EncoderConfig, FeatureEncoder, FittedFeatureEncoder, NumericScaling};
pub use encoding::{
    FittedOneHotEncoder, FittedOrdinalEncoder, OneHotEncoder, OrdinalEncoder, UNKNOWN_ORDINAL,
};
pub use imputation::{ImputeConfig, Imputed, Imputer, SoilPolicy};
pub use matrix::{sanitize_feature_name, FeatureMatrix};
pub use scaling::{FittedStandardScaler, StandardScaler, StandardScalerConfig};
pub use traits::{FittedTransformer, Transformer};

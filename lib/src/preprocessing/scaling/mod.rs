//! Scaling transformers for feature normalization.
//!
//! | Transformer | Description |
//! |-------------|-------------|
//! | [`StandardScaler`] | Z-score normalization (mean=0, std=1), NaN-aware |
//!
//! The feature encoder applies the scaler to its numeric group when
//! [`NumericScaling::Standardize`](crate::preprocessing::NumericScaling) is
//! configured.

pub mod standard;

pub use standard::{FittedStandardScaler, StandardScaler, StandardScalerConfig};

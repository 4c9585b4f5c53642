//! Group-wise feature encoding for parcel tables.
//!
//! The [`FeatureEncoder`] splits the columns of a table into an ordinal group,
//! a one-hot group and a numeric group, fits one transformer per group on the
//! training rows and concatenates their outputs into a
//! [`FeatureMatrix`](crate::preprocessing::FeatureMatrix).

#[allow(clippy::module_inception)]
mod column_transformer;

pub use column_transformer::{EncoderConfig, FeatureEncoder, FittedFeatureEncoder, NumericScaling};

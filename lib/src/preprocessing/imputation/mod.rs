//! Imputation of missing parcel attributes.
//!
//! | Item | Description |
//! |------|-------------|
//! | [`Imputer`] | Fixed defaults plus nearest-neighbor soil imputation |
//! | [`SoilPolicy`] | `Nearest { radius_km }` or `Fixed` |
//!
//! The imputer is stateless: it does not learn from training rows, so it runs
//! on the whole table before the train/validation split.

pub mod parcel;

pub use parcel::{ImputeConfig, Imputed, Imputer, SoilPolicy};

//! Feature engineering for raw laptop specifications.
//!
//! Two transformers live here:
//! - [`SpecFeaturizer`] — parses raw, string-encoded hardware specs
//!   (resolution, CPU, memory layout, weight) into numeric and categorical
//!   feature columns. Stateless and deterministic.
//! - [`MeanEncoder`] — replaces categorical columns with the mean target
//!   value observed per category during fitting.

pub mod engineer;
pub mod mean_encoder;

pub use engineer::SpecFeaturizer;
pub use mean_encoder::{EncodingMap, FittedMeanEncoder, MeanEncoder};

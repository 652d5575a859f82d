//! Preprocessing: target encoding plus feature scaling, composed in a
//! fixed order and fitted as one unit.
//!
//! The [`Preprocessor`] mirrors the training-time pipeline exactly at
//! inference time: the encoder and scaler are fitted in order on the
//! engineered training frame and then applied in that same order to every
//! later frame, so train-time and serve-time transforms can never drift
//! apart.

pub mod pipeline;
pub mod scaler;

pub use pipeline::{FittedPreprocessor, Preprocessor};
pub use scaler::{FittedStandardScaler, StandardScaler};

//! The encoder + scaler preprocessing pipeline.

use crate::error::Result;
use crate::features::{FittedMeanEncoder, MeanEncoder};
use crate::frame::DataFrame;
use crate::preprocessing::scaler::{FittedStandardScaler, StandardScaler};
use log::info;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Unfitted preprocessing pipeline: mean-target encoding followed by
/// standard scaling, fitted in that order.
#[derive(Clone, Debug, Default)]
pub struct Preprocessor {
    encoder: MeanEncoder,
    scaler: StandardScaler,
}

impl Preprocessor {
    /// Create a pipeline with default encoder and scaler settings.
    pub fn new() -> Self {
        Self {
            encoder: MeanEncoder::new(),
            scaler: StandardScaler::new(),
        }
    }

    /// Replace the encoder stage.
    pub fn with_encoder(mut self, encoder: MeanEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Replace the scaler stage.
    pub fn with_scaler(mut self, scaler: StandardScaler) -> Self {
        self.scaler = scaler;
        self
    }

    /// Fit both stages in order on an engineered feature frame.
    ///
    /// The frame's column layout at fitting time becomes the pipeline's
    /// expected feature set; inference-time frames are reconciled against
    /// it by the estimator.
    pub fn fit(&self, frame: &DataFrame, target: &[f64]) -> Result<FittedPreprocessor> {
        let fitted_encoder = self.encoder.fit(frame, target)?;
        let encoded = fitted_encoder.transform(frame)?;
        let feature_names: Vec<String> =
            encoded.column_names().iter().map(|s| s.to_string()).collect();
        let matrix = encoded.to_matrix()?;
        let fitted_scaler = self.scaler.fit(&matrix)?;
        info!(
            "fitted preprocessor on {} rows x {} features",
            frame.n_rows(),
            feature_names.len()
        );
        Ok(FittedPreprocessor {
            encoder: fitted_encoder,
            scaler: fitted_scaler,
            feature_names,
        })
    }

    /// Fit and transform the fitting frame in one step.
    pub fn fit_transform(
        &self,
        frame: &DataFrame,
        target: &[f64],
    ) -> Result<(FittedPreprocessor, Array2<f64>)> {
        let fitted = self.fit(frame, target)?;
        let matrix = fitted.transform(frame)?;
        Ok((fitted, matrix))
    }
}

/// Fitted preprocessing pipeline.
///
/// Owns the feature-name layout it was fitted with; [`transform`] selects
/// exactly those columns, in that order, before encoding and scaling.
///
/// [`transform`]: FittedPreprocessor::transform
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FittedPreprocessor {
    encoder: FittedMeanEncoder,
    scaler: FittedStandardScaler,
    feature_names: Vec<String>,
}

impl FittedPreprocessor {
    /// Feature names (and their order) expected at transform time.
    pub fn feature_names_in(&self) -> &[String] {
        &self.feature_names
    }

    /// Number of features expected at transform time.
    pub fn n_features_in(&self) -> usize {
        self.feature_names.len()
    }

    /// Encode and scale a frame into a model-ready matrix.
    ///
    /// # Errors
    /// `MissingColumn` if an expected feature is absent; callers that want
    /// zero-fill reconciliation do it before this point.
    pub fn transform(&self, frame: &DataFrame) -> Result<Array2<f64>> {
        let selected = frame.select(&self.feature_names)?;
        let encoded = self.encoder.transform(&selected)?;
        let matrix = encoded.to_matrix()?;
        self.scaler.transform(&matrix)
    }

    /// The fitted encoder stage.
    pub fn encoder(&self) -> &FittedMeanEncoder {
        &self.encoder
    }

    /// The fitted scaler stage.
    pub fn scaler(&self) -> &FittedStandardScaler {
        &self.scaler
    }
}

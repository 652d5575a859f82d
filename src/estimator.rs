//! The deployable estimator bundle.
//!
//! A [`PriceEstimator`] binds the three fitted artifacts of a training run
//! (feature engineer, preprocessing pipeline, and the selected model)
//! into one inference unit that is saved and loaded as a whole, so the
//! transforms applied at serving time can never drift from the ones the
//! model was trained behind.
//!
//! Prediction holds no state across calls; a loaded bundle is immutable
//! and may be shared across concurrent requests.

use crate::error::Result;
use crate::features::SpecFeaturizer;
use crate::frame::DataFrame;
use crate::models::{registry, Regressor};
use crate::preprocessing::FittedPreprocessor;
use log::{info, warn};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serialized form of a [`PriceEstimator`].
#[derive(Serialize, Deserialize)]
struct EstimatorParams {
    featurizer: SpecFeaturizer,
    preprocessor: FittedPreprocessor,
    algorithm: String,
    model: Vec<u8>,
}

/// The {feature engineer, preprocessing pipeline, trained model} triple,
/// applied strictly in that order at inference time.
pub struct PriceEstimator {
    featurizer: SpecFeaturizer,
    preprocessor: FittedPreprocessor,
    model: Box<dyn Regressor>,
}

impl PriceEstimator {
    /// Bundle fitted artifacts. The three pieces must come from the same
    /// training run.
    pub fn new(
        featurizer: SpecFeaturizer,
        preprocessor: FittedPreprocessor,
        model: Box<dyn Regressor>,
    ) -> Self {
        Self {
            featurizer,
            preprocessor,
            model,
        }
    }

    /// Registry identifier of the bundled model.
    pub fn algorithm(&self) -> &'static str {
        self.model.algorithm()
    }

    /// Feature names the preprocessing pipeline expects.
    pub fn feature_names(&self) -> &[String] {
        self.preprocessor.feature_names_in()
    }

    /// Predict prices for raw spec records.
    ///
    /// Steps: featurize; reconcile columns against the preprocessor's
    /// expected feature set (missing features are zero-filled, extras
    /// dropped, order restored); encode and scale; predict. With
    /// `actual_price` the training-time log transform is inverted via
    /// `exp`, returning currency instead of log-price.
    pub fn predict(&self, raw: &DataFrame, actual_price: bool) -> Result<Vec<f64>> {
        let engineered = self.featurizer.transform(raw)?;
        let reconciled = self.reconcile(&engineered)?;
        let matrix = self.preprocessor.transform(&reconciled)?;
        let predictions = self.model.predict(&matrix)?;

        let out = if actual_price {
            predictions.iter().map(|p| p.exp()).collect()
        } else {
            predictions.to_vec()
        };
        Ok(out)
    }

    /// Predict from an already encoded-and-scaled feature matrix,
    /// bypassing featurization and preprocessing.
    pub fn predict_preprocessed(&self, matrix: &Array2<f64>) -> Result<Vec<f64>> {
        Ok(self.model.predict(matrix)?.to_vec())
    }

    /// Align an engineered frame with the preprocessor's expected feature
    /// set: zero-fill what is missing, keep exactly the expected columns
    /// in the expected order.
    ///
    /// Zero-filling is silent imputation, not a sound missing-value
    /// strategy; it is preserved for compatibility with the training
    /// pipeline's contract.
    fn reconcile(&self, engineered: &DataFrame) -> Result<DataFrame> {
        let expected = self.preprocessor.feature_names_in().to_vec();
        let mut frame = engineered.clone();
        for name in &expected {
            if !frame.has_column(name) {
                warn!("feature '{}' missing at inference, zero-filling", name);
                frame.set_num(name, vec![0.0; frame.n_rows()])?;
            }
        }
        frame.select(&expected)
    }

    /// Save the whole bundle to one file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let params = EstimatorParams {
            featurizer: self.featurizer.clone(),
            preprocessor: self.preprocessor.clone(),
            algorithm: self.model.algorithm().to_string(),
            model: self.model.to_bytes()?,
        };
        let bytes = bincode::serialize(&params)?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path.as_ref(), bytes)?;
        info!("saved estimator bundle to {}", path.as_ref().display());
        Ok(())
    }

    /// Load a bundle. The loaded artifacts are never refit, keeping the
    /// bundle safe to share read-only.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let params: EstimatorParams = bincode::deserialize(&bytes)?;
        let model = registry::from_bytes(&params.algorithm, &params.model)?;
        info!(
            "loaded estimator bundle ({}) from {}",
            params.algorithm,
            path.as_ref().display()
        );
        Ok(Self {
            featurizer: params.featurizer,
            preprocessor: params.preprocessor,
            model,
        })
    }
}

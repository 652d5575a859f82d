//! K-nearest-neighbors regression.

use crate::error::{PricerError, Result};
use crate::models::{check_fit_input, check_predict_input, Regressor};
use crate::selection::params::ParamSet;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Nearest-neighbor regressor: predicts the mean target of the `k`
/// training samples closest in Euclidean distance.
///
/// Fitting just stores the training data, so features should be scaled
/// before they reach this model (the preprocessing pipeline guarantees
/// that here).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KNeighborsRegressor {
    n_neighbors: usize,
    train_x: Option<Vec<Vec<f64>>>,
    train_y: Option<Vec<f64>>,
    n_features: usize,
}

impl Default for KNeighborsRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl KNeighborsRegressor {
    /// Create a regressor with `k = 5`.
    pub fn new() -> Self {
        Self {
            n_neighbors: 5,
            train_x: None,
            train_y: None,
            n_features: 0,
        }
    }

    /// Set the neighborhood size.
    pub fn with_n_neighbors(mut self, n_neighbors: usize) -> Self {
        self.n_neighbors = n_neighbors.max(1);
        self
    }

    /// Build from a hyperparameter set. Unknown keys are rejected.
    pub fn from_params(params: &ParamSet) -> Result<Self> {
        let mut model = Self::new();
        for (name, value) in params {
            match name.as_str() {
                "n_neighbors" => model.n_neighbors = value.as_usize(name)?.max(1),
                other => {
                    return Err(PricerError::InvalidParameter(format!(
                        "knn does not accept '{}'",
                        other
                    )))
                }
            }
        }
        Ok(model)
    }
}

impl Regressor for KNeighborsRegressor {
    fn algorithm(&self) -> &'static str {
        "knn"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_input(x, y)?;
        self.n_features = x.dim().1;
        self.train_x = Some(x.rows().into_iter().map(|r| r.to_vec()).collect());
        self.train_y = Some(y.to_vec());
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let train_x = self
            .train_x
            .as_ref()
            .ok_or_else(|| PricerError::NotFitted("knn regression".to_string()))?;
        let train_y = self
            .train_y
            .as_ref()
            .ok_or_else(|| PricerError::NotFitted("knn regression".to_string()))?;
        check_predict_input(x.dim().1, self.n_features)?;

        let k = self.n_neighbors.min(train_x.len());
        let predictions = x
            .rows()
            .into_iter()
            .map(|row| {
                let mut distances: Vec<(f64, f64)> = train_x
                    .iter()
                    .zip(train_y.iter())
                    .map(|(sample, &target)| {
                        let d2: f64 = sample
                            .iter()
                            .zip(row.iter())
                            .map(|(a, b)| (a - b).powi(2))
                            .sum();
                        (d2, target)
                    })
                    .collect();
                distances
                    .sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
                distances.iter().take(k).map(|(_, t)| t).sum::<f64>() / k as f64
            })
            .collect();
        Ok(Array1::from_vec(predictions))
    }

    fn clone_unfitted(&self) -> Box<dyn Regressor> {
        Box::new(KNeighborsRegressor::new().with_n_neighbors(self.n_neighbors))
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }
}

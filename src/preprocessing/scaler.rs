//! Standard scaling (z-score normalization).
//!
//! Transforms features by removing the per-column mean and scaling to unit
//! variance:
//!
//! ```text
//! z = (x - u) / s
//! ```
//!
//! where `u` is the column mean and `s` the population standard deviation
//! seen during fitting. Constant columns scale by 1.0 instead of dividing
//! by zero.

use crate::error::{PricerError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Unfitted standard scaler.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StandardScaler {
    with_mean: bool,
    with_std: bool,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    /// Create a scaler that both centers and scales.
    pub fn new() -> Self {
        Self {
            with_mean: true,
            with_std: true,
        }
    }

    /// Set whether to center data by the column mean.
    pub fn with_mean(mut self, with_mean: bool) -> Self {
        self.with_mean = with_mean;
        self
    }

    /// Set whether to scale data to unit variance.
    pub fn with_std(mut self, with_std: bool) -> Self {
        self.with_std = with_std;
        self
    }

    /// Learn per-column mean and standard deviation.
    ///
    /// # Errors
    /// [`PricerError::EmptyData`] if the matrix has no rows.
    pub fn fit(&self, data: &Array2<f64>) -> Result<FittedStandardScaler> {
        let (rows, cols) = data.dim();
        if rows == 0 {
            return Err(PricerError::EmptyData(
                "cannot fit StandardScaler on empty data".to_string(),
            ));
        }

        let col_means = data.mean_axis(Axis(0)).ok_or_else(|| {
            PricerError::EmptyData("cannot compute column means of empty data".to_string())
        })?;

        let mean: Vec<f64> = if self.with_mean {
            col_means.to_vec()
        } else {
            vec![0.0; cols]
        };

        let std: Vec<f64> = if self.with_std {
            // Population std (ddof = 0); constant columns scale by 1.0.
            (0..cols)
                .map(|j| {
                    let var = data
                        .column(j)
                        .iter()
                        .map(|&v| (v - col_means[j]).powi(2))
                        .sum::<f64>()
                        / rows as f64;
                    let s = var.sqrt();
                    if s == 0.0 {
                        1.0
                    } else {
                        s
                    }
                })
                .collect()
        } else {
            vec![1.0; cols]
        };

        Ok(FittedStandardScaler {
            with_mean: self.with_mean,
            with_std: self.with_std,
            mean,
            std,
            n_features: cols,
        })
    }

    /// Fit and transform in one step.
    pub fn fit_transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        let fitted = self.fit(data)?;
        fitted.transform(data)
    }
}

/// Fitted standard scaler ready for inference.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FittedStandardScaler {
    with_mean: bool,
    with_std: bool,
    mean: Vec<f64>,
    std: Vec<f64>,
    n_features: usize,
}

impl FittedStandardScaler {
    /// Per-column means learned during fit.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Per-column standard deviations learned during fit.
    pub fn std(&self) -> &[f64] {
        &self.std
    }

    /// Number of features seen during fit.
    pub fn n_features_in(&self) -> usize {
        self.n_features
    }

    /// Apply the learned scaling.
    ///
    /// # Errors
    /// [`PricerError::FeatureMismatch`] if the column count differs from
    /// the fitting data.
    pub fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        let (_, cols) = data.dim();
        if cols != self.n_features {
            return Err(PricerError::FeatureMismatch {
                expected_features: self.n_features,
                got_features: cols,
            });
        }

        let mean = Array1::from_vec(self.mean.clone());
        let std = Array1::from_vec(self.std.clone());
        let mut out = data.clone();
        if self.with_mean {
            out = out - &mean;
        }
        if self.with_std {
            out = out / &std;
        }
        Ok(out)
    }

    /// Undo the scaling.
    pub fn inverse_transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        let (_, cols) = data.dim();
        if cols != self.n_features {
            return Err(PricerError::FeatureMismatch {
                expected_features: self.n_features,
                got_features: cols,
            });
        }

        let mean = Array1::from_vec(self.mean.clone());
        let std = Array1::from_vec(self.std.clone());
        let mut out = data.clone();
        if self.with_std {
            out = out * &std;
        }
        if self.with_mean {
            out = out + &mean;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> Array2<f64> {
        array![[0.0, 1.0], [0.0, 1.0], [1.0, 3.0]]
    }

    #[test]
    fn test_fit_means() {
        let fitted = StandardScaler::new().fit(&sample()).unwrap();
        let mean = fitted.mean();
        assert!((mean[0] - 1.0 / 3.0).abs() < 1e-12);
        assert!((mean[1] - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_standardizes() {
        let data = sample();
        let scaled = StandardScaler::new().fit_transform(&data).unwrap();

        for j in 0..2 {
            let col: Vec<f64> = scaled.column(j).to_vec();
            let mean: f64 = col.iter().sum::<f64>() / col.len() as f64;
            let var: f64 =
                col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / col.len() as f64;
            assert!(mean.abs() < 1e-10, "mean[{}] = {}", j, mean);
            assert!((var.sqrt() - 1.0).abs() < 1e-8, "std[{}] = {}", j, var.sqrt());
        }
    }

    #[test]
    fn test_inverse_round_trip() {
        let data = sample();
        let fitted = StandardScaler::new().fit(&data).unwrap();
        let recovered = fitted
            .inverse_transform(&fitted.transform(&data).unwrap())
            .unwrap();
        for (a, b) in data.iter().zip(recovered.iter()) {
            assert!((a - b).abs() < 1e-10);
        }
    }

    #[test]
    fn test_constant_feature_scales_by_one() {
        let data = array![[5.0, 1.0], [5.0, 2.0], [5.0, 3.0]];
        let fitted = StandardScaler::new().fit(&data).unwrap();
        assert_eq!(fitted.std()[0], 1.0);
        assert!((fitted.mean()[0] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_without_mean_and_std() {
        let data = sample();
        let fitted = StandardScaler::new()
            .with_mean(false)
            .with_std(false)
            .fit(&data)
            .unwrap();
        let out = fitted.transform(&data).unwrap();
        for (a, b) in data.iter().zip(out.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_feature_mismatch() {
        let fitted = StandardScaler::new().fit(&sample()).unwrap();
        let wrong = array![[1.0, 2.0, 3.0]];
        assert!(matches!(
            fitted.transform(&wrong),
            Err(PricerError::FeatureMismatch {
                expected_features: 2,
                got_features: 3
            })
        ));
    }

    #[test]
    fn test_empty_data() {
        let empty = Array2::<f64>::zeros((0, 2));
        assert!(StandardScaler::new().fit(&empty).is_err());
    }

    #[test]
    fn test_serialization_round_trip() {
        let data = sample();
        let fitted = StandardScaler::new().fit(&data).unwrap();
        let bytes = bincode::serialize(&fitted).unwrap();
        let restored: FittedStandardScaler = bincode::deserialize(&bytes).unwrap();

        let a = fitted.transform(&data).unwrap();
        let b = restored.transform(&data).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-12);
        }
    }
}

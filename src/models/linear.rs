//! Ridge-regularized linear regression via the normal equations.
//!
//! Solves `(XᵀX + αI) w = Xᵀy` exactly; `alpha = 0` recovers ordinary
//! least squares, which may fail on collinear features (the error message
//! says to raise `alpha`).

use crate::error::{PricerError, Result};
use crate::models::{check_fit_input, check_predict_input, solve_linear_system, Regressor};
use crate::selection::params::ParamSet;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Linear regression with L2 regularization.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RidgeRegression {
    alpha: f64,
    fit_intercept: bool,
    coefficients: Option<Vec<f64>>,
    intercept: f64,
    n_features: usize,
}

impl Default for RidgeRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl RidgeRegression {
    /// Create a ridge regressor with `alpha = 1.0` and an intercept.
    pub fn new() -> Self {
        Self {
            alpha: 1.0,
            fit_intercept: true,
            coefficients: None,
            intercept: 0.0,
            n_features: 0,
        }
    }

    /// Set the L2 regularization strength.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set whether to fit an intercept term.
    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    /// Build from a hyperparameter set. Unknown keys are rejected.
    pub fn from_params(params: &ParamSet) -> Result<Self> {
        let mut model = Self::new();
        for (name, value) in params {
            match name.as_str() {
                "alpha" => model.alpha = value.as_f64(name)?,
                "fit_intercept" => model.fit_intercept = value.as_bool(name)?,
                other => {
                    return Err(PricerError::InvalidParameter(format!(
                        "ridge does not accept '{}'",
                        other
                    )))
                }
            }
        }
        Ok(model)
    }

    /// Fitted coefficients, one per feature.
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.coefficients.as_deref()
    }

    /// Fitted intercept.
    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Regressor for RidgeRegression {
    fn algorithm(&self) -> &'static str {
        "ridge"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_input(x, y)?;
        let (_, cols) = x.dim();

        // Center features and target when fitting an intercept, then solve
        // the regularized normal equations on the centered system.
        let (xc, yc, x_means, y_mean) = if self.fit_intercept {
            let x_means = x
                .mean_axis(Axis(0))
                .ok_or_else(|| PricerError::EmptyData("no rows to fit".to_string()))?;
            let y_mean = y.sum() / y.len() as f64;
            (x - &x_means, y - y_mean, x_means.to_vec(), y_mean)
        } else {
            (x.clone(), y.clone(), vec![0.0; cols], 0.0)
        };

        let mut gram = xc.t().dot(&xc);
        for j in 0..cols {
            gram[[j, j]] += self.alpha;
        }
        let rhs = xc.t().dot(&yc);
        let w = solve_linear_system(&gram, &rhs)?;

        self.intercept = if self.fit_intercept {
            y_mean
                - x_means
                    .iter()
                    .zip(w.iter())
                    .map(|(m, c)| m * c)
                    .sum::<f64>()
        } else {
            0.0
        };
        self.coefficients = Some(w.to_vec());
        self.n_features = cols;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self
            .coefficients
            .as_ref()
            .ok_or_else(|| PricerError::NotFitted("ridge regression".to_string()))?;
        check_predict_input(x.dim().1, self.n_features)?;

        let w = Array1::from_vec(coefficients.clone());
        Ok(x.dot(&w) + self.intercept)
    }

    fn clone_unfitted(&self) -> Box<dyn Regressor> {
        Box::new(
            RidgeRegression::new()
                .with_alpha(self.alpha)
                .with_fit_intercept(self.fit_intercept),
        )
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::params::ParamValue;
    use ndarray::array;

    #[test]
    fn test_recovers_linear_relationship() {
        // y = 2x + 1
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = array![1.0, 3.0, 5.0, 7.0];

        let mut model = RidgeRegression::new().with_alpha(1e-8);
        model.fit(&x, &y).unwrap();

        let coef = model.coefficients().unwrap();
        assert!((coef[0] - 2.0).abs() < 1e-4, "coef = {}", coef[0]);
        assert!((model.intercept() - 1.0).abs() < 1e-4);

        let pred = model.predict(&array![[4.0]]).unwrap();
        assert!((pred[0] - 9.0).abs() < 1e-3);
    }

    #[test]
    fn test_alpha_shrinks_coefficients() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = array![1.0, 3.0, 5.0, 7.0];

        let mut loose = RidgeRegression::new().with_alpha(1e-8);
        let mut tight = RidgeRegression::new().with_alpha(100.0);
        loose.fit(&x, &y).unwrap();
        tight.fit(&x, &y).unwrap();

        assert!(
            tight.coefficients().unwrap()[0].abs() < loose.coefficients().unwrap()[0].abs()
        );
    }

    #[test]
    fn test_without_intercept() {
        // y = 3x through the origin.
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![3.0, 6.0, 9.0];

        let mut model = RidgeRegression::new()
            .with_alpha(1e-8)
            .with_fit_intercept(false);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.intercept(), 0.0);
        assert!((model.coefficients().unwrap()[0] - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_predict_before_fit() {
        let model = RidgeRegression::new();
        let result = model.predict(&array![[1.0]]);
        assert!(matches!(result, Err(PricerError::NotFitted(_))));
    }

    #[test]
    fn test_predict_feature_mismatch() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 2.0];
        let mut model = RidgeRegression::new();
        model.fit(&x, &y).unwrap();

        assert!(matches!(
            model.predict(&array![[1.0, 2.0]]),
            Err(PricerError::FeatureMismatch { .. })
        ));
    }

    #[test]
    fn test_from_params() {
        let mut params = ParamSet::new();
        params.insert("alpha".to_string(), ParamValue::Float(0.5));
        params.insert("fit_intercept".to_string(), ParamValue::Bool(false));
        let model = RidgeRegression::from_params(&params).unwrap();
        assert_eq!(model.alpha, 0.5);
        assert!(!model.fit_intercept);
    }

    #[test]
    fn test_from_params_rejects_unknown_key() {
        let mut params = ParamSet::new();
        params.insert("depth".to_string(), ParamValue::Int(3));
        assert!(matches!(
            RidgeRegression::from_params(&params),
            Err(PricerError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_clone_unfitted_drops_state() {
        let x = array![[0.0], [1.0]];
        let y = array![0.0, 2.0];
        let mut model = RidgeRegression::new().with_alpha(0.25);
        model.fit(&x, &y).unwrap();

        let clone = model.clone_unfitted();
        assert!(matches!(
            clone.predict(&array![[1.0]]),
            Err(PricerError::NotFitted(_))
        ));
    }

    #[test]
    fn test_serialization_round_trip() {
        let x = array![[0.0], [1.0], [2.0]];
        let y = array![1.0, 2.0, 3.0];
        let mut model = RidgeRegression::new().with_alpha(1e-6);
        model.fit(&x, &y).unwrap();

        let bytes = model.to_bytes().unwrap();
        let restored: RidgeRegression = bincode::deserialize(&bytes).unwrap();
        let a = model.predict(&x).unwrap();
        let b = restored.predict(&x).unwrap();
        for (p, q) in a.iter().zip(b.iter()) {
            assert!((p - q).abs() < 1e-12);
        }
    }
}

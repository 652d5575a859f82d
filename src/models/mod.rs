//! Regression models and the algorithm registry.
//!
//! Every candidate algorithm implements the [`Regressor`] capability
//! interface so the tuning machinery can treat them uniformly. Concrete
//! models are instantiated through [`registry`] from a string identifier
//! plus a hyperparameter set: an explicit, compile-time table rather than
//! reflection.

pub mod forest;
pub mod knn;
pub mod linear;
pub mod registry;
pub mod tree;

pub use forest::RandomForestRegressor;
pub use knn::KNeighborsRegressor;
pub use linear::RidgeRegression;
pub use tree::DecisionTreeRegressor;

use crate::error::{PricerError, Result};
use crate::selection::metrics::r2_score;
use ndarray::{Array1, Array2};

/// Common capability interface for all candidate regression algorithms.
///
/// `Send + Sync` so a fitted model inside an estimator bundle can be
/// shared across concurrent prediction requests without locking; nothing
/// mutates a model after `fit`.
pub trait Regressor: Send + Sync {
    /// Registry identifier of the concrete algorithm.
    fn algorithm(&self) -> &'static str;

    /// Fit on a feature matrix and target vector.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict targets for a feature matrix.
    ///
    /// # Errors
    /// [`PricerError::NotFitted`] before `fit`;
    /// [`PricerError::FeatureMismatch`] on a column-count change.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Coefficient of determination on the given data.
    fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let pred = self.predict(x)?;
        Ok(r2_score(&y.to_vec(), &pred.to_vec()))
    }

    /// Fresh unfitted copy carrying the same hyperparameters. Used to
    /// clone a candidate for each cross-validation fold.
    fn clone_unfitted(&self) -> Box<dyn Regressor>;

    /// Serialize the fitted state for the estimator bundle.
    fn to_bytes(&self) -> Result<Vec<u8>>;
}

/// Validate the shapes handed to a `fit` implementation.
pub(crate) fn check_fit_input(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    let (rows, _) = x.dim();
    if rows == 0 {
        return Err(PricerError::EmptyData(
            "cannot fit on zero samples".to_string(),
        ));
    }
    if rows != y.len() {
        return Err(PricerError::FeatureMismatch {
            expected_features: rows,
            got_features: y.len(),
        });
    }
    Ok(())
}

/// Validate the column count handed to a `predict` implementation.
pub(crate) fn check_predict_input(cols: usize, n_features: usize) -> Result<()> {
    if cols != n_features {
        return Err(PricerError::FeatureMismatch {
            expected_features: n_features,
            got_features: cols,
        });
    }
    Ok(())
}

/// Solve the square system `a * w = b` by Gaussian elimination with
/// partial pivoting. Used by the closed-form linear solver.
pub(crate) fn solve_linear_system(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    let n = b.len();
    let mut m = a.clone();
    let mut rhs = b.clone();

    for col in 0..n {
        // Pivot on the largest remaining magnitude in this column.
        let mut pivot = col;
        for row in (col + 1)..n {
            if m[[row, col]].abs() > m[[pivot, col]].abs() {
                pivot = row;
            }
        }
        if m[[pivot, col]].abs() < 1e-12 {
            return Err(PricerError::InvalidParameter(
                "singular normal-equation matrix; raise the regularization strength".to_string(),
            ));
        }
        if pivot != col {
            for k in 0..n {
                m.swap([col, k], [pivot, k]);
            }
            rhs.swap(col, pivot);
        }

        for row in (col + 1)..n {
            let factor = m[[row, col]] / m[[col, col]];
            for k in col..n {
                m[[row, k]] -= factor * m[[col, k]];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut w = Array1::zeros(n);
    for col in (0..n).rev() {
        let mut sum = rhs[col];
        for k in (col + 1)..n {
            sum -= m[[col, k]] * w[k];
        }
        w[col] = sum / m[[col, col]];
    }
    Ok(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_solve_linear_system_identity() {
        let a = array![[1.0, 0.0], [0.0, 1.0]];
        let b = array![3.0, 4.0];
        let w = solve_linear_system(&a, &b).unwrap();
        assert!((w[0] - 3.0).abs() < 1e-12);
        assert!((w[1] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_solve_linear_system_requires_pivoting() {
        // Zero on the diagonal; partial pivoting must handle it.
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let b = array![2.0, 5.0];
        let w = solve_linear_system(&a, &b).unwrap();
        assert!((w[0] - 5.0).abs() < 1e-12);
        assert!((w[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_solve_linear_system_singular() {
        let a = array![[1.0, 1.0], [1.0, 1.0]];
        let b = array![1.0, 2.0];
        assert!(matches!(
            solve_linear_system(&a, &b),
            Err(PricerError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_check_fit_input() {
        let x = Array2::<f64>::zeros((3, 2));
        let y = Array1::<f64>::zeros(3);
        assert!(check_fit_input(&x, &y).is_ok());

        let y_short = Array1::<f64>::zeros(2);
        assert!(check_fit_input(&x, &y_short).is_err());

        let empty = Array2::<f64>::zeros((0, 2));
        assert!(check_fit_input(&empty, &Array1::zeros(0)).is_err());
    }
}

//! Random forest regression: bootstrap-bagged CART trees.

use crate::error::{PricerError, Result};
use crate::models::tree::DecisionTreeRegressor;
use crate::models::{check_fit_input, check_predict_input, Regressor};
use crate::selection::params::ParamSet;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Random forest regressor.
///
/// Each tree trains on a bootstrap sample (with replacement) of the
/// training rows; predictions average over all trees. A `random_state`
/// makes the bootstrap draws, and therefore the whole fit, reproducible.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    n_estimators: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    random_state: Option<u64>,
    trees: Vec<DecisionTreeRegressor>,
    n_features: usize,
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForestRegressor {
    /// Create a forest with `n_estimators` trees.
    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators: n_estimators.max(1),
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            random_state: None,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    /// Limit the depth of each tree.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Minimum samples required to split a node in each tree.
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Minimum samples required in each leaf of each tree.
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Seed the bootstrap sampling for reproducible fits.
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    /// Build from a hyperparameter set. Unknown keys are rejected.
    pub fn from_params(params: &ParamSet) -> Result<Self> {
        let mut model = Self::new(100);
        for (name, value) in params {
            match name.as_str() {
                "n_estimators" => model.n_estimators = value.as_usize(name)?.max(1),
                "max_depth" => model.max_depth = Some(value.as_usize(name)?),
                "min_samples_split" => {
                    model.min_samples_split = value.as_usize(name)?.max(2)
                }
                "min_samples_leaf" => model.min_samples_leaf = value.as_usize(name)?.max(1),
                "random_state" => model.random_state = Some(value.as_u64(name)?),
                other => {
                    return Err(PricerError::InvalidParameter(format!(
                        "random_forest does not accept '{}'",
                        other
                    )))
                }
            }
        }
        Ok(model)
    }

    /// Number of fitted trees.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn tree_template(&self) -> DecisionTreeRegressor {
        let mut tree = DecisionTreeRegressor::new()
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf);
        if let Some(depth) = self.max_depth {
            tree = tree.with_max_depth(depth);
        }
        tree
    }
}

/// Draw `n_samples` row indices with replacement.
fn bootstrap_sample(n_samples: usize, rng: &mut StdRng) -> Vec<usize> {
    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
}

impl Regressor for RandomForestRegressor {
    fn algorithm(&self) -> &'static str {
        "random_forest"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_input(x, y)?;
        let (n_samples, n_features) = x.dim();
        self.n_features = n_features;
        self.trees = Vec::with_capacity(self.n_estimators);

        let mut rng = match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        for _ in 0..self.n_estimators {
            let sample = bootstrap_sample(n_samples, &mut rng);

            let mut boot_x = Array2::zeros((n_samples, n_features));
            let mut boot_y = Array1::zeros(n_samples);
            for (row, &idx) in sample.iter().enumerate() {
                boot_x.row_mut(row).assign(&x.row(idx));
                boot_y[row] = y[idx];
            }

            let mut tree = self.tree_template();
            tree.fit(&boot_x, &boot_y)?;
            self.trees.push(tree);
        }
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(PricerError::NotFitted("random forest".to_string()));
        }
        check_predict_input(x.dim().1, self.n_features)?;

        let mut total = Array1::<f64>::zeros(x.dim().0);
        for tree in &self.trees {
            total = total + tree.predict(x)?;
        }
        Ok(total / self.trees.len() as f64)
    }

    fn clone_unfitted(&self) -> Box<dyn Regressor> {
        let mut fresh = RandomForestRegressor::new(self.n_estimators)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf);
        fresh.max_depth = self.max_depth;
        fresh.random_state = self.random_state;
        Box::new(fresh)
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

    fn step_data() -> (Array2<f64>, Array1<f64>) {
        (
            array![[1.0], [2.0], [3.0], [4.0], [10.0], [11.0], [12.0], [13.0]],
            array![5.0, 5.0, 5.0, 5.0, 50.0, 50.0, 50.0, 50.0],
        )
    }

    #[test]
    fn test_forest_learns_step_function() {
        let (x, y) = step_data();
        let mut forest = RandomForestRegressor::new(20).with_random_state(42);
        forest.fit(&x, &y).unwrap();
        assert_eq!(forest.n_trees(), 20);

        let pred = forest.predict(&array![[2.0], [11.0]]).unwrap();
        assert!(pred[0] < 20.0, "low-side prediction {}", pred[0]);
        assert!(pred[1] > 35.0, "high-side prediction {}", pred[1]);
    }

    #[test]
    fn test_seeded_fit_is_reproducible() {
        let (x, y) = step_data();
        let mut a = RandomForestRegressor::new(10).with_random_state(7);
        let mut b = RandomForestRegressor::new(10).with_random_state(7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_eq!(
            a.predict(&x).unwrap().to_vec(),
            b.predict(&x).unwrap().to_vec()
        );
    }

    #[test]
    fn test_predict_before_fit() {
        let forest = RandomForestRegressor::new(5);
        assert!(matches!(
            forest.predict(&array![[1.0]]),
            Err(PricerError::NotFitted(_))
        ));
    }

    #[test]
    fn test_feature_mismatch() {
        let (x, y) = step_data();
        let mut forest = RandomForestRegressor::new(3).with_random_state(1);
        forest.fit(&x, &y).unwrap();
        assert!(matches!(
            forest.predict(&array![[1.0, 2.0]]),
            Err(PricerError::FeatureMismatch { .. })
        ));
    }

    #[test]
    fn test_from_params() {
        let mut params = ParamSet::new();
        params.insert("n_estimators".to_string(), ParamValue::Int(25));
        params.insert("max_depth".to_string(), ParamValue::Int(6));
        params.insert("random_state".to_string(), ParamValue::Int(3));
        let forest = RandomForestRegressor::from_params(&params).unwrap();
        assert_eq!(forest.n_estimators, 25);
        assert_eq!(forest.max_depth, Some(6));
        assert_eq!(forest.random_state, Some(3));

        params.insert("bootstrap".to_string(), ParamValue::Bool(false));
        assert!(RandomForestRegressor::from_params(&params).is_err());
    }

    #[test]
    fn test_serialization_round_trip() {
        let (x, y) = step_data();
        let mut forest = RandomForestRegressor::new(5).with_random_state(9);
        forest.fit(&x, &y).unwrap();

        let bytes = forest.to_bytes().unwrap();
        let restored: RandomForestRegressor = bincode::deserialize(&bytes).unwrap();
        assert_eq!(
            forest.predict(&x).unwrap().to_vec(),
            restored.predict(&x).unwrap().to_vec()
        );
    }
}

//! Cross-validated hyperparameter search.
//!
//! A search strategy explores a candidate's hyperparameter grid, either
//! exhaustively or by uniform sampling, scoring every configuration with
//! k-fold cross-validation on the training split, then refits the winning
//! configuration on the full training split.

use crate::error::{PricerError, Result};
use crate::models::{registry, Regressor};
use crate::selection::kfold::KFold;
use crate::selection::metrics::r2_score;
use crate::selection::params::{expand_grid, sample_grid, ParamGrid, ParamSet};
use log::{debug, info};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// How to explore a hyperparameter grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Try every combination.
    Grid,
    /// Sample `n_iter` combinations uniformly.
    Randomized,
}

/// Strategy-level search settings, shared by every candidate in a catalog.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Grid-exhaustive or randomized exploration.
    #[serde(default = "SearchConfig::default_strategy")]
    pub strategy: SearchStrategy,
    /// Cross-validation fold count.
    #[serde(default = "SearchConfig::default_cv")]
    pub cv: usize,
    /// Sample count for [`SearchStrategy::Randomized`]; ignored by grid
    /// search.
    #[serde(default = "SearchConfig::default_n_iter")]
    pub n_iter: usize,
    /// Shuffle rows before folding.
    #[serde(default)]
    pub shuffle: bool,
    /// Seed for fold shuffling and randomized sampling.
    #[serde(default)]
    pub random_state: Option<u64>,
}

impl SearchConfig {
    fn default_strategy() -> SearchStrategy {
        SearchStrategy::Grid
    }

    fn default_cv() -> usize {
        3
    }

    fn default_n_iter() -> usize {
        10
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: Self::default_strategy(),
            cv: Self::default_cv(),
            n_iter: Self::default_n_iter(),
            shuffle: false,
            random_state: None,
        }
    }
}

/// Outcome of tuning one candidate: the winning configuration, its mean
/// cross-validated score, and the model refit on the full training split.
pub struct TunedFit {
    /// Hyperparameters of the winning configuration (defaults merged with
    /// the grid assignment).
    pub best_params: ParamSet,
    /// Mean cross-validated r2 of the winning configuration.
    pub cv_score: f64,
    /// The winning model, refit on the full training split.
    pub model: Box<dyn Regressor>,
}

/// Tune one algorithm over its grid.
///
/// Candidate configurations are compared by mean cross-validated r2 with
/// strict `>`, so the first configuration tried keeps a tie.
///
/// # Errors
/// [`PricerError::InvalidParameter`] when the fold count is below 2 or
/// exceeds the sample count, plus any construction or fitting error from
/// the algorithm itself.
pub fn tune(
    algorithm: &str,
    defaults: &ParamSet,
    grid: &ParamGrid,
    x: &Array2<f64>,
    y: &Array1<f64>,
    config: &SearchConfig,
) -> Result<TunedFit> {
    let n_samples = x.dim().0;
    if config.cv < 2 {
        return Err(PricerError::InvalidParameter(format!(
            "cross-validation needs at least 2 folds, got {}",
            config.cv
        )));
    }
    if n_samples < config.cv {
        return Err(PricerError::InvalidParameter(format!(
            "{} samples cannot fill {} folds",
            n_samples, config.cv
        )));
    }

    let configurations: Vec<ParamSet> = match config.strategy {
        SearchStrategy::Grid => expand_grid(grid),
        SearchStrategy::Randomized => {
            let mut rng = match config.random_state {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            sample_grid(grid, config.n_iter, &mut rng)
        }
    };
    info!(
        "tuning [{}]: {} configurations, {}-fold cv",
        algorithm,
        configurations.len(),
        config.cv
    );

    let mut kfold = KFold::new(config.cv);
    if let Some(seed) = config.random_state {
        kfold = kfold.with_random_state(seed);
    } else if config.shuffle {
        kfold = kfold.with_shuffle(true);
    }
    let splits = kfold.split(n_samples);

    let mut best: Option<(ParamSet, f64)> = None;
    for overrides in configurations {
        let mut merged = defaults.clone();
        for (name, value) in &overrides {
            merged.insert(name.clone(), value.clone());
        }

        let mut fold_scores = Vec::with_capacity(splits.len());
        for (train_idx, test_idx) in &splits {
            let x_train = x.select(Axis(0), train_idx);
            let y_train = y.select(Axis(0), train_idx);
            let x_test = x.select(Axis(0), test_idx);
            let y_test = y.select(Axis(0), test_idx);

            let mut model = registry::build(algorithm, &merged)?;
            model.fit(&x_train, &y_train)?;
            let pred = model.predict(&x_test)?;
            fold_scores.push(r2_score(&y_test.to_vec(), &pred.to_vec()));
        }
        let mean_score = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
        debug!("[{}] {:?} -> cv r2 {:.4}", algorithm, merged, mean_score);

        let improved = match &best {
            Some((_, best_score)) => mean_score > *best_score,
            None => true,
        };
        if improved {
            best = Some((merged, mean_score));
        }
    }

    let (best_params, cv_score) = best.ok_or_else(|| {
        PricerError::InvalidParameter("hyperparameter search produced no configurations".to_string())
    })?;

    let mut model = registry::build(algorithm, &best_params)?;
    model.fit(x, y)?;
    info!(
        "tuned [{}]: best cv r2 {:.4} with {:?}",
        algorithm, cv_score, best_params
    );

    Ok(TunedFit {
        best_params,
        cv_score,
        model,
    })
}

//! Typed hyperparameter values and declarative search spaces.
//!
//! A [`ParamGrid`] maps a hyperparameter name to the candidate values the
//! search may try; a [`ParamSet`] is one concrete assignment. Grids come
//! straight from the YAML model catalog.

use crate::error::{PricerError, Result};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One hyperparameter value.
///
/// Untagged: YAML `8` parses as `Int`, `0.5` as `Float`, `true` as `Bool`,
/// anything quoted as `Str`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    /// Coerce to f64; integers widen.
    pub fn as_f64(&self, name: &str) -> Result<f64> {
        match self {
            ParamValue::Float(v) => Ok(*v),
            ParamValue::Int(v) => Ok(*v as f64),
            _ => Err(PricerError::InvalidParameter(format!(
                "'{}' expects a number, got {:?}",
                name, self
            ))),
        }
    }

    /// Coerce to a non-negative integer.
    pub fn as_usize(&self, name: &str) -> Result<usize> {
        match self {
            ParamValue::Int(v) if *v >= 0 => Ok(*v as usize),
            _ => Err(PricerError::InvalidParameter(format!(
                "'{}' expects a non-negative integer, got {:?}",
                name, self
            ))),
        }
    }

    /// Coerce to u64.
    pub fn as_u64(&self, name: &str) -> Result<u64> {
        match self {
            ParamValue::Int(v) if *v >= 0 => Ok(*v as u64),
            _ => Err(PricerError::InvalidParameter(format!(
                "'{}' expects a non-negative integer, got {:?}",
                name, self
            ))),
        }
    }

    /// Coerce to bool.
    pub fn as_bool(&self, name: &str) -> Result<bool> {
        match self {
            ParamValue::Bool(v) => Ok(*v),
            _ => Err(PricerError::InvalidParameter(format!(
                "'{}' expects a boolean, got {:?}",
                name, self
            ))),
        }
    }
}

/// One concrete hyperparameter assignment.
pub type ParamSet = BTreeMap<String, ParamValue>;

/// Candidate values per hyperparameter.
pub type ParamGrid = BTreeMap<String, Vec<ParamValue>>;

/// Exhaustively expand a grid into every combination, in deterministic
/// (name-sorted, value-listed) order.
///
/// An empty grid expands to a single empty [`ParamSet`] so that a
/// candidate with no search space is still tuned once with its defaults.
pub fn expand_grid(grid: &ParamGrid) -> Vec<ParamSet> {
    let mut combos: Vec<ParamSet> = vec![ParamSet::new()];
    for (name, values) in grid {
        let mut next = Vec::with_capacity(combos.len() * values.len().max(1));
        for combo in &combos {
            for value in values {
                let mut with_value = combo.clone();
                with_value.insert(name.clone(), value.clone());
                next.push(with_value);
            }
        }
        if !next.is_empty() {
            combos = next;
        }
    }
    combos
}

/// Sample `n_iter` assignments uniformly per axis.
///
/// Duplicates are possible for small grids, mirroring randomized search
/// semantics; an empty grid yields a single empty set.
pub fn sample_grid(grid: &ParamGrid, n_iter: usize, rng: &mut StdRng) -> Vec<ParamSet> {
    if grid.is_empty() || grid.values().all(|v| v.is_empty()) {
        return vec![ParamSet::new()];
    }
    (0..n_iter.max(1))
        .map(|_| {
            grid.iter()
                .filter(|(_, values)| !values.is_empty())
                .map(|(name, values)| {
                    let idx = rng.gen_range(0..values.len());
                    (name.clone(), values[idx].clone())
                })
                .collect()
        })
        .collect()
}

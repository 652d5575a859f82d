//! Explicit algorithm registry.
//!
//! The model catalog refers to algorithms by string identifier; this table
//! maps each identifier to a statically-typed constructor and a
//! deserializer. Adding an algorithm means adding a row here; there is no
//! reflective import-by-name.

use crate::error::{PricerError, Result};
use crate::models::{
    DecisionTreeRegressor, KNeighborsRegressor, RandomForestRegressor, Regressor,
    RidgeRegression,
};
use crate::selection::params::ParamSet;

/// Identifiers accepted by [`build`] and [`from_bytes`].
pub const KNOWN_ALGORITHMS: &[&str] = &["ridge", "knn", "decision_tree", "random_forest"];

/// Instantiate an algorithm from its identifier and a hyperparameter set.
///
/// # Errors
/// [`PricerError::UnknownAlgorithm`] for an unregistered identifier;
/// [`PricerError::InvalidParameter`] if the set names a hyperparameter the
/// algorithm does not have.
pub fn build(algorithm: &str, params: &ParamSet) -> Result<Box<dyn Regressor>> {
    match algorithm {
        "ridge" => Ok(Box::new(RidgeRegression::from_params(params)?)),
        "knn" => Ok(Box::new(KNeighborsRegressor::from_params(params)?)),
        "decision_tree" => Ok(Box::new(DecisionTreeRegressor::from_params(params)?)),
        "random_forest" => Ok(Box::new(RandomForestRegressor::from_params(params)?)),
        other => Err(PricerError::UnknownAlgorithm(other.to_string())),
    }
}

/// Reconstruct a fitted model from the bytes produced by
/// [`Regressor::to_bytes`].
pub fn from_bytes(algorithm: &str, bytes: &[u8]) -> Result<Box<dyn Regressor>> {
    match algorithm {
        "ridge" => Ok(Box::new(bincode::deserialize::<RidgeRegression>(bytes)?)),
        "knn" => Ok(Box::new(bincode::deserialize::<KNeighborsRegressor>(bytes)?)),
        "decision_tree" => Ok(Box::new(bincode::deserialize::<DecisionTreeRegressor>(
            bytes,
        )?)),
        "random_forest" => Ok(Box::new(bincode::deserialize::<RandomForestRegressor>(
            bytes,
        )?)),
        other => Err(PricerError::UnknownAlgorithm(other.to_string())),
    }
}

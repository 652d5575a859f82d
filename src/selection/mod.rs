//! Model selection: hyperparameter spaces, cross-validation, search
//! strategies, regression metrics, and the candidate-comparison factory.

pub mod factory;
pub mod kfold;
pub mod metrics;
pub mod params;
pub mod search;

pub use factory::{BestModel, ModelFactory, TunedModelRecord};
pub use kfold::KFold;
pub use metrics::{mean_absolute_error, mean_squared_error, r2_score, RegressionReport};
pub use params::{expand_grid, sample_grid, ParamGrid, ParamSet, ParamValue};
pub use search::{SearchConfig, SearchStrategy};

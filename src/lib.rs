//! # laptop-pricer
//!
//! Laptop retail price prediction from raw hardware specifications, with
//! strict separation between the offline training pipeline and the
//! read-only inference bundle.
//!
//! ## Core Design Principles
//!
//! - **Fitted Type Safety**: transformers come in unfitted/fitted pairs
//!   (`MeanEncoder` -> `FittedMeanEncoder`), so inference code can only
//!   hold artifacts that were actually fitted.
//! - **One Bundle, One Unit**: the feature engineer, preprocessing
//!   pipeline and trained model are saved and loaded together as a
//!   [`PriceEstimator`], eliminating train/serve drift.
//! - **Explicit Algorithm Registry**: catalog entries name algorithms by
//!   string identifier resolved through a compile-time registry
//!   ([`models::registry`]), not reflective imports.
//! - **Declarative Tuning**: candidate models and their hyperparameter
//!   grids live in YAML; the [`ModelFactory`] runs the search and keeps a
//!   full auditable report.
//!
//! ## Quick Start
//!
//! ```no_run
//! use laptop_pricer::{DataFrame, DatasetSchema, ModelCatalog, TrainingPipeline};
//!
//! # fn run(train: DataFrame, validation: DataFrame) -> laptop_pricer::Result<()> {
//! let schema = DatasetSchema::from_yaml_file("config/schema.yaml")?;
//! let catalog = ModelCatalog::from_yaml_file("config/model.yaml")?;
//!
//! let pipeline = TrainingPipeline::new(schema, catalog, "workspace")
//!     .with_expected_score(0.6);
//! let outcome = pipeline.run(&train, &validation)?;
//! println!("best model: {} (promoted: {})", outcome.best_name, outcome.promoted);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - `frame` — named heterogeneous columns, the pre-matrix tabular currency
//! - `schema` — declared column sets and validation reports
//! - `features` — spec-string parsing and mean-target encoding
//! - `preprocessing` — standard scaling and the encoder+scaler pipeline
//! - `models` — the `Regressor` interface, four algorithms, the registry
//! - `selection` — grids, k-fold CV, search strategies, metrics, factory
//! - `estimator` — the deployable inference bundle
//! - `pipeline` — training orchestration, artifact dirs, production store
//! - `config` — the YAML model catalog

pub mod config;
pub mod error;
pub mod estimator;
pub mod features;
pub mod frame;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod schema;
pub mod selection;

pub use config::{CandidateSpec, ModelCatalog};
pub use error::{PricerError, Result};
pub use estimator::PriceEstimator;
pub use features::{FittedMeanEncoder, MeanEncoder, SpecFeaturizer};
pub use frame::{Column, DataFrame};
pub use models::Regressor;
pub use pipeline::{ArtifactLayout, ProductionStore, TrainingOutcome, TrainingPipeline};
pub use preprocessing::{FittedPreprocessor, Preprocessor};
pub use schema::{DatasetSchema, SchemaReport};
pub use selection::{KFold, ModelFactory, RegressionReport, SearchConfig, SearchStrategy};

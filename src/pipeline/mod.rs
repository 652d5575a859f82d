//! Training-run orchestration and artifact management.

pub mod artifacts;
pub mod training;

pub use artifacts::{ArtifactLayout, ProductionStore};
pub use training::{TrainingOutcome, TrainingPipeline};

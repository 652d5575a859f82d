//! The declarative model catalog.
//!
//! A catalog lists every candidate algorithm the factory will tune (its
//! registry identifier, default constructor parameters, and hyperparameter
//! search grid) plus the shared search-strategy settings. Catalogs are
//! written in YAML:
//!
//! ```yaml
//! search:
//!   strategy: grid
//!   cv: 3
//! candidates:
//!   - name: Ridge
//!     algorithm: ridge
//!     search_grid:
//!       alpha: [0.01, 0.1, 1.0, 10.0]
//!   - name: RandomForest
//!     algorithm: random_forest
//!     params:
//!       random_state: 42
//!     search_grid:
//!       n_estimators: [50, 100]
//!       max_depth: [6, 10]
//! ```
//!
//! Candidate order matters: the factory's tie-break keeps the first
//! candidate to reach the best score.

use crate::error::{PricerError, Result};
use crate::models::registry::KNOWN_ALGORITHMS;
use crate::selection::params::{ParamGrid, ParamSet};
use crate::selection::search::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One candidate algorithm in the catalog.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CandidateSpec {
    /// Report key for this candidate. Unique within a catalog.
    pub name: String,
    /// Registry identifier of the algorithm to instantiate.
    pub algorithm: String,
    /// Constructor defaults applied before any grid assignment.
    #[serde(default)]
    pub params: ParamSet,
    /// Hyperparameter search space. Empty means "tune once with defaults".
    #[serde(default)]
    pub search_grid: ParamGrid,
}

/// The full candidate list plus search settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelCatalog {
    /// Search-strategy settings shared by every candidate.
    #[serde(default)]
    pub search: SearchConfig,
    /// Ordered candidate list.
    pub candidates: Vec<CandidateSpec>,
}

impl ModelCatalog {
    /// Parse and validate a catalog from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let catalog: ModelCatalog = serde_yaml::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load and validate a catalog from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Check candidate names and algorithm identifiers.
    pub fn validate(&self) -> Result<()> {
        if self.candidates.is_empty() {
            return Err(PricerError::Config(
                "model catalog has no candidates".to_string(),
            ));
        }
        for (i, candidate) in self.candidates.iter().enumerate() {
            if !KNOWN_ALGORITHMS.contains(&candidate.algorithm.as_str()) {
                return Err(PricerError::Config(format!(
                    "candidate '{}' names unknown algorithm '{}'",
                    candidate.name, candidate.algorithm
                )));
            }
            if self.candidates[..i].iter().any(|c| c.name == candidate.name) {
                return Err(PricerError::Config(format!(
                    "duplicate candidate name '{}'",
                    candidate.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::params::ParamValue;
    use crate::selection::search::SearchStrategy;

    const CATALOG_YAML: &str = r#"
search:
  strategy: grid
  cv: 3
candidates:
  - name: Ridge
    algorithm: ridge
    search_grid:
      alpha: [0.1, 1.0]
  - name: Forest
    algorithm: random_forest
    params:
      random_state: 42
    search_grid:
      n_estimators: [10, 20]
"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = ModelCatalog::from_yaml_str(CATALOG_YAML).unwrap();
        assert_eq!(catalog.search.strategy, SearchStrategy::Grid);
        assert_eq!(catalog.candidates.len(), 2);
        assert_eq!(catalog.candidates[0].name, "Ridge");
        assert_eq!(
            catalog.candidates[1].params["random_state"],
            ParamValue::Int(42)
        );
        assert_eq!(catalog.candidates[1].search_grid["n_estimators"].len(), 2);
    }

    #[test]
    fn test_missing_search_section_uses_defaults() {
        let text = "candidates:\n  - name: Tree\n    algorithm: decision_tree\n";
        let catalog = ModelCatalog::from_yaml_str(text).unwrap();
        assert_eq!(catalog.search.cv, 3);
        assert_eq!(catalog.search.strategy, SearchStrategy::Grid);
    }

    #[test]
    fn test_empty_candidate_list_rejected() {
        let text = "candidates: []\n";
        assert!(matches!(
            ModelCatalog::from_yaml_str(text),
            Err(PricerError::Config(_))
        ));
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let text = "candidates:\n  - name: X\n    algorithm: quantum_annealer\n";
        assert!(matches!(
            ModelCatalog::from_yaml_str(text),
            Err(PricerError::Config(_))
        ));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let text = "candidates:\n  - name: A\n    algorithm: ridge\n  - name: A\n    algorithm: knn\n";
        assert!(matches!(
            ModelCatalog::from_yaml_str(text),
            Err(PricerError::Config(_))
        ));
    }
}

//! The model factory: tune every catalog candidate, score it on the
//! held-out split, and select the best performer.

use crate::config::ModelCatalog;
use crate::error::{PricerError, Result};
use crate::models::Regressor;
use crate::selection::metrics::RegressionReport;
use crate::selection::params::ParamSet;
use crate::selection::search::{self, TunedFit};
use log::info;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Everything recorded about one tuned candidate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TunedModelRecord {
    /// Registry identifier of the underlying algorithm.
    pub algorithm: String,
    /// Winning hyperparameters (defaults merged with the grid choice).
    pub best_params: ParamSet,
    /// Mean cross-validated r2 of the winning configuration.
    pub cv_score: f64,
    /// r2 of the refit model on the full training split.
    pub train_score: f64,
    /// Metric triple on the training split.
    pub train_metrics: RegressionReport,
    /// Metric triple on the held-out split.
    pub test_metrics: RegressionReport,
}

/// The selected winner: its report entry plus the fitted model itself,
/// exclusively owned by this value.
pub struct BestModel {
    /// Candidate name from the catalog.
    pub name: String,
    /// The winner's report entry.
    pub record: TunedModelRecord,
    /// The fitted model, ready for bundling.
    pub model: Box<dyn Regressor>,
}

/// Tunes every candidate in a [`ModelCatalog`] and compares them on a
/// fixed held-out split.
///
/// Call [`run`](Self::run) before [`best_model`](Self::best_model);
/// requesting the best model from an empty report is a caller error.
pub struct ModelFactory {
    catalog: ModelCatalog,
    report: Vec<(String, TunedModelRecord)>,
    fitted: BTreeMap<String, Box<dyn Regressor>>,
}

impl ModelFactory {
    /// Create a factory over a validated catalog.
    pub fn new(catalog: ModelCatalog) -> Self {
        Self {
            catalog,
            report: Vec::new(),
            fitted: BTreeMap::new(),
        }
    }

    /// Tune and evaluate every candidate, in catalog order.
    ///
    /// Any prior report is cleared first; each candidate is tuned on the
    /// training split and scored on both splits.
    pub fn run(
        &mut self,
        x_train: &Array2<f64>,
        y_train: &Array1<f64>,
        x_test: &Array2<f64>,
        y_test: &Array1<f64>,
    ) -> Result<()> {
        self.report.clear();
        self.fitted.clear();

        let candidates = self.catalog.candidates.clone();
        for candidate in &candidates {
            info!("tuning candidate '{}'", candidate.name);
            let TunedFit {
                best_params,
                cv_score,
                model,
            } = search::tune(
                &candidate.algorithm,
                &candidate.params,
                &candidate.search_grid,
                x_train,
                y_train,
                &self.catalog.search,
            )?;

            let train_pred = model.predict(x_train)?;
            let test_pred = model.predict(x_test)?;
            let train_metrics =
                RegressionReport::evaluate(&y_train.to_vec(), &train_pred.to_vec());
            let test_metrics = RegressionReport::evaluate(&y_test.to_vec(), &test_pred.to_vec());
            info!(
                "candidate '{}': train r2 {:.4}, test r2 {:.4}",
                candidate.name, train_metrics.r2_score, test_metrics.r2_score
            );

            self.report.push((
                candidate.name.clone(),
                TunedModelRecord {
                    algorithm: candidate.algorithm.clone(),
                    best_params,
                    cv_score,
                    train_score: train_metrics.r2_score,
                    train_metrics,
                    test_metrics,
                },
            ));
            self.fitted.insert(candidate.name.clone(), model);
        }
        Ok(())
    }

    /// The full tuning report, in candidate order.
    pub fn report(&self) -> &[(String, TunedModelRecord)] {
        &self.report
    }

    /// Persist the full report (every candidate, not just the winner) as
    /// YAML for auditability.
    pub fn save_report<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let keyed: BTreeMap<&str, &TunedModelRecord> = self
            .report
            .iter()
            .map(|(name, record)| (name.as_str(), record))
            .collect();
        let text = serde_yaml::to_string(&keyed)?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Select the candidate with the highest held-out r2.
    ///
    /// Strict `>` comparison: an exact tie keeps the earlier candidate.
    /// The winning model is moved out of the factory.
    ///
    /// # Errors
    /// [`PricerError::TuningPrecondition`] if [`run`](Self::run) has not
    /// produced a report yet.
    pub fn best_model(&mut self) -> Result<BestModel> {
        if self.report.is_empty() {
            return Err(PricerError::TuningPrecondition(
                "tuned model report is empty; run the factory first".to_string(),
            ));
        }

        let mut best: Option<(usize, f64)> = None;
        for (i, (_, record)) in self.report.iter().enumerate() {
            let score = record.test_metrics.r2_score;
            let improved = match best {
                Some((_, best_score)) => score > best_score,
                None => true,
            };
            if improved {
                best = Some((i, score));
            }
        }

        let (index, score) = best.ok_or_else(|| {
            PricerError::TuningPrecondition("no candidate in tuned model report".to_string())
        })?;
        let (name, record) = self.report[index].clone();
        let model = self.fitted.remove(&name).ok_or_else(|| {
            PricerError::TuningPrecondition(format!(
                "fitted model for '{}' already taken; rerun the factory",
                name
            ))
        })?;
        info!("best model '{}' with test r2 {:.4}", name, score);

        Ok(BestModel {
            name,
            record,
            model,
        })
    }
}

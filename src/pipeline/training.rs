//! End-to-end training orchestration.
//!
//! One [`TrainingPipeline::run`] call takes a training and a validation
//! frame through the whole offline flow: schema validation, feature
//! engineering, preprocessing, model tuning and selection, the acceptance
//! gate, bundling, and (when the new bundle beats production) promotion.

use crate::config::ModelCatalog;
use crate::error::{PricerError, Result};
use crate::estimator::PriceEstimator;
use crate::features::SpecFeaturizer;
use crate::frame::DataFrame;
use crate::pipeline::artifacts::{ArtifactLayout, ProductionStore};
use crate::preprocessing::Preprocessor;
use crate::schema::DatasetSchema;
use crate::selection::factory::{ModelFactory, TunedModelRecord};
use crate::selection::metrics::r2_score;
use log::info;
use ndarray::Array1;
use std::path::{Path, PathBuf};

/// What one training run produced.
#[derive(Debug)]
pub struct TrainingOutcome {
    /// Catalog name of the selected candidate.
    pub best_name: String,
    /// The winner's full report entry.
    pub record: TunedModelRecord,
    /// Where the all-candidates tuning report was written.
    pub report_path: PathBuf,
    /// Where this run's estimator bundle was written.
    pub estimator_path: PathBuf,
    /// Whether the bundle was promoted to production.
    pub promoted: bool,
    /// Production version assigned on promotion.
    pub production_version: Option<u64>,
}

/// The offline training pipeline.
///
/// Sequential by design: tuning a grid blocks until complete. Each run
/// writes under its own timestamped artifact directory, so runs never race
/// on paths; the only shared resource is the production store, which
/// swaps atomically.
pub struct TrainingPipeline {
    schema: DatasetSchema,
    catalog: ModelCatalog,
    expected_score: f64,
    artifact_root: PathBuf,
    production_dir: PathBuf,
}

impl TrainingPipeline {
    /// Create a pipeline writing under `workspace/artifact/<timestamp>`
    /// with the production store at `workspace/production`.
    pub fn new<P: AsRef<Path>>(
        schema: DatasetSchema,
        catalog: ModelCatalog,
        workspace: P,
    ) -> Self {
        Self {
            schema,
            catalog,
            expected_score: 0.6,
            artifact_root: workspace.as_ref().join("artifact"),
            production_dir: workspace.as_ref().join("production"),
        }
    }

    /// Minimum held-out r2 a model must reach to be accepted.
    pub fn with_expected_score(mut self, expected_score: f64) -> Self {
        self.expected_score = expected_score;
        self
    }

    /// The production store this pipeline promotes into.
    pub fn production_store(&self) -> ProductionStore {
        ProductionStore::new(&self.production_dir)
    }

    /// Split a raw frame into features and its (strictly positive) target.
    fn split_target(&self, frame: &DataFrame, split: &str) -> Result<(DataFrame, Vec<f64>)> {
        let mut features = frame.clone();
        let target = match features.take_column(&self.schema.target_column) {
            Some(crate::frame::Column::Num(values)) => values,
            Some(crate::frame::Column::Str(_)) => {
                return Err(PricerError::ColumnKind {
                    column: self.schema.target_column.clone(),
                    expected: "numeric".to_string(),
                })
            }
            None => {
                return Err(PricerError::MissingColumn {
                    column: self.schema.target_column.clone(),
                    operation: format!("target extraction from {} data", split),
                })
            }
        };
        if let Some(bad) = target.iter().find(|v| **v <= 0.0) {
            return Err(PricerError::InvalidParameter(format!(
                "{} target contains non-positive price {}; log transform undefined",
                split, bad
            )));
        }
        Ok((features, target))
    }

    /// Run the full pipeline.
    pub fn run(&self, train: &DataFrame, validation: &DataFrame) -> Result<TrainingOutcome> {
        // Schema validation halts the run before any transformation.
        for (split, frame) in [("train", train), ("validation", validation)] {
            let report = self.schema.validate(frame);
            if !report.is_ok() {
                return Err(PricerError::SchemaMismatch {
                    split: split.to_string(),
                    detail: report.describe(),
                });
            }
        }
        info!("schema validation passed for train and validation data");

        let layout = ArtifactLayout::new(&self.artifact_root);
        layout.create()?;

        let (train_features, train_prices) = self.split_target(train, "train")?;
        let (val_features, val_prices) = self.split_target(validation, "validation")?;

        // The target is roughly log-normal; models fit the log-price.
        let y_train: Vec<f64> = train_prices.iter().map(|p| p.ln()).collect();
        let y_val: Vec<f64> = val_prices.iter().map(|p| p.ln()).collect();

        let featurizer = SpecFeaturizer::new(self.schema.drop_columns.clone());
        let engineered_train = featurizer.transform(&train_features)?;
        let engineered_val = featurizer.transform(&val_features)?;
        info!(
            "feature engineering produced {} columns",
            engineered_train.n_cols()
        );

        let preprocessor = Preprocessor::new().fit(&engineered_train, &y_train)?;
        let x_train = preprocessor.transform(&engineered_train)?;
        let x_val = preprocessor.transform(&engineered_val)?;

        let mut factory = ModelFactory::new(self.catalog.clone());
        factory.run(
            &x_train,
            &Array1::from_vec(y_train.clone()),
            &x_val,
            &Array1::from_vec(y_val.clone()),
        )?;
        let report_path = layout.report_path();
        factory.save_report(&report_path)?;

        let best = factory.best_model()?;
        if best.record.test_metrics.r2_score < self.expected_score {
            return Err(PricerError::ModelRejected {
                score: best.record.test_metrics.r2_score,
                expected: self.expected_score,
            });
        }

        let estimator = PriceEstimator::new(featurizer, preprocessor, best.model);
        let estimator_path = layout.estimator_path();
        estimator.save_to_file(&estimator_path)?;

        // Promote only a strict improvement over the production bundle,
        // both scored end-to-end on the raw validation features.
        let store = self.production_store();
        let production_score = match store.load_current()? {
            Some(production) => {
                let preds = production.predict(&val_features, false)?;
                r2_score(&y_val, &preds)
            }
            None => 0.0,
        };
        let new_preds = estimator.predict(&val_features, false)?;
        let new_score = r2_score(&y_val, &new_preds);
        info!(
            "candidate bundle r2 {:.4} vs production {:.4}",
            new_score, production_score
        );

        let promoted = new_score > production_score;
        let production_version = if promoted {
            Some(store.promote(&estimator)?)
        } else {
            None
        };

        Ok(TrainingOutcome {
            best_name: best.name,
            record: best.record,
            report_path,
            estimator_path,
            promoted,
            production_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::DataFrame;

    fn laptop_schema() -> DatasetSchema {
        DatasetSchema {
            target_column: "Price".to_string(),
            drop_columns: vec!["Product".to_string()],
            numerical_columns: vec!["Inches".to_string(), "Price".to_string()],
            categorical_columns: vec![
                "Product".to_string(),
                "ScreenResolution".to_string(),
                "Cpu".to_string(),
                "Ram".to_string(),
                "Memory".to_string(),
                "Gpu".to_string(),
                "OpSys".to_string(),
                "Weight".to_string(),
            ],
        }
    }

    fn catalog() -> ModelCatalog {
        ModelCatalog::from_yaml_str(
            r#"
search:
  strategy: grid
  cv: 3
candidates:
  - name: Ridge
    algorithm: ridge
    search_grid:
      alpha: [0.000001, 1.0]
  - name: Tree
    algorithm: decision_tree
    search_grid:
      max_depth: [3, 5]
"#,
        )
        .unwrap()
    }

    /// Synthetic laptops whose price is a clean function of RAM, storage
    /// and CPU tier, so the models have real signal to find.
    fn laptop_frame(n: usize, offset: usize) -> DataFrame {
        let rams = [4u32, 8, 8, 16, 16, 32];
        let cpus = [
            ("Intel Core i3 6006U 2GHz", 0.0),
            ("Intel Core i5 7200U 2.5GHz", 1.0),
            ("Intel Core i7 8550U 1.8GHz", 2.0),
            ("AMD A9-Series 9420 3GHz", 0.5),
        ];
        let screens = [
            "Full HD 1920x1080",
            "IPS Panel Full HD 1920x1080",
            "IPS Panel Touchscreen 2560x1440",
        ];
        let storages = [("128GB SSD", 1.0), ("1TB HDD", 0.3), ("256GB SSD + 1TB HDD", 1.5)];
        let oses = ["Windows 10", "Linux", "macOS"];
        let gpus = ["Intel HD Graphics 620", "Nvidia GeForce GTX 1050", "AMD Radeon R5"];

        let mut product = Vec::new();
        let mut inches = Vec::new();
        let mut screen = Vec::new();
        let mut cpu = Vec::new();
        let mut ram = Vec::new();
        let mut memory = Vec::new();
        let mut gpu = Vec::new();
        let mut os = Vec::new();
        let mut weight = Vec::new();
        let mut price = Vec::new();

        for i in offset..offset + n {
            let ram_gb = rams[i % rams.len()];
            let (cpu_desc, cpu_tier) = cpus[i % cpus.len()];
            let (storage, storage_factor) = storages[i % storages.len()];

            product.push(format!("Laptop {}", i));
            inches.push(13.3 + (i % 3) as f64);
            screen.push(screens[i % screens.len()].to_string());
            cpu.push(cpu_desc.to_string());
            ram.push(format!("{}GB", ram_gb));
            memory.push(storage.to_string());
            gpu.push(gpus[i % gpus.len()].to_string());
            os.push(oses[i % oses.len()].to_string());
            weight.push(format!("{:.2}kg", 1.2 + (i % 5) as f64 * 0.3));

            price.push(
                18000.0
                    + 2500.0 * f64::from(ram_gb)
                    + 15000.0 * cpu_tier
                    + 12000.0 * storage_factor,
            );
        }

        let mut df = DataFrame::new();
        df.set_str("Product", product).unwrap();
        df.set_num("Inches", inches).unwrap();
        df.set_str("ScreenResolution", screen).unwrap();
        df.set_str("Cpu", cpu).unwrap();
        df.set_str("Ram", ram).unwrap();
        df.set_str("Memory", memory).unwrap();
        df.set_str("Gpu", gpu).unwrap();
        df.set_str("OpSys", os).unwrap();
        df.set_str("Weight", weight).unwrap();
        df.set_num("Price", price).unwrap();
        df
    }

    #[test]
    fn test_full_run_trains_and_promotes() {
        let workspace = tempfile::tempdir().unwrap();
        let pipeline = TrainingPipeline::new(laptop_schema(), catalog(), workspace.path())
            .with_expected_score(0.5);

        let outcome = pipeline
            .run(&laptop_frame(36, 0), &laptop_frame(12, 36))
            .unwrap();

        assert!(outcome.promoted);
        assert_eq!(outcome.production_version, Some(1));
        assert!(outcome.report_path.exists());
        assert!(outcome.estimator_path.exists());
        assert!(outcome.record.test_metrics.r2_score > 0.5);

        // The promoted bundle serves predictions end-to-end.
        let production = pipeline.production_store().load_current().unwrap().unwrap();
        let mut probe = laptop_frame(2, 48);
        probe.take_column("Price");
        let prices = production.predict(&probe, true).unwrap();
        assert_eq!(prices.len(), 2);
        for price in prices {
            assert!(price > 0.0);
        }
    }

    #[test]
    fn test_second_identical_run_is_not_promoted() {
        let workspace = tempfile::tempdir().unwrap();
        let pipeline = TrainingPipeline::new(laptop_schema(), catalog(), workspace.path())
            .with_expected_score(0.5);

        let train = laptop_frame(36, 0);
        let validation = laptop_frame(12, 36);
        let first = pipeline.run(&train, &validation).unwrap();
        assert!(first.promoted);

        // Identical data, deterministic search: the score ties, and a tie
        // must not overwrite production.
        let second = pipeline.run(&train, &validation).unwrap();
        assert!(!second.promoted);
        assert_eq!(second.production_version, None);
        assert_eq!(
            pipeline.production_store().current_version().unwrap(),
            Some(1)
        );
    }

    #[test]
    fn test_schema_mismatch_halts_before_training() {
        let workspace = tempfile::tempdir().unwrap();
        let pipeline = TrainingPipeline::new(laptop_schema(), catalog(), workspace.path());

        let mut bad_train = laptop_frame(36, 0);
        bad_train.take_column("Gpu");
        let result = pipeline.run(&bad_train, &laptop_frame(12, 36));
        assert!(matches!(
            result,
            Err(PricerError::SchemaMismatch { ref split, .. }) if split == "train"
        ));
    }

    #[test]
    fn test_acceptance_gate_rejects_weak_model() {
        let workspace = tempfile::tempdir().unwrap();
        // An unreachable bar: even a perfect model scores 1.0.
        let pipeline = TrainingPipeline::new(laptop_schema(), catalog(), workspace.path())
            .with_expected_score(1.1);

        let result = pipeline.run(&laptop_frame(36, 0), &laptop_frame(12, 36));
        assert!(matches!(result, Err(PricerError::ModelRejected { .. })));
        // Nothing promoted.
        assert_eq!(
            pipeline.production_store().current_version().unwrap(),
            None
        );
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let workspace = tempfile::tempdir().unwrap();
        let pipeline = TrainingPipeline::new(laptop_schema(), catalog(), workspace.path());

        let mut train = laptop_frame(36, 0);
        let mut prices = train.num("Price").unwrap().to_vec();
        prices[0] = 0.0;
        train.set_num("Price", prices).unwrap();

        let result = pipeline.run(&train, &laptop_frame(12, 36));
        assert!(matches!(result, Err(PricerError::InvalidParameter(_))));
    }
}

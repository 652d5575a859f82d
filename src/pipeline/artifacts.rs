//! Artifact directories and the versioned production store.
//!
//! Every training run writes under a fresh timestamped directory, so
//! concurrent or repeated runs never race on the same paths. Promotion
//! goes through a versioned store with an atomically-swapped pointer file:
//! a crash mid-promotion leaves the previous version serving, never a
//! half-written bundle.

use crate::error::{PricerError, Result};
use crate::estimator::PriceEstimator;
use chrono::Local;
use log::info;
use std::path::{Path, PathBuf};

/// Paths for one training run's artifacts.
#[derive(Clone, Debug)]
pub struct ArtifactLayout {
    run_dir: PathBuf,
}

impl ArtifactLayout {
    /// Create a layout rooted at `root/<timestamp>`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let stamp = Local::now().format("%m_%d_%Y_%H_%M_%S").to_string();
        Self {
            run_dir: root.as_ref().join(stamp),
        }
    }

    /// Use an explicit run directory instead of a timestamped one.
    pub fn at<P: AsRef<Path>>(run_dir: P) -> Self {
        Self {
            run_dir: run_dir.as_ref().to_path_buf(),
        }
    }

    /// This run's directory.
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Where the full tuning report is written.
    pub fn report_path(&self) -> PathBuf {
        self.run_dir.join("model_trainer").join("tuned_models.yaml")
    }

    /// Where the estimator bundle is written.
    pub fn estimator_path(&self) -> PathBuf {
        self.run_dir.join("model_trainer").join("estimator.bin")
    }

    /// Create the run directory tree.
    pub fn create(&self) -> Result<()> {
        std::fs::create_dir_all(self.run_dir.join("model_trainer"))?;
        Ok(())
    }
}

/// The production slot, redesigned as a versioned store.
///
/// Layout:
/// ```text
/// <dir>/versions/<n>/estimator.bin
/// <dir>/CURRENT            # contains "<n>", swapped atomically
/// ```
///
/// [`promote`](Self::promote) first writes the new version completely,
/// then renames a temp pointer over `CURRENT`. Readers following the
/// pointer therefore always see a fully-written bundle.
#[derive(Clone, Debug)]
pub struct ProductionStore {
    dir: PathBuf,
}

impl ProductionStore {
    /// Open (or designate) a store directory.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn pointer_path(&self) -> PathBuf {
        self.dir.join("CURRENT")
    }

    fn version_dir(&self, version: u64) -> PathBuf {
        self.dir.join("versions").join(version.to_string())
    }

    /// The currently-promoted version number, if any.
    pub fn current_version(&self) -> Result<Option<u64>> {
        let pointer = self.pointer_path();
        if !pointer.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&pointer)?;
        let version = text.trim().parse::<u64>().map_err(|_| {
            PricerError::Serialization(format!(
                "production pointer holds {:?}, expected a version number",
                text.trim()
            ))
        })?;
        Ok(Some(version))
    }

    /// Path of the currently-promoted bundle, if any.
    pub fn current_path(&self) -> Result<Option<PathBuf>> {
        Ok(self
            .current_version()?
            .map(|v| self.version_dir(v).join("estimator.bin")))
    }

    /// Load the production estimator, or `None` when nothing has been
    /// promoted yet.
    pub fn load_current(&self) -> Result<Option<PriceEstimator>> {
        match self.current_path()? {
            Some(path) => Ok(Some(PriceEstimator::load_from_file(path)?)),
            None => Ok(None),
        }
    }

    /// Promote a bundle: write it under the next version, then atomically
    /// repoint `CURRENT`. Returns the new version number.
    pub fn promote(&self, estimator: &PriceEstimator) -> Result<u64> {
        let version = self.current_version()?.map_or(1, |v| v + 1);
        let version_dir = self.version_dir(version);
        std::fs::create_dir_all(&version_dir)?;
        estimator.save_to_file(version_dir.join("estimator.bin"))?;

        // Write-then-rename keeps the pointer swap atomic on the same
        // filesystem.
        let tmp = self.dir.join("CURRENT.tmp");
        std::fs::write(&tmp, version.to_string())?;
        std::fs::rename(&tmp, self.pointer_path())?;
        info!("promoted estimator to production version {}", version);
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::SpecFeaturizer;
    use crate::frame::DataFrame;
    use crate::models::{Regressor, RidgeRegression};
    use crate::preprocessing::Preprocessor;

    fn small_estimator(seed: f64) -> PriceEstimator {
        let mut df = DataFrame::new();
        df.set_num("a", vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        df.set_str(
            "b",
            vec![
                "x".to_string(),
                "y".to_string(),
                "x".to_string(),
                "y".to_string(),
            ],
        )
        .unwrap();
        let y = [1.0 + seed, 2.0, 3.0, 4.0];

        let preprocessor = Preprocessor::new().fit(&df, &y).unwrap();
        let matrix = preprocessor.transform(&df).unwrap();
        let mut model = RidgeRegression::new();
        model
            .fit(&matrix, &ndarray::Array1::from_vec(y.to_vec()))
            .unwrap();
        // A featurizer with no drop list; these frames are pre-engineered.
        PriceEstimator::new(SpecFeaturizer::new(Vec::new()), preprocessor, Box::new(model))
    }

    #[test]
    fn test_layout_paths_under_run_dir() {
        let layout = ArtifactLayout::at("/tmp/run_x");
        assert!(layout.report_path().starts_with("/tmp/run_x"));
        assert!(layout.estimator_path().starts_with("/tmp/run_x"));
    }

    #[test]
    fn test_layout_create() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        layout.create().unwrap();
        assert!(layout.run_dir().exists());
    }

    #[test]
    fn test_empty_store_has_no_current() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProductionStore::new(dir.path());
        assert_eq!(store.current_version().unwrap(), None);
        assert!(store.load_current().unwrap().is_none());
    }

    #[test]
    fn test_promote_assigns_increasing_versions() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProductionStore::new(dir.path());

        let v1 = store.promote(&small_estimator(0.0)).unwrap();
        let v2 = store.promote(&small_estimator(1.0)).unwrap();
        assert_eq!(v1, 1);
        assert_eq!(v2, 2);
        assert_eq!(store.current_version().unwrap(), Some(2));
    }

    #[test]
    fn test_old_versions_survive_promotion() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProductionStore::new(dir.path());
        store.promote(&small_estimator(0.0)).unwrap();
        store.promote(&small_estimator(1.0)).unwrap();

        assert!(dir
            .path()
            .join("versions")
            .join("1")
            .join("estimator.bin")
            .exists());
    }

    #[test]
    fn test_corrupt_pointer_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProductionStore::new(dir.path());
        std::fs::write(dir.path().join("CURRENT"), "not-a-number").unwrap();
        assert!(store.current_version().is_err());
    }
}

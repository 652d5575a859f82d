//! Mean-of-target encoding for categorical columns.
//!
//! Each categorical value is replaced with the arithmetic mean of the
//! target variable observed for that category during fitting. Categories
//! unseen at transform time fall back to the unweighted mean of the
//! column's category means: "an average category", not "an average
//! observation". A standalone transformer, reusable outside this pipeline.

use crate::error::{PricerError, Result};
use crate::frame::{Column, DataFrame};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Learned encoding for one categorical column.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncodingMap {
    /// Mean target value per observed category.
    pub means: BTreeMap<String, f64>,
    /// Substitute for categories unseen during fitting: the unweighted
    /// mean of all category means.
    pub fallback: f64,
}

/// Unfitted mean-target encoder.
///
/// With no explicit column list, every string column of the fitting frame
/// is treated as categorical.
#[derive(Clone, Debug, Default)]
pub struct MeanEncoder {
    columns: Option<Vec<String>>,
}

impl MeanEncoder {
    /// Create an encoder that auto-detects categorical columns.
    pub fn new() -> Self {
        Self { columns: None }
    }

    /// Restrict encoding to an explicit set of columns.
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Learn per-category target means from the fitting data.
    ///
    /// # Errors
    /// [`PricerError::FeatureMismatch`] if `target` length differs from the
    /// frame's rows, [`PricerError::EmptyData`] for an empty frame, and
    /// column lookup errors for an explicit list naming absent or
    /// non-string columns.
    pub fn fit(&self, frame: &DataFrame, target: &[f64]) -> Result<FittedMeanEncoder> {
        if frame.n_rows() == 0 {
            return Err(PricerError::EmptyData(
                "cannot fit MeanEncoder on empty data".to_string(),
            ));
        }
        if target.len() != frame.n_rows() {
            return Err(PricerError::FeatureMismatch {
                expected_features: frame.n_rows(),
                got_features: target.len(),
            });
        }

        let columns = match &self.columns {
            Some(cols) => cols.clone(),
            None => frame.string_column_names(),
        };

        let mut maps = BTreeMap::new();
        for name in &columns {
            let values = frame.strs(name)?;
            let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
            for (value, &y) in values.iter().zip(target.iter()) {
                let entry = sums.entry(value.as_str()).or_insert((0.0, 0));
                entry.0 += y;
                entry.1 += 1;
            }
            let means: BTreeMap<String, f64> = sums
                .into_iter()
                .map(|(cat, (sum, count))| (cat.to_string(), sum / count as f64))
                .collect();
            let fallback = means.values().sum::<f64>() / means.len() as f64;
            maps.insert(name.clone(), EncodingMap { means, fallback });
        }

        Ok(FittedMeanEncoder { maps })
    }

    /// Fit and transform in one step.
    pub fn fit_transform(&self, frame: &DataFrame, target: &[f64]) -> Result<DataFrame> {
        let fitted = self.fit(frame, target)?;
        fitted.transform(frame)
    }
}

/// Fitted mean-target encoder holding one [`EncodingMap`] per column.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FittedMeanEncoder {
    maps: BTreeMap<String, EncodingMap>,
}

impl FittedMeanEncoder {
    /// Columns this encoder rewrites.
    pub fn encoded_columns(&self) -> Vec<&str> {
        self.maps.keys().map(|k| k.as_str()).collect()
    }

    /// Learned encoding for one column, if it was fitted.
    pub fn encoding(&self, column: &str) -> Option<&EncodingMap> {
        self.maps.get(column)
    }

    /// Replace each encoded column's values with the learned means.
    ///
    /// Columns absent from the frame are skipped; unseen categories are
    /// substituted with the fallback mean. A fitted column that arrives
    /// numeric (e.g. zero-filled upstream) carries no category information
    /// and is mapped entirely to the fallback.
    pub fn transform(&self, frame: &DataFrame) -> Result<DataFrame> {
        let mut out = frame.clone();
        for (name, map) in &self.maps {
            match out.column(name) {
                Some(Column::Str(values)) => {
                    let encoded: Vec<f64> = values
                        .iter()
                        .map(|v| match map.means.get(v) {
                            Some(&mean) => mean,
                            None => {
                                warn!(
                                    "unseen category {:?} in column '{}', using fallback mean",
                                    v, name
                                );
                                map.fallback
                            }
                        })
                        .collect();
                    out.set_num(name, encoded)?;
                }
                Some(Column::Num(values)) => {
                    warn!(
                        "encoded column '{}' arrived numeric, substituting fallback mean",
                        name
                    );
                    let fallback = vec![map.fallback; values.len()];
                    out.set_num(name, fallback)?;
                }
                None => {}
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category_frame() -> DataFrame {
        let mut df = DataFrame::new();
        df.set_str(
            "brand",
            vec![
                "A".to_string(),
                "A".to_string(),
                "B".to_string(),
                "B".to_string(),
            ],
        )
        .unwrap();
        df.set_num("size", vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        df
    }

    #[test]
    fn test_fit_learns_category_means() {
        let df = category_frame();
        let y = [10.0, 10.0, 20.0, 20.0];
        let fitted = MeanEncoder::new().fit(&df, &y).unwrap();

        let map = fitted.encoding("brand").unwrap();
        assert_eq!(map.means["A"], 10.0);
        assert_eq!(map.means["B"], 20.0);
    }

    #[test]
    fn test_unseen_category_maps_to_mean_of_means() {
        // A: mean 10, B: mean 20 with uneven counts so the global
        // observation mean differs from the mean of means.
        let mut df = DataFrame::new();
        df.set_str(
            "brand",
            vec![
                "A".to_string(),
                "A".to_string(),
                "A".to_string(),
                "B".to_string(),
            ],
        )
        .unwrap();
        let y = [10.0, 10.0, 10.0, 20.0];
        let fitted = MeanEncoder::new().fit(&df, &y).unwrap();

        // Global observation mean is 12.5; mean of means is 15.
        let mut unseen = DataFrame::new();
        unseen.set_str("brand", vec!["C".to_string()]).unwrap();
        let out = fitted.transform(&unseen).unwrap();
        assert_eq!(out.num("brand").unwrap(), &[15.0]);
    }

    #[test]
    fn test_transform_replaces_seen_categories() {
        let df = category_frame();
        let y = [10.0, 10.0, 20.0, 20.0];
        let out = MeanEncoder::new().fit_transform(&df, &y).unwrap();
        assert_eq!(out.num("brand").unwrap(), &[10.0, 10.0, 20.0, 20.0]);
        // Numeric columns untouched.
        assert_eq!(out.num("size").unwrap(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_single_category_column() {
        let mut df = DataFrame::new();
        df.set_str("os", vec!["mac".to_string(), "mac".to_string()])
            .unwrap();
        let fitted = MeanEncoder::new().fit(&df, &[4.0, 6.0]).unwrap();

        let mut probe = DataFrame::new();
        probe
            .set_str("os", vec!["mac".to_string(), "windows".to_string()])
            .unwrap();
        let out = fitted.transform(&probe).unwrap();
        // Everything, including the unseen value, maps to the single mean.
        assert_eq!(out.num("os").unwrap(), &[5.0, 5.0]);
    }

    #[test]
    fn test_explicit_column_list() {
        let mut df = DataFrame::new();
        df.set_str("a", vec!["x".to_string()]).unwrap();
        df.set_str("b", vec!["y".to_string()]).unwrap();
        let fitted = MeanEncoder::new()
            .with_columns(vec!["a".to_string()])
            .fit(&df, &[1.0])
            .unwrap();
        assert_eq!(fitted.encoded_columns(), vec!["a"]);

        let out = fitted.transform(&df).unwrap();
        assert!(out.column("a").unwrap().is_numeric());
        assert!(!out.column("b").unwrap().is_numeric());
    }

    #[test]
    fn test_numeric_column_substituted_with_fallback() {
        let df = category_frame();
        let y = [10.0, 10.0, 20.0, 20.0];
        let fitted = MeanEncoder::new().fit(&df, &y).unwrap();

        // Upstream zero-fill produced a numeric column where a categorical
        // was expected: every row gets the fallback mean.
        let mut probe = DataFrame::new();
        probe.set_num("brand", vec![0.0, 0.0]).unwrap();
        let out = fitted.transform(&probe).unwrap();
        assert_eq!(out.num("brand").unwrap(), &[15.0, 15.0]);
    }

    #[test]
    fn test_fit_target_length_mismatch() {
        let df = category_frame();
        let result = MeanEncoder::new().fit(&df, &[1.0]);
        assert!(matches!(
            result,
            Err(PricerError::FeatureMismatch { .. })
        ));
    }

    #[test]
    fn test_fit_empty_frame() {
        let result = MeanEncoder::new().fit(&DataFrame::new(), &[]);
        assert!(matches!(result, Err(PricerError::EmptyData(_))));
    }

    #[test]
    fn test_serialization_round_trip() {
        let df = category_frame();
        let y = [10.0, 10.0, 20.0, 20.0];
        let fitted = MeanEncoder::new().fit(&df, &y).unwrap();

        let bytes = bincode::serialize(&fitted).unwrap();
        let restored: FittedMeanEncoder = bincode::deserialize(&bytes).unwrap();

        let a = fitted.transform(&df).unwrap();
        let b = restored.transform(&df).unwrap();
        assert_eq!(a.num("brand").unwrap(), b.num("brand").unwrap());
    }
}

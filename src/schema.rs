//! Dataset schema and column validation.
//!
//! The schema declares what a raw laptop-spec table must look like before
//! the pipeline will touch it: which columns to drop outright, which must
//! be numeric, which must be categorical, and which one is the target.
//! Validation produces a plain [`SchemaReport`] value the caller branches
//! on; turning a bad report into an error is the pipeline's decision, not
//! the validator's.

use crate::error::Result;
use crate::frame::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Declared column layout of the raw dataset.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatasetSchema {
    /// Name of the target column (the price).
    pub target_column: String,
    /// Columns dropped unconditionally before feature engineering
    /// (identifiers and model names with no predictive value).
    #[serde(default)]
    pub drop_columns: Vec<String>,
    /// Column names expected to be numeric in the raw data.
    pub numerical_columns: Vec<String>,
    /// Column names expected to be string-typed in the raw data.
    pub categorical_columns: Vec<String>,
}

impl DatasetSchema {
    /// Parse a schema from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a schema from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Compare a frame's observed column sets against the declared ones.
    ///
    /// Both directions are checked: a declared column that is absent and an
    /// observed column that was never declared are each violations.
    pub fn validate(&self, frame: &DataFrame) -> SchemaReport {
        let observed_num = frame.numeric_column_names();
        let observed_cat = frame.string_column_names();

        let missing_numerical = self
            .numerical_columns
            .iter()
            .filter(|c| !observed_num.contains(c))
            .cloned()
            .collect();
        let extra_numerical = observed_num
            .iter()
            .filter(|c| !self.numerical_columns.contains(c))
            .cloned()
            .collect();
        let missing_categorical = self
            .categorical_columns
            .iter()
            .filter(|c| !observed_cat.contains(c))
            .cloned()
            .collect();
        let extra_categorical = observed_cat
            .iter()
            .filter(|c| !self.categorical_columns.contains(c))
            .cloned()
            .collect();

        SchemaReport {
            missing_numerical,
            extra_numerical,
            missing_categorical,
            extra_categorical,
        }
    }
}

/// Outcome of validating one frame against a [`DatasetSchema`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SchemaReport {
    /// Declared numeric columns absent from the frame.
    pub missing_numerical: Vec<String>,
    /// Observed numeric columns the schema never declared.
    pub extra_numerical: Vec<String>,
    /// Declared categorical columns absent from the frame.
    pub missing_categorical: Vec<String>,
    /// Observed categorical columns the schema never declared.
    pub extra_categorical: Vec<String>,
}

impl SchemaReport {
    /// True when the frame matches the schema exactly.
    pub fn is_ok(&self) -> bool {
        self.missing_numerical.is_empty()
            && self.extra_numerical.is_empty()
            && self.missing_categorical.is_empty()
            && self.extra_categorical.is_empty()
    }

    /// Human-readable summary of every violation.
    pub fn describe(&self) -> String {
        if self.is_ok() {
            return "all columns match the schema".to_string();
        }
        let mut parts = Vec::new();
        if !self.missing_numerical.is_empty() {
            parts.push(format!("missing numerical {:?}", self.missing_numerical));
        }
        if !self.extra_numerical.is_empty() {
            parts.push(format!("extra numerical {:?}", self.extra_numerical));
        }
        if !self.missing_categorical.is_empty() {
            parts.push(format!(
                "missing categorical {:?}",
                self.missing_categorical
            ));
        }
        if !self.extra_categorical.is_empty() {
            parts.push(format!("extra categorical {:?}", self.extra_categorical));
        }
        parts.join("; ")
    }
}

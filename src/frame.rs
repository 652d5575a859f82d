//! Named-column tabular data.
//!
//! [`DataFrame`] is the currency of the pipeline before features become a
//! numeric matrix: raw spec records arrive with string-typed hardware
//! fields, the feature engineer rewrites them into numeric columns, and the
//! preprocessor finally exports an [`ndarray::Array2`] for model consumption.
//!
//! Columns are ordered; order is preserved across inserts and replacements
//! so that a fitted preprocessor sees features in a stable layout.

use crate::error::{PricerError, Result};
use ndarray::Array2;

/// A single named column: either raw strings or numeric values.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    /// String-typed values (raw spec fields, engineered categoricals).
    Str(Vec<String>),
    /// Numeric values.
    Num(Vec<f64>),
}

impl Column {
    /// Number of rows in the column.
    pub fn len(&self) -> usize {
        match self {
            Column::Str(v) => v.len(),
            Column::Num(v) => v.len(),
        }
    }

    /// True if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True for [`Column::Num`].
    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Num(_))
    }
}

/// An ordered collection of named, equal-length columns.
#[derive(Clone, Debug, Default)]
pub struct DataFrame {
    columns: Vec<(String, Column)>,
}

impl DataFrame {
    /// Create an empty frame.
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Number of rows. Zero for an empty frame.
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |(_, c)| c.len())
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// True if the frame holds no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in layout order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// True if a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Insert a new column or replace an existing one in place.
    ///
    /// Replacement keeps the column's position; a new name is appended at
    /// the end. The row count must match the frame's existing rows.
    ///
    /// # Errors
    /// Returns [`PricerError::FeatureMismatch`] if the length differs from
    /// the frame's row count.
    pub fn set_column(&mut self, name: &str, column: Column) -> Result<()> {
        if !self.columns.is_empty() && column.len() != self.n_rows() {
            return Err(PricerError::FeatureMismatch {
                expected_features: self.n_rows(),
                got_features: column.len(),
            });
        }
        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = column,
            None => self.columns.push((name.to_string(), column)),
        }
        Ok(())
    }

    /// Shorthand for [`set_column`](Self::set_column) with numeric values.
    pub fn set_num(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        self.set_column(name, Column::Num(values))
    }

    /// Shorthand for [`set_column`](Self::set_column) with string values.
    pub fn set_str(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        self.set_column(name, Column::Str(values))
    }

    /// Borrow a numeric column.
    ///
    /// # Errors
    /// [`PricerError::MissingColumn`] if absent,
    /// [`PricerError::ColumnKind`] if the column holds strings.
    pub fn num(&self, name: &str) -> Result<&[f64]> {
        match self.column(name) {
            Some(Column::Num(v)) => Ok(v),
            Some(Column::Str(_)) => Err(PricerError::ColumnKind {
                column: name.to_string(),
                expected: "numeric".to_string(),
            }),
            None => Err(PricerError::MissingColumn {
                column: name.to_string(),
                operation: "numeric access".to_string(),
            }),
        }
    }

    /// Borrow a string column.
    ///
    /// # Errors
    /// [`PricerError::MissingColumn`] if absent,
    /// [`PricerError::ColumnKind`] if the column holds numbers.
    pub fn strs(&self, name: &str) -> Result<&[String]> {
        match self.column(name) {
            Some(Column::Str(v)) => Ok(v),
            Some(Column::Num(_)) => Err(PricerError::ColumnKind {
                column: name.to_string(),
                expected: "string".to_string(),
            }),
            None => Err(PricerError::MissingColumn {
                column: name.to_string(),
                operation: "string access".to_string(),
            }),
        }
    }

    /// Remove a column by name, returning it if present.
    pub fn take_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.columns.iter().position(|(n, _)| n == name)?;
        Some(self.columns.remove(idx).1)
    }

    /// Drop every listed column that exists; names without a matching
    /// column are ignored.
    pub fn drop_columns(&mut self, names: &[String]) {
        self.columns.retain(|(n, _)| !names.contains(n));
    }

    /// Build a new frame holding exactly `names`, in that order.
    ///
    /// # Errors
    /// [`PricerError::MissingColumn`] if any requested column is absent.
    pub fn select(&self, names: &[String]) -> Result<DataFrame> {
        let mut out = DataFrame::new();
        for name in names {
            let col = self.column(name).ok_or_else(|| PricerError::MissingColumn {
                column: name.clone(),
                operation: "column selection".to_string(),
            })?;
            out.set_column(name, col.clone())?;
        }
        Ok(out)
    }

    /// Names of all string columns, in layout order.
    pub fn string_column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|(_, c)| !c.is_numeric())
            .map(|(n, _)| n.clone())
            .collect()
    }

    /// Names of all numeric columns, in layout order.
    pub fn numeric_column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|(_, c)| c.is_numeric())
            .map(|(n, _)| n.clone())
            .collect()
    }

    /// Export the frame as an `(n_rows, n_cols)` matrix in column layout
    /// order.
    ///
    /// # Errors
    /// [`PricerError::ColumnKind`] if any string column remains,
    /// [`PricerError::EmptyData`] for a columnless frame.
    pub fn to_matrix(&self) -> Result<Array2<f64>> {
        if self.columns.is_empty() {
            return Err(PricerError::EmptyData(
                "cannot export an empty frame as a matrix".to_string(),
            ));
        }
        let n_rows = self.n_rows();
        let n_cols = self.n_cols();
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in 0..n_rows {
            for (name, col) in &self.columns {
                match col {
                    Column::Num(v) => data.push(v[row]),
                    Column::Str(_) => {
                        return Err(PricerError::ColumnKind {
                            column: name.clone(),
                            expected: "numeric (encode categoricals first)".to_string(),
                        })
                    }
                }
            }
        }
        Array2::from_shape_vec((n_rows, n_cols), data)
            .map_err(|e| PricerError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> DataFrame {
        let mut df = DataFrame::new();
        df.set_num("a", vec![1.0, 2.0, 3.0]).unwrap();
        df.set_str(
            "b",
            vec!["x".to_string(), "y".to_string(), "x".to_string()],
        )
        .unwrap();
        df
    }

    #[test]
    fn test_frame_shape() {
        let df = sample_frame();
        assert_eq!(df.n_rows(), 3);
        assert_eq!(df.n_cols(), 2);
        assert_eq!(df.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_set_column_replaces_in_place() {
        let mut df = sample_frame();
        df.set_num("a", vec![9.0, 8.0, 7.0]).unwrap();
        assert_eq!(df.column_names(), vec!["a", "b"]);
        assert_eq!(df.num("a").unwrap(), &[9.0, 8.0, 7.0]);
    }

    #[test]
    fn test_set_column_length_mismatch() {
        let mut df = sample_frame();
        let result = df.set_num("c", vec![1.0]);
        assert!(matches!(
            result,
            Err(PricerError::FeatureMismatch { .. })
        ));
    }

    #[test]
    fn test_numeric_access_on_string_column() {
        let df = sample_frame();
        assert!(matches!(df.num("b"), Err(PricerError::ColumnKind { .. })));
        assert!(matches!(
            df.num("missing"),
            Err(PricerError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_drop_columns_ignores_missing() {
        let mut df = sample_frame();
        df.drop_columns(&["b".to_string(), "never_there".to_string()]);
        assert_eq!(df.column_names(), vec!["a"]);
    }

    #[test]
    fn test_take_column() {
        let mut df = sample_frame();
        let col = df.take_column("a").unwrap();
        assert_eq!(col.len(), 3);
        assert!(!df.has_column("a"));
        assert!(df.take_column("a").is_none());
    }

    #[test]
    fn test_select_preserves_requested_order() {
        let df = sample_frame();
        let picked = df
            .select(&["b".to_string(), "a".to_string()])
            .unwrap();
        assert_eq!(picked.column_names(), vec!["b", "a"]);
    }

    #[test]
    fn test_select_missing_column() {
        let df = sample_frame();
        let result = df.select(&["z".to_string()]);
        assert!(matches!(
            result,
            Err(PricerError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_to_matrix_row_major() {
        let mut df = DataFrame::new();
        df.set_num("a", vec![1.0, 2.0]).unwrap();
        df.set_num("b", vec![3.0, 4.0]).unwrap();
        let m = df.to_matrix().unwrap();
        assert_eq!(m.shape(), &[2, 2]);
        assert_eq!(m[[0, 0]], 1.0);
        assert_eq!(m[[0, 1]], 3.0);
        assert_eq!(m[[1, 0]], 2.0);
        assert_eq!(m[[1, 1]], 4.0);
    }

    #[test]
    fn test_to_matrix_rejects_string_columns() {
        let df = sample_frame();
        assert!(matches!(
            df.to_matrix(),
            Err(PricerError::ColumnKind { .. })
        ));
    }

    #[test]
    fn test_dtype_partitions() {
        let df = sample_frame();
        assert_eq!(df.numeric_column_names(), vec!["a".to_string()]);
        assert_eq!(df.string_column_names(), vec!["b".to_string()]);
    }
}

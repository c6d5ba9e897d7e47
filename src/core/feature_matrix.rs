//! FeatureMatrix data structure for per-file normalized features.

use crate::error::{Result, TieringError};
use crate::utils::stats::median;
use std::collections::HashSet;

/// Normalized access-pattern features produced by the feature extraction step.
pub const ACCESS_PATTERN_FEATURES: [&str; 5] = [
    "access_freq_norm",
    "age_norm",
    "write_ratio_norm",
    "locality_norm",
    "concurrency_norm",
];

/// One file's feature values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector<'a> {
    /// File identifier; never used as a clustering coordinate.
    pub path: &'a str,
    /// Normalized feature values, one per matrix column.
    pub values: &'a [f64],
}

/// A validated table of normalized features, one row per file.
///
/// Every value is finite and lies in `[0, 1]`; every row has one value per
/// feature name. The matrix is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    feature_names: Vec<String>,
    paths: Vec<String>,
    /// Row-major values: rows[file][feature]
    rows: Vec<Vec<f64>>,
}

/// Builder for constructing a FeatureMatrix row by row.
#[derive(Debug, Clone, Default)]
pub struct FeatureMatrixBuilder {
    feature_names: Vec<String>,
    paths: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrixBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feature_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.feature_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn row(mut self, path: impl Into<String>, values: Vec<f64>) -> Self {
        self.paths.push(path.into());
        self.rows.push(values);
        self
    }

    pub fn build(self) -> Result<FeatureMatrix> {
        FeatureMatrix::new(self.feature_names, self.paths, self.rows)
    }
}

impl FeatureMatrix {
    /// Create a matrix, rejecting anything the clusterer must never see.
    ///
    /// # Errors
    /// * `EmptyData` when there are no rows
    /// * `InvalidConfiguration` for missing or duplicate feature names
    /// * `DimensionMismatch` when paths and rows, or names and row widths,
    ///   disagree
    /// * `NonFiniteValue` / `ValueOutOfRange` for values that are NaN,
    ///   infinite or outside `[0, 1]`
    pub fn new(feature_names: Vec<String>, paths: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if rows.is_empty() {
            return Err(TieringError::EmptyData);
        }
        if feature_names.is_empty() {
            return Err(TieringError::InvalidConfiguration(
                "at least one feature column is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for name in &feature_names {
            if !seen.insert(name.as_str()) {
                return Err(TieringError::InvalidConfiguration(format!(
                    "duplicate feature column '{}'",
                    name
                )));
            }
        }

        if paths.len() != rows.len() {
            return Err(TieringError::DimensionMismatch {
                expected: rows.len(),
                got: paths.len(),
            });
        }

        let dims = feature_names.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dims {
                return Err(TieringError::DimensionMismatch {
                    expected: dims,
                    got: row.len(),
                });
            }
            for (j, &value) in row.iter().enumerate() {
                if !value.is_finite() {
                    return Err(TieringError::NonFiniteValue { row: i, column: j });
                }
                if !(0.0..=1.0).contains(&value) {
                    return Err(TieringError::ValueOutOfRange {
                        row: i,
                        column: j,
                        value,
                    });
                }
            }
        }

        Ok(Self {
            feature_names,
            paths,
            rows,
        })
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false for a constructed matrix.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of features per file.
    pub fn dimensions(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Row-major feature values.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Get one file's feature vector.
    pub fn row(&self, index: usize) -> Result<FeatureVector<'_>> {
        if index >= self.rows.len() {
            return Err(TieringError::DimensionMismatch {
                expected: self.rows.len(),
                got: index,
            });
        }
        Ok(FeatureVector {
            path: self.paths[index].as_str(),
            values: self.rows[index].as_slice(),
        })
    }

    /// Iterate over all feature vectors in row order.
    pub fn iter(&self) -> impl Iterator<Item = FeatureVector<'_>> {
        self.paths
            .iter()
            .zip(self.rows.iter())
            .map(|(path, values)| FeatureVector {
                path: path.as_str(),
                values: values.as_slice(),
            })
    }

    /// Values of one feature column.
    pub fn column(&self, index: usize) -> Result<Vec<f64>> {
        if index >= self.feature_names.len() {
            return Err(TieringError::DimensionMismatch {
                expected: self.feature_names.len(),
                got: index,
            });
        }
        Ok(self.column_values(index))
    }

    fn column_values(&self, index: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[index]).collect()
    }

    /// Dataset-wide median of every feature, in column order.
    pub fn column_medians(&self) -> Vec<(String, f64)> {
        self.feature_names
            .iter()
            .enumerate()
            .map(|(j, name)| (name.clone(), median(&self.column_values(j))))
            .collect()
    }
}

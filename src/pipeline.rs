//! End-to-end tiering run.
//!
//! Clusters the feature matrix, groups the rows of each cluster, classifies
//! every cluster against the category model and reports one row per cluster
//! plus the resulting category of every file.

use crate::classification::{CategoryModel, ClusterClassifier, ClusterGroup};
use crate::clustering::{kmeans, KMeansConfig, DEFAULT_TOLERANCE};
use crate::core::FeatureMatrix;
use crate::error::{Result, TieringError};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Number of clusters
    pub k: usize,
    /// Convergence tolerance of the clusterer
    pub tolerance: f64,
    /// Random seed; `None` draws one from the OS
    pub seed: Option<u64>,
    /// Optional cap on clustering iterations
    pub max_iter: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            k: 4,
            tolerance: DEFAULT_TOLERANCE,
            seed: Some(42),
            max_iter: None,
        }
    }
}

impl PipelineConfig {
    pub fn k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = Some(max_iter);
        self
    }

    fn kmeans_config(&self) -> KMeansConfig {
        KMeansConfig {
            k: self.k,
            max_iter: self.max_iter,
            seed: self.seed,
            tolerance: self.tolerance,
        }
    }
}

/// One output row per cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterReport {
    pub cluster: usize,
    /// Centroid coordinates rendered as an identifier, see [`centroid_id`]
    pub centroid_id: String,
    pub category: String,
    pub centroid: Vec<f64>,
    /// Number of files in the cluster
    pub size: usize,
}

/// Category assigned to one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileAssignment {
    pub path: String,
    pub cluster: usize,
    pub category: String,
}

/// Result of a tiering run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TieringReport {
    pub feature_names: Vec<String>,
    /// Clusters in index order
    pub clusters: Vec<ClusterReport>,
    /// Files in input order
    pub files: Vec<FileAssignment>,
    pub n_iter: usize,
    pub converged: bool,
    pub inertia: f64,
}

impl TieringReport {
    /// Number of files assigned to each category.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for file in &self.files {
            *counts.entry(file.category.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Category of a file, if it was part of the run.
    pub fn category_of(&self, path: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.category.as_str())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Identifier built from centroid coordinates rounded to four decimals.
///
/// ```
/// use storage_tiering::pipeline::centroid_id;
///
/// assert_eq!(centroid_id(&[0.5, 0.123456]), "CENTROID_0.5000_0.1235");
/// ```
pub fn centroid_id(centroid: &[f64]) -> String {
    let coords: Vec<String> = centroid.iter().map(|v| format!("{:.4}", v)).collect();
    format!("CENTROID_{}", coords.join("_"))
}

/// Split the matrix rows into one [`ClusterGroup`] per label `0..k`.
///
/// # Errors
/// `DimensionMismatch` when there is not exactly one label per row,
/// `InvalidConfiguration` when a label is not below `k`.
pub fn group_by_label(
    matrix: &FeatureMatrix,
    labels: &[usize],
    k: usize,
) -> Result<Vec<ClusterGroup>> {
    if labels.len() != matrix.len() {
        return Err(TieringError::DimensionMismatch {
            expected: matrix.len(),
            got: labels.len(),
        });
    }

    let mut members: Vec<Vec<&[f64]>> = vec![Vec::new(); k];
    for (row, &label) in matrix.rows().iter().zip(labels.iter()) {
        let bucket = members.get_mut(label).ok_or_else(|| {
            TieringError::InvalidConfiguration(format!(
                "label {} out of range for {} clusters",
                label, k
            ))
        })?;
        bucket.push(row.as_slice());
    }

    members
        .iter()
        .enumerate()
        .map(|(label, rows)| ClusterGroup::from_rows(label, matrix.feature_names(), rows))
        .collect()
}

/// Clusters files and assigns a storage category to each cluster.
#[derive(Debug, Clone)]
pub struct TieringPipeline {
    classifier: ClusterClassifier,
    config: PipelineConfig,
}

impl TieringPipeline {
    pub fn new(model: CategoryModel, config: PipelineConfig) -> Self {
        Self {
            classifier: ClusterClassifier::new(model),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn classifier(&self) -> &ClusterClassifier {
        &self.classifier
    }

    /// Run clustering and classification over a validated matrix.
    ///
    /// # Errors
    /// Propagates configuration errors from the clusterer (e.g. `k` larger
    /// than the number of files) and scoring errors from the classifier.
    pub fn run(&self, matrix: &FeatureMatrix) -> Result<TieringReport> {
        let clustering = kmeans(matrix.rows(), &self.config.kmeans_config())?;
        let k = clustering.k();

        let groups = group_by_label(matrix, &clustering.labels, k)?;
        let classifications = self.classifier.classify(&groups)?;

        let clusters: Vec<ClusterReport> = classifications
            .iter()
            .zip(clustering.centroids.iter())
            .zip(groups.iter())
            .map(|((classification, centroid), group)| ClusterReport {
                cluster: classification.label,
                centroid_id: centroid_id(centroid),
                category: classification.category.clone(),
                centroid: centroid.clone(),
                size: group.len(),
            })
            .collect();

        let files = matrix
            .paths()
            .iter()
            .zip(clustering.labels.iter())
            .map(|(path, &cluster)| FileAssignment {
                path: path.clone(),
                cluster,
                category: clusters[cluster].category.clone(),
            })
            .collect();

        info!(
            files = matrix.len(),
            clusters = k,
            n_iter = clustering.n_iter,
            converged = clustering.converged,
            "tiering run complete"
        );

        Ok(TieringReport {
            feature_names: matrix.feature_names().to_vec(),
            clusters,
            files,
            n_iter: clustering.n_iter,
            converged: clustering.converged,
            inertia: clustering.inertia,
        })
    }
}

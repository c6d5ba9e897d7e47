//! Cluster scoring and category selection.
//!
//! Each cluster is summarized by the median of every feature. For a candidate
//! category the score accumulates, per feature, the weighted square of the
//! deviation from the global median when the deviation has the expected sign
//! (directional categories), or the weighted square of `1 - |deviation|` when
//! the median stays within [`NEAR_MEDIAN_BAND`] of the global median
//! (near-median categories). The highest score wins; exact ties go to the
//! highest replication factor, then to the earliest declared category.

use super::model::{CategoryModel, CategoryProfile, Direction, ScoringRule};
use crate::error::{Result, TieringError};
use crate::utils::stats::median;
use serde::Serialize;
use tracing::debug;

/// Half-width of the band around the global median rewarded by near-median
/// categories.
pub const NEAR_MEDIAN_BAND: f64 = 0.1;

/// Weighting applied to deviations; squaring lets strong deviations dominate.
#[inline]
fn weighting(x: f64) -> f64 {
    x * x
}

/// Member values of one cluster, column by column.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterGroup {
    pub label: usize,
    /// (feature name, values of every member) in column order
    pub features: Vec<(String, Vec<f64>)>,
}

impl ClusterGroup {
    pub fn new(label: usize) -> Self {
        Self {
            label,
            features: Vec::new(),
        }
    }

    pub fn with_feature(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.features.push((name.into(), values));
        self
    }

    /// Build a group from row-major member vectors.
    ///
    /// Every row must have one value per feature name.
    pub fn from_rows(label: usize, feature_names: &[String], rows: &[&[f64]]) -> Result<Self> {
        if let Some(row) = rows.iter().find(|row| row.len() != feature_names.len()) {
            return Err(TieringError::DimensionMismatch {
                expected: feature_names.len(),
                got: row.len(),
            });
        }
        let features = feature_names
            .iter()
            .enumerate()
            .map(|(j, name)| (name.clone(), rows.iter().map(|row| row[j]).collect()))
            .collect();
        Ok(Self { label, features })
    }

    /// Number of member rows.
    pub fn len(&self) -> usize {
        self.features.first().map_or(0, |(_, values)| values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-feature medians of one cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterMedians {
    pub label: usize,
    pub medians: Vec<(String, f64)>,
}

impl ClusterMedians {
    pub fn get(&self, feature: &str) -> Option<f64> {
        self.medians
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, m)| *m)
    }
}

/// Outcome of scoring every category for one cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDecision {
    /// Chosen category
    pub category: String,
    /// Score of the chosen category
    pub score: f64,
    /// Score of every category in model order
    pub scores: Vec<(String, f64)>,
    /// Categories that shared the maximum score (just the winner when untied)
    pub tied: Vec<String>,
}

/// Classification of one cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterClassification {
    pub label: usize,
    pub category: String,
    pub medians: ClusterMedians,
    pub decision: CategoryDecision,
}

/// Compute the median of every feature in a cluster.
///
/// # Errors
/// `EmptyData` when the group has no members or a feature column is empty.
pub fn cluster_medians(group: &ClusterGroup) -> Result<ClusterMedians> {
    if group.features.is_empty() {
        return Err(TieringError::EmptyData);
    }

    let medians = group
        .features
        .iter()
        .map(|(name, values)| {
            if values.is_empty() {
                Err(TieringError::EmptyData)
            } else {
                Ok((name.clone(), median(values)))
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ClusterMedians {
        label: group.label,
        medians,
    })
}

/// Scores clusters against a [`CategoryModel`].
#[derive(Debug, Clone)]
pub struct ClusterClassifier {
    model: CategoryModel,
}

impl ClusterClassifier {
    pub fn new(model: CategoryModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &CategoryModel {
        &self.model
    }

    /// Compute the median of every feature in a cluster.
    pub fn cluster_medians(&self, group: &ClusterGroup) -> Result<ClusterMedians> {
        cluster_medians(group)
    }

    /// Score a cluster for one category.
    ///
    /// # Errors
    /// * `MissingGlobalMedian` when the model has no reference for a feature
    /// * `MissingFeatureConfiguration` when the category lacks a weight or a
    ///   direction for a feature
    pub fn score_category(&self, medians: &ClusterMedians, category: &CategoryProfile) -> Result<f64> {
        let mut score = 0.0;

        for (feature, value) in &medians.medians {
            let global = self
                .model
                .global_median(feature)
                .ok_or_else(|| TieringError::MissingGlobalMedian {
                    feature: feature.clone(),
                })?;

            let missing = || TieringError::MissingFeatureConfiguration {
                category: category.name.clone(),
                feature: feature.clone(),
            };
            let weight = category.weight(feature).ok_or_else(missing)?;
            let expected = category.direction(feature).ok_or_else(missing)?;

            let delta = value - global;

            match category.rule {
                ScoringRule::NearMedian => {
                    if delta.abs() < NEAR_MEDIAN_BAND {
                        score += weight * weighting(1.0 - delta.abs());
                    }
                }
                ScoringRule::Directional => {
                    if expected == Direction::Neutral || Direction::of(delta) == expected {
                        score += weight * weighting(delta);
                    }
                }
            }
        }

        Ok(score)
    }

    /// Pick the best category for a cluster.
    pub fn classify_cluster(&self, medians: &ClusterMedians) -> Result<CategoryDecision> {
        let categories = self.model.categories();
        let mut scores = Vec::with_capacity(categories.len());
        for category in categories {
            scores.push(self.score_category(medians, category)?);
        }

        let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let tied: Vec<&CategoryProfile> = categories
            .iter()
            .zip(scores.iter())
            .filter(|(_, &s)| s == best)
            .map(|(c, _)| c)
            .collect();

        // max_by_key keeps the last maximum, so reversing keeps the earliest
        // declared category among equal replication factors.
        let winner = tied
            .iter()
            .rev()
            .max_by_key(|c| c.replication_factor)
            .ok_or_else(|| {
                TieringError::InvalidConfiguration("category model has no categories".to_string())
            })?;

        if tied.len() > 1 {
            debug!(
                cluster = medians.label,
                winner = %winner.name,
                candidates = tied.len(),
                score = best,
                "score tie broken by replication factor"
            );
        }

        Ok(CategoryDecision {
            category: winner.name.clone(),
            score: best,
            scores: categories
                .iter()
                .map(|c| c.name.clone())
                .zip(scores.iter().copied())
                .collect(),
            tied: tied.iter().map(|c| c.name.clone()).collect(),
        })
    }

    /// Classify every cluster, in input order.
    pub fn classify(&self, clusters: &[ClusterGroup]) -> Result<Vec<ClusterClassification>> {
        clusters
            .iter()
            .map(|group| {
                let medians = self.cluster_medians(group)?;
                let decision = self.classify_cluster(&medians)?;
                Ok(ClusterClassification {
                    label: group.label,
                    category: decision.category.clone(),
                    medians,
                    decision,
                })
            })
            .collect()
    }
}

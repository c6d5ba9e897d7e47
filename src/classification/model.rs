//! Category model: reference medians and per-category scoring profiles.
//!
//! A [`CategoryModel`] is an explicit value handed to the classifier. It holds
//! the global median of every feature and, for each category, a weight and an
//! expected deviation direction per feature plus a replication factor that is
//! only consulted to break exact score ties.

use crate::core::{FeatureMatrix, ACCESS_PATTERN_FEATURES};
use crate::error::{Result, TieringError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Expected direction of a feature's deviation from its global median.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Direction {
    /// Median below the global median (-1)
    Decreasing,
    /// Either direction counts (0)
    Neutral,
    /// Median above the global median (+1)
    Increasing,
}

impl Direction {
    /// Sign of a deviation; exactly zero maps to `Neutral`.
    pub fn of(delta: f64) -> Self {
        if delta > 0.0 {
            Direction::Increasing
        } else if delta < 0.0 {
            Direction::Decreasing
        } else {
            Direction::Neutral
        }
    }

    pub fn sign(self) -> i8 {
        match self {
            Direction::Decreasing => -1,
            Direction::Neutral => 0,
            Direction::Increasing => 1,
        }
    }
}

impl TryFrom<i8> for Direction {
    type Error = TieringError;

    fn try_from(value: i8) -> Result<Self> {
        match value {
            -1 => Ok(Direction::Decreasing),
            0 => Ok(Direction::Neutral),
            1 => Ok(Direction::Increasing),
            other => Err(TieringError::InvalidConfiguration(format!(
                "direction must be -1, 0 or 1, got {}",
                other
            ))),
        }
    }
}

impl From<Direction> for i8 {
    fn from(direction: Direction) -> Self {
        direction.sign()
    }
}

/// How a category turns feature deviations into a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringRule {
    /// Reward squared deviations that agree with the expected direction.
    #[default]
    Directional,
    /// Reward medians that stay close to the global median.
    NearMedian,
}

/// Scoring profile of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryProfile {
    pub name: String,
    pub weights: BTreeMap<String, f64>,
    pub directions: BTreeMap<String, Direction>,
    /// Tie-break priority; higher wins.
    pub replication_factor: u32,
    #[serde(default)]
    pub rule: ScoringRule,
}

impl CategoryProfile {
    pub fn new(name: impl Into<String>, replication_factor: u32) -> Self {
        Self {
            name: name.into(),
            weights: BTreeMap::new(),
            directions: BTreeMap::new(),
            replication_factor,
            rule: ScoringRule::Directional,
        }
    }

    pub fn rule(mut self, rule: ScoringRule) -> Self {
        self.rule = rule;
        self
    }

    /// Set weight and expected direction for one feature.
    pub fn feature(mut self, feature: impl Into<String>, weight: f64, direction: Direction) -> Self {
        let feature = feature.into();
        self.weights.insert(feature.clone(), weight);
        self.directions.insert(feature, direction);
        self
    }

    pub fn weight(&self, feature: &str) -> Option<f64> {
        self.weights.get(feature).copied()
    }

    pub fn direction(&self, feature: &str) -> Option<Direction> {
        self.directions.get(feature).copied()
    }
}

/// Validated category model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CategoryModelBuilder", into = "CategoryModelBuilder")]
pub struct CategoryModel {
    global_medians: BTreeMap<String, f64>,
    categories: Vec<CategoryProfile>,
}

/// Builder and serialized form of a [`CategoryModel`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryModelBuilder {
    #[serde(default)]
    global_medians: BTreeMap<String, f64>,
    #[serde(default)]
    categories: Vec<CategoryProfile>,
}

impl CategoryModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global_median(mut self, feature: impl Into<String>, median: f64) -> Self {
        self.global_medians.insert(feature.into(), median);
        self
    }

    /// Use the dataset's own per-feature medians as reference points.
    pub fn global_medians_from(mut self, matrix: &FeatureMatrix) -> Self {
        self.global_medians.extend(matrix.column_medians());
        self
    }

    /// Append a category. Declaration order is the last-resort tie-break.
    pub fn category(mut self, profile: CategoryProfile) -> Self {
        self.categories.push(profile);
        self
    }

    pub fn build(self) -> Result<CategoryModel> {
        if self.categories.is_empty() {
            return Err(TieringError::InvalidConfiguration(
                "category model needs at least one category".to_string(),
            ));
        }

        for (feature, median) in &self.global_medians {
            if !median.is_finite() {
                return Err(TieringError::InvalidConfiguration(format!(
                    "global median of '{}' must be finite",
                    feature
                )));
            }
        }

        let mut names = HashSet::new();
        for category in &self.categories {
            if !names.insert(category.name.as_str()) {
                return Err(TieringError::InvalidConfiguration(format!(
                    "duplicate category '{}'",
                    category.name
                )));
            }
            if category.replication_factor == 0 {
                return Err(TieringError::InvalidConfiguration(format!(
                    "replication factor of '{}' must be positive",
                    category.name
                )));
            }
            for (feature, &weight) in &category.weights {
                if !(weight.is_finite() && weight >= 0.0) {
                    return Err(TieringError::InvalidConfiguration(format!(
                        "weight of '{}' for '{}' must be a non-negative number, got {}",
                        feature, category.name, weight
                    )));
                }
            }
        }

        Ok(CategoryModel {
            global_medians: self.global_medians,
            categories: self.categories,
        })
    }
}

impl TryFrom<CategoryModelBuilder> for CategoryModel {
    type Error = TieringError;

    fn try_from(builder: CategoryModelBuilder) -> Result<Self> {
        builder.build()
    }
}

impl From<CategoryModel> for CategoryModelBuilder {
    fn from(model: CategoryModel) -> Self {
        Self {
            global_medians: model.global_medians,
            categories: model.categories,
        }
    }
}

impl CategoryModel {
    pub fn builder() -> CategoryModelBuilder {
        CategoryModelBuilder::new()
    }

    /// Parse and validate a model from JSON.
    ///
    /// ```
    /// use storage_tiering::classification::CategoryModel;
    ///
    /// let json = r#"{
    ///     "global_medians": {"IOPS": 60.0},
    ///     "categories": [
    ///         {"name": "Hot", "weights": {"IOPS": 1.0}, "directions": {"IOPS": 1},
    ///          "replication_factor": 3}
    ///     ]
    /// }"#;
    /// let model = CategoryModel::from_json(json).unwrap();
    /// assert_eq!(model.categories().len(), 1);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let builder: CategoryModelBuilder = serde_json::from_str(json)?;
        builder.build()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn global_median(&self, feature: &str) -> Option<f64> {
        self.global_medians.get(feature).copied()
    }

    pub fn global_medians(&self) -> &BTreeMap<String, f64> {
        &self.global_medians
    }

    /// Categories in declaration order.
    pub fn categories(&self) -> &[CategoryProfile] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&CategoryProfile> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Reference tiering model over [`ACCESS_PATTERN_FEATURES`].
    ///
    /// Global medians sit at the middle of the normalized range. Hot rewards
    /// frequent, recent, write-heavy, local and concurrent access; Shared
    /// rewards above-median activity everywhere; Archival the opposite of Hot;
    /// Moderate rewards staying near the median. Replication factors order
    /// ties as Archival, Hot, Shared, Moderate.
    pub fn access_pattern_default() -> Self {
        use Direction::{Decreasing as Dec, Increasing as Inc, Neutral};

        let [freq, age, write, locality, concurrency] = ACCESS_PATTERN_FEATURES;

        let hot = CategoryProfile::new("Hot", 3)
            .feature(freq, 1.0, Inc)
            .feature(age, 0.8, Dec)
            .feature(write, 0.5, Inc)
            .feature(locality, 0.5, Inc)
            .feature(concurrency, 1.0, Inc);
        let shared = CategoryProfile::new("Shared", 2)
            .feature(freq, 0.7, Inc)
            .feature(age, 0.2, Inc)
            .feature(write, 1.0, Inc)
            .feature(locality, 0.2, Inc)
            .feature(concurrency, 0.5, Inc);
        let mut moderate = CategoryProfile::new("Moderate", 1).rule(ScoringRule::NearMedian);
        for feature in ACCESS_PATTERN_FEATURES {
            moderate = moderate.feature(feature, 0.5, Neutral);
        }
        let archival = CategoryProfile::new("Archival", 4)
            .feature(freq, 0.1, Dec)
            .feature(age, 1.0, Inc)
            .feature(write, 0.1, Dec)
            .feature(locality, 0.5, Dec)
            .feature(concurrency, 0.1, Dec);

        CategoryModel {
            global_medians: ACCESS_PATTERN_FEATURES
                .iter()
                .map(|f| (f.to_string(), 0.5))
                .collect(),
            categories: vec![hot, shared, moderate, archival],
        }
    }
}

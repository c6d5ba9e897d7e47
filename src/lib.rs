//! # storage-tiering
//!
//! Storage tier classification of files from normalized access-pattern
//! features.
//!
//! Files are grouped with k-means (k-means++ seeding, Lloyd iterations) and
//! every cluster is labelled with a storage category such as Hot, Shared,
//! Moderate or Archival by a weighted multi-criteria scoring of its feature
//! medians against a [`classification::CategoryModel`].

#![allow(clippy::float_cmp)]

pub mod classification;
pub mod clustering;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod utils;

pub use error::{Result, TieringError};

pub mod prelude {
    pub use crate::classification::{
        CategoryModel, CategoryProfile, ClusterClassifier, ClusterGroup, Direction, ScoringRule,
    };
    pub use crate::clustering::{kmeans, KMeansConfig, KMeansResult};
    pub use crate::core::{FeatureMatrix, FeatureMatrixBuilder, ACCESS_PATTERN_FEATURES};
    pub use crate::error::{Result, TieringError};
    pub use crate::pipeline::{PipelineConfig, TieringPipeline, TieringReport};
}

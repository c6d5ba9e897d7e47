//! Core data structures for per-file access-pattern features.

mod feature_matrix;

pub use feature_matrix::{
    FeatureMatrix, FeatureMatrixBuilder, FeatureVector, ACCESS_PATTERN_FEATURES,
};

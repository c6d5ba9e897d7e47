//! Category classification of clusters.
//!
//! A [`CategoryModel`] describes, per category, which feature deviations it
//! rewards and how strongly. The [`ClusterClassifier`] summarizes each cluster
//! by its feature medians and picks the best scoring category.
//!
//! # Example
//!
//! ```
//! use storage_tiering::classification::{
//!     CategoryModel, CategoryProfile, ClusterClassifier, ClusterGroup, Direction,
//! };
//!
//! let model = CategoryModel::builder()
//!     .global_median("IOPS", 60.0)
//!     .category(CategoryProfile::new("Hot", 3).feature("IOPS", 1.0, Direction::Increasing))
//!     .category(CategoryProfile::new("Archival", 4).feature("IOPS", 0.9, Direction::Decreasing))
//!     .build()
//!     .unwrap();
//!
//! let classifier = ClusterClassifier::new(model);
//! let clusters = vec![ClusterGroup::new(0).with_feature("IOPS", vec![200.0, 210.0, 220.0])];
//! let results = classifier.classify(&clusters).unwrap();
//! assert_eq!(results[0].category, "Hot");
//! ```

pub mod model;
pub mod scoring;

pub use model::{CategoryModel, CategoryModelBuilder, CategoryProfile, Direction, ScoringRule};
pub use scoring::{
    cluster_medians, CategoryDecision, ClusterClassification, ClusterClassifier, ClusterGroup,
    ClusterMedians, NEAR_MEDIAN_BAND,
};

//! Utility functions shared by clustering and classification.

pub mod stats;

pub use stats::{column_means, median};

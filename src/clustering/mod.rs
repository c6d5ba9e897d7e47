//! Clustering of per-file feature vectors.
//!
//! Provides Euclidean distance helpers and k-means clustering with k-means++
//! seeding.
//!
//! # Example
//!
//! ```
//! use storage_tiering::clustering::{euclidean_distance, kmeans, KMeansConfig};
//!
//! let a = vec![0.1, 0.2, 0.3];
//! assert_eq!(euclidean_distance(&a, &a), 0.0);
//!
//! let rows = vec![
//!     vec![0.1, 0.2],
//!     vec![0.11, 0.21],
//!     vec![0.9, 0.8],
//!     vec![0.91, 0.81],
//! ];
//! let config = KMeansConfig::default().k(2).seed(42);
//! let result = kmeans(&rows, &config).unwrap();
//! assert_eq!(result.centroids.len(), 2);
//! ```

pub mod distance;
pub mod kmeans;

pub use distance::{centroid_shift, euclidean_distance, squared_euclidean};
pub use kmeans::{default_max_iter, kmeans, KMeansConfig, KMeansResult, DEFAULT_TOLERANCE};

//! K-means clustering for feature vectors.
//!
//! Centroids are seeded with k-means++ and refined with Lloyd iterations
//! under Euclidean distance. A single random source drives both the seeding
//! and the reseeding of clusters that lose all their members, so a fixed seed
//! always reproduces the same result.

use super::distance::{centroid_shift, squared_euclidean};
use crate::error::{Result, TieringError};
use crate::utils::stats::column_means;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

/// Default convergence tolerance on the combined centroid shift.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Iteration bound for a dataset of `n` rows: `max(100, floor(n / 100))`.
pub fn default_max_iter(n: usize) -> usize {
    100.max(n / 100)
}

/// K-means configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansConfig {
    /// Number of clusters
    pub k: usize,
    /// Optional iteration cap; can only lower [`default_max_iter`]
    pub max_iter: Option<usize>,
    /// Random seed for initialization and reseeding
    pub seed: Option<u64>,
    /// Convergence tolerance
    pub tolerance: f64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 4,
            max_iter: None,
            seed: None,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl KMeansConfig {
    /// Set number of clusters.
    pub fn k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Cap the number of iterations.
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = Some(max_iter);
        self
    }

    /// Set random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set convergence tolerance.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Number of Lloyd iterations allowed for `n` rows.
    pub fn effective_max_iter(&self, n: usize) -> usize {
        let bound = default_max_iter(n);
        self.max_iter.map_or(bound, |cap| cap.min(bound))
    }
}

/// K-means clustering result.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansResult {
    /// Cluster assignment for each row (0-indexed)
    pub labels: Vec<usize>,
    /// Cluster centroids
    pub centroids: Vec<Vec<f64>>,
    /// Within-cluster sum of squared distances
    pub inertia: f64,
    /// Number of iterations performed
    pub n_iter: usize,
    /// Whether the shift fell below the tolerance before the iteration bound
    pub converged: bool,
    /// Number of empty clusters reseeded during iteration
    pub n_reseeds: usize,
}

impl KMeansResult {
    /// Number of clusters.
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Get indices of rows in a specific cluster.
    pub fn cluster_members(&self, cluster: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == cluster)
            .map(|(i, _)| i)
            .collect()
    }

    /// Get the size of each cluster.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        cluster_sizes(&self.labels, self.k())
    }
}

/// Perform k-means clustering.
///
/// # Arguments
/// * `rows` - Feature vectors, all of the same dimension
/// * `config` - K-means configuration
///
/// # Errors
/// Fails before any computation when `rows` is empty, when `k` is not in
/// `1..=rows.len()`, when the tolerance or iteration cap is not usable, when
/// rows have different dimensions or when a value is not finite or lies
/// outside `[0, 1]`.
///
/// # Example
/// ```
/// use storage_tiering::clustering::{kmeans, KMeansConfig};
///
/// let rows = vec![
///     vec![0.1, 0.1],
///     vec![0.12, 0.09],
///     vec![0.9, 0.9],
///     vec![0.88, 0.91],
/// ];
/// let result = kmeans(&rows, &KMeansConfig::default().k(2).seed(7)).unwrap();
/// assert_eq!(result.labels[0], result.labels[1]);
/// assert_ne!(result.labels[0], result.labels[2]);
/// ```
pub fn kmeans(rows: &[Vec<f64>], config: &KMeansConfig) -> Result<KMeansResult> {
    validate(rows, config)?;

    let n = rows.len();
    let k = config.k;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut centroids = initialize_centroids(rows, k, &mut rng);

    let max_iter = config.effective_max_iter(n);
    let mut labels = vec![0; n];
    let mut n_iter = 0;
    let mut n_reseeds = 0;
    let mut converged = false;

    for iter in 0..max_iter {
        n_iter = iter + 1;

        // Assignment step
        assign_labels(rows, &centroids, &mut labels);

        // Update step
        let (new_centroids, reseeded) = update_centroids(rows, &labels, k, &mut rng);
        n_reseeds += reseeded;

        let shift = centroid_shift(&centroids, &new_centroids);
        centroids = new_centroids;
        debug!(iteration = n_iter, shift, "k-means iteration");

        if shift < config.tolerance {
            converged = true;
            break;
        }
    }

    repair_empty_clusters(rows, &mut labels, &mut centroids);

    let inertia = compute_inertia(rows, &labels, &centroids);
    debug!(n_iter, converged, n_reseeds, inertia, "k-means finished");

    Ok(KMeansResult {
        labels,
        centroids,
        inertia,
        n_iter,
        converged,
        n_reseeds,
    })
}

fn validate(rows: &[Vec<f64>], config: &KMeansConfig) -> Result<()> {
    if rows.is_empty() {
        return Err(TieringError::EmptyData);
    }
    let n = rows.len();
    if config.k < 1 || config.k > n {
        return Err(TieringError::InvalidConfiguration(format!(
            "k = {} must be between 1 and the number of rows ({})",
            config.k, n
        )));
    }
    if !(config.tolerance.is_finite() && config.tolerance > 0.0) {
        return Err(TieringError::InvalidConfiguration(format!(
            "tolerance must be a positive number, got {}",
            config.tolerance
        )));
    }
    if config.max_iter == Some(0) {
        return Err(TieringError::InvalidConfiguration(
            "max_iter must be at least 1".to_string(),
        ));
    }

    let dim = rows[0].len();
    if dim == 0 {
        return Err(TieringError::InvalidConfiguration(
            "feature vectors must have at least one dimension".to_string(),
        ));
    }
    for (i, row) in rows.iter().enumerate() {
        if row.len() != dim {
            return Err(TieringError::DimensionMismatch {
                expected: dim,
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

    Ok(())
}

/// Initialize centroids using the k-means++ algorithm.
///
/// Each draw after the first picks a row with probability proportional to its
/// squared distance to the nearest centroid chosen so far. When every row
/// already coincides with a chosen centroid the draw is uniform.
fn initialize_centroids(rows: &[Vec<f64>], k: usize, rng: &mut impl Rng) -> Vec<Vec<f64>> {
    let n = rows.len();
    let mut centroids = Vec::with_capacity(k);

    let first_idx = rng.gen_range(0..n);
    centroids.push(rows[first_idx].clone());
    debug!(centroid = 0, row = first_idx, "seeded centroid");

    // Squared distance of every row to its nearest chosen centroid
    let mut nearest: Vec<f64> = rows
        .iter()
        .map(|r| squared_euclidean(r, &centroids[0]))
        .collect();

    for c in 1..k {
        let next_idx = match WeightedIndex::new(&nearest) {
            Ok(dist) => dist.sample(rng),
            Err(_) => rng.gen_range(0..n),
        };
        let centroid = rows[next_idx].clone();

        for (d, row) in nearest.iter_mut().zip(rows.iter()) {
            *d = d.min(squared_euclidean(row, &centroid));
        }

        debug!(centroid = c, row = next_idx, "seeded centroid");
        centroids.push(centroid);
    }

    centroids
}

/// Find the nearest centroid for a row. Ties go to the lowest index.
fn find_nearest_centroid(row: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut min_dist = f64::INFINITY;
    let mut nearest = 0;

    for (i, centroid) in centroids.iter().enumerate() {
        let dist = squared_euclidean(row, centroid);
        if dist < min_dist {
            min_dist = dist;
            nearest = i;
        }
    }

    (nearest, min_dist)
}

fn assign_labels(rows: &[Vec<f64>], centroids: &[Vec<f64>], labels: &mut [usize]) {
    for (label, row) in labels.iter_mut().zip(rows.iter()) {
        *label = find_nearest_centroid(row, centroids).0;
    }
}

/// Recompute centroids as member means, reseeding empty clusters.
///
/// Returns the new centroids and the number of reseeded clusters.
fn update_centroids(
    rows: &[Vec<f64>],
    labels: &[usize],
    k: usize,
    rng: &mut impl Rng,
) -> (Vec<Vec<f64>>, usize) {
    let mut members: Vec<Vec<&[f64]>> = vec![Vec::new(); k];
    for (row, &label) in rows.iter().zip(labels.iter()) {
        members[label].push(row.as_slice());
    }

    let mut centroids = Vec::with_capacity(k);
    let mut reseeded = 0;

    for (cluster, group) in members.iter().enumerate() {
        if group.is_empty() {
            let idx = rng.gen_range(0..rows.len());
            warn!(cluster, row = idx, "empty cluster reseeded");
            centroids.push(rows[idx].clone());
            reseeded += 1;
        } else {
            centroids.push(column_means(group));
        }
    }

    (centroids, reseeded)
}

/// Give every empty cluster one row.
///
/// The row farthest from its own centroid, among clusters that can spare a
/// member, is moved into the empty cluster. Both affected centroids are
/// recomputed from their new members.
fn repair_empty_clusters(rows: &[Vec<f64>], labels: &mut [usize], centroids: &mut [Vec<f64>]) {
    let k = centroids.len();

    loop {
        let sizes = cluster_sizes(labels, k);
        let Some(empty) = sizes.iter().position(|&s| s == 0) else {
            break;
        };

        let candidate = (0..rows.len())
            .filter(|&i| sizes[labels[i]] > 1)
            .map(|i| (i, squared_euclidean(&rows[i], &centroids[labels[i]])))
            .max_by(|a, b| a.1.total_cmp(&b.1));

        let Some((row, _)) = candidate else {
            break;
        };

        let donor = labels[row];
        labels[row] = empty;
        centroids[empty] = rows[row].clone();

        let donor_members: Vec<&[f64]> = rows
            .iter()
            .zip(labels.iter())
            .filter(|(_, &l)| l == donor)
            .map(|(r, _)| r.as_slice())
            .collect();
        centroids[donor] = column_means(&donor_members);

        warn!(cluster = empty, row, donor, "empty cluster repaired");
    }
}

fn cluster_sizes(labels: &[usize], k: usize) -> Vec<usize> {
    let mut sizes = vec![0; k];
    for &label in labels {
        if label < k {
            sizes[label] += 1;
        }
    }
    sizes
}

/// Compute inertia (total within-cluster sum of squared distances).
fn compute_inertia(rows: &[Vec<f64>], labels: &[usize], centroids: &[Vec<f64>]) -> f64 {
    rows.iter()
        .zip(labels.iter())
        .map(|(row, &l)| squared_euclidean(row, &centroids[l]))
        .sum()
}

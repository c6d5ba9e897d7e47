//! Distance measures between feature vectors.

/// Squared Euclidean distance between two vectors of equal length.
#[inline]
pub fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Euclidean distance between two vectors of equal length.
///
/// Returns infinity when the lengths differ.
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return f64::INFINITY;
    }
    squared_euclidean(a, b).sqrt()
}

/// Frobenius norm of the difference between two centroid sets.
///
/// This is the combined shift used as the convergence criterion: the
/// square root of the summed squared displacement over every centroid.
pub fn centroid_shift(old: &[Vec<f64>], new: &[Vec<f64>]) -> f64 {
    old.iter()
        .zip(new.iter())
        .map(|(a, b)| squared_euclidean(a, b))
        .sum::<f64>()
        .sqrt()
}

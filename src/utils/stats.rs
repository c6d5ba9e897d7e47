//! Statistical utility functions.

/// Calculate the median of a slice.
///
/// For an even number of values the two middle order statistics are averaged.
/// Returns NaN for an empty slice.
///
/// # Example
/// ```
/// use storage_tiering::utils::median;
///
/// assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
/// assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
/// ```
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Coordinate-wise mean of a set of equally sized rows.
pub fn column_means(rows: &[&[f64]]) -> Vec<f64> {
    if rows.is_empty() {
        return Vec::new();
    }

    let n = rows.len() as f64;
    let dim = rows[0].len();
    let mut out = vec![0.0; dim];

    for row in rows {
        for (acc, &x) in out.iter_mut().zip(row.iter()) {
            *acc += x;
        }
    }

    for acc in &mut out {
        *acc /= n;
    }

    out
}

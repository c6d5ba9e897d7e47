//! Storage Tiering Example
//!
//! This example clusters a small synthetic file population and assigns a
//! storage tier to every cluster and file.
//!
//! Run with: cargo run --example tiering

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use storage_tiering::prelude::*;
use tracing_subscriber::FmtSubscriber;

/// Draw a file's features around a profile, clamped to the normalized range.
fn jitter(profile: &[f64; 5], rng: &mut impl Rng) -> Vec<f64> {
    profile
        .iter()
        .map(|&p| (p + rng.gen_range(-0.05..0.05)).clamp(0.0, 1.0))
        .collect()
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    println!("=== Storage Tiering Example ===\n");

    // =========================================================================
    // Synthetic feature table
    // =========================================================================
    let profiles: [(&str, [f64; 5]); 4] = [
        ("hot", [0.90, 0.10, 0.70, 0.85, 0.90]),
        ("shared", [0.75, 0.80, 0.90, 0.60, 0.70]),
        ("moderate", [0.50, 0.50, 0.50, 0.50, 0.50]),
        ("archive", [0.05, 0.95, 0.05, 0.10, 0.05]),
    ];

    let mut rng = StdRng::seed_from_u64(7);
    let mut builder = FeatureMatrixBuilder::new().feature_names(ACCESS_PATTERN_FEATURES);
    for (name, profile) in &profiles {
        for i in 0..25 {
            builder = builder.row(format!("/data/{}/file_{:02}.dat", name, i), jitter(profile, &mut rng));
        }
    }
    let matrix = builder.build()?;
    println!("Files: {}, features: {}\n", matrix.len(), matrix.dimensions());

    // =========================================================================
    // Cluster and classify
    // =========================================================================
    let pipeline = TieringPipeline::new(
        CategoryModel::access_pattern_default(),
        PipelineConfig::default().k(4),
    );
    let report = pipeline.run(&matrix)?;

    println!("--- Clusters ---\n");
    println!("{:<48} {:<10} {:>5}", "centroid_id", "category", "size");
    for cluster in &report.clusters {
        println!(
            "{:<48} {:<10} {:>5}",
            cluster.centroid_id, cluster.category, cluster.size
        );
    }

    println!("\n--- Files per category ---\n");
    for (category, count) in report.category_counts() {
        println!("  {:<10} {}", category, count);
    }

    println!(
        "\nConverged: {} after {} iterations (inertia {:.4})",
        report.converged, report.n_iter, report.inertia
    );

    Ok(())
}

//! Classification scenarios on the IOPS/Latency reference fixture.
//!
//! Four clusters of raw measurements are scored against global medians
//! IOPS = 60 and Latency = 4 with the Hot/Shared/Moderate/Archival model.

use storage_tiering::classification::{
    CategoryModel, CategoryProfile, ClusterClassifier, ClusterGroup, ClusterMedians, Direction,
    ScoringRule,
};
use storage_tiering::TieringError;

fn fixture_model_with(hot_rf: u32, shared: CategoryProfile) -> CategoryModel {
    CategoryModel::builder()
        .global_median("IOPS", 60.0)
        .global_median("Latency", 4.0)
        .category(
            CategoryProfile::new("Hot", hot_rf)
                .feature("IOPS", 1.0, Direction::Increasing)
                .feature("Latency", 0.8, Direction::Decreasing),
        )
        .category(shared)
        .category(
            CategoryProfile::new("Moderate", 1)
                .rule(ScoringRule::NearMedian)
                .feature("IOPS", 0.5, Direction::Neutral)
                .feature("Latency", 0.5, Direction::Neutral),
        )
        .category(
            CategoryProfile::new("Archival", 4)
                .feature("IOPS", 0.9, Direction::Decreasing)
                .feature("Latency", 1.0, Direction::Increasing),
        )
        .build()
        .expect("fixture model is valid")
}

fn fixture_model() -> CategoryModel {
    fixture_model_with(
        3,
        CategoryProfile::new("Shared", 2)
            .feature("IOPS", 0.7, Direction::Increasing)
            .feature("Latency", 0.7, Direction::Increasing),
    )
}

fn cluster(label: usize, iops: &[f64], latency: &[f64]) -> ClusterGroup {
    ClusterGroup::new(label)
        .with_feature("IOPS", iops.to_vec())
        .with_feature("Latency", latency.to_vec())
}

fn fixture_clusters() -> Vec<ClusterGroup> {
    vec![
        cluster(0, &[100.0, 110.0, 105.0], &[2.0, 3.0, 2.5]),
        cluster(1, &[50.0, 55.0, 60.0], &[5.0, 6.0, 5.5]),
        cluster(2, &[10.0, 12.0, 11.0], &[8.0, 9.0, 7.0]),
        cluster(3, &[200.0, 210.0, 220.0], &[1.0, 1.5, 1.2]),
    ]
}

#[test]
fn fixture_clusters_get_expected_categories() {
    let classifier = ClusterClassifier::new(fixture_model());
    let results = classifier.classify(&fixture_clusters()).unwrap();

    let categories: Vec<&str> = results.iter().map(|r| r.category.as_str()).collect();
    assert_eq!(categories, vec!["Hot", "Archival", "Archival", "Hot"]);
}

#[test]
fn high_iops_low_latency_is_hot() {
    let classifier = ClusterClassifier::new(fixture_model());
    let results = classifier
        .classify(&[cluster(0, &[200.0, 210.0, 220.0], &[1.0, 1.5, 1.2])])
        .unwrap();

    assert_eq!(results[0].medians.get("IOPS"), Some(210.0));
    assert_eq!(results[0].medians.get("Latency"), Some(1.2));
    assert_eq!(results[0].category, "Hot");
}

#[test]
fn low_iops_high_latency_is_archival() {
    let classifier = ClusterClassifier::new(fixture_model());
    let results = classifier
        .classify(&[cluster(0, &[10.0, 12.0, 11.0], &[8.0, 9.0, 7.0])])
        .unwrap();

    assert_eq!(results[0].medians.get("IOPS"), Some(11.0));
    assert_eq!(results[0].medians.get("Latency"), Some(8.0));
    assert_eq!(results[0].category, "Archival");
}

#[test]
fn cluster_near_global_medians_is_moderate() {
    let classifier = ClusterClassifier::new(fixture_model());
    let results = classifier
        .classify(&[cluster(0, &[60.05, 60.0, 60.1], &[3.95, 4.0, 3.9])])
        .unwrap();

    assert_eq!(results[0].category, "Moderate");
}

#[test]
fn identical_scores_go_to_higher_replication_factor() {
    // Shared mirrors Hot exactly, so both always score the same.
    let mirrored = || {
        CategoryProfile::new("Shared", 5)
            .feature("IOPS", 1.0, Direction::Increasing)
            .feature("Latency", 0.8, Direction::Decreasing)
    };

    let classifier = ClusterClassifier::new(fixture_model_with(3, mirrored()));
    let medians = ClusterMedians {
        label: 0,
        medians: vec![("IOPS".to_string(), 210.0), ("Latency".to_string(), 1.2)],
    };
    let decision = classifier.classify_cluster(&medians).unwrap();
    assert_eq!(decision.category, "Shared");
    assert_eq!(decision.tied, vec!["Hot".to_string(), "Shared".to_string()]);

    let classifier = ClusterClassifier::new(fixture_model_with(9, mirrored()));
    let decision = classifier.classify_cluster(&medians).unwrap();
    assert_eq!(decision.category, "Hot");
}

#[test]
fn all_zero_scores_fall_back_to_priority() {
    let model = CategoryModel::builder()
        .global_median("IOPS", 60.0)
        .global_median("Latency", 4.0)
        .category(
            CategoryProfile::new("Hot", 3)
                .feature("IOPS", 1.0, Direction::Increasing)
                .feature("Latency", 0.8, Direction::Decreasing),
        )
        .category(
            CategoryProfile::new("Archival", 4)
                .feature("IOPS", 0.9, Direction::Decreasing)
                .feature("Latency", 1.0, Direction::Increasing),
        )
        .build()
        .unwrap();
    let classifier = ClusterClassifier::new(model);
    let medians = ClusterMedians {
        label: 0,
        medians: vec![("IOPS".to_string(), 100.0), ("Latency".to_string(), 2.0)],
    };
    // Hot matches both features here, so it must win outright.
    assert_eq!(classifier.classify_cluster(&medians).unwrap().category, "Hot");

    // No deviation at all: both categories score zero.
    let medians = ClusterMedians {
        label: 0,
        medians: vec![("IOPS".to_string(), 60.0), ("Latency".to_string(), 4.0)],
    };
    let decision = classifier.classify_cluster(&medians).unwrap();
    assert_eq!(decision.score, 0.0);
    assert_eq!(decision.category, "Archival");
}

#[test]
fn unconfigured_feature_fails_classification() {
    let classifier = ClusterClassifier::new(fixture_model());
    let clusters = vec![ClusterGroup::new(0)
        .with_feature("IOPS", vec![100.0])
        .with_feature("Latency", vec![2.0])
        .with_feature("Throughput", vec![5.0])];

    let err = classifier.classify(&clusters).unwrap_err();
    assert_eq!(
        err,
        TieringError::MissingGlobalMedian {
            feature: "Throughput".to_string()
        }
    );
}

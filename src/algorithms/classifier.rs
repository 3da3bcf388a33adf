use crate::algorithms::features::build_feature_vector;
use crate::models::{ClusterId, KnownUserVector, UserTopicRow};
use nalgebra::DVector;

/// Cluster of the closest reference vector by Euclidean distance.
///
/// Scans `reference` in order and keeps the first strict minimum, so ties go
/// to the earliest loaded user. Reference vectors of a different length are
/// skipped.
pub fn nearest_cluster(reference: &[KnownUserVector], target: &[f64]) -> Option<ClusterId> {
    let target = DVector::from_column_slice(target);
    let mut best: Option<(ClusterId, f64)> = None;

    for known in reference {
        if known.vector.len() != target.len() {
            continue;
        }
        let distance = (DVector::from_column_slice(&known.vector) - &target).norm();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((known.cluster, distance)),
        }
    }

    best.map(|(cluster, _)| cluster)
}

pub fn predict_cluster(
    reference: &[KnownUserVector],
    columns: &[String],
    rows: &[UserTopicRow],
    rating: f64,
    default_cluster: ClusterId,
) -> ClusterId {
    let target = build_feature_vector(columns, rows, rating);
    nearest_cluster(reference, &target).unwrap_or(default_cluster)
}

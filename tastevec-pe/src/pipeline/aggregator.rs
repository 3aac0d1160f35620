//! Preference aggregation
//!
//! The dominant cluster is the non-noise cluster with the most members; on a
//! size tie the lowest cluster id wins. Its per-slot arithmetic mean is the
//! preference vector. An all-noise assignment is an error, never an
//! all-rows mean.

use tastevec_common::PreferenceVector;

use super::dbscan::ClusterAssignment;
use super::error::PipelineError;

/// Dominant cluster and its member rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DominantCluster {
    pub id: usize,
    pub members: Vec<usize>,
}

impl DominantCluster {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Select the largest non-noise cluster
pub fn dominant_cluster(assignment: &ClusterAssignment) -> Result<DominantCluster, PipelineError> {
    let mut best: Option<(usize, usize)> = None;
    for (id, size) in assignment.cluster_sizes().into_iter().enumerate() {
        if size > best.map_or(0, |(_, best_size)| best_size) {
            best = Some((id, size));
        }
    }

    let (id, _) = best.ok_or(PipelineError::NoDominantCluster {
        rows: assignment.len(),
    })?;

    Ok(DominantCluster {
        id,
        members: assignment.members(id),
    })
}

/// Per-column arithmetic mean of the selected rows
pub fn column_means(rows: &[Vec<f64>], members: &[usize]) -> Vec<f64> {
    let Some(&first) = members.first() else {
        return Vec::new();
    };
    let dim = rows[first].len();
    let count = members.len() as f64;

    let mut sums = vec![0.0; dim];
    for &idx in members {
        for (sum, value) in sums.iter_mut().zip(rows[idx].iter()) {
            *sum += value;
        }
    }
    sums.into_iter().map(|sum| sum / count).collect()
}

/// Build the preference vector from the dominant cluster
pub fn aggregate(
    rows: &[Vec<f64>],
    assignment: &ClusterAssignment,
) -> Result<(PreferenceVector, DominantCluster), PipelineError> {
    let dominant = dominant_cluster(assignment)?;
    let means = column_means(rows, &dominant.members);
    Ok((PreferenceVector::from_means(&means), dominant))
}

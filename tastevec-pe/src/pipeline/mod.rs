//! Preference estimation pipeline
//!
//! Turns a seed set of (track, provider response) pairs into one preference
//! vector. Stages run strictly in order, each consuming only the previous
//! stage's output:
//!
//! 1. [`normalizer`] - raw response to fixed-schema feature vector
//! 2. [`matrix`] - complete rows only, canonical row order
//! 3. [`radius`] - k-distance curve and elbow to pick epsilon
//! 4. [`dbscan`] - density clustering with the picked epsilon
//! 5. [`aggregator`] - mean of the dominant cluster
//!
//! The stages are pure and synchronous. Nothing is shared between runs.

pub mod aggregator;
pub mod dbscan;
pub mod error;
pub mod matrix;
pub mod normalizer;
pub mod radius;
pub mod raw;

pub use dbscan::{ClusterAssignment, Dbscan};
pub use error::{PipelineError, Stage};
pub use matrix::{ExcludedTrack, ExclusionReason, FeatureMatrix};
pub use raw::{MalformedFeatureData, RawFeatureResponse, RawSlotValue};

use serde::Serialize;
use tastevec_common::config::PipelineConfig;
use tastevec_common::{PreferenceVector, Track};
use tracing::{debug, info};

/// Summary of the dominant cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DominantClusterSummary {
    pub id: usize,
    pub size: usize,
    pub track_ids: Vec<String>,
}

/// A track left out of the matrix and why
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExclusionSummary {
    pub track_id: String,
    #[serde(flatten)]
    pub reason: ExclusionReason,
}

impl From<ExcludedTrack> for ExclusionSummary {
    fn from(excluded: ExcludedTrack) -> Self {
        Self {
            track_id: excluded.track.id,
            reason: excluded.reason,
        }
    }
}

/// How the preference vector was reached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub eps: f64,
    pub elbow_index: usize,
    pub k_distances: Vec<f64>,
    pub cluster_count: usize,
    pub dominant_cluster: DominantClusterSummary,
    pub noise_track_ids: Vec<String>,
    pub excluded: Vec<ExclusionSummary>,
}

/// Pipeline output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreferenceEstimate {
    #[serde(rename = "preference_vector")]
    pub preference: PreferenceVector,
    pub diagnostics: Diagnostics,
}

/// Check tunables before any data is touched
pub fn validate_config(config: &PipelineConfig) -> Result<(), PipelineError> {
    if config.k_neighbors == 0 {
        return Err(PipelineError::InvalidParameter {
            name: "k_neighbors",
            message: "must be at least 1",
        });
    }
    if config.min_pts == 0 {
        return Err(PipelineError::InvalidParameter {
            name: "min_pts",
            message: "must be at least 1",
        });
    }
    Ok(())
}

/// Rows needed before radius estimation can start
pub fn required_rows(config: &PipelineConfig) -> usize {
    config.k_neighbors.max(config.min_pts) + 1
}

/// Run the full pipeline
///
/// All-or-nothing: either a complete estimate or a terminal error.
pub fn estimate_preference(
    inputs: Vec<(Track, RawFeatureResponse)>,
    config: &PipelineConfig,
) -> Result<PreferenceEstimate, PipelineError> {
    validate_config(config)?;
    if inputs.is_empty() {
        return Err(PipelineError::InvalidInput);
    }

    let vectors = inputs
        .into_iter()
        .map(|(track, response)| {
            let vector = normalizer::normalize(&response);
            (track, vector)
        })
        .collect();

    let matrix::MatrixBuild { matrix, excluded } = matrix::build_matrix(vectors)?;
    debug!(rows = matrix.len(), excluded = excluded.len(), "Feature matrix built");

    let required = required_rows(config);
    if matrix.len() < required {
        return Err(PipelineError::InsufficientData {
            stage: Stage::RadiusEstimation,
            usable: matrix.len(),
            required,
        });
    }

    let estimate = radius::estimate_radius(matrix.rows(), config.k_neighbors)?;
    debug!(
        eps = estimate.eps,
        elbow_index = estimate.elbow_index,
        "Neighborhood radius estimated"
    );

    let assignment = Dbscan::new(estimate.eps, config.min_pts).fit_predict(matrix.rows())?;
    debug!(
        clusters = assignment.n_clusters(),
        noise = assignment.noise_indices().len(),
        "Density clustering complete"
    );

    let (preference, dominant) = aggregator::aggregate(matrix.rows(), &assignment)?;

    let track_ids = |indices: &[usize]| -> Vec<String> {
        indices
            .iter()
            .map(|&idx| matrix.tracks()[idx].id.clone())
            .collect()
    };

    let diagnostics = Diagnostics {
        eps: estimate.eps,
        elbow_index: estimate.elbow_index,
        k_distances: estimate.k_distances,
        cluster_count: assignment.n_clusters(),
        dominant_cluster: DominantClusterSummary {
            id: dominant.id,
            size: dominant.size(),
            track_ids: track_ids(&dominant.members),
        },
        noise_track_ids: track_ids(&assignment.noise_indices()),
        excluded: excluded.into_iter().map(ExclusionSummary::from).collect(),
    };

    info!(
        eps = diagnostics.eps,
        clusters = diagnostics.cluster_count,
        dominant_size = diagnostics.dominant_cluster.size,
        "Preference vector estimated"
    );

    Ok(PreferenceEstimate {
        preference,
        diagnostics,
    })
}

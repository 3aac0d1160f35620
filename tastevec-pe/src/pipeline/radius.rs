//! Neighborhood radius estimation
//!
//! DBSCAN's epsilon is hard to set by hand. The usual remedy is a k-distance
//! plot: for every point take the distance to its k-th nearest neighbour,
//! sort those distances, and read epsilon off the "elbow" where the curve
//! bends sharply upward. Points left of the elbow sit in dense regions,
//! points right of it are sparse.
//!
//! ## Elbow criterion
//!
//! Both axes are normalised to [0, 1]. For an increasing convex curve the
//! chord from the first to the last point is `y = x`, and the perpendicular
//! distance of a point below it is proportional to `x - y`. The elbow is the
//! index maximising `x - y`.
//!
//! Tie-breaks:
//! - several indices share the maximum: the lowest index wins
//! - flat curve (first == last) or no point strictly below the chord: the
//!   last index is used

use serde::Serialize;

use super::error::{PipelineError, Stage};
use super::matrix::euclidean;

/// Selected radius plus the curve it was read from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadiusEstimate {
    pub eps: f64,
    pub elbow_index: usize,
    /// Sorted ascending
    pub k_distances: Vec<f64>,
}

/// Distance from every row to its k-th nearest other row, sorted ascending
///
/// Self-distance is excluded, so at least `k + 1` rows are required.
pub fn k_distances(rows: &[Vec<f64>], k: usize) -> Result<Vec<f64>, PipelineError> {
    if k == 0 {
        return Err(PipelineError::InvalidParameter {
            name: "k_neighbors",
            message: "must be at least 1",
        });
    }
    if rows.len() <= k {
        return Err(PipelineError::InsufficientData {
            stage: Stage::RadiusEstimation,
            usable: rows.len(),
            required: k + 1,
        });
    }

    let mut curve: Vec<f64> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut distances: Vec<f64> = rows
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, other)| euclidean(row, other))
                .collect();
            distances.sort_by(f64::total_cmp);
            distances[k - 1]
        })
        .collect();

    curve.sort_by(f64::total_cmp);
    Ok(curve)
}

/// Index of the elbow of an ascending curve
pub fn find_elbow(curve: &[f64]) -> usize {
    let n = curve.len();
    if n < 3 {
        return n.saturating_sub(1);
    }

    let first = curve[0];
    let span = curve[n - 1] - first;
    if span <= 0.0 {
        return n - 1;
    }

    let last_x = (n - 1) as f64;
    let mut best: Option<usize> = None;
    let mut best_gap = 0.0;
    for (i, &y) in curve.iter().enumerate() {
        let gap = i as f64 / last_x - (y - first) / span;
        if gap > best_gap {
            best_gap = gap;
            best = Some(i);
        }
    }

    best.unwrap_or(n - 1)
}

/// Estimate the clustering radius for `rows`
pub fn estimate_radius(rows: &[Vec<f64>], k: usize) -> Result<RadiusEstimate, PipelineError> {
    let k_distances = k_distances(rows, k)?;
    let elbow_index = find_elbow(&k_distances);
    Ok(RadiusEstimate {
        eps: k_distances[elbow_index],
        elbow_index,
        k_distances,
    })
}

//! Feature matrix construction
//!
//! Only complete rows enter the matrix. A track whose vector is entirely
//! missing is dropped; a track with any missing slot is excluded rather than
//! imputed, so no acoustic data is fabricated.
//!
//! Surviving rows are put in a canonical order (feature values under the IEEE
//! total order, then track id). Everything downstream, including cluster id
//! assignment and floating-point summation order, is therefore independent of
//! the order in which the caller listed the tracks.

use serde::Serialize;
use std::cmp::Ordering;
use tastevec_common::{FeatureVector, Track};
use tracing::debug;

use super::error::{PipelineError, Stage};

/// Why a track did not make it into the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum ExclusionReason {
    /// Every slot missing (provider failure or empty payload)
    AllMissing,
    /// Some slots missing
    PartiallyMissing { missing: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExcludedTrack {
    pub track: Track,
    pub reason: ExclusionReason,
}

/// Complete numeric rows, each tagged with its originating track
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    rows: Vec<Vec<f64>>,
    tracks: Vec<Track>,
}

impl FeatureMatrix {
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Result of matrix construction
#[derive(Debug, Clone)]
pub struct MatrixBuild {
    pub matrix: FeatureMatrix,
    pub excluded: Vec<ExcludedTrack>,
}

/// Assemble per-track vectors into a [`FeatureMatrix`]
///
/// Fails with `InsufficientData` when no complete row survives.
pub fn build_matrix(pairs: Vec<(Track, FeatureVector)>) -> Result<MatrixBuild, PipelineError> {
    let mut kept: Vec<(Track, Vec<f64>)> = Vec::with_capacity(pairs.len());
    let mut excluded = Vec::new();

    for (track, vector) in pairs {
        if vector.is_all_missing() {
            debug!(track_id = %track.id, "Dropping track with no usable features");
            excluded.push(ExcludedTrack {
                track,
                reason: ExclusionReason::AllMissing,
            });
            continue;
        }

        match vector.to_dense() {
            Some(row) => kept.push((track, row)),
            None => {
                let missing = vector.missing_count();
                debug!(track_id = %track.id, missing, "Excluding track with partial features");
                excluded.push(ExcludedTrack {
                    track,
                    reason: ExclusionReason::PartiallyMissing { missing },
                });
            }
        }
    }

    if kept.is_empty() {
        return Err(PipelineError::InsufficientData {
            stage: Stage::MatrixBuild,
            usable: 0,
            required: 1,
        });
    }

    kept.sort_by(|(ta, ra), (tb, rb)| compare_rows(ra, rb).then_with(|| ta.id.cmp(&tb.id)));

    let (tracks, rows): (Vec<Track>, Vec<Vec<f64>>) = kept.into_iter().unzip();
    Ok(MatrixBuild {
        matrix: FeatureMatrix { rows, tracks },
        excluded,
    })
}

fn compare_rows(a: &[f64], b: &[f64]) -> Ordering {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| x.total_cmp(y))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Reject rows a distance computation cannot handle
pub fn validate_rows(rows: &[Vec<f64>]) -> Result<(), PipelineError> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    let expected = first.len();

    for (row_idx, row) in rows.iter().enumerate() {
        if row.len() != expected {
            return Err(PipelineError::DimensionMismatch {
                expected,
                found: row.len(),
            });
        }
        if let Some(column) = row.iter().position(|v| !v.is_finite()) {
            return Err(PipelineError::NonFiniteValue {
                row: row_idx,
                column,
            });
        }
    }
    Ok(())
}

/// Euclidean distance, all dimensions equally weighted
#[inline]
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tastevec_common::features::FEATURE_DIM;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            name: format!("Song {}", id),
            artist: "Artist".to_string(),
            image: "/default-cover.jpg".to_string(),
        }
    }

    fn dense(v: f64) -> FeatureVector {
        FeatureVector::from_dense([v; FEATURE_DIM])
    }

    #[test]
    fn test_drops_all_missing_and_partial_rows() {
        let mut partial = [Some(0.3); FEATURE_DIM];
        partial[5] = None;

        let build = build_matrix(vec![
            (track("a"), dense(0.1)),
            (track("b"), FeatureVector::all_missing()),
            (track("c"), FeatureVector::new(partial)),
            (track("d"), dense(0.2)),
        ])
        .unwrap();

        assert_eq!(build.matrix.len(), 2);
        assert_eq!(build.excluded.len(), 2);
        assert_eq!(build.excluded[0].track.id, "b");
        assert_eq!(build.excluded[0].reason, ExclusionReason::AllMissing);
        assert_eq!(
            build.excluded[1].reason,
            ExclusionReason::PartiallyMissing { missing: 1 }
        );
        assert!(build.matrix.rows().iter().all(|r| r.len() == FEATURE_DIM));
    }

    #[test]
    fn test_no_surviving_rows_is_insufficient_data() {
        let result = build_matrix(vec![
            (track("a"), FeatureVector::all_missing()),
            (track("b"), FeatureVector::all_missing()),
        ]);

        assert_eq!(
            result.unwrap_err(),
            PipelineError::InsufficientData {
                stage: Stage::MatrixBuild,
                usable: 0,
                required: 1,
            }
        );
    }

    #[test]
    fn test_canonical_row_order() {
        let forward = build_matrix(vec![
            (track("x"), dense(0.9)),
            (track("y"), dense(0.1)),
            (track("z"), dense(0.5)),
        ])
        .unwrap();
        let backward = build_matrix(vec![
            (track("z"), dense(0.5)),
            (track("y"), dense(0.1)),
            (track("x"), dense(0.9)),
        ])
        .unwrap();

        assert_eq!(forward.matrix, backward.matrix);
        let ids: Vec<_> = forward.matrix.tracks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["y", "z", "x"]);
    }

    #[test]
    fn test_validate_rows() {
        assert!(validate_rows(&[vec![0.0, 1.0], vec![2.0, 3.0]]).is_ok());
        assert_eq!(
            validate_rows(&[vec![0.0, 1.0], vec![2.0]]),
            Err(PipelineError::DimensionMismatch {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            validate_rows(&[vec![0.0, 1.0], vec![2.0, f64::NAN]]),
            Err(PipelineError::NonFiniteValue { row: 1, column: 1 })
        );
    }

    #[test]
    fn test_euclidean() {
        assert_eq!(euclidean(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(euclidean(&[1.0, 1.0], &[1.0, 1.0]), 0.0);
    }
}

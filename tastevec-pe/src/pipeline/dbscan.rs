//! DBSCAN: Density-Based Spatial Clustering of Applications with Noise.
//!
//! # The Algorithm (Ester et al., 1996)
//!
//! - **Epsilon (ε)**: Maximum distance between two points to be neighbors.
//! - **MinPts**: Minimum neighbors within ε, counting the point itself, for a
//!   point to be "core".
//! - **Border point**: Within ε of a core point but not core itself.
//! - **Noise point**: Not reachable from any core point.
//!
//! For each unvisited point P in row order: find neighbors within ε. If there
//! are too few, mark P as noise (it may be promoted to border later);
//! otherwise start a new cluster and expand it through every reachable core
//! point.
//!
//! Cluster ids are assigned in the order their first core point is met, so
//! labels are a deterministic function of (row order, ε, MinPts).
//!
//! ## Complexity
//!
//! O(n²) distance evaluations; seed sets are small.

use super::error::PipelineError;
use super::matrix::{euclidean, validate_rows};

// Internal label encoding.
// - UNCLASSIFIED: never assigned yet
// - NOISE_LABEL: visited, but not density-reachable from any core point (may be promoted later)
const UNCLASSIFIED: i32 = -2;
const NOISE_LABEL: i32 = -1;

/// Cluster label per matrix row; `None` is noise
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
    labels: Vec<Option<usize>>,
    n_clusters: usize,
}

impl ClusterAssignment {
    pub fn new(labels: Vec<Option<usize>>) -> Self {
        let n_clusters = labels.iter().flatten().max().map_or(0, |&max| max + 1);
        Self { labels, n_clusters }
    }

    pub fn labels(&self) -> &[Option<usize>] {
        &self.labels
    }

    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Member count for each cluster id
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_clusters];
        for id in self.labels.iter().flatten() {
            sizes[*id] += 1;
        }
        sizes
    }

    /// Row indices belonging to `cluster_id`
    pub fn members(&self, cluster_id: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, label)| **label == Some(cluster_id))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn noise_indices(&self) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.is_none())
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// DBSCAN clustering algorithm.
#[derive(Debug, Clone)]
pub struct Dbscan {
    /// Epsilon: maximum distance for neighborhood.
    epsilon: f64,
    /// Minimum points for core point classification.
    min_pts: usize,
}

impl Dbscan {
    /// Create a new DBSCAN clusterer.
    ///
    /// `epsilon` may be zero, in which case only identical rows are neighbors.
    pub fn new(epsilon: f64, min_pts: usize) -> Self {
        Self { epsilon, min_pts }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn min_pts(&self) -> usize {
        self.min_pts
    }

    /// Find all neighbors within epsilon (excluding the point itself).
    fn region_query(&self, data: &[Vec<f64>], point_idx: usize) -> Vec<usize> {
        let point = &data[point_idx];
        data.iter()
            .enumerate()
            .filter(|(idx, other)| *idx != point_idx && euclidean(point, other) <= self.epsilon)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Expand cluster from a core point.
    fn expand_cluster(
        &self,
        data: &[Vec<f64>],
        point_idx: usize,
        neighbors: &[usize],
        labels: &mut [i32],
        cluster_id: i32,
        visited: &mut [bool],
    ) {
        labels[point_idx] = cluster_id;

        let mut to_process: Vec<usize> = neighbors.to_vec();

        while let Some(neighbor_idx) = to_process.pop() {
            // A point previously labeled noise can still become a border
            // point, so assign before the visited check.
            if labels[neighbor_idx] == UNCLASSIFIED || labels[neighbor_idx] == NOISE_LABEL {
                labels[neighbor_idx] = cluster_id;
            }

            if visited[neighbor_idx] {
                continue;
            }
            visited[neighbor_idx] = true;

            let neighbor_neighbors = self.region_query(data, neighbor_idx);

            // MinPts includes the point itself
            if neighbor_neighbors.len() + 1 >= self.min_pts {
                for nn in neighbor_neighbors {
                    if !visited[nn] {
                        to_process.push(nn);
                    }
                }
            }
        }
    }

    /// Label every row with a cluster id or noise.
    pub fn fit_predict(&self, data: &[Vec<f64>]) -> Result<ClusterAssignment, PipelineError> {
        let n = data.len();
        if n == 0 {
            return Err(PipelineError::InvalidInput);
        }

        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(PipelineError::InvalidParameter {
                name: "epsilon",
                message: "must be finite and non-negative",
            });
        }

        if self.min_pts == 0 {
            return Err(PipelineError::InvalidParameter {
                name: "min_pts",
                message: "must be at least 1",
            });
        }

        validate_rows(data)?;

        let mut labels = vec![UNCLASSIFIED; n];
        let mut visited = vec![false; n];
        let mut cluster_id: i32 = 0;

        for point_idx in 0..n {
            if visited[point_idx] {
                continue;
            }
            visited[point_idx] = true;

            let neighbors = self.region_query(data, point_idx);

            if neighbors.len() + 1 < self.min_pts {
                labels[point_idx] = NOISE_LABEL;
                continue;
            }

            self.expand_cluster(
                data,
                point_idx,
                &neighbors,
                &mut labels,
                cluster_id,
                &mut visited,
            );
            cluster_id += 1;
        }

        Ok(ClusterAssignment::new(
            labels
                .into_iter()
                .map(|l| if l >= 0 { Some(l as usize) } else { None })
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dbscan_two_clusters() {
        let data = vec![
            // Cluster 1: around (0, 0)
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![0.0, 0.1],
            vec![0.1, 0.1],
            vec![0.05, 0.05],
            // Cluster 2: around (5, 5)
            vec![5.0, 5.0],
            vec![5.1, 5.0],
            vec![5.0, 5.1],
            vec![5.1, 5.1],
            vec![5.05, 5.05],
        ];

        let assignment = Dbscan::new(0.3, 3).fit_predict(&data).unwrap();
        let labels = assignment.labels();

        assert_eq!(labels.len(), 10);
        assert_eq!(assignment.n_clusters(), 2);
        assert!(labels[..5].iter().all(|l| *l == Some(0)));
        assert!(labels[5..].iter().all(|l| *l == Some(1)));
        assert_eq!(assignment.cluster_sizes(), vec![5, 5]);
    }

    #[test]
    fn test_dbscan_with_noise() {
        let data = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![0.0, 0.1],
            vec![0.1, 0.1],
            // Outlier
            vec![100.0, 100.0],
            vec![5.0, 5.0],
            vec![5.1, 5.0],
            vec![5.0, 5.1],
            vec![5.1, 5.1],
        ];

        let assignment = Dbscan::new(0.3, 3).fit_predict(&data).unwrap();

        assert_eq!(assignment.noise_indices(), vec![4]);
        assert_eq!(assignment.members(0), vec![0, 1, 2, 3]);
        assert_eq!(assignment.members(1), vec![5, 6, 7, 8]);
    }

    #[test]
    fn test_dbscan_all_noise() {
        let data = vec![
            vec![0.0, 0.0],
            vec![10.0, 0.0],
            vec![0.0, 10.0],
            vec![10.0, 10.0],
        ];

        let assignment = Dbscan::new(0.5, 2).fit_predict(&data).unwrap();
        assert_eq!(assignment.n_clusters(), 0);
        assert!(assignment.labels().iter().all(Option::is_none));
    }

    #[test]
    fn test_dbscan_border_point_promoted_from_noise() {
        // Point 0 is visited first and has too few neighbors, but it is
        // within eps of core point 1 and must end up as a border point.
        let data = vec![vec![0.0], vec![1.0], vec![1.5], vec![2.0]];

        let assignment = Dbscan::new(1.0, 3).fit_predict(&data).unwrap();
        assert_eq!(assignment.labels(), &[Some(0), Some(0), Some(0), Some(0)]);
    }

    #[test]
    fn test_dbscan_zero_eps_groups_identical_rows() {
        let data = vec![vec![0.2, 0.2], vec![0.2, 0.2], vec![0.9, 0.9]];

        let assignment = Dbscan::new(0.0, 2).fit_predict(&data).unwrap();
        assert_eq!(assignment.labels(), &[Some(0), Some(0), None]);
    }

    #[test]
    fn test_dbscan_chain() {
        let data: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64 * 0.3, 0.0]).collect();

        let assignment = Dbscan::new(0.5, 2).fit_predict(&data).unwrap();
        assert!(assignment.labels().iter().all(|l| *l == Some(0)));
    }

    #[test]
    fn test_dbscan_empty() {
        let data: Vec<Vec<f64>> = vec![];
        assert_eq!(
            Dbscan::new(0.5, 3).fit_predict(&data),
            Err(PipelineError::InvalidInput)
        );
    }

    #[test]
    fn test_dbscan_invalid_params() {
        let data = vec![vec![0.0, 0.0]];

        assert!(Dbscan::new(-1.0, 3).fit_predict(&data).is_err());
        assert!(Dbscan::new(f64::NAN, 3).fit_predict(&data).is_err());
        assert!(Dbscan::new(0.5, 0).fit_predict(&data).is_err());
    }

    #[test]
    fn test_dbscan_rejects_malformed_rows() {
        let ragged = vec![vec![0.0, 0.0], vec![1.0]];
        assert!(matches!(
            Dbscan::new(0.5, 2).fit_predict(&ragged),
            Err(PipelineError::DimensionMismatch { .. })
        ));

        let nan = vec![vec![0.0, f64::NAN], vec![1.0, 1.0]];
        assert!(matches!(
            Dbscan::new(0.5, 2).fit_predict(&nan),
            Err(PipelineError::NonFiniteValue { .. })
        ));
    }
}

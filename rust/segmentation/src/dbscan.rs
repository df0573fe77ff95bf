// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Density-based clustering (DBSCAN)
//!
//! Points are grouped by density reachability: a point with at least
//! `min_points` neighbors (itself included) within `eps` is a core point,
//! and clusters grow from core points through their neighborhoods.
//! Sparse points end up as noise.
//!
//! Labels are opaque and local to one invocation; clusters found in
//! different grid cells must never be compared by label, only through the
//! explicit centroid merge pass.

use std::collections::VecDeque;

use kiddo::{ImmutableKdTree, SquaredEuclidean};
use nalgebra::Point3;

/// Noise label.
pub const NOISE: i32 = -1;

const UNVISITED: i32 = -2;

/// Result of one DBSCAN invocation.
#[derive(Debug, Clone)]
pub struct Clustering {
    /// Per-point label: `0..cluster_count` or [`NOISE`].
    pub labels: Vec<i32>,
    pub cluster_count: usize,
}

impl Clustering {
    /// Member indices per cluster, dropping clusters smaller than
    /// `min_size`. Noise is never returned.
    pub fn clusters(&self, min_size: usize) -> Vec<Vec<u32>> {
        let mut groups: Vec<Vec<u32>> = vec![Vec::new(); self.cluster_count];
        for (i, &label) in self.labels.iter().enumerate() {
            if label >= 0 {
                groups[label as usize].push(i as u32);
            }
        }
        groups.retain(|g| g.len() >= min_size);
        groups
    }
}

/// Run DBSCAN over `points` with radius `eps` and core threshold
/// `min_points` (the neighborhood count includes the point itself).
pub fn dbscan(points: &[Point3<f64>], eps: f64, min_points: usize) -> Clustering {
    let n = points.len();
    let mut labels = vec![UNVISITED; n];

    if n == 0 {
        return Clustering {
            labels,
            cluster_count: 0,
        };
    }

    // Bulk-built immutable tree: the bucketed mutable tree rejects inputs
    // where more than a bucket's worth of points share one coordinate,
    // and flat roofs put every point at the same height.
    let entries: Vec<[f64; 3]> = points.iter().map(|p| [p.x, p.y, p.z]).collect();
    let tree: ImmutableKdTree<f64, 3> = ImmutableKdTree::new_from_slice(&entries);
    let eps_sq = eps * eps;

    let neighbors = |i: usize| -> Vec<u32> {
        let p = &points[i];
        tree.within_unsorted::<SquaredEuclidean>(&[p.x, p.y, p.z], eps_sq)
            .into_iter()
            .map(|nn| nn.item as u32)
            .collect()
    };

    let mut cluster = 0i32;
    let mut queue = VecDeque::new();

    for i in 0..n {
        if labels[i] != UNVISITED {
            continue;
        }

        let seed = neighbors(i);
        if seed.len() < min_points {
            labels[i] = NOISE;
            continue;
        }

        labels[i] = cluster;
        queue.extend(seed);

        while let Some(j) = queue.pop_front() {
            let j = j as usize;
            if labels[j] == NOISE {
                // Border point: reachable from a core point but not core
                // itself. Claim it without expanding.
                labels[j] = cluster;
                continue;
            }
            if labels[j] != UNVISITED {
                continue;
            }
            labels[j] = cluster;

            let reach = neighbors(j);
            if reach.len() >= min_points {
                queue.extend(reach);
            }
        }

        cluster += 1;
    }

    Clustering {
        labels,
        cluster_count: cluster as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(center: Point3<f64>, side: usize, spacing: f64) -> Vec<Point3<f64>> {
        let mut points = Vec::new();
        for i in 0..side {
            for j in 0..side {
                points.push(Point3::new(
                    center.x + i as f64 * spacing,
                    center.y + j as f64 * spacing,
                    center.z,
                ));
            }
        }
        points
    }

    #[test]
    fn test_two_separated_blobs() {
        let mut points = blob(Point3::new(0.0, 0.0, 0.0), 8, 1.0);
        points.extend(blob(Point3::new(100.0, 0.0, 0.0), 8, 1.0));

        let clustering = dbscan(&points, 2.0, 4);
        assert_eq!(clustering.cluster_count, 2);
        assert!(clustering.labels.iter().all(|&l| l != NOISE));
        // Blob membership matches the input halves.
        let first = clustering.labels[0];
        assert!(clustering.labels[..64].iter().all(|&l| l == first));
        assert!(clustering.labels[64..].iter().all(|&l| l != first));
    }

    #[test]
    fn test_flat_roof_lattice_is_one_cluster() {
        // 1600 points all at the same height, 40 per row sharing x and
        // 40 per column sharing y. Duplicate-heavy axes must cluster
        // normally, not crash the tree build.
        let points = blob(Point3::new(0.0, 0.0, 10.0), 40, 0.5);
        let clustering = dbscan(&points, 2.0, 4);
        assert_eq!(clustering.cluster_count, 1);
        assert!(clustering.labels.iter().all(|&l| l == 0));
    }

    #[test]
    fn test_isolated_points_are_noise() {
        let mut points = blob(Point3::new(0.0, 0.0, 0.0), 6, 1.0);
        points.push(Point3::new(500.0, 500.0, 0.0));
        points.push(Point3::new(-500.0, 300.0, 0.0));

        let clustering = dbscan(&points, 2.0, 4);
        assert_eq!(clustering.cluster_count, 1);
        assert_eq!(clustering.labels[36], NOISE);
        assert_eq!(clustering.labels[37], NOISE);
    }

    #[test]
    fn test_density_reachability_invariant() {
        // Every clustered point must be within eps of a core point of
        // its own cluster.
        let mut points = blob(Point3::new(0.0, 0.0, 0.0), 10, 1.5);
        points.extend(blob(Point3::new(60.0, 60.0, 0.0), 5, 1.5));

        let eps = 2.5;
        let min_points = 5;
        let clustering = dbscan(&points, eps, min_points);

        let count_within = |i: usize| {
            points
                .iter()
                .filter(|q| (points[i] - **q).norm() <= eps)
                .count()
        };

        for (i, &label) in clustering.labels.iter().enumerate() {
            if label == NOISE {
                continue;
            }
            let near_core = points.iter().enumerate().any(|(j, q)| {
                clustering.labels[j] == label
                    && (points[i] - *q).norm() <= eps
                    && count_within(j) >= min_points
            });
            assert!(near_core, "point {i} not density-reachable");
        }
    }

    #[test]
    fn test_min_size_filter_drops_small_clusters() {
        let mut points = blob(Point3::new(0.0, 0.0, 0.0), 6, 1.0); // 36 points
        points.extend(blob(Point3::new(200.0, 0.0, 0.0), 2, 1.0)); // 4 points

        let clustering = dbscan(&points, 2.0, 3);
        let clusters = clustering.clusters(10);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 36);
    }

    #[test]
    fn test_empty_input() {
        let clustering = dbscan(&[], 1.0, 3);
        assert_eq!(clustering.cluster_count, 0);
        assert!(clustering.clusters(1).is_empty());
    }
}

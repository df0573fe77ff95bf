// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-cell clustering
//!
//! Runs DBSCAN inside one grid cell. Cells above the point cap are
//! downsampled first; the clusters found on the reduced set are then
//! re-expanded to all original cell points near the cluster centroid,
//! because density clustering on a thinned sample systematically
//! under-counts the true cluster extent.

use nalgebra::Point3;
use tracing::warn;
use urbanmesh_core::ProcessingParams;

use crate::dbscan::dbscan;
use crate::downsample::downsample;

/// Cluster one grid cell.
///
/// `cell_indices` are indices into `points` (the full building-labeled
/// set); returned clusters are index sets into the same array. Clusters
/// below `params.min_points` are dropped.
pub fn cluster_cell(
    points: &[Point3<f64>],
    cell_indices: &[u32],
    params: &ProcessingParams,
) -> Vec<Vec<u32>> {
    let cell_points: Vec<Point3<f64>> = cell_indices
        .iter()
        .map(|&i| points[i as usize])
        .collect();

    if cell_points.len() <= params.max_points_per_cluster {
        let clustering = dbscan(&cell_points, params.eps, params.min_points);
        return clustering
            .clusters(params.min_points)
            .into_iter()
            .map(|local| local.iter().map(|&l| cell_indices[l as usize]).collect())
            .collect();
    }

    // Oversized cell: bound memory by clustering a voxel-reduced sample,
    // at the cost of cluster-boundary accuracy recovered below.
    warn!(
        cell_points = cell_points.len(),
        cap = params.max_points_per_cluster,
        "cell exceeds point cap, clustering downsampled set"
    );
    let reduced = downsample(&cell_points, params.max_points_per_cluster);
    let clustering = dbscan(&reduced.points, params.eps, params.min_points);

    let expansion_radius = params.expansion_radius();
    let mut clusters = Vec::new();

    for local in clustering.clusters(params.min_points) {
        // Centroid of the reduced members.
        let mut sum = nalgebra::Vector3::zeros();
        for &l in &local {
            sum += reduced.points[l as usize].coords;
        }
        let centroid = Point3::from(sum / local.len() as f64);

        // Re-expand onto the original cell points.
        let members: Vec<u32> = cell_indices
            .iter()
            .enumerate()
            .filter(|(j, _)| (cell_points[*j] - centroid).norm() < expansion_radius)
            .map(|(_, &global)| global)
            .collect();

        if members.len() >= params.min_points {
            clusters.push(members);
        }
    }

    clusters
}

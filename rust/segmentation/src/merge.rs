// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cross-cell cluster merging
//!
//! A building straddling a grid-cell boundary is found as several partial
//! clusters, one per cell. Their centroids sit within roughly the cell
//! size plus `eps` of each other, so a second DBSCAN pass over the
//! centroids with a widened radius and a neighbor floor of one reunites
//! the parts without loosening the boundary-sensitive radius used inside
//! the cells.

use nalgebra::{Point3, Vector3};
use tracing::info;

use crate::dbscan::dbscan;

/// Merge per-cell clusters whose centroids fall within `merge_radius`
/// of each other. Input and output clusters are index sets into
/// `points`; merged clusters below `min_points` are dropped.
///
/// This pass can only shrink the cluster count, never grow it.
pub fn merge_clusters(
    clusters: Vec<Vec<u32>>,
    points: &[Point3<f64>],
    merge_radius: f64,
    min_points: usize,
) -> Vec<Vec<u32>> {
    if clusters.len() <= 1 {
        return clusters
            .into_iter()
            .filter(|c| c.len() >= min_points)
            .collect();
    }

    let centroids: Vec<Point3<f64>> = clusters
        .iter()
        .map(|members| {
            let mut sum = Vector3::zeros();
            for &i in members {
                sum += points[i as usize].coords;
            }
            Point3::from(sum / members.len() as f64)
        })
        .collect();

    // min_points = 1: every centroid is core, so none are noise and each
    // merges with at least itself.
    let clustering = dbscan(&centroids, merge_radius, 1);

    let mut merged: Vec<Vec<u32>> = vec![Vec::new(); clustering.cluster_count];
    for (cluster_idx, members) in clusters.into_iter().enumerate() {
        let label = clustering.labels[cluster_idx];
        merged[label as usize].extend(members);
    }

    let before = merged.len();
    merged.retain(|m| m.len() >= min_points);
    info!(
        merged = merged.len(),
        groups = before,
        "cross-cell cluster merge"
    );

    merged
}

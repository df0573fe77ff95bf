// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Segmentation pipeline
//!
//! Orchestrates grid partitioning, per-cell clustering and the cross-cell
//! merge into a list of per-building point index sets. Cells share no
//! mutable state, so per-cell clustering fans out over a rayon pool; the
//! merge is the synchronization barrier behind it.

use nalgebra::Point3;
use rayon::prelude::*;
use tracing::info;
use urbanmesh_core::ProcessingParams;

use crate::cell::cluster_cell;
use crate::grid::SpatialGrid;
use crate::merge::merge_clusters;

/// Counters describing one segmentation run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentationStats {
    pub cells: usize,
    pub downsampled_cells: usize,
    pub clusters_before_merge: usize,
    pub buildings: usize,
}

/// Turns one building-labeled point set into per-building clusters.
#[derive(Debug, Clone)]
pub struct SegmentationPipeline {
    params: ProcessingParams,
}

impl SegmentationPipeline {
    pub fn new(params: ProcessingParams) -> Self {
        Self { params }
    }

    /// Segment `points` into building clusters (index sets into
    /// `points`), together with run statistics.
    pub fn segment(&self, points: &[Point3<f64>]) -> (Vec<Vec<u32>>, SegmentationStats) {
        let mut stats = SegmentationStats::default();
        if points.is_empty() {
            return (Vec::new(), stats);
        }

        info!(
            points = points.len(),
            eps = self.params.eps,
            min_points = self.params.min_points,
            grid_size = self.params.grid_size,
            "segmenting tile"
        );

        let grid = SpatialGrid::build(points, self.params.grid_size);
        stats.cells = grid.len();
        let cells = grid.sorted_cells();
        stats.downsampled_cells = cells
            .iter()
            .filter(|(_, indices)| indices.len() > self.params.max_points_per_cluster)
            .count();
        info!(cells = stats.cells, "spatial grid built");

        // Per-cell clustering is embarrassingly parallel: the point array
        // is shared read-only and every cell owns its own output.
        let per_cell: Vec<Vec<Vec<u32>>> = cells
            .par_iter()
            .map(|(_, indices)| cluster_cell(points, indices, &self.params))
            .collect();

        let clusters: Vec<Vec<u32>> = per_cell.into_iter().flatten().collect();
        stats.clusters_before_merge = clusters.len();
        info!(clusters = clusters.len(), "per-cell clustering done");

        let buildings = merge_clusters(
            clusters,
            points,
            self.params.merge_radius(),
            self.params.min_points,
        );
        stats.buildings = buildings.len();
        info!(buildings = buildings.len(), "segmentation done");

        (buildings, stats)
    }
}

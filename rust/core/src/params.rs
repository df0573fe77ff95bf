// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Processing parameters
//!
//! One flat record holding every tunable of the pipeline, serialized
//! alongside the run report so a result can always be traced back to the
//! parameters that produced it.

use serde::{Deserialize, Serialize};

/// Tunables for segmentation and reconstruction.
///
/// The clustering radius (`eps`) and minimum neighbor count (`min_points`)
/// are the sensitive pair: a larger radius over-merges adjacent buildings,
/// a smaller one fragments a single roof into pieces. Both are required
/// configuration, not hidden constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingParams {
    /// RANSAC inlier distance tolerance in meters.
    pub distance_threshold: f64,
    /// DBSCAN neighborhood radius in meters.
    pub eps: f64,
    /// DBSCAN minimum neighbor count; also the minimum building size.
    pub min_points: usize,
    /// Spatial grid cell size in meters.
    pub grid_size: f64,
    /// Per-cell point cap; larger cells are downsampled before clustering.
    pub max_points_per_cluster: usize,
    /// Multiplier on `eps` for re-expanding clusters found on downsampled
    /// data back onto the original points.
    pub expansion_radius_factor: f64,
    /// Multiplier on `eps` for the cross-cell centroid merge pass.
    /// Kept separate from `expansion_radius_factor`; both default to 2.0
    /// but serve different purposes.
    pub merge_radius_factor: f64,
    /// Maximum number of planes extracted per building.
    pub max_planes: usize,
    /// RANSAC trial budget per plane.
    pub ransac_trials: usize,
    /// Minimum inlier count for a plane to be accepted.
    pub min_plane_points: usize,
    /// Seed for the RANSAC sampler; fixed seed gives reproducible runs.
    pub ransac_seed: u64,
    /// Classification code treated as "building".
    pub building_class: u8,
}

impl Default for ProcessingParams {
    fn default() -> Self {
        Self {
            distance_threshold: 0.3,
            eps: 8.5,
            min_points: 100,
            grid_size: 100.0,
            max_points_per_cluster: 50_000,
            expansion_radius_factor: 2.0,
            merge_radius_factor: 2.0,
            max_planes: 6,
            ransac_trials: 1000,
            min_plane_points: 100,
            ransac_seed: 42,
            building_class: crate::point::BUILDING_CLASS,
        }
    }
}

impl ProcessingParams {
    /// Radius used to re-expand downsampled clusters.
    pub fn expansion_radius(&self) -> f64 {
        self.eps * self.expansion_radius_factor
    }

    /// Radius used for the cross-cell centroid merge.
    pub fn merge_radius(&self) -> f64 {
        self.eps * self.merge_radius_factor
    }
}

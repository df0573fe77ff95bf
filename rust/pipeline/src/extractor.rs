// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-tile building extraction
//!
//! Filters a decoded tile down to its building-class points, segments
//! them into per-building clusters, and reconstructs one building at a
//! time. A building's point buffer, plane set and mesh scratch space
//! live only for its own loop iteration; afterwards only the mesh and
//! metadata remain.

use nalgebra::Point3;
use tracing::info;
use urbanmesh_core::{
    compute_metadata, BuildingMetadata, ClassifiedPointSet, ProcessingParams,
};
use urbanmesh_reconstruction::{build_building_mesh, extract_planes, Mesh, RansacConfig};
use urbanmesh_segmentation::{SegmentationPipeline, SegmentationStats};

use crate::error::Result;

/// A finalized building: its mesh plus the derived metadata snapshot.
/// The raw points are already gone by the time this exists.
#[derive(Debug, Clone)]
pub struct Building {
    pub metadata: BuildingMetadata,
    pub mesh: Mesh,
}

/// Everything extracted from one tile.
#[derive(Debug)]
pub struct TileOutcome {
    pub buildings: Vec<Building>,
    pub segmentation: SegmentationStats,
    /// Points in the tile carrying the building class.
    pub building_points: usize,
}

/// Runs the full extraction for one tile at a time.
///
/// Building identifiers increase monotonically across every tile this
/// extractor processes.
#[derive(Debug)]
pub struct BuildingExtractor {
    params: ProcessingParams,
    segmentation: SegmentationPipeline,
    counter: usize,
}

impl BuildingExtractor {
    pub fn new(params: ProcessingParams) -> Self {
        let segmentation = SegmentationPipeline::new(params.clone());
        Self {
            params,
            segmentation,
            counter: 0,
        }
    }

    pub fn params(&self) -> &ProcessingParams {
        &self.params
    }

    /// Buildings finalized so far.
    pub fn buildings_extracted(&self) -> usize {
        self.counter
    }

    /// Extract all buildings from one decoded tile.
    pub fn process(&mut self, tile: &ClassifiedPointSet) -> Result<TileOutcome> {
        let candidates = tile.filter_class(self.params.building_class);
        if candidates.is_empty() {
            return Err(urbanmesh_core::Error::NoBuildingPoints {
                points_scanned: tile.len(),
            }
            .into());
        }
        info!(
            tile_points = tile.len(),
            building_points = candidates.len(),
            "tile filtered"
        );

        let (clusters, segmentation) = self.segmentation.segment(&candidates);

        let ransac = RansacConfig::from(&self.params);
        let mut buildings = Vec::with_capacity(clusters.len());

        for members in clusters {
            self.counter += 1;
            let id = format!("building_{:04}", self.counter);

            // Owned copy for this building only; dropped at the end of
            // the iteration along with the plane set.
            let points: Vec<Point3<f64>> = members
                .iter()
                .map(|&i| candidates[i as usize])
                .collect();

            let planes = extract_planes(&points, &ransac);
            let mesh = build_building_mesh(&points, &planes);
            let metadata = compute_metadata(id, &points, planes.len());

            info!(
                id = %metadata.id,
                points = metadata.num_points,
                planes = metadata.num_planes,
                vertices = mesh.vertex_count(),
                triangles = mesh.triangle_count(),
                "building reconstructed"
            );

            buildings.push(Building { metadata, mesh });
        }

        Ok(TileOutcome {
            buildings,
            segmentation,
            building_points: candidates.len(),
        })
    }
}

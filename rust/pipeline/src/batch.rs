// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch driver and run report
//!
//! Feeds a sequence of decoded tiles through one [`BuildingExtractor`],
//! skipping tiles with unusable input while keeping diagnostic counts,
//! and accumulates the cross-tile outputs: the metadata list, the merged
//! whole-run mesh and the JSON run report.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use urbanmesh_core::{BuildingMetadata, ClassifiedPointSet, Diagnostics, ProcessingParams};
use urbanmesh_reconstruction::Mesh;

use crate::error::Result;
use crate::extractor::{Building, BuildingExtractor};

/// Serializable summary of one run: per-building metadata plus the
/// parameters that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub buildings: Vec<BuildingMetadata>,
    pub total_buildings: usize,
    pub processing_params: ProcessingParams,
    pub diagnostics: Diagnostics,
}

impl RunReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Final outputs of a batch run.
#[derive(Debug)]
pub struct BatchOutput {
    /// All per-building meshes merged into one model.
    pub merged_mesh: Mesh,
    pub report: RunReport,
}

/// Accumulates results across tiles.
#[derive(Debug)]
pub struct Batch {
    extractor: BuildingExtractor,
    metadata: Vec<BuildingMetadata>,
    merged: Mesh,
    diagnostics: Diagnostics,
}

impl Batch {
    pub fn new(params: ProcessingParams) -> Self {
        Self {
            extractor: BuildingExtractor::new(params),
            metadata: Vec::new(),
            merged: Mesh::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    /// Process one tile, returning its buildings (meshes ready for
    /// export). Input errors are recorded in the diagnostics and
    /// reported back; the batch stays usable for the next tile.
    pub fn process_tile(&mut self, tile: &ClassifiedPointSet) -> Result<Vec<Building>> {
        self.diagnostics.tiles_scanned += 1;
        self.diagnostics.points_scanned += tile.len();

        let outcome = match self.extractor.process(tile) {
            Ok(outcome) => outcome,
            Err(e) if e.is_input() => {
                warn!(error = %e, "skipping tile");
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        self.diagnostics.building_points += outcome.building_points;
        self.diagnostics.buildings_found += outcome.buildings.len();

        for building in &outcome.buildings {
            self.merged.merge(&building.mesh);
            self.metadata.push(building.metadata.clone());
        }

        info!(
            buildings = outcome.buildings.len(),
            cells = outcome.segmentation.cells,
            "tile processed"
        );
        Ok(outcome.buildings)
    }

    /// Finish the run. Always yields a report; a run with no building
    /// candidates at all produces an empty model with its diagnostic
    /// counts intact.
    pub fn finish(self) -> BatchOutput {
        if self.diagnostics.buildings_found == 0 {
            error!(
                tiles = self.diagnostics.tiles_scanned,
                points = self.diagnostics.points_scanned,
                building_points = self.diagnostics.building_points,
                "no buildings found in any tile"
            );
        } else {
            info!(
                buildings = self.diagnostics.buildings_found,
                vertices = self.merged.vertex_count(),
                triangles = self.merged.triangle_count(),
                "batch finished"
            );
        }

        let params = self.extractor.params().clone();
        BatchOutput {
            merged_mesh: self.merged,
            report: RunReport {
                total_buildings: self.metadata.len(),
                buildings: self.metadata,
                processing_params: params,
                diagnostics: self.diagnostics,
            },
        }
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end scenarios over synthetic tiles.

use urbanmesh_core::{ClassifiedPointSet, ProcessingParams};
use urbanmesh_pipeline::{Batch, BuildingExtractor};
use urbanmesh_reconstruction::{extract_planes, RansacConfig};

/// `cols x rows` lattice of class-`class` points at height `z`.
fn lattice(
    origin: (f64, f64),
    cols: usize,
    rows: usize,
    spacing: f64,
    z: f64,
    class: u8,
) -> Vec<(f64, f64, f64, u8)> {
    let mut records = Vec::new();
    for i in 0..cols {
        for j in 0..rows {
            records.push((
                origin.0 + i as f64 * spacing,
                origin.1 + j as f64 * spacing,
                z,
                class,
            ));
        }
    }
    records
}

#[test]
fn scenario_two_separated_blobs_yield_two_buildings() {
    // 1000 points in two dense blobs with centroids 50 m apart.
    let mut records = lattice((0.0, 0.0), 25, 20, 1.0, 10.0, 6);
    records.extend(lattice((50.0, 0.0), 25, 20, 1.0, 10.0, 6));
    assert_eq!(records.len(), 1000);
    let tile = ClassifiedPointSet::from_records(&records).unwrap();

    let params = ProcessingParams {
        eps: 3.0,
        min_points: 10,
        min_plane_points: 50,
        ..Default::default()
    };
    let mut extractor = BuildingExtractor::new(params);

    let outcome = extractor.process(&tile).unwrap();
    assert_eq!(outcome.buildings.len(), 2);
    // No noise leaked into either building.
    let total: usize = outcome
        .buildings
        .iter()
        .map(|b| b.metadata.num_points)
        .sum();
    assert_eq!(total, 1000);
}

#[test]
fn scenario_building_split_across_grid_cells_reunites() {
    // One 20x20 m building straddling the corner of four 10 m grid
    // cells by construction.
    let records = lattice((0.25, 0.25), 40, 40, 0.5, 7.0, 6);
    let tile = ClassifiedPointSet::from_records(&records).unwrap();

    let params = ProcessingParams {
        eps: 8.5,
        min_points: 10,
        grid_size: 10.0,
        min_plane_points: 50,
        ..Default::default()
    };
    let mut extractor = BuildingExtractor::new(params);

    let outcome = extractor.process(&tile).unwrap();
    assert_eq!(outcome.segmentation.cells, 4);
    assert_eq!(outcome.segmentation.clusters_before_merge, 4);
    assert_eq!(outcome.buildings.len(), 1);
    assert_eq!(outcome.buildings[0].metadata.num_points, 1600);
}

#[test]
fn scenario_flat_roof_dominant_plane() {
    // 500-point flat roof with 1% off-plane noise: the first extracted
    // plane must capture at least 480 points.
    let mut records = lattice((0.0, 0.0), 25, 20, 1.0, 10.0, 6);
    for k in 0..5 {
        records.push((3.0 + k as f64 * 4.0, 5.0, 13.0, 6));
    }
    let tile = ClassifiedPointSet::from_records(&records).unwrap();

    let params = ProcessingParams {
        eps: 3.0,
        min_points: 10,
        distance_threshold: 0.3,
        min_plane_points: 100,
        ..Default::default()
    };

    // Plane-level assertion on the building's own points.
    let candidates = tile.filter_class(6);
    let planes = extract_planes(&candidates, &RansacConfig::from(&params));
    assert!(!planes.is_empty());
    assert!(
        planes[0].inliers.len() >= 480,
        "dominant plane has {} inliers",
        planes[0].inliers.len()
    );

    // And the pipeline carries it through to metadata.
    let mut extractor = BuildingExtractor::new(params);
    let outcome = extractor.process(&tile).unwrap();
    assert_eq!(outcome.buildings.len(), 1);
    assert!(outcome.buildings[0].metadata.num_planes >= 1);
}

#[test]
fn scenario_no_building_points_reports_and_continues() {
    // Ground-only tile: an input error with diagnostics, not a crash,
    // and the batch keeps going.
    let ground = lattice((0.0, 0.0), 20, 20, 1.0, 0.0, 2);
    let tile = ClassifiedPointSet::from_records(&ground).unwrap();

    let params = ProcessingParams {
        eps: 3.0,
        min_points: 10,
        min_plane_points: 50,
        ..Default::default()
    };
    let mut batch = Batch::new(params);

    let err = batch.process_tile(&tile).unwrap_err();
    assert!(err.is_input());

    let output = batch.finish();
    assert_eq!(output.report.total_buildings, 0);
    assert!(output.merged_mesh.is_empty());
    assert_eq!(output.report.diagnostics.tiles_scanned, 1);
    assert_eq!(output.report.diagnostics.points_scanned, 400);
    assert_eq!(output.report.diagnostics.building_points, 0);
    assert_eq!(output.report.diagnostics.buildings_found, 0);
}

#[test]
fn scenario_mixed_batch_produces_merged_model_and_report() {
    let params = ProcessingParams {
        eps: 3.0,
        min_points: 10,
        min_plane_points: 50,
        ..Default::default()
    };
    let mut batch = Batch::new(params);

    // Tile 1: two buildings. Tile 2: ground only (skipped). Tile 3: one.
    let mut records = lattice((0.0, 0.0), 20, 20, 1.0, 10.0, 6);
    records.extend(lattice((200.0, 0.0), 20, 20, 1.0, 14.0, 6));
    let tile1 = ClassifiedPointSet::from_records(&records).unwrap();
    let tile2 =
        ClassifiedPointSet::from_records(&lattice((0.0, 0.0), 10, 10, 1.0, 0.0, 2)).unwrap();
    let tile3 =
        ClassifiedPointSet::from_records(&lattice((900.0, 900.0), 20, 20, 1.0, 6.0, 6)).unwrap();

    assert_eq!(batch.process_tile(&tile1).unwrap().len(), 2);
    assert!(batch.process_tile(&tile2).is_err());
    assert_eq!(batch.process_tile(&tile3).unwrap().len(), 1);

    let output = batch.finish();
    assert_eq!(output.report.total_buildings, 3);
    assert_eq!(output.report.buildings[2].id, "building_0003");
    assert!(!output.merged_mesh.is_empty());

    // Merged model holds every per-building triangle.
    let vertex_count = output.merged_mesh.vertex_count() as u32;
    assert!(output.merged_mesh.indices.iter().all(|&i| i < vertex_count));

    let json = output.report.to_json().unwrap();
    assert!(json.contains("\"total_buildings\": 3"));
    assert!(json.contains("\"processing_params\""));
}

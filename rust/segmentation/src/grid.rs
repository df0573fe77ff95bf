// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D spatial grid partitioning
//!
//! Buckets point indices into fixed-size square cells over the XY
//! footprint so density clustering can run per cell instead of over the
//! whole tile. Sparse: only occupied cells are stored, the full
//! bounding-box grid is never materialized.

use nalgebra::Point3;
use rustc_hash::FxHashMap;

/// Grid cell key: `(floor(x/g), floor(y/g))`.
pub type CellKey = (i64, i64);

/// Sparse spatial grid over point indices.
///
/// Cell membership is a pure function of the coordinates and the cell
/// size; rebuilding the grid on the same input yields identical cells.
#[derive(Debug)]
pub struct SpatialGrid {
    cell_size: f64,
    cells: FxHashMap<CellKey, Vec<u32>>,
}

impl SpatialGrid {
    /// Partition `points` into cells of `cell_size` meters.
    pub fn build(points: &[Point3<f64>], cell_size: f64) -> Self {
        let mut cells: FxHashMap<CellKey, Vec<u32>> = FxHashMap::default();
        for (i, p) in points.iter().enumerate() {
            let key = Self::key_of(p, cell_size);
            cells.entry(key).or_default().push(i as u32);
        }
        Self { cell_size, cells }
    }

    /// Cell key a point falls into.
    pub fn key_of(p: &Point3<f64>, cell_size: f64) -> CellKey {
        (
            (p.x / cell_size).floor() as i64,
            (p.y / cell_size).floor() as i64,
        )
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid holds no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell size in meters.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Point indices of one cell, if occupied.
    pub fn cell(&self, key: CellKey) -> Option<&[u32]> {
        self.cells.get(&key).map(Vec::as_slice)
    }

    /// Occupied cells in deterministic (key-sorted) order.
    ///
    /// The hash map's iteration order is arbitrary; sorting keeps the
    /// downstream cluster ordering, and with it building numbering,
    /// stable across runs.
    pub fn sorted_cells(&self) -> Vec<(CellKey, &[u32])> {
        let mut cells: Vec<(CellKey, &[u32])> = self
            .cells
            .iter()
            .map(|(k, v)| (*k, v.as_slice()))
            .collect();
        cells.sort_by_key(|(k, _)| *k);
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<Point3<f64>> {
        vec![
            Point3::new(5.0, 5.0, 0.0),
            Point3::new(15.0, 5.0, 1.0),
            Point3::new(5.0, 15.0, 2.0),
            Point3::new(-3.0, 5.0, 0.0),
            Point3::new(5.1, 5.1, 9.0),
        ]
    }

    #[test]
    fn test_every_point_in_exactly_one_cell() {
        let points = sample_points();
        let grid = SpatialGrid::build(&points, 10.0);

        let mut seen = vec![0usize; points.len()];
        for (_, indices) in grid.sorted_cells() {
            for &i in indices {
                seen[i as usize] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_negative_coordinates_floor() {
        // floor(-3/10) = -1, not 0: negative coordinates get their own cell.
        let key = SpatialGrid::key_of(&Point3::new(-3.0, 5.0, 0.0), 10.0);
        assert_eq!(key, (-1, 0));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let points = sample_points();
        let a = SpatialGrid::build(&points, 10.0);
        let b = SpatialGrid::build(&points, 10.0);

        let cells_a: Vec<_> = a.sorted_cells();
        let cells_b: Vec<_> = b.sorted_cells();
        assert_eq!(cells_a.len(), cells_b.len());
        for ((ka, va), (kb, vb)) in cells_a.iter().zip(cells_b.iter()) {
            assert_eq!(ka, kb);
            assert_eq!(va, vb);
        }
    }

    #[test]
    fn test_small_footprint_degenerates_to_single_cell() {
        let points = vec![
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(3.0, 3.0, 0.0),
        ];
        let grid = SpatialGrid::build(&points, 100.0);
        assert_eq!(grid.len(), 1);
    }
}

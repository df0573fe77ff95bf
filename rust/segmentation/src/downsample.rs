// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Adaptive voxel downsampling
//!
//! Reduces an oversized point set to roughly a target cardinality while
//! preserving its spatial structure. Space is divided into voxels sized
//! from the cube root of the reduction ratio so the occupied-voxel count
//! lands near the target; one representative (the original point nearest
//! the voxel centroid) is kept per occupied voxel.

use kiddo::{ImmutableKdTree, SquaredEuclidean};
use nalgebra::{Point3, Vector3};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;
use urbanmesh_core::BoundingBox;

/// A reduced point set with a mapping back to the source points.
///
/// `source_indices[i]` is the index of the original point that
/// `points[i]` was taken from.
#[derive(Debug, Clone)]
pub struct Downsampled {
    pub points: Vec<Point3<f64>>,
    pub source_indices: Vec<u32>,
}

impl Downsampled {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Voxel-downsample `points` to approximately `target` points.
///
/// Identity pass-through when the input is already within the target.
/// Degenerate inputs (all points coincident) collapse to one point.
pub fn downsample(points: &[Point3<f64>], target: usize) -> Downsampled {
    if points.len() <= target {
        return Downsampled {
            points: points.to_vec(),
            source_indices: (0..points.len() as u32).collect(),
        };
    }

    let bbox = BoundingBox::of(points);
    let voxel_size = bbox.diagonal() / (target as f64).cbrt();

    if !voxel_size.is_finite() || voxel_size <= 0.0 {
        // Zero spatial extent: every point is the same point.
        return Downsampled {
            points: vec![points[0]],
            source_indices: vec![0],
        };
    }

    // Accumulate per-voxel centroids.
    let mut voxels: FxHashMap<(i64, i64, i64), (Vector3<f64>, usize)> = FxHashMap::default();
    for p in points {
        let key = (
            ((p.x - bbox.min[0]) / voxel_size).floor() as i64,
            ((p.y - bbox.min[1]) / voxel_size).floor() as i64,
            ((p.z - bbox.min[2]) / voxel_size).floor() as i64,
        );
        let entry = voxels.entry(key).or_insert((Vector3::zeros(), 0));
        entry.0 += p.coords;
        entry.1 += 1;
    }

    // Immutable tree, built in one shot; aerial tiles snapped to a grid
    // put far more than a tree bucket's worth of points on a shared
    // coordinate, which the mutable tree's add rejects.
    let entries: Vec<[f64; 3]> = points.iter().map(|p| [p.x, p.y, p.z]).collect();
    let tree: ImmutableKdTree<f64, 3> = ImmutableKdTree::new_from_slice(&entries);

    // One representative per voxel: the original point closest to the
    // voxel centroid. Two centroids can occasionally resolve to the same
    // original; keep one.
    let mut chosen: FxHashSet<u32> = FxHashSet::default();
    let mut reduced = Vec::with_capacity(voxels.len());
    let mut source_indices = Vec::with_capacity(voxels.len());

    let mut keys: Vec<_> = voxels.keys().copied().collect();
    keys.sort_unstable();
    for key in keys {
        let (sum, count) = voxels[&key];
        let centroid = sum / count as f64;
        let nearest = tree.nearest_one::<SquaredEuclidean>(&[centroid.x, centroid.y, centroid.z]);
        let idx = nearest.item as u32;
        if chosen.insert(idx) {
            reduced.push(points[idx as usize]);
            source_indices.push(idx);
        }
    }

    debug!(
        original = points.len(),
        reduced = reduced.len(),
        voxel_size,
        "voxel downsample"
    );

    Downsampled {
        points: reduced,
        source_indices,
    }
}

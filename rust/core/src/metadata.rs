// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building metadata
//!
//! Read-only snapshots derived from a building's point set once
//! reconstruction is done. The raw points are released afterwards, so
//! these records are the only per-building state that survives a run.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingBox {
    /// Compute the per-axis min/max of a non-empty point slice.
    pub fn of(points: &[Point3<f64>]) -> Self {
        let mut min = [f64::MAX; 3];
        let mut max = [f64::MIN; 3];
        for p in points {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        Self { min, max }
    }

    /// Length of the box diagonal.
    pub fn diagonal(&self) -> f64 {
        let dx = self.max[0] - self.min[0];
        let dy = self.max[1] - self.min[1];
        let dz = self.max[2] - self.min[2];
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Derived metadata for one extracted building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingMetadata {
    /// Sequential identifier, e.g. `building_0001`.
    pub id: String,
    pub num_points: usize,
    pub num_planes: usize,
    pub bbox_min: [f64; 3],
    pub bbox_max: [f64; 3],
    pub center: [f64; 3],
    /// Footprint area estimate: bounding-box extent of the points below
    /// the 20th height percentile. A coarse proxy for ground contact,
    /// not a true polygon area.
    pub area_m2: f64,
    pub height_m: f64,
}

/// Diagnostic counters reported even when no building is found.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub tiles_scanned: usize,
    pub points_scanned: usize,
    pub building_points: usize,
    pub buildings_found: usize,
}

/// Compute metadata for a finalized building. Pure function of the
/// building's points and its extracted plane count.
///
/// `points` must be non-empty; segmented buildings always carry at
/// least `min_points` members.
pub fn compute_metadata(
    id: String,
    points: &[Point3<f64>],
    num_planes: usize,
) -> BuildingMetadata {
    assert!(!points.is_empty(), "metadata requires a non-empty point set");
    let bbox = BoundingBox::of(points);
    let n = points.len() as f64;

    let mut center = [0.0f64; 3];
    for p in points {
        center[0] += p.x;
        center[1] += p.y;
        center[2] += p.z;
    }
    center[0] /= n;
    center[1] /= n;
    center[2] /= n;

    let area_m2 = footprint_area(points);
    let height_m = bbox.max[2] - bbox.min[2];

    BuildingMetadata {
        id,
        num_points: points.len(),
        num_planes,
        bbox_min: bbox.min,
        bbox_max: bbox.max,
        center,
        area_m2,
        height_m,
    }
}

/// Bounding-box area of the sub-20th-height-percentile points.
fn footprint_area(points: &[Point3<f64>]) -> f64 {
    let threshold = percentile_z(points, 0.2);

    let mut min_x = f64::MAX;
    let mut max_x = f64::MIN;
    let mut min_y = f64::MAX;
    let mut max_y = f64::MIN;
    let mut any = false;

    for p in points {
        if p.z < threshold {
            any = true;
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
    }

    if any {
        (max_x - min_x) * (max_y - min_y)
    } else {
        0.0
    }
}

/// Linear-interpolated height percentile, `q` in [0, 1].
fn percentile_z(points: &[Point3<f64>], q: f64) -> f64 {
    let mut zs: Vec<f64> = points.iter().map(|p| p.z).collect();
    zs.sort_by(|a, b| a.total_cmp(b));

    let rank = q * (zs.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        zs[lo]
    } else {
        let frac = rank - lo as f64;
        zs[lo] * (1.0 - frac) + zs[hi] * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bbox_and_height() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 5.0, 12.0),
            Point3::new(-2.0, 3.0, 4.0),
        ];
        let meta = compute_metadata("building_0001".into(), &points, 2);
        assert_eq!(meta.bbox_min, [-2.0, 0.0, 0.0]);
        assert_eq!(meta.bbox_max, [10.0, 5.0, 12.0]);
        assert_relative_eq!(meta.height_m, 12.0);
        assert_eq!(meta.num_planes, 2);
        assert_eq!(meta.num_points, 3);
    }

    #[test]
    fn test_centroid_is_mean() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 4.0, 6.0),
        ];
        let meta = compute_metadata("b".into(), &points, 0);
        assert_relative_eq!(meta.center[0], 1.0);
        assert_relative_eq!(meta.center[1], 2.0);
        assert_relative_eq!(meta.center[2], 3.0);
    }

    #[test]
    fn test_footprint_uses_low_points_only() {
        // Ground contact at the corners of a 10x10 footprint sits below
        // a dense band at z = 0, which pins the 20th percentile to 0.
        // Only the strictly-lower corners set the footprint; the 20x20
        // roof spread must not leak in.
        let mut points = vec![
            Point3::new(0.0, 0.0, -1.0),
            Point3::new(10.0, 0.0, -1.0),
            Point3::new(0.0, 10.0, -1.0),
            Point3::new(10.0, 10.0, -1.0),
        ];
        for i in 0..80 {
            let t = i as f64 / 79.0;
            points.push(Point3::new(t * 10.0, t * 10.0, 0.0));
        }
        for i in 0..20 {
            let t = i as f64 / 19.0;
            points.push(Point3::new(t * 20.0, t * 20.0, 15.0));
        }
        let meta = compute_metadata("b".into(), &points, 0);
        assert_relative_eq!(meta.area_m2, 100.0, epsilon = 1e-6);
    }

    #[test]
    #[should_panic(expected = "non-empty")]
    fn test_empty_point_set_rejected() {
        compute_metadata("b".into(), &[], 0);
    }

    #[test]
    fn test_flat_building_zero_footprint() {
        // All points at one height: nothing strictly below the percentile.
        let points = vec![Point3::new(0.0, 0.0, 5.0), Point3::new(1.0, 1.0, 5.0)];
        let meta = compute_metadata("b".into(), &points, 0);
        assert_eq!(meta.area_m2, 0.0);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Iterative RANSAC plane extraction
//!
//! Buildings scanned from the air are dominated by a handful of planar
//! surfaces (roof faces, occasionally walls). Each round fits one
//! candidate plane from many random 3-point samples, keeps the trial
//! with the most inliers, removes those inliers from the pool and
//! repeats, most-dominant surface first.

use nalgebra::{Point3, Vector3};
use tracing::debug;
use urbanmesh_core::ProcessingParams;

/// An extracted plane: unit-normal implicit equation plus the indices of
/// its inlier points in the building's point set.
#[derive(Debug, Clone)]
pub struct Plane {
    /// `(a, b, c, d)` of `ax + by + cz + d = 0`, with `(a, b, c)` a unit
    /// vector so distances are metric.
    pub coefficients: [f64; 4],
    pub inliers: Vec<u32>,
}

impl Plane {
    /// Fit the plane through three points. `None` if they are (nearly)
    /// collinear.
    pub fn from_three_points(
        p0: &Point3<f64>,
        p1: &Point3<f64>,
        p2: &Point3<f64>,
    ) -> Option<[f64; 4]> {
        let normal = (p1 - p0).cross(&(p2 - p0));
        let len = normal.norm();
        if len < 1e-10 {
            return None;
        }
        let n = normal / len;
        let d = -n.dot(&p0.coords);
        Some([n.x, n.y, n.z, d])
    }

    /// Unsigned point-to-plane distance.
    pub fn distance_to(&self, p: &Point3<f64>) -> f64 {
        let [a, b, c, d] = self.coefficients;
        (a * p.x + b * p.y + c * p.z + d).abs()
    }

    /// Plane normal.
    pub fn normal(&self) -> Vector3<f64> {
        let [a, b, c, _] = self.coefficients;
        Vector3::new(a, b, c)
    }
}

/// Tunables for the extraction loop.
#[derive(Debug, Clone)]
pub struct RansacConfig {
    /// Inlier distance tolerance in meters.
    pub distance_threshold: f64,
    /// Maximum planes extracted per building.
    pub max_planes: usize,
    /// Random 3-point trials per plane.
    pub trials: usize,
    /// Minimum inlier count for a plane to be accepted; also the floor
    /// for the remaining pool.
    pub min_inliers: usize,
    /// Sampler seed; a fixed seed makes reruns reproducible.
    pub seed: u64,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 0.3,
            max_planes: 6,
            trials: 1000,
            min_inliers: 100,
            seed: 42,
        }
    }
}

impl From<&ProcessingParams> for RansacConfig {
    fn from(params: &ProcessingParams) -> Self {
        Self {
            distance_threshold: params.distance_threshold,
            max_planes: params.max_planes,
            trials: params.ransac_trials,
            min_inliers: params.min_plane_points,
            seed: params.ransac_seed,
        }
    }
}

/// Linear congruential generator. Deterministic sampling keeps plane
/// extraction reproducible for a given seed without threading an RNG
/// through the public API.
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_mul(0x9E37_79B9_7F4A_7C15).wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state
    }

    /// Uniform-ish index in `[0, bound)`.
    fn next_index(&mut self, bound: usize) -> usize {
        ((self.next_u64() >> 24) % bound as u64) as usize
    }
}

/// Extract up to `config.max_planes` dominant planes from `points`.
///
/// Returned planes are ordered by non-increasing inlier count, and every
/// point belongs to at most one plane. Reruns with the same seed produce
/// the same result; across seeds only the dominance ranking is stable.
pub fn extract_planes(points: &[Point3<f64>], config: &RansacConfig) -> Vec<Plane> {
    let mut rng = Lcg::new(config.seed);
    let mut remaining: Vec<u32> = (0..points.len() as u32).collect();
    let mut planes = Vec::new();

    while planes.len() < config.max_planes && remaining.len() >= config.min_inliers {
        let mut best: Option<([f64; 4], usize)> = None;

        for _ in 0..config.trials {
            let i0 = remaining[rng.next_index(remaining.len())];
            let i1 = remaining[rng.next_index(remaining.len())];
            let i2 = remaining[rng.next_index(remaining.len())];
            if i0 == i1 || i0 == i2 || i1 == i2 {
                continue;
            }

            let candidate = match Plane::from_three_points(
                &points[i0 as usize],
                &points[i1 as usize],
                &points[i2 as usize],
            ) {
                Some(c) => c,
                None => continue,
            };

            let probe = Plane {
                coefficients: candidate,
                inliers: Vec::new(),
            };
            let count = remaining
                .iter()
                .filter(|&&i| probe.distance_to(&points[i as usize]) <= config.distance_threshold)
                .count();

            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((candidate, count));
            }
        }

        let (coefficients, count) = match best {
            Some(b) => b,
            None => break,
        };
        if count < config.min_inliers {
            break;
        }

        // Rebuild the winning membership once instead of storing inlier
        // lists for every trial.
        let probe = Plane {
            coefficients,
            inliers: Vec::new(),
        };
        let (inliers, rest): (Vec<u32>, Vec<u32>) = remaining
            .into_iter()
            .partition(|&i| probe.distance_to(&points[i as usize]) <= config.distance_threshold);

        debug!(
            plane = planes.len(),
            inliers = inliers.len(),
            remaining = rest.len(),
            "extracted plane"
        );

        planes.push(Plane {
            coefficients,
            inliers,
        });
        remaining = rest;
    }

    // RANSAC on a shrinking pool can occasionally rank a later plane
    // above an earlier one; sort so dominance order is a post-condition.
    planes.sort_by(|a, b| b.inliers.len().cmp(&a.inliers.len()));
    planes
}

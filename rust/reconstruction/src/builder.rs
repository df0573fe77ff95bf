// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh assembly with ordered fallback strategies
//!
//! Reconstruction degrades gracefully: a plane-face mesh when plane
//! extraction found enough structure, an extruded footprint hull when it
//! did not, an empty mesh when even that fails. The strategies are an
//! ordered list tried in sequence; a failure in one plane or one
//! strategy never aborts the building.

use nalgebra::{Point2, Point3};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::mesh::{local_shift, Mesh};
use crate::plane::Plane;
use crate::triangulation::{convex_hull_2d, project_to_plane, triangulate_polygon};

/// Vertex-dedup quantum for the cleanup pass, in meters.
const DEDUP_EPSILON: f64 = 1e-4;

/// Minimum usable planes for a plane-face mesh; below this the result
/// would be an unrecognizable sliver, so the hull fallback takes over.
const MIN_USABLE_PLANES: usize = 3;

/// One way of building a mesh from a building's points and planes.
pub trait MeshStrategy {
    fn name(&self) -> &'static str;
    fn build(&self, points: &[Point3<f64>], planes: &[Plane]) -> Result<Mesh>;
}

/// Triangulates the convex boundary of each plane's inliers in the
/// plane's own 2D frame and lifts the triangles back to 3D.
struct PlaneFaces;

impl MeshStrategy for PlaneFaces {
    fn name(&self) -> &'static str {
        "plane-faces"
    }

    fn build(&self, points: &[Point3<f64>], planes: &[Plane]) -> Result<Mesh> {
        let mut mesh = Mesh::with_shift(local_shift(points));
        let mut usable = 0;

        for plane in planes {
            if plane.inliers.len() < 3 {
                continue;
            }

            let inlier_points: Vec<Point3<f64>> = plane
                .inliers
                .iter()
                .map(|&i| points[i as usize])
                .collect();

            let (projected, _, _, _) = project_to_plane(&inlier_points, &plane.normal());
            let hull = convex_hull_2d(&projected);
            if hull.len() < 3 {
                debug!(inliers = plane.inliers.len(), "degenerate plane boundary, skipped");
                continue;
            }

            let boundary: Vec<Point2<f64>> = hull.iter().map(|&i| projected[i]).collect();
            let triangles = match triangulate_polygon(&boundary) {
                Ok(t) => t,
                Err(e) => {
                    // One bad plane degrades to a partial mesh.
                    warn!(error = %e, "plane triangulation failed, plane excluded");
                    continue;
                }
            };

            let base = mesh.vertex_count() as u32;
            for &i in &hull {
                mesh.add_vertex(inlier_points[i]);
            }
            for tri in triangles.chunks_exact(3) {
                mesh.add_triangle(
                    base + tri[0] as u32,
                    base + tri[1] as u32,
                    base + tri[2] as u32,
                );
            }
            usable += 1;
        }

        if usable < MIN_USABLE_PLANES {
            return Err(Error::NotEnoughPlanes {
                found: usable,
                needed: MIN_USABLE_PLANES,
            });
        }
        if mesh.is_empty() {
            return Err(Error::EmptyMesh("no plane produced triangles".into()));
        }
        Ok(mesh)
    }
}

/// Convex hull of the planimetric footprint extruded over the height
/// range: a closed prism with triangulated caps. The stand-in for a full
/// 3D hull; buildings are 2.5D, so the vertical prism is close while
/// staying robust.
struct FootprintHull;

impl MeshStrategy for FootprintHull {
    fn name(&self) -> &'static str {
        "footprint-hull"
    }

    fn build(&self, points: &[Point3<f64>], _planes: &[Plane]) -> Result<Mesh> {
        if points.len() < 3 {
            return Err(Error::DegenerateGeometry(format!(
                "{} points, need at least 3",
                points.len()
            )));
        }

        let footprint: Vec<Point2<f64>> =
            points.iter().map(|p| Point2::new(p.x, p.y)).collect();
        let hull = convex_hull_2d(&footprint);
        if hull.len() < 3 {
            return Err(Error::DegenerateGeometry(
                "collinear footprint".to_string(),
            ));
        }

        let min_z = points.iter().map(|p| p.z).fold(f64::MAX, f64::min);
        let max_z = points.iter().map(|p| p.z).fold(f64::MIN, f64::max);

        let n = hull.len();
        let mut mesh = Mesh::with_capacity(n * 2, n * 12);
        mesh.shift = local_shift(points);

        // Bottom ring then top ring, both in hull (CCW) order.
        for &i in &hull {
            mesh.add_vertex(Point3::new(footprint[i].x, footprint[i].y, min_z));
        }
        for &i in &hull {
            mesh.add_vertex(Point3::new(footprint[i].x, footprint[i].y, max_z));
        }

        let bottom = |k: usize| k as u32;
        let top = |k: usize| (n + k) as u32;

        // Walls: one quad per hull edge.
        for k in 0..n {
            let next = (k + 1) % n;
            mesh.add_triangle(bottom(k), bottom(next), top(next));
            mesh.add_triangle(bottom(k), top(next), top(k));
        }

        // Caps. The hull is convex, so the boundary fans cleanly.
        let cap: Vec<Point2<f64>> = hull.iter().map(|&i| footprint[i]).collect();
        let cap_triangles = triangulate_polygon(&cap)?;
        for tri in cap_triangles.chunks_exact(3) {
            // Top cap faces up (hull order is CCW seen from above).
            mesh.add_triangle(top(tri[0]), top(tri[1]), top(tri[2]));
            // Bottom cap faces down.
            mesh.add_triangle(bottom(tri[0]), bottom(tri[2]), bottom(tri[1]));
        }

        Ok(mesh)
    }
}

/// Build the final mesh for one building.
///
/// Tries each strategy in order and applies the cleanup pass (vertex
/// dedup, degenerate-triangle removal, vertex normals) to the first
/// success. Returns an empty mesh when every strategy fails; the caller
/// keeps the building's metadata regardless.
pub fn build_building_mesh(points: &[Point3<f64>], planes: &[Plane]) -> Mesh {
    let strategies: [&dyn MeshStrategy; 2] = [&PlaneFaces, &FootprintHull];

    for strategy in strategies {
        match strategy.build(points, planes) {
            Ok(mut mesh) => {
                mesh.dedup_vertices(DEDUP_EPSILON);
                mesh.remove_degenerate_triangles();
                if mesh.triangle_count() == 0 {
                    debug!(strategy = strategy.name(), "strategy left no triangles");
                    continue;
                }
                mesh.compute_normals();
                debug!(
                    strategy = strategy.name(),
                    vertices = mesh.vertex_count(),
                    triangles = mesh.triangle_count(),
                    "mesh built"
                );
                return mesh;
            }
            Err(e) => {
                debug!(strategy = strategy.name(), error = %e, "strategy failed");
            }
        }
    }

    warn!("all mesh strategies failed, emitting empty mesh");
    Mesh::new()
}

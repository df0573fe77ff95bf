// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Projection, hulls and polygon triangulation
//!
//! Planes extracted from a building are triangulated in their own 2D
//! frame: inliers are projected onto an orthonormal basis of the plane,
//! a boundary polygon is taken, triangulated, and the triangles lifted
//! back through the recorded 3D correspondence.

use nalgebra::{Point2, Point3, Vector3};

use crate::error::{Error, Result};

/// Check if a polygon is convex (all cross products have same sign)
#[inline]
fn is_convex(points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);

        if cross.abs() > 1e-10 {
            let current_sign = if cross > 0.0 { 1i8 } else { -1i8 };
            if sign == 0 {
                sign = current_sign;
            } else if sign != current_sign {
                return false;
            }
        }
    }

    true
}

/// Simple fan triangulation for convex polygons
#[inline]
fn fan_triangulate(n: usize) -> Vec<usize> {
    let mut indices = Vec::with_capacity((n - 2) * 3);
    for i in 1..n - 1 {
        indices.push(0);
        indices.push(i);
        indices.push(i + 1);
    }
    indices
}

/// Triangulate a simple polygon (no holes).
/// Returns triangle indices into the input points.
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    let n = points.len();

    if n < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    // FAST PATH: triangle and quad
    if n == 3 {
        return Ok(vec![0, 1, 2]);
    }
    if n == 4 {
        return Ok(vec![0, 1, 2, 0, 2, 3]);
    }

    // FAST PATH: convex boundary (the common case for hull polygons)
    if is_convex(points) {
        return Ok(fan_triangulate(n));
    }

    let mut vertices = Vec::with_capacity(n * 2);
    for p in points {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    let indices = earcutr::earcut(&vertices, &[], 2)
        .map_err(|e| Error::TriangulationError(format!("{:?}", e)))?;

    if indices.is_empty() {
        return Err(Error::TriangulationError(
            "Triangulation produced no triangles".to_string(),
        ));
    }

    Ok(indices)
}

/// Project 3D points onto the 2D frame of a plane with the given normal.
/// Returns the 2D points and the frame (u_axis, v_axis, origin).
pub fn project_to_plane(
    points_3d: &[Point3<f64>],
    normal: &Vector3<f64>,
) -> (Vec<Point2<f64>>, Vector3<f64>, Vector3<f64>, Point3<f64>) {
    if points_3d.is_empty() {
        return (
            Vec::new(),
            Vector3::zeros(),
            Vector3::zeros(),
            Point3::origin(),
        );
    }

    let origin = points_3d[0];

    // Orthonormal basis on the plane: cross against the axis least
    // parallel to the normal for a stable result.
    let abs_x = normal.x.abs();
    let abs_y = normal.y.abs();
    let abs_z = normal.z.abs();

    let reference = if abs_x <= abs_y && abs_x <= abs_z {
        Vector3::new(1.0, 0.0, 0.0)
    } else if abs_y <= abs_z {
        Vector3::new(0.0, 1.0, 0.0)
    } else {
        Vector3::new(0.0, 0.0, 1.0)
    };

    let u_axis = normal.cross(&reference).normalize();
    let v_axis = normal.cross(&u_axis).normalize();

    let points_2d = points_3d
        .iter()
        .map(|p| {
            let v = p - origin;
            Point2::new(v.dot(&u_axis), v.dot(&v_axis))
        })
        .collect();

    (points_2d, u_axis, v_axis, origin)
}

/// 2D convex hull (Andrew's monotone chain), counter-clockwise.
/// Returns indices into `points`; collinear boundary points are dropped.
pub fn convex_hull_2d(points: &[Point2<f64>]) -> Vec<usize> {
    let n = points.len();
    if n < 3 {
        return (0..n).collect();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        points[a]
            .x
            .total_cmp(&points[b].x)
            .then(points[a].y.total_cmp(&points[b].y))
    });
    order.dedup_by(|&mut a, &mut b| points[a] == points[b]);

    if order.len() < 3 {
        return order;
    }

    let cross = |o: usize, a: usize, b: usize| -> f64 {
        (points[a].x - points[o].x) * (points[b].y - points[o].y)
            - (points[a].y - points[o].y) * (points[b].x - points[o].x)
    };

    let mut hull: Vec<usize> = Vec::with_capacity(order.len() * 2);

    // Lower hull
    for &i in &order {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], i) <= 0.0 {
            hull.pop();
        }
        hull.push(i);
    }

    // Upper hull
    let lower_len = hull.len() + 1;
    for &i in order.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], i) <= 0.0
        {
            hull.pop();
        }
        hull.push(i);
    }

    hull.pop();
    hull
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangulate_square() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];

        let indices = triangulate_polygon(&points).unwrap();
        assert_eq!(indices.len(), 6);
    }

    #[test]
    fn test_triangulate_insufficient_points() {
        let points = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert!(triangulate_polygon(&points).is_err());
    }

    #[test]
    fn test_triangulate_convex_polygon_fan() {
        // Regular hexagon: convex fast path, 4 triangles.
        let points: Vec<Point2<f64>> = (0..6)
            .map(|i| {
                let a = i as f64 * std::f64::consts::TAU / 6.0;
                Point2::new(a.cos(), a.sin())
            })
            .collect();

        let indices = triangulate_polygon(&points).unwrap();
        assert_eq!(indices.len(), 12);
    }

    #[test]
    fn test_triangulate_concave_polygon() {
        // L-shape: must go through earcut, 4 triangles.
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ];

        let indices = triangulate_polygon(&points).unwrap();
        assert_eq!(indices.len() % 3, 0);
        assert_eq!(indices.len(), 12);
        assert!(indices.iter().all(|&i| i < points.len()));
    }

    #[test]
    fn test_project_horizontal_plane() {
        let points = vec![
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(1.0, 0.0, 5.0),
            Point3::new(1.0, 1.0, 5.0),
        ];
        let normal = Vector3::new(0.0, 0.0, 1.0);
        let (projected, u, v, _) = project_to_plane(&points, &normal);

        assert_eq!(projected.len(), 3);
        // Frame is orthonormal and in-plane.
        assert!((u.dot(&v)).abs() < 1e-10);
        assert!((u.norm() - 1.0).abs() < 1e-10);
        assert!(u.dot(&normal).abs() < 1e-10);
        // In-plane distances survive the projection.
        let d3 = (points[1] - points[0]).norm();
        let d2 = (projected[1] - projected[0]).norm();
        assert!((d3 - d2).abs() < 1e-10);
    }

    #[test]
    fn test_convex_hull_square_with_interior() {
        let mut points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 4.0),
            Point2::new(0.0, 4.0),
        ];
        // Interior points must not appear on the hull.
        points.push(Point2::new(2.0, 2.0));
        points.push(Point2::new(1.0, 3.0));

        let hull = convex_hull_2d(&points);
        assert_eq!(hull.len(), 4);
        assert!(hull.iter().all(|&i| i < 4));
    }

    #[test]
    fn test_convex_hull_is_ccw() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 1.0),
            Point2::new(2.0, 3.0),
            Point2::new(-1.0, 2.0),
            Point2::new(1.0, 1.5),
        ];
        let hull = convex_hull_2d(&points);
        assert!(hull.len() >= 3);

        // Signed area of the hull polygon must be positive.
        let mut area = 0.0;
        for k in 0..hull.len() {
            let a = points[hull[k]];
            let b = points[hull[(k + 1) % hull.len()]];
            area += a.x * b.y - b.x * a.y;
        }
        assert!(area > 0.0);
    }

    #[test]
    fn test_convex_hull_degenerate() {
        let points = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)];
        let hull = convex_hull_2d(&points);
        assert_eq!(hull.len(), 2);
    }
}

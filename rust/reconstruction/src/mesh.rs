// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;

/// Triangle mesh with flat vertex buffers, ready for export hand-off.
///
/// Positions are stored relative to `shift` so the f32 buffers keep
/// sub-millimeter precision at projected-CRS magnitudes (LV95 eastings
/// exceed 2,600,000 m, far past f32's exact integer range).
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Vertex positions (x, y, z), relative to `shift`
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
    /// World-space offset added back to every position.
    pub shift: Vector3<f64>,
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
            shift: Vector3::zeros(),
        }
    }
}

/// Whole-meter anchor for a point set, used as the mesh shift.
pub fn local_shift(points: &[Point3<f64>]) -> Vector3<f64> {
    let mut min = Vector3::new(f64::MAX, f64::MAX, f64::MAX);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        min.z = min.z.min(p.z);
    }
    if points.is_empty() {
        Vector3::zeros()
    } else {
        min.map(f64::floor)
    }
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mesh anchored at `shift`. Set the shift before
    /// adding vertices; changing it afterwards moves them.
    pub fn with_shift(shift: Vector3<f64>) -> Self {
        Self {
            shift,
            ..Self::default()
        }
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
            shift: Vector3::zeros(),
        }
    }

    /// Add a vertex given in world coordinates, returning its index.
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>) -> u32 {
        let index = self.vertex_count() as u32;
        self.positions.push((position.x - self.shift.x) as f32);
        self.positions.push((position.y - self.shift.y) as f32);
        self.positions.push((position.z - self.shift.z) as f32);
        index
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Vertex position in world coordinates.
    #[inline]
    pub fn position(&self, index: u32) -> Point3<f64> {
        Point3::from(self.relative(index).coords + self.shift)
    }

    /// Vertex position relative to the shift. Translation-invariant
    /// passes (areas, normals, dedup) work here to skip the add-back.
    #[inline]
    fn relative(&self, index: u32) -> Point3<f64> {
        let i = index as usize * 3;
        Point3::new(
            self.positions[i] as f64,
            self.positions[i + 1] as f64,
            self.positions[i + 2] as f64,
        )
    }

    /// Merge another mesh into this one, rebasing its vertices onto this
    /// mesh's shift. Buildings within one run sit close together, so the
    /// rebased offsets stay well inside f32 range.
    pub fn merge(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            self.shift = other.shift;
        }

        let vertex_offset = (self.positions.len() / 3) as u32;

        self.positions.reserve(other.positions.len());
        self.normals.reserve(other.normals.len());
        self.indices.reserve(other.indices.len());

        if other.shift == self.shift {
            self.positions.extend_from_slice(&other.positions);
        } else {
            let delta = other.shift - self.shift;
            for chunk in other.positions.chunks_exact(3) {
                self.positions.push((chunk[0] as f64 + delta.x) as f32);
                self.positions.push((chunk[1] as f64 + delta.y) as f32);
                self.positions.push((chunk[2] as f64 + delta.z) as f32);
            }
        }
        self.normals.extend_from_slice(&other.normals);
        self.indices
            .extend(other.indices.iter().map(|&i| i + vertex_offset));
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Collapse vertices with (quantized) equal coordinates and rewrite
    /// the index buffer. Normals are recomputed afterwards by the
    /// cleanup pass, so they are dropped here.
    pub fn dedup_vertices(&mut self, epsilon: f64) {
        let quantum = epsilon.max(1e-9);
        let mut remap = vec![0u32; self.vertex_count()];
        let mut lookup: FxHashMap<(i64, i64, i64), u32> = FxHashMap::default();
        let mut positions = Vec::with_capacity(self.positions.len());

        for v in 0..self.vertex_count() {
            let p = self.relative(v as u32);
            let key = (
                (p.x / quantum).round() as i64,
                (p.y / quantum).round() as i64,
                (p.z / quantum).round() as i64,
            );
            let next = (positions.len() / 3) as u32;
            let index = *lookup.entry(key).or_insert_with(|| {
                positions.push(p.x as f32);
                positions.push(p.y as f32);
                positions.push(p.z as f32);
                next
            });
            remap[v] = index;
        }

        self.positions = positions;
        self.normals.clear();
        for i in &mut self.indices {
            *i = remap[*i as usize];
        }
    }

    /// Drop triangles with repeated indices or (near) zero area.
    pub fn remove_degenerate_triangles(&mut self) {
        let mut kept = Vec::with_capacity(self.indices.len());
        for tri in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0], tri[1], tri[2]);
            if i0 == i1 || i1 == i2 || i0 == i2 {
                continue;
            }
            let v0 = self.relative(i0);
            let v1 = self.relative(i1);
            let v2 = self.relative(i2);
            let area = (v1 - v0).cross(&(v2 - v0)).norm() * 0.5;
            if area < 1e-12 {
                continue;
            }
            kept.extend_from_slice(tri);
        }
        self.indices = kept;
    }

    /// Per-vertex normals by accumulating (area-weighted) face normals.
    pub fn compute_normals(&mut self) {
        let vertex_count = self.vertex_count();
        if vertex_count == 0 {
            self.normals.clear();
            return;
        }

        let mut normals = vec![Vector3::<f64>::zeros(); vertex_count];

        for tri in self.indices.chunks_exact(3) {
            let i0 = tri[0] as usize;
            let i1 = tri[1] as usize;
            let i2 = tri[2] as usize;

            let v0 = self.relative(tri[0]);
            let v1 = self.relative(tri[1]);
            let v2 = self.relative(tri[2]);

            // Cross-product length carries the face area, so larger faces
            // weigh more.
            let normal = (v1 - v0).cross(&(v2 - v0));

            normals[i0] += normal;
            normals[i1] += normal;
            normals[i2] += normal;
        }

        self.normals.clear();
        self.normals.reserve(vertex_count * 3);
        for n in normals {
            let len = n.norm();
            let n = if len > 1e-10 {
                n / len
            } else {
                Vector3::new(0.0, 0.0, 1.0)
            };
            self.normals.push(n.x as f32);
            self.normals.push(n.y as f32);
            self.normals.push(n.z as f32);
        }
    }

    /// World-space bounds (min, max) of the vertex positions.
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);

        self.positions.chunks_exact(3).for_each(|chunk| {
            let x = chunk[0] as f64 + self.shift.x;
            let y = chunk[1] as f64 + self.shift.y;
            let z = chunk[2] as f64 + self.shift.z;
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            min.z = min.z.min(z);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
            max.z = max.z.max(z);
        });

        (min, max)
    }
}

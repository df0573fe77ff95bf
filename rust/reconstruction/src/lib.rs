// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! urbanmesh reconstruction
//!
//! Turns a building's point cluster into a simplified triangle mesh:
//! iterative RANSAC plane extraction, per-plane boundary triangulation,
//! and an ordered chain of fallback strategies when plane fitting does
//! not yield enough structure.

pub mod builder;
pub mod error;
pub mod mesh;
pub mod plane;
pub mod triangulation;

pub use builder::{build_building_mesh, MeshStrategy};
pub use error::{Error, Result};
pub use mesh::Mesh;
pub use plane::{extract_planes, Plane, RansacConfig};
pub use triangulation::{convex_hull_2d, project_to_plane, triangulate_polygon};

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! urbanmesh core data model
//!
//! Shared types for the building-extraction pipeline: classified point
//! sets decoded from LiDAR tiles, processing parameters, per-building
//! metadata and diagnostic counters.

pub mod error;
pub mod metadata;
pub mod params;
pub mod point;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use error::{Error, Result};
pub use metadata::{compute_metadata, BoundingBox, BuildingMetadata, Diagnostics};
pub use params::ProcessingParams;
pub use point::{ClassifiedPointSet, BUILDING_CLASS};

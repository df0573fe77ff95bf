// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Classified point sets
//!
//! A tile is decoded upstream into a flat sequence of coordinates plus a
//! parallel sequence of ASPRS classification codes. The pipeline never
//! touches the file format; it receives the decoded arrays and owns them
//! for the duration of one tile.

use nalgebra::Point3;

use crate::error::{Error, Result};

/// ASPRS LAS classification code for building points.
pub const BUILDING_CLASS: u8 = 6;

/// One decoded tile: points with per-point classification codes.
///
/// Invariant: `points.len() == classes.len()`, enforced at construction.
#[derive(Debug, Clone)]
pub struct ClassifiedPointSet {
    points: Vec<Point3<f64>>,
    classes: Vec<u8>,
}

impl ClassifiedPointSet {
    /// Create a point set from parallel coordinate and class vectors.
    pub fn new(points: Vec<Point3<f64>>, classes: Vec<u8>) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptyPointSet);
        }
        if points.len() != classes.len() {
            return Err(Error::LengthMismatch {
                points: points.len(),
                classes: classes.len(),
            });
        }
        Ok(Self { points, classes })
    }

    /// Build from raw (x, y, z, class) records as handed over by a decoder.
    pub fn from_records(records: &[(f64, f64, f64, u8)]) -> Result<Self> {
        let points = records
            .iter()
            .map(|&(x, y, z, _)| Point3::new(x, y, z))
            .collect();
        let classes = records.iter().map(|&(_, _, _, c)| c).collect();
        Self::new(points, classes)
    }

    /// Number of points in the tile.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points, in decode order.
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Classification codes, parallel to `points()`.
    pub fn classes(&self) -> &[u8] {
        &self.classes
    }

    /// Extract the points carrying the given classification code.
    ///
    /// Returns an owned copy so the full tile can be dropped while the
    /// (much smaller) candidate set is processed.
    pub fn filter_class(&self, class: u8) -> Vec<Point3<f64>> {
        self.points
            .iter()
            .zip(self.classes.iter())
            .filter(|(_, &c)| c == class)
            .map(|(p, _)| *p)
            .collect()
    }
}

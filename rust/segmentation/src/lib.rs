// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! urbanmesh segmentation
//!
//! Memory-bounded segmentation of a building-labeled point set into
//! per-building point clusters: spatial grid partitioning, per-cell
//! density clustering (with adaptive voxel downsampling for oversized
//! cells), and cross-cell cluster merging.

pub mod cell;
pub mod dbscan;
pub mod downsample;
pub mod grid;
pub mod merge;
pub mod pipeline;

pub use cell::cluster_cell;
pub use dbscan::{dbscan, Clustering, NOISE};
pub use downsample::{downsample, Downsampled};
pub use grid::SpatialGrid;
pub use merge::merge_clusters;
pub use pipeline::{SegmentationPipeline, SegmentationStats};

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! urbanmesh pipeline
//!
//! End-to-end orchestration: decoded tile → building-class filter →
//! segmentation → per-building plane extraction, mesh assembly and
//! metadata → merged model and JSON run report. Buildings are processed
//! one at a time so a building's intermediate buffers are released
//! before the next one starts.

pub mod batch;
pub mod error;
pub mod extractor;

pub use batch::{Batch, BatchOutput, RunReport};
pub use error::{Error, Result};
pub use extractor::{Building, BuildingExtractor, TileOutcome};

use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while preparing input for the pipeline
#[derive(Error, Debug)]
pub enum Error {
    #[error("Empty point set")]
    EmptyPointSet,

    #[error("No building points in tile ({points_scanned} points scanned)")]
    NoBuildingPoints { points_scanned: usize },

    #[error("Point/class length mismatch: {points} points, {classes} classes")]
    LengthMismatch { points: usize, classes: usize },
}

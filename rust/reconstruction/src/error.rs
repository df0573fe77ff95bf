use thiserror::Error;

/// Result type for reconstruction operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during mesh reconstruction
#[derive(Error, Debug)]
pub enum Error {
    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("Not enough planes: {found} usable, {needed} needed")]
    NotEnoughPlanes { found: usize, needed: usize },

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Empty mesh: {0}")]
    EmptyMesh(String),
}

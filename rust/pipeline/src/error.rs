use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the extraction pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Bad or unusable input for one tile; the batch skips the tile and
    /// continues.
    #[error("Input error: {0}")]
    Input(#[from] urbanmesh_core::Error),

    #[error("Report serialization error: {0}")]
    Report(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error is recoverable by skipping the current tile.
    pub fn is_input(&self) -> bool {
        matches!(self, Error::Input(_))
    }
}

//! Error types for geometry operations.

use thiserror::Error;

/// Errors that can occur in geometry operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeomError {
    /// Polygon has fewer than three vertices or zero area.
    #[error("degenerate polygon: {0}")]
    DegeneratePolygon(String),

    /// Ear clipping could not make progress (self-intersecting input).
    #[error("triangulation failed after {0} ears")]
    TriangulationFailed(usize),
}

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, GeomError>;

//! Error types for scheduling.

use seqarrange_geom::GeomError;
use thiserror::Error;

/// Errors that can end a scheduling run.
///
/// Only [`SequentialError::ObjectDoesNotFit`] and [`SequentialError::Timeout`]
/// come out of the search itself; the remaining variants reject invalid
/// input before any search work starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SequentialError {
    /// An object cannot be placed even alone on an empty plate.
    #[error("object {id} does not fit on an empty plate")]
    ObjectDoesNotFit {
        /// Identifier of the offending object.
        id: i32,
    },

    /// The time budget ran out before a single placement was found.
    #[error("optimization timed out after {elapsed_ms} ms without placing an object")]
    Timeout {
        /// Time spent before giving up.
        elapsed_ms: u64,
    },

    /// Solver configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Printer geometry is unusable.
    #[error("invalid printer geometry: {0}")]
    InvalidGeometry(String),

    /// An object description is malformed.
    #[error("invalid object {id}: {reason}")]
    InvalidObject {
        /// Identifier of the malformed object.
        id: i32,
        /// What is wrong with it.
        reason: String,
    },

    /// Geometry kernel failure on an outline.
    #[error(transparent)]
    Geometry(#[from] GeomError),
}

/// Result type for scheduling operations.
pub type Result<T> = std::result::Result<T, SequentialError>;

//! Error types

use crate::sim::TrackableId;

/// Failures surfaced by the simulation.
///
/// Lookup misses (unknown anchor ids, empty raycasts) are not errors; they
/// come back as `false`, `None` or an empty list.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Invalid simulation config: {0}")]
    InvalidConfig(String),

    #[error("Simulation already started")]
    AlreadyStarted,

    #[error("Unknown parent trackable: {0}")]
    UnknownParent(TrackableId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimulationError>;

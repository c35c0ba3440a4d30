//! arsim - simulated AR perception
//!
//! Core modules:
//! - `sim`: Plane extraction, trackable registry and raycasting
//! - `config`: Tunables for extraction, hit-testing and id generation
//! - `scene`: Serializable scene descriptions (box volumes + config)
//! - `error`: Error types

pub mod config;
pub mod error;
pub mod scene;
pub mod sim;

pub use config::{HitPolicy, SimulationConfig};
pub use error::{Result, SimulationError};
pub use scene::SceneDescription;
pub use sim::Simulation;

/// Default tunables
pub mod consts {
    /// Faces with a side shorter than this (scene units) never become planes
    pub const MIN_SURFACE_DIMENSION: f32 = 0.15;
    /// Max angle (degrees) from up/down for a face to count as horizontal
    pub const MAX_FACE_ANGLE_DEG: f32 = 1.0;
    /// Max |dot(up, normal)| for a face to count as vertical
    pub const VERTICAL_EPSILON: f32 = 1e-5;
}

//! Simulation engine
//!
//! Everything that produces simulated perception data lives here:
//! - Plane extraction from scene box volumes (run once at start)
//! - The trackable registry with added/updated/removed diffs
//! - Raycasting against detected planes
//!
//! No rendering, scene-graph or platform dependencies; hosts feed volumes in
//! and poll diffs out.

pub mod anchor;
pub mod extractor;
pub mod geometry;
pub mod plane;
pub mod raycast;
pub mod registry;
pub mod trackable;

pub use anchor::SimulatedAnchor;
pub use extractor::{BoxVolume, PlaneExtractor, Transform};
pub use geometry::{
    Pose, centroid, planar_size, project_to_plane_local_2d, triangulate_convex_fan,
    unproject_from_plane_local_2d,
};
pub use plane::{PlaneAlignment, PlaneDetectionMode, SimulatedPlane};
pub use raycast::{HitType, Ray, RaycastHit, ViewportProjector};
pub use registry::Simulation;
pub use trackable::{
    IdGenerator, Lifecycle, StateChange, Trackable, TrackableChanges, TrackableId,
};

//! Simulated planar trackables

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::geometry::{
    Pose, centroid, planar_size, project_to_plane_local_2d, rotation_up_to, triangulate_convex_fan,
};
use super::trackable::{Lifecycle, Trackable, TrackableId, TrackableStorage};

/// Orientation class of a plane relative to world up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaneAlignment {
    HorizontalUp,
    HorizontalDown,
    Vertical,
}

impl PlaneAlignment {
    pub fn is_horizontal(&self) -> bool {
        matches!(self, PlaneAlignment::HorizontalUp | PlaneAlignment::HorizontalDown)
    }
}

/// Which planes a detection trigger surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaneDetectionMode {
    Horizontal,
    Vertical,
}

impl PlaneDetectionMode {
    pub fn matches(&self, alignment: PlaneAlignment) -> bool {
        match self {
            PlaneDetectionMode::Horizontal => alignment.is_horizontal(),
            PlaneDetectionMode::Vertical => alignment == PlaneAlignment::Vertical,
        }
    }
}

/// A plane synthesized from one box face.
///
/// Geometry is fixed at construction; only the lifecycle and detection flag
/// change afterwards, and only through the owning simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedPlane {
    id: TrackableId,
    alignment: PlaneAlignment,
    pose: Pose,
    boundary: Vec<Vec3>,
    local_boundary: Vec<Vec2>,
    size: Vec2,
    /// Collider triangles over `boundary`
    triangles: Vec<u32>,
    is_detected: bool,
    lifecycle: Lifecycle,
}

impl SimulatedPlane {
    /// Build a latent plane from a world-space convex boundary.
    ///
    /// Returns `None` for boundaries with fewer than 3 points or a
    /// degenerate normal.
    pub fn new(
        id: TrackableId,
        alignment: PlaneAlignment,
        normal: Vec3,
        boundary: Vec<Vec3>,
    ) -> Option<Self> {
        if boundary.len() < 3 || normal.length_squared() < 1e-12 {
            return None;
        }
        let pose = Pose::new(centroid(&boundary)?, rotation_up_to(normal));
        let local_boundary = project_to_plane_local_2d(&boundary, &pose);
        let size = planar_size(&local_boundary);
        let triangles = triangulate_convex_fan(boundary.len());

        Some(Self {
            id,
            alignment,
            pose,
            boundary,
            local_boundary,
            size,
            triangles,
            is_detected: false,
            lifecycle: Lifecycle::default(),
        })
    }

    pub fn alignment(&self) -> PlaneAlignment {
        self.alignment
    }

    /// Center point in world space
    pub fn center(&self) -> Vec3 {
        self.pose.position
    }

    /// World-space unit normal
    pub fn normal(&self) -> Vec3 {
        self.pose.up()
    }

    /// Ordered world-space boundary
    pub fn boundary(&self) -> &[Vec3] {
        &self.boundary
    }

    /// Boundary in the plane's local 2D frame
    pub fn local_boundary(&self) -> &[Vec2] {
        &self.local_boundary
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Fan triangle indices into [`Self::boundary`]
    pub fn triangles(&self) -> &[u32] {
        &self.triangles
    }

    pub fn is_detected(&self) -> bool {
        self.is_detected
    }

    pub(crate) fn detect(&mut self) {
        self.is_detected = true;
        self.lifecycle.mark_added();
    }
}

impl Trackable for SimulatedPlane {
    fn id(&self) -> TrackableId {
        self.id
    }

    fn pose(&self) -> Pose {
        self.pose
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }
}

impl TrackableStorage for SimulatedPlane {
    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

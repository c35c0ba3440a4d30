//! Simulated anchors

use serde::{Deserialize, Serialize};

use super::geometry::Pose;
use super::trackable::{Lifecycle, Trackable, TrackableId, TrackableStorage};

/// A fixed world pose, optionally related to a plane.
///
/// The pose never drifts. `parent` is informational only: removing the
/// parent plane leaves the anchor in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedAnchor {
    id: TrackableId,
    pose: Pose,
    parent: Option<TrackableId>,
    lifecycle: Lifecycle,
}

impl SimulatedAnchor {
    pub(crate) fn new(id: TrackableId, pose: Pose, parent: Option<TrackableId>) -> Self {
        Self {
            id,
            pose,
            parent,
            lifecycle: Lifecycle::added(),
        }
    }

    pub fn parent(&self) -> Option<TrackableId> {
        self.parent
    }

    /// Pose relative to `parent_pose` (e.g. the parent plane)
    pub fn pose_relative_to(&self, parent_pose: &Pose) -> Pose {
        let inv = parent_pose.rotation.inverse();
        Pose::new(
            parent_pose.inverse_transform_point(self.pose.position),
            inv * self.pose.rotation,
        )
    }
}

impl Trackable for SimulatedAnchor {
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

impl TrackableStorage for SimulatedAnchor {
    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::trackable::StateChange;
    use glam::{Quat, Vec3};

    #[test]
    fn test_new_anchor_is_added() {
        let anchor = SimulatedAnchor::new(TrackableId::new(3, 4), Pose::IDENTITY, None);
        assert_eq!(anchor.state_change(), StateChange::Added);
        assert!(anchor.parent().is_none());
    }

    #[test]
    fn test_pose_relative_to_parent() {
        let parent = Pose::new(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        );
        let anchor = SimulatedAnchor::new(
            TrackableId::new(5, 6),
            Pose::new(Vec3::new(1.0, 0.0, -2.0), parent.rotation),
            Some(TrackableId::new(7, 8)),
        );
        let local = anchor.pose_relative_to(&parent);
        // +90° about Y maps local +X to world -Z
        assert!(local.position.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));
        assert!(local.rotation.abs_diff_eq(Quat::IDENTITY, 1e-5));
    }
}

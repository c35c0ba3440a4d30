//! Geometry helpers shared by planes, the extractor and raycasting
//!
//! Conventions:
//! - World "up" is +Y, "forward" is +Z
//! - A plane's local frame has its normal along local +Y, so dropping the
//!   Y component of a local point yields its 2D boundary coordinates (x, z)

use glam::{Mat3, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Position + orientation, in world space unless stated otherwise
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Local → world
    #[inline]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// World → local
    #[inline]
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }

    /// Local +Y in world space (the normal for plane poses)
    #[inline]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Local +Z in world space
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }
}

/// Arithmetic mean of a point set.
///
/// Returns `None` for an empty set; callers that hold a valid boundary always
/// have at least one point.
pub fn centroid(points: &[Vec3]) -> Option<Vec3> {
    if points.is_empty() {
        return None;
    }
    let sum: Vec3 = points.iter().copied().sum();
    Some(sum / points.len() as f32)
}

/// Axis-aligned 2D extent of a local boundary. Empty input gives zero size.
pub fn planar_size(points: &[Vec2]) -> Vec2 {
    let Some(first) = points.first() else {
        return Vec2::ZERO;
    };
    let (min, max) = points
        .iter()
        .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
    max - min
}

/// Fan triangulation from vertex 0: (0, i-1, i) for i in 2..n.
///
/// Only meaningful for convex, non-self-intersecting polygons. Nothing is
/// validated; fewer than 3 vertices yields an empty index list.
pub fn triangulate_convex_fan(vertex_count: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(vertex_count.saturating_sub(2) * 3);
    for i in 2..vertex_count as u32 {
        indices.extend_from_slice(&[0, i - 1, i]);
    }
    indices
}

/// Express world points in the plane's local 2D frame (normal axis dropped)
pub fn project_to_plane_local_2d(world_points: &[Vec3], plane_pose: &Pose) -> Vec<Vec2> {
    world_points
        .iter()
        .map(|p| {
            let local = plane_pose.inverse_transform_point(*p);
            Vec2::new(local.x, local.z)
        })
        .collect()
}

/// Inverse of [`project_to_plane_local_2d`] for points lying on the plane
pub fn unproject_from_plane_local_2d(local_points: &[Vec2], plane_pose: &Pose) -> Vec<Vec3> {
    local_points
        .iter()
        .map(|p| plane_pose.transform_point(Vec3::new(p.x, 0.0, p.y)))
        .collect()
}

/// Rotation taking world up onto `normal`.
///
/// Handles the antiparallel case (normal pointing down).
pub fn rotation_up_to(normal: Vec3) -> Quat {
    Quat::from_rotation_arc(Vec3::Y, normal.normalize())
}

/// Rotation whose +Z axis points along `forward`, keeping +Y as close to
/// `up` as possible. Falls back to +Z as the up hint when `forward` is
/// (anti)parallel to `up`.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let f = forward.normalize();
    let mut right = up.cross(f);
    if right.length_squared() < 1e-8 {
        right = Vec3::Z.cross(f);
    }
    let right = right.normalize();
    let true_up = f.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, true_up, f))
}

/// Angle between two vectors, in degrees
#[inline]
pub fn angle_deg(a: Vec3, b: Vec3) -> f32 {
    a.angle_between(b).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f32 = 1e-4;

    fn square_xz(half: f32, y: f32) -> Vec<Vec3> {
        vec![
            Vec3::new(-half, y, half),
            Vec3::new(half, y, half),
            Vec3::new(half, y, -half),
            Vec3::new(-half, y, -half),
        ]
    }

    #[test]
    fn test_centroid() {
        let c = centroid(&square_xz(1.0, 2.0)).unwrap();
        assert!(c.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), EPS));
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn test_planar_size() {
        let pts = [Vec2::new(1.0, 2.0), Vec2::new(4.0, -1.0), Vec2::new(2.0, 0.5)];
        assert!(planar_size(&pts).abs_diff_eq(Vec2::new(3.0, 3.0), EPS));
        // All-positive points must not be measured from the origin
        let pts = [Vec2::new(1.0, 1.0), Vec2::new(2.0, 3.0)];
        assert!(planar_size(&pts).abs_diff_eq(Vec2::new(1.0, 2.0), EPS));
        assert_eq!(planar_size(&[]), Vec2::ZERO);
    }

    #[test]
    fn test_triangulate_fan() {
        assert_eq!(triangulate_convex_fan(4), vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(triangulate_convex_fan(5).len(), 9);
        assert!(triangulate_convex_fan(2).is_empty());
        assert!(triangulate_convex_fan(0).is_empty());
    }

    #[test]
    fn test_project_horizontal_square() {
        let pts = square_xz(0.5, 1.0);
        let pose = Pose::new(Vec3::new(0.0, 1.0, 0.0), rotation_up_to(Vec3::Y));
        let local = project_to_plane_local_2d(&pts, &pose);
        assert!(local[0].abs_diff_eq(Vec2::new(-0.5, 0.5), EPS));
        assert!(local[2].abs_diff_eq(Vec2::new(0.5, -0.5), EPS));
    }

    #[test]
    fn test_rotation_up_to_down() {
        let q = rotation_up_to(Vec3::NEG_Y);
        assert!((q * Vec3::Y).abs_diff_eq(Vec3::NEG_Y, EPS));
        assert!(q.is_normalized());
    }

    #[test]
    fn test_look_rotation() {
        let q = look_rotation(Vec3::X, Vec3::Y);
        assert!((q * Vec3::Z).abs_diff_eq(Vec3::X, EPS));
        assert!((q * Vec3::Y).abs_diff_eq(Vec3::Y, EPS));

        // Forward parallel to the up hint
        let q = look_rotation(Vec3::NEG_Y, Vec3::Y);
        assert!((q * Vec3::Z).abs_diff_eq(Vec3::NEG_Y, EPS));
        assert!(q.is_normalized());
    }

    proptest! {
        #[test]
        fn prop_local_roundtrip(
            nx in -1.0f32..1.0, ny in -1.0f32..1.0, nz in -1.0f32..1.0,
            px in -10.0f32..10.0, py in -10.0f32..10.0, pz in -10.0f32..10.0,
            half in 0.1f32..5.0,
        ) {
            let normal = Vec3::new(nx, ny, nz);
            prop_assume!(normal.length() > 0.1);
            let pose = Pose::new(Vec3::new(px, py, pz), rotation_up_to(normal));
            // Build a boundary lying on the plane
            let world: Vec<Vec3> = [(-half, -half), (half, -half), (half, half), (-half, half)]
                .iter()
                .map(|(x, z)| pose.transform_point(Vec3::new(*x, 0.0, *z)))
                .collect();

            let local = project_to_plane_local_2d(&world, &pose);
            let back = unproject_from_plane_local_2d(&local, &pose);
            for (a, b) in world.iter().zip(back.iter()) {
                prop_assert!(a.abs_diff_eq(*b, 1e-3));
            }
        }
    }
}

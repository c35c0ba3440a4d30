//! Plane extraction from box volumes
//!
//! Each box contributes up to six planes, one per face that is large enough
//! and whose world normal is horizontal (within tolerance) or vertical.
//! Extraction runs once at simulation start.

use glam::{Affine3A, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::geometry::angle_deg;
use super::plane::{PlaneAlignment, SimulatedPlane};
use super::trackable::IdGenerator;
use crate::config::SimulationConfig;

/// World placement of a box volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_rotation_translation(rotation: Quat, translation: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale: Vec3::ONE,
        }
    }

    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Rotate a direction, flipping axes mirrored by a negative scale.
    /// Scale magnitude is ignored.
    #[inline]
    pub fn transform_direction(&self, dir: Vec3) -> Vec3 {
        self.rotation * (dir * self.scale.signum())
    }
}

/// A box-shaped scene volume, the only supported extraction primitive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxVolume {
    /// Box center in the volume's local frame
    #[serde(default)]
    pub center: Vec3,
    pub half_extents: Vec3,
    #[serde(default)]
    pub transform: Transform,
}

impl BoxVolume {
    pub fn new(center: Vec3, half_extents: Vec3, transform: Transform) -> Self {
        Self {
            center,
            half_extents,
            transform,
        }
    }

    /// Box of full `size` at `position`, unrotated
    pub fn from_size(position: Vec3, size: Vec3) -> Self {
        Self::new(Vec3::ZERO, size * 0.5, Transform::from_translation(position))
    }
}

/// Local outward normals of the six faces
const FACE_NORMALS: [Vec3; 6] = [Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z, Vec3::NEG_X, Vec3::X];

/// Corner points of one face in box-local space (relative to the center).
///
/// Winding per face is fixed so every polygon runs consistently around its
/// normal.
fn face_corners(normal: Vec3, h: Vec3) -> [Vec3; 4] {
    if normal == Vec3::Y {
        [
            Vec3::new(-h.x, h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
        ]
    } else if normal == Vec3::NEG_Y {
        [
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(-h.x, -h.y, h.z),
        ]
    } else if normal == Vec3::Z {
        [
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
            Vec3::new(-h.x, -h.y, h.z),
        ]
    } else if normal == Vec3::NEG_Z {
        [
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
        ]
    } else if normal == Vec3::X {
        [
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
        ]
    } else {
        [
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, -h.z),
        ]
    }
}

/// Stateless factory turning box volumes into latent planes
#[derive(Debug, Clone, Copy)]
pub struct PlaneExtractor {
    pub min_surface_dimension: f32,
    pub max_face_angle_deg: f32,
    pub vertical_epsilon: f32,
}

impl Default for PlaneExtractor {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

impl PlaneExtractor {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            min_surface_dimension: config.min_surface_dimension,
            max_face_angle_deg: config.max_face_angle_deg,
            vertical_epsilon: config.vertical_epsilon,
        }
    }

    /// Classify a world-space face normal, `None` if tilted
    pub fn classify(&self, world_normal: Vec3) -> Option<PlaneAlignment> {
        if angle_deg(world_normal, Vec3::Y) <= self.max_face_angle_deg {
            Some(PlaneAlignment::HorizontalUp)
        } else if angle_deg(world_normal, Vec3::NEG_Y) <= self.max_face_angle_deg {
            Some(PlaneAlignment::HorizontalDown)
        } else if Vec3::Y.dot(world_normal).abs() < self.vertical_epsilon {
            Some(PlaneAlignment::Vertical)
        } else {
            None
        }
    }

    /// Extract every qualifying face of every volume
    pub fn extract(&self, volumes: &[BoxVolume], ids: &mut IdGenerator) -> Vec<SimulatedPlane> {
        let planes: Vec<SimulatedPlane> = volumes
            .iter()
            .flat_map(|volume| self.planes_from_volume(volume, ids))
            .collect();

        let horizontal = planes.iter().filter(|p| p.alignment().is_horizontal()).count();
        let vertical = planes.len() - horizontal;
        log::info!(
            "Created {} simulated planes from {} box volumes ({} horizontal, {} vertical)",
            planes.len(),
            volumes.len(),
            horizontal,
            vertical
        );

        planes
    }

    fn planes_from_volume(&self, volume: &BoxVolume, ids: &mut IdGenerator) -> Vec<SimulatedPlane> {
        let affine = volume.transform.to_affine();
        let mut planes = Vec::new();

        for local_normal in FACE_NORMALS {
            let corners = face_corners(local_normal, volume.half_extents)
                .map(|p| affine.transform_point3(volume.center + p));

            // Side lengths measured in world space so scaled volumes filter correctly
            let side_a = corners[0].distance(corners[1]);
            let side_b = corners[1].distance(corners[2]);
            if side_a < self.min_surface_dimension || side_b < self.min_surface_dimension {
                log::debug!(
                    "Skipping face {:?}: {:.3} x {:.3} below minimum",
                    local_normal,
                    side_a,
                    side_b
                );
                continue;
            }

            let world_normal = volume.transform.transform_direction(local_normal).normalize();
            let Some(alignment) = self.classify(world_normal) else {
                log::debug!("Skipping tilted face, world normal {:?}", world_normal);
                continue;
            };

            if let Some(plane) =
                SimulatedPlane::new(ids.next_id(), alignment, world_normal, corners.to_vec())
            {
                planes.push(plane);
            }
        }

        planes
    }
}

//! Hit-testing against detected planes
//!
//! Rays are intersected with each plane's triangulated collider. Undetected
//! planes are filtered out by the caller ([`crate::sim::Simulation::raycast`]).

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::geometry::{Pose, look_rotation};
use super::plane::SimulatedPlane;
use super::trackable::{Trackable, TrackableId};
use crate::config::HitPolicy;

/// Smallest ray parameter accepted as a hit
const MIN_HIT_DISTANCE: f32 = 1e-6;
/// Tolerance for parallel rays and triangle-edge hits
const INTERSECT_EPS: f32 = 1e-7;

/// A ray with normalized direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Normalizes `direction`; `None` if it has no length
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    pub fn from_points(origin: Vec3, target: Vec3) -> Option<Self> {
        Self::new(origin, target - origin)
    }

    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Kind of surface a hit landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitType {
    /// Inside a detected plane's boundary polygon
    PlaneWithinPolygon,
}

/// One ray/plane intersection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaycastHit {
    pub trackable_id: TrackableId,
    /// Position is the hit point; forward (+Z) points into the surface
    pub pose: Pose,
    /// Distance from the ray origin
    pub distance: f32,
    pub hit_type: HitType,
}

/// Host camera hook: viewport coordinates (0..1) to a world ray
pub trait ViewportProjector {
    fn viewport_point_to_ray(&self, point: Vec2) -> Option<Ray>;
}

impl<F> ViewportProjector for F
where
    F: Fn(Vec2) -> Option<Ray>,
{
    fn viewport_point_to_ray(&self, point: Vec2) -> Option<Ray> {
        self(point)
    }
}

/// Möller–Trumbore, two-sided. Returns the ray parameter.
fn intersect_triangle(ray: &Ray, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < INTERSECT_EPS {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(-INTERSECT_EPS..=1.0 + INTERSECT_EPS).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < -INTERSECT_EPS || u + v > 1.0 + INTERSECT_EPS {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t > MIN_HIT_DISTANCE).then_some(t)
}

/// Intersect a ray with one plane's collider
pub fn intersect_plane(ray: &Ray, plane: &SimulatedPlane, hit_back_faces: bool) -> Option<RaycastHit> {
    let normal = plane.normal();
    let facing = ray.direction.dot(normal);
    if facing.abs() < INTERSECT_EPS || (!hit_back_faces && facing > 0.0) {
        return None;
    }

    let boundary = plane.boundary();
    let distance = plane.triangles().chunks_exact(3).find_map(|tri| {
        intersect_triangle(
            ray,
            boundary[tri[0] as usize],
            boundary[tri[1] as usize],
            boundary[tri[2] as usize],
        )
    })?;

    // Normal on the side the ray came from
    let surface_normal = if facing > 0.0 { -normal } else { normal };
    let pose = Pose::new(ray.point_at(distance), look_rotation(-surface_normal, Vec3::Y));

    Some(RaycastHit {
        trackable_id: plane.id(),
        pose,
        distance,
        hit_type: HitType::PlaneWithinPolygon,
    })
}

/// Intersect a ray with every given plane, nearest first
pub fn raycast_planes<'a>(
    planes: impl IntoIterator<Item = &'a SimulatedPlane>,
    ray: &Ray,
    policy: HitPolicy,
    hit_back_faces: bool,
) -> Vec<RaycastHit> {
    let mut hits: Vec<RaycastHit> = planes
        .into_iter()
        .filter_map(|plane| intersect_plane(ray, plane, hit_back_faces))
        .collect();

    hits.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    if policy == HitPolicy::Nearest {
        hits.truncate(1);
    }
    hits
}

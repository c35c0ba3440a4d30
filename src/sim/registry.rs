//! Trackable registry: the simulation core
//!
//! Owns every simulated plane and anchor. Hosts mutate it through the methods
//! below and poll diffs with the consume calls. There is no internal locking;
//! multi-threaded hosts wrap the instance in a mutex or confine it to one
//! thread.
//!
//! Planes start latent: extraction marks nothing as added, and a plane only
//! reaches consumers after a matching [`Simulation::trigger_plane_detection`].

use glam::Vec2;

use super::anchor::SimulatedAnchor;
use super::extractor::{BoxVolume, PlaneExtractor};
use super::geometry::Pose;
use super::plane::{PlaneDetectionMode, SimulatedPlane};
use super::raycast::{Ray, RaycastHit, ViewportProjector, raycast_planes};
use super::trackable::{
    IdGenerator, Trackable, TrackableChanges, TrackableId, TrackableStorage, drain_changes,
};
use crate::config::{HitPolicy, SimulationConfig};
use crate::error::{Result, SimulationError};

/// A simulated AR environment
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    ids: IdGenerator,
    started: bool,
    /// Insertion order is preserved for deterministic diffs
    planes: Vec<SimulatedPlane>,
    anchors: Vec<SimulatedAnchor>,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let ids = IdGenerator::new(config.id_seed);
        Ok(Self {
            config,
            ids,
            started: false,
            planes: Vec::new(),
            anchors: Vec::new(),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Extract planes from the scene. Callable once per instance.
    ///
    /// Returns the number of latent planes created.
    pub fn start(&mut self, volumes: &[BoxVolume]) -> Result<usize> {
        if self.started {
            return Err(SimulationError::AlreadyStarted);
        }
        let extractor = PlaneExtractor::from_config(&self.config);
        self.planes = extractor.extract(volumes, &mut self.ids);
        self.started = true;
        log::info!("Simulation started with {} latent planes", self.planes.len());
        Ok(self.planes.len())
    }

    // === Planes ===

    /// All planes, detected or not
    pub fn planes(&self) -> &[SimulatedPlane] {
        &self.planes
    }

    pub fn detected_planes(&self) -> impl Iterator<Item = &SimulatedPlane> {
        self.planes.iter().filter(|p| p.is_detected())
    }

    pub fn plane(&self, id: TrackableId) -> Option<&SimulatedPlane> {
        self.planes.iter().find(|p| p.id() == id)
    }

    /// Local 2D boundary of a plane
    pub fn plane_boundary(&self, id: TrackableId) -> Option<&[Vec2]> {
        self.plane(id).map(|p| p.local_boundary())
    }

    /// Surface undetected planes matching `mode`; returns how many were
    /// newly detected
    pub fn trigger_plane_detection(&mut self, mode: PlaneDetectionMode) -> usize {
        let mut detected = 0;
        for plane in self
            .planes
            .iter_mut()
            .filter(|p| {
                !p.is_detected() && !p.lifecycle().is_removing() && mode.matches(p.alignment())
            })
        {
            plane.detect();
            detected += 1;
        }
        if detected > 0 {
            log::debug!("Detected {} planes for {:?}", detected, mode);
        }
        detected
    }

    /// Flag a plane as updated (scene-editing hook). False if unknown,
    /// not yet detected, or already being removed.
    pub fn mark_plane_updated(&mut self, id: TrackableId) -> bool {
        self.planes
            .iter_mut()
            .find(|p| p.id() == id)
            .filter(|p| p.is_detected())
            .is_some_and(|p| p.lifecycle_mut().mark_updated())
    }

    /// Schedule a plane for removal (scene-editing hook).
    ///
    /// A latent plane is dropped at once and never reported. Anchors attached
    /// to it are left in place.
    pub fn remove_plane(&mut self, id: TrackableId) -> bool {
        let Some(index) = self.planes.iter().position(|p| p.id() == id) else {
            return false;
        };
        let plane = &mut self.planes[index];
        if plane.is_detected() {
            plane.lifecycle_mut().mark_removed();
        } else {
            self.planes.remove(index);
            log::debug!("Dropped latent plane {}", id);
        }
        true
    }

    /// Drain pending plane changes since the last call
    pub fn consume_plane_updates(&mut self) -> TrackableChanges<SimulatedPlane> {
        let changes = drain_changes(&mut self.planes);
        log_changes("plane", &changes);
        changes
    }

    // === Anchors ===

    pub fn anchors(&self) -> &[SimulatedAnchor] {
        &self.anchors
    }

    pub fn anchor(&self, id: TrackableId) -> Option<&SimulatedAnchor> {
        self.anchors.iter().find(|a| a.id() == id)
    }

    /// Anchors whose parent is `plane_id`, including orphans of a removed plane
    pub fn anchors_attached_to(&self, plane_id: TrackableId) -> impl Iterator<Item = &SimulatedAnchor> {
        self.anchors
            .iter()
            .filter(move |a| a.parent() == Some(plane_id))
    }

    /// Create an anchor at a world pose, optionally attached to a plane.
    ///
    /// Fails with [`SimulationError::UnknownParent`] if `parent` names no
    /// detected, live plane; nothing is created in that case.
    pub fn add_anchor(&mut self, pose: Pose, parent: Option<TrackableId>) -> Result<SimulatedAnchor> {
        if let Some(parent_id) = parent {
            let attachable = self
                .plane(parent_id)
                .is_some_and(|p| p.is_detected() && !p.lifecycle().is_removing());
            if !attachable {
                log::warn!("Cannot attach anchor: no detected plane {}", parent_id);
                return Err(SimulationError::UnknownParent(parent_id));
            }
        }

        let anchor = SimulatedAnchor::new(self.ids.next_id(), pose, parent);
        log::debug!("Added anchor {} at {:?}", anchor.id(), pose.position);
        self.anchors.push(anchor.clone());
        Ok(anchor)
    }

    /// Schedule an anchor for removal; false if the id is unknown
    pub fn remove_anchor(&mut self, id: TrackableId) -> bool {
        match self.anchors.iter_mut().find(|a| a.id() == id) {
            Some(anchor) => {
                anchor.lifecycle_mut().mark_removed();
                log::debug!("Removing anchor {}", id);
                true
            }
            None => false,
        }
    }

    /// Drain pending anchor changes since the last call
    pub fn consume_anchor_updates(&mut self) -> TrackableChanges<SimulatedAnchor> {
        let changes = drain_changes(&mut self.anchors);
        log_changes("anchor", &changes);
        changes
    }

    // === Raycasting ===

    /// Hit-test detected planes using the configured [`HitPolicy`]
    pub fn raycast(&self, ray: &Ray) -> Vec<RaycastHit> {
        self.raycast_with_policy(ray, self.config.hit_policy)
    }

    /// Every detected plane crossed by `ray`, nearest first
    pub fn raycast_all(&self, ray: &Ray) -> Vec<RaycastHit> {
        self.raycast_with_policy(ray, HitPolicy::All)
    }

    pub fn raycast_with_policy(&self, ray: &Ray, policy: HitPolicy) -> Vec<RaycastHit> {
        raycast_planes(self.detected_planes(), ray, policy, self.config.hit_back_faces)
    }

    /// Raycast from a viewport point through the host's camera
    pub fn raycast_viewport(&self, projector: &impl ViewportProjector, point: Vec2) -> Vec<RaycastHit> {
        match projector.viewport_point_to_ray(point) {
            Some(ray) => self.raycast(&ray),
            None => Vec::new(),
        }
    }
}

fn log_changes<T>(kind: &str, changes: &TrackableChanges<T>) {
    if !changes.is_empty() {
        log::debug!(
            "Consumed {} updates: {} added, {} updated, {} removed",
            kind,
            changes.added.len(),
            changes.updated.len(),
            changes.removed.len()
        );
    }
}

//! Scene descriptions
//!
//! A scene is the explicit input to a simulation: a list of box volumes and
//! optionally the config to run them with. Stored as JSON.

use std::path::Path;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::sim::{BoxVolume, Simulation, Transform};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub config: Option<SimulationConfig>,
    pub volumes: Vec<BoxVolume>,
}

impl SceneDescription {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let scene = Self::from_json_str(&json)?;
        log::info!(
            "Loaded scene with {} volumes from {}",
            scene.volumes.len(),
            path.as_ref().display()
        );
        Ok(scene)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build and start a simulation over this scene
    pub fn start_simulation(&self) -> Result<Simulation> {
        let mut sim = Simulation::new(self.config.clone().unwrap_or_default())?;
        sim.start(&self.volumes)?;
        Ok(sim)
    }

    /// A small furnished room: floor, two walls, a table and a tilted ramp
    pub fn demo_room() -> Self {
        Self {
            config: None,
            volumes: vec![
                // Floor slab, top at y = 0
                BoxVolume::from_size(Vec3::new(0.0, -0.05, 0.0), Vec3::new(6.0, 0.1, 6.0)),
                // Back wall
                BoxVolume::from_size(Vec3::new(0.0, 1.25, 3.05), Vec3::new(6.0, 2.5, 0.1)),
                // Side wall, rotated a quarter turn
                BoxVolume::new(
                    Vec3::ZERO,
                    Vec3::new(3.0, 1.25, 0.05),
                    Transform::from_rotation_translation(
                        Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
                        Vec3::new(-3.05, 1.25, 0.0),
                    ),
                ),
                // Table top
                BoxVolume::from_size(Vec3::new(1.0, 0.75, 1.0), Vec3::new(1.2, 0.05, 0.8)),
                // Ramp: too steep to register
                BoxVolume::new(
                    Vec3::ZERO,
                    Vec3::new(0.5, 0.05, 1.0),
                    Transform::from_rotation_translation(
                        Quat::from_rotation_x(0.4),
                        Vec3::new(-1.5, 0.3, -1.5),
                    ),
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HitPolicy;
    use crate::sim::{PlaneAlignment, PlaneDetectionMode};

    #[test]
    fn test_json_roundtrip_preserves_volumes() {
        let scene = SceneDescription::demo_room();
        let json = scene.to_json().unwrap();
        let back = SceneDescription::from_json_str(&json).unwrap();
        assert_eq!(back.volumes, scene.volumes);
    }

    #[test]
    fn test_minimal_json() {
        let json = r#"{
            "config": { "hit_policy": "All", "id_seed": 3 },
            "volumes": [
                { "half_extents": [1.0, 0.1, 1.0],
                  "transform": { "translation": [0.0, 1.0, 0.0], "rotation": [0.0, 0.0, 0.0, 1.0] } }
            ]
        }"#;
        let scene = SceneDescription::from_json_str(json).unwrap();
        assert_eq!(scene.volumes[0].center, Vec3::ZERO);
        assert_eq!(scene.volumes[0].transform.scale, Vec3::ONE);

        let sim = scene.start_simulation().unwrap();
        assert_eq!(sim.config().hit_policy, HitPolicy::All);
        // 2 x 0.2 x 2 slab: top, bottom and four 0.2-high sides
        assert_eq!(sim.planes().len(), 6);
    }

    #[test]
    fn test_demo_room_planes() {
        let mut sim = SceneDescription::demo_room().start_simulation().unwrap();
        sim.trigger_plane_detection(PlaneDetectionMode::Horizontal);
        sim.trigger_plane_detection(PlaneDetectionMode::Vertical);
        let added = sim.consume_plane_updates().added;

        let up = added
            .iter()
            .filter(|p| p.alignment() == PlaneAlignment::HorizontalUp)
            .count();
        // Floor and table; the ramp is tilted out of tolerance
        assert_eq!(up, 2);
        let vertical = added
            .iter()
            .filter(|p| p.alignment() == PlaneAlignment::Vertical)
            .count();
        // Both faces of each wall
        assert_eq!(vertical, 4);
    }
}

//! Simulation configuration
//!
//! Loaded from JSON or built in code; validated before a simulation is
//! constructed.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimulationError};

/// How many hits a raycast reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HitPolicy {
    /// Closest detected plane only
    #[default]
    Nearest,
    /// Every detected plane crossed, nearest first
    All,
}

impl HitPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            HitPolicy::Nearest => "Nearest",
            HitPolicy::All => "All",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "nearest" | "first" => Some(HitPolicy::Nearest),
            "all" => Some(HitPolicy::All),
            _ => None,
        }
    }
}

/// Tunables for extraction, raycasting and id generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === Extraction ===
    /// Faces with a side shorter than this are dropped
    pub min_surface_dimension: f32,
    /// Max angle (degrees) between a face normal and up/down to count as horizontal
    pub max_face_angle_deg: f32,
    /// Max |dot(up, normal)| to count as vertical
    pub vertical_epsilon: f32,

    // === Raycasting ===
    pub hit_policy: HitPolicy,
    /// Report hits on the back side of planes
    pub hit_back_faces: bool,

    // === Identifiers ===
    /// Fixed seed for reproducible trackable ids; random when unset
    pub id_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            min_surface_dimension: MIN_SURFACE_DIMENSION,
            max_face_angle_deg: MAX_FACE_ANGLE_DEG,
            vertical_epsilon: VERTICAL_EPSILON,
            hit_policy: HitPolicy::Nearest,
            hit_back_faces: false,
            id_seed: None,
        }
    }
}

impl SimulationConfig {
    /// Default config with a fixed id seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            id_seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min_surface_dimension.is_finite() || self.min_surface_dimension <= 0.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "min_surface_dimension must be positive, got {}",
                self.min_surface_dimension
            )));
        }
        if !(0.0..90.0).contains(&self.max_face_angle_deg) {
            return Err(SimulationError::InvalidConfig(format!(
                "max_face_angle_deg must be in [0, 90), got {}",
                self.max_face_angle_deg
            )));
        }
        if !self.vertical_epsilon.is_finite() || self.vertical_epsilon <= 0.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "vertical_epsilon must be positive, got {}",
                self.vertical_epsilon
            )));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded simulation config from {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_surface_dimension, 0.15);
        assert_eq!(config.max_face_angle_deg, 1.0);
        assert_eq!(config.hit_policy, HitPolicy::Nearest);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimulationConfig::from_json_str(r#"{ "hit_policy": "All", "id_seed": 9 }"#).unwrap();
        assert_eq!(config.hit_policy, HitPolicy::All);
        assert_eq!(config.id_seed, Some(9));
        assert_eq!(config.min_surface_dimension, MIN_SURFACE_DIMENSION);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = SimulationConfig::from_json_str(r#"{ "min_surface_dimension": -1.0 }"#);
        assert!(matches!(err, Err(SimulationError::InvalidConfig(_))));

        let err = SimulationConfig::from_json_str(r#"{ "max_face_angle_deg": 90.0 }"#);
        assert!(matches!(err, Err(SimulationError::InvalidConfig(_))));

        let err = SimulationConfig::from_json_str("not json");
        assert!(matches!(err, Err(SimulationError::Json(_))));
    }

    #[test]
    fn test_hit_policy_strings() {
        assert_eq!(HitPolicy::from_str("ALL"), Some(HitPolicy::All));
        assert_eq!(HitPolicy::from_str("nearest"), Some(HitPolicy::Nearest));
        assert_eq!(HitPolicy::from_str("bogus"), None);
        assert_eq!(HitPolicy::All.as_str(), "All");
    }

    #[test]
    fn test_load_missing_file() {
        let err = SimulationConfig::load("/nonexistent/arsim-config.json");
        assert!(matches!(err, Err(SimulationError::Io(_))));
    }
}

//! Simulation settings and tuning
//!
//! Global toggles and per-map tuning consumed by the simulation. Loaded from
//! JSON; any field missing from the document keeps its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration loading errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Global toggles ===
    /// Bullets from different owners collide with each other
    pub bullet_collisions: bool,
    /// Resolve a velocity impulse on contact (positional correction always runs)
    pub knockback: bool,
    /// Route damage-over-time deaths through the death callback
    pub attribute_dot_kills: bool,

    // === Movement ===
    /// Velocity kept per reference frame on normal ground
    pub friction: f32,
    /// Velocity kept per reference frame on ice
    pub ice_friction: f32,
    /// Acceleration of self-propelled projectiles (units/s²)
    pub homing_acceleration: f32,
    /// Speed cap for self-propelled projectiles
    pub homing_max_speed: f32,
    /// Maximum heading wobble per second for self-propelled projectiles (radians)
    pub homing_jitter: f32,

    // === Elemental payloads ===
    /// Burn damage per second applied by incendiary rounds
    pub burn_damage_per_second: f32,
    /// Burn duration in seconds
    pub burn_duration: f32,
    /// Slow factor applied by cryo rounds
    pub slow_factor: f32,
    /// Slow duration in seconds
    pub slow_duration: f32,

    // === Cosmetics ===
    /// Hit flash duration in seconds
    pub flash_duration: f32,
    /// Barrel recoil decay rate (1/s)
    pub recoil_decay: f32,
    /// Bullet speed at which trail emission probability saturates
    pub trail_speed_threshold: f32,
    /// Trail samples taken along a sub-step path when emission triggers
    pub trail_samples: u32,
    /// Screen shake for a critical hit
    pub crit_shake: f32,
    /// Screen shake per unit of explosion radius
    pub explosion_shake_per_radius: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bullet_collisions: true,
            knockback: false,
            attribute_dot_kills: false,

            friction: 0.9,
            ice_friction: 0.985,
            homing_acceleration: 3000.0,
            homing_max_speed: 420.0,
            homing_jitter: 0.6,

            burn_damage_per_second: 8.0,
            burn_duration: 3.0,
            slow_factor: 0.05,
            slow_duration: 2.0,

            flash_duration: 0.1,
            recoil_decay: 12.0,
            trail_speed_threshold: 900.0,
            trail_samples: 3,
            crit_shake: 4.0,
            explosion_shake_per_radius: 0.1,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings = serde_json::from_str(json)?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&contents)?;
        log::info!("Loaded simulation settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is absent or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(&path) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!(
                    "Using default settings ({}: {err})",
                    path.as_ref().display()
                );
                Self::default()
            }
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_knockback_off() {
        let settings = Settings::default();
        assert!(!settings.knockback);
        assert!(settings.bullet_collisions);
        assert!(!settings.attribute_dot_kills);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "knockback": true, "friction": 0.8 }"#)
            .expect("valid json");
        assert!(settings.knockback);
        assert_eq!(settings.friction, 0.8);
        assert_eq!(settings.ice_friction, Settings::default().ice_friction);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = Settings::from_json("{ knockback: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load_or_default("/definitely/not/here/settings.json");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_json_roundtrip_preserves_toggles() {
        let settings = Settings {
            bullet_collisions: false,
            attribute_dot_kills: true,
            ..Default::default()
        };
        let json = settings.to_json().expect("serializes");
        assert_eq!(Settings::from_json(&json).expect("parses"), settings);
    }
}

//! Arena Core - physics and combat resolution for a top-down arena shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, collisions, damage, status effects)
//! - `settings`: Data-driven toggles and tuning for the simulation

pub mod settings;
pub mod sim;

pub use settings::{ConfigError, Settings};

use glam::Vec2;

/// Game rule constants that are not meant to be tuned per map
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta the scheduler accepts (backgrounded tabs, debugger pauses)
    pub const MAX_FRAME_DT: f32 = 0.25;

    /// Reference frame rate that per-frame coefficients are expressed against
    pub const REFERENCE_FPS: f32 = 60.0;

    /// Mass used when the stat provider returns something unusable
    pub const FALLBACK_MASS: f32 = 1.0;

    /// Outgoing damage multiplier for critical hits
    pub const CRIT_MULTIPLIER: f32 = 1.5;
    /// Fraction of a bullet's base damage dealt at the centre of its explosion
    pub const EXPLOSION_DAMAGE_FACTOR: f32 = 0.5;
    /// Restitution used by the optional knockback impulse
    pub const RESTITUTION: f32 = 0.2;
    /// Separation used when two bodies share the exact same centre
    pub const ZERO_DISTANCE_EPSILON: f32 = 1e-4;

    /// Hitscan range: max(MIN, BASE + bullet_speed_stat * PER_STAT)
    pub const HITSCAN_MIN_RANGE: f32 = 200.0;
    pub const HITSCAN_BASE_RANGE: f32 = 350.0;
    pub const HITSCAN_RANGE_PER_STAT: f32 = 70.0;
}

/// Unit heading vector for a rotation in radians
#[inline]
pub fn heading(rotation: f32) -> Vec2 {
    Vec2::new(rotation.cos(), rotation.sin())
}

/// Scale a per-frame decay coefficient to an arbitrary timestep
///
/// `coefficient` is the factor applied once per reference frame (1/60 s).
#[inline]
pub fn frame_decay(coefficient: f32, dt: f32) -> f32 {
    coefficient.powf(dt * consts::REFERENCE_FPS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_decay_matches_reference_frame() {
        assert!((frame_decay(0.9, consts::SIM_DT) - 0.9).abs() < 1e-6);
        // Two half-frames compound to one full frame
        let half = frame_decay(0.9, consts::SIM_DT / 2.0);
        assert!((half * half - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_heading_is_unit_length() {
        for i in 0..16 {
            let h = heading(i as f32 * 0.4);
            assert!((h.length() - 1.0).abs() < 1e-5);
        }
    }
}

//! Deterministic simulation module
//!
//! All combat and physics logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (entity creation order)
//! - No rendering or platform dependencies; cosmetic output goes through `SimEvent`

pub mod collision;
pub mod damage;
pub mod events;
pub mod geometry;
pub mod hitscan;
pub mod kinematics;
pub mod ports;
pub mod state;
pub mod status;
pub mod tick;

#[cfg(test)]
pub(crate) mod test_support;

pub use collision::{Pairing, classify, push_out_of_wall, resolve_collisions};
pub use damage::{Detonation, Strike, StrikeOutcome};
pub use events::{DEFAULT_FX_CAPACITY, FxKey, FxPool, Particle, SimEvent, TextTone};
pub use geometry::{Rect, line_circle_intersect, line_line_intersect, line_rect_intersect, point_in_rect};
pub use hitscan::{HitscanBarrel, HitscanResult, fire_hitscan, hitscan_range};
pub use kinematics::{integrate, sanitize_mass};
pub use ports::{Biome, FlatTerrain, SimHooks, SoundCue, StatKey, StatProvider, Terrain, TickContext};
pub use state::{
    Barrel, BulletState, Collider, Element, Entity, EntityId, EntityKind, Homing, TankState,
    TeamId, World,
};
pub use status::{DotDeath, StatusEffect, StatusKind, StatusLedger, update_status_effects};
pub use tick::{clamp_frame_dt, tick};

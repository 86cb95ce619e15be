//! Interfaces to collaborators outside the simulation core
//!
//! Stat formulas, terrain lookup and presentation callbacks are owned by the
//! host game. The core only calls through these traits.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Entity;

/// Stats the core reads from the external stat provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKey {
    /// Bullet speed upgrade level, drives hitscan range
    BulletSpeed,
    /// Probability in [0, 1] that a hitscan shot crits
    CritChance,
}

/// External stat and mass formulas
pub trait StatProvider {
    fn stat(&self, entity: &Entity, key: StatKey) -> f32;
    fn mass(&self, entity: &Entity) -> f32;
}

/// Terrain type under a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Biome {
    #[default]
    Plains,
    Ice,
}

/// Position to terrain lookup, used only to pick friction
pub trait Terrain {
    fn biome(&self, pos: Vec2) -> Biome;
}

/// Terrain that is the same everywhere
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatTerrain(pub Biome);

impl Terrain for FlatTerrain {
    fn biome(&self, _pos: Vec2) -> Biome {
        self.0
    }
}

/// Sound cues requested by the core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    Hit,
    Crit,
    Explosion,
    WallImpact,
    Beam,
}

/// Callbacks into the host game. Every method defaults to a no-op.
pub trait SimHooks {
    /// An entity crossed to zero health. `killer` is the opposing body.
    fn on_death(&mut self, _victim: &Entity, _killer: Option<&Entity>) {}

    fn on_shake(&mut self, _amount: f32) {}

    fn play_audio(&mut self, _cue: SoundCue, _pos: Vec2, _listener: Vec2) {}
}

impl SimHooks for () {}

/// Collaborators borrowed for one tick
pub struct TickContext<'a> {
    pub stats: &'a dyn StatProvider,
    pub terrain: &'a dyn Terrain,
    pub hooks: &'a mut dyn SimHooks,
}

impl<'a> TickContext<'a> {
    pub fn new(
        stats: &'a dyn StatProvider,
        terrain: &'a dyn Terrain,
        hooks: &'a mut dyn SimHooks,
    ) -> Self {
        Self {
            stats,
            terrain,
            hooks,
        }
    }
}

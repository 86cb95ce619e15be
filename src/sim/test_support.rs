//! Shared fixtures for simulation unit tests

use glam::Vec2;

use super::ports::{SimHooks, SoundCue, StatKey, StatProvider};
use super::state::{BulletState, Entity, EntityId, EntityKind, TankState, TeamId, World};
use crate::settings::Settings;

pub const SEED: u64 = 12345;

/// 500 x 500 arena with default settings
pub fn world() -> World {
    World::new(Vec2::splat(500.0), Settings::default(), SEED)
}

pub fn tank(id: EntityId, pos: Vec2, team: Option<TeamId>) -> Entity {
    let mut t = Entity::circle(id, EntityKind::Tank(TankState::default()), pos, 20.0);
    t.team_id = team;
    t
}

pub fn bullet(id: EntityId, pos: Vec2, owner: EntityId, team: Option<TeamId>) -> Entity {
    let mut b = Entity::circle(id, EntityKind::Bullet(BulletState::default()), pos, 5.0);
    b.owner_id = Some(owner);
    b.team_id = team;
    b.contact_damage = 10.0;
    b
}

pub fn wall(id: EntityId, pos: Vec2, width: f32, height: f32) -> Entity {
    Entity::rect(id, EntityKind::Wall, pos, width, height)
}

/// Stat provider returning the same numbers for everyone
#[derive(Debug, Clone, Copy)]
pub struct FixedStats {
    pub mass: f32,
    pub bullet_speed: f32,
    pub crit_chance: f32,
}

impl Default for FixedStats {
    fn default() -> Self {
        Self {
            mass: 1.0,
            bullet_speed: 0.0,
            crit_chance: 0.0,
        }
    }
}

impl StatProvider for FixedStats {
    fn stat(&self, _entity: &Entity, key: StatKey) -> f32 {
        match key {
            StatKey::BulletSpeed => self.bullet_speed,
            StatKey::CritChance => self.crit_chance,
        }
    }

    fn mass(&self, _entity: &Entity) -> f32 {
        self.mass
    }
}

/// Hooks that remember every call
#[derive(Debug, Default)]
pub struct RecordingHooks {
    pub deaths: Vec<(EntityId, Option<EntityId>)>,
    pub shakes: Vec<f32>,
    pub sounds: Vec<SoundCue>,
}

impl SimHooks for RecordingHooks {
    fn on_death(&mut self, victim: &Entity, killer: Option<&Entity>) {
        self.deaths.push((victim.id, killer.map(|k| k.id)));
    }

    fn on_shake(&mut self, amount: f32) {
        self.shakes.push(amount);
    }

    fn play_audio(&mut self, cue: SoundCue, _pos: Vec2, _listener: Vec2) {
        self.sounds.push(cue);
    }
}

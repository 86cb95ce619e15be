//! Cosmetic output of the simulation
//!
//! The core never appends visual entities to the world. Instead it pushes
//! `SimEvent`s that the presentation layer drains once per frame, optionally
//! through `FxPool`, which recycles particle slots between frames.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

/// Color class of a floating damage number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextTone {
    /// Damage dealt to someone else
    Normal,
    /// Critical damage dealt to someone else
    Crit,
    /// Damage taken by the local player
    PlayerHurt,
    /// Critical damage taken by the local player
    PlayerCrit,
}

impl TextTone {
    pub fn for_hit(victim_is_player: bool, crit: bool) -> Self {
        match (victim_is_player, crit) {
            (false, false) => TextTone::Normal,
            (false, true) => TextTone::Crit,
            (true, false) => TextTone::PlayerHurt,
            (true, true) => TextTone::PlayerCrit,
        }
    }
}

/// A cosmetic side effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Small impact burst
    Spark { pos: Vec2 },
    Explosion { pos: Vec2, radius: f32 },
    /// Trail puff behind a fast bullet
    Trail { pos: Vec2, vel: Vec2 },
    /// Hitscan beam, always emitted even on a miss
    Beam { from: Vec2, to: Vec2, hit: bool },
    FloatingText { pos: Vec2, text: String, tone: TextTone },
}

impl SimEvent {
    /// Damage number above a victim
    pub fn damage_number(pos: Vec2, amount: f32, tone: TextTone) -> Self {
        SimEvent::FloatingText {
            pos,
            text: format!("{}", amount.round() as i64),
            tone,
        }
    }

    pub fn text(pos: Vec2, text: &str, tone: TextTone) -> Self {
        SimEvent::FloatingText {
            pos,
            text: text.to_string(),
            tone,
        }
    }
}

new_key_type! {
    /// Handle to a pooled particle
    pub struct FxKey;
}

/// A live cosmetic particle
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds remaining
    pub life: f32,
    pub size: f32,
    pub event: SimEvent,
}

/// Live particle cap used by `FxPool::default`
pub const DEFAULT_FX_CAPACITY: usize = 256;

/// Arena of cosmetic particles with slot reuse
#[derive(Debug)]
pub struct FxPool {
    particles: SlotMap<FxKey, Particle>,
    capacity: usize,
}

impl Default for FxPool {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_FX_CAPACITY)
    }
}

impl FxPool {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            particles: SlotMap::with_capacity_and_key(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn get(&self, key: FxKey) -> Option<&Particle> {
        self.particles.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FxKey, &Particle)> {
        self.particles.iter()
    }

    /// Turn an event into a particle. Returns `None` once the pool is full.
    pub fn spawn(&mut self, event: SimEvent) -> Option<FxKey> {
        if self.particles.len() >= self.capacity {
            return None;
        }
        let (pos, vel, life, size) = match &event {
            SimEvent::Spark { pos } => (*pos, Vec2::ZERO, 0.25, 6.0),
            SimEvent::Explosion { pos, radius } => (*pos, Vec2::ZERO, 0.5, *radius),
            SimEvent::Trail { pos, vel } => (*pos, *vel * 0.1, 0.3, 3.0),
            SimEvent::Beam { from, .. } => (*from, Vec2::ZERO, 0.15, 2.0),
            SimEvent::FloatingText { pos, .. } => (*pos, Vec2::new(0.0, -30.0), 0.8, 14.0),
        };
        Some(self.particles.insert(Particle {
            pos,
            vel,
            life,
            size,
            event,
        }))
    }

    /// Spawn every event, dropping what does not fit
    pub fn absorb(&mut self, events: impl IntoIterator<Item = SimEvent>) -> usize {
        events
            .into_iter()
            .filter_map(|event| self.spawn(event))
            .count()
    }

    /// Age particles and free expired slots
    pub fn update(&mut self, dt: f32) {
        for particle in self.particles.values_mut() {
            particle.pos += particle.vel * dt;
            particle.life -= dt;
        }
        self.particles.retain(|_, p| p.life > 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_selection() {
        assert_eq!(TextTone::for_hit(false, false), TextTone::Normal);
        assert_eq!(TextTone::for_hit(false, true), TextTone::Crit);
        assert_eq!(TextTone::for_hit(true, false), TextTone::PlayerHurt);
        assert_eq!(TextTone::for_hit(true, true), TextTone::PlayerCrit);
    }

    #[test]
    fn test_damage_number_rounds() {
        let event = SimEvent::damage_number(Vec2::ZERO, 14.6, TextTone::Normal);
        assert!(matches!(event, SimEvent::FloatingText { ref text, .. } if text == "15"));
    }

    #[test]
    fn test_pool_caps_and_expires() {
        let mut pool = FxPool::with_capacity(2);
        let spawned = pool.absorb([
            SimEvent::Spark { pos: Vec2::ZERO },
            SimEvent::Spark { pos: Vec2::ONE },
            SimEvent::Spark { pos: Vec2::X },
        ]);
        assert_eq!(spawned, 2);
        assert_eq!(pool.len(), 2);

        pool.update(1.0);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_default_pool_has_room() {
        let mut pool = FxPool::default();
        assert!(pool.spawn(SimEvent::Spark { pos: Vec2::ZERO }).is_some());
        let spawned = pool.absorb((0..DEFAULT_FX_CAPACITY).map(|i| SimEvent::Spark {
            pos: Vec2::splat(i as f32),
        }));
        assert_eq!(spawned, DEFAULT_FX_CAPACITY - 1);
        assert_eq!(pool.len(), DEFAULT_FX_CAPACITY);
    }

    #[test]
    fn test_pool_reuses_freed_slots() {
        let mut pool = FxPool::with_capacity(1);
        let first = pool.spawn(SimEvent::Spark { pos: Vec2::ZERO }).expect("room");
        pool.update(1.0);
        assert!(pool.get(first).is_none());

        let second = pool.spawn(SimEvent::Spark { pos: Vec2::ONE }).expect("slot freed");
        // Same slot, new generation: the stale handle stays invalid
        assert_ne!(first, second);
        assert!(pool.get(first).is_none());
        assert!(pool.get(second).is_some());
    }
}

//! Timed status effects
//!
//! Each entity carries a ledger of effects keyed by (type, source). Burn and
//! Slow act every tick; Haste, Fortify and Overclock are passive and only read
//! by the stat provider through the query helpers below.

use std::mem::discriminant;

use serde::{Deserialize, Serialize};

use super::state::{Entity, EntityId};

/// Effect type with its magnitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StatusKind {
    Burn { damage_per_second: f32 },
    Slow { slow_factor: f32 },
    Haste { speed_multiplier: f32 },
    Fortify { damage_reduction: f32 },
    Overclock { reload_multiplier: f32 },
}

impl StatusKind {
    /// Same effect type, ignoring magnitude
    #[inline]
    pub fn same_type(&self, other: &StatusKind) -> bool {
        discriminant(self) == discriminant(other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    /// Seconds remaining
    pub duration: f32,
    /// Attribution key for stacking
    pub source_id: EntityId,
}

impl StatusEffect {
    pub fn new(kind: StatusKind, duration: f32, source_id: EntityId) -> Self {
        Self {
            kind,
            duration,
            source_id,
        }
    }
}

/// Ordered effects on a single entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusLedger {
    effects: Vec<StatusEffect>,
}

impl StatusLedger {
    /// Apply or refresh an effect.
    ///
    /// A second application from the same source only extends the duration
    /// to the longer of the two; magnitude is never stacked.
    pub fn apply(&mut self, effect: StatusEffect) {
        match self
            .effects
            .iter_mut()
            .find(|e| e.source_id == effect.source_id && e.kind.same_type(&effect.kind))
        {
            Some(existing) => existing.duration = existing.duration.max(effect.duration),
            None => self.effects.push(effect),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Combined movement multiplier from every Haste effect
    pub fn speed_multiplier(&self) -> f32 {
        self.effects
            .iter()
            .filter_map(|e| match e.kind {
                StatusKind::Haste { speed_multiplier } => Some(speed_multiplier),
                _ => None,
            })
            .product()
    }

    /// Fraction of incoming damage blocked; the strongest Fortify wins
    pub fn damage_reduction(&self) -> f32 {
        self.effects
            .iter()
            .filter_map(|e| match e.kind {
                StatusKind::Fortify { damage_reduction } => Some(damage_reduction),
                _ => None,
            })
            .fold(0.0, f32::max)
            .clamp(0.0, 1.0)
    }

    /// Combined reload multiplier from every Overclock effect
    pub fn reload_multiplier(&self) -> f32 {
        self.effects
            .iter()
            .filter_map(|e| match e.kind {
                StatusKind::Overclock { reload_multiplier } => Some(reload_multiplier),
                _ => None,
            })
            .product()
    }

    /// Source of the longest-running Burn, for kill attribution
    pub fn burn_source(&self) -> Option<EntityId> {
        self.effects
            .iter()
            .filter(|e| matches!(e.kind, StatusKind::Burn { .. }))
            .max_by(|a, b| a.duration.total_cmp(&b.duration))
            .map(|e| e.source_id)
    }
}

/// A damage-over-time kill, reported so the caller can attribute it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotDeath {
    pub victim_id: EntityId,
    pub source_id: Option<EntityId>,
}

/// Run per-tick consequences, age every effect and purge expired ones.
///
/// Entities killed by Burn are tombstoned directly here.
pub fn update_status_effects(entities: &mut [Entity], dt: f32, now: f32) -> Vec<DotDeath> {
    let mut deaths = Vec::new();

    for entity in entities.iter_mut().filter(|e| e.is_alive()) {
        if entity.status.is_empty() {
            continue;
        }
        let burn_source = entity.status.burn_source();

        for effect in entity.status.effects.iter_mut() {
            match effect.kind {
                StatusKind::Burn { damage_per_second } => {
                    entity.health -= damage_per_second * dt;
                    entity.last_damage_time = now;
                }
                StatusKind::Slow { slow_factor } => {
                    entity.vel *= (1.0 - slow_factor * dt * crate::consts::REFERENCE_FPS).max(0.0);
                }
                StatusKind::Haste { .. }
                | StatusKind::Fortify { .. }
                | StatusKind::Overclock { .. } => {}
            }
            effect.duration -= dt;
        }
        entity.status.effects.retain(|e| e.duration > 0.0);

        if entity.health <= 0.0 {
            entity.is_dead = true;
            log::debug!("entity {} burned out", entity.id);
            deaths.push(DotDeath {
                victim_id: entity.id,
                source_id: burn_source,
            });
        }
    }

    deaths
}

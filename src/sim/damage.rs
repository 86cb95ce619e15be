//! Damage pipeline shared by contact, swept and hitscan hits
//!
//! Rule order for a single strike: invulnerability, critical multiplier,
//! health and flash, damage number, elemental payload, tombstone. Friendly
//! fire is filtered before a strike is built. Deaths are collected and
//! reported only after every body in the interaction has been tombstoned.

use glam::Vec2;

use super::events::{SimEvent, TextTone};
use super::ports::{SimHooks, SoundCue};
use super::state::{Element, Entity, EntityId, TeamId};
use super::status::{StatusEffect, StatusKind};
use crate::consts::{CRIT_MULTIPLIER, EXPLOSION_DAMAGE_FACTOR};
use crate::settings::Settings;

/// Everything a strike may touch besides the victim
pub(crate) struct DamageCtx<'a> {
    pub settings: &'a Settings,
    pub player_id: Option<EntityId>,
    pub listener: Vec2,
    pub events: &'a mut Vec<SimEvent>,
    pub hooks: &'a mut dyn SimHooks,
}

/// Damage carried from an attacker to one victim
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strike {
    pub damage: f32,
    pub crit: bool,
    pub element: Option<Element>,
    /// Attacker credited for status effects
    pub source_id: EntityId,
}

impl Strike {
    /// Contact strike from `attacker` onto `victim`
    pub fn from_contact(attacker: &Entity, victim: &Entity) -> Self {
        let bullet = attacker.bullet();
        Self {
            damage: attacker.contact_damage,
            crit: bullet.is_some_and(|b| b.crit),
            // Elements only land on the non-bullet side
            element: bullet
                .and_then(|b| b.element)
                .filter(|_| !victim.kind.is_bullet()),
            source_id: attacker.attribution_id(),
        }
    }
}

/// Result of one strike
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StrikeOutcome {
    pub dealt: f32,
    /// Victim crossed to zero health during this strike
    pub killed: bool,
}

/// Apply one strike to a victim
pub(crate) fn apply_strike(victim: &mut Entity, strike: &Strike, ctx: &mut DamageCtx) -> StrikeOutcome {
    if victim.kind.is_static() || victim.is_dead {
        return StrikeOutcome::default();
    }

    let mut damage = if victim.is_invulnerable {
        0.0
    } else {
        strike.damage.max(0.0)
    };
    let crit = strike.crit && damage > 0.0;

    if crit {
        damage *= CRIT_MULTIPLIER;
        ctx.events.push(SimEvent::text(
            victim.pos,
            "CRIT!",
            TextTone::for_hit(Some(victim.id) == ctx.player_id, true),
        ));
        ctx.hooks.on_shake(ctx.settings.crit_shake);
        ctx.hooks.play_audio(SoundCue::Crit, victim.pos, ctx.listener);
    }

    if damage > 0.0 {
        victim.health -= damage;
        victim.flash_timer = ctx.settings.flash_duration;
        let tone = TextTone::for_hit(Some(victim.id) == ctx.player_id, crit);
        ctx.events.push(SimEvent::damage_number(victim.pos, damage, tone));
        if !crit {
            ctx.hooks.play_audio(SoundCue::Hit, victim.pos, ctx.listener);
        }
    }

    if let Some(element) = strike.element {
        if !victim.is_invulnerable && !victim.kind.is_bullet() {
            victim
                .status
                .apply(elemental_effect(element, strike.source_id, ctx.settings));
        }
    }

    let killed = victim.health <= 0.0;
    if killed {
        victim.is_dead = true;
    }

    StrikeOutcome {
        dealt: damage,
        killed,
    }
}

fn elemental_effect(element: Element, source_id: EntityId, settings: &Settings) -> StatusEffect {
    match element {
        Element::Incendiary => StatusEffect::new(
            StatusKind::Burn {
                damage_per_second: settings.burn_damage_per_second,
            },
            settings.burn_duration,
            source_id,
        ),
        Element::Cryo => StatusEffect::new(
            StatusKind::Slow {
                slow_factor: settings.slow_factor,
            },
            settings.slow_duration,
            source_id,
        ),
    }
}

/// A pending explosion from a high-explosive bullet that just died
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detonation {
    pub bullet_index: usize,
    pub pos: Vec2,
    pub radius: f32,
    pub base_damage: f32,
    pub shooter_id: Option<EntityId>,
    pub team_id: Option<TeamId>,
    /// Attribution for the damage numbers
    pub source_id: EntityId,
}

impl Detonation {
    /// Detonation for a dead explosive bullet, if it is one
    pub fn for_bullet(index: usize, bullet: &Entity) -> Option<Self> {
        let radius = bullet.bullet()?.explosion_radius?;
        (radius > 0.0).then(|| Self {
            bullet_index: index,
            pos: bullet.pos,
            radius,
            base_damage: bullet.contact_damage,
            shooter_id: bullet.owner_id,
            team_id: bullet.team_id,
            source_id: bullet.attribution_id(),
        })
    }

    /// Linear falloff: half the base damage at the centre, zero at the edge
    pub fn damage_at(&self, distance: f32) -> f32 {
        if distance >= self.radius {
            return 0.0;
        }
        self.base_damage * EXPLOSION_DAMAGE_FACTOR * (1.0 - distance / self.radius)
    }
}

/// A tombstone awaiting its death callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Kill {
    pub victim: usize,
    pub killer: Option<usize>,
}

/// Outcome of a two-sided contact
#[derive(Debug, Default)]
pub(crate) struct ContactOutcome {
    pub kills: Vec<Kill>,
    pub detonations: Vec<Detonation>,
}

/// Run the pipeline in both directions between bodies at indices `ia` and `ib`.
///
/// Both strikes are computed from the state before either is applied.
pub(crate) fn resolve_contact(
    a: &mut Entity,
    ia: usize,
    b: &mut Entity,
    ib: usize,
    ctx: &mut DamageCtx,
) -> ContactOutcome {
    let mut outcome = ContactOutcome::default();
    if a.same_team(b) {
        return outcome;
    }

    let onto_b = Strike::from_contact(a, b);
    let onto_a = Strike::from_contact(b, a);
    let hit_b = apply_strike(b, &onto_b, ctx);
    let hit_a = apply_strike(a, &onto_a, ctx);

    for (hit, body, index, other) in [(hit_a, &*a, ia, ib), (hit_b, &*b, ib, ia)] {
        if !hit.killed {
            continue;
        }
        outcome.kills.push(Kill {
            victim: index,
            killer: Some(other),
        });
        if let Some(detonation) = Detonation::for_bullet(index, body) {
            outcome.detonations.push(detonation);
        }
    }

    outcome
}

/// Area damage around a detonation. Never applies knockback.
pub(crate) fn detonate(entities: &mut [Entity], detonation: &Detonation, ctx: &mut DamageCtx) -> Vec<Kill> {
    log::debug!(
        "detonation at ({:.1}, {:.1}) radius {}",
        detonation.pos.x,
        detonation.pos.y,
        detonation.radius
    );
    ctx.events.push(SimEvent::Explosion {
        pos: detonation.pos,
        radius: detonation.radius,
    });
    ctx.hooks
        .on_shake(detonation.radius * ctx.settings.explosion_shake_per_radius);
    ctx.hooks
        .play_audio(SoundCue::Explosion, detonation.pos, ctx.listener);

    let mut kills = Vec::new();
    for (index, entity) in entities.iter_mut().enumerate() {
        if entity.is_dead || entity.kind.is_static() || index == detonation.bullet_index {
            continue;
        }
        if Some(entity.id) == detonation.shooter_id {
            continue;
        }
        if matches!((entity.team_id, detonation.team_id), (Some(a), Some(b)) if a == b) {
            continue;
        }

        let damage = detonation.damage_at(entity.pos.distance(detonation.pos));
        if damage <= 0.0 {
            continue;
        }
        let strike = Strike {
            damage,
            crit: false,
            element: None,
            source_id: detonation.source_id,
        };
        if apply_strike(entity, &strike, ctx).killed {
            kills.push(Kill {
                victim: index,
                killer: Some(detonation.bullet_index),
            });
        }
    }
    kills
}

/// Fire the death callback once per kill, in ascending victim id order
pub(crate) fn report_kills(entities: &[Entity], mut kills: Vec<Kill>, hooks: &mut dyn SimHooks) {
    kills.sort_by_key(|k| entities[k.victim].id);
    kills.dedup_by_key(|k| k.victim);
    for kill in kills {
        let victim = &entities[kill.victim];
        let killer = kill.killer.map(|k| &entities[k]);
        log::debug!(
            "entity {} killed by {:?}",
            victim.id,
            killer.map(|k| k.id)
        );
        hooks.on_death(victim, killer);
    }
}

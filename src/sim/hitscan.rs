//! Instant ray weapons
//!
//! Called by weapon logic outside the tick. Shares eligibility rules and the
//! damage pipeline with projectile collisions.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::damage::{DamageCtx, Kill, Strike, apply_strike, report_kills};
use super::events::SimEvent;
use super::geometry::{line_circle_intersect, line_rect_intersect};
use super::ports::{SimHooks, SoundCue, StatKey, StatProvider};
use super::state::{Collider, Element, Entity, EntityId, EntityKind, World};
use crate::consts::{HITSCAN_BASE_RANGE, HITSCAN_MIN_RANGE, HITSCAN_RANGE_PER_STAT};
use crate::heading;

/// Weapon barrel firing the beam
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HitscanBarrel {
    pub damage: f32,
    pub element: Option<Element>,
}

/// Where the beam ended and what it struck
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitscanResult {
    pub end: Vec2,
    /// Damageable body hit, if any (walls stop the beam but are not reported)
    pub target: Option<EntityId>,
    pub crit: bool,
    pub killed: bool,
}

/// Beam length for a given bullet-speed stat
#[inline]
pub fn hitscan_range(bullet_speed_stat: f32) -> f32 {
    (HITSCAN_BASE_RANGE + bullet_speed_stat * HITSCAN_RANGE_PER_STAT).max(HITSCAN_MIN_RANGE)
}

/// Whether a beam fired by `owner_id` may stop on `target`
fn can_hit(target: &Entity, owner_id: EntityId, owner: Option<&Entity>) -> bool {
    if target.is_dead || target.id == owner_id || matches!(target.kind, EntityKind::Zone) {
        return false;
    }
    if target.kind.is_wall() {
        return true;
    }
    if target.owner_id == Some(owner_id) {
        return false;
    }
    match owner {
        Some(owner) => !owner.same_team(target) && !owner.same_owner(target),
        None => true,
    }
}

/// Fire an instantaneous beam
pub fn fire_hitscan(
    world: &mut World,
    stats: &dyn StatProvider,
    hooks: &mut dyn SimHooks,
    origin: Vec2,
    angle: f32,
    owner_id: EntityId,
    barrel: &HitscanBarrel,
) -> HitscanResult {
    let owner_index = world.index_of(owner_id);
    let owner = owner_index.map(|i| &world.entities[i]);
    let bullet_speed = owner.map_or(0.0, |o| stats.stat(o, StatKey::BulletSpeed));
    let crit_chance = owner.map_or(0.0, |o| stats.stat(o, StatKey::CritChance));
    let end = origin + heading(angle) * hitscan_range(bullet_speed);

    let mut nearest: Option<(usize, Vec2, f32)> = None;
    for (index, target) in world.entities.iter().enumerate() {
        if !can_hit(target, owner_id, owner) {
            continue;
        }
        let hit = match target.collider {
            Collider::Circle { radius } => line_circle_intersect(origin, end, target.pos, radius),
            Collider::Rect { .. } => target
                .rect_bounds()
                .and_then(|rect| line_rect_intersect(origin, end, &rect)),
        };
        if let Some(point) = hit {
            let d2 = origin.distance_squared(point);
            if nearest.is_none_or(|(_, _, best)| d2 < best) {
                nearest = Some((index, point, d2));
            }
        }
    }

    // Roll even on a miss so the RNG stream does not depend on aim
    let crit = world.rng.random::<f32>() < crit_chance;

    let mut result = HitscanResult {
        end,
        target: None,
        crit: false,
        killed: false,
    };

    let listener = world.listener_pos();
    if let Some((index, point, _)) = nearest {
        result.end = point;
        if !world.entities[index].kind.is_wall() {
            let strike = Strike {
                damage: barrel.damage,
                crit,
                element: barrel.element,
                source_id: owner_id,
            };
            let World {
                entities,
                settings,
                events,
                player_id,
                ..
            } = world;
            let mut ctx = DamageCtx {
                settings,
                player_id: *player_id,
                listener,
                events,
                hooks: &mut *hooks,
            };
            let outcome = apply_strike(&mut entities[index], &strike, &mut ctx);

            result.target = Some(entities[index].id);
            result.crit = crit && outcome.dealt > 0.0;
            result.killed = outcome.killed;

            if outcome.killed {
                let kill = Kill {
                    victim: index,
                    killer: owner_index,
                };
                report_kills(entities, vec![kill], hooks);
            }
        }
    }

    world.events.push(SimEvent::Beam {
        from: origin,
        to: result.end,
        hit: result.target.is_some(),
    });
    hooks.play_audio(SoundCue::Beam, origin, listener);
    log::trace!("hitscan from {owner_id} ended at {:?}", result.end);

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::status::StatusKind;
    use crate::sim::test_support::{FixedStats, RecordingHooks, tank, wall, world};

    fn barrel(damage: f32) -> HitscanBarrel {
        HitscanBarrel {
            damage,
            element: None,
        }
    }

    #[test]
    fn test_range_formula() {
        assert_eq!(hitscan_range(0.0), 350.0);
        assert_eq!(hitscan_range(2.0), 490.0);
        assert_eq!(hitscan_range(-5.0), 200.0);
    }

    #[test]
    fn test_beam_hits_nearest_enemy() {
        let mut w = world();
        w.spawn(tank(1, Vec2::new(0.0, 50.0), Some(1)));
        w.spawn(tank(3, Vec2::new(300.0, 50.0), Some(2)));
        w.spawn(tank(2, Vec2::new(150.0, 50.0), Some(2)));
        let mut hooks = RecordingHooks::default();

        let result = fire_hitscan(
            &mut w,
            &FixedStats::default(),
            &mut hooks,
            Vec2::new(0.0, 50.0),
            0.0,
            1,
            &barrel(25.0),
        );

        assert_eq!(result.target, Some(2));
        assert!((result.end - Vec2::new(130.0, 50.0)).length() < 1e-3);
        assert_eq!(w.get(2).expect("near").health, 75.0);
        assert_eq!(w.get(3).expect("far").health, 100.0);
        assert!(w.events.iter().any(|e| matches!(e, SimEvent::Beam { hit: true, .. })));
    }

    #[test]
    fn test_wall_stops_beam_without_damage() {
        let mut w = world();
        w.spawn(tank(1, Vec2::new(0.0, 50.0), Some(1)));
        w.spawn(wall(5, Vec2::new(100.0, 50.0), 10.0, 100.0));
        w.spawn(tank(2, Vec2::new(200.0, 50.0), Some(2)));
        let mut hooks = RecordingHooks::default();

        let result = fire_hitscan(
            &mut w,
            &FixedStats::default(),
            &mut hooks,
            Vec2::new(0.0, 50.0),
            0.0,
            1,
            &barrel(25.0),
        );

        assert_eq!(result.target, None);
        assert!((result.end.x - 95.0).abs() < 1e-3);
        assert_eq!(w.get(2).expect("tank").health, 100.0);
        assert!(w.events.iter().any(|e| matches!(e, SimEvent::Beam { hit: false, .. })));
    }

    #[test]
    fn test_miss_still_draws_full_length_beam() {
        let mut w = world();
        w.spawn(tank(1, Vec2::new(0.0, 50.0), Some(1)));
        let stats = FixedStats {
            bullet_speed: 1.0,
            ..Default::default()
        };
        let mut hooks = RecordingHooks::default();

        let result = fire_hitscan(&mut w, &stats, &mut hooks, Vec2::ZERO, 0.0, 1, &barrel(10.0));

        assert_eq!(result.target, None);
        assert!((result.end - Vec2::new(420.0, 0.0)).length() < 1e-3);
        assert_eq!(
            w.events,
            vec![SimEvent::Beam {
                from: Vec2::ZERO,
                to: result.end,
                hit: false
            }]
        );
    }

    #[test]
    fn test_teammates_and_own_drones_are_transparent() {
        let mut w = world();
        w.spawn(tank(1, Vec2::new(0.0, 50.0), Some(1)));
        w.spawn(tank(2, Vec2::new(100.0, 50.0), Some(1)));
        let mut drone = tank(4, Vec2::new(150.0, 50.0), None);
        drone.kind = EntityKind::Drone { homing: None };
        drone.owner_id = Some(1);
        w.spawn(drone);
        w.spawn(tank(3, Vec2::new(200.0, 50.0), Some(2)));
        let mut hooks = RecordingHooks::default();

        let result = fire_hitscan(
            &mut w,
            &FixedStats::default(),
            &mut hooks,
            Vec2::new(0.0, 50.0),
            0.0,
            1,
            &barrel(10.0),
        );

        assert_eq!(result.target, Some(3));
    }

    #[test]
    fn test_guaranteed_crit_applies_element_and_kills() {
        let mut w = world();
        w.spawn(tank(1, Vec2::new(0.0, 50.0), Some(1)));
        let mut victim = tank(2, Vec2::new(100.0, 50.0), Some(2));
        victim.health = 30.0;
        w.spawn(victim);
        let stats = FixedStats {
            crit_chance: 1.0,
            ..Default::default()
        };
        let mut hooks = RecordingHooks::default();

        let result = fire_hitscan(
            &mut w,
            &stats,
            &mut hooks,
            Vec2::new(0.0, 50.0),
            0.0,
            1,
            &HitscanBarrel {
                damage: 20.0,
                element: Some(Element::Incendiary),
            },
        );

        assert!(result.crit);
        assert!(result.killed);
        let victim = w.get(2).expect("victim");
        assert!(victim.is_dead);
        assert_eq!(victim.health, 0.0);
        assert!(
            victim
                .status
                .iter()
                .any(|e| matches!(e.kind, StatusKind::Burn { .. }) && e.source_id == 1)
        );
        assert_eq!(hooks.deaths, vec![(2, Some(1))]);
    }
}

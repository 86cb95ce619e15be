//! Collision detection and response
//!
//! Two passes per tick:
//! 1. Discrete: every unordered live pair is classified (ignore, wall contact,
//!    push only, full contact), overlapping contacts run the damage pipeline
//!    and are then separated by mass.
//! 2. Swept: each live bullet's previous->current segment is tested against
//!    every eligible body so fast bullets cannot skip over thin targets.

use glam::Vec2;

use super::damage::{DamageCtx, Kill, detonate, report_kills, resolve_contact};
use super::events::SimEvent;
use super::geometry::{Rect, line_circle_intersect, line_rect_intersect, point_in_rect};
use super::ports::{SimHooks, SoundCue};
use super::state::{Collider, Entity, EntityId, EntityKind, World, pair_mut};
use crate::consts::{RESTITUTION, ZERO_DISTANCE_EPSILON};
use crate::settings::Settings;

/// Distance from a circle's edge within which a swept segment counts as
/// already touching it (covers float error from the previous snap)
const SWEPT_CONTACT_SLOP: f32 = 0.01;

/// How a pair of bodies interacts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    /// Pass through each other
    Ignore,
    /// A bullet against a wall: point test in the discrete pass, segment test in the swept pass
    BulletWall { wall_is_a: bool },
    /// A circular body pushed out of a wall
    PushOut { wall_is_a: bool },
    /// Positional separation without damage
    SeparateOnly,
    /// Damage pipeline, then separation
    Contact,
}

impl Pairing {
    /// Pairings a bullet segment can hit in the swept pass
    fn is_swept_target(&self) -> bool {
        matches!(self, Pairing::Contact | Pairing::BulletWall { .. })
    }
}

/// Apply ownership, team and toggle rules to a pair
pub fn classify(a: &Entity, b: &Entity, settings: &Settings) -> Pairing {
    if matches!(a.kind, EntityKind::Zone) || matches!(b.kind, EntityKind::Zone) {
        return Pairing::Ignore;
    }

    match (a.kind.is_wall(), b.kind.is_wall()) {
        (true, true) => return Pairing::Ignore,
        (true, false) | (false, true) => {
            let wall_is_a = a.kind.is_wall();
            let body = if wall_is_a { b } else { a };
            return if body.kind.is_bullet() {
                Pairing::BulletWall { wall_is_a }
            } else {
                Pairing::PushOut { wall_is_a }
            };
        }
        (false, false) => {}
    }

    if a.same_owner(b) {
        return if a.kind.is_drone() && b.kind.is_drone() {
            Pairing::SeparateOnly
        } else {
            Pairing::Ignore
        };
    }
    if a.owns_or_owned_by(b) {
        return Pairing::Ignore;
    }

    if a.same_team(b) {
        return if a.kind.is_projectile() || b.kind.is_projectile() {
            Pairing::Ignore
        } else {
            Pairing::SeparateOnly
        };
    }

    if a.kind.is_bullet() && b.kind.is_bullet() && !settings.bullet_collisions {
        return Pairing::Ignore;
    }

    Pairing::Contact
}

/// Run the discrete and swept passes over the whole world
pub fn resolve_collisions(world: &mut World, hooks: &mut dyn SimHooks) {
    let listener = world.listener_pos();
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
        hooks,
    };

    let mut kills = Vec::new();
    let contacts = discrete_pass(entities, &mut ctx, &mut kills);
    swept_pass(entities, &mut ctx, &contacts, &mut kills);

    let hooks = ctx.hooks;
    report_kills(entities, kills, hooks);
}

/// Normalised key for a bullet pair already resolved this tick
fn contact_key(a: EntityId, b: EntityId) -> (EntityId, EntityId) {
    (a.min(b), a.max(b))
}

fn discrete_pass(
    entities: &mut [Entity],
    ctx: &mut DamageCtx,
    kills: &mut Vec<Kill>,
) -> Vec<(EntityId, EntityId)> {
    let mut contacts = Vec::new();
    let n = entities.len();

    for i in 0..n {
        for j in (i + 1)..n {
            if entities[i].is_dead || entities[j].is_dead {
                continue;
            }
            let pairing = classify(&entities[i], &entities[j], ctx.settings);
            let (a, b) = pair_mut(entities, i, j);

            match pairing {
                Pairing::Ignore => {}
                Pairing::BulletWall { wall_is_a } => {
                    let (wall, bullet) = if wall_is_a { (a, b) } else { (b, a) };
                    if let Some(rect) = wall.rect_bounds() {
                        if point_in_rect(bullet.pos, &rect) {
                            kill_in_wall(bullet, ctx);
                        }
                    }
                }
                Pairing::PushOut { wall_is_a } => {
                    let (wall, body) = if wall_is_a { (a, b) } else { (b, a) };
                    if let (Some(rect), Some(radius)) = (wall.rect_bounds(), body.radius()) {
                        push_out_of_wall(body, radius, &rect);
                    }
                }
                Pairing::SeparateOnly => {
                    separate(a, b, ctx);
                }
                Pairing::Contact => {
                    let (Some(ra), Some(rb)) = (a.radius(), b.radius()) else {
                        continue;
                    };
                    if a.pos.distance_squared(b.pos) >= (ra + rb) * (ra + rb) {
                        continue;
                    }
                    if a.kind.is_bullet() || b.kind.is_bullet() {
                        contacts.push(contact_key(a.id, b.id));
                    }

                    let outcome = resolve_contact(a, i, b, j, ctx);
                    if (a.is_alive() && b.is_alive()) || (a.kind.is_bullet() && b.kind.is_bullet()) {
                        separate(a, b, ctx);
                    }

                    for detonation in &outcome.detonations {
                        kills.extend(detonate(entities, detonation, ctx));
                    }
                    kills.extend(outcome.kills);
                }
            }
        }
    }

    contacts
}

fn swept_pass(
    entities: &mut [Entity],
    ctx: &mut DamageCtx,
    contacts: &[(EntityId, EntityId)],
    kills: &mut Vec<Kill>,
) {
    for i in 0..entities.len() {
        let bullet = &entities[i];
        if bullet.is_dead || !bullet.kind.is_bullet() {
            continue;
        }
        let Some(start) = bullet.prev_pos else {
            continue;
        };
        let end = bullet.pos;
        if start == end {
            continue;
        }

        let Some((j, point)) = nearest_swept_hit(entities, i, start, end, ctx.settings, contacts)
        else {
            continue;
        };

        entities[i].pos = point;
        if entities[j].kind.is_wall() {
            kill_in_wall(&mut entities[i], ctx);
            continue;
        }

        let (a, b) = pair_mut(entities, i, j);
        let outcome = resolve_contact(a, i, b, j, ctx);
        for detonation in &outcome.detonations {
            kills.extend(detonate(entities, detonation, ctx));
        }
        kills.extend(outcome.kills);
    }
}

/// Earliest body hit by the segment, by squared distance from its start.
/// Ties keep the lower index.
fn nearest_swept_hit(
    entities: &[Entity],
    bullet_index: usize,
    start: Vec2,
    end: Vec2,
    settings: &Settings,
    contacts: &[(EntityId, EntityId)],
) -> Option<(usize, Vec2)> {
    let bullet = &entities[bullet_index];
    let mut best: Option<(usize, Vec2, f32)> = None;

    for (j, other) in entities.iter().enumerate() {
        if j == bullet_index || other.is_dead {
            continue;
        }
        if !classify(bullet, other, settings).is_swept_target() {
            continue;
        }
        if contacts.contains(&contact_key(bullet.id, other.id)) {
            continue;
        }

        let hit = match other.collider {
            Collider::Circle { radius } => {
                // Entering hits only: a segment starting on or inside the body
                // is overlap, which the discrete pass owns
                let reach = radius + SWEPT_CONTACT_SLOP;
                if start.distance_squared(other.pos) <= reach * reach {
                    continue;
                }
                line_circle_intersect(start, end, other.pos, radius)
            }
            Collider::Rect { .. } => other
                .rect_bounds()
                .and_then(|rect| line_rect_intersect(start, end, &rect)),
        };
        if let Some(point) = hit {
            let d2 = start.distance_squared(point);
            if best.is_none_or(|(_, _, best_d2)| d2 < best_d2) {
                best = Some((j, point, d2));
            }
        }
    }

    best.map(|(j, point, _)| (j, point))
}

fn kill_in_wall(bullet: &mut Entity, ctx: &mut DamageCtx) {
    bullet.is_dead = true;
    ctx.events.push(SimEvent::Spark { pos: bullet.pos });
    ctx.hooks
        .play_audio(SoundCue::WallImpact, bullet.pos, ctx.listener);
    log::trace!("bullet {} stopped by wall", bullet.id);
}

/// Push a circle out of a rectangle along the shortest path and cancel the
/// velocity component pointing into the wall.
pub fn push_out_of_wall(body: &mut Entity, radius: f32, rect: &Rect) -> bool {
    let closest = rect.closest_point(body.pos);
    let delta = body.pos - closest;
    let dist = delta.length();
    if dist >= radius {
        return false;
    }

    let (normal, depth) = if dist > ZERO_DISTANCE_EPSILON {
        (delta / dist, radius - dist)
    } else {
        // Centre is inside the rectangle: leave through the nearest face
        let min = rect.min();
        let max = rect.max();
        let p = body.pos;
        [
            (p.x - min.x, Vec2::NEG_X),
            (max.x - p.x, Vec2::X),
            (p.y - min.y, Vec2::NEG_Y),
            (max.y - p.y, Vec2::Y),
        ]
        .into_iter()
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(d, n)| (n, d + radius))
        .unwrap_or((Vec2::X, radius))
    };

    body.pos += normal * depth;
    let into = body.vel.dot(normal);
    if into < 0.0 {
        body.vel -= normal * into;
    }
    true
}

/// Mass-weighted positional separation plus the optional knockback impulse
fn separate(a: &mut Entity, b: &mut Entity, ctx: &mut DamageCtx) {
    let (Some(ra), Some(rb)) = (a.radius(), b.radius()) else {
        return;
    };
    let delta = b.pos - a.pos;
    let dist = delta.length();
    let overlap = ra + rb - dist;
    if overlap <= 0.0 {
        return;
    }

    if a.kind.is_bullet() && b.kind.is_bullet() {
        ctx.events.push(SimEvent::Spark {
            pos: a.pos.lerp(b.pos, 0.5),
        });
        return;
    }

    let normal = if dist > ZERO_DISTANCE_EPSILON {
        delta / dist
    } else {
        Vec2::X
    };
    let total = a.mass + b.mass;
    a.pos -= normal * overlap * (b.mass / total);
    b.pos += normal * overlap * (a.mass / total);

    if ctx.settings.knockback {
        apply_impulse(a, b, normal);
    }
}

fn apply_impulse(a: &mut Entity, b: &mut Entity, normal: Vec2) {
    let closing = (b.vel - a.vel).dot(normal);
    if closing >= 0.0 {
        return;
    }
    let impulse = -(1.0 + RESTITUTION) * closing / (1.0 / a.mass + 1.0 / b.mass);
    a.vel -= normal * (impulse / a.mass);
    b.vel += normal * (impulse / b.mass);
}

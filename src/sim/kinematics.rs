//! Kinematics integration
//!
//! Moves every live entity by one timestep and applies its boundary policy.
//! Must run before collision resolution: the previous position captured here
//! is what the swept bullet pass tests against.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::events::SimEvent;
use super::ports::{Biome, StatProvider, Terrain};
use super::state::{BulletState, Entity, EntityKind, Homing, World};
use crate::consts::FALLBACK_MASS;
use crate::settings::Settings;
use crate::{frame_decay, heading};

/// Recoil below this is snapped to zero
const RECOIL_EPSILON: f32 = 0.01;

/// Clamp a provider mass to something strictly positive
#[inline]
pub fn sanitize_mass(mass: f32) -> f32 {
    if mass.is_finite() && mass > 0.0 {
        mass
    } else {
        FALLBACK_MASS
    }
}

/// Advance every live entity by `dt`
pub fn integrate(world: &mut World, dt: f32, stats: &dyn StatProvider, terrain: &dyn Terrain) {
    let bounds = world.bounds;
    let World {
        entities,
        settings,
        events,
        rng,
        ..
    } = world;

    for entity in entities.iter_mut().filter(|e| e.is_alive()) {
        entity.flash_timer = (entity.flash_timer - dt).max(0.0);
        entity.prev_pos = Some(entity.pos);
        entity.mass = sanitize_mass(stats.mass(entity));

        if entity.kind.is_static() {
            continue;
        }

        let coefficient = match terrain.biome(entity.pos) {
            Biome::Ice => settings.ice_friction,
            Biome::Plains => settings.friction,
        };
        entity.vel *= frame_decay(coefficient, dt);

        entity.pos += entity.vel * dt;

        apply_boundary_policy(entity, bounds, dt, settings, rng);
        tick_lifespan(entity, dt);
        decay_recoil(entity, dt, settings.recoil_decay);

        if entity.is_alive() {
            emit_trail(entity, dt, settings, rng, events);
        }
    }
}

fn apply_boundary_policy(
    entity: &mut Entity,
    bounds: Vec2,
    dt: f32,
    settings: &Settings,
    rng: &mut Pcg32,
) {
    match &mut entity.kind {
        EntityKind::Tank(tank) => {
            let unclamped = entity.pos;
            entity.pos = entity.pos.clamp(Vec2::ZERO, bounds);
            if entity.pos.x != unclamped.x {
                entity.vel.x = 0.0;
            }
            if entity.pos.y != unclamped.y {
                entity.vel.y = 0.0;
            }

            let moved = entity.prev_pos.map_or(0.0, |prev| entity.pos.distance(prev));
            let forward = heading(entity.rotation).dot(entity.vel) >= 0.0;
            tank.distance_traveled += if forward { moved } else { -moved };
        }
        EntityKind::Shape => {
            if (entity.pos.x < 0.0 && entity.vel.x < 0.0)
                || (entity.pos.x > bounds.x && entity.vel.x > 0.0)
            {
                entity.vel.x = -entity.vel.x;
            }
            if (entity.pos.y < 0.0 && entity.vel.y < 0.0)
                || (entity.pos.y > bounds.y && entity.vel.y > 0.0)
            {
                entity.vel.y = -entity.vel.y;
            }
        }
        EntityKind::Bullet(BulletState {
            homing: Some(homing),
            ..
        })
        | EntityKind::Drone {
            homing: Some(homing),
        } => propel(&mut entity.vel, &mut entity.rotation, homing, dt, settings, rng),
        _ => {}
    }

    if entity.kind.is_projectile() {
        kill_out_of_bounds(entity, bounds);
    }
}

fn kill_out_of_bounds(entity: &mut Entity, bounds: Vec2) {
    let p = entity.pos;
    if p.x < 0.0 || p.y < 0.0 || p.x > bounds.x || p.y > bounds.y {
        entity.is_dead = true;
        log::trace!("entity {} left the arena", entity.id);
    }
}

/// Accelerate along the current heading with a little random wobble
fn propel(
    vel: &mut Vec2,
    rotation: &mut f32,
    homing: &mut Homing,
    dt: f32,
    settings: &Settings,
    rng: &mut Pcg32,
) {
    let jitter = settings.homing_jitter * dt;
    if jitter > 0.0 {
        let nudge = rng.random_range(-jitter..=jitter);
        // Pull accumulated wobble back toward the launch heading
        let correction = -homing.wobble * 0.1;
        homing.wobble += nudge + correction;
        *rotation += nudge + correction;
    }

    *vel += heading(*rotation) * settings.homing_acceleration * dt;
    let speed = vel.length();
    if speed > settings.homing_max_speed {
        *vel *= settings.homing_max_speed / speed;
    }
}

fn tick_lifespan(entity: &mut Entity, dt: f32) {
    if let Some(lifespan) = entity.lifespan.as_mut() {
        *lifespan -= dt;
        if *lifespan <= 0.0 {
            entity.is_dead = true;
        }
    }
}

fn decay_recoil(entity: &mut Entity, dt: f32, rate: f32) {
    if let EntityKind::Tank(tank) = &mut entity.kind {
        let factor = (-rate * dt).exp();
        for barrel in tank.barrels.iter_mut() {
            barrel.recoil *= factor;
            if barrel.recoil.abs() < RECOIL_EPSILON {
                barrel.recoil = 0.0;
            }
        }
    }
}

/// Fast bullets leave trail puffs along this tick's path
fn emit_trail(
    entity: &Entity,
    dt: f32,
    settings: &Settings,
    rng: &mut Pcg32,
    events: &mut Vec<SimEvent>,
) {
    if !entity.kind.is_bullet() || settings.trail_speed_threshold <= 0.0 {
        return;
    }
    let Some(prev) = entity.prev_pos else {
        return;
    };

    let speed = entity.vel.length();
    let probability = (speed / settings.trail_speed_threshold * dt * crate::consts::REFERENCE_FPS)
        .clamp(0.0, 1.0);
    if rng.random::<f32>() >= probability {
        return;
    }

    let samples = settings.trail_samples.max(1);
    for i in 0..samples {
        let t = (i as f32 + rng.random::<f32>()) / samples as f32;
        events.push(SimEvent::Trail {
            pos: prev.lerp(entity.pos, t),
            vel: -entity.vel,
        });
    }
}

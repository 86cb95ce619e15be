//! Fixed timestep simulation tick
//!
//! Advances the world deterministically: integrate, resolve collisions, then
//! age status effects.

use super::collision::resolve_collisions;
use super::kinematics::integrate;
use super::ports::TickContext;
use super::state::World;
use super::status::update_status_effects;
use crate::consts::MAX_FRAME_DT;

/// Advance the world by one timestep
pub fn tick(world: &mut World, dt: f32, ctx: &mut TickContext) {
    world.time += dt;
    world.time_ticks += 1;

    // Integration captures previous positions for the swept pass
    integrate(world, dt, ctx.stats, ctx.terrain);
    resolve_collisions(world, &mut *ctx.hooks);

    let mut dot_deaths = update_status_effects(&mut world.entities, dt, world.time);
    if world.settings.attribute_dot_kills && !dot_deaths.is_empty() {
        dot_deaths.sort_by_key(|d| d.victim_id);
        for death in dot_deaths {
            let Some(victim) = world.get(death.victim_id) else {
                continue;
            };
            let killer = death.source_id.and_then(|id| world.get(id));
            ctx.hooks.on_death(victim, killer);
        }
    }
}

/// Sanitize a raw frame delta before it is fed to the accumulator
pub fn clamp_frame_dt(raw: f32) -> f32 {
    if raw.is_nan() || raw <= 0.0 {
        return 0.0;
    }
    if raw > MAX_FRAME_DT {
        log::debug!("frame dt {raw:.3}s clamped to {MAX_FRAME_DT}s");
        return MAX_FRAME_DT;
    }
    raw
}

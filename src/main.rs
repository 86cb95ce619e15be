//! Arena Core headless entry point
//!
//! Builds a small two-team skirmish and runs it through the fixed timestep
//! loop without any rendering. Useful for soak testing and log inspection.

use arena_core::consts::*;
use arena_core::sim::{
    BulletState, Element, Entity, EntityKind, FlatTerrain, FxPool, HitscanBarrel, SimHooks,
    SoundCue, StatKey, StatProvider, TankState, TickContext, World, clamp_frame_dt, fire_hitscan,
    tick,
};
use arena_core::Settings;
use glam::Vec2;

/// Where the demo looks for its tuning file
const SETTINGS_PATH: &str = "arena.json";
/// Simulated wall-clock length of the demo in seconds
const DEMO_SECONDS: f32 = 12.0;
/// Upper bound on live cosmetic particles
const FX_CAPACITY: usize = 512;

/// Flat stats: every tank weighs by its size, every shooter has the same upgrades
struct DemoStats;

impl StatProvider for DemoStats {
    fn stat(&self, _entity: &Entity, key: StatKey) -> f32 {
        match key {
            StatKey::BulletSpeed => 2.0,
            StatKey::CritChance => 0.2,
        }
    }

    fn mass(&self, entity: &Entity) -> f32 {
        match entity.kind {
            EntityKind::Tank(_) => entity.radius().unwrap_or(1.0) * 0.1,
            _ => 1.0,
        }
    }
}

/// Hooks that log what a presentation layer would react to
#[derive(Default)]
struct DemoHooks {
    kills: u32,
    shake: f32,
}

impl SimHooks for DemoHooks {
    fn on_death(&mut self, victim: &Entity, killer: Option<&Entity>) {
        self.kills += 1;
        log::info!(
            "entity {} killed by {}",
            victim.id,
            killer.map_or_else(|| "nobody".to_string(), |k| k.id.to_string())
        );
    }

    fn on_shake(&mut self, amount: f32) {
        self.shake = self.shake.max(amount);
    }

    fn play_audio(&mut self, cue: SoundCue, pos: Vec2, listener: Vec2) {
        log::trace!("{cue:?} at {:.0} px from listener", pos.distance(listener));
    }
}

fn build_world(settings: Settings) -> World {
    let mut world = World::new(Vec2::new(1200.0, 800.0), settings, 0x5eed);
    let mut next_id = 1;
    let mut id = || {
        let current = next_id;
        next_id += 1;
        current
    };

    // Cover in the middle of the arena
    world.spawn(Entity::rect(id(), EntityKind::Wall, Vec2::new(600.0, 400.0), 40.0, 240.0));
    world.spawn(Entity::rect(id(), EntityKind::Wall, Vec2::new(600.0, 120.0), 200.0, 30.0));

    for (team, x) in [(1, 200.0), (2, 1000.0)] {
        for row in 0..3 {
            let mut tank = Entity::circle(
                id(),
                EntityKind::Tank(TankState::default()),
                Vec2::new(x, 250.0 + row as f32 * 150.0),
                24.0,
            );
            tank.team_id = Some(team);
            tank.contact_damage = 5.0;
            tank.rotation = if team == 1 { 0.0 } else { std::f32::consts::PI };
            world.spawn(tank);
        }
    }
    world.player_id = world.entities.iter().find(|e| e.kind.is_tank()).map(|e| e.id);

    for shape in 0..6 {
        let mut s = Entity::circle(
            id(),
            EntityKind::Shape,
            Vec2::new(450.0 + shape as f32 * 60.0, 650.0),
            14.0,
        );
        s.vel = Vec2::new(40.0, -25.0 * shape as f32);
        world.spawn(s);
    }

    world
}

/// Every tank fires one bullet toward the opposing side
fn volley(world: &mut World, next_id: &mut u32, round: u32) {
    let shooters: Vec<_> = world
        .entities
        .iter()
        .filter(|e| e.is_alive() && e.kind.is_tank())
        .map(|e| (e.id, e.team_id, e.pos, e.rotation))
        .collect();

    for (owner, team, pos, rotation) in shooters {
        let dir = arena_core::heading(rotation);
        let element = match round % 3 {
            0 => Some(Element::Incendiary),
            1 => Some(Element::Cryo),
            _ => None,
        };
        let mut bullet = Entity::circle(
            *next_id,
            EntityKind::Bullet(BulletState {
                crit: round % 5 == 0,
                element,
                explosion_radius: (round % 4 == 0).then_some(60.0),
                homing: None,
            }),
            pos + dir * 30.0,
            6.0,
        );
        *next_id += 1;
        bullet.owner_id = Some(owner);
        bullet.team_id = team;
        bullet.vel = dir * 900.0;
        bullet.health = 10.0;
        bullet.contact_damage = 12.0;
        bullet.lifespan = Some(2.0);
        world.spawn(bullet);
    }
}

fn main() {
    env_logger::init();
    log::info!("Arena Core (headless) starting...");

    let settings = Settings::load_or_default(SETTINGS_PATH);
    let mut world = build_world(settings);
    log::info!("World initialized with {} entities", world.entities.len());

    let stats = DemoStats;
    let terrain = FlatTerrain::default();
    let mut hooks = DemoHooks::default();
    let mut fx = FxPool::with_capacity(FX_CAPACITY);
    let mut next_bullet_id = 1000;

    let mut accumulator = 0.0;
    let mut elapsed = 0.0;
    let mut frame = 0u32;
    let mut next_volley = 0.0;
    let mut next_beam = 1.0;
    let mut round = 0;

    while elapsed < DEMO_SECONDS {
        // Uneven frame pacing with the occasional long hitch
        let raw = if frame % 97 == 96 { 0.6 } else { 1.0 / 50.0 };
        let dt = clamp_frame_dt(raw);
        elapsed += dt;
        frame += 1;

        if elapsed >= next_volley {
            volley(&mut world, &mut next_bullet_id, round);
            round += 1;
            next_volley += 0.75;
        }

        if elapsed >= next_beam {
            if let Some(player) = world.player_id.and_then(|id| world.get(id)) {
                let (origin, angle, owner) = (player.pos, player.rotation, player.id);
                let barrel = HitscanBarrel {
                    damage: 20.0,
                    element: Some(Element::Cryo),
                };
                let result = fire_hitscan(&mut world, &stats, &mut hooks, origin, angle, owner, &barrel);
                log::debug!("beam hit {:?} (crit: {})", result.target, result.crit);
            }
            next_beam += 1.0;
        }

        accumulator += dt;
        let mut substeps = 0;
        {
            let mut ctx = TickContext::new(&stats, &terrain, &mut hooks);
            while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                tick(&mut world, SIM_DT, &mut ctx);
                accumulator -= SIM_DT;
                substeps += 1;
            }
        }
        if substeps == MAX_SUBSTEPS && accumulator >= SIM_DT {
            log::warn!("Dropping {:.3}s of simulation time", accumulator);
            accumulator = 0.0;
        }

        fx.absorb(world.drain_events());
        fx.update(dt);
        world.remove_dead();
        hooks.shake *= 0.9;
    }

    let survivors = world.entities.iter().filter(|e| e.kind.is_tank()).count();
    log::info!(
        "Finished {} ticks: {} kills, {} tanks standing, {} live particles",
        world.time_ticks,
        hooks.kills,
        survivors,
        fx.len()
    );
}

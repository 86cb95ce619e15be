//! World state and core simulation types
//!
//! Entities are created fully populated by spawn/weapon logic outside the
//! core. The core only mutates them and tombstones them; physical removal is
//! the caller's job (`World::remove_dead`).

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::events::SimEvent;
use super::geometry::Rect;
use super::status::StatusLedger;
use crate::consts::FALLBACK_MASS;
use crate::settings::Settings;

pub type EntityId = u32;
pub type TeamId = u32;

/// Collision shape of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Collider {
    Circle { radius: f32 },
    /// Axis-aligned rectangle centred on the entity position
    Rect { width: f32, height: f32 },
}

/// Elemental payload carried by a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Element {
    /// Applies Burn
    Incendiary,
    /// Applies Slow
    Cryo,
}

/// Self-propelled projectile marker
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Homing {
    /// Accumulated heading wobble, kept so jitter stays small and smooth
    pub wobble: f32,
}

/// A single gun barrel on a tank (cosmetic recoil only)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Barrel {
    /// Current recoil offset, decays toward zero
    pub recoil: f32,
}

/// Tank payload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TankState {
    pub barrels: Vec<Barrel>,
    /// Signed distance travelled (negative when reversing)
    pub distance_traveled: f32,
    pub boss: bool,
}

/// Bullet payload
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BulletState {
    /// Rolled by the firing logic at spawn time
    pub crit: bool,
    pub element: Option<Element>,
    /// Present on high-explosive rounds
    pub explosion_radius: Option<f32>,
    pub homing: Option<Homing>,
}

/// Entity kind with its kind-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Tank(TankState),
    Bullet(BulletState),
    Drone { homing: Option<Homing> },
    Trap,
    Shape,
    Wall,
    /// Static sensor region, never collides
    Zone,
}

impl EntityKind {
    #[inline]
    pub fn is_tank(&self) -> bool {
        matches!(self, EntityKind::Tank(_))
    }

    #[inline]
    pub fn is_bullet(&self) -> bool {
        matches!(self, EntityKind::Bullet(_))
    }

    #[inline]
    pub fn is_wall(&self) -> bool {
        matches!(self, EntityKind::Wall)
    }

    #[inline]
    pub fn is_drone(&self) -> bool {
        matches!(self, EntityKind::Drone { .. })
    }

    /// Bullets, drones and traps: spawned by a tank, pass through teammates
    #[inline]
    pub fn is_projectile(&self) -> bool {
        matches!(
            self,
            EntityKind::Bullet(_) | EntityKind::Drone { .. } | EntityKind::Trap
        )
    }

    /// Never moves and never takes part in integration
    #[inline]
    pub fn is_static(&self) -> bool {
        matches!(self, EntityKind::Wall | EntityKind::Zone)
    }
}

/// A simulated body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vec2,
    /// Position at the start of the current tick, for swept tests
    pub prev_pos: Option<Vec2>,
    pub vel: Vec2,
    pub collider: Collider,
    pub rotation: f32,
    /// Cached from the stat provider each tick
    pub mass: f32,
    pub health: f32,
    pub max_health: f32,
    pub contact_damage: f32,
    pub owner_id: Option<EntityId>,
    pub team_id: Option<TeamId>,
    /// Finalized externally before the tick; read-only here
    pub is_invulnerable: bool,
    pub is_dead: bool,
    /// Seconds until expiry
    pub lifespan: Option<f32>,
    pub status: StatusLedger,
    /// World time of the last damage-over-time tick
    pub last_damage_time: f32,
    /// Cosmetic hit flash
    pub flash_timer: f32,
}

impl Entity {
    /// Create a circular entity with sane defaults
    pub fn circle(id: EntityId, kind: EntityKind, pos: Vec2, radius: f32) -> Self {
        Self::with_collider(id, kind, pos, Collider::Circle { radius })
    }

    /// Create a rectangular entity with sane defaults
    pub fn rect(id: EntityId, kind: EntityKind, pos: Vec2, width: f32, height: f32) -> Self {
        Self::with_collider(id, kind, pos, Collider::Rect { width, height })
    }

    fn with_collider(id: EntityId, kind: EntityKind, pos: Vec2, collider: Collider) -> Self {
        Self {
            id,
            kind,
            pos,
            prev_pos: None,
            vel: Vec2::ZERO,
            collider,
            rotation: 0.0,
            mass: FALLBACK_MASS,
            health: 100.0,
            max_health: 100.0,
            contact_damage: 0.0,
            owner_id: None,
            team_id: None,
            is_invulnerable: false,
            is_dead: false,
            lifespan: None,
            status: StatusLedger::default(),
            last_damage_time: 0.0,
            flash_timer: 0.0,
        }
    }

    /// Radius for circular bodies
    #[inline]
    pub fn radius(&self) -> Option<f32> {
        match self.collider {
            Collider::Circle { radius } => Some(radius),
            Collider::Rect { .. } => None,
        }
    }

    /// World-space rectangle for rectangular bodies
    #[inline]
    pub fn rect_bounds(&self) -> Option<Rect> {
        match self.collider {
            Collider::Rect { width, height } => Some(Rect::new(self.pos, width, height)),
            Collider::Circle { .. } => None,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    /// Bullet payload, if this is a bullet
    #[inline]
    pub fn bullet(&self) -> Option<&BulletState> {
        match &self.kind {
            EntityKind::Bullet(state) => Some(state),
            _ => None,
        }
    }

    /// Id credited for this body's damage (the firing tank for projectiles)
    #[inline]
    pub fn attribution_id(&self) -> EntityId {
        self.owner_id.unwrap_or(self.id)
    }

    /// Both bodies carry the same team id
    #[inline]
    pub fn same_team(&self, other: &Entity) -> bool {
        matches!((self.team_id, other.team_id), (Some(a), Some(b)) if a == b)
    }

    /// Both bodies were spawned by the same owner
    #[inline]
    pub fn same_owner(&self, other: &Entity) -> bool {
        matches!((self.owner_id, other.owner_id), (Some(a), Some(b)) if a == b)
    }

    /// One body owns the other (a tank and its own projectile)
    #[inline]
    pub fn owns_or_owned_by(&self, other: &Entity) -> bool {
        self.owner_id == Some(other.id) || other.owner_id == Some(self.id)
    }
}

/// Complete simulation world
#[derive(Debug, Clone)]
pub struct World {
    /// Width and height; the playable area is [0, w] x [0, h]
    pub bounds: Vec2,
    pub settings: Settings,
    /// Entities in stable creation order
    pub entities: Vec<Entity>,
    /// The locally controlled tank, used for damage-number tone and audio listener
    pub player_id: Option<EntityId>,
    /// Cosmetic output for the presentation layer
    pub events: Vec<SimEvent>,
    /// Accumulated simulation time in seconds
    pub time: f32,
    pub time_ticks: u64,
    pub(crate) rng: Pcg32,
}

impl World {
    pub fn new(bounds: Vec2, settings: Settings, seed: u64) -> Self {
        Self {
            bounds,
            settings,
            entities: Vec::new(),
            player_id: None,
            events: Vec::new(),
            time: 0.0,
            time_ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Add an externally created entity
    pub fn spawn(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub(crate) fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id == id)
    }

    /// Position of the local player, used as the audio listener
    pub fn listener_pos(&self) -> Vec2 {
        self.player_id
            .and_then(|id| self.get(id))
            .map(|e| e.pos)
            .unwrap_or(self.bounds * 0.5)
    }

    /// Take all pending cosmetic events
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, SimEvent> {
        self.events.drain(..)
    }

    /// Physically remove tombstoned entities (the external cleanup step)
    pub fn remove_dead(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(Entity::is_alive);
        before - self.entities.len()
    }
}

/// Borrow two distinct entities mutably, in the order requested
pub(crate) fn pair_mut(entities: &mut [Entity], i: usize, j: usize) -> (&mut Entity, &mut Entity) {
    debug_assert_ne!(i, j);
    if i < j {
        let (lo, hi) = entities.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = entities.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_and_owner_relations() {
        let mut a = Entity::circle(1, EntityKind::Shape, Vec2::ZERO, 5.0);
        let mut b = Entity::circle(2, EntityKind::Shape, Vec2::ZERO, 5.0);
        assert!(!a.same_team(&b));
        assert!(!a.same_owner(&b));

        a.team_id = Some(3);
        b.team_id = Some(3);
        assert!(a.same_team(&b));

        a.owner_id = Some(2);
        assert!(a.owns_or_owned_by(&b));
        assert_eq!(a.attribution_id(), 2);
        assert_eq!(b.attribution_id(), 2);
    }

    #[test]
    fn test_pair_mut_respects_order() {
        let mut list = vec![
            Entity::circle(10, EntityKind::Shape, Vec2::ZERO, 1.0),
            Entity::circle(20, EntityKind::Shape, Vec2::ZERO, 1.0),
            Entity::circle(30, EntityKind::Shape, Vec2::ZERO, 1.0),
        ];
        let (a, b) = pair_mut(&mut list, 2, 0);
        assert_eq!((a.id, b.id), (30, 10));
        let (a, b) = pair_mut(&mut list, 0, 1);
        assert_eq!((a.id, b.id), (10, 20));
    }

    #[test]
    fn test_remove_dead() {
        let mut world = World::new(Vec2::splat(100.0), Settings::default(), 1);
        world.spawn(Entity::circle(1, EntityKind::Shape, Vec2::ZERO, 1.0));
        let mut dead = Entity::circle(2, EntityKind::Shape, Vec2::ZERO, 1.0);
        dead.is_dead = true;
        world.spawn(dead);
        assert_eq!(world.remove_dead(), 1);
        assert!(world.get(2).is_none());
        assert!(world.get(1).is_some());
    }
}

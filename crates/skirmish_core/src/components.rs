//! Entity definitions: units, buildings and resource nodes.
//!
//! Entities are plain data. Behaviour lives in the systems that step them
//! ([`crate::systems`], [`crate::combat`], [`crate::economy`]).
//!
//! Cross-entity relations never hold a reference: a unit's task stores the
//! [`EntityId`] of its target, and the target is looked up again every tick.
//! Ids are never reused, so a missing id always means "gone".

use serde::{Deserialize, Serialize};

use crate::data::{BuildingKind, UnitKind, ARCHER_ATTACK_RANGE};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Unique identifier for entities.
pub type EntityId = u64;

/// Health component for damageable entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    pub current: u32,
    /// Maximum health points.
    pub max: u32,
}

impl Health {
    /// Create new health component at full health.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Check if entity is dead (health == 0).
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Apply damage, returning actual damage dealt.
    /// Uses saturating subtraction to prevent underflow.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.current);
        self.current = self.current.saturating_sub(actual);
        actual
    }

    /// Get health as a percentage (0-100).
    #[must_use]
    pub fn percentage(&self) -> u32 {
        if self.max == 0 {
            0
        } else {
            (self.current * 100) / self.max
        }
    }
}

/// Something a combat unit can be ordered to attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum AttackTarget {
    /// An opposing unit.
    Unit(EntityId),
    /// An opposing building.
    Building(EntityId),
}

impl AttackTarget {
    /// The targeted entity id.
    #[must_use]
    pub const fn id(self) -> EntityId {
        match self {
            Self::Unit(id) | Self::Building(id) => id,
        }
    }
}

/// A unit's behavioural mode, together with its target.
///
/// Mode and target travel together, so a unit can never hold one without
/// the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "task", content = "target", rename_all = "snake_case")]
pub enum Task {
    /// Harvest the resource node with this id.
    Gather(EntityId),
    /// Attack an opposing entity.
    Attack(AttackTarget),
}

/// A mobile unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier.
    pub id: EntityId,
    /// Stat table row this unit was built from.
    pub kind: UnitKind,
    /// Centre position.
    pub position: Vec2Fixed,
    /// Movement destination; `None` means not moving.
    pub move_target: Option<Vec2Fixed>,
    /// Collision radius.
    #[serde(with = "fixed_serde")]
    pub size: Fixed,
    /// Distance per 16 ms frame.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
    /// Health.
    pub health: Health,
    /// Damage per hit.
    pub attack: u32,
    /// Declared engagement distance.
    #[serde(with = "fixed_serde")]
    pub range: Fixed,
    /// Hits per second.
    #[serde(with = "fixed_serde")]
    pub attack_speed: Fixed,
    /// Simulation time of the last hit or harvest; `None` when never acted.
    pub last_attack_ms: Option<u64>,
    /// Current task; `None` means idle (or manually moving).
    pub task: Option<Task>,
}

impl Unit {
    /// Create a unit of the given kind at full health, idle and stationary.
    #[must_use]
    pub fn new(id: EntityId, kind: UnitKind, position: Vec2Fixed) -> Self {
        let stats = kind.stats();
        Self {
            id,
            kind,
            position,
            move_target: None,
            size: stats.size,
            speed: stats.speed,
            health: Health::new(stats.health),
            attack: stats.attack,
            range: stats.range,
            attack_speed: stats.attack_speed,
            last_attack_ms: None,
            task: None,
        }
    }

    /// Whether the unit has no task.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.task.is_none()
    }

    /// Range used for attacking. Archers always engage from a fixed distance.
    #[must_use]
    pub fn attack_range(&self) -> Fixed {
        match self.kind {
            UnitKind::Archer => Fixed::from_num(ARCHER_ATTACK_RANGE),
            _ => self.range,
        }
    }

    /// Milliseconds between hits, `1000 / attack_speed`.
    ///
    /// A non-positive attack speed never becomes ready.
    #[must_use]
    pub fn attack_cooldown_ms(&self) -> Fixed {
        if self.attack_speed <= Fixed::ZERO {
            return Fixed::MAX;
        }
        Fixed::from_num(1000).saturating_div(self.attack_speed)
    }

    /// Whether more than `cooldown_ms` has passed since the last action.
    #[must_use]
    pub fn cooldown_elapsed(&self, now_ms: u64, cooldown_ms: Fixed) -> bool {
        match self.last_attack_ms {
            None => true,
            Some(last) => {
                let elapsed = now_ms.saturating_sub(last);
                Fixed::saturating_from_num(elapsed) > cooldown_ms
            }
        }
    }

    /// Assign a task, replacing any previous one.
    pub fn assign(&mut self, task: Task, destination: Vec2Fixed) {
        self.task = Some(task);
        self.move_target = Some(destination);
    }

    /// Drop the current task. The movement target is left alone.
    pub fn clear_task(&mut self) {
        self.task = None;
    }

    /// Stop in place.
    pub fn halt(&mut self) {
        self.move_target = Some(self.position);
    }
}

/// A static building with an axis-aligned footprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Building {
    /// Unique identifier.
    pub id: EntityId,
    /// Stat table row this building was built from.
    pub kind: BuildingKind,
    /// Footprint centre.
    pub position: Vec2Fixed,
    /// Footprint width.
    #[serde(with = "fixed_serde")]
    pub width: Fixed,
    /// Footprint height.
    #[serde(with = "fixed_serde")]
    pub height: Fixed,
    /// Health.
    pub health: Health,
}

impl Building {
    /// Create a building of the given kind at full health.
    #[must_use]
    pub fn new(id: EntityId, kind: BuildingKind, position: Vec2Fixed) -> Self {
        let stats = kind.stats();
        Self {
            id,
            kind,
            position,
            width: stats.width,
            height: stats.height,
            health: Health::new(stats.health),
        }
    }

    /// Half of the footprint width; the building's "radius" for engagement.
    #[must_use]
    pub fn half_width(&self) -> Fixed {
        self.width / 2
    }

    /// Half of the footprint height.
    #[must_use]
    pub fn half_height(&self) -> Fixed {
        self.height / 2
    }
}

/// Which stockpile a resource node feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Yields wood.
    Tree,
    /// Yields gold.
    GoldMine,
}

/// A depletable terrain feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceNode {
    /// Unique identifier.
    pub id: EntityId,
    /// Tree or gold mine.
    pub kind: ResourceKind,
    /// Centre position.
    pub position: Vec2Fixed,
    /// Radius.
    #[serde(with = "fixed_serde")]
    pub size: Fixed,
    /// Remaining yield. May dip below zero by less than one harvest.
    pub resources: i32,
}

impl ResourceNode {
    /// Create a new resource node.
    #[must_use]
    pub const fn new(
        id: EntityId,
        kind: ResourceKind,
        position: Vec2Fixed,
        size: Fixed,
        resources: i32,
    ) -> Self {
        Self {
            id,
            kind,
            position,
            size,
            resources,
        }
    }

    /// Check if this node is depleted.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.resources <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage_saturates_at_zero() {
        let mut health = Health::new(10);
        assert_eq!(health.apply_damage(15), 10);
        assert!(health.is_dead());
        assert_eq!(health.percentage(), 0);
    }

    #[test]
    fn test_archer_engages_from_fixed_range() {
        let mut archer = Unit::new(1, UnitKind::Archer, Vec2Fixed::ZERO);
        archer.range = Fixed::from_num(5);
        assert_eq!(archer.attack_range(), Fixed::from_num(100));

        let warrior = Unit::new(2, UnitKind::Warrior, Vec2Fixed::ZERO);
        assert_eq!(warrior.attack_range(), Fixed::from_num(15));
    }

    #[test]
    fn test_fresh_unit_is_ready_to_act() {
        let unit = Unit::new(1, UnitKind::Warrior, Vec2Fixed::ZERO);
        assert!(unit.cooldown_elapsed(0, unit.attack_cooldown_ms()));
    }

    #[test]
    fn test_cooldown_is_strictly_greater_than() {
        let mut unit = Unit::new(1, UnitKind::Warrior, Vec2Fixed::ZERO);
        unit.last_attack_ms = Some(500);
        let cooldown = unit.attack_cooldown_ms();
        assert!(!unit.cooldown_elapsed(1500, cooldown));
        assert!(unit.cooldown_elapsed(1501, cooldown));
    }

    #[test]
    fn test_zero_attack_speed_never_ready_again() {
        let mut unit = Unit::new(1, UnitKind::Warrior, Vec2Fixed::ZERO);
        unit.attack_speed = Fixed::ZERO;
        unit.last_attack_ms = Some(0);
        assert!(!unit.cooldown_elapsed(u64::MAX, unit.attack_cooldown_ms()));
    }

    #[test]
    fn test_assigning_a_task_sets_destination() {
        let mut unit = Unit::new(1, UnitKind::Worker, Vec2Fixed::ZERO);
        let destination = Vec2Fixed::from_ints(50, 60);
        unit.assign(Task::Gather(7), destination);
        assert_eq!(unit.task, Some(Task::Gather(7)));
        assert_eq!(unit.move_target, Some(destination));

        unit.clear_task();
        assert!(unit.is_idle());
    }
}

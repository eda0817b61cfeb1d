//! Test fixtures and helpers.
//!
//! Hand-built worlds for scenario tests. Every fixture starts from
//! [`World::empty`], so there is no terrain and no starting army unless the
//! fixture adds it, and positions are exact. Tick them with
//! `tick_with_controllers(delta, &[])` to keep the opponent AI out of the
//! way.

use skirmish_core::components::{AttackTarget, EntityId, ResourceKind, Task};
use skirmish_core::config::SimConfig;
use skirmish_core::data::{BuildingKind, UnitKind};
use skirmish_core::factions::FactionId;
use skirmish_core::math::{Fixed, Vec2Fixed};
use skirmish_core::production::{construct_building, spawn_unit};
use skirmish_core::world::World;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> Fixed {
    Fixed::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> Fixed {
    Fixed::from_num(n)
}

/// Shorthand for an integer world point.
#[must_use]
pub fn pos(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::from_ints(x, y)
}

/// A world with default config and nothing in it.
#[must_use]
pub fn empty_world() -> World {
    World::empty(SimConfig::default())
}

/// An empty world with one town hall per faction in the far bottom
/// corners, so ticking does not end the match straight away.
#[must_use]
pub fn arena() -> World {
    let mut world = empty_world();
    construct_building(&mut world, FactionId::Player, BuildingKind::TownHall, pos(100, 3900));
    construct_building(&mut world, FactionId::Opponent, BuildingKind::TownHall, pos(3900, 3900));
    world
}

/// A fully populated default match with the given seed.
#[must_use]
pub fn seeded_match(seed: u64) -> World {
    World::new(SimConfig::default().with_seed(seed))
}

/// Ids of a one-on-one engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duel {
    /// Player unit carrying the attack task.
    pub attacker: EntityId,
    /// Opponent unit being attacked.
    pub victim: EntityId,
}

impl Duel {
    /// The victim as an attack target.
    #[must_use]
    pub const fn target(&self) -> AttackTarget {
        AttackTarget::Unit(self.victim)
    }
}

/// A player unit ordered to attack an opponent unit `gap` units to its
/// right, both on the line `y = 1000`, in an [`arena`].
#[must_use]
pub fn duel(attacker: UnitKind, victim: UnitKind, gap: i32) -> (World, Duel) {
    let mut world = arena();
    let victim = spawn_unit(&mut world, FactionId::Opponent, victim, pos(1000 + gap, 1000));
    let attacker = spawn_unit(&mut world, FactionId::Player, attacker, pos(1000, 1000));
    if let Some(unit) = world.unit_mut(FactionId::Player, attacker) {
        unit.task = Some(Task::Attack(AttackTarget::Unit(victim)));
    }
    (world, Duel { attacker, victim })
}

/// Ids of a crowded-target scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrowdedTarget {
    /// Opponent unit in the middle.
    pub target: EntityId,
    /// Player units blocking every ring sample.
    pub blockers: Vec<EntityId>,
    /// Player unit looking for a spot.
    pub newcomer: EntityId,
}

/// An opponent warrior at (2000, 2000) whose whole approach ring is
/// blocked by player warriors, plus one more player warrior far away that
/// has not been given an order yet.
#[must_use]
pub fn crowded_target() -> (World, CrowdedTarget) {
    let mut world = arena();
    let center = pos(2000, 2000);
    let target = spawn_unit(&mut world, FactionId::Opponent, UnitKind::Warrior, center);

    // Warrior ring radius around a warrior: 10 + 15 + 10.
    let radius = 35;
    let offsets = [
        (radius, 0),
        (0, radius),
        (-radius, 0),
        (0, -radius),
        (25, 25),
        (-25, 25),
        (-25, -25),
        (25, -25),
    ];
    let blockers = offsets
        .iter()
        .map(|&(dx, dy)| {
            spawn_unit(
                &mut world,
                FactionId::Player,
                UnitKind::Warrior,
                pos(2000 + dx, 2000 + dy),
            )
        })
        .collect();
    let newcomer = spawn_unit(&mut world, FactionId::Player, UnitKind::Warrior, pos(500, 500));

    (
        world,
        CrowdedTarget {
            target,
            blockers,
            newcomer,
        },
    )
}

/// Ids of a gathering scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Harvest {
    /// Player worker carrying the gather task.
    pub worker: EntityId,
    /// Node being gathered.
    pub node: EntityId,
}

/// A player worker standing on a node of `kind` holding `resources`, with
/// the gather task already assigned.
#[must_use]
pub fn harvest(kind: ResourceKind, resources: i32) -> (World, Harvest) {
    let mut world = arena();
    let size = match kind {
        ResourceKind::Tree => fixed(15),
        ResourceKind::GoldMine => fixed(30),
    };
    let node = world.add_resource_node(kind, pos(800, 800), size, resources);
    let worker = spawn_unit(&mut world, FactionId::Player, UnitKind::Worker, pos(810, 800));
    if let Some(unit) = world.unit_mut(FactionId::Player, worker) {
        unit.task = Some(Task::Gather(node));
    }
    (world, Harvest { worker, node })
}

/// Both factions with one town hall each. The opponent's hall has
/// `hall_health` left and a player warrior right next to it is ordered to
/// attack it.
#[must_use]
pub fn hall_siege(hall_health: u32) -> (World, Duel) {
    let mut world = empty_world();
    construct_building(&mut world, FactionId::Player, BuildingKind::TownHall, pos(500, 2000));
    let hall = construct_building(
        &mut world,
        FactionId::Opponent,
        BuildingKind::TownHall,
        pos(3000, 2000),
    );
    if let Some(building) = world.faction_mut(FactionId::Opponent).buildings.get_mut(hall) {
        building.health.current = hall_health;
    }
    let attacker = spawn_unit(&mut world, FactionId::Player, UnitKind::Warrior, pos(2950, 2000));
    if let Some(unit) = world.unit_mut(FactionId::Player, attacker) {
        unit.task = Some(Task::Attack(AttackTarget::Building(hall)));
    }
    (
        world,
        Duel {
            attacker,
            victim: hall,
        },
    )
}

//! Scripted opponent.
//!
//! A greedy, memoryless controller that reads the current world every tick
//! and applies three independent policies:
//!
//! - **Expansion**: with fewer than 5 buildings, at least 200 gold and 150
//!   wood, put a house within 100 units of the town hall.
//! - **Training**: with population headroom and at least 50 gold, train a
//!   unit at the town hall. Below 5 units it is always a worker; otherwise
//!   70% worker, else warrior or archer at even odds. Skipped if the picked
//!   kind is unaffordable.
//! - **Tasking**: idle workers gather from the nearest tree or gold mine
//!   (coin flip, falling back to the other kind); idle fighters attack a
//!   random enemy unit (80%) or building (20%), falling back to whichever
//!   pool is non-empty.
//!
//! Every action is gated on an affordability check right before it spends,
//! so the loop never leaves a stockpile negative.

use rand::Rng;
use tracing::debug;

use crate::components::{AttackTarget, EntityId, ResourceKind, Task};
use crate::data::{BuildingKind, UnitKind};
use crate::factions::FactionId;
use crate::geometry;
use crate::production::{self, TRAIN_SPAWN_SPREAD};
use crate::simulation::TickEvents;
use crate::world::World;

/// Expansion stops at this many buildings.
pub const MAX_BUILDINGS: usize = 5;
/// Gold on hand before building a house.
pub const EXPANSION_GOLD: i32 = 200;
/// Wood on hand before building a house.
pub const EXPANSION_WOOD: i32 = 150;
/// Gold on hand before considering training.
pub const TRAINING_GOLD: i32 = 50;
/// Below this many units, only workers are trained.
pub const BOOTSTRAP_UNITS: usize = 5;
/// House placement spread around the town hall, per axis.
pub const HOUSE_SPREAD: i32 = 100;

/// Run one round of decisions for `controlled`.
pub fn decision_loop(world: &mut World, controlled: FactionId, events: &mut TickEvents) {
    expand(world, controlled, events);
    train(world, controlled, events);
    assign_idle_units(world, controlled);
}

fn expand(world: &mut World, controlled: FactionId, events: &mut TickEvents) {
    let side = world.faction(controlled);
    if side.buildings.len() >= MAX_BUILDINGS
        || side.stockpile.gold < EXPANSION_GOLD
        || side.stockpile.wood < EXPANSION_WOOD
    {
        return;
    }
    let Some(hall) = production::town_hall_position(world, controlled) else {
        return;
    };

    let position = hall + geometry::jitter(world.rng_mut(), HOUSE_SPREAD);
    let cost = BuildingKind::House.stats().cost;
    if world.faction_mut(controlled).stockpile.spend(cost) {
        let id = production::construct_building(world, controlled, BuildingKind::House, position);
        debug!(faction = ?controlled, building = id, "AI built house");
        events.buildings_built.push((controlled, id));
    }
}

fn train(world: &mut World, controlled: FactionId, events: &mut TickEvents) {
    let side = world.faction(controlled);
    if !side.has_population_headroom() || side.stockpile.gold < TRAINING_GOLD {
        return;
    }
    let unit_count = side.units.len();
    let Some(hall) = production::town_hall_position(world, controlled) else {
        return;
    };

    let rng = world.rng_mut();
    let kind = if unit_count < BOOTSTRAP_UNITS || rng.gen_ratio(7, 10) {
        UnitKind::Worker
    } else if rng.gen_ratio(1, 2) {
        UnitKind::Warrior
    } else {
        UnitKind::Archer
    };

    let cost = kind.stats().cost;
    if !world.faction(controlled).stockpile.can_afford(cost) {
        return;
    }
    let position = hall + geometry::jitter(world.rng_mut(), TRAIN_SPAWN_SPREAD);
    world.faction_mut(controlled).stockpile.spend(cost);
    let id = production::spawn_unit(world, controlled, kind, position);
    debug!(faction = ?controlled, unit = id, ?kind, "AI trained unit");
    events.units_trained.push((controlled, id));
}

fn assign_idle_units(world: &mut World, controlled: FactionId) {
    let idle: Vec<EntityId> = world
        .faction(controlled)
        .units
        .values()
        .filter(|u| u.is_idle())
        .map(|u| u.id)
        .collect();

    for id in idle {
        let Some(unit) = world.unit(controlled, id).cloned() else {
            continue;
        };

        if unit.kind.is_worker() {
            let preferred = if world.rng_mut().gen_ratio(1, 2) {
                ResourceKind::Tree
            } else {
                ResourceKind::GoldMine
            };
            let fallback = match preferred {
                ResourceKind::Tree => ResourceKind::GoldMine,
                ResourceKind::GoldMine => ResourceKind::Tree,
            };
            let terrain = world.terrain();
            let Some((node, position)) = terrain
                .nearest(preferred, unit.position)
                .or_else(|| terrain.nearest(fallback, unit.position))
                .map(|n| (n.id, n.position))
            else {
                continue;
            };
            if let Some(slot) = world.unit_mut(controlled, id) {
                slot.assign(Task::Gather(node), position);
            }
        } else {
            let enemy = controlled.opponent();
            let Some(target) = pick_attack_target(world, enemy) else {
                continue;
            };
            let Some(destination) = world.approach_point(&unit, enemy, target) else {
                continue;
            };
            if let Some(slot) = world.unit_mut(controlled, id) {
                slot.assign(Task::Attack(target), destination);
            }
        }
    }
}

/// Random unit (80%) or building (20%) of `enemy`.
fn pick_attack_target(world: &mut World, enemy: FactionId) -> Option<AttackTarget> {
    let units = world.faction(enemy).units.ids();
    let buildings = world.faction(enemy).buildings.ids();
    let rng = world.rng_mut();

    let prefer_units = rng.gen_ratio(4, 5);
    let use_units = (prefer_units && !units.is_empty()) || buildings.is_empty();
    let pool = if use_units { &units } else { &buildings };
    if pool.is_empty() {
        return None;
    }

    let id = pool[rng.gen_range(0..pool.len())];
    Some(if use_units {
        AttackTarget::Unit(id)
    } else {
        AttackTarget::Building(id)
    })
}

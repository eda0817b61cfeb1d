//! Entity factory: starting layout, unit spawning, construction and training.
//!
//! Every stat comes from the static tables in [`crate::data`]. The raw
//! `spawn_unit` / `construct_building` helpers never check costs; the
//! `train` and `build` paths gate on affordability and headroom first and
//! leave the world untouched when a check fails.

use tracing::debug;

use crate::components::{Building, EntityId, Unit};
use crate::data::{BuildingKind, UnitKind};
use crate::error::{CommandError, CommandResult};
use crate::factions::FactionId;
use crate::geometry;
use crate::math::Vec2Fixed;
use crate::world::World;

/// Spawn jitter around the training building, per axis.
pub const TRAIN_SPAWN_SPREAD: i32 = 30;

/// Offset of the starting house from the town hall, towards the map edge.
const HOUSE_OFFSET: i32 = 100;
/// Vertical offset of the starting warriors from the house.
const WARRIOR_OFFSET: i32 = 50;
/// Spawn jitter for the starting army, per axis.
const ARMY_SPREAD: i32 = 20;

const STARTING_WORKERS: usize = 3;
const STARTING_ARCHERS: usize = 2;
const STARTING_WARRIORS: usize = 3;

/// Create a unit and add it to a faction. No cost is charged.
pub fn spawn_unit(
    world: &mut World,
    faction: FactionId,
    kind: UnitKind,
    position: Vec2Fixed,
) -> EntityId {
    let id = world.allocate_id();
    world
        .faction_mut(faction)
        .add_unit(Unit::new(id, kind, position));
    id
}

/// Create a building and add it to a faction. No cost is charged and no
/// placement check is made; houses raise the population limit.
pub fn construct_building(
    world: &mut World,
    faction: FactionId,
    kind: BuildingKind,
    position: Vec2Fixed,
) -> EntityId {
    let id = world.allocate_id();
    world
        .faction_mut(faction)
        .add_building(Building::new(id, kind, position));
    id
}

/// Lay out both factions' starting buildings and units.
///
/// Each side gets a town hall a quarter of the way in from its map edge, a
/// house 100 units further out, three workers by the town hall, two
/// archers by the house and three warriors just south of it.
pub fn spawn_initial_entities(world: &mut World) {
    let width = world.world_width();
    let mid_y = world.world_height() / 2;

    for faction in FactionId::ALL {
        let (hall_x, house_dx) = match faction {
            FactionId::Player => (width / 4, -HOUSE_OFFSET),
            FactionId::Opponent => (width / 4 * 3, HOUSE_OFFSET),
        };
        let hall = Vec2Fixed::new(hall_x, mid_y);
        let house = hall + Vec2Fixed::from_ints(house_dx, 0);

        construct_building(world, faction, BuildingKind::TownHall, hall);
        construct_building(world, faction, BuildingKind::House, house);

        let squads = [
            (UnitKind::Worker, STARTING_WORKERS, hall, TRAIN_SPAWN_SPREAD),
            (UnitKind::Archer, STARTING_ARCHERS, house, ARMY_SPREAD),
            (
                UnitKind::Warrior,
                STARTING_WARRIORS,
                house + Vec2Fixed::from_ints(0, WARRIOR_OFFSET),
                ARMY_SPREAD,
            ),
        ];
        for (kind, count, anchor, spread) in squads {
            for _ in 0..count {
                let position = anchor + geometry::jitter(world.rng_mut(), spread);
                spawn_unit(world, faction, kind, position);
            }
        }
    }
}

/// Train a unit for a faction at its spawning building.
///
/// Checks, in order: affordability, population headroom, and a building
/// able to train `kind` (first town hall for workers, first barrack
/// otherwise). On success the cost is paid and the unit appears within 30
/// units of the building on each axis.
pub fn train_unit(world: &mut World, faction: FactionId, kind: UnitKind) -> CommandResult<EntityId> {
    let cost = kind.stats().cost;
    let side = world.faction(faction);
    side.stockpile.require(cost)?;
    if !side.has_population_headroom() {
        return Err(CommandError::PopulationCapReached {
            population: side.population,
            limit: side.population_limit,
        });
    }
    let anchor = side
        .first_building(BuildingKind::trainer_of(kind))
        .map(|b| b.position)
        .ok_or(CommandError::NoSpawnBuilding(kind))?;

    world.faction_mut(faction).stockpile.spend(cost);
    let position = anchor + geometry::jitter(world.rng_mut(), TRAIN_SPAWN_SPREAD);
    let id = spawn_unit(world, faction, kind, position);
    debug!(?faction, unit = id, ?kind, "Unit trained");
    Ok(id)
}

/// Place a building for a faction after checking cost and placement.
///
/// Affordability is checked before placement. On success the cost is paid
/// and the building is added.
pub fn build(
    world: &mut World,
    faction: FactionId,
    kind: BuildingKind,
    position: Vec2Fixed,
) -> CommandResult<EntityId> {
    let cost = kind.stats().cost;
    world.faction(faction).stockpile.require(cost)?;
    world.placement_check(kind, position)?;

    world.faction_mut(faction).stockpile.spend(cost);
    let id = construct_building(world, faction, kind, position);
    debug!(?faction, building = id, ?kind, "Building placed");
    Ok(id)
}

/// Centre of a faction's first town hall, if it still stands.
#[must_use]
pub fn town_hall_position(world: &World, faction: FactionId) -> Option<Vec2Fixed> {
    world
        .faction(faction)
        .first_building(BuildingKind::TownHall)
        .map(|b| b.position)
}

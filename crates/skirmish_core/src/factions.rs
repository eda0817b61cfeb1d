//! Faction definitions and per-faction state.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::components::{AttackTarget, Building, EntityId, Unit};
use crate::data::BuildingKind;
use crate::economy::Stockpile;
use crate::math::{Fixed, Vec2Fixed};
use crate::world::EntityStorage;

/// Identifies one of the two sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactionId {
    /// The human-controlled side.
    Player,
    /// The scripted side.
    Opponent,
}

impl FactionId {
    /// Both factions, in simulation order.
    pub const ALL: [Self; 2] = [Self::Player, Self::Opponent];

    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Opponent,
            Self::Opponent => Self::Player,
        }
    }

    /// Get the display name for this faction.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Player => "Player",
            Self::Opponent => "Opponent",
        }
    }
}

/// What was removed when an entity died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Casualty {
    /// Faction that lost the entity.
    pub faction: FactionId,
    /// The removed entity.
    pub target: AttackTarget,
}

/// One side's resources, counters and entities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Faction {
    /// Which side this is.
    pub id: FactionId,
    /// Gold, wood and food.
    pub stockpile: Stockpile,
    /// Live unit count; always equal to `units.len()`.
    pub population: u32,
    /// Training cap, raised by houses.
    pub population_limit: i32,
    /// Buildings in construction order.
    pub buildings: EntityStorage<Building>,
    /// Units in creation order.
    pub units: EntityStorage<Unit>,
}

impl Faction {
    /// Create an empty faction with the given starting counters.
    #[must_use]
    pub fn new(id: FactionId, stockpile: Stockpile, population_limit: i32) -> Self {
        Self {
            id,
            stockpile,
            population: 0,
            population_limit,
            buildings: EntityStorage::new(),
            units: EntityStorage::new(),
        }
    }

    /// Whether another unit may be trained.
    #[must_use]
    pub fn has_population_headroom(&self) -> bool {
        i64::from(self.population) < i64::from(self.population_limit)
    }

    /// First building of the given kind, in construction order.
    #[must_use]
    pub fn first_building(&self, kind: BuildingKind) -> Option<&Building> {
        self.buildings.values().find(|b| b.kind == kind)
    }

    /// Number of standing buildings of the given kind.
    #[must_use]
    pub fn count_buildings(&self, kind: BuildingKind) -> usize {
        self.buildings.values().filter(|b| b.kind == kind).count()
    }

    /// Position and engagement half-extent of an attack target, if it still exists.
    ///
    /// Units use their collision radius, buildings half their width.
    #[must_use]
    pub fn locate(&self, target: AttackTarget) -> Option<(Vec2Fixed, Fixed)> {
        match target {
            AttackTarget::Unit(id) => self.units.get(id).map(|u| (u.position, u.size)),
            AttackTarget::Building(id) => self
                .buildings
                .get(id)
                .map(|b| (b.position, b.half_width())),
        }
    }

    /// Add a unit and count it towards population.
    pub fn add_unit(&mut self, unit: Unit) {
        if self.units.insert(unit.id, unit).is_none() {
            self.population += 1;
        }
    }

    /// Add a building and apply its population bonus.
    pub fn add_building(&mut self, building: Building) {
        let bonus = building.kind.stats().population_bonus;
        if self.buildings.insert(building.id, building).is_none() {
            self.population_limit += bonus;
        }
    }

    /// Remove a unit, decrementing population exactly once.
    pub fn remove_unit(&mut self, id: EntityId) -> Option<Unit> {
        let unit = self.units.remove(id)?;
        self.population = self.population.saturating_sub(1);
        debug!(faction = ?self.id, unit = id, kind = ?unit.kind, "Unit removed");
        Some(unit)
    }

    /// Remove a building, revoking its population bonus.
    pub fn remove_building(&mut self, id: EntityId) -> Option<Building> {
        let building = self.buildings.remove(id)?;
        self.population_limit -= building.kind.stats().population_bonus;
        debug!(faction = ?self.id, building = id, kind = ?building.kind, "Building removed");
        Some(building)
    }

    /// Apply damage to an attack target.
    ///
    /// A lethal hit removes the target and returns the casualty. Missing
    /// targets are ignored.
    pub fn apply_damage(&mut self, target: AttackTarget, amount: u32) -> Option<Casualty> {
        let dead = match target {
            AttackTarget::Unit(id) => {
                let unit = self.units.get_mut(id)?;
                unit.health.apply_damage(amount);
                unit.health.is_dead()
            }
            AttackTarget::Building(id) => {
                let building = self.buildings.get_mut(id)?;
                building.health.apply_damage(amount);
                building.health.is_dead()
            }
        };

        if !dead {
            return None;
        }

        match target {
            AttackTarget::Unit(id) => self.remove_unit(id).map(|_| ()),
            AttackTarget::Building(id) => self.remove_building(id).map(|_| ()),
        }?;

        Some(Casualty {
            faction: self.id,
            target,
        })
    }
}

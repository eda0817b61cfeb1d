//! Building kinds and their stat table.

use serde::{Deserialize, Serialize};

use super::{Cost, UnitKind};
use crate::math::Fixed;

/// Closed set of constructible building kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    /// Faction seat; losing every town hall loses the match. Trains workers.
    TownHall,
    /// Raises the population limit.
    House,
    /// Trains warriors and archers.
    Barrack,
}

/// Per-kind building statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildingStats {
    /// Footprint width.
    pub width: Fixed,
    /// Footprint height.
    pub height: Fixed,
    /// Maximum (and starting) health.
    pub health: u32,
    /// Construction price.
    pub cost: Cost,
    /// Population limit granted while the building stands.
    pub population_bonus: i32,
}

impl BuildingKind {
    /// All building kinds, in table order.
    pub const ALL: [Self; 3] = [Self::TownHall, Self::House, Self::Barrack];

    /// Look up the stat table entry for this kind.
    #[must_use]
    pub fn stats(self) -> BuildingStats {
        let (side, health, cost, population_bonus) = match self {
            Self::TownHall => (80, 1000, Cost::new(300, 200), 0),
            Self::House => (40, 300, Cost::new(100, 150), 5),
            Self::Barrack => (60, 500, Cost::new(200, 150), 0),
        };
        BuildingStats {
            width: Fixed::from_num(side),
            height: Fixed::from_num(side),
            health,
            cost,
            population_bonus,
        }
    }

    /// The building kind that trains a given unit kind.
    #[must_use]
    pub const fn trainer_of(unit: UnitKind) -> Self {
        match unit {
            UnitKind::Worker => Self::TownHall,
            UnitKind::Warrior | UnitKind::Archer => Self::Barrack,
        }
    }

    /// Lower-case display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TownHall => "town_hall",
            Self::House => "house",
            Self::Barrack => "barrack",
        }
    }
}

//! Unit kinds and their stat table.

use serde::{Deserialize, Serialize};

use super::Cost;
use crate::math::Fixed;

/// Closed set of trainable unit kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Gathers wood and gold; weak in combat.
    Worker,
    /// Melee fighter.
    Warrior,
    /// Ranged fighter.
    Archer,
}

/// Fixed engagement range of archers, regardless of their declared range.
pub const ARCHER_ATTACK_RANGE: i32 = 100;

/// Per-kind unit statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitStats {
    /// Collision radius.
    pub size: Fixed,
    /// Distance covered per 16 ms frame.
    pub speed: Fixed,
    /// Maximum (and starting) health.
    pub health: u32,
    /// Damage per hit.
    pub attack: u32,
    /// Declared engagement distance.
    pub range: Fixed,
    /// Hits per second; the attack cooldown is `1000 / attack_speed` ms.
    pub attack_speed: Fixed,
    /// Training price.
    pub cost: Cost,
}

impl UnitKind {
    /// All unit kinds, in table order.
    pub const ALL: [Self; 3] = [Self::Worker, Self::Warrior, Self::Archer];

    /// Look up the stat table entry for this kind.
    #[must_use]
    pub fn stats(self) -> UnitStats {
        match self {
            Self::Worker => UnitStats {
                size: Fixed::from_num(8),
                speed: Fixed::from_num(1.5),
                health: 50,
                attack: 5,
                range: Fixed::from_num(10),
                attack_speed: Fixed::from_num(1),
                cost: Cost::new(50, 0),
            },
            Self::Warrior => UnitStats {
                size: Fixed::from_num(10),
                speed: Fixed::from_num(1.2),
                health: 100,
                attack: 15,
                range: Fixed::from_num(15),
                attack_speed: Fixed::from_num(1),
                cost: Cost::new(100, 0),
            },
            Self::Archer => UnitStats {
                size: Fixed::from_num(9),
                speed: Fixed::from_num(1.3),
                health: 70,
                attack: 10,
                range: Fixed::from_num(100),
                attack_speed: Fixed::from_num(0.8),
                cost: Cost::new(75, 50),
            },
        }
    }

    /// Whether this kind can gather resources.
    #[must_use]
    pub const fn is_worker(self) -> bool {
        matches!(self, Self::Worker)
    }

    /// Lower-case display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Warrior => "warrior",
            Self::Archer => "archer",
        }
    }
}

//! Static stat and cost tables for every unit and building kind.
//!
//! Each closed kind enumeration owns its numbers through a single `stats()`
//! lookup. The entity factory, the player training/build commands and the
//! opponent AI all consult these tables, so a balance change lands in one
//! place.
//!
//! **Note:** This module contains no IO and no state - it only defines data.

mod building_data;
mod unit_data;

pub use building_data::{BuildingKind, BuildingStats};
pub use unit_data::{UnitKind, UnitStats, ARCHER_ATTACK_RANGE};

use serde::{Deserialize, Serialize};

/// Price of a unit or building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cost {
    /// Gold required.
    pub gold: i32,
    /// Wood required.
    pub wood: i32,
}

impl Cost {
    /// Create a new cost.
    #[must_use]
    pub const fn new(gold: i32, wood: i32) -> Self {
        Self { gold, wood }
    }
}

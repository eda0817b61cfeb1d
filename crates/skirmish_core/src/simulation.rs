//! Core simulation loop.
//!
//! One call to [`World::tick`] advances the match by a host-measured
//! number of milliseconds and runs every system to completion before
//! returning.
//!
//! # System Order
//!
//! 1. Opponent decision loop (builds, trains, hands out tasks to idle units)
//! 2. Unit step for the player's units, against the opponent
//! 3. Unit step for the opponent's units, against the player
//! 4. Victory check
//!
//! Each unit step finishes, removals included, before the next one starts,
//! so a target killed by the first pass is already gone when the second
//! pass looks it up.
//!
//! # Determinism
//!
//! Given the same config and the same sequence of `delta_ms` values and
//! commands, two worlds stay identical:
//! - fixed-point math only (see [`crate::math`])
//! - one seeded RNG owned by the world
//! - storage iterates in id order
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::SimConfig;
//! use skirmish_core::world::World;
//!
//! let mut world = World::new(SimConfig::default().with_seed(42));
//! let events = world.tick(16);
//! assert_eq!(world.tick_count(), 1);
//! assert_eq!(world.clock_ms(), 16);
//! assert!(events.game_over.is_none());
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ai;
use crate::components::{AttackTarget, EntityId};
use crate::data::BuildingKind;
use crate::factions::{Casualty, FactionId};
use crate::systems;
use crate::world::World;

/// How a finished match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// The faction that still has a town hall.
    pub winner: FactionId,
}

impl MatchOutcome {
    /// The faction that lost its last town hall.
    #[must_use]
    pub const fn loser(self) -> FactionId {
        self.winner.opponent()
    }
}

/// Everything that happened during one tick, for the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Units and buildings destroyed in combat, in the order they died.
    pub casualties: Vec<Casualty>,
    /// Resource nodes removed by depletion.
    pub nodes_depleted: Vec<EntityId>,
    /// Units trained by a scripted controller.
    pub units_trained: Vec<(FactionId, EntityId)>,
    /// Buildings placed by a scripted controller.
    pub buildings_built: Vec<(FactionId, EntityId)>,
    /// Set on the tick the match ended.
    pub game_over: Option<MatchOutcome>,
}

impl TickEvents {
    /// Whether nothing noteworthy happened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.casualties.is_empty()
            && self.nodes_depleted.is_empty()
            && self.units_trained.is_empty()
            && self.buildings_built.is_empty()
            && self.game_over.is_none()
    }

    /// Units killed this tick.
    pub fn units_killed(&self) -> impl Iterator<Item = (FactionId, EntityId)> + '_ {
        self.casualties.iter().filter_map(|c| match c.target {
            AttackTarget::Unit(id) => Some((c.faction, id)),
            AttackTarget::Building(_) => None,
        })
    }

    /// Buildings destroyed this tick.
    pub fn buildings_destroyed(&self) -> impl Iterator<Item = (FactionId, EntityId)> + '_ {
        self.casualties.iter().filter_map(|c| match c.target {
            AttackTarget::Building(id) => Some((c.faction, id)),
            AttackTarget::Unit(_) => None,
        })
    }
}

impl World {
    /// Advance the match by `delta_ms` with the opponent under scripted
    /// control.
    ///
    /// A finished match is frozen: the call returns empty events and
    /// changes nothing, clock included.
    pub fn tick(&mut self, delta_ms: u32) -> TickEvents {
        self.tick_with_controllers(delta_ms, &[FactionId::Opponent])
    }

    /// Advance the match by `delta_ms`, running the decision loop for each
    /// faction in `scripted`, in order.
    pub fn tick_with_controllers(&mut self, delta_ms: u32, scripted: &[FactionId]) -> TickEvents {
        let mut events = TickEvents::default();
        if self.outcome.is_some() {
            return events;
        }

        self.clock_ms = self.clock_ms.saturating_add(u64::from(delta_ms));

        for &faction in scripted {
            ai::decision_loop(self, faction, &mut events);
        }

        systems::unit_step_system(self, FactionId::Player, delta_ms, &mut events);
        systems::unit_step_system(self, FactionId::Opponent, delta_ms, &mut events);
        self.prune_selection();

        events.game_over = self.check_victory();
        self.tick += 1;

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::trace!(tick = self.tick, state_hash = hash, "Simulation state hash");
        }

        events
    }

    /// End the match if a faction has no town hall left.
    ///
    /// The opponent is checked first, so losing both halls on the same tick
    /// is a player win. Returns the outcome only on the call that decides
    /// it.
    pub fn check_victory(&mut self) -> Option<MatchOutcome> {
        if self.outcome.is_some() {
            return None;
        }

        let has_hall = |world: &Self, id: FactionId| world.faction(id).count_buildings(BuildingKind::TownHall) > 0;
        let winner = if !has_hall(self, FactionId::Opponent) {
            FactionId::Player
        } else if !has_hall(self, FactionId::Player) {
            FactionId::Opponent
        } else {
            return None;
        };

        let outcome = MatchOutcome { winner };
        self.outcome = Some(outcome);
        info!(winner = winner.display_name(), tick = self.tick, "Match over");
        Some(outcome)
    }
}

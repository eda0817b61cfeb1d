//! Stockpiles and the gather task.
//!
//! Workers harvest a fixed amount from a tree or gold mine once per
//! cooldown and credit it straight to their own faction's stockpile. There
//! is no carry capacity and no drop-off trip.
//!
//! All calculations use integer math for deterministic simulation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::components::{EntityId, ResourceKind, Unit};
use crate::data::Cost;
use crate::error::{CommandError, CommandResult};
use crate::factions::FactionId;
use crate::geometry;
use crate::math::Fixed;
use crate::simulation::TickEvents;
use crate::world::World;

/// Resources taken from a node per harvest.
pub const GATHER_AMOUNT: i32 = 5;

/// Maximum distance from a node's centre at which a worker can harvest.
pub const GATHER_RANGE: i32 = 20;

/// Milliseconds between harvests, independent of unit stats.
pub const GATHER_COOLDOWN_MS: i32 = 1000;

/// A faction's resource counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Stockpile {
    /// Gold, from gold mines.
    pub gold: i32,
    /// Wood, from trees.
    pub wood: i32,
    /// Food. Displayed but never spent or produced.
    pub food: i32,
}

impl Stockpile {
    /// Create a stockpile with the given amounts.
    #[must_use]
    pub const fn new(gold: i32, wood: i32, food: i32) -> Self {
        Self { gold, wood, food }
    }

    /// Check if the stockpile covers a cost.
    #[must_use]
    pub const fn can_afford(&self, cost: Cost) -> bool {
        self.gold >= cost.gold && self.wood >= cost.wood
    }

    /// Affordability as a command result, carrying the shortfall on failure.
    pub fn require(&self, cost: Cost) -> CommandResult {
        if self.can_afford(cost) {
            Ok(())
        } else {
            Err(CommandError::InsufficientResources {
                gold_required: cost.gold,
                wood_required: cost.wood,
                gold_available: self.gold,
                wood_available: self.wood,
            })
        }
    }

    /// Deduct a cost if affordable. Returns `true` on success.
    pub fn spend(&mut self, cost: Cost) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.gold -= cost.gold;
        self.wood -= cost.wood;
        true
    }

    /// Add harvested resources to the matching counter.
    pub fn credit(&mut self, kind: ResourceKind, amount: i32) {
        match kind {
            ResourceKind::Tree => self.wood = self.wood.saturating_add(amount),
            ResourceKind::GoldMine => self.gold = self.gold.saturating_add(amount),
        }
    }
}

/// Run one tick of a gather task for `unit`, owned by `owner`.
///
/// Stale or already exhausted nodes clear the task. Out of range, the unit
/// walks to the node centre. In range and off cooldown, the node loses
/// [`GATHER_AMOUNT`] and the owner's stockpile gains the same, even when
/// fewer remained. A node at or below zero afterwards is removed and the
/// unit goes idle.
pub(crate) fn execute_gather(
    world: &mut World,
    owner: FactionId,
    unit: &mut Unit,
    node_id: EntityId,
    events: &mut TickEvents,
) {
    let now = world.clock_ms;
    let Some(node) = world.terrain.get_mut(node_id) else {
        unit.clear_task();
        return;
    };

    if node.is_depleted() {
        world.terrain.remove(node_id);
        events.nodes_depleted.push(node_id);
        unit.clear_task();
        return;
    }

    if geometry::distance(unit.position, node.position) > Fixed::from_num(GATHER_RANGE) {
        unit.move_target = Some(node.position);
        return;
    }

    if !unit.cooldown_elapsed(now, Fixed::from_num(GATHER_COOLDOWN_MS)) {
        return;
    }

    node.resources -= GATHER_AMOUNT;
    let kind = node.kind;
    let depleted = node.is_depleted();
    unit.last_attack_ms = Some(now);
    world
        .faction_mut(owner)
        .stockpile
        .credit(kind, GATHER_AMOUNT);

    if depleted {
        world.terrain.remove(node_id);
        events.nodes_depleted.push(node_id);
        unit.clear_task();
        debug!(node = node_id, ?kind, by = unit.id, "Resource node depleted");
    }
}

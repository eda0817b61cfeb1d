//! Match statistics for batch runs.

use serde::{Deserialize, Serialize};
use skirmish_core::factions::FactionId;
use skirmish_core::simulation::TickEvents;
use skirmish_core::world::World;

/// Per-faction totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionSummary {
    /// Units alive at the end.
    pub units: usize,
    /// Buildings standing at the end.
    pub buildings: usize,
    /// Final gold.
    pub gold: i32,
    /// Final wood.
    pub wood: i32,
    /// Units trained by the decision loop.
    pub units_trained: u32,
    /// Buildings placed by the decision loop.
    pub buildings_built: u32,
    /// Units this faction lost.
    pub units_lost: u32,
    /// Buildings this faction lost.
    pub buildings_lost: u32,
}

/// Result of one batch match, printed as JSON by `run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// World seed.
    pub seed: u64,
    /// Ticks run.
    pub ticks: u64,
    /// Simulation clock at the end.
    pub clock_ms: u64,
    /// Winner, or `None` if the tick cap ran out first.
    pub winner: Option<FactionId>,
    /// Whether the player faction was also AI-driven.
    pub mirror: bool,
    /// Final state hash.
    pub final_state_hash: u64,
    /// Resource nodes used up.
    pub nodes_depleted: u32,
    /// Player totals.
    pub player: FactionSummary,
    /// Opponent totals.
    pub opponent: FactionSummary,
}

impl MatchSummary {
    /// Empty summary for a match about to start.
    #[must_use]
    pub fn new(seed: u64, mirror: bool) -> Self {
        Self {
            seed,
            ticks: 0,
            clock_ms: 0,
            winner: None,
            mirror,
            final_state_hash: 0,
            nodes_depleted: 0,
            player: FactionSummary::default(),
            opponent: FactionSummary::default(),
        }
    }

    /// Mutable totals for one side.
    pub fn faction_mut(&mut self, faction: FactionId) -> &mut FactionSummary {
        match faction {
            FactionId::Player => &mut self.player,
            FactionId::Opponent => &mut self.opponent,
        }
    }

    /// Fold one tick's events into the totals.
    pub fn record(&mut self, events: &TickEvents) {
        for (faction, _) in &events.units_trained {
            self.faction_mut(*faction).units_trained += 1;
        }
        for (faction, _) in &events.buildings_built {
            self.faction_mut(*faction).buildings_built += 1;
        }
        for (faction, _) in events.units_killed() {
            self.faction_mut(faction).units_lost += 1;
        }
        for (faction, _) in events.buildings_destroyed() {
            self.faction_mut(faction).buildings_lost += 1;
        }
        self.nodes_depleted += events.nodes_depleted.len() as u32;
        if let Some(outcome) = events.game_over {
            self.winner = Some(outcome.winner);
        }
    }

    /// Copy the end-of-match state out of the world.
    pub fn finalize(&mut self, world: &World) {
        self.ticks = world.tick_count();
        self.clock_ms = world.clock_ms();
        self.final_state_hash = world.state_hash();
        self.winner = world.outcome().map(|o| o.winner);
        for id in FactionId::ALL {
            let faction = world.faction(id);
            let totals = self.faction_mut(id);
            totals.units = faction.units.len();
            totals.buildings = faction.buildings.len();
            totals.gold = faction.stockpile.gold;
            totals.wood = faction.stockpile.wood;
        }
    }
}

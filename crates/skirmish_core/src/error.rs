//! Error types for the game simulation.
//!
//! The tick loop itself never fails: stale task targets are cleared in
//! place and a finished match simply stops advancing. Errors only exist
//! at the edges, for configuration loading ([`GameError`]) and for
//! commands coming in from the input/UI layer ([`CommandError`]). A
//! rejected command always leaves the world untouched.

use thiserror::Error;

use crate::data::{BuildingKind, UnitKind};

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for fallible setup.
#[derive(Debug, Error)]
pub enum GameError {
    /// Configuration file does not exist.
    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    /// Configuration file could not be read.
    #[error("Failed to read config file: {0}")]
    ConfigRead(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// Configuration parsed but holds an unusable value.
    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        message: String,
    },
}

/// Why a player command had no effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The faction cannot pay the cost.
    #[error("Insufficient resources: need {gold_required} gold / {wood_required} wood, have {gold_available} / {wood_available}")]
    InsufficientResources {
        /// Gold the action costs.
        gold_required: i32,
        /// Wood the action costs.
        wood_required: i32,
        /// Gold in the stockpile.
        gold_available: i32,
        /// Wood in the stockpile.
        wood_available: i32,
    },

    /// Population is already at the limit.
    #[error("Population cap reached ({population}/{limit})")]
    PopulationCapReached {
        /// Current population.
        population: u32,
        /// Current population limit.
        limit: i32,
    },

    /// No building able to train this unit kind exists.
    #[error("No building can train {0:?}")]
    NoSpawnBuilding(UnitKind),

    /// Building footprint leaves the map.
    #[error("{0:?} footprint is outside the map")]
    OutOfBounds(BuildingKind),

    /// Building footprint overlaps a building or resource node.
    #[error("{0:?} footprint overlaps an existing structure or resource")]
    PlacementBlocked(BuildingKind),

    /// `confirm_build` was called without an active build mode.
    #[error("No building selected for construction")]
    NoBuildMode,

    /// An order was issued with nothing selected.
    #[error("No units selected")]
    EmptySelection,

    /// The match has ended; only a reset is accepted.
    #[error("Match is over")]
    MatchOver,
}

/// Result type alias for player commands.
pub type CommandResult<T = ()> = std::result::Result<T, CommandError>;

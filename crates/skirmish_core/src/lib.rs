//! # Skirmish Core
//!
//! Deterministic simulation core for a two-faction skirmish RTS.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO beyond loading a config file
//! - No system randomness (one seeded RNG per world)
//! - No floating-point math (uses fixed-point)
//!
//! A host owns a [`world::World`], calls [`world::World::tick`] once per
//! frame with the elapsed milliseconds, issues player commands through
//! [`player_facade::PlayerFacade`], and reads state back through the
//! world's query methods.
//!
//! ## Crate Structure
//!
//! - [`world`] - Entity storage and the world aggregate
//! - [`components`] - Units, buildings, resource nodes
//! - [`data`] - Per-kind stat tables
//! - [`factions`] - Faction state and damage bookkeeping
//! - [`simulation`] - Tick loop and victory check
//! - [`systems`] - Per-unit step: aggro, tasks, movement, collisions
//! - [`combat`] / [`economy`] - Attack and gather tasks
//! - [`production`] - Training, construction, starting layout
//! - [`ai`] - Scripted opponent
//! - [`geometry`] / [`math`] - Spatial helpers on fixed-point vectors

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod data;
pub mod economy;
pub mod error;
pub mod factions;
pub mod geometry;
pub mod map_generation;
pub mod math;
pub mod player_facade;
pub mod production;
pub mod simulation;
pub mod systems;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::SimConfig;
    pub use crate::data::{BuildingKind, Cost, UnitKind};
    pub use crate::economy::Stockpile;
    pub use crate::error::{CommandError, CommandResult, GameError, Result};
    pub use crate::factions::{Casualty, Faction, FactionId};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::player_facade::{OrderOutcome, PlayerFacade};
    pub use crate::simulation::{MatchOutcome, TickEvents};
    pub use crate::world::World;
}

//! Headless skirmish host for CI and scripted controllers.
//!
//! This crate drives a [`skirmish_core::world::World`] without any
//! rendering. It can:
//!
//! - **Play a batch match**: opponent AI against a passive player, or the
//!   decision loop on both sides, printing a JSON summary
//! - **Serve a controller**: JSON commands on stdin stand in for mouse and
//!   keyboard input, responses go to stdout
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: commands (tick, select, order, build, train, ...)
//! - **stdout**: responses and state snapshots (JSON)
//! - **stderr**: logs (human-readable)
//!
//! See [`protocol`] module for the full command/response specification.
//!
//! # Example
//!
//! ```bash
//! # Run interactively
//! echo '{"cmd":"tick","count":60}' | cargo run -p skirmish_headless
//!
//! # Play one AI-vs-AI match
//! cargo run -p skirmish_headless -- run --seed 7 --mirror
//! ```

pub mod error;
pub mod protocol;
pub mod runner;
pub mod scheduler;
pub mod summary;

pub use error::{HeadlessError, Result};
pub use protocol::{Command, Response, StateSnapshot};
pub use runner::{run_interactive, run_match, MatchConfig, Session};
pub use scheduler::{FrameReport, FrameScheduler};
pub use summary::{FactionSummary, MatchSummary};

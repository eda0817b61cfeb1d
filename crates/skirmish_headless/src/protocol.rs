//! JSON protocol for headless match control.
//!
//! The interactive runner speaks JSON lines (one JSON object per line):
//!
//! **Input (stdin):** commands standing in for mouse and keyboard input
//! **Output (stdout):** responses and state snapshots
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready",...}`
//! 2. Controller sends commands as JSON lines
//! 3. Every command gets exactly one response, except `tick`, which is
//!    followed by a `game_over` line on the tick the match ends
//! 4. `quit` answers `bye` and closes the session
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","tick":0,"seed":7}
//! -> {"cmd":"select","x0":900,"y0":1900,"x1":1100,"y1":2100}
//! <- {"type":"ack","cmd":"select","detail":"3 units selected"}
//! -> {"cmd":"order","x":1500,"y":2000}
//! <- {"type":"ack","cmd":"order","detail":"move"}
//! -> {"cmd":"train","kind":"worker"}
//! <- {"type":"ack","cmd":"train","detail":"unit 231"}
//! -> {"cmd":"tick","count":60}
//! <- {"type":"ack","cmd":"tick","detail":"60 ticks"}
//! -> {"cmd":"hash"}
//! <- {"type":"hash","tick":60,"hash":1234567890}
//! ```

use serde::{Deserialize, Serialize};
use skirmish_core::components::{ResourceKind, Task};
use skirmish_core::data::{BuildingKind, UnitKind};
use skirmish_core::factions::FactionId;
use skirmish_core::world::World;

/// Protocol version reported in `ready`.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (controller -> runner)
// ============================================================================

/// Commands accepted by the interactive runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Advance the match by N fixed steps (default: 1).
    Tick {
        /// Steps to run.
        #[serde(default = "default_tick_count")]
        count: u32,
    },

    /// Drag-select player units between two corners.
    Select {
        /// First corner, x.
        x0: f64,
        /// First corner, y.
        y0: f64,
        /// Second corner, x.
        x1: f64,
        /// Second corner, y.
        y1: f64,
    },

    /// Drop the selection and leave build mode.
    ClearSelection,

    /// Right-click with the selection at a world point.
    Order {
        /// World x.
        x: f64,
        /// World y.
        y: f64,
    },

    /// Enter build mode for `kind` and place it at a world point.
    Build {
        /// Building to place.
        kind: BuildingKind,
        /// Centre x.
        x: f64,
        /// Centre y.
        y: f64,
    },

    /// Train a unit at the matching building.
    Train {
        /// Unit to train.
        kind: UnitKind,
    },

    /// Start a new match.
    Reset,

    /// Report the full state without advancing time.
    Query,

    /// Report the state hash (for determinism checks).
    Hash,

    /// End the session.
    Quit,
}

fn default_tick_count() -> u32 {
    1
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for acknowledgment.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tick { .. } => "tick",
            Self::Select { .. } => "select",
            Self::ClearSelection => "clear_selection",
            Self::Order { .. } => "order",
            Self::Build { .. } => "build",
            Self::Train { .. } => "train",
            Self::Reset => "reset",
            Self::Query => "query",
            Self::Hash => "hash",
            Self::Quit => "quit",
        }
    }
}

// ============================================================================
// Output Responses (runner -> controller)
// ============================================================================

/// Responses sent by the interactive runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready {
        /// Protocol version.
        version: String,
        /// Current tick.
        tick: u64,
        /// World seed.
        seed: u64,
    },

    /// Command accepted.
    Ack {
        /// Command name.
        cmd: String,
        /// Short human-readable result.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },

    /// Command rejected or unparseable.
    Error {
        /// Why.
        message: String,
        /// Command name, when the line parsed.
        #[serde(default)]
        cmd: Option<String>,
    },

    /// Full state snapshot.
    State(Box<StateSnapshot>),

    /// State hash.
    Hash {
        /// Current tick.
        tick: u64,
        /// [`World::state_hash`].
        hash: u64,
    },

    /// The match ended.
    GameOver {
        /// Winning faction.
        winner: FactionId,
        /// Tick the match ended on.
        tick: u64,
    },

    /// Goodbye message before shutdown.
    Bye,
}

impl Response {
    /// Create a ready response.
    pub fn ready(world: &World) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            tick: world.tick_count(),
            seed: world.config().seed,
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str, detail: Option<String>) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
            detail,
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"type":"error","message":"Serialization failed: {}"}}"#,
                e
            )
        });
        json.push('\n');
        json
    }
}

// ============================================================================
// State Types
// ============================================================================

/// Everything a controller can see about the match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Ticks run.
    pub tick: u64,
    /// Simulation clock.
    pub clock_ms: u64,
    /// Winner, once the match is over.
    pub winner: Option<FactionId>,
    /// Selected player unit ids.
    pub selection: Vec<u64>,
    /// Building kind awaiting placement.
    pub build_mode: Option<BuildingKind>,
    /// Player, then opponent.
    pub factions: Vec<FactionState>,
    /// Trees and gold mines still standing.
    pub resource_nodes: Vec<NodeState>,
    /// [`World::state_hash`].
    pub hash: u64,
}

/// One faction's counters and entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionState {
    /// Which side.
    pub faction: FactionId,
    /// Gold.
    pub gold: i32,
    /// Wood.
    pub wood: i32,
    /// Food.
    pub food: i32,
    /// Live units.
    pub population: u32,
    /// Unit cap.
    pub population_limit: i32,
    /// Units in id order.
    pub units: Vec<UnitState>,
    /// Buildings in id order.
    pub buildings: Vec<BuildingState>,
}

/// A unit as seen by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitState {
    /// Entity id.
    pub id: u64,
    /// Unit kind.
    pub kind: UnitKind,
    /// Position x.
    pub x: f64,
    /// Position y.
    pub y: f64,
    /// Collision radius.
    pub size: f64,
    /// Health left.
    pub health: u32,
    /// Full health.
    pub max_health: u32,
    /// `idle`, `attack` or `gather`.
    pub task: String,
    /// Id of the task's target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u64>,
}

/// A building as seen by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingState {
    /// Entity id.
    pub id: u64,
    /// Building kind.
    pub kind: BuildingKind,
    /// Centre x.
    pub x: f64,
    /// Centre y.
    pub y: f64,
    /// Footprint width.
    pub width: f64,
    /// Footprint height.
    pub height: f64,
    /// Health left.
    pub health: u32,
    /// Full health.
    pub max_health: u32,
}

/// A resource node as seen by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    /// Entity id.
    pub id: u64,
    /// Tree or gold mine.
    pub kind: ResourceKind,
    /// Centre x.
    pub x: f64,
    /// Centre y.
    pub y: f64,
    /// Radius.
    pub size: f64,
    /// Stock left.
    pub resources: i32,
}

impl StateSnapshot {
    /// Capture the current state of a world.
    #[must_use]
    pub fn capture(world: &World) -> Self {
        let factions = FactionId::ALL
            .iter()
            .map(|&id| {
                let faction = world.faction(id);
                FactionState {
                    faction: id,
                    gold: faction.stockpile.gold,
                    wood: faction.stockpile.wood,
                    food: faction.stockpile.food,
                    population: faction.population,
                    population_limit: faction.population_limit,
                    units: faction
                        .units
                        .values()
                        .map(|u| {
                            let (x, y) = u.position.to_f64();
                            let (task, target) = match u.task {
                                None => ("idle", None),
                                Some(Task::Attack(t)) => ("attack", Some(t.id())),
                                Some(Task::Gather(node)) => ("gather", Some(node)),
                            };
                            UnitState {
                                id: u.id,
                                kind: u.kind,
                                x,
                                y,
                                size: u.size.to_num(),
                                health: u.health.current,
                                max_health: u.health.max,
                                task: task.to_string(),
                                target,
                            }
                        })
                        .collect(),
                    buildings: faction
                        .buildings
                        .values()
                        .map(|b| {
                            let (x, y) = b.position.to_f64();
                            BuildingState {
                                id: b.id,
                                kind: b.kind,
                                x,
                                y,
                                width: b.width.to_num(),
                                height: b.height.to_num(),
                                health: b.health.current,
                                max_health: b.health.max,
                            }
                        })
                        .collect(),
                }
            })
            .collect();

        let resource_nodes = world
            .terrain()
            .nodes()
            .map(|n| {
                let (x, y) = n.position.to_f64();
                NodeState {
                    id: n.id,
                    kind: n.kind,
                    x,
                    y,
                    size: n.size.to_num(),
                    resources: n.resources,
                }
            })
            .collect();

        Self {
            tick: world.tick_count(),
            clock_ms: world.clock_ms(),
            winner: world.outcome().map(|o| o.winner),
            selection: world.selection().to_vec(),
            build_mode: world.build_mode(),
            factions,
            resource_nodes,
            hash: world.state_hash(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::config::SimConfig;

    #[test]
    fn test_parse_tick_command() {
        let json = r#"{"cmd":"tick","count":60}"#;
        let cmd = Command::from_json(json).unwrap();
        assert_eq!(cmd, Command::Tick { count: 60 });
    }

    #[test]
    fn test_default_tick_count() {
        let json = r#"{"cmd":"tick"}"#;
        let cmd = Command::from_json(json).unwrap();
        assert_eq!(cmd, Command::Tick { count: 1 });
    }

    #[test]
    fn test_parse_build_and_train() {
        let build = Command::from_json(r#"{"cmd":"build","kind":"town_hall","x":100,"y":200.5}"#)
            .unwrap();
        assert_eq!(
            build,
            Command::Build {
                kind: BuildingKind::TownHall,
                x: 100.0,
                y: 200.5
            }
        );
        let train = Command::from_json(r#"{"cmd":"train","kind":"archer"}"#).unwrap();
        assert_eq!(train, Command::Train { kind: UnitKind::Archer });
        assert_eq!(train.name(), "train");
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert!(Command::from_json(r#"{"cmd":"train","kind":"catapult"}"#).is_err());
        assert!(Command::from_json(r#"{"cmd":"teleport"}"#).is_err());
    }

    #[test]
    fn test_unit_commands_round_trip() {
        for cmd in [
            Command::ClearSelection,
            Command::Reset,
            Command::Query,
            Command::Hash,
            Command::Quit,
        ] {
            let json = serde_json::to_string(&cmd).unwrap();
            assert!(json.contains(cmd.name()));
            assert_eq!(Command::from_json(&json).unwrap(), cmd);
        }
    }

    #[test]
    fn test_serialize_responses() {
        let ack = Response::ack("order", Some("move".to_string())).to_json_line();
        assert_eq!(ack, "{\"type\":\"ack\",\"cmd\":\"order\",\"detail\":\"move\"}\n");

        let bare = Response::ack("reset", None).to_json_line();
        assert!(!bare.contains("detail"));

        let over = Response::GameOver {
            winner: FactionId::Opponent,
            tick: 9,
        }
        .to_json_line();
        assert!(over.contains(r#""winner":"opponent""#));
    }

    #[test]
    fn test_snapshot_of_starting_match() {
        let world = World::new(SimConfig::default().with_seed(3));
        let snapshot = StateSnapshot::capture(&world);
        assert_eq!(snapshot.factions.len(), 2);
        assert_eq!(snapshot.factions[0].faction, FactionId::Player);
        assert_eq!(snapshot.factions[0].units.len(), 8);
        assert_eq!(snapshot.factions[1].buildings.len(), 2);
        assert_eq!(snapshot.resource_nodes.len(), 220);
        assert!(snapshot.factions[0].units.iter().all(|u| u.task == "idle"));

        let worker = snapshot.factions[0]
            .units
            .iter()
            .find(|u| u.kind == UnitKind::Worker)
            .unwrap();
        assert_eq!((worker.size, worker.max_health), (8.0, 50));
        let hall = snapshot.factions[1]
            .buildings
            .iter()
            .find(|b| b.kind == BuildingKind::TownHall)
            .unwrap();
        assert_eq!((hall.width, hall.height), (80.0, 80.0));
        assert_eq!(hall.max_health, 1000);
        assert!(snapshot.resource_nodes.iter().all(|n| n.size > 0.0));

        let json = Response::State(Box::new(snapshot)).to_json_line();
        assert!(json.starts_with(r#"{"type":"state","tick":0"#));
    }
}

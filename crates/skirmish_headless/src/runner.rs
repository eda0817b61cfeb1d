//! Headless match runners.
//!
//! [`Session`] wraps one [`World`] and answers protocol commands;
//! [`run_interactive`] pumps it over JSON lines. [`run_match`] plays a
//! whole match without any controller.

use std::io::{self, BufRead, Write};

use skirmish_core::config::SimConfig;
use skirmish_core::factions::FactionId;
use skirmish_core::math::Vec2Fixed;
use skirmish_core::player_facade::{OrderOutcome, PlayerFacade};
use skirmish_core::simulation::TickEvents;
use skirmish_core::world::World;
use tracing::{debug, info};

use crate::protocol::{Command, Response, StateSnapshot};
use crate::scheduler::FrameScheduler;
use crate::summary::MatchSummary;

/// Factions run by the decision loop in a normal match.
const OPPONENT_ONLY: &[FactionId] = &[FactionId::Opponent];

/// Settings for a batch match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    /// World settings, seed included.
    pub sim: SimConfig,
    /// Give up after this many ticks.
    pub max_ticks: u64,
    /// Step length handed to the scheduler.
    pub step_ms: u32,
    /// Drive the player faction with the decision loop too.
    pub mirror: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            sim: SimConfig::default(),
            max_ticks: 36_000,
            step_ms: crate::scheduler::DEFAULT_STEP_MS,
            mirror: false,
        }
    }
}

/// Play a match until someone wins or `max_ticks` runs out.
///
/// The host clock is simulated: every frame reports exactly one step of
/// elapsed time, so the scheduler runs one tick per frame.
pub fn run_match(config: &MatchConfig) -> MatchSummary {
    let mut world = World::new(config.sim.clone());
    let mut scheduler = FrameScheduler::new(config.step_ms);
    let scripted: &[FactionId] = if config.mirror {
        &FactionId::ALL
    } else {
        OPPONENT_ONLY
    };
    let mut summary = MatchSummary::new(config.sim.seed, config.mirror);

    info!(
        seed = config.sim.seed,
        max_ticks = config.max_ticks,
        mirror = config.mirror,
        "Starting match"
    );

    while !world.is_over() && world.tick_count() < config.max_ticks {
        let report = scheduler.run_frame(&mut world, u64::from(scheduler.step_ms()), scripted);
        for events in &report.ticks {
            summary.record(events);
        }
    }

    summary.finalize(&world);
    info!(
        ticks = summary.ticks,
        winner = ?summary.winner,
        hash = summary.final_state_hash,
        "Match finished"
    );
    summary
}

/// One interactive match.
#[derive(Debug, Clone)]
pub struct Session {
    world: World,
    scheduler: FrameScheduler,
}

impl Session {
    /// New match from `sim`, ticking in steps of `step_ms`.
    #[must_use]
    pub fn new(sim: SimConfig, step_ms: u32) -> Self {
        Self {
            world: World::new(sim),
            scheduler: FrameScheduler::new(step_ms),
        }
    }

    /// The match being played.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Greeting sent before the first command.
    #[must_use]
    pub fn ready(&self) -> Response {
        Response::ready(&self.world)
    }

    /// Parse and handle one input line. Blank lines produce nothing.
    pub fn handle_line(&mut self, line: &str) -> Vec<Response> {
        let line = line.trim();
        if line.is_empty() {
            return Vec::new();
        }
        match Command::from_json(line) {
            Ok(cmd) => self.handle(&cmd),
            Err(e) => vec![Response::error(format!("Parse error: {e}"), None)],
        }
    }

    /// Handle one command.
    pub fn handle(&mut self, cmd: &Command) -> Vec<Response> {
        let name = cmd.name();
        debug!(cmd = name, "Handling command");

        let result = match *cmd {
            Command::Tick { count } => return self.tick(count),
            Command::Select { x0, y0, x1, y1 } => self
                .world
                .select_units_in_rect(Vec2Fixed::from_f64(x0, y0), Vec2Fixed::from_f64(x1, y1))
                .map(|n| Some(format!("{n} units selected"))),
            Command::ClearSelection => {
                self.world.clear_selection();
                Ok(None)
            }
            Command::Order { x, y } => self
                .world
                .issue_order(Vec2Fixed::from_f64(x, y))
                .map(|outcome| Some(describe_order(outcome))),
            Command::Build { kind, x, y } => self.build(kind, Vec2Fixed::from_f64(x, y)),
            Command::Train { kind } => self
                .world
                .train_unit(kind)
                .map(|id| Some(format!("unit {id}"))),
            Command::Reset => {
                self.world.reset_match();
                Ok(None)
            }
            Command::Query => {
                return vec![Response::State(Box::new(StateSnapshot::capture(&self.world)))];
            }
            Command::Hash => {
                return vec![Response::Hash {
                    tick: self.world.tick_count(),
                    hash: self.world.state_hash(),
                }];
            }
            Command::Quit => return vec![Response::Bye],
        };

        match result {
            Ok(detail) => vec![Response::ack(name, detail)],
            Err(e) => vec![Response::error(e.to_string(), Some(name))],
        }
    }

    fn build(
        &mut self,
        kind: skirmish_core::data::BuildingKind,
        point: Vec2Fixed,
    ) -> skirmish_core::error::CommandResult<Option<String>> {
        self.world.set_build_mode(kind)?;
        match self.world.confirm_build(point) {
            Ok(id) => Ok(Some(format!("building {id}"))),
            Err(e) => {
                self.world.cancel_build_mode();
                Err(e)
            }
        }
    }

    fn tick(&mut self, count: u32) -> Vec<Response> {
        if self.world.is_over() {
            return vec![Response::error(
                skirmish_core::error::CommandError::MatchOver.to_string(),
                Some("tick"),
            )];
        }

        let ticks = self.scheduler.run_steps(&mut self.world, count, OPPONENT_ONLY);
        let mut responses = vec![Response::ack("tick", Some(format!("{} ticks", ticks.len())))];
        if let Some(outcome) = ticks.iter().find_map(|events: &TickEvents| events.game_over) {
            responses.push(Response::GameOver {
                winner: outcome.winner,
                tick: self.world.tick_count(),
            });
        }
        responses
    }
}

fn describe_order(outcome: OrderOutcome) -> String {
    match outcome {
        OrderOutcome::Attack(target) => format!("attack {}", target.id()),
        OrderOutcome::Gather(node) => format!("gather {node}"),
        OrderOutcome::Move => "move".to_string(),
    }
}

/// Read JSON-line commands from `input` and write responses to `output`
/// until `quit` or end of input.
pub fn run_interactive<R: BufRead, W: Write>(
    session: &mut Session,
    input: R,
    mut output: W,
) -> io::Result<()> {
    output.write_all(session.ready().to_json_line().as_bytes())?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        let responses = session.handle_line(&line);
        let quitting = responses.iter().any(|r| matches!(r, Response::Bye));
        for response in responses {
            output.write_all(response.to_json_line().as_bytes())?;
        }
        output.flush()?;
        if quitting {
            info!("Session closed by controller");
            return Ok(());
        }
    }

    info!("Input closed");
    Ok(())
}

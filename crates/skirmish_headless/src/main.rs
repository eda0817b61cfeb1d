//! Headless skirmish runner.
//!
//! This binary runs a match without graphics, either to completion or
//! under the control of JSON commands on stdin/stdout.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p skirmish_headless
//!
//! # Play one match against the opponent AI and print a summary
//! cargo run -p skirmish_headless -- run --seed 42 --max-ticks 36000
//!
//! # Same, with the decision loop driving both sides
//! cargo run -p skirmish_headless -- run --seed 42 --mirror
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information
//!
//! See the protocol module for command/response format.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use skirmish_core::config::SimConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skirmish_headless::{
    run_interactive, run_match,
    scheduler::DEFAULT_STEP_MS,
    HeadlessError, MatchConfig, Session,
};

#[derive(Parser)]
#[command(name = "skirmish_headless")]
#[command(about = "Headless skirmish runner for AI testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one match to completion and print a JSON summary
    Run {
        /// World seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Stop after this many ticks if nobody has won
        #[arg(long, default_value = "36000")]
        max_ticks: u64,

        /// RON config file (seed from --seed wins)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Simulation step in milliseconds
        #[arg(long, default_value_t = DEFAULT_STEP_MS)]
        step_ms: u32,

        /// Let the decision loop drive the player faction too
        #[arg(long)]
        mirror: bool,
    },

    /// Serve JSON-line commands on stdin/stdout (default)
    Interactive {
        /// World seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// RON config file (seed from --seed wins)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Simulation step in milliseconds
        #[arg(long, default_value_t = DEFAULT_STEP_MS)]
        step_ms: u32,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr (stdout is for protocol)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let result = match cli.command {
        Some(Commands::Run {
            seed,
            max_ticks,
            config,
            step_ms,
            mirror,
        }) => cmd_run(seed, max_ticks, config.as_deref(), step_ms, mirror),
        Some(Commands::Interactive {
            seed,
            config,
            step_ms,
        }) => cmd_interactive(seed, config.as_deref(), step_ms),
        None => cmd_interactive(0, None, DEFAULT_STEP_MS),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Load the config file if given, then apply the seed.
fn load_config(path: Option<&Path>, seed: u64) -> Result<SimConfig, HeadlessError> {
    let config = match path {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    Ok(config.with_seed(seed))
}

/// Play a match and print its summary
fn cmd_run(
    seed: u64,
    max_ticks: u64,
    config: Option<&Path>,
    step_ms: u32,
    mirror: bool,
) -> Result<(), HeadlessError> {
    let sim = load_config(config, seed)?;
    let summary = run_match(&MatchConfig {
        sim,
        max_ticks,
        step_ms,
        mirror,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Serve the JSON-lines protocol
fn cmd_interactive(seed: u64, config: Option<&Path>, step_ms: u32) -> Result<(), HeadlessError> {
    tracing::info!("Starting interactive session");
    let sim = load_config(config, seed)?;
    let mut session = Session::new(sim, step_ms);
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_interactive(&mut session, stdin.lock(), stdout.lock())?;
    Ok(())
}

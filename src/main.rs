//! Swarm CLI - Command-line interface for running and watching Swarm games.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Swarm - A deterministic territory-conquest simulation
#[derive(Parser, Debug)]
#[command(name = "swarm")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single game with the autopilot in the player seat
    Run {
        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Maximum turns (default: 200)
        #[arg(short, long, default_value = "200")]
        turns: u32,

        /// Campaign level (1-15) instead of a random map
        #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..=15))]
        level: Option<u16>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Suppress the banner
        #[arg(short, long)]
        quiet: bool,
    },

    /// Interactive TUI to watch or play a game in real time
    Watch {
        /// Random seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Campaign level (1-15) instead of a random map
        #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..=15))]
        level: Option<u16>,

        /// Start with the autopilot off; end turns with [e]
        #[arg(short, long)]
        manual: bool,
    },

    /// Run mass parallel games and aggregate statistics
    Tournament {
        /// Number of games to run (default: 1000)
        #[arg(short, long, default_value = "1000")]
        games: u64,

        /// Starting seed (increments for each game)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Maximum turns per game (default: 200)
        #[arg(short = 't', long)]
        max_turns: Option<u32>,

        /// Campaign level (1-15) instead of random maps
        #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..=15))]
        level: Option<u16>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::TournamentFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Configuration file (JSON)
        #[arg(required = true)]
        file: PathBuf,
    },
}

/// Zero-based level index from the one-based CLI value.
fn level_index(level: Option<u16>) -> Option<usize> {
    level.map(|l| usize::from(l.saturating_sub(1)))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.config.as_deref();

    let result = match args.command {
        Commands::Run {
            seed,
            turns,
            level,
            format,
            quiet,
        } => cli::run::execute(config, seed, turns, level_index(level), format, quiet),

        Commands::Watch {
            seed,
            level,
            manual,
        } => cli::watch::execute(config, seed, level_index(level), manual),

        Commands::Tournament {
            games,
            seed,
            threads,
            max_turns,
            level,
            format,
            progress,
        } => cli::tournament::execute(
            config,
            games,
            seed,
            threads,
            max_turns,
            level_index(level),
            format,
            progress,
        ),

        Commands::Validate { file } => cli::validate::execute(&file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

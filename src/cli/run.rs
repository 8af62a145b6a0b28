//! Run command implementation.

use super::output::{JsonRunOutput, format_text};
use super::{CliError, OutputFormat, load_config, seed_or_now};
use std::path::Path;
use swarm::GameEngine;
use swarm::autoplay::{AutoplayConfig, play_out};

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the map cannot be
/// built.
pub(crate) fn execute(
    config_path: Option<&Path>,
    seed: Option<u64>,
    turns: u32,
    level: Option<usize>,
    format: OutputFormat,
    quiet: bool,
) -> Result<(), CliError> {
    let engine_config = load_config(config_path)?;
    let seed = seed_or_now(seed);

    let config = AutoplayConfig {
        max_turns: turns,
        level,
        ..AutoplayConfig::default()
    };

    if !quiet && format == OutputFormat::Text {
        match level {
            Some(idx) => println!("Running campaign level {} with seed {seed}...", idx + 1),
            None => println!("Running skirmish with seed {seed}..."),
        }
        println!();
    }

    let mut engine = GameEngine::new(engine_config, seed);
    match level {
        Some(idx) => engine.start_campaign(idx)?,
        None => engine.start_skirmish()?,
    }
    let result = play_out(&mut engine, seed, &config);
    let snapshot = engine.snapshot();

    match format {
        OutputFormat::Text => {
            print!("{}", format_text(&result, &snapshot));
        }
        OutputFormat::Json => {
            let output = JsonRunOutput {
                result: &result,
                snapshot: &snapshot,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

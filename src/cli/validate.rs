//! Config validation command implementation.

use super::CliError;
use std::path::Path;
use swarm::scenario::LEVEL_COUNT;
use swarm::{EngineConfig, GameEngine};

/// Execute the validate command.
///
/// Loads the file, checks its values and builds a skirmish map and every
/// campaign level with it.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or used.
pub(crate) fn execute(path: &Path) -> Result<(), CliError> {
    println!("Validating: {}", path.display());
    println!();

    let config = EngineConfig::from_json_file(path);
    print_check("JSON parses", config.is_ok());
    let config = config?;

    let valid = config.validate();
    print_check("Values in range", valid.is_ok());
    valid?;

    let mut engine = GameEngine::new(config.clone(), 0);
    let skirmish = engine.start_skirmish();
    print_check("Skirmish map builds", skirmish.is_ok());
    skirmish?;

    let mut levels_ok = true;
    for level in 0..LEVEL_COUNT {
        if let Err(e) = engine.start_campaign(level) {
            levels_ok = false;
            println!("    level {}: {e}", level + 1);
        }
    }
    print_check("Campaign levels build", levels_ok);
    if !levels_ok {
        return Err(CliError::new("Campaign levels failed to build"));
    }

    println!();
    println!("Summary:");
    println!("  Territories:  {}", config.map.territories);
    println!("  AI factions:  {}", config.map.ai_factions);
    println!("  Map area:     {}x{}", config.map.width, config.map.height);
    println!("  Difficulty:   {:?}", config.ai.difficulty);
    println!();
    println!("Validation successful!");

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}

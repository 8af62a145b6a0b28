//! Headless game runner with a scripted player.
//!
//! Provides a pure function interface: `(seed, config) -> GameResult`
//!
//! The runner handles:
//! - Skirmish or campaign map setup
//! - A greedy autopilot for the player seat
//! - Stepping the engine at its fixed step until a result or a limit

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::MapGenError;
use crate::game::{
    Faction, GameEngine, MAX_FACTION_ID, Outcome, TerritoryId, TerritoryMap, UnitType,
    base_score, invariants,
};

/// Limits and map choice for one autoplayed game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoplayConfig {
    /// Maximum turns before the game is called unfinished.
    pub max_turns: u32,
    /// Maximum simulation steps before the game is called unfinished.
    pub max_steps: u64,
    /// Campaign level to play; a random skirmish map when `None`.
    pub level: Option<usize>,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            max_turns: 200,
            max_steps: 2_000_000,
            level: None,
        }
    }
}

/// Territories held by one faction at the end of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionStats {
    /// Faction.
    pub faction: Faction,
    /// Territories owned.
    pub territories: usize,
}

/// Final result of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    /// Terminal result, or `None` if a limit was hit first.
    pub outcome: Option<Outcome>,
    /// Turn the game ended on.
    pub turns_played: u32,
    /// Simulation steps run.
    pub steps: u64,
    /// Seconds of game time.
    pub elapsed: f32,
    /// Territories that changed hands.
    pub captures: u32,
    /// Ownership at the end, player first then AI factions.
    pub factions: Vec<FactionStats>,
    /// The seed used for this game.
    pub seed: u64,
}

impl GameResult {
    /// Territories the player held at the end.
    #[must_use]
    pub fn player_territories(&self) -> usize {
        self.factions
            .iter()
            .find(|s| s.faction == Faction::Player)
            .map_or(0, |s| s.territories)
    }
}

/// Run a complete game with the autopilot in the player seat.
///
/// # Arguments
///
/// * `seed` - Random seed for map generation and AI decisions
/// * `engine_config` - Engine configuration
/// * `config` - Limits and map choice
///
/// # Errors
///
/// Returns an error if the map cannot be generated.
pub fn run_game(
    seed: u64,
    engine_config: &EngineConfig,
    config: &AutoplayConfig,
) -> Result<GameResult, MapGenError> {
    let mut engine = GameEngine::new(engine_config.clone(), seed);
    match config.level {
        Some(level) => engine.start_campaign(level)?,
        None => engine.start_skirmish()?,
    }
    Ok(play_out(&mut engine, seed, config))
}

/// Play an already started game to the end or to a limit.
///
/// `seed` is only recorded in the result.
pub fn play_out(engine: &mut GameEngine, seed: u64, config: &AutoplayConfig) -> GameResult {
    GameRunner {
        engine,
        config: *config,
        seed,
    }
    .run()
}

/// Drives one engine to completion.
struct GameRunner<'a> {
    engine: &'a mut GameEngine,
    config: AutoplayConfig,
    seed: u64,
}

impl GameRunner<'_> {
    fn run(self) -> GameResult {
        let step = self.engine.step();
        let mut steps = 0u64;
        let mut played_turn = 0;

        while !self.engine.is_game_over()
            && self.engine.turn() <= self.config.max_turns
            && steps < self.config.max_steps
        {
            if self.engine.is_player_turn() && played_turn != self.engine.turn() {
                played_turn = self.engine.turn();
                invariants::assert_invariants(&self.engine);
                play_turn(self.engine);
            }
            self.engine.update(step);
            steps += 1;
        }

        let result = self.finish(steps);
        info!(
            seed = result.seed,
            outcome = ?result.outcome,
            turns = result.turns_played,
            steps,
            "autoplay finished"
        );
        result
    }

    fn finish(&self, steps: u64) -> GameResult {
        let map = self.engine.map();
        let factions = (1..=MAX_FACTION_ID)
            .filter_map(Faction::from_id)
            .filter(|&f| f == Faction::Player || f.id() <= self.engine.max_ai_faction())
            .map(|faction| FactionStats {
                faction,
                territories: map.count_owned(faction),
            })
            .collect();

        GameResult {
            outcome: self.engine.result(),
            turns_played: self.engine.turn(),
            steps,
            elapsed: self.engine.elapsed(),
            captures: self.engine.captures(),
            factions,
            seed: self.seed,
        }
    }
}

/// The neighbour of `source` the autopilot would attack, if it is weak
/// enough to take with the current send percent.
fn pick_target(map: &TerritoryMap, source: TerritoryId, send_percent: u32) -> Option<TerritoryId> {
    let origin = map.get(source)?;
    let sendable = origin.total() * send_percent.min(100) / 100;

    let mut best: Option<(TerritoryId, f32)> = None;
    for &id in &origin.neighbors {
        let Some(candidate) = map.get(id) else {
            continue;
        };
        if candidate.owner == Faction::Player || candidate.total() >= sendable {
            continue;
        }
        let score = base_score(origin, candidate);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((id, score));
        }
    }
    best.map(|(id, _)| id)
}

/// The player territory with the largest garrison that borders an enemy.
fn frontier(map: &TerritoryMap) -> Option<TerritoryId> {
    map.owned_by(Faction::Player)
        .filter(|t| {
            t.neighbors
                .iter()
                .filter_map(|&id| map.get(id))
                .any(|n| n.owner != Faction::Player)
        })
        .max_by_key(|t| (t.total(), std::cmp::Reverse(t.id)))
        .map(|t| t.id)
}

/// Play the player seat for one turn: attack, spend, end the turn.
pub fn play_turn(engine: &mut GameEngine) {
    let send_percent = engine.send_percent();
    let sources: Vec<TerritoryId> = engine
        .map()
        .owned_by(Faction::Player)
        .filter(|t| t.can_attack())
        .map(|t| t.id)
        .collect();

    let mut attacks = 0;
    for source in sources {
        if let Some(target) = pick_target(engine.map(), source, send_percent) {
            if engine.attack(source, target) {
                attacks += 1;
            }
        }
    }

    let mut bought = 0;
    if let Some(id) = frontier(engine.map()) {
        let price = engine.ledger().prices().unit_cost(UnitType::Sword, false);
        if price > 0 {
            let count = engine.gold() / price;
            if count > 0 && engine.buy_units(id, UnitType::Sword, false, count) {
                bought = count;
            }
        }
    }

    debug!(turn = engine.turn(), attacks, bought, "autopilot turn");
    engine.end_turn();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_game_is_deterministic() {
        let config = AutoplayConfig {
            max_turns: 30,
            ..AutoplayConfig::default()
        };
        let a = run_game(17, &EngineConfig::default(), &config).unwrap();
        let b = run_game(17, &EngineConfig::default(), &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.seed, 17);
    }

    #[test]
    fn test_run_game_respects_turn_limit() {
        let config = AutoplayConfig {
            max_turns: 3,
            ..AutoplayConfig::default()
        };
        let result = run_game(2, &EngineConfig::default(), &config).unwrap();
        assert!(result.turns_played <= 4);
        assert_eq!(result.factions.len(), 4);
        let owned: usize = result.factions.iter().map(|s| s.territories).sum();
        assert!(owned <= 24);
    }

    #[test]
    fn test_first_level_played_through() {
        let config = AutoplayConfig {
            max_turns: 100,
            level: Some(0),
            ..AutoplayConfig::default()
        };
        let result = run_game(1, &EngineConfig::default(), &config).unwrap();
        assert!(result.steps > 0);
        if result.outcome == Some(Outcome::Win) {
            assert_eq!(result.player_territories(), 4);
        }
    }

    #[test]
    fn test_level_index_wraps() {
        let config = AutoplayConfig {
            max_turns: 10,
            level: Some(40),
            ..AutoplayConfig::default()
        };
        let wrapped = run_game(0, &EngineConfig::default(), &config).unwrap();
        let direct = run_game(
            0,
            &EngineConfig::default(),
            &AutoplayConfig {
                level: Some(10),
                ..config
            },
        )
        .unwrap();
        assert_eq!(wrapped, direct);
    }
}

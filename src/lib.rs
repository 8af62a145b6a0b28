// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Swarm: a deterministic territory-conquest simulation engine.
//!
//! Factions own territories on a planar graph, send unit convoys to
//! adjacent territories, fight tick-based battles and grow their garrisons.
//! The player moves first each turn; AI factions follow in id order.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   CLI: run / tournament / watch     │
//! ├─────────────────────────────────────┤
//! │   Autoplay (scripted player)        │
//! ├─────────────────────────────────────┤
//! │   GameEngine (commands, snapshots)  │
//! ├─────────────────────────────────────┤
//! │   Rules: economy, convoys, combat,  │
//! │          growth, turns, AI          │
//! ├─────────────────────────────────────┤
//! │   Scenario: skirmish maps, levels   │
//! └─────────────────────────────────────┘
//! ```
//!
//! All randomness flows through one seeded [`SimRng`], so a seed and a
//! command sequence reproduce a game exactly.

pub mod autoplay;
pub mod config;
pub mod error;
pub mod game;
pub mod scenario;

pub use config::EngineConfig;
pub use error::{ConfigError, MapGenError, SwarmError};

// Re-export key game types at crate root for convenience
pub use game::{
    Faction, GameEngine, GameEvent, Outcome, Snapshot, Squad, Territory, TerritoryId,
    TerritoryMap, TurnPhase, UnitType,
};

/// Random number generator driving every stochastic decision.
pub type SimRng = rand_chacha::ChaCha8Rng;

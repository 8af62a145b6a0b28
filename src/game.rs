//! Game layer for Swarm.
//!
//! Implements the rules of the territory-conquest simulation:
//! - Territory graph with owners, garrisons and buildings
//! - Gold ledger for purchases and turn-end income
//! - Convoy logistics between adjacent territories
//! - Tick-based combat resolution and growth pulses
//! - Turn sequencing and AI targeting
//! - The engine tying them together behind commands and snapshots

mod ai;
mod combat;
mod convoy;
mod driver;
mod economy;
mod engine;
mod faction;
mod growth;
pub mod invariants;
mod map;
mod snapshot;
mod territory;
mod turn;
mod units;

pub use ai::{Aggression, base_score, choose_source, choose_target, has_eligible_source};
pub use combat::{
    BattleReport, BattleResult, CAPTURE_PERCENT, GIANT_WEIGHT, TICK_SECONDS, advance_battle,
    apply_damage, multiplier_bp, priority, raw_damage, resolve_battle,
};
pub use convoy::{
    ArrivalOutcome, Convoy, ConvoyArena, ConvoyId, MAX_CONVOYS, MIN_CONVOYS, MIN_TRAVEL_TIME,
    SendAmount, TransferOrder, allocate, apply_arrival, convoy_count, issue_transfer,
    split_payload, travel_time,
};
pub use driver::FixedStep;
pub use economy::{DEFAULT_BASE_INCOME, Ledger, PriceList, roll_gold_income};
pub use engine::{GameEngine, GameEvent, SEND_PERCENT_STEPS};
pub use faction::{Difficulty, Faction, FactionId, MAX_FACTION_ID};
pub use growth::{GrowthReport, apply_growth_pulse, distribute, pulse_amount};
pub use map::{MAX_DEGREE, TerritoryMap};
pub use snapshot::{BattleView, ConvoyView, Outcome, Snapshot, TerritoryView, format_clock};
pub use territory::{Battle, BuildingType, Point, SpecialEffect, Territory, TerritoryId};
pub use turn::{FIRST_AI_FACTION, RoundTracker, TurnController, TurnPhase};
pub use units::{Formation, Garrison, Squad, UnitType};

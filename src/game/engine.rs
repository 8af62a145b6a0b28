//! The game engine: commands in, snapshots out.
//!
//! All mutation happens in [`GameEngine::update`] and the command methods.
//! Commands are validated and silently ignored when invalid; the reason is
//! logged at debug level.

use std::fmt;

use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::SimRng;
use crate::config::EngineConfig;
use crate::error::MapGenError;
use crate::game::{
    ArrivalOutcome, BattleReport, BattleResult, BuildingType, Convoy, ConvoyArena, Difficulty,
    Faction, FactionId, FixedStep, Formation, GrowthReport, Ledger, Outcome, RoundTracker,
    SendAmount, Snapshot, TerritoryId, TerritoryMap, TransferOrder, TurnController, TurnPhase,
    UnitType, advance_battle, apply_arrival, apply_growth_pulse, choose_source, choose_target,
    format_clock, has_eligible_source, issue_transfer, roll_gold_income,
};
use crate::scenario::{self, Scenario};

/// Send percent values the player cycles through.
pub const SEND_PERCENT_STEPS: [u32; 4] = [25, 50, 75, 100];

/// Something that happened during a step, for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A new game started.
    GameStarted {
        /// Territories on the map.
        territories: usize,
        /// Highest AI faction id.
        max_ai_faction: FactionId,
    },
    /// Units left a territory.
    TransferIssued {
        /// Source territory.
        source: TerritoryId,
        /// Target territory.
        target: TerritoryId,
        /// Issuing faction.
        owner: Faction,
        /// Units sent.
        units: u32,
    },
    /// A convoy reached a territory already fought over by a third faction
    /// and was discarded.
    ConvoyDropped {
        /// Target territory.
        territory: TerritoryId,
        /// Owner of the lost convoy.
        owner: Faction,
        /// Units lost.
        units: u32,
    },
    /// A battle began.
    BattleStarted {
        /// Contested territory.
        territory: TerritoryId,
        /// Attacker.
        attacker: Faction,
        /// Owner.
        defender: Faction,
    },
    /// A battle ended.
    BattleResolved(BattleReport),
    /// A territory changed hands.
    TerritoryCaptured {
        /// Territory.
        territory: TerritoryId,
        /// Previous owner.
        from: Faction,
        /// New owner.
        to: Faction,
    },
    /// Every active faction fought; all owned territories grew.
    GrowthPulse(GrowthReport),
    /// A new turn began.
    TurnStarted {
        /// Turn number.
        turn: u32,
        /// Turn-end gold bonus paid to the player.
        bonus: u32,
    },
    /// The game reached a terminal state.
    GameOver(Outcome),
}

/// Why a command was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    NoGame,
    GameOver,
    WrongPhase(TurnPhase),
    UnknownTerritory(TerritoryId),
    NotOwned(TerritoryId),
    SameTerritory,
    NotAdjacent(TerritoryId, TerritoryId),
    AlreadyAttacked(TerritoryId),
    NothingToSend(TerritoryId),
    InsufficientGold { needed: u64, available: u32 },
    NoBuilding,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoGame => write!(f, "no game in progress"),
            Self::GameOver => write!(f, "game is over"),
            Self::WrongPhase(phase) => write!(f, "not allowed during {phase}"),
            Self::UnknownTerritory(id) => write!(f, "unknown territory {id}"),
            Self::NotOwned(id) => write!(f, "territory {id} is not the player's"),
            Self::SameTerritory => write!(f, "source and target are the same"),
            Self::NotAdjacent(a, b) => write!(f, "territories {a} and {b} are not adjacent"),
            Self::AlreadyAttacked(id) => write!(f, "territory {id} already attacked this turn"),
            Self::NothingToSend(id) => write!(f, "territory {id} has no units to spare"),
            Self::InsufficientGold { needed, available } => {
                write!(f, "needs {needed} gold, have {available}")
            }
            Self::NoBuilding => write!(f, "no building selected"),
        }
    }
}

fn reject(command: &'static str, reason: Rejection) -> bool {
    debug!(command, %reason, "command rejected");
    false
}

/// Territory-conquest simulation.
#[derive(Debug, Clone)]
pub struct GameEngine {
    config: EngineConfig,
    rng: SimRng,
    map: TerritoryMap,
    convoys: ConvoyArena,
    ledger: Ledger,
    turns: TurnController,
    round: RoundTracker,
    driver: FixedStep,
    difficulty: Difficulty,
    send_percent: u32,
    formation: Formation,
    speed: f32,
    battle_paused: bool,
    elapsed: f32,
    result: Option<Outcome>,
    game_over: bool,
    captures: u32,
    events: Vec<GameEvent>,
}

impl GameEngine {
    /// Create an engine with no game loaded.
    ///
    /// All randomness is drawn from a generator seeded with `seed`.
    #[must_use]
    pub fn new(config: EngineConfig, seed: u64) -> Self {
        let driver = FixedStep::new(config.driver.step, config.driver.max_frame_delta);
        let ledger = Ledger::new(
            config.economy.starting_gold,
            config.economy.base_income,
            config.economy.prices,
        );
        Self {
            rng: SimRng::seed_from_u64(seed),
            map: TerritoryMap::default(),
            convoys: ConvoyArena::new(),
            ledger,
            turns: TurnController::new(0),
            round: RoundTracker::default(),
            driver,
            difficulty: config.ai.difficulty,
            send_percent: config.logistics.send_percent,
            formation: config.logistics.formation,
            speed: config.driver.speed,
            battle_paused: false,
            elapsed: 0.0,
            result: None,
            game_over: false,
            captures: 0,
            events: Vec::new(),
            config,
        }
    }

    // ---- lifecycle -------------------------------------------------------

    /// Clear territories, convoys, events and any result.
    pub fn reset(&mut self) {
        self.map = TerritoryMap::default();
        self.convoys.clear();
        self.events.clear();
        self.turns = TurnController::new(0);
        self.round.clear();
        self.driver.reset();
        self.result = None;
        self.game_over = false;
        self.battle_paused = false;
        self.elapsed = 0.0;
        self.captures = 0;
    }

    /// Start a game on a random map.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured map cannot be generated.
    pub fn start_skirmish(&mut self) -> Result<(), MapGenError> {
        self.reset();
        let scenario = scenario::generate_skirmish(&self.config.map, &mut self.rng)?;
        self.difficulty = self.config.ai.difficulty;
        self.install(scenario);
        Ok(())
    }

    /// Start a campaign level (zero-based). Indices past the last level wrap
    /// around to the start of the campaign.
    ///
    /// # Errors
    ///
    /// Returns an error if the level's map cannot be built.
    pub fn start_campaign(&mut self, index: usize) -> Result<(), MapGenError> {
        self.reset();
        let index = index % scenario::LEVEL_COUNT;
        let level = scenario::level(index)?;
        let scenario = scenario::build_level(index, &self.config.map, &mut self.rng)?;
        self.difficulty = level.difficulty;
        self.install(scenario);
        Ok(())
    }

    /// Start a game on a prepared map.
    ///
    /// Player territories get a fresh gold income roll.
    pub fn start_with_map(&mut self, map: TerritoryMap, max_ai_faction: FactionId) {
        self.reset();
        self.difficulty = self.config.ai.difficulty;
        self.install(Scenario {
            map,
            max_ai_faction,
        });
    }

    fn install(&mut self, scenario: Scenario) {
        let Scenario {
            mut map,
            max_ai_faction,
        } = scenario;
        scenario::roll_player_income(
            &mut map,
            self.config.economy.gold_income_range(),
            &mut self.rng,
        );

        self.map = map;
        self.turns = TurnController::new(max_ai_faction);
        self.ledger = Ledger::new(
            self.config.economy.starting_gold,
            self.config.economy.base_income,
            self.config.economy.prices,
        );
        self.send_percent = self.config.logistics.send_percent;
        self.formation = self.config.logistics.formation;
        self.speed = self.config.driver.speed;

        info!(
            territories = self.map.len(),
            max_ai_faction,
            difficulty = ?self.difficulty,
            "game started"
        );
        self.events.push(GameEvent::GameStarted {
            territories: self.map.len(),
            max_ai_faction,
        });
    }

    // ---- commands ----------------------------------------------------------

    fn check_playing(&self) -> Result<(), Rejection> {
        if self.map.is_empty() {
            return Err(Rejection::NoGame);
        }
        if self.game_over {
            return Err(Rejection::GameOver);
        }
        Ok(())
    }

    fn validate_attack(&self, source: TerritoryId, target: TerritoryId) -> Result<(), Rejection> {
        self.check_playing()?;
        if !self.turns.is_player_turn() {
            return Err(Rejection::WrongPhase(self.turns.phase()));
        }
        let from = self
            .map
            .get(source)
            .ok_or(Rejection::UnknownTerritory(source))?;
        if self.map.get(target).is_none() {
            return Err(Rejection::UnknownTerritory(target));
        }
        if from.owner != Faction::Player {
            return Err(Rejection::NotOwned(source));
        }
        if source == target {
            return Err(Rejection::SameTerritory);
        }
        if !self.map.are_adjacent(source, target) {
            return Err(Rejection::NotAdjacent(source, target));
        }
        if from.has_attacked {
            return Err(Rejection::AlreadyAttacked(source));
        }
        if from.total() <= 1 {
            return Err(Rejection::NothingToSend(source));
        }
        Ok(())
    }

    /// Send units from a player territory to an adjacent territory.
    ///
    /// Uses the current send percent and formation. Returns `true` if units
    /// were sent.
    pub fn attack(&mut self, source: TerritoryId, target: TerritoryId) -> bool {
        if let Err(reason) = self.validate_attack(source, target) {
            return reject("attack", reason);
        }
        let order = TransferOrder {
            source,
            target,
            owner: Faction::Player,
            amount: SendAmount::from_percent(self.send_percent),
            formation: self.formation,
        };
        if !self.transfer(&order) {
            return reject("attack", Rejection::NothingToSend(source));
        }
        true
    }

    fn transfer(&mut self, order: &TransferOrder) -> bool {
        let speed = self.config.logistics.convoy_speed;
        let Some(sent) = issue_transfer(&mut self.map, &mut self.convoys, order, speed, &mut self.rng)
        else {
            return false;
        };
        if let Some(territory) = self.map.get_mut(order.source) {
            territory.has_attacked = true;
        }
        debug!(
            source = order.source,
            target = order.target,
            owner = %order.owner,
            units = sent.total(),
            "transfer issued"
        );
        self.events.push(GameEvent::TransferIssued {
            source: order.source,
            target: order.target,
            owner: order.owner,
            units: sent.total(),
        });
        true
    }

    /// End the player's turn and hand over to the AI factions.
    pub fn end_turn(&mut self) -> bool {
        if let Err(reason) = self.check_playing() {
            return reject("end_turn", reason);
        }
        if !self.turns.end_player_turn() {
            return reject("end_turn", Rejection::WrongPhase(self.turns.phase()));
        }
        info!(turn = self.turns.turn(), "player ended turn");
        self.run_ai();
        true
    }

    /// Buy units for a player territory.
    pub fn buy_units(
        &mut self,
        territory: TerritoryId,
        unit: UnitType,
        giant: bool,
        count: u32,
    ) -> bool {
        if let Err(reason) = self.check_playing() {
            return reject("buy_units", reason);
        }
        let gold = self.ledger.gold();
        let cost = u64::from(self.ledger.prices().unit_cost(unit, giant)) * u64::from(count);
        let Some(target) = self.map.get_mut(territory) else {
            return reject("buy_units", Rejection::UnknownTerritory(territory));
        };
        if target.owner != Faction::Player {
            return reject("buy_units", Rejection::NotOwned(territory));
        }
        if !self.ledger.buy_units(target, unit, giant, count) {
            return reject(
                "buy_units",
                Rejection::InsufficientGold {
                    needed: cost,
                    available: gold,
                },
            );
        }
        true
    }

    /// Build a structure on a player territory.
    pub fn build_structure(&mut self, territory: TerritoryId, building: BuildingType) -> bool {
        if let Err(reason) = self.check_playing() {
            return reject("build_structure", reason);
        }
        if building == BuildingType::None {
            return reject("build_structure", Rejection::NoBuilding);
        }
        let gold = self.ledger.gold();
        let cost = u64::from(self.ledger.prices().building);
        let Some(target) = self.map.get_mut(territory) else {
            return reject("build_structure", Rejection::UnknownTerritory(territory));
        };
        if target.owner != Faction::Player {
            return reject("build_structure", Rejection::NotOwned(territory));
        }
        if !self.ledger.build_structure(target, building) {
            return reject(
                "build_structure",
                Rejection::InsufficientGold {
                    needed: cost,
                    available: gold,
                },
            );
        }
        true
    }

    /// Stop the fixed-step driver.
    pub fn pause(&mut self) {
        self.driver.pause();
    }

    /// Restart the fixed-step driver.
    pub fn resume(&mut self) {
        self.driver.resume();
    }

    /// Flip between normal and double speed.
    pub fn toggle_speed(&mut self) {
        self.speed = if self.speed > 1.0 { 1.0 } else { 2.0 };
    }

    /// Cycle the player send percent 25 → 50 → 75 → 100.
    pub fn toggle_send_percent(&mut self) {
        let next = SEND_PERCENT_STEPS
            .iter()
            .position(|&p| p == self.send_percent)
            .map_or(0, |idx| (idx + 1) % SEND_PERCENT_STEPS.len());
        self.send_percent = SEND_PERCENT_STEPS[next];
    }

    /// Cycle the player formation.
    pub fn toggle_formation(&mut self) {
        self.formation = self.formation.next();
    }

    /// Freeze or unfreeze battle ticking.
    pub fn set_battle_paused(&mut self, paused: bool) {
        self.battle_paused = paused;
    }

    /// Change the AI difficulty for the rest of the game.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    // ---- simulation ------------------------------------------------------

    /// Feed one frame of real time through the fixed-step driver.
    ///
    /// Returns the number of simulation steps run.
    pub fn frame(&mut self, frame_delta: f32) -> u32 {
        let steps = self.driver.advance(frame_delta);
        let step = self.driver.step();
        for _ in 0..steps {
            self.update(step);
        }
        steps
    }

    /// Advance the simulation by `dt` seconds of game time.
    ///
    /// Does nothing with no game loaded or after a terminal result.
    pub fn update(&mut self, dt: f32) {
        if self.map.is_empty() || self.game_over {
            return;
        }
        let dt = dt.max(0.0) * self.speed;
        self.elapsed += dt;

        self.ledger.accrue_income(&self.map, dt);

        for convoy in self.convoys.advance(dt) {
            self.land(convoy);
        }

        if !self.battle_paused {
            for id in 0..self.map.len() {
                let report = self.map.get_mut(id).and_then(|t| advance_battle(t, dt));
                if let Some(report) = report {
                    self.on_battle_resolved(report);
                }
            }
        }

        if self.turns.phase() == TurnPhase::NewTurnTransition {
            self.start_new_turn();
        } else {
            self.run_ai();
        }

        self.check_result();
    }

    fn land(&mut self, convoy: Convoy) {
        let Some(territory) = self.map.get_mut(convoy.target) else {
            return;
        };
        let defender = territory.owner;
        match apply_arrival(territory, convoy.owner, convoy.payload) {
            ArrivalOutcome::BattleStarted => {
                debug!(
                    territory = convoy.target,
                    attacker = %convoy.owner,
                    defender = %defender,
                    "battle started"
                );
                self.events.push(GameEvent::BattleStarted {
                    territory: convoy.target,
                    attacker: convoy.owner,
                    defender,
                });
            }
            ArrivalOutcome::Dropped => {
                debug!(
                    territory = convoy.target,
                    owner = %convoy.owner,
                    units = convoy.payload.total(),
                    "convoy dropped at contested territory"
                );
                self.events.push(GameEvent::ConvoyDropped {
                    territory: convoy.target,
                    owner: convoy.owner,
                    units: convoy.payload.total(),
                });
            }
            ArrivalOutcome::Reinforced
            | ArrivalOutcome::JoinedAttack
            | ArrivalOutcome::JoinedDefence => {}
        }
    }

    fn on_battle_resolved(&mut self, report: BattleReport) {
        info!(
            territory = report.territory,
            attacker = %report.attacker,
            defender = %report.defender,
            result = ?report.result,
            ticks = report.ticks,
            "battle resolved"
        );

        if report.result == BattleResult::AttackerWins {
            self.captures += 1;
            if report.attacker == Faction::Player {
                let income = roll_gold_income(&mut self.rng, self.config.economy.gold_income_range());
                if let Some(territory) = self.map.get_mut(report.territory) {
                    territory.gold_income = income;
                }
            }
            self.events.push(GameEvent::TerritoryCaptured {
                territory: report.territory,
                from: report.defender,
                to: report.attacker,
            });
        }
        self.events.push(GameEvent::BattleResolved(report));

        self.round.record([report.attacker, report.defender]);
        let active = self.map.active_factions();
        if self.round.is_complete(&active) {
            let growth = apply_growth_pulse(&mut self.map);
            self.round.clear();
            info!(
                territories = growth.territories,
                units = growth.units_added,
                giants = growth.giants_added,
                "growth pulse"
            );
            self.events.push(GameEvent::GrowthPulse(growth));
        }
    }

    fn start_new_turn(&mut self) {
        let Some(turn) = self.turns.complete_transition() else {
            return;
        };
        for territory in self.map.iter_mut() {
            territory.has_attacked = false;
        }
        let bonus = self.ledger.on_turn_end(&self.map);
        info!(turn, bonus, "turn started");
        self.events.push(GameEvent::TurnStarted { turn, bonus });
    }

    /// One AI decision per call. Stalls while anything is moving or fighting.
    fn run_ai(&mut self) {
        loop {
            let TurnPhase::AiTurn(id) = self.turns.phase() else {
                return;
            };
            if self.map.any_battle() || !self.convoys.is_empty() {
                return;
            }

            let anyone_can_act = self
                .turns
                .ai_factions()
                .any(|faction| has_eligible_source(&self.map, faction));
            if !anyone_can_act {
                debug!(turn = self.turns.turn(), "no AI faction can act");
                self.turns.finish_ai_turns();
                return;
            }

            let faction = Faction::Ai(id);
            let Some(source) = choose_source(&self.map, faction) else {
                self.turns.advance_faction();
                continue;
            };
            self.ai_act(faction, source);
            return;
        }
    }

    fn ai_act(&mut self, faction: Faction, source: TerritoryId) {
        let aggression = self.config.ai.aggression;
        let target = choose_target(&self.map, source, faction, aggression, &mut self.rng);

        let Some(target) = target else {
            debug!(%faction, source, "no target; territory stands down");
            if let Some(territory) = self.map.get_mut(source) {
                territory.has_attacked = true;
            }
            return;
        };

        let options = self.difficulty.send_percent_options();
        let percent = options[self.rng.gen_range(0..options.len())];
        let order = TransferOrder {
            source,
            target,
            owner: faction,
            amount: SendAmount::Percent(percent),
            formation: Formation::Balanced,
        };
        if !self.transfer(&order) {
            if let Some(territory) = self.map.get_mut(source) {
                territory.has_attacked = true;
            }
        }
    }

    fn check_result(&mut self) {
        if self.result.is_some() || self.game_over {
            return;
        }
        let owned = self.map.count_owned(Faction::Player);
        let outcome = if owned == self.map.len() {
            Outcome::Win
        } else if owned == 0 {
            Outcome::Lose
        } else {
            return;
        };
        info!(?outcome, turn = self.turns.turn(), "game over");
        self.result = Some(outcome);
        self.game_over = true;
        self.events.push(GameEvent::GameOver(outcome));
    }

    // ---- queries ---------------------------------------------------------

    /// Owned copy of the state for rendering.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            turn: self.turns.turn(),
            phase: self.turns.phase(),
            gold: self.ledger.gold(),
            elapsed: self.elapsed,
            speed: self.speed,
            send_percent: self.send_percent,
            formation: self.formation,
            paused: self.driver.is_paused(),
            battle_paused: self.battle_paused,
            territories: self.map.iter().map(Into::into).collect(),
            convoys: self.convoys.convoys().iter().map(Into::into).collect(),
            result: self.result,
        }
    }

    /// Take the events recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Latched terminal result.
    #[must_use]
    pub const fn result(&self) -> Option<Outcome> {
        self.result
    }

    /// Clear the latched result. The game stays over until restarted.
    pub fn clear_result(&mut self) {
        self.result = None;
    }

    /// True once a terminal result was reached.
    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Territory map.
    #[must_use]
    pub const fn map(&self) -> &TerritoryMap {
        &self.map
    }

    /// Convoys in flight.
    #[must_use]
    pub fn convoys(&self) -> &[Convoy] {
        self.convoys.convoys()
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Player treasury.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Player gold, floored.
    #[must_use]
    pub fn gold(&self) -> u32 {
        self.ledger.gold()
    }

    /// Turn number.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turns.turn()
    }

    /// Turn phase.
    #[must_use]
    pub const fn phase(&self) -> TurnPhase {
        self.turns.phase()
    }

    /// True while the player may act.
    #[must_use]
    pub const fn is_player_turn(&self) -> bool {
        self.turns.is_player_turn()
    }

    /// Highest AI faction id in play.
    #[must_use]
    pub const fn max_ai_faction(&self) -> FactionId {
        self.turns.max_ai_faction()
    }

    /// Territories the player owns.
    #[must_use]
    pub fn owned_count(&self) -> usize {
        self.map.count_owned(Faction::Player)
    }

    /// Territories on the map.
    #[must_use]
    pub fn territory_count(&self) -> usize {
        self.map.len()
    }

    /// Seconds of play.
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Seconds of play as `m:ss`.
    #[must_use]
    pub fn elapsed_label(&self) -> String {
        format_clock(self.elapsed)
    }

    /// Territories captured so far by any faction.
    #[must_use]
    pub const fn captures(&self) -> u32 {
        self.captures
    }

    /// AI difficulty.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Player send percent.
    #[must_use]
    pub const fn send_percent(&self) -> u32 {
        self.send_percent
    }

    /// Player formation.
    #[must_use]
    pub const fn formation(&self) -> Formation {
        self.formation
    }

    /// Speed multiplier.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// True while the driver is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.driver.is_paused()
    }

    /// True while battles are frozen.
    #[must_use]
    pub const fn is_battle_paused(&self) -> bool {
        self.battle_paused
    }

    /// Fixed simulation step.
    #[must_use]
    pub const fn step(&self) -> f32 {
        self.driver.step()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Garrison, Point, Squad, Territory};

    fn territory(id: usize, x: f32, owner: Faction, units: Squad) -> Territory {
        let mut t = Territory::new(id, format!("T{id}"), Point::new(x, 0.0), 30.0);
        t.owner = owner;
        t.garrison = Garrison::of(units);
        t
    }

    fn duel() -> GameEngine {
        let mut map = TerritoryMap::new(vec![
            territory(0, 0.0, Faction::Player, Squad::new(10, 20, 10)),
            territory(1, 200.0, Faction::Ai(2), Squad::new(1, 1, 1)),
            territory(2, 400.0, Faction::Ai(2), Squad::new(0, 1, 0)),
        ]);
        map.link(0, 1);
        map.link(1, 2);
        let mut engine = GameEngine::new(EngineConfig::default(), 5);
        engine.start_with_map(map, 2);
        engine
    }

    fn run_until(engine: &mut GameEngine, limit: u32, done: impl Fn(&GameEngine) -> bool) {
        let step = engine.step();
        for _ in 0..limit {
            if done(engine) {
                return;
            }
            engine.update(step);
        }
    }

    #[test]
    fn test_attack_validation() {
        let mut engine = duel();
        assert!(!engine.attack(0, 2), "not adjacent");
        assert!(!engine.attack(1, 0), "not owned");
        assert!(!engine.attack(0, 0), "self");
        assert!(!engine.attack(0, 9), "unknown");
        assert!(engine.attack(0, 1));
        assert!(!engine.attack(0, 1), "already attacked");
        assert_eq!(engine.map().get(0).unwrap().total(), 20);
    }

    #[test]
    fn test_attack_only_in_player_turn() {
        let mut map = TerritoryMap::new(vec![
            territory(0, 0.0, Faction::Player, Squad::new(10, 10, 10)),
            territory(1, 100.0, Faction::Ai(2), Squad::new(10, 10, 10)),
        ]);
        map.link(0, 1);
        let mut engine = GameEngine::new(EngineConfig::default(), 1);
        engine.start_with_map(map, 2);

        assert!(engine.end_turn());
        assert!(matches!(engine.phase(), TurnPhase::AiTurn(2)));
        assert!(!engine.attack(0, 1));
        assert!(!engine.end_turn());
    }

    #[test]
    fn test_player_capture_and_win() {
        let mut engine = duel();
        engine.toggle_send_percent(); // 75
        assert!(engine.attack(0, 1));
        run_until(&mut engine, 3000, |e| e.map().get(1).unwrap().owner == Faction::Player);
        assert_eq!(engine.map().get(1).unwrap().owner, Faction::Player);

        let events = engine.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::TerritoryCaptured {
                territory: 1,
                to: Faction::Player,
                ..
            }
        )));
        assert!(engine.map().get(1).unwrap().gold_income >= 1.0);
    }

    #[test]
    fn test_commands_rejected_without_game() {
        let mut engine = GameEngine::new(EngineConfig::default(), 0);
        assert!(!engine.end_turn());
        assert!(!engine.attack(0, 1));
        assert!(!engine.buy_units(0, UnitType::Sword, false, 1));
        engine.update(1.0);
        assert_eq!(engine.turn(), 1);
    }

    #[test]
    fn test_buy_and_build() {
        let mut engine = duel();
        assert_eq!(engine.gold(), 150);
        assert!(engine.buy_units(0, UnitType::Sword, false, 2));
        assert_eq!(engine.gold(), 70);
        assert!(!engine.buy_units(1, UnitType::Sword, false, 1));
        assert!(!engine.build_structure(0, BuildingType::Fortress));
        assert!(!engine.build_structure(0, BuildingType::None));
        assert_eq!(engine.map().get(0).unwrap().total(), 42);
    }

    #[test]
    fn test_toggles() {
        let mut engine = duel();
        assert_eq!(engine.send_percent(), 50);
        for expected in [75, 100, 25, 50] {
            engine.toggle_send_percent();
            assert_eq!(engine.send_percent(), expected);
        }

        engine.toggle_speed();
        assert!((engine.speed() - 2.0).abs() < f32::EPSILON);
        engine.toggle_speed();
        assert!((engine.speed() - 1.0).abs() < f32::EPSILON);

        engine.toggle_formation();
        assert_eq!(engine.formation(), Formation::ShieldWall);
    }

    #[test]
    fn test_pause_stops_frames() {
        let mut engine = duel();
        engine.pause();
        assert_eq!(engine.frame(0.05), 0);
        engine.resume();
        assert!(engine.frame(0.05) >= 2);
        assert!(engine.elapsed() > 0.0);
    }

    #[test]
    fn test_battle_pause_freezes_combat() {
        let mut engine = duel();
        engine.set_battle_paused(true);
        assert!(engine.attack(0, 1));
        run_until(&mut engine, 600, |e| e.convoys().is_empty());
        let before = engine.map().get(1).unwrap().battle.unwrap();
        for _ in 0..120 {
            engine.update(engine.step());
        }
        assert_eq!(engine.map().get(1).unwrap().battle.unwrap().ticks, before.ticks);
        engine.set_battle_paused(false);
        run_until(&mut engine, 600, |e| !e.map().any_battle());
        assert!(!engine.map().any_battle());
    }

    #[test]
    fn test_result_latch_and_clear() {
        let mut map = TerritoryMap::new(vec![
            territory(0, 0.0, Faction::Player, Squad::new(5, 5, 5)),
            territory(1, 100.0, Faction::Player, Squad::new(5, 5, 5)),
        ]);
        map.link(0, 1);
        let mut engine = GameEngine::new(EngineConfig::default(), 1);
        engine.start_with_map(map, 1);

        engine.update(engine.step());
        assert_eq!(engine.result(), Some(Outcome::Win));
        assert!(engine.is_game_over());

        engine.clear_result();
        engine.update(engine.step());
        assert_eq!(engine.result(), None);
        assert!(!engine.end_turn());

        engine.reset();
        assert!(!engine.is_game_over());
        assert_eq!(engine.territory_count(), 0);
    }

    #[test]
    fn test_campaign_and_skirmish_start() {
        let mut engine = GameEngine::new(EngineConfig::default(), 11);
        engine.start_campaign(0).unwrap();
        assert_eq!(engine.territory_count(), 4);
        assert_eq!(engine.difficulty(), Difficulty::Easy);
        assert_eq!(engine.owned_count(), 1);

        // 15 levels: index 16 is the second level again.
        engine.start_campaign(16).unwrap();
        let wrapped = engine.snapshot();
        engine.start_campaign(1).unwrap();
        assert_eq!(wrapped.territories.len(), engine.territory_count());
        assert_eq!(engine.difficulty(), Difficulty::Easy);

        engine.start_skirmish().unwrap();
        assert_eq!(engine.territory_count(), 24);
        assert_eq!(engine.max_ai_faction(), 4);
        assert_eq!(engine.elapsed_label(), "0:00");
    }
}

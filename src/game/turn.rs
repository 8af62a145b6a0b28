//! Turn sequencing and the round tracker behind growth pulses.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::{Faction, FactionId};

/// Id of the first AI faction.
pub const FIRST_AI_FACTION: FactionId = 2;

/// Phase of the turn state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// The player issues commands.
    PlayerTurn,
    /// The given AI faction acts.
    AiTurn(FactionId),
    /// Between turns; the next update starts a new turn.
    NewTurnTransition,
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayerTurn => write!(f, "player turn"),
            Self::AiTurn(id) => write!(f, "ai-{id} turn"),
            Self::NewTurnTransition => write!(f, "new turn"),
        }
    }
}

/// Explicit turn state machine.
///
/// The controller only knows about phases and the turn counter. Deciding
/// when a faction is done is left to the engine, which calls the transition
/// methods below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnController {
    turn: u32,
    phase: TurnPhase,
    max_ai_faction: FactionId,
}

impl TurnController {
    /// Start at turn 1 with the player to move.
    ///
    /// `max_ai_faction` is the highest AI id in play; a value below
    /// [`FIRST_AI_FACTION`] means no AI factions.
    #[must_use]
    pub const fn new(max_ai_faction: FactionId) -> Self {
        Self {
            turn: 1,
            phase: TurnPhase::PlayerTurn,
            max_ai_faction,
        }
    }

    /// Current turn number, starting at 1.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Highest AI faction id in play.
    #[must_use]
    pub const fn max_ai_faction(&self) -> FactionId {
        self.max_ai_faction
    }

    /// True while the player may act.
    #[must_use]
    pub const fn is_player_turn(&self) -> bool {
        matches!(self.phase, TurnPhase::PlayerTurn)
    }

    /// AI factions in play, in acting order.
    pub fn ai_factions(&self) -> impl Iterator<Item = Faction> {
        (FIRST_AI_FACTION..=self.max_ai_faction).map(Faction::Ai)
    }

    /// `PlayerTurn → AiTurn(2)`.
    ///
    /// Goes straight to [`TurnPhase::NewTurnTransition`] when there are no AI
    /// factions. Returns `false` outside the player's turn.
    pub fn end_player_turn(&mut self) -> bool {
        if !self.is_player_turn() {
            return false;
        }
        self.phase = if self.max_ai_faction >= FIRST_AI_FACTION {
            TurnPhase::AiTurn(FIRST_AI_FACTION)
        } else {
            TurnPhase::NewTurnTransition
        };
        true
    }

    /// Hand over from the current AI faction to the next one, or to the
    /// new-turn transition after the last.
    pub fn advance_faction(&mut self) {
        if let TurnPhase::AiTurn(id) = self.phase {
            self.phase = if id >= self.max_ai_faction {
                TurnPhase::NewTurnTransition
            } else {
                TurnPhase::AiTurn(id + 1)
            };
        }
    }

    /// Skip the remaining AI factions.
    pub fn finish_ai_turns(&mut self) {
        if matches!(self.phase, TurnPhase::AiTurn(_)) {
            self.phase = TurnPhase::NewTurnTransition;
        }
    }

    /// `NewTurnTransition → PlayerTurn`, incrementing the turn counter.
    ///
    /// Returns the new turn number, or `None` outside the transition.
    pub fn complete_transition(&mut self) -> Option<u32> {
        if self.phase != TurnPhase::NewTurnTransition {
            return None;
        }
        self.turn = self.turn.saturating_add(1);
        self.phase = TurnPhase::PlayerTurn;
        Some(self.turn)
    }
}

/// Factions that have taken part in a battle since the last growth pulse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundTracker {
    fought: BTreeSet<Faction>,
}

impl RoundTracker {
    /// Mark the sides of a resolved battle. Neutral is ignored.
    pub fn record(&mut self, factions: impl IntoIterator<Item = Faction>) {
        self.fought
            .extend(factions.into_iter().filter(|f| f.is_active()));
    }

    /// True once every faction in `active` has fought.
    #[must_use]
    pub fn is_complete(&self, active: &BTreeSet<Faction>) -> bool {
        !active.is_empty() && active.is_subset(&self.fought)
    }

    /// Factions marked so far.
    #[must_use]
    pub fn fought(&self) -> &BTreeSet<Faction> {
        &self.fought
    }

    /// Start a new round.
    pub fn clear(&mut self) {
        self.fought.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cycle() {
        let mut turns = TurnController::new(3);
        assert_eq!(turns.turn(), 1);
        assert!(turns.is_player_turn());

        assert!(turns.end_player_turn());
        assert_eq!(turns.phase(), TurnPhase::AiTurn(2));
        assert!(!turns.end_player_turn());

        turns.advance_faction();
        assert_eq!(turns.phase(), TurnPhase::AiTurn(3));
        turns.advance_faction();
        assert_eq!(turns.phase(), TurnPhase::NewTurnTransition);

        assert_eq!(turns.complete_transition(), Some(2));
        assert!(turns.is_player_turn());
        assert_eq!(turns.complete_transition(), None);
    }

    #[test]
    fn test_no_ai_factions_skips_to_transition() {
        let mut turns = TurnController::new(1);
        assert!(turns.end_player_turn());
        assert_eq!(turns.phase(), TurnPhase::NewTurnTransition);
        assert_eq!(turns.ai_factions().count(), 0);
    }

    #[test]
    fn test_finish_ai_turns() {
        let mut turns = TurnController::new(5);
        turns.finish_ai_turns();
        assert!(turns.is_player_turn());
        turns.end_player_turn();
        turns.finish_ai_turns();
        assert_eq!(turns.phase(), TurnPhase::NewTurnTransition);
    }

    #[test]
    fn test_round_tracker_ignores_neutral() {
        let active: BTreeSet<_> = [Faction::Player, Faction::Ai(2)].into_iter().collect();
        let mut round = RoundTracker::default();
        assert!(!round.is_complete(&active));

        round.record([Faction::Player, Faction::Neutral]);
        assert!(!round.is_complete(&active));
        assert!(!round.fought().contains(&Faction::Neutral));

        round.record([Faction::Ai(2)]);
        assert!(round.is_complete(&active));

        round.clear();
        assert!(!round.is_complete(&active));
    }
}

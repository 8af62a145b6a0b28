//! Target selection for AI factions.
//!
//! Score = `200 − distance − 2 × garrison`, plus an occasional flat bonus
//! against player-owned targets. Highest score wins; on a tie the first
//! neighbour in adjacency order is kept.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::{Faction, Territory, TerritoryId, TerritoryMap};

/// Score before distance and garrison penalties.
const BASE_SCORE: f32 = 200.0;

/// Penalty per defending unit.
const GARRISON_PENALTY: f32 = 2.0;

/// Random bias towards attacking the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Aggression {
    /// Flat score bonus.
    pub bonus: f32,
    /// Chance the bonus applies to a given player-owned candidate.
    pub probability: f64,
}

impl Default for Aggression {
    fn default() -> Self {
        Self {
            bonus: 50.0,
            probability: 0.2,
        }
    }
}

impl Aggression {
    /// No bias at all.
    pub const NONE: Self = Self {
        bonus: 0.0,
        probability: 0.0,
    };
}

/// Deterministic part of a candidate's score.
#[must_use]
pub fn base_score(source: &Territory, candidate: &Territory) -> f32 {
    BASE_SCORE
        - source.position.distance(candidate.position)
        - candidate.total() as f32 * GARRISON_PENALTY
}

/// Pick the best target for an attack launched from `source`.
///
/// Candidates are the neighbours of `source` not owned by `faction`.
/// Returns `None` if there is none.
pub fn choose_target(
    map: &TerritoryMap,
    source: TerritoryId,
    faction: Faction,
    aggression: Aggression,
    rng: &mut impl Rng,
) -> Option<TerritoryId> {
    let origin = map.get(source)?;
    let mut best: Option<(TerritoryId, f32)> = None;

    for &id in &origin.neighbors {
        let Some(candidate) = map.get(id) else {
            continue;
        };
        if candidate.owner == faction {
            continue;
        }

        let mut score = base_score(origin, candidate);
        if candidate.owner == Faction::Player
            && aggression.probability > 0.0
            && rng.gen_bool(aggression.probability.min(1.0))
        {
            score += aggression.bonus;
        }

        if best.is_none_or(|(_, top)| score > top) {
            best = Some((id, score));
        }
    }

    best.map(|(id, _)| id)
}

/// The territory a faction attacks from next.
///
/// Picks the eligible territory with the largest garrison, first in id order
/// on a tie.
#[must_use]
pub fn choose_source(map: &TerritoryMap, faction: Faction) -> Option<TerritoryId> {
    let mut best: Option<(TerritoryId, u32)> = None;
    for territory in map.owned_by(faction).filter(|t| t.can_attack()) {
        if best.is_none_or(|(_, top)| territory.total() > top) {
            best = Some((territory.id, territory.total()));
        }
    }
    best.map(|(id, _)| id)
}

/// True if `faction` has any territory that could still attack this turn.
#[must_use]
pub fn has_eligible_source(map: &TerritoryMap, faction: Faction) -> bool {
    map.owned_by(faction).any(Territory::can_attack)
}

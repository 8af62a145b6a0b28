//! Game invariants - sanity checks that detect bugs.
//!
//! A correctly implemented engine never triggers these. They are structural
//! checks over the map, convoys and turn state, not gameplay limits.

use std::collections::BTreeSet;

use crate::game::{
    FIRST_AI_FACTION, Faction, GameEngine, MAX_DEGREE, Outcome, TerritoryMap, TurnPhase,
};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

fn violation(violations: &mut Vec<InvariantViolation>, message: String) {
    violations.push(InvariantViolation { message });
}

/// Check the territory graph and per-territory state.
#[must_use]
pub fn check_map(map: &TerritoryMap) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for (idx, territory) in map.iter().enumerate() {
        if territory.id != idx {
            violation(
                &mut violations,
                format!("Territory at index {idx} carries id {}", territory.id),
            );
        }

        if territory.neighbors.len() > MAX_DEGREE {
            violation(
                &mut violations,
                format!(
                    "Territory {idx} has {} neighbours > cap {MAX_DEGREE}",
                    territory.neighbors.len()
                ),
            );
        }

        let unique: BTreeSet<_> = territory.neighbors.iter().copied().collect();
        if unique.len() != territory.neighbors.len() {
            violation(&mut violations, format!("Territory {idx} lists a neighbour twice"));
        }

        for &other in &territory.neighbors {
            if other == idx {
                violation(&mut violations, format!("Territory {idx} is its own neighbour"));
                continue;
            }
            match map.get(other) {
                None => violation(
                    &mut violations,
                    format!("Territory {idx} links to unknown territory {other}"),
                ),
                Some(back) if !back.neighbors.contains(&idx) => violation(
                    &mut violations,
                    format!("Link {idx} -> {other} is not symmetric"),
                ),
                Some(_) => {}
            }
        }

        if let Some(battle) = territory.battle {
            if battle.attacker == territory.owner {
                violation(
                    &mut violations,
                    format!("Territory {idx} is attacked by its own owner"),
                );
            }
            if !battle.attacker.is_active() {
                violation(
                    &mut violations,
                    format!("Territory {idx} is attacked by {}", battle.attacker),
                );
            }
        }
    }

    violations
}

/// Check all engine invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(engine: &GameEngine) -> Vec<InvariantViolation> {
    let map = engine.map();
    let mut violations = check_map(map);

    for convoy in engine.convoys() {
        if convoy.payload.is_empty() {
            violation(&mut violations, format!("Convoy {} is empty", convoy.id));
        }
        if map.get(convoy.origin).is_none() || map.get(convoy.target).is_none() {
            violation(
                &mut violations,
                format!(
                    "Convoy {} runs {} -> {} outside the map",
                    convoy.id, convoy.origin, convoy.target
                ),
            );
        }
        if convoy.elapsed > convoy.duration {
            violation(
                &mut violations,
                format!(
                    "Convoy {} overran its journey ({} > {})",
                    convoy.id, convoy.elapsed, convoy.duration
                ),
            );
        }
        if !convoy.owner.is_active() {
            violation(&mut violations, format!("Convoy {} has no owner", convoy.id));
        }
    }

    if let TurnPhase::AiTurn(id) = engine.phase() {
        if !(FIRST_AI_FACTION..=engine.max_ai_faction()).contains(&id) {
            violation(
                &mut violations,
                format!(
                    "AI turn for faction {id} outside {FIRST_AI_FACTION}..={}",
                    engine.max_ai_faction()
                ),
            );
        }
    }

    match engine.result() {
        Some(Outcome::Win) if map.count_owned(Faction::Player) != map.len() => violation(
            &mut violations,
            "Win declared while the player does not own every territory".to_string(),
        ),
        Some(Outcome::Lose) if map.count_owned(Faction::Player) != 0 => violation(
            &mut violations,
            "Loss declared while the player still owns territory".to_string(),
        ),
        _ => {}
    }

    violations
}

/// Assert all engine invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(engine: &GameEngine) {
    let violations = check_invariants(engine);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Game invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_engine: &GameEngine) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::game::{Battle, Point, Squad, Territory};

    fn pair() -> TerritoryMap {
        let mut map = TerritoryMap::new(vec![
            Territory::new(0, "A", Point::new(0.0, 0.0), 20.0),
            Territory::new(1, "B", Point::new(100.0, 0.0), 20.0),
        ]);
        map.link(0, 1);
        map
    }

    #[test]
    fn test_valid_map_passes() {
        assert!(check_map(&pair()).is_empty());
    }

    #[test]
    fn test_asymmetric_link_detected() {
        let mut map = pair();
        map.get_mut(1).unwrap().neighbors.clear();
        let violations = check_map(&map);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("not symmetric"));
    }

    #[test]
    fn test_self_and_duplicate_links_detected() {
        let mut map = pair();
        map.get_mut(0).unwrap().neighbors.push(0);
        map.get_mut(1).unwrap().neighbors.push(0);
        let violations = check_map(&map);
        assert!(violations.iter().any(|v| v.message.contains("own neighbour")));
        assert!(violations.iter().any(|v| v.message.contains("twice")));
    }

    #[test]
    fn test_degree_cap_detected() {
        let mut map = pair();
        map.get_mut(0).unwrap().neighbors = vec![1; MAX_DEGREE + 1];
        assert!(
            check_map(&map)
                .iter()
                .any(|v| v.message.contains("neighbours > cap"))
        );
    }

    #[test]
    fn test_self_attack_detected() {
        let mut map = pair();
        let territory = map.get_mut(1).unwrap();
        territory.owner = Faction::Ai(2);
        territory.battle = Some(Battle::new(Faction::Ai(2), Squad::new(1, 1, 1)));
        assert_eq!(check_map(&map).len(), 1);
    }

    #[test]
    fn test_fresh_games_pass() {
        let mut engine = GameEngine::new(EngineConfig::default(), 3);
        assert!(check_invariants(&engine).is_empty());
        engine.start_skirmish().unwrap();
        assert_invariants(&engine);
        for level in 0..crate::scenario::LEVEL_COUNT {
            engine.start_campaign(level).unwrap();
            assert_invariants(&engine);
        }
    }
}

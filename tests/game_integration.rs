//! Multi-turn integration tests for game mechanics.
//!
//! These tests drive the engine through its public commands and check the
//! documented scenarios plus whole games over many seeds.
//!
//! Run with: cargo test --release game_integration

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::io::Write;

use swarm::autoplay::{AutoplayConfig, play_turn, run_game};
use swarm::game::invariants::check_invariants;
use swarm::game::{
    ArrivalOutcome, Battle, BattleResult, Faction, GameEngine, GameEvent, Garrison, Outcome,
    Point, Squad, Territory, TerritoryMap, TurnPhase, apply_arrival, resolve_battle,
};
use swarm::EngineConfig;

fn territory(id: usize, x: f32, owner: Faction, units: Squad) -> Territory {
    let mut t = Territory::new(id, format!("T{id}"), Point::new(x, 100.0), 30.0);
    t.owner = owner;
    t.garrison = Garrison::of(units);
    t
}

fn engine_with(map: TerritoryMap, max_ai: u8) -> GameEngine {
    let mut engine = GameEngine::new(EngineConfig::default(), 42);
    engine.start_with_map(map, max_ai);
    engine
}

fn step_until(engine: &mut GameEngine, limit: u32, done: impl Fn(&GameEngine) -> bool) -> bool {
    let step = engine.step();
    for _ in 0..limit {
        if done(engine) {
            return true;
        }
        engine.update(step);
    }
    done(engine)
}

#[test]
fn test_end_turn_without_ai_reaches_next_turn() {
    let mut map = TerritoryMap::new(vec![
        territory(0, 0.0, Faction::Player, Squad::new(5, 5, 5)),
        territory(1, 200.0, Faction::Player, Squad::new(5, 5, 5)),
    ]);
    map.link(0, 1);
    let mut engine = engine_with(map, 3);

    assert!(engine.end_turn());
    assert_eq!(engine.phase(), TurnPhase::NewTurnTransition);
    assert_eq!(engine.turn(), 1);

    engine.update(engine.step());
    assert_eq!(engine.turn(), 2);
    assert!(engine.map().iter().all(|t| !t.has_attacked && t.battle.is_none()));

    let events = engine.drain_events();
    assert!(
        events
            .iter()
            .any(|e| matches!(e, GameEvent::TurnStarted { turn: 2, bonus: 20 }))
    );
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, GameEvent::BattleStarted { .. }))
    );
}

#[test]
fn test_balanced_half_transfer_from_mixed_source() {
    let mut map = TerritoryMap::new(vec![
        territory(0, 0.0, Faction::Player, Squad::new(40, 60, 20)),
        territory(1, 200.0, Faction::Ai(2), Squad::new(10, 10, 10)),
    ]);
    map.link(0, 1);
    let mut engine = engine_with(map, 2);

    assert!(engine.attack(0, 1));
    assert_eq!(engine.map().get(0).unwrap().garrison.units, Squad::new(19, 33, 8));

    let in_flight = engine
        .convoys()
        .iter()
        .fold(Squad::EMPTY, |mut acc, c| {
            acc.merge(c.payload);
            acc
        });
    assert_eq!(in_flight, Squad::new(21, 27, 12));
    assert_eq!(engine.convoys().len(), 15);

    // One order, one travel time
    let duration = engine.convoys()[0].duration;
    assert!(engine.convoys().iter().all(|c| (c.duration - duration).abs() < f32::EPSILON));
}

#[test]
fn test_shield_attack_beats_archer_garrison() {
    let mut field = territory(0, 0.0, Faction::Ai(2), Squad::new(0, 0, 100));
    field.battle = Some(Battle::new(Faction::Player, Squad::new(100, 0, 0)));

    let report = resolve_battle(&mut field).unwrap();
    assert_eq!(report.result, BattleResult::AttackerWins);
    assert_eq!(report.ticks, 9);
    assert_eq!(field.owner, Faction::Player);
    assert_eq!(field.garrison.units, Squad::new(38, 0, 0));
}

#[test]
fn test_third_party_arrival_is_dropped() {
    let mut field = territory(0, 0.0, Faction::Ai(2), Squad::new(10, 10, 10));
    field.battle = Some(Battle::new(Faction::Player, Squad::new(5, 5, 5)));

    let outcome = apply_arrival(&mut field, Faction::Ai(3), Squad::new(50, 0, 0));
    assert_eq!(outcome, ArrivalOutcome::Dropped);
    assert_eq!(field.total(), 30);
    assert_eq!(field.battle.unwrap().pool, Squad::new(5, 5, 5));
}

#[test]
fn test_growth_pulse_after_every_faction_fought() {
    let mut map = TerritoryMap::new(vec![
        territory(0, 0.0, Faction::Player, Squad::new(10, 30, 10)),
        territory(1, 200.0, Faction::Ai(2), Squad::new(1, 1, 1)),
        territory(2, 400.0, Faction::Ai(2), Squad::new(2, 2, 2)),
    ]);
    map.link(0, 1);
    map.link(1, 2);
    let mut engine = engine_with(map, 2);

    assert!(engine.attack(0, 1));
    assert!(step_until(&mut engine, 3000, |e| {
        e.map().get(1).unwrap().owner == Faction::Player && e.convoys().is_empty()
    }));

    let events = engine.drain_events();
    let resolved = events
        .iter()
        .position(|e| matches!(e, GameEvent::BattleResolved(_)))
        .unwrap();
    let pulse = events
        .iter()
        .position(|e| matches!(e, GameEvent::GrowthPulse(_)))
        .unwrap();
    assert!(pulse > resolved);
    // Territory 2 took no part in the battle but still grew
    assert!(engine.map().get(2).unwrap().total() > 6);
}

#[test]
fn test_ai_attacks_at_most_once_per_territory_per_turn() {
    for seed in 0..8 {
        let mut engine = GameEngine::new(EngineConfig::default(), seed);
        engine.start_skirmish().unwrap();

        let mut seen: HashSet<(u32, usize)> = HashSet::new();
        let mut played = 0;
        let step = engine.step();
        for _ in 0..60_000 {
            if engine.is_game_over() || engine.turn() > 12 {
                break;
            }
            if engine.is_player_turn() && played != engine.turn() {
                played = engine.turn();
                play_turn(&mut engine);
            }
            engine.update(step);
            let turn = engine.turn();
            for event in engine.drain_events() {
                if let GameEvent::TransferIssued { source, .. } = event {
                    assert!(
                        seen.insert((turn, source)),
                        "seed {seed}: territory {source} attacked twice in turn {turn}"
                    );
                }
            }
        }
    }
}

#[test]
fn test_invariants_hold_through_games() {
    for seed in 0..6 {
        let mut engine = GameEngine::new(EngineConfig::default(), seed);
        engine.start_skirmish().unwrap();
        let step = engine.step();
        let mut played = 0;
        for i in 0..20_000 {
            if engine.is_game_over() {
                break;
            }
            if engine.is_player_turn() && played != engine.turn() {
                played = engine.turn();
                play_turn(&mut engine);
            }
            engine.update(step);
            if i % 50 == 0 {
                let violations = check_invariants(&engine);
                assert!(violations.is_empty(), "seed {seed}: {violations:?}");
            }
        }
    }
}

#[test]
fn test_autoplay_many_seeds() {
    let config = AutoplayConfig {
        max_turns: 60,
        ..AutoplayConfig::default()
    };
    for seed in 0..10 {
        let result = run_game(seed, &EngineConfig::default(), &config).unwrap();
        match result.outcome {
            Some(Outcome::Win) => assert_eq!(result.player_territories(), 24),
            Some(Outcome::Lose) => assert_eq!(result.player_territories(), 0),
            None => assert!(result.turns_played > 60 || result.steps >= config.max_steps),
        }
    }
}

#[test]
fn test_campaign_levels_autoplay() {
    let config = AutoplayConfig {
        max_turns: 20,
        ..AutoplayConfig::default()
    };
    for level in 0..swarm::scenario::LEVEL_COUNT {
        let config = AutoplayConfig {
            level: Some(level),
            ..config
        };
        let result = run_game(7, &EngineConfig::default(), &config).unwrap();
        assert!(result.steps > 0, "level {level}");
    }
}

#[test]
fn test_same_seed_same_commands_same_state() {
    let run = || {
        let mut engine = GameEngine::new(EngineConfig::default(), 99);
        engine.start_skirmish().unwrap();
        let step = engine.step();
        let mut played = 0;
        for _ in 0..5_000 {
            if engine.is_player_turn() && played != engine.turn() {
                played = engine.turn();
                play_turn(&mut engine);
            }
            engine.update(step);
        }
        engine.snapshot()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_result_latched_until_cleared() {
    let mut map = TerritoryMap::new(vec![
        territory(0, 0.0, Faction::Player, Squad::new(30, 30, 30)),
        territory(1, 200.0, Faction::Ai(2), Squad::new(0, 1, 0)),
    ]);
    map.link(0, 1);
    let mut engine = engine_with(map, 2);

    assert!(engine.attack(0, 1));
    assert!(step_until(&mut engine, 3000, GameEngine::is_game_over));
    assert_eq!(engine.result(), Some(Outcome::Win));
    assert_eq!(engine.snapshot().result, Some(Outcome::Win));

    let turn = engine.turn();
    engine.clear_result();
    for _ in 0..100 {
        engine.update(engine.step());
    }
    assert_eq!(engine.result(), None);
    assert_eq!(engine.turn(), turn);
}

#[test]
fn test_config_file_drives_engine() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "map": {{ "territories": 12, "ai_factions": 2 }}, "economy": {{ "starting_gold": 500 }} }}"#
    )
    .unwrap();

    let config = EngineConfig::from_json_file(file.path()).unwrap();
    config.validate().unwrap();
    let mut engine = GameEngine::new(config, 1);
    engine.start_skirmish().unwrap();

    assert_eq!(engine.territory_count(), 12);
    assert_eq!(engine.max_ai_faction(), 3);
    assert_eq!(engine.gold(), 500);
}

//! Benchmarks for running complete games and their hot paths.
//!
//! The full autoplay loop is what the tournament command spends its time in.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use swarm::autoplay::{AutoplayConfig, run_game};
use swarm::config::MapConfig;
use swarm::game::{Battle, Faction, Garrison, Point, Squad, Territory, resolve_battle};
use swarm::scenario::generate_skirmish;
use swarm::{EngineConfig, SimRng};

fn bench_single_game(c: &mut Criterion) {
    let engine_config = EngineConfig::default();
    let config = AutoplayConfig {
        max_turns: 100,
        ..AutoplayConfig::default()
    };

    c.bench_function("single_game_skirmish", |b| {
        b.iter(|| {
            let result = run_game(black_box(42), black_box(&engine_config), black_box(&config));
            black_box(result)
        });
    });
}

fn bench_game_batch(c: &mut Criterion) {
    // Ten games back to back, without parallel overhead
    let engine_config = EngineConfig::default();
    let config = AutoplayConfig {
        max_turns: 50,
        ..AutoplayConfig::default()
    };

    c.bench_function("10_games_sequential", |b| {
        b.iter(|| {
            for seed in 0..10u64 {
                let result = run_game(black_box(seed), &engine_config, &config);
                black_box(result).ok();
            }
        });
    });
}

fn bench_battle(c: &mut Criterion) {
    let mut field = Territory::new(0, "Field", Point::new(0.0, 0.0), 30.0);
    field.owner = Faction::Ai(2);
    field.garrison = Garrison::of(Squad::new(350, 450, 200));

    c.bench_function("battle_1000_vs_1000", |b| {
        b.iter(|| {
            let mut territory = field.clone();
            territory.battle = Some(Battle::new(Faction::Player, Squad::new(200, 500, 300)));
            black_box(resolve_battle(black_box(&mut territory)))
        });
    });
}

fn bench_map_generation(c: &mut Criterion) {
    let config = MapConfig {
        territories: 60,
        ai_factions: 6,
        ..MapConfig::default()
    };

    c.bench_function("skirmish_map_60", |b| {
        let mut rng = SimRng::seed_from_u64(7);
        b.iter(|| black_box(generate_skirmish(black_box(&config), &mut rng).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_single_game,
    bench_game_batch,
    bench_battle,
    bench_map_generation
);
criterion_main!(benches);

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use swarm::game::invariants::check_invariants;
use swarm::game::{BuildingType, GameEngine, UnitType};
use swarm::EngineConfig;

/// One command from the presentation layer.
#[derive(Arbitrary, Debug)]
enum FuzzCommand {
    Attack { source: u8, target: u8 },
    EndTurn,
    Buy { territory: u8, unit: u8, giant: bool, count: u8 },
    Build { territory: u8, building: u8 },
    ToggleSpeed,
    ToggleSendPercent,
    ToggleFormation,
    BattlePause(bool),
    Pause,
    Resume,
    Frame(u8),
    Steps(u8),
}

/// Structured input for command fuzzing.
#[derive(Arbitrary, Debug)]
struct CommandInput {
    /// Engine seed.
    seed: u64,
    /// Campaign level, or a skirmish map when out of range.
    level: u8,
    /// Command stream.
    commands: Vec<FuzzCommand>,
}

fn unit(selector: u8) -> UnitType {
    UnitType::ALL[usize::from(selector) % UnitType::ALL.len()]
}

fn building(selector: u8) -> BuildingType {
    match selector % 5 {
        0 => BuildingType::None,
        1 => BuildingType::Cannon,
        2 => BuildingType::Barracks,
        3 => BuildingType::Fortress,
        _ => BuildingType::Training,
    }
}

fuzz_target!(|input: CommandInput| {
    let mut engine = GameEngine::new(EngineConfig::default(), input.seed);
    let started = if usize::from(input.level) < swarm::scenario::LEVEL_COUNT {
        engine.start_campaign(usize::from(input.level))
    } else {
        engine.start_skirmish()
    };
    if started.is_err() {
        return;
    }

    for command in input.commands.into_iter().take(200) {
        let ids = engine.territory_count().max(1);
        match command {
            FuzzCommand::Attack { source, target } => {
                engine.attack(usize::from(source) % ids, usize::from(target) % ids);
            }
            FuzzCommand::EndTurn => {
                engine.end_turn();
            }
            FuzzCommand::Buy {
                territory,
                unit: selector,
                giant,
                count,
            } => {
                engine.buy_units(usize::from(territory) % ids, unit(selector), giant, u32::from(count));
            }
            FuzzCommand::Build {
                territory,
                building: selector,
            } => {
                engine.build_structure(usize::from(territory) % ids, building(selector));
            }
            FuzzCommand::ToggleSpeed => engine.toggle_speed(),
            FuzzCommand::ToggleSendPercent => engine.toggle_send_percent(),
            FuzzCommand::ToggleFormation => engine.toggle_formation(),
            FuzzCommand::BattlePause(paused) => engine.set_battle_paused(paused),
            FuzzCommand::Pause => engine.pause(),
            FuzzCommand::Resume => engine.resume(),
            FuzzCommand::Frame(ms) => {
                engine.frame(f32::from(ms) / 1000.0);
            }
            FuzzCommand::Steps(n) => {
                for _ in 0..n {
                    engine.update(engine.step());
                }
            }
        }

        let violations = check_invariants(&engine);
        assert!(violations.is_empty(), "Invariants violated: {violations:?}");
        engine.drain_events();
    }
});

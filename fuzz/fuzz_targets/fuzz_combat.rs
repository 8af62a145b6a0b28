#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use swarm::game::{
    Battle, BattleResult, BuildingType, Faction, Garrison, Point, Squad, Territory,
    advance_battle,
};

/// Structured input for combat fuzzing.
#[derive(Arbitrary, Debug)]
struct CombatInput {
    /// Defending units (shield, sword, archer).
    defenders: [u16; 3],
    /// Defending giants.
    giants: [u8; 3],
    /// Attacking units.
    attackers: [u16; 3],
    /// Reinforcements merged into the attack part way through.
    reinforcements: [u16; 3],
    /// Building selector.
    building: u8,
    /// Frame deltas in milliseconds fed to the battle.
    frames: Vec<u8>,
}

fn squad(counts: [u16; 3]) -> Squad {
    Squad::new(
        u32::from(counts[0]),
        u32::from(counts[1]),
        u32::from(counts[2]),
    )
}

fuzz_target!(|input: CombatInput| {
    let attackers = squad(input.attackers);
    if attackers.is_empty() {
        return; // Arrivals always carry units
    }

    let building = match input.building % 5 {
        0 => BuildingType::None,
        1 => BuildingType::Cannon,
        2 => BuildingType::Barracks,
        3 => BuildingType::Fortress,
        _ => BuildingType::Training,
    };

    let mut territory = Territory::new(0, "Fuzz", Point::new(0.0, 0.0), 20.0);
    territory.owner = Faction::Ai(2);
    territory.garrison = Garrison {
        units: squad(input.defenders),
        giants: Squad::new(
            u32::from(input.giants[0]),
            u32::from(input.giants[1]),
            u32::from(input.giants[2]),
        ),
    };
    territory.building = building;
    territory.effect = building.effect();
    territory.battle = Some(Battle::new(Faction::Player, attackers));

    let before = territory.total() + attackers.total() + squad(input.reinforcements).total();
    let mut report = None;

    for (i, ms) in input.frames.iter().take(256).enumerate() {
        if i == 8 {
            if let Some(battle) = territory.battle.as_mut() {
                battle.pool.merge(squad(input.reinforcements));
            }
        }
        report = advance_battle(&mut territory, f32::from(*ms) / 1000.0);
        if report.is_some() {
            break;
        }
    }

    // Finish whatever is left in whole ticks
    while report.is_none() && territory.battle.is_some() {
        report = advance_battle(&mut territory, 0.35);
    }

    let report = report.expect("battle must resolve");
    assert!(territory.battle.is_none());
    assert!(territory.total() <= before);
    match report.result {
        BattleResult::AttackerWins => {
            assert_eq!(territory.owner, Faction::Player);
            assert_eq!(territory.garrison.giants.total(), 0);
        }
        BattleResult::DefenderHolds => {
            assert_eq!(territory.owner, Faction::Ai(2));
            assert!(territory.total() > 0);
        }
    }
});

//! Per-tick battle resolution.
//!
//! Battles advance in fixed 0.35 s ticks. Each tick both sides compute their
//! damage from the counts they had at the start of the tick, then each damage
//! stream is applied to the opposing side in a priority order that depends on
//! the unit type dealing it. All arithmetic is integer so the outcome of a
//! battle depends only on the counts and the frame deltas fed in.
//!
//! Type triangle, as damage multipliers:
//!
//! | dealer \ target | shield | sword | archer |
//! |-----------------|--------|-------|--------|
//! | shield          | 1.0    | 1.0   | 1.4    |
//! | sword           | 1.4    | 1.0   | 1.0    |
//! | archer          | 0.65   | 1.4   | 1.0    |

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::game::{
    BuildingType, Faction, Garrison, SpecialEffect, Squad, Territory, TerritoryId, UnitType,
};

/// Length of one combat tick in seconds.
pub const TICK_SECONDS: f32 = 0.35;

const TICK_MS: u64 = 350;

/// Archer damage ramps up linearly over this long.
const APPROACH_MS: u64 = 1350;

/// Shields start dealing damage at this battle time.
const SHIELDS_ENGAGE_MS: u64 = 850;

/// Swords start dealing damage at this battle time.
const MELEE_ENGAGE_MS: u64 = 1100;

/// Damage per unit per second, in thousandths.
const ARCHER_DPS_MILLI: u64 = 600;
const SWORD_DPS_MILLI: u64 = 1000;
const SHIELD_DPS_MILLI: u64 = 500;

/// Multipliers are expressed in basis points.
const BASIS: u64 = 10_000;
const ADVANTAGE_BP: u64 = 14_000;
const ARCHER_VS_SHIELD_BP: u64 = 6_500;

/// Damage taken by defenders of a fortified territory.
const FORTRESS_DAMAGE_TAKEN_BP: u64 = 7_500;

/// Flat damage a cannon adds to the defence each tick once shields engage.
const CANNON_DAMAGE: u32 = 2;

/// A giant fights and absorbs damage as this many units.
pub const GIANT_WEIGHT: u32 = 2;

/// Share of the surviving attackers that garrison a captured territory.
pub const CAPTURE_PERCENT: u32 = 70;

/// Order in which damage streams are applied within a tick.
const FIRE_ORDER: [UnitType; 3] = [UnitType::Archer, UnitType::Sword, UnitType::Shield];

/// How a battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleResult {
    /// The defenders were wiped out; the attacker takes the territory. This
    /// includes ticks that also wipe out the attackers, which capture an empty
    /// territory.
    AttackerWins,
    /// The attackers were wiped out.
    DefenderHolds,
}

/// Summary of a finished battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    /// Contested territory.
    pub territory: TerritoryId,
    /// Attacking faction.
    pub attacker: Faction,
    /// Owner when the battle ended, before any capture.
    pub defender: Faction,
    /// Outcome.
    pub result: BattleResult,
    /// Ticks fought.
    pub ticks: u32,
    /// Units left on the territory afterwards.
    pub garrison: u32,
}

impl BattleReport {
    /// Faction holding the territory afterwards.
    #[must_use]
    pub const fn winner(&self) -> Faction {
        match self.result {
            BattleResult::AttackerWins => self.attacker,
            BattleResult::DefenderHolds => self.defender,
        }
    }
}

/// Damage multiplier in basis points for `dealer` hitting `target`.
#[must_use]
pub const fn multiplier_bp(dealer: UnitType, target: UnitType) -> u64 {
    match (dealer, target) {
        (UnitType::Shield, UnitType::Archer)
        | (UnitType::Sword, UnitType::Shield)
        | (UnitType::Archer, UnitType::Sword) => ADVANTAGE_BP,
        (UnitType::Archer, UnitType::Shield) => ARCHER_VS_SHIELD_BP,
        _ => BASIS,
    }
}

/// Target types in the order a damage stream hits them.
#[must_use]
pub const fn priority(dealer: UnitType) -> [UnitType; 3] {
    match dealer {
        UnitType::Archer => [UnitType::Sword, UnitType::Archer, UnitType::Shield],
        UnitType::Sword => [UnitType::Shield, UnitType::Sword, UnitType::Archer],
        UnitType::Shield => [UnitType::Sword, UnitType::Shield, UnitType::Archer],
    }
}

/// Raw damage `count` units of one type deal in the tick ending at `elapsed_ms`.
///
/// An engaged type with at least one unit always deals at least 1, so small
/// battles cannot floor to zero damage and stall the turn forever.
#[must_use]
pub fn raw_damage(unit: UnitType, count: u32, elapsed_ms: u64) -> u32 {
    if count == 0 {
        return 0;
    }
    let count = u64::from(count);
    let micro = match unit {
        UnitType::Archer => {
            let ramp = elapsed_ms.min(APPROACH_MS);
            count * ARCHER_DPS_MILLI * TICK_MS * ramp / APPROACH_MS
        }
        UnitType::Sword if elapsed_ms >= MELEE_ENGAGE_MS => count * SWORD_DPS_MILLI * TICK_MS,
        UnitType::Shield if elapsed_ms >= SHIELDS_ENGAGE_MS => count * SHIELD_DPS_MILLI * TICK_MS,
        UnitType::Sword | UnitType::Shield => return 0,
    };
    if micro == 0 {
        return 0;
    }
    u32::try_from(micro / 1_000_000).unwrap_or(u32::MAX).max(1)
}

/// Damage output of one side for a tick, per dealing type.
fn side_output(side: &Garrison, elapsed_ms: u64) -> Squad {
    let mut output = Squad::EMPTY;
    for unit in UnitType::ALL {
        let weight = side
            .units
            .get(unit)
            .saturating_add(side.giants.get(unit).saturating_mul(GIANT_WEIGHT));
        output.add(unit, raw_damage(unit, weight, elapsed_ms));
    }
    output
}

/// Apply one damage stream to `target`.
///
/// Raw damage left over after wiping out a type carries to the next type in
/// priority order. `taken_bp` scales all damage the target receives.
pub fn apply_damage(target: &mut Garrison, dealer: UnitType, raw: u32, taken_bp: u64) {
    let mut raw = u64::from(raw);

    for unit in priority(dealer) {
        if raw == 0 {
            break;
        }
        if target.units.get(unit) == 0 && target.giants.get(unit) == 0 {
            continue;
        }

        let bp = (multiplier_bp(dealer, unit) * taken_bp / BASIS).max(1);
        // A non-zero hit kills at least one unit; flooring to zero would stall.
        let effective = u32::try_from(raw * bp / BASIS).unwrap_or(u32::MAX).max(1);

        let killed = target.units.take(unit, effective);
        let leftover = effective - killed;
        let giants_killed = target.giants.take(unit, leftover.div_ceil(GIANT_WEIGHT));
        let absorbed = killed + giants_killed * GIANT_WEIGHT;

        if absorbed >= effective {
            break;
        }
        let used = (u64::from(absorbed) * BASIS).div_ceil(bp);
        raw -= used.min(raw);
    }
}

// The defender is checked first: a tick that empties both sides is a capture.
fn resolution(territory: &Territory) -> Option<BattleResult> {
    let battle = territory.battle.as_ref()?;
    if territory.garrison.is_empty() {
        Some(BattleResult::AttackerWins)
    } else if battle.pool.is_empty() {
        Some(BattleResult::DefenderHolds)
    } else {
        None
    }
}

fn run_tick(territory: &mut Territory) {
    let Some(mut battle) = territory.battle else {
        return;
    };
    battle.ticks += 1;
    let elapsed_ms = u64::from(battle.ticks) * TICK_MS;

    let mut attackers = Garrison::of(battle.pool);
    let attack = side_output(&attackers, elapsed_ms);
    let mut defence = side_output(&territory.garrison, elapsed_ms);
    if territory.building == BuildingType::Cannon && elapsed_ms >= SHIELDS_ENGAGE_MS {
        defence.add(UnitType::Shield, CANNON_DAMAGE);
    }
    let defender_taken = if territory.effect == SpecialEffect::DefenseBoost {
        FORTRESS_DAMAGE_TAKEN_BP
    } else {
        BASIS
    };

    for unit in FIRE_ORDER {
        apply_damage(&mut territory.garrison, unit, attack.get(unit), defender_taken);
    }
    for unit in FIRE_ORDER {
        apply_damage(&mut attackers, unit, defence.get(unit), BASIS);
    }
    battle.pool = attackers.units;

    trace!(
        territory = territory.id,
        tick = battle.ticks,
        attack = attack.total(),
        defence = defence.total(),
        attackers_left = battle.pool.total(),
        defenders_left = territory.garrison.total(),
        "combat tick"
    );
    territory.battle = Some(battle);
}

fn finish(territory: &mut Territory, result: BattleResult) -> Option<BattleReport> {
    let battle = territory.battle.take()?;
    let defender = territory.owner;

    if result == BattleResult::AttackerWins {
        territory.owner = battle.attacker;
        territory.garrison = Garrison::of(battle.pool.scaled_percent(CAPTURE_PERCENT));
    }

    Some(BattleReport {
        territory: territory.id,
        attacker: battle.attacker,
        defender,
        result,
        ticks: battle.ticks,
        garrison: territory.total(),
    })
}

/// Feed `dt` seconds into a territory's battle.
///
/// Runs as many whole ticks as the accumulated time allows and returns a
/// report once one side is eliminated. A side that is already empty ends the
/// battle without another tick being fought. Returns `None` if there is no
/// battle or it is still going.
pub fn advance_battle(territory: &mut Territory, dt: f32) -> Option<BattleReport> {
    territory.battle.as_mut()?.tick_buffer += dt;

    loop {
        if let Some(result) = resolution(territory) {
            return finish(territory, result);
        }
        let battle = territory.battle.as_mut()?;
        if battle.tick_buffer < TICK_SECONDS {
            return None;
        }
        battle.tick_buffer -= TICK_SECONDS;
        run_tick(territory);
    }
}

/// Run a battle to completion in whole ticks.
///
/// Used by tools and tests that do not care about frame timing.
pub fn resolve_battle(territory: &mut Territory) -> Option<BattleReport> {
    territory.battle?;
    loop {
        if let Some(report) = advance_battle(territory, TICK_SECONDS) {
            return Some(report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Battle, Point};

    fn contested(defence: Squad, attack: Squad) -> Territory {
        let mut territory = Territory::new(0, "Keep", Point::default(), 40.0);
        territory.owner = Faction::Ai(2);
        territory.garrison = Garrison::of(defence);
        territory.battle = Some(Battle::new(Faction::Player, attack));
        territory
    }

    #[test]
    fn test_raw_damage_engagement_windows() {
        assert_eq!(raw_damage(UnitType::Sword, 100, 1050), 0);
        assert_eq!(raw_damage(UnitType::Sword, 100, 1400), 35);
        assert_eq!(raw_damage(UnitType::Shield, 100, 700), 0);
        assert_eq!(raw_damage(UnitType::Shield, 100, 1050), 17);
        // Archers ramp in: 100 × 0.6 × 0.35 × (350 / 1350).
        assert_eq!(raw_damage(UnitType::Archer, 100, 350), 5);
        assert_eq!(raw_damage(UnitType::Archer, 100, 2000), 21);
        assert_eq!(raw_damage(UnitType::Archer, 1, 350), 1);
        assert_eq!(raw_damage(UnitType::Sword, 0, 2000), 0);
    }

    #[test]
    fn test_apply_damage_follows_priority() {
        let mut target = Garrison::of(Squad::new(10, 2, 10));
        // Archer damage hits swords first at 1.4×: 10 raw → 14 effective.
        // Two swords absorb 2 (≈2 raw), the rest hits archers at 1.0×.
        apply_damage(&mut target, UnitType::Archer, 10, BASIS);
        assert_eq!(target.units.sword, 0);
        assert_eq!(target.units.archer, 2);
        assert_eq!(target.units.shield, 10);
    }

    #[test]
    fn test_apply_damage_minimum_one_kill() {
        let mut target = Garrison::of(Squad::new(5, 0, 0));
        apply_damage(&mut target, UnitType::Archer, 1, BASIS);
        assert_eq!(target.units.shield, 4);
    }

    #[test]
    fn test_giants_absorb_double() {
        let mut target = Garrison {
            units: Squad::new(0, 1, 0),
            giants: Squad::new(0, 3, 0),
        };
        apply_damage(&mut target, UnitType::Shield, 5, BASIS);
        assert_eq!(target.units.sword, 0);
        assert_eq!(target.giants.sword, 1);
    }

    #[test]
    fn test_shields_beat_archers() {
        let mut territory = contested(Squad::new(0, 0, 100), Squad::new(100, 0, 0));
        let report = resolve_battle(&mut territory).unwrap();

        assert_eq!(report.result, BattleResult::AttackerWins);
        assert_eq!(report.ticks, 9);
        assert_eq!(territory.owner, Faction::Player);
        // 54 shields survive; 70% stay as the new garrison.
        assert_eq!(territory.garrison.units, Squad::new(38, 0, 0));
        assert!(territory.battle.is_none());
    }

    #[test]
    fn test_triangle_matchups() {
        let mut swords = contested(Squad::new(100, 0, 0), Squad::new(0, 100, 0));
        assert_eq!(
            resolve_battle(&mut swords).unwrap().result,
            BattleResult::AttackerWins
        );

        let mut archers = contested(Squad::new(0, 100, 0), Squad::new(0, 0, 100));
        assert_eq!(
            resolve_battle(&mut archers).unwrap().result,
            BattleResult::AttackerWins
        );
    }

    #[test]
    fn test_small_attack_fails() {
        let mut territory = contested(Squad::new(35, 45, 20), Squad::new(10, 10, 10));
        let report = resolve_battle(&mut territory).unwrap();

        assert_eq!(report.result, BattleResult::DefenderHolds);
        assert_eq!(report.winner(), Faction::Ai(2));
        assert_eq!(territory.owner, Faction::Ai(2));
        assert_eq!(territory.garrison.units, Squad::new(35, 38, 20));
    }

    #[test]
    fn test_mirror_match_goes_to_attacker() {
        let mut territory = contested(Squad::new(100, 0, 0), Squad::new(100, 0, 0));
        let report = resolve_battle(&mut territory).unwrap();

        // Both sides die on the same tick; the defender is checked first.
        assert_eq!(report.result, BattleResult::AttackerWins);
        assert_eq!(report.winner(), Faction::Player);
        assert_eq!(report.garrison, 0);
        assert_eq!(territory.owner, Faction::Player);
        assert!(territory.garrison.is_empty());
        assert!(territory.battle.is_none());
    }

    #[test]
    fn test_empty_defender_falls_without_a_tick() {
        let mut territory = contested(Squad::EMPTY, Squad::new(0, 4, 0));
        let report = advance_battle(&mut territory, 0.0).unwrap();

        assert_eq!(report.ticks, 0);
        assert_eq!(territory.owner, Faction::Player);
        assert_eq!(territory.garrison.units.sword, 3);
    }

    #[test]
    fn test_partial_frames_accumulate() {
        let mut territory = contested(Squad::new(0, 0, 50), Squad::new(50, 0, 0));
        assert!(advance_battle(&mut territory, 0.2).is_none());
        assert_eq!(territory.battle.unwrap().ticks, 0);
        assert!(advance_battle(&mut territory, 0.2).is_none());
        assert_eq!(territory.battle.unwrap().ticks, 1);
    }

    #[test]
    fn test_fortress_slows_losses() {
        let mut fort = contested(Squad::new(0, 0, 100), Squad::new(100, 0, 0));
        fort.building = BuildingType::Fortress;
        fort.effect = SpecialEffect::DefenseBoost;

        let report = resolve_battle(&mut fort).unwrap();
        assert_eq!(report.result, BattleResult::AttackerWins);
        assert_eq!(report.ticks, 13);
        assert_eq!(report.garrison, 24);
    }

    #[test]
    fn test_cannon_adds_defence() {
        let mut territory = contested(Squad::new(0, 0, 100), Squad::new(100, 0, 0));
        territory.building = BuildingType::Cannon;

        let report = resolve_battle(&mut territory).unwrap();
        assert_eq!(report.ticks, 10);
        // 36 shields survive.
        assert_eq!(report.garrison, 25);
    }
}

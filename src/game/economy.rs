//! Economy ledger: player gold, unit purchases and buildings.
//!
//! Only the player has a treasury. Gold flows in two ways:
//!
//! - Continuous accrual: every player-owned territory adds its
//!   `gold_income × dt` on every simulation step.
//! - Turn-end bonus: at each new turn the player receives
//!   `2 × base_income` per owned territory, on top of the accrual.
//!
//! Purchases and buildings validate ownership and funds and are no-ops
//! when either check fails.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::{BuildingType, Faction, Squad, Territory, TerritoryMap, UnitType};

/// Base income used when none is configured.
pub const DEFAULT_BASE_INCOME: u32 = 5;

/// Barracks growth multiplier.
const BARRACKS_GROWTH_FACTOR: f32 = 1.5;

/// Prices for units and buildings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceList {
    /// Cost of one regular unit by type.
    pub units: Squad,
    /// Cost of one giant by type.
    pub giants: Squad,
    /// Cost of any building.
    pub building: u32,
}

impl Default for PriceList {
    fn default() -> Self {
        Self {
            units: Squad::new(50, 40, 45),
            giants: Squad::new(200, 180, 190),
            building: 300,
        }
    }
}

impl PriceList {
    /// Cost of a single unit.
    #[must_use]
    pub const fn unit_cost(&self, unit: UnitType, giant: bool) -> u32 {
        if giant {
            self.giants.get(unit)
        } else {
            self.units.get(unit)
        }
    }
}

/// The player's treasury.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    /// Gold, fractional because income accrues per step.
    gold: f64,
    /// Per-territory base income for the turn-end bonus.
    base_income: Option<u32>,
    /// Prices.
    prices: PriceList,
}

impl Ledger {
    /// Create a ledger with starting gold.
    #[must_use]
    pub fn new(starting_gold: u32, base_income: Option<u32>, prices: PriceList) -> Self {
        Self {
            gold: f64::from(starting_gold),
            base_income,
            prices,
        }
    }

    /// Whole gold available to spend.
    #[must_use]
    pub fn gold(&self) -> u32 {
        self.gold.floor().clamp(0.0, f64::from(u32::MAX)) as u32
    }

    /// Prices in effect.
    #[must_use]
    pub const fn prices(&self) -> &PriceList {
        &self.prices
    }

    /// Base income used for the turn-end bonus.
    #[must_use]
    pub fn base_income(&self) -> u32 {
        self.base_income.unwrap_or(DEFAULT_BASE_INCOME)
    }

    /// Add `gold_income × dt` for every player-owned territory.
    pub fn accrue_income(&mut self, map: &TerritoryMap, dt: f32) {
        let income: f64 = map
            .owned_by(Faction::Player)
            .map(|t| f64::from(t.gold_income) * f64::from(dt))
            .sum();
        self.gold = (self.gold + income).max(0.0);
    }

    /// Grant the turn-end bonus. Returns the amount granted.
    pub fn on_turn_end(&mut self, map: &TerritoryMap) -> u32 {
        let owned = u32::try_from(map.count_owned(Faction::Player)).unwrap_or(u32::MAX);
        let bonus = owned.saturating_mul(2).saturating_mul(self.base_income());
        self.gold += f64::from(bonus);
        bonus
    }

    /// Buy units for a player territory.
    ///
    /// Returns `false` with no state change when the territory is not the
    /// player's, `count` is zero, or gold is insufficient.
    pub fn buy_units(
        &mut self,
        territory: &mut Territory,
        unit: UnitType,
        giant: bool,
        count: u32,
    ) -> bool {
        if territory.owner != Faction::Player || count == 0 {
            return false;
        }
        let cost = u64::from(self.prices.unit_cost(unit, giant)) * u64::from(count);
        if u64::from(self.gold()) < cost {
            return false;
        }
        self.gold -= cost as f64;
        let tier = if giant {
            &mut territory.garrison.giants
        } else {
            &mut territory.garrison.units
        };
        tier.add(unit, count);
        true
    }

    /// Build a structure on a player territory and apply its one-time modifier.
    ///
    /// Returns `false` with no state change when the territory is not the
    /// player's, `building` is [`BuildingType::None`], or gold is insufficient.
    pub fn build_structure(&mut self, territory: &mut Territory, building: BuildingType) -> bool {
        if territory.owner != Faction::Player || building == BuildingType::None {
            return false;
        }
        let cost = self.prices.building;
        if self.gold() < cost {
            return false;
        }
        self.gold -= f64::from(cost);
        territory.building = building;
        territory.effect = building.effect();
        if building == BuildingType::Barracks {
            territory.growth_rate *= BARRACKS_GROWTH_FACTOR;
        }
        true
    }
}

/// Roll a fresh gold income for a territory the player just acquired.
pub fn roll_gold_income(rng: &mut impl Rng, range: (f32, f32)) -> f32 {
    let (lo, hi) = range;
    if hi > lo { rng.gen_range(lo..hi) } else { lo }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Point, SpecialEffect};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn player_territory(id: usize, income: f32) -> Territory {
        let mut t = Territory::new(id, format!("T{id}"), Point::default(), 30.0);
        t.owner = Faction::Player;
        t.gold_income = income;
        t
    }

    #[test]
    fn test_accrue_income_player_only() {
        let mut enemy = player_territory(1, 10.0);
        enemy.owner = Faction::Ai(2);
        let map = TerritoryMap::new(vec![player_territory(0, 2.0), enemy]);

        let mut ledger = Ledger::new(0, None, PriceList::default());
        ledger.accrue_income(&map, 1.5);
        assert_eq!(ledger.gold(), 3);
    }

    #[test]
    fn test_turn_end_bonus_defaults_base_income() {
        let map = TerritoryMap::new(vec![player_territory(0, 0.0), player_territory(1, 0.0)]);
        let mut ledger = Ledger::new(0, None, PriceList::default());
        assert_eq!(ledger.on_turn_end(&map), 20);
        assert_eq!(ledger.gold(), 20);

        let mut custom = Ledger::new(0, Some(7), PriceList::default());
        assert_eq!(custom.on_turn_end(&map), 28);
    }

    #[test]
    fn test_buy_units_deducts_and_adds() {
        let mut territory = player_territory(0, 0.0);
        let mut ledger = Ledger::new(100, None, PriceList::default());

        assert!(ledger.buy_units(&mut territory, UnitType::Sword, false, 2));
        assert_eq!(ledger.gold(), 20);
        assert_eq!(territory.garrison.units.sword, 2);
    }

    #[test]
    fn test_buy_units_insufficient_gold_is_noop() {
        let mut territory = player_territory(0, 0.0);
        let mut ledger = Ledger::new(199, None, PriceList::default());

        assert!(!ledger.buy_units(&mut territory, UnitType::Shield, true, 1));
        assert_eq!(ledger.gold(), 199);
        assert!(territory.garrison.is_empty());
    }

    #[test]
    fn test_buy_units_foreign_territory_is_noop() {
        let mut territory = player_territory(0, 0.0);
        territory.owner = Faction::Neutral;
        let mut ledger = Ledger::new(1000, None, PriceList::default());

        assert!(!ledger.buy_units(&mut territory, UnitType::Archer, false, 1));
        assert_eq!(ledger.gold(), 1000);
    }

    #[test]
    fn test_build_barracks_boosts_growth() {
        let mut territory = player_territory(0, 0.0);
        territory.growth_rate = 2.0;
        let mut ledger = Ledger::new(300, None, PriceList::default());

        assert!(ledger.build_structure(&mut territory, BuildingType::Barracks));
        assert_eq!(ledger.gold(), 0);
        assert_eq!(territory.effect, SpecialEffect::RapidGrowth);
        assert!((territory.growth_rate - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_build_requires_funds() {
        let mut territory = player_territory(0, 0.0);
        let mut ledger = Ledger::new(299, None, PriceList::default());

        assert!(!ledger.build_structure(&mut territory, BuildingType::Fortress));
        assert_eq!(territory.building, BuildingType::None);
        assert_eq!(territory.effect, SpecialEffect::None);
    }

    #[test]
    fn test_roll_gold_income_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..100 {
            let income = roll_gold_income(&mut rng, (1.0, 3.0));
            assert!((1.0..3.0).contains(&income));
        }
        assert!((roll_gold_income(&mut rng, (2.0, 2.0)) - 2.0).abs() < f32::EPSILON);
    }
}

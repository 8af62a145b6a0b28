//! Round-synchronised growth pulse.
//!
//! A pulse adds `max(1, floor(growth_rate))` regular units to every
//! non-neutral territory, split by the territory's current composition so
//! the type ratio is preserved. Empty territories get a 1:2:1
//! shield/sword/archer split. Territories with the giant-spawn effect also
//! gain one giant of their most numerous type.

use serde::{Deserialize, Serialize};

use crate::game::{SpecialEffect, Squad, TerritoryMap, UnitType};

/// Summary of one growth pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GrowthReport {
    /// Territories that grew.
    pub territories: u32,
    /// Regular units added across the map.
    pub units_added: u32,
    /// Giants added across the map.
    pub giants_added: u32,
}

/// Units a territory gains per pulse.
#[must_use]
pub fn pulse_amount(growth_rate: f32) -> u32 {
    (growth_rate.max(0.0).floor() as u32).max(1)
}

/// Split `amount` new units according to `composition`.
///
/// The floored proportional shares are topped up on the dominant type so the
/// result always sums to `amount`.
#[must_use]
pub fn distribute(amount: u32, composition: Squad) -> Squad {
    let total = composition.total();
    if total == 0 {
        let flank = amount / 4;
        return Squad::new(flank, amount - flank * 2, flank);
    }

    let share = |count: u32| -> u32 {
        let part = u64::from(amount) * u64::from(count) / u64::from(total);
        u32::try_from(part).unwrap_or(amount)
    };
    let mut added = Squad::new(
        share(composition.shield),
        share(composition.sword),
        share(composition.archer),
    );
    let remainder = amount.saturating_sub(added.total());
    added.add(composition.dominant(), remainder);
    added
}

/// Grow every owned territory once.
pub fn apply_growth_pulse(map: &mut TerritoryMap) -> GrowthReport {
    let mut report = GrowthReport::default();

    for territory in map.iter_mut().filter(|t| t.owner.is_active()) {
        let amount = pulse_amount(territory.growth_rate);
        let added = distribute(amount, territory.garrison.units);
        territory.garrison.units.merge(added);
        report.territories += 1;
        report.units_added += added.total();

        if territory.effect == SpecialEffect::GiantSpawn {
            let unit: UnitType = territory.garrison.units.dominant();
            territory.garrison.giants.add(unit, 1);
            report.giants_added += 1;
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Faction, Point, Territory};

    #[test]
    fn test_pulse_amount_minimum_one() {
        assert_eq!(pulse_amount(0.2), 1);
        assert_eq!(pulse_amount(2.9), 2);
        assert_eq!(pulse_amount(4.5), 4);
    }

    #[test]
    fn test_distribute_empty_uses_one_two_one() {
        assert_eq!(distribute(4, Squad::EMPTY), Squad::new(1, 2, 1));
        assert_eq!(distribute(1, Squad::EMPTY), Squad::new(0, 1, 0));
        assert_eq!(distribute(9, Squad::EMPTY), Squad::new(2, 5, 2));
    }

    #[test]
    fn test_distribute_preserves_ratio() {
        let added = distribute(10, Squad::new(20, 20, 60));
        assert_eq!(added, Squad::new(2, 2, 6));

        let added = distribute(3, Squad::new(1, 1, 1));
        assert_eq!(added.total(), 3);
    }

    #[test]
    fn test_pulse_skips_neutral() {
        let mut neutral = Territory::new(0, "N", Point::default(), 10.0);
        neutral.garrison.units = Squad::new(5, 5, 5);
        let mut owned = Territory::new(1, "P", Point::default(), 10.0);
        owned.owner = Faction::Player;
        owned.growth_rate = 3.0;
        let mut map = TerritoryMap::new(vec![neutral, owned]);

        let report = apply_growth_pulse(&mut map);
        assert_eq!(report.territories, 1);
        assert_eq!(map.get(0).unwrap().total(), 15);
        assert_eq!(map.get(1).unwrap().total(), 3);
    }

    #[test]
    fn test_pulse_spawns_giant() {
        let mut trained = Territory::new(0, "G", Point::default(), 10.0);
        trained.owner = Faction::Ai(2);
        trained.effect = SpecialEffect::GiantSpawn;
        trained.garrison.units = Squad::new(0, 0, 8);
        let mut map = TerritoryMap::new(vec![trained]);

        let report = apply_growth_pulse(&mut map);
        assert_eq!(report.giants_added, 1);
        assert_eq!(map.get(0).unwrap().garrison.giants.archer, 1);
    }
}

//! Unit archetypes and unit-count bundles.

use serde::{Deserialize, Serialize};

/// The three unit archetypes of the rock-paper-scissors triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    /// Slow, sturdy melee. Strong against archers.
    Shield,
    /// Melee damage dealer. Strong against shields.
    Sword,
    /// Ranged. Strong against swords, weak against shields.
    Archer,
}

impl UnitType {
    /// All unit types in storage order.
    pub const ALL: [Self; 3] = [Self::Shield, Self::Sword, Self::Archer];
}

/// Counts of each unit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Squad {
    /// Shield count.
    pub shield: u32,
    /// Sword count.
    pub sword: u32,
    /// Archer count.
    pub archer: u32,
}

impl Squad {
    /// An empty squad.
    pub const EMPTY: Self = Self::new(0, 0, 0);

    /// Create a squad from per-type counts.
    #[must_use]
    pub const fn new(shield: u32, sword: u32, archer: u32) -> Self {
        Self {
            shield,
            sword,
            archer,
        }
    }

    /// Sum of all counts.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.shield
            .saturating_add(self.sword)
            .saturating_add(self.archer)
    }

    /// True when every count is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Count of one unit type.
    #[must_use]
    pub const fn get(&self, unit: UnitType) -> u32 {
        match unit {
            UnitType::Shield => self.shield,
            UnitType::Sword => self.sword,
            UnitType::Archer => self.archer,
        }
    }

    /// Mutable count of one unit type.
    pub fn get_mut(&mut self, unit: UnitType) -> &mut u32 {
        match unit {
            UnitType::Shield => &mut self.shield,
            UnitType::Sword => &mut self.sword,
            UnitType::Archer => &mut self.archer,
        }
    }

    /// Add units of one type.
    pub fn add(&mut self, unit: UnitType, count: u32) {
        let slot = self.get_mut(unit);
        *slot = slot.saturating_add(count);
    }

    /// Remove up to `count` units of one type, returning how many were removed.
    pub fn take(&mut self, unit: UnitType, count: u32) -> u32 {
        let slot = self.get_mut(unit);
        let taken = count.min(*slot);
        *slot -= taken;
        taken
    }

    /// Merge another squad into this one.
    pub fn merge(&mut self, other: Squad) {
        for unit in UnitType::ALL {
            self.add(unit, other.get(unit));
        }
    }

    /// Remove another squad from this one, saturating at zero per type.
    pub fn remove(&mut self, other: Squad) {
        for unit in UnitType::ALL {
            self.take(unit, other.get(unit));
        }
    }

    /// Scale each count by `percent`, rounding half up.
    #[must_use]
    pub fn scaled_percent(&self, percent: u32) -> Self {
        let scale = |n: u32| -> u32 {
            let scaled = u64::from(n) * u64::from(percent);
            u32::try_from((scaled + 50) / 100).unwrap_or(u32::MAX)
        };
        Self::new(scale(self.shield), scale(self.sword), scale(self.archer))
    }

    /// The most numerous type. Ties prefer sword, then shield, then archer.
    #[must_use]
    pub fn dominant(&self) -> UnitType {
        [UnitType::Sword, UnitType::Shield, UnitType::Archer]
            .into_iter()
            .fold(UnitType::Sword, |best, unit| {
                if self.get(unit) > self.get(best) {
                    unit
                } else {
                    best
                }
            })
    }
}

/// Units stationed on a territory: regular units plus the giant tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Garrison {
    /// Regular units.
    pub units: Squad,
    /// Giant (elite) units.
    pub giants: Squad,
}

impl Garrison {
    /// A garrison of regular units only.
    #[must_use]
    pub const fn of(units: Squad) -> Self {
        Self {
            units,
            giants: Squad::EMPTY,
        }
    }

    /// Total of all six counts.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.units.total().saturating_add(self.giants.total())
    }

    /// True when no unit of any tier is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Ratio presets used to split a transfer across unit types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Formation {
    /// 35 / 45 / 20.
    #[default]
    Balanced,
    /// 50 / 30 / 20.
    ShieldWall,
    /// 20 / 30 / 50.
    ArcherSwarm,
}

impl Formation {
    /// Shield / sword / archer percentages. Always sums to 100.
    #[must_use]
    pub const fn ratio(self) -> Squad {
        match self {
            Self::Balanced => Squad::new(35, 45, 20),
            Self::ShieldWall => Squad::new(50, 30, 20),
            Self::ArcherSwarm => Squad::new(20, 30, 50),
        }
    }

    /// The next preset in toggle order.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Balanced => Self::ShieldWall,
            Self::ShieldWall => Self::ArcherSwarm,
            Self::ArcherSwarm => Self::Balanced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squad_take_saturates() {
        let mut squad = Squad::new(3, 0, 1);
        assert_eq!(squad.take(UnitType::Shield, 5), 3);
        assert_eq!(squad.take(UnitType::Sword, 1), 0);
        assert_eq!(squad, Squad::new(0, 0, 1));
    }

    #[test]
    fn test_squad_scaled_percent_rounds_half_up() {
        let squad = Squad::new(10, 1, 5);
        assert_eq!(squad.scaled_percent(70), Squad::new(7, 1, 4));
    }

    #[test]
    fn test_squad_dominant_prefers_sword_on_tie() {
        assert_eq!(Squad::new(4, 4, 4).dominant(), UnitType::Sword);
        assert_eq!(Squad::new(5, 4, 4).dominant(), UnitType::Shield);
        assert_eq!(Squad::new(1, 2, 9).dominant(), UnitType::Archer);
        assert_eq!(Squad::EMPTY.dominant(), UnitType::Sword);
    }

    #[test]
    fn test_garrison_total_counts_giants() {
        let garrison = Garrison {
            units: Squad::new(1, 2, 3),
            giants: Squad::new(1, 0, 1),
        };
        assert_eq!(garrison.total(), 8);
    }

    #[test]
    fn test_formation_ratios_sum_to_100() {
        for formation in [Formation::Balanced, Formation::ShieldWall, Formation::ArcherSwarm] {
            assert_eq!(formation.ratio().total(), 100);
        }
        assert_eq!(Formation::ArcherSwarm.next(), Formation::Balanced);
    }
}

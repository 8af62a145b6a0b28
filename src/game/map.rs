//! Territory arena and adjacency queries.

use std::collections::BTreeSet;

use crate::game::{Faction, Territory, TerritoryId};

/// Hard upper bound on the number of links a territory may have.
pub const MAX_DEGREE: usize = 5;

/// All territories of a game, addressed by stable [`TerritoryId`].
///
/// Territories are never removed during a game, so an id stays valid for the
/// lifetime of the map.
#[derive(Debug, Clone, Default)]
pub struct TerritoryMap {
    territories: Vec<Territory>,
}

impl TerritoryMap {
    /// Build a map from territories whose ids equal their indices.
    ///
    /// Ids are reassigned to indices to keep that invariant.
    #[must_use]
    pub fn new(mut territories: Vec<Territory>) -> Self {
        for (idx, territory) in territories.iter_mut().enumerate() {
            territory.id = idx;
        }
        Self { territories }
    }

    /// Number of territories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.territories.len()
    }

    /// True if the map has no territories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.territories.is_empty()
    }

    /// Territory by id.
    #[must_use]
    pub fn get(&self, id: TerritoryId) -> Option<&Territory> {
        self.territories.get(id)
    }

    /// Mutable territory by id.
    #[must_use]
    pub fn get_mut(&mut self, id: TerritoryId) -> Option<&mut Territory> {
        self.territories.get_mut(id)
    }

    /// Two distinct territories, mutably.
    ///
    /// Returns `None` if the ids are equal or either is out of range.
    #[must_use]
    pub fn pair_mut(
        &mut self,
        a: TerritoryId,
        b: TerritoryId,
    ) -> Option<(&mut Territory, &mut Territory)> {
        if a == b || a >= self.len() || b >= self.len() {
            return None;
        }
        if a < b {
            let (left, right) = self.territories.split_at_mut(b);
            Some((&mut left[a], &mut right[0]))
        } else {
            let (left, right) = self.territories.split_at_mut(a);
            Some((&mut right[0], &mut left[b]))
        }
    }

    /// All territories in id order.
    #[must_use]
    #[inline]
    pub fn territories(&self) -> &[Territory] {
        &self.territories
    }

    /// Iterate over territories in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Territory> {
        self.territories.iter()
    }

    /// Iterate mutably over territories in id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Territory> {
        self.territories.iter_mut()
    }

    /// Record an undirected link between `a` and `b`.
    ///
    /// Returns `false` for self links, unknown ids, or links that already exist.
    pub fn link(&mut self, a: TerritoryId, b: TerritoryId) -> bool {
        if self.are_adjacent(a, b) {
            return false;
        }
        let Some((first, second)) = self.pair_mut(a, b) else {
            return false;
        };
        first.neighbors.push(b);
        second.neighbors.push(a);
        true
    }

    /// Number of links on a territory.
    #[must_use]
    pub fn degree(&self, id: TerritoryId) -> usize {
        self.get(id).map_or(0, |t| t.neighbors.len())
    }

    /// Adjacency test, checked from both ends.
    #[must_use]
    pub fn are_adjacent(&self, a: TerritoryId, b: TerritoryId) -> bool {
        let forward = self.get(a).is_some_and(|t| t.is_adjacent(b));
        let backward = self.get(b).is_some_and(|t| t.is_adjacent(a));
        forward || backward
    }

    /// Territories owned by a faction.
    pub fn owned_by(&self, faction: Faction) -> impl Iterator<Item = &Territory> {
        self.territories.iter().filter(move |t| t.owner == faction)
    }

    /// Count territories owned by a faction.
    #[must_use]
    pub fn count_owned(&self, faction: Faction) -> usize {
        self.owned_by(faction).count()
    }

    /// Non-neutral factions that own at least one territory.
    #[must_use]
    pub fn active_factions(&self) -> BTreeSet<Faction> {
        self.territories
            .iter()
            .map(|t| t.owner)
            .filter(|f| f.is_active())
            .collect()
    }

    /// True if any territory is contested.
    #[must_use]
    pub fn any_battle(&self) -> bool {
        self.territories.iter().any(Territory::in_battle)
    }

    /// Sum of all garrisons, excluding units committed to battles or convoys.
    #[must_use]
    pub fn total_garrison(&self) -> u64 {
        self.territories.iter().map(|t| u64::from(t.total())).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Point;

    fn line_map(n: usize) -> TerritoryMap {
        let territories = (0..n)
            .map(|i| Territory::new(i, format!("T{i}"), Point::new(i as f32 * 10.0, 0.0), 5.0))
            .collect();
        TerritoryMap::new(territories)
    }

    #[test]
    fn test_link_is_symmetric() {
        let mut map = line_map(3);
        assert!(map.link(0, 1));
        assert!(map.are_adjacent(0, 1));
        assert!(map.are_adjacent(1, 0));
        assert!(!map.are_adjacent(0, 2));
        assert_eq!(map.degree(0), 1);
        assert_eq!(map.degree(1), 1);
    }

    #[test]
    fn test_link_rejects_duplicates_and_self() {
        let mut map = line_map(2);
        assert!(map.link(0, 1));
        assert!(!map.link(1, 0));
        assert!(!map.link(0, 0));
        assert!(!map.link(0, 9));
        assert_eq!(map.degree(0), 1);
    }

    #[test]
    fn test_pair_mut_both_orders() {
        let mut map = line_map(4);
        let (a, b) = map.pair_mut(3, 1).unwrap();
        assert_eq!((a.id, b.id), (3, 1));
        let (a, b) = map.pair_mut(0, 2).unwrap();
        assert_eq!((a.id, b.id), (0, 2));
        assert!(map.pair_mut(2, 2).is_none());
    }

    #[test]
    fn test_active_factions_skip_neutral() {
        let mut map = line_map(3);
        map.get_mut(0).unwrap().owner = Faction::Player;
        map.get_mut(2).unwrap().owner = Faction::Ai(2);
        let factions = map.active_factions();
        assert_eq!(factions.len(), 2);
        assert!(!factions.contains(&Faction::Neutral));
    }
}

//! Troop transfers and units in transit.
//!
//! A transfer order deducts units from the source immediately and fans them
//! out into several convoys that travel in a straight line to the target.
//! Every convoy of one order shares the same travel duration, so they all
//! arrive on the same step.

use std::f32::consts::TAU;
use std::mem;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::{
    Battle, Faction, Formation, Point, Squad, Territory, TerritoryId, TerritoryMap, UnitType,
};

/// Identifier of a convoy, unique for the lifetime of an arena.
pub type ConvoyId = u32;

/// Fewest convoys a transfer is split into.
pub const MIN_CONVOYS: u32 = 6;

/// Most convoys a transfer is split into.
pub const MAX_CONVOYS: u32 = 24;

/// Shortest travel time of any transfer, in seconds.
pub const MIN_TRAVEL_TIME: f32 = 0.2;

/// Convoy start offset as a fraction of the source radius.
const JITTER_FACTOR: f32 = 0.3;

/// How many units a transfer asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendAmount {
    /// `max(1, total × percent / 100)`.
    Percent(u32),
    /// Everything except one unit.
    AllOut,
}

impl SendAmount {
    /// Map a toggle percentage onto a send amount; 100 and above mean all-out.
    #[must_use]
    pub const fn from_percent(percent: u32) -> Self {
        if percent >= 100 {
            Self::AllOut
        } else {
            Self::Percent(percent)
        }
    }

    /// Units requested from a source holding `total` units.
    ///
    /// Zero when the source cannot spare anything.
    #[must_use]
    pub fn requested(self, total: u32) -> u32 {
        if total <= 1 {
            return 0;
        }
        match self {
            Self::AllOut => total - 1,
            Self::Percent(percent) => {
                let scaled = u64::from(total) * u64::from(percent) / 100;
                u32::try_from(scaled).unwrap_or(total).max(1)
            }
        }
    }
}

/// A transfer command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOrder {
    /// Territory the units leave.
    pub source: TerritoryId,
    /// Territory the units head for.
    pub target: TerritoryId,
    /// Faction issuing the order.
    pub owner: Faction,
    /// Requested amount.
    pub amount: SendAmount,
    /// Split across unit types.
    pub formation: Formation,
}

/// A group of units travelling between two territories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Convoy {
    /// Arena-unique id.
    pub id: ConvoyId,
    /// Faction the units belong to.
    pub owner: Faction,
    /// Territory the convoy left.
    pub origin: TerritoryId,
    /// Territory the convoy arrives at.
    pub target: TerritoryId,
    /// Units carried. Never empty.
    pub payload: Squad,
    /// Seconds travelled so far.
    pub elapsed: f32,
    /// Total travel time.
    pub duration: f32,
    /// Start of the drawn path.
    pub from: Point,
    /// End of the drawn path.
    pub to: Point,
}

impl Convoy {
    /// Travel progress in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Interpolated position for rendering.
    #[must_use]
    pub fn position(&self) -> Point {
        self.from.lerp(self.to, self.progress())
    }

    /// True once travel time is used up.
    #[must_use]
    pub fn arrived(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Owner of every convoy in flight.
///
/// Arrived convoys are removed in one compaction pass per step, after all
/// convoys have been advanced.
#[derive(Debug, Clone, Default)]
pub struct ConvoyArena {
    convoys: Vec<Convoy>,
    next_id: ConvoyId,
}

impl ConvoyArena {
    /// An empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Convoys in flight, oldest first.
    #[must_use]
    pub fn convoys(&self) -> &[Convoy] {
        &self.convoys
    }

    /// Number of convoys in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.convoys.len()
    }

    /// True if nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.convoys.is_empty()
    }

    /// Drop every convoy.
    pub fn clear(&mut self) {
        self.convoys.clear();
    }

    /// Units in flight for a faction.
    #[must_use]
    pub fn units_in_flight(&self, owner: Faction) -> u64 {
        self.convoys
            .iter()
            .filter(|c| c.owner == owner)
            .map(|c| u64::from(c.payload.total()))
            .sum()
    }

    fn spawn(&mut self, mut convoy: Convoy) -> ConvoyId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        convoy.id = id;
        self.convoys.push(convoy);
        id
    }

    /// Advance every convoy and remove the ones that arrived.
    ///
    /// Arrivals are returned in spawn order.
    pub fn advance(&mut self, dt: f32) -> Vec<Convoy> {
        for convoy in &mut self.convoys {
            convoy.elapsed = (convoy.elapsed + dt).min(convoy.duration);
        }
        let (arrived, flying): (Vec<_>, Vec<_>) =
            mem::take(&mut self.convoys).into_iter().partition(Convoy::arrived);
        self.convoys = flying;
        arrived
    }
}

/// Split `amount` across unit types by formation ratio, capped by `available`.
///
/// Any shortfall is filled from sword, then shield, then archer.
#[must_use]
pub fn allocate(available: Squad, amount: u32, formation: Formation) -> Squad {
    let ratio = formation.ratio();
    let mut sent = Squad::EMPTY;

    for unit in UnitType::ALL {
        let wanted = u64::from(amount) * u64::from(ratio.get(unit)) / 100;
        let wanted = u32::try_from(wanted).unwrap_or(amount);
        sent.add(unit, wanted.min(available.get(unit)));
    }

    let mut shortfall = amount.saturating_sub(sent.total());
    for unit in [UnitType::Sword, UnitType::Shield, UnitType::Archer] {
        if shortfall == 0 {
            break;
        }
        let spare = available.get(unit) - sent.get(unit);
        let extra = spare.min(shortfall);
        sent.add(unit, extra);
        shortfall -= extra;
    }

    sent
}

/// Number of convoys a transfer of `sent` units is split into.
#[must_use]
pub fn convoy_count(sent: u32) -> u32 {
    (sent / 4).clamp(MIN_CONVOYS, MAX_CONVOYS)
}

/// Split a payload into `count` convoy loads.
///
/// Loads differ by at most one unit; the first loads take the remainder.
/// Empty loads are omitted.
#[must_use]
pub fn split_payload(payload: Squad, count: u32) -> Vec<Squad> {
    let count = count.max(1);
    let total = payload.total();
    let base = total / count;
    let remainder = total % count;

    let mut pool = payload;
    let mut loads = Vec::with_capacity(count as usize);
    for idx in 0..count {
        let mut quota = base + u32::from(idx < remainder);
        if quota == 0 {
            continue;
        }
        let mut load = Squad::EMPTY;
        for unit in UnitType::ALL {
            let taken = pool.take(unit, quota);
            load.add(unit, taken);
            quota -= taken;
        }
        loads.push(load);
    }
    loads
}

/// Travel time between two points.
#[must_use]
pub fn travel_time(from: Point, to: Point, speed: f32) -> f32 {
    if speed <= 0.0 {
        return MIN_TRAVEL_TIME;
    }
    (from.distance(to) / speed).max(MIN_TRAVEL_TIME)
}

/// Deduct units from the source and put them in flight.
///
/// Returns the units sent, or `None` with no state change when the ids are
/// invalid, the source and target coincide, or the source has nothing to
/// spare.
pub fn issue_transfer(
    map: &mut TerritoryMap,
    arena: &mut ConvoyArena,
    order: &TransferOrder,
    speed: f32,
    rng: &mut impl Rng,
) -> Option<Squad> {
    let (source, target) = map.pair_mut(order.source, order.target)?;
    let requested = order.amount.requested(source.total());
    if requested == 0 {
        return None;
    }

    let sent = allocate(source.garrison.units, requested, order.formation);
    if sent.is_empty() {
        return None;
    }
    source.garrison.units.remove(sent);

    let duration = travel_time(source.position, target.position, speed);
    let jitter = source.radius * JITTER_FACTOR;
    for load in split_payload(sent, convoy_count(sent.total())) {
        let angle = rng.gen_range(0.0..TAU);
        let (dx, dy) = (angle.cos() * jitter, angle.sin() * jitter);
        arena.spawn(Convoy {
            id: 0,
            owner: order.owner,
            origin: order.source,
            target: order.target,
            payload: load,
            elapsed: 0.0,
            duration,
            from: Point::new(source.position.x + dx, source.position.y + dy),
            to: Point::new(target.position.x + dx, target.position.y + dy),
        });
    }

    Some(sent)
}

/// What an arriving convoy did to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrivalOutcome {
    /// Added to a friendly garrison.
    Reinforced,
    /// Merged into the ongoing attack.
    JoinedAttack,
    /// Merged into the defending garrison of a contested territory.
    JoinedDefence,
    /// Started a new battle.
    BattleStarted,
    /// A third faction arrived at a contested territory and was discarded.
    Dropped,
}

/// Apply a convoy payload to its target.
pub fn apply_arrival(territory: &mut Territory, owner: Faction, payload: Squad) -> ArrivalOutcome {
    match territory.battle.as_mut() {
        Some(battle) if battle.attacker == owner => {
            battle.pool.merge(payload);
            ArrivalOutcome::JoinedAttack
        }
        Some(_) if territory.owner == owner => {
            territory.garrison.units.merge(payload);
            ArrivalOutcome::JoinedDefence
        }
        Some(_) => ArrivalOutcome::Dropped,
        None if territory.owner == owner => {
            territory.garrison.units.merge(payload);
            ArrivalOutcome::Reinforced
        }
        None => {
            territory.battle = Some(Battle::new(owner, payload));
            ArrivalOutcome::BattleStarted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn two_territory_map(source: Squad) -> TerritoryMap {
        let mut a = Territory::new(0, "A", Point::new(0.0, 0.0), 40.0);
        a.owner = Faction::Player;
        a.garrison.units = source;
        let b = Territory::new(1, "B", Point::new(960.0, 0.0), 40.0);
        let mut map = TerritoryMap::new(vec![a, b]);
        map.link(0, 1);
        map
    }

    fn order(amount: SendAmount, formation: Formation) -> TransferOrder {
        TransferOrder {
            source: 0,
            target: 1,
            owner: Faction::Player,
            amount,
            formation,
        }
    }

    #[test]
    fn test_requested_amount() {
        assert_eq!(SendAmount::Percent(50).requested(1), 0);
        assert_eq!(SendAmount::Percent(25).requested(3), 1);
        assert_eq!(SendAmount::Percent(50).requested(120), 60);
        assert_eq!(SendAmount::AllOut.requested(10), 9);
        assert_eq!(SendAmount::from_percent(100), SendAmount::AllOut);
    }

    #[test]
    fn test_allocate_balanced_formation() {
        let sent = allocate(Squad::new(40, 60, 20), 60, Formation::Balanced);
        assert_eq!(sent, Squad::new(21, 27, 12));
    }

    #[test]
    fn test_allocate_fills_shortfall_sword_first() {
        let sent = allocate(Squad::new(2, 30, 30), 20, Formation::ShieldWall);
        // Wanted 10/6/4, shields capped at 2, sword covers the 8 missing.
        assert_eq!(sent, Squad::new(2, 14, 4));
    }

    #[test]
    fn test_allocate_never_exceeds_supply() {
        let available = Squad::new(1, 1, 1);
        let sent = allocate(available, 10, Formation::ArcherSwarm);
        assert_eq!(sent, available);
    }

    #[test]
    fn test_split_payload_fan_out() {
        let loads = split_payload(Squad::new(21, 27, 12), convoy_count(60));
        assert_eq!(loads.len(), 15);
        let mut merged = Squad::EMPTY;
        for load in &loads {
            assert_eq!(load.total(), 4);
            merged.merge(*load);
        }
        assert_eq!(merged, Squad::new(21, 27, 12));
    }

    #[test]
    fn test_split_payload_skips_empty_loads() {
        let loads = split_payload(Squad::new(0, 3, 0), convoy_count(3));
        assert_eq!(loads.len(), 3);
    }

    #[test]
    fn test_issue_transfer_conserves_units() {
        let mut map = two_territory_map(Squad::new(40, 60, 20));
        let mut arena = ConvoyArena::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let sent = issue_transfer(
            &mut map,
            &mut arena,
            &order(SendAmount::Percent(50), Formation::Balanced),
            480.0,
            &mut rng,
        )
        .unwrap();

        assert_eq!(sent.total(), 60);
        assert_eq!(map.get(0).unwrap().total(), 60);
        assert_eq!(arena.units_in_flight(Faction::Player), 60);
        let durations: Vec<f32> = arena.convoys().iter().map(|c| c.duration).collect();
        assert!(durations.iter().all(|d| (d - 2.0).abs() < 1e-4));
    }

    #[test]
    fn test_all_out_keeps_one() {
        let mut map = two_territory_map(Squad::new(3, 4, 3));
        let mut arena = ConvoyArena::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let sent = issue_transfer(
            &mut map,
            &mut arena,
            &order(SendAmount::AllOut, Formation::Balanced),
            480.0,
            &mut rng,
        )
        .unwrap();
        assert_eq!(sent.total(), 9);
        assert_eq!(map.get(0).unwrap().total(), 1);
    }

    #[test]
    fn test_issue_transfer_single_unit_is_noop() {
        let mut map = two_territory_map(Squad::new(0, 1, 0));
        let mut arena = ConvoyArena::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = issue_transfer(
            &mut map,
            &mut arena,
            &order(SendAmount::Percent(75), Formation::Balanced),
            480.0,
            &mut rng,
        );
        assert!(result.is_none());
        assert!(arena.is_empty());
        assert_eq!(map.get(0).unwrap().total(), 1);
    }

    #[test]
    fn test_arena_advance_removes_arrivals() {
        let mut map = two_territory_map(Squad::new(10, 10, 10));
        let mut arena = ConvoyArena::new();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        issue_transfer(
            &mut map,
            &mut arena,
            &order(SendAmount::Percent(50), Formation::Balanced),
            480.0,
            &mut rng,
        );
        let in_flight = arena.len();
        assert!(arena.advance(1.0).is_empty());
        assert_eq!(arena.advance(1.0).len(), in_flight);
        assert!(arena.is_empty());
    }

    #[test]
    fn test_apply_arrival_rules() {
        let mut territory = Territory::new(0, "T", Point::default(), 30.0);
        territory.owner = Faction::Ai(2);
        territory.garrison.units = Squad::new(5, 5, 5);

        let outcome = apply_arrival(&mut territory, Faction::Ai(2), Squad::new(1, 0, 0));
        assert_eq!(outcome, ArrivalOutcome::Reinforced);
        assert_eq!(territory.total(), 16);

        let outcome = apply_arrival(&mut territory, Faction::Player, Squad::new(0, 4, 0));
        assert_eq!(outcome, ArrivalOutcome::BattleStarted);
        assert_eq!(territory.battle.unwrap().pool, Squad::new(0, 4, 0));

        let outcome = apply_arrival(&mut territory, Faction::Player, Squad::new(0, 2, 0));
        assert_eq!(outcome, ArrivalOutcome::JoinedAttack);
        assert_eq!(territory.battle.unwrap().pool.sword, 6);

        let outcome = apply_arrival(&mut territory, Faction::Ai(2), Squad::new(0, 0, 3));
        assert_eq!(outcome, ArrivalOutcome::JoinedDefence);
        assert_eq!(territory.garrison.units.archer, 8);

        let outcome = apply_arrival(&mut territory, Faction::Ai(3), Squad::new(9, 9, 9));
        assert_eq!(outcome, ArrivalOutcome::Dropped);
        assert_eq!(territory.total(), 19);
        assert_eq!(territory.battle.unwrap().attacker, Faction::Player);
    }
}

//! Territory entity and the types hanging off it.

use serde::{Deserialize, Serialize};

use crate::game::{Faction, Garrison, Squad, TICK_SECONDS};

/// Stable index of a territory inside its [`TerritoryMap`](crate::game::TerritoryMap).
pub type TerritoryId = usize;

/// A position in map space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Linear interpolation towards `other`; `t` is clamped to `[0, 1]`.
    #[must_use]
    pub fn lerp(self, other: Point, t: f32) -> Point {
        let t = t.clamp(0.0, 1.0);
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// Structure built on a territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BuildingType {
    /// Nothing built.
    #[default]
    None,
    /// Adds flat damage to the defence.
    Cannon,
    /// Faster growth.
    Barracks,
    /// Defenders take less damage.
    Fortress,
    /// Spawns giants on growth pulses.
    Training,
}

impl BuildingType {
    /// Effect granted once the building is complete.
    #[must_use]
    pub const fn effect(self) -> SpecialEffect {
        match self {
            Self::None | Self::Cannon => SpecialEffect::None,
            Self::Barracks => SpecialEffect::RapidGrowth,
            Self::Fortress => SpecialEffect::DefenseBoost,
            Self::Training => SpecialEffect::GiantSpawn,
        }
    }
}

/// Derived territory modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpecialEffect {
    /// No modifier.
    #[default]
    None,
    /// One giant per growth pulse.
    GiantSpawn,
    /// Growth rate was boosted.
    RapidGrowth,
    /// Defenders take reduced damage.
    DefenseBoost,
}

/// An active battle on a territory.
///
/// The defender is always the territory owner; only the attacking side is
/// tracked here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Battle {
    /// Faction attacking the territory.
    pub attacker: Faction,
    /// Attacking units still alive, accumulated across arriving convoys.
    pub pool: Squad,
    /// Combat ticks fought so far.
    pub ticks: u32,
    /// Frame time not yet consumed by a whole combat tick.
    pub tick_buffer: f32,
}

impl Battle {
    /// Start a battle with the first wave of attackers.
    #[must_use]
    pub const fn new(attacker: Faction, pool: Squad) -> Self {
        Self {
            attacker,
            pool,
            ticks: 0,
            tick_buffer: 0.0,
        }
    }

    /// Simulated seconds of fighting so far.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.ticks as f32 * TICK_SECONDS
    }
}

/// A node of the territory graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Territory {
    /// Stable id, equal to the index in the map arena.
    pub id: TerritoryId,
    /// Display name.
    pub name: String,
    /// Centre position.
    pub position: Point,
    /// Nominal radius, used for convoy jitter and outlines.
    pub radius: f32,
    /// Polygon outline for rendering.
    pub outline: Vec<Point>,
    /// Adjacent territories. Symmetric with the neighbours' lists.
    pub neighbors: Vec<TerritoryId>,
    /// Current owner.
    pub owner: Faction,
    /// Defending units.
    pub garrison: Garrison,
    /// Units added per growth pulse (floored, minimum one).
    pub growth_rate: f32,
    /// Gold per second while owned by the player.
    pub gold_income: f32,
    /// Built structure.
    pub building: BuildingType,
    /// Modifier derived from the building.
    pub effect: SpecialEffect,
    /// Set once this territory launched an attack this turn.
    pub has_attacked: bool,
    /// Battle in progress, if contested.
    pub battle: Option<Battle>,
}

impl Territory {
    /// Create an unowned, empty territory.
    #[must_use]
    pub fn new(id: TerritoryId, name: impl Into<String>, position: Point, radius: f32) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            radius,
            outline: Vec::new(),
            neighbors: Vec::new(),
            owner: Faction::Neutral,
            garrison: Garrison::default(),
            growth_rate: 2.0,
            gold_income: 0.0,
            building: BuildingType::None,
            effect: SpecialEffect::None,
            has_attacked: false,
            battle: None,
        }
    }

    /// Total units of both tiers.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.garrison.total()
    }

    /// True while a battle is being fought here.
    #[must_use]
    pub const fn in_battle(&self) -> bool {
        self.battle.is_some()
    }

    /// True if `other` is a neighbour.
    #[must_use]
    pub fn is_adjacent(&self, other: TerritoryId) -> bool {
        self.neighbors.contains(&other)
    }

    /// Eligible to launch an attack this turn.
    #[must_use]
    pub fn can_attack(&self) -> bool {
        self.total() > 1 && !self.has_attacked
    }
}

//! Read-only views handed to the presentation layer.
//!
//! A snapshot is an owned copy taken between simulation steps, so a renderer
//! never observes a half-applied step.

use serde::{Deserialize, Serialize};

use crate::game::{
    BuildingType, Convoy, ConvoyId, Faction, Formation, Garrison, Point, SpecialEffect, Squad,
    Territory, TerritoryId, TurnPhase,
};

/// Terminal result of a game, from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The player owns every territory.
    Win,
    /// The player owns no territory.
    Lose,
}

/// Battle state of a contested territory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BattleView {
    /// Attacking faction.
    pub attacker: Faction,
    /// Attackers still alive.
    pub attackers: Squad,
    /// Seconds of fighting so far.
    pub elapsed: f32,
}

/// One territory as drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerritoryView {
    /// Territory id.
    pub id: TerritoryId,
    /// Display name.
    pub name: String,
    /// Centre.
    pub position: Point,
    /// Radius.
    pub radius: f32,
    /// Polygon outline.
    pub outline: Vec<Point>,
    /// Neighbour ids.
    pub neighbors: Vec<TerritoryId>,
    /// Owner.
    pub owner: Faction,
    /// Defenders by tier and type.
    pub garrison: Garrison,
    /// Sum of all defenders.
    pub total: u32,
    /// Built structure.
    pub building: BuildingType,
    /// Building effect.
    pub effect: SpecialEffect,
    /// Already attacked this turn.
    pub has_attacked: bool,
    /// Battle in progress.
    pub battle: Option<BattleView>,
}

impl From<&Territory> for TerritoryView {
    fn from(t: &Territory) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
            position: t.position,
            radius: t.radius,
            outline: t.outline.clone(),
            neighbors: t.neighbors.clone(),
            owner: t.owner,
            garrison: t.garrison,
            total: t.total(),
            building: t.building,
            effect: t.effect,
            has_attacked: t.has_attacked,
            battle: t.battle.map(|b| BattleView {
                attacker: b.attacker,
                attackers: b.pool,
                elapsed: b.elapsed(),
            }),
        }
    }
}

/// One convoy as drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvoyView {
    /// Convoy id.
    pub id: ConvoyId,
    /// Owner.
    pub owner: Faction,
    /// Origin territory.
    pub origin: TerritoryId,
    /// Target territory.
    pub target: TerritoryId,
    /// Current position.
    pub position: Point,
    /// Units carried.
    pub units: u32,
}

impl From<&Convoy> for ConvoyView {
    fn from(c: &Convoy) -> Self {
        Self {
            id: c.id,
            owner: c.owner,
            origin: c.origin,
            target: c.target,
            position: c.position(),
            units: c.payload.total(),
        }
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Turn number.
    pub turn: u32,
    /// Turn phase.
    pub phase: TurnPhase,
    /// Player gold.
    pub gold: u32,
    /// Seconds of play.
    pub elapsed: f32,
    /// Speed multiplier.
    pub speed: f32,
    /// Player send percent.
    pub send_percent: u32,
    /// Player formation.
    pub formation: Formation,
    /// Driver paused.
    pub paused: bool,
    /// Battles frozen.
    pub battle_paused: bool,
    /// Territories in id order.
    pub territories: Vec<TerritoryView>,
    /// Convoys in flight.
    pub convoys: Vec<ConvoyView>,
    /// Latched terminal result.
    pub result: Option<Outcome>,
}

impl Snapshot {
    /// Territories owned by a faction.
    #[must_use]
    pub fn owned_by(&self, faction: Faction) -> usize {
        self.territories.iter().filter(|t| t.owner == faction).count()
    }
}

/// Format seconds as `m:ss`.
#[must_use]
pub fn format_clock(seconds: f32) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

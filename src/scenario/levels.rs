//! Built-in campaign levels.
//!
//! Positions and radii are fractions of the map width and height, so a
//! level fits any area. Adjacency is not stored; it is built with the same
//! linking routine as skirmish maps.

use rand::Rng;

use crate::config::MapConfig;
use crate::error::MapGenError;
use crate::game::{Difficulty, Faction, FactionId, Garrison, Point, Territory, TerritoryMap};
use crate::scenario::mapgen::{Scenario, cell_size, link_territories, outline, seed_garrison, territory_name};

/// One territory of a level layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelNode {
    /// Horizontal position as a fraction of the width.
    pub x: f32,
    /// Vertical position as a fraction of the height.
    pub y: f32,
    /// Radius as a fraction of the width.
    pub radius: f32,
    /// Raw owner id.
    pub owner: FactionId,
    /// Starting garrison size.
    pub units: u32,
    /// Growth rate.
    pub growth: f32,
}

/// A campaign level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Level {
    /// AI strength for the level.
    pub difficulty: Difficulty,
    /// Territory layout.
    pub nodes: &'static [LevelNode],
}

impl Level {
    /// Highest AI faction id owning a territory at the start.
    #[must_use]
    pub fn max_ai_faction(&self) -> FactionId {
        self.nodes.iter().map(|n| n.owner).max().unwrap_or(1).max(1)
    }
}

const fn node(x: f32, y: f32, radius: f32, owner: FactionId, units: u32, growth: f32) -> LevelNode {
    LevelNode {
        x,
        y,
        radius,
        owner,
        units,
        growth,
    }
}

/// Number of campaign levels.
pub const LEVEL_COUNT: usize = 15;

/// All campaign levels, easiest first.
pub const LEVELS: [Level; LEVEL_COUNT] = [
    Level {
        difficulty: Difficulty::Easy,
        nodes: &[
            node(0.2, 0.5, 0.06, 1, 24, 2.2),
            node(0.5, 0.3, 0.055, 0, 16, 1.8),
            node(0.5, 0.7, 0.055, 0, 16, 1.8),
            node(0.8, 0.5, 0.06, 2, 24, 2.2),
        ],
    },
    Level {
        difficulty: Difficulty::Easy,
        nodes: &[
            node(0.15, 0.5, 0.06, 1, 26, 2.2),
            node(0.35, 0.25, 0.05, 0, 18, 1.6),
            node(0.35, 0.75, 0.05, 0, 18, 1.6),
            node(0.65, 0.25, 0.05, 0, 18, 1.6),
            node(0.65, 0.75, 0.05, 0, 18, 1.6),
            node(0.85, 0.5, 0.06, 2, 26, 2.2),
        ],
    },
    Level {
        difficulty: Difficulty::Normal,
        nodes: &[
            node(0.2, 0.5, 0.06, 1, 26, 2.4),
            node(0.5, 0.2, 0.05, 0, 20, 1.8),
            node(0.5, 0.5, 0.05, 0, 20, 1.8),
            node(0.5, 0.8, 0.05, 0, 20, 1.8),
            node(0.8, 0.35, 0.06, 2, 26, 2.4),
            node(0.8, 0.65, 0.06, 3, 26, 2.4),
        ],
    },
    Level {
        difficulty: Difficulty::Normal,
        nodes: &[
            node(0.15, 0.5, 0.06, 1, 26, 2.4),
            node(0.4, 0.3, 0.055, 0, 22, 1.9),
            node(0.4, 0.7, 0.055, 0, 22, 1.9),
            node(0.6, 0.3, 0.055, 0, 22, 1.9),
            node(0.6, 0.7, 0.055, 0, 22, 1.9),
            node(0.85, 0.4, 0.06, 2, 28, 2.4),
            node(0.85, 0.6, 0.06, 3, 28, 2.4),
        ],
    },
    Level {
        difficulty: Difficulty::Normal,
        nodes: &[
            node(0.2, 0.2, 0.06, 1, 28, 2.6),
            node(0.2, 0.8, 0.055, 0, 18, 1.7),
            node(0.5, 0.5, 0.05, 0, 22, 2.0),
            node(0.8, 0.2, 0.055, 0, 18, 1.7),
            node(0.8, 0.8, 0.06, 2, 28, 2.6),
            node(0.5, 0.2, 0.05, 3, 24, 2.2),
        ],
    },
    Level {
        difficulty: Difficulty::Normal,
        nodes: &[
            node(0.15, 0.5, 0.06, 1, 28, 2.6),
            node(0.35, 0.2, 0.05, 0, 20, 1.8),
            node(0.35, 0.5, 0.05, 0, 20, 1.8),
            node(0.35, 0.8, 0.05, 0, 20, 1.8),
            node(0.65, 0.2, 0.05, 0, 20, 1.8),
            node(0.65, 0.5, 0.05, 0, 20, 1.8),
            node(0.65, 0.8, 0.05, 0, 20, 1.8),
            node(0.85, 0.4, 0.06, 2, 30, 2.6),
            node(0.85, 0.6, 0.06, 3, 30, 2.6),
        ],
    },
    Level {
        difficulty: Difficulty::Normal,
        nodes: &[
            node(0.2, 0.5, 0.06, 1, 30, 2.6),
            node(0.45, 0.25, 0.05, 0, 22, 1.9),
            node(0.45, 0.75, 0.05, 0, 22, 1.9),
            node(0.55, 0.5, 0.05, 0, 22, 1.9),
            node(0.75, 0.3, 0.06, 2, 30, 2.6),
            node(0.75, 0.7, 0.06, 3, 30, 2.6),
        ],
    },
    Level {
        difficulty: Difficulty::Hard,
        nodes: &[
            node(0.18, 0.5, 0.06, 1, 30, 2.7),
            node(0.4, 0.2, 0.05, 0, 22, 1.9),
            node(0.4, 0.5, 0.05, 0, 22, 1.9),
            node(0.4, 0.8, 0.05, 0, 22, 1.9),
            node(0.6, 0.2, 0.05, 0, 22, 1.9),
            node(0.6, 0.5, 0.05, 0, 22, 1.9),
            node(0.6, 0.8, 0.05, 0, 22, 1.9),
            node(0.82, 0.3, 0.06, 2, 32, 2.7),
            node(0.82, 0.5, 0.06, 3, 32, 2.7),
            node(0.82, 0.7, 0.06, 4, 32, 2.7),
        ],
    },
    Level {
        difficulty: Difficulty::Hard,
        nodes: &[
            node(0.2, 0.2, 0.06, 1, 32, 2.8),
            node(0.2, 0.8, 0.055, 0, 24, 2.1),
            node(0.5, 0.2, 0.055, 0, 24, 2.1),
            node(0.5, 0.8, 0.055, 0, 24, 2.1),
            node(0.5, 0.5, 0.05, 0, 24, 2.1),
            node(0.8, 0.2, 0.06, 2, 32, 2.8),
            node(0.8, 0.5, 0.06, 3, 32, 2.8),
            node(0.8, 0.8, 0.06, 4, 32, 2.8),
        ],
    },
    Level {
        difficulty: Difficulty::Hard,
        nodes: &[
            node(0.2, 0.5, 0.06, 1, 34, 2.9),
            node(0.35, 0.3, 0.05, 0, 26, 2.1),
            node(0.35, 0.7, 0.05, 0, 26, 2.1),
            node(0.5, 0.5, 0.05, 0, 26, 2.1),
            node(0.65, 0.3, 0.05, 0, 26, 2.1),
            node(0.65, 0.7, 0.05, 0, 26, 2.1),
            node(0.8, 0.3, 0.06, 2, 34, 2.9),
            node(0.8, 0.5, 0.06, 3, 34, 2.9),
            node(0.8, 0.7, 0.06, 4, 34, 2.9),
        ],
    },
    Level {
        difficulty: Difficulty::Hard,
        nodes: &[
            node(0.15, 0.5, 0.06, 1, 34, 3.0),
            node(0.35, 0.2, 0.05, 0, 26, 2.2),
            node(0.35, 0.5, 0.05, 0, 26, 2.2),
            node(0.35, 0.8, 0.05, 0, 26, 2.2),
            node(0.55, 0.3, 0.05, 0, 26, 2.2),
            node(0.55, 0.7, 0.05, 0, 26, 2.2),
            node(0.75, 0.3, 0.06, 2, 36, 3.0),
            node(0.75, 0.7, 0.06, 3, 36, 3.0),
            node(0.85, 0.5, 0.06, 4, 36, 3.0),
        ],
    },
    Level {
        difficulty: Difficulty::Hard,
        nodes: &[
            node(0.2, 0.2, 0.06, 1, 36, 3.1),
            node(0.2, 0.8, 0.055, 0, 28, 2.4),
            node(0.4, 0.5, 0.05, 0, 28, 2.4),
            node(0.6, 0.5, 0.05, 0, 28, 2.4),
            node(0.8, 0.2, 0.06, 2, 36, 3.1),
            node(0.8, 0.5, 0.06, 3, 36, 3.1),
            node(0.8, 0.8, 0.06, 4, 36, 3.1),
        ],
    },
    Level {
        difficulty: Difficulty::Hard,
        nodes: &[
            node(0.15, 0.5, 0.06, 1, 36, 3.2),
            node(0.35, 0.25, 0.05, 0, 28, 2.4),
            node(0.35, 0.75, 0.05, 0, 28, 2.4),
            node(0.5, 0.5, 0.05, 0, 28, 2.4),
            node(0.7, 0.3, 0.06, 2, 38, 3.2),
            node(0.7, 0.7, 0.06, 3, 38, 3.2),
            node(0.85, 0.5, 0.06, 4, 38, 3.2),
        ],
    },
    Level {
        difficulty: Difficulty::Hard,
        nodes: &[
            node(0.2, 0.5, 0.06, 1, 38, 3.3),
            node(0.4, 0.25, 0.05, 0, 30, 2.6),
            node(0.4, 0.5, 0.05, 0, 30, 2.6),
            node(0.4, 0.75, 0.05, 0, 30, 2.6),
            node(0.6, 0.25, 0.05, 0, 30, 2.6),
            node(0.6, 0.5, 0.05, 0, 30, 2.6),
            node(0.6, 0.75, 0.05, 0, 30, 2.6),
            node(0.8, 0.3, 0.06, 2, 40, 3.3),
            node(0.8, 0.5, 0.06, 3, 40, 3.3),
            node(0.8, 0.7, 0.06, 4, 40, 3.3),
        ],
    },
    Level {
        difficulty: Difficulty::Hard,
        nodes: &[
            node(0.15, 0.5, 0.06, 1, 40, 3.4),
            node(0.35, 0.2, 0.05, 0, 32, 2.8),
            node(0.35, 0.5, 0.05, 0, 32, 2.8),
            node(0.35, 0.8, 0.05, 0, 32, 2.8),
            node(0.55, 0.3, 0.05, 0, 32, 2.8),
            node(0.55, 0.7, 0.05, 0, 32, 2.8),
            node(0.75, 0.2, 0.06, 2, 42, 3.4),
            node(0.75, 0.5, 0.06, 3, 42, 3.4),
            node(0.75, 0.8, 0.06, 4, 42, 3.4),
            node(0.9, 0.5, 0.06, 5, 42, 3.4),
        ],
    },
];

/// Look up a level by zero-based index.
///
/// # Errors
///
/// Returns [`MapGenError::UnknownLevel`] past the last level.
pub fn level(index: usize) -> Result<&'static Level, MapGenError> {
    LEVELS.get(index).ok_or(MapGenError::UnknownLevel(index))
}

/// Build a campaign level on the configured map area.
///
/// # Errors
///
/// Returns an error for an unknown level, an empty area, or a node with an
/// owner id outside the supported range.
pub fn build_level(
    index: usize,
    config: &MapConfig,
    rng: &mut impl Rng,
) -> Result<Scenario, MapGenError> {
    let level = level(index)?;
    if config.width <= 0.0 || config.height <= 0.0 {
        return Err(MapGenError::EmptyArea);
    }

    let mut territories = Vec::with_capacity(level.nodes.len());
    for (idx, spec) in level.nodes.iter().enumerate() {
        let owner = Faction::from_id(spec.owner)
            .ok_or(MapGenError::TooManyFactions(usize::from(spec.owner)))?;
        let center = Point::new(spec.x * config.width, spec.y * config.height);
        let radius = spec.radius * config.width;

        let mut territory = Territory::new(idx, territory_name(idx), center, radius);
        territory.outline = outline(center, radius, rng);
        territory.owner = owner;
        territory.garrison = Garrison::of(seed_garrison(spec.units));
        territory.growth_rate = spec.growth;
        territories.push(territory);
    }

    let mut map = TerritoryMap::new(territories);
    let (_, _, cell_w, cell_h) = cell_size(map.len(), config.width, config.height);
    link_territories(&mut map, config, cell_w.max(cell_h) * config.max_edge_factor, rng);

    Ok(Scenario {
        map,
        max_ai_faction: level.max_ai_faction(),
    })
}

//! Territory graph generation.
//!
//! Territories sit on a loose grid with jitter. Each rolls a personal degree
//! cap and links to its nearest neighbours within the maximum edge length
//! until the cap is reached; a repair pass then joins isolated territories
//! and disconnected components, never exceeding the hard degree cap.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::{MAX_AI_FACTIONS, MapConfig};
use crate::error::MapGenError;
use crate::game::{
    Faction, FactionId, Formation, Garrison, Point, Squad, Territory, TerritoryId, TerritoryMap,
    roll_gold_income,
};

/// Smallest territory radius on a skirmish map.
const MIN_RADIUS: f32 = 34.0;

/// Spread of territory radii on a skirmish map.
const RADIUS_SPREAD: f32 = 18.0;

/// Jitter around the cell centre, as a fraction of the cell size.
const CELL_JITTER: f32 = 0.3;

/// Player home target, as a fraction of the map size.
const PLAYER_HOME: (f32, f32) = (0.1, 0.5);

const NAMES: [&str; 32] = [
    "Ashford", "Brinmoor", "Calder", "Dunhollow", "Eastmere", "Fallow", "Glenreach", "Harrow",
    "Ironvale", "Juniper", "Kestrel", "Lowmarch", "Mirefield", "Northwatch", "Oakhurst",
    "Pinecrest", "Quarry", "Redfen", "Saltmarsh", "Thornby", "Umber", "Vantage", "Westfold",
    "Yarrow", "Zephyr Rise", "Coldwater", "Stonegate", "Highgarden", "Blackmoor", "Silverbrook",
    "Emberfall", "Greyhaven",
];

/// A generated map together with the factions in play.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Territories with owners, garrisons and adjacency.
    pub map: TerritoryMap,
    /// Highest AI faction id in play.
    pub max_ai_faction: FactionId,
}

/// Display name for the territory at `index`.
#[must_use]
pub fn territory_name(index: usize) -> String {
    let name = NAMES[index % NAMES.len()];
    match index / NAMES.len() {
        0 => name.to_string(),
        round => format!("{name} {}", round + 1),
    }
}

/// Split a seed garrison 35 / 45 / 20 across shield / sword / archer.
#[must_use]
pub fn seed_garrison(size: u32) -> Squad {
    let ratio = Formation::Balanced.ratio();
    let part = |percent: u32| {
        u32::try_from(u64::from(size) * u64::from(percent) / 100).unwrap_or(size)
    };
    let shield = part(ratio.shield);
    let archer = part(ratio.archer);
    Squad::new(shield, size - shield - archer, archer)
}

/// Grid cell size used for `count` territories in a `width × height` area.
#[must_use]
pub fn cell_size(count: usize, width: f32, height: f32) -> (usize, usize, f32, f32) {
    let count = count.max(1);
    let cols = ((count as f32 * width / height).sqrt().ceil() as usize).max(1);
    let rows = count.div_ceil(cols).max(1);
    (cols, rows, width / cols as f32, height / rows as f32)
}

/// Irregular polygon outline around a territory.
pub fn outline(center: Point, radius: f32, rng: &mut impl Rng) -> Vec<Point> {
    let vertices = rng.gen_range(5..=8);
    let base = radius * 1.2;
    (0..vertices)
        .map(|i| {
            let angle = i as f32 * TAU / vertices as f32 + rng.gen_range(-0.15..=0.15);
            let r = base * rng.gen_range(0.7..=1.3);
            Point::new(center.x + angle.cos() * r, center.y + angle.sin() * r)
        })
        .collect()
}

/// Generate a random skirmish map.
///
/// # Errors
///
/// Returns an error if the area is empty, there are too many AI factions,
/// or there are fewer territories than factions.
pub fn generate_skirmish(config: &MapConfig, rng: &mut impl Rng) -> Result<Scenario, MapGenError> {
    if config.width <= 0.0 || config.height <= 0.0 {
        return Err(MapGenError::EmptyArea);
    }
    if config.ai_factions > MAX_AI_FACTIONS {
        return Err(MapGenError::TooManyFactions(config.ai_factions));
    }
    let needed = config.ai_factions + 1;
    if config.territories < needed {
        return Err(MapGenError::TooFewTerritories {
            requested: config.territories,
            needed,
        });
    }

    let (cols, rows, cell_w, cell_h) = cell_size(config.territories, config.width, config.height);
    let mut cells: Vec<usize> = (0..cols * rows).collect();
    cells.shuffle(rng);
    cells.truncate(config.territories);
    cells.sort_unstable();

    let mut territories = Vec::with_capacity(config.territories);
    for (idx, cell) in cells.into_iter().enumerate() {
        let (col, row) = (cell % cols, cell / cols);
        let jitter_x = rng.gen_range(-CELL_JITTER..=CELL_JITTER) * cell_w;
        let jitter_y = rng.gen_range(-CELL_JITTER..=CELL_JITTER) * cell_h;
        let center = Point::new(
            (col as f32 + 0.5) * cell_w + jitter_x,
            (row as f32 + 0.5) * cell_h + jitter_y,
        );
        let radius =
            (MIN_RADIUS + rng.gen_range(0.0..RADIUS_SPREAD)).min(cell_w.min(cell_h) * 0.4);

        let mut territory = Territory::new(idx, territory_name(idx), center, radius);
        territory.outline = outline(center, radius, rng);
        let size = rng.gen_range(config.garrison_min..=config.garrison_max);
        territory.garrison = Garrison::of(seed_garrison(size));
        territory.growth_rate = roll_range(rng, config.growth_min, config.growth_max);
        territories.push(territory);
    }

    let mut map = TerritoryMap::new(territories);
    let max_edge = cell_w.max(cell_h) * config.max_edge_factor;
    link_territories(&mut map, config, max_edge, rng);

    let homes = pick_homes(&map, config, needed);
    for (slot, id) in homes.into_iter().enumerate() {
        let (faction, size) = if slot == 0 {
            (Faction::Player, config.player_start)
        } else {
            let ai = FactionId::try_from(slot + 1).map_err(|_| MapGenError::TooManyFactions(slot))?;
            (Faction::Ai(ai), config.ai_start)
        };
        if let Some(territory) = map.get_mut(id) {
            territory.owner = faction;
            territory.garrison = Garrison::of(seed_garrison(size));
        }
    }

    let max_ai_faction = FactionId::try_from(config.ai_factions + 1)
        .map_err(|_| MapGenError::TooManyFactions(config.ai_factions))?;
    Ok(Scenario {
        map,
        max_ai_faction,
    })
}

/// Roll gold income for every player territory of a freshly built map.
pub fn roll_player_income(map: &mut TerritoryMap, range: (f32, f32), rng: &mut impl Rng) {
    for territory in map.iter_mut().filter(|t| t.owner == Faction::Player) {
        territory.gold_income = roll_gold_income(rng, range);
    }
}

fn roll_range(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.gen_range(lo..hi) } else { lo }
}

/// Player home nearest the left-middle, AI homes by farthest-point selection.
fn pick_homes(map: &TerritoryMap, config: &MapConfig, count: usize) -> Vec<TerritoryId> {
    let target = Point::new(config.width * PLAYER_HOME.0, config.height * PLAYER_HOME.1);
    let Some(player) = map
        .iter()
        .min_by(|a, b| a.position.distance(target).total_cmp(&b.position.distance(target)))
        .map(|t| t.id)
    else {
        return Vec::new();
    };

    let mut homes = vec![player];
    while homes.len() < count {
        let next = map
            .iter()
            .filter(|t| !homes.contains(&t.id))
            .map(|t| {
                let nearest = homes
                    .iter()
                    .filter_map(|&h| map.get(h))
                    .map(|h| h.position.distance(t.position))
                    .fold(f32::INFINITY, f32::min);
                (t.id, nearest)
            })
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id);
        match next {
            Some(id) => homes.push(id),
            None => break,
        }
    }
    homes
}

/// Build adjacency: nearest-neighbour linking under personal caps, then
/// isolation and connectivity repair under the hard cap.
pub fn link_territories(
    map: &mut TerritoryMap,
    config: &MapConfig,
    max_edge: f32,
    rng: &mut impl Rng,
) {
    let count = map.len();
    let hard_cap = config.hard_degree_cap;
    let caps: Vec<usize> = (0..count)
        .map(|_| rng.gen_range(config.min_degree..=config.max_degree).min(hard_cap))
        .collect();

    for id in 0..count {
        for other in by_distance(map, id) {
            if map.degree(id) >= caps[id] {
                break;
            }
            if distance(map, id, other) > max_edge {
                break;
            }
            if map.degree(other) < caps[other] {
                map.link(id, other);
            }
        }
    }

    for id in 0..count {
        if map.degree(id) > 0 {
            continue;
        }
        if let Some(other) = by_distance(map, id)
            .into_iter()
            .find(|&other| map.degree(other) < hard_cap)
        {
            map.link(id, other);
        }
    }

    connect_components(map, hard_cap);
}

/// Other territories ordered by distance from `id`.
fn by_distance(map: &TerritoryMap, id: TerritoryId) -> Vec<TerritoryId> {
    let mut others: Vec<TerritoryId> = (0..map.len()).filter(|&o| o != id).collect();
    others.sort_by(|&a, &b| distance(map, id, a).total_cmp(&distance(map, id, b)));
    others
}

fn distance(map: &TerritoryMap, a: TerritoryId, b: TerritoryId) -> f32 {
    match (map.get(a), map.get(b)) {
        (Some(a), Some(b)) => a.position.distance(b.position),
        _ => f32::INFINITY,
    }
}

/// Connected component index per territory.
#[must_use]
pub fn components(map: &TerritoryMap) -> Vec<usize> {
    let mut component = vec![usize::MAX; map.len()];
    let mut next = 0;
    for start in 0..map.len() {
        if component[start] != usize::MAX {
            continue;
        }
        component[start] = next;
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            let Some(territory) = map.get(id) else {
                continue;
            };
            for &n in &territory.neighbors {
                if component[n] == usize::MAX {
                    component[n] = next;
                    queue.push_back(n);
                }
            }
        }
        next += 1;
    }
    component
}

/// Join components with the shortest link between territories that still
/// have room under the hard cap.
fn connect_components(map: &mut TerritoryMap, hard_cap: usize) {
    loop {
        let component = components(map);
        if component.iter().all(|&c| c == 0) {
            return;
        }

        let mut best: Option<(TerritoryId, TerritoryId, f32)> = None;
        for a in (0..map.len()).filter(|&a| component[a] == 0 && map.degree(a) < hard_cap) {
            for b in (0..map.len()).filter(|&b| component[b] != 0 && map.degree(b) < hard_cap) {
                let d = distance(map, a, b);
                if best.is_none_or(|(_, _, top)| d < top) {
                    best = Some((a, b, d));
                }
            }
        }

        match best {
            Some((a, b, _)) => {
                map.link(a, b);
            }
            None => return,
        }
    }
}

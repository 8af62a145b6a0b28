//! Map construction: random skirmish maps and the built-in campaign.

mod levels;
mod mapgen;

pub use levels::{LEVEL_COUNT, LEVELS, Level, LevelNode, build_level, level};
pub use mapgen::{
    Scenario, cell_size, components, generate_skirmish, link_territories, outline,
    roll_player_income, seed_garrison, territory_name,
};

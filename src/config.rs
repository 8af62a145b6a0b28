//! Engine configuration.
//!
//! Every field has a default, so a JSON file only needs the values it
//! overrides:
//!
//! ```json
//! { "map": { "territories": 30 }, "ai": { "difficulty": "Hard" } }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::game::{Aggression, Difficulty, Formation, MAX_DEGREE, PriceList};

/// Most AI factions a game can have.
pub const MAX_AI_FACTIONS: usize = 6;

/// Map builder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Territories on a skirmish map.
    pub territories: usize,
    /// Width of the map area.
    pub width: f32,
    /// Height of the map area.
    pub height: f32,
    /// AI factions on a skirmish map.
    pub ai_factions: usize,
    /// Smallest personal degree cap rolled per territory.
    pub min_degree: usize,
    /// Largest personal degree cap rolled per territory.
    pub max_degree: usize,
    /// Degree no territory may exceed, even when repairing connectivity.
    pub hard_degree_cap: usize,
    /// Longest allowed link, as a multiple of the grid cell size.
    pub max_edge_factor: f32,
    /// Smallest neutral seed garrison.
    pub garrison_min: u32,
    /// Largest neutral seed garrison.
    pub garrison_max: u32,
    /// Player home garrison.
    pub player_start: u32,
    /// AI home garrison.
    pub ai_start: u32,
    /// Lowest rolled growth rate.
    pub growth_min: f32,
    /// Highest rolled growth rate.
    pub growth_max: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            territories: 24,
            width: 1600.0,
            height: 900.0,
            ai_factions: 3,
            min_degree: 2,
            max_degree: 4,
            hard_degree_cap: MAX_DEGREE,
            max_edge_factor: 1.9,
            garrison_min: 15,
            garrison_max: 35,
            player_start: 30,
            ai_start: 28,
            growth_min: 2.0,
            growth_max: 4.0,
        }
    }
}

/// Economy settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Gold at game start.
    pub starting_gold: u32,
    /// Per-territory turn-end base income. Unset means 5.
    pub base_income: Option<u32>,
    /// Unit and building prices.
    pub prices: PriceList,
    /// Lowest rolled gold income, gold per second.
    pub gold_income_min: f32,
    /// Highest rolled gold income, gold per second.
    pub gold_income_max: f32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_gold: 150,
            base_income: None,
            prices: PriceList::default(),
            gold_income_min: 1.0,
            gold_income_max: 3.0,
        }
    }
}

impl EconomyConfig {
    /// Gold income roll range.
    #[must_use]
    pub const fn gold_income_range(&self) -> (f32, f32) {
        (self.gold_income_min, self.gold_income_max)
    }
}

/// Transfer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticsConfig {
    /// Convoy speed in map units per second.
    pub convoy_speed: f32,
    /// Initial player send percent.
    pub send_percent: u32,
    /// Initial player formation.
    pub formation: Formation,
}

impl Default for LogisticsConfig {
    fn default() -> Self {
        Self {
            convoy_speed: 480.0,
            send_percent: 50,
            formation: Formation::Balanced,
        }
    }
}

/// Fixed-step driver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Simulation step in seconds.
    pub step: f32,
    /// Longest frame delta accepted before clamping.
    pub max_frame_delta: f32,
    /// Initial speed multiplier.
    pub speed: f32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            step: 1.0 / 60.0,
            max_frame_delta: 0.05,
            speed: 1.0,
        }
    }
}

/// AI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AiConfig {
    /// Selects the AI send percent options.
    pub difficulty: Difficulty,
    /// Bias towards attacking the player.
    pub aggression: Aggression,
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Map builder.
    pub map: MapConfig,
    /// Economy.
    pub economy: EconomyConfig,
    /// Transfers.
    pub logistics: LogisticsConfig,
    /// Fixed-step driver.
    pub driver: DriverConfig,
    /// AI factions.
    pub ai: AiConfig,
}

impl EngineConfig {
    /// Load and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON for the
    /// schema, or fails [`validate`](Self::validate).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| Err(ConfigError::Invalid(reason));
        let map = &self.map;

        if map.territories == 0 {
            return invalid("map.territories must be positive".into());
        }
        if !(1..=MAX_AI_FACTIONS).contains(&map.ai_factions) {
            return invalid(format!(
                "map.ai_factions must be in 1..={MAX_AI_FACTIONS}, got {}",
                map.ai_factions
            ));
        }
        if map.width <= 0.0 || map.height <= 0.0 {
            return invalid("map.width and map.height must be positive".into());
        }
        if map.hard_degree_cap == 0 || map.hard_degree_cap > MAX_DEGREE {
            return invalid(format!("map.hard_degree_cap must be in 1..={MAX_DEGREE}"));
        }
        if map.min_degree == 0
            || map.min_degree > map.max_degree
            || map.max_degree > map.hard_degree_cap
        {
            return invalid("map degree caps must satisfy 1 <= min <= max <= hard cap".into());
        }
        if map.max_edge_factor <= 0.0 {
            return invalid("map.max_edge_factor must be positive".into());
        }
        if map.garrison_min > map.garrison_max {
            return invalid("map.garrison_min exceeds map.garrison_max".into());
        }
        if map.growth_min > map.growth_max {
            return invalid("map.growth_min exceeds map.growth_max".into());
        }
        if self.economy.gold_income_min > self.economy.gold_income_max {
            return invalid("economy.gold_income_min exceeds economy.gold_income_max".into());
        }
        if self.logistics.convoy_speed <= 0.0 {
            return invalid("logistics.convoy_speed must be positive".into());
        }
        if !(1..=100).contains(&self.logistics.send_percent) {
            return invalid("logistics.send_percent must be in 1..=100".into());
        }
        if self.driver.step <= 0.0 {
            return invalid("driver.step must be positive".into());
        }
        if self.driver.max_frame_delta < self.driver.step {
            return invalid("driver.max_frame_delta must be at least one step".into());
        }
        if self.driver.speed <= 0.0 {
            return invalid("driver.speed must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.ai.aggression.probability) {
            return invalid("ai.aggression.probability must be in 0..=1".into());
        }
        Ok(())
    }
}

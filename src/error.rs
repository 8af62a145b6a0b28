//! Error types for map building and configuration.
//!
//! Engine commands never fail with an error; they are accepted or ignored.
//! Errors only arise while setting a game up.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Failure to build a territory map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapGenError {
    /// Fewer territories requested than factions need homes.
    TooFewTerritories {
        /// Territories requested.
        requested: usize,
        /// Territories needed.
        needed: usize,
    },
    /// The bounding area has no usable size.
    EmptyArea,
    /// More AI factions than ids available.
    TooManyFactions(usize),
    /// Campaign level index out of range.
    UnknownLevel(usize),
}

impl fmt::Display for MapGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewTerritories { requested, needed } => {
                write!(f, "{requested} territories requested, need at least {needed}")
            }
            Self::EmptyArea => write!(f, "map area must have positive width and height"),
            Self::TooManyFactions(count) => write!(f, "too many AI factions: {count}"),
            Self::UnknownLevel(index) => write!(f, "no campaign level {index}"),
        }
    }
}

impl std::error::Error for MapGenError {}

/// Failure to load or validate an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// The file is not valid JSON for the config schema.
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
    /// A value is out of range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Parse { path, source } => write!(f, "invalid config {}: {source}", path.display()),
            Self::Invalid(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Any error the crate reports.
#[derive(Debug)]
pub enum SwarmError {
    /// Map building failed.
    MapGen(MapGenError),
    /// Configuration failed.
    Config(ConfigError),
}

impl fmt::Display for SwarmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MapGen(e) => write!(f, "map generation failed: {e}"),
            Self::Config(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SwarmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MapGen(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

impl From<MapGenError> for SwarmError {
    fn from(e: MapGenError) -> Self {
        Self::MapGen(e)
    }
}

impl From<ConfigError> for SwarmError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

//! Faction identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw faction identifier as used on the wire and in level layouts.
///
/// `0` is neutral, `1` is the human player, `2..` are AI factions.
pub type FactionId = u8;

/// Highest AI faction id the engine supports.
pub const MAX_FACTION_ID: FactionId = 7;

/// The owner of a territory, convoy or attacking force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// Unowned territory. Never attacks and never grows.
    Neutral,
    /// The human player.
    Player,
    /// An AI faction. The wrapped id is always in `2..=MAX_FACTION_ID`.
    Ai(FactionId),
}

impl Faction {
    /// Map a raw id onto a faction.
    ///
    /// Returns `None` for ids above [`MAX_FACTION_ID`].
    #[must_use]
    pub const fn from_id(id: FactionId) -> Option<Self> {
        match id {
            0 => Some(Self::Neutral),
            1 => Some(Self::Player),
            2..=MAX_FACTION_ID => Some(Self::Ai(id)),
            _ => None,
        }
    }

    /// Raw id of this faction.
    #[must_use]
    pub const fn id(self) -> FactionId {
        match self {
            Self::Neutral => 0,
            Self::Player => 1,
            Self::Ai(id) => id,
        }
    }

    /// True for the player and every AI faction.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Neutral)
    }

    /// True for AI factions only.
    #[must_use]
    pub const fn is_ai(self) -> bool {
        matches!(self, Self::Ai(_))
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Neutral => write!(f, "neutral"),
            Self::Player => write!(f, "player"),
            Self::Ai(id) => write!(f, "ai-{id}"),
        }
    }
}

/// AI strength setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    /// Small transfers.
    Easy,
    /// Default.
    #[default]
    Normal,
    /// Large transfers.
    Hard,
}

impl Difficulty {
    /// Percent options an AI faction picks from for each transfer.
    #[must_use]
    pub const fn send_percent_options(self) -> [u32; 3] {
        match self {
            Self::Easy => [30, 40, 50],
            Self::Normal => [40, 50, 60],
            Self::Hard => [50, 60, 70],
        }
    }
}

// Sides, phases, and schedule slots.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two teams in a draft. `Team1` conventionally holds first pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Team1,
    Team2,
}

impl Side {
    /// The other team.
    pub fn opponent(self) -> Side {
        match self {
            Side::Team1 => Side::Team2,
            Side::Team2 => Side::Team1,
        }
    }

    /// Parse a side from loose input.
    ///
    /// Accepts "team1"/"1"/"blue" and "team2"/"2"/"red", case-insensitively.
    pub fn from_str_side(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "team1" | "1" | "blue" => Some(Side::Team1),
            "team2" | "2" | "red" => Some(Side::Team2),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Side::Team1 => "team1",
            Side::Team2 => "team2",
        }
    }

    /// Array index for per-side tables.
    pub(crate) fn index(self) -> usize {
        match self {
            Side::Team1 => 0,
            Side::Team2 => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a slot bans a champion or picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Ban,
    Pick,
}

impl Phase {
    pub fn from_str_phase(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ban" | "bans" => Some(Phase::Ban),
            "pick" | "picks" => Some(Phase::Pick),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Ban => "ban",
            Phase::Pick => "pick",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Phase::Ban => 0,
            Phase::Pick => 1,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single position in the draft schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Zero-based position in the full schedule.
    pub index: usize,
    pub phase: Phase,
    pub side: Side,
    /// Zero-based index of the schedule block this slot belongs to.
    pub block: usize,
    /// Zero-based position within its block.
    pub position_in_block: usize,
}

//! Data structures for the game world
//!
//! Defines missions, player progress and leaderboard entries.

pub mod leaderboard;
pub mod mission;
pub mod progress;

pub use leaderboard::*;
pub use mission::*;
pub use progress::*;

use serde::{Deserialize, Serialize};

/// Mission difficulty tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn symbol(&self) -> &'static str {
        match self {
            Difficulty::Easy => "◆",
            Difficulty::Medium => "▲",
            Difficulty::Hard => "⬤",
        }
    }

    pub fn all() -> [Difficulty; 3] {
        [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "EASY"),
            Difficulty::Medium => write!(f, "MEDIUM"),
            Difficulty::Hard => write!(f, "HARD"),
        }
    }
}

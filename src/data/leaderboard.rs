//! Leaderboard entries and agent ranks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row on the leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: String,
    pub name: String,
    pub completed_levels: u32,
    pub total_time: String,      // HH:MM:SS
    pub rank: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A player's own profile row
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: String,
    pub name: String,
    pub completed_levels: Vec<u32>,
    pub total_time: String,
}

/// Agent rank earned by number of completed missions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AgentRank {
    Recruit,
    Analyst,
    FieldOperative,
    SeniorAgent,
    MasterCryptographer,
}

impl AgentRank {
    pub fn for_completed(count: usize) -> Self {
        match count {
            c if c >= 9 => AgentRank::MasterCryptographer,
            c if c >= 7 => AgentRank::SeniorAgent,
            c if c >= 5 => AgentRank::FieldOperative,
            c if c >= 3 => AgentRank::Analyst,
            _ => AgentRank::Recruit,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            AgentRank::Recruit => "🔰",
            AgentRank::Analyst => "🔍",
            AgentRank::FieldOperative => "🕶️",
            AgentRank::SeniorAgent => "🎖️",
            AgentRank::MasterCryptographer => "🏆",
        }
    }
}

impl std::fmt::Display for AgentRank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentRank::Recruit => write!(f, "Recruit"),
            AgentRank::Analyst => write!(f, "Analyst"),
            AgentRank::FieldOperative => write!(f, "Field Operative"),
            AgentRank::SeniorAgent => write!(f, "Senior Agent"),
            AgentRank::MasterCryptographer => write!(f, "Master Cryptographer"),
        }
    }
}

/// The agents shown when the leaderboard store is empty or unreachable
pub fn fallback_entries() -> Vec<LeaderboardEntry> {
    [
        ("1", "Agent Shadow", 10, "01:45:22", AgentRank::MasterCryptographer),
        ("2", "CodeBreaker", 9, "02:10:45", AgentRank::SeniorAgent),
        ("3", "CipherHunter", 8, "02:30:18", AgentRank::FieldOperative),
        ("4", "NightCoder", 7, "02:55:40", AgentRank::Analyst),
        ("5", "BinaryPhantom", 6, "03:15:50", AgentRank::Recruit),
    ]
    .into_iter()
    .map(|(id, name, completed, time, rank)| LeaderboardEntry {
        id: id.to_string(),
        name: name.to_string(),
        completed_levels: completed,
        total_time: time.to_string(),
        rank: rank.to_string(),
        created_at: None,
    })
    .collect()
}

/// Format a duration in seconds as HH:MM:SS
pub fn format_total_time(seconds: i64) -> String {
    let s = seconds.max(0);
    format!("{:02}:{:02}:{:02}", s / 3600, (s % 3600) / 60, s % 60)
}

/// Parse HH:MM:SS back into seconds
pub fn parse_total_time(text: &str) -> Option<i64> {
    let mut parts = text.trim().split(':').map(|p| p.parse::<i64>().ok());
    let (h, m, s) = (parts.next()??, parts.next()??, parts.next()??);
    if parts.next().is_some() || m >= 60 || s >= 60 {
        return None;
    }
    Some(h * 3600 + m * 60 + s)
}

//! Mission records and answer checks

use super::Difficulty;
use serde::{Deserialize, Serialize};

/// One puzzle in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionRecord {
    pub id: u32,                 // Dense from 1, also the unlock order
    pub title: String,
    pub brief: String,
    pub crypto_type: String,     // "Caesar Cipher", "Base64", ...
    pub difficulty: Difficulty,
    pub challenge: String,       // The ciphertext shown to the player
    pub hints: Vec<String>,
    pub answer: String,          // Canonical plaintext, for display
    pub solution: SolutionCheck,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationConstraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr: Option<QrConstraint>,
}

/// How a candidate answer is normalized and compared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SolutionCheck {
    /// Uppercase + trim, then equality
    ExactUpper { expected: String },
    /// Lowercase + trim, then equality (hashes, passwords)
    ExactLower { expected: String },
    /// Trim only
    Exact { expected: String },
    /// Lowercase + trim, then substring
    ContainsLower { expected: String },
    /// Uppercase + trim, every fragment must appear
    ContainsAllUpper { fragments: Vec<String> },
}

impl SolutionCheck {
    pub fn matches(&self, input: &str) -> bool {
        let trimmed = input.trim();
        match self {
            SolutionCheck::ExactUpper { expected } => trimmed.to_uppercase() == *expected,
            SolutionCheck::ExactLower { expected } => trimmed.to_lowercase() == *expected,
            SolutionCheck::Exact { expected } => trimmed == expected,
            SolutionCheck::ContainsLower { expected } => {
                trimmed.to_lowercase().contains(expected.as_str())
            }
            SolutionCheck::ContainsAllUpper { fragments } => {
                let normalized = trimmed.to_uppercase();
                fragments.iter().all(|f| normalized.contains(f.as_str()))
            }
        }
    }
}

/// A mission that must be completed at a physical place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConstraint {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    pub label: String,
}

/// A mission that needs a QR code scanned first
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QrConstraint {
    #[serde(default)]
    pub payload: Option<String>, // Expected content, if known
}

/// The side condition attached to a mission
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint<'a> {
    None,
    Location(&'a LocationConstraint),
    Qr(&'a QrConstraint),
}

impl MissionRecord {
    pub fn check_answer(&self, input: &str) -> bool {
        self.solution.matches(input)
    }

    /// The active side constraint. Location wins if a record sets both,
    /// which catalog validation rejects anyway.
    pub fn constraint(&self) -> Constraint<'_> {
        match (&self.location, &self.qr) {
            (Some(loc), _) => Constraint::Location(loc),
            (None, Some(qr)) => Constraint::Qr(qr),
            (None, None) => Constraint::None,
        }
    }

    pub fn requires_location(&self) -> bool {
        self.location.is_some()
    }

    pub fn requires_qr(&self) -> bool {
        self.qr.is_some()
    }

    pub fn hint(&self, index: usize) -> Option<&str> {
        self.hints.get(index).map(String::as_str)
    }
}

//! The mission catalog
//!
//! Missions ship as a JSON data file compiled into the binary. A different
//! file can be loaded at start-up; either way the catalog is validated once
//! and never changes afterwards.

use crate::data::{Difficulty, MissionRecord, ProgressLedger};
use serde::{Deserialize, Serialize};
use std::path::Path;

const EMBEDDED_MISSIONS: &str = include_str!("../../data/missions.json");

/// Problems found while loading a catalog
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("Catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Could not read catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog has no missions")]
    Empty,

    #[error("Mission ids must run 1..N in order: expected {expected}, found {found}")]
    IdOutOfOrder { expected: u32, found: u32 },

    #[error("Mission {0} has no hints")]
    NoHints(u32),

    #[error("Mission {0} sets both a location and a QR requirement")]
    ConflictingConstraints(u32),
}

#[derive(Deserialize)]
struct CatalogFile {
    missions: Vec<MissionRecord>,
}

/// What the mission list shows for each entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissionSummary {
    pub id: u32,
    pub name: String,
    pub difficulty: Difficulty,
    pub crypto_type: String,
    pub is_completed: bool,
    pub is_locked: bool,
}

/// Ordered, immutable list of missions
#[derive(Debug, Clone)]
pub struct Catalog {
    missions: Vec<MissionRecord>,
}

impl Catalog {
    /// The fifty missions bundled with the game
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_MISSIONS)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_missions(file.missions)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let body = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&body)
    }

    pub fn from_missions(missions: Vec<MissionRecord>) -> Result<Self, CatalogError> {
        if missions.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (index, mission) in missions.iter().enumerate() {
            let expected = index as u32 + 1;
            if mission.id != expected {
                return Err(CatalogError::IdOutOfOrder { expected, found: mission.id });
            }
            if mission.hints.is_empty() {
                return Err(CatalogError::NoHints(mission.id));
            }
            if mission.location.is_some() && mission.qr.is_some() {
                return Err(CatalogError::ConflictingConstraints(mission.id));
            }
        }
        Ok(Self { missions })
    }

    pub fn missions(&self) -> &[MissionRecord] {
        &self.missions
    }

    pub fn get(&self, id: u32) -> Option<&MissionRecord> {
        // Ids are dense from 1
        id.checked_sub(1).and_then(|i| self.missions.get(i as usize))
    }

    pub fn len(&self) -> u32 {
        self.missions.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.missions.is_empty()
    }

    /// The mission after `id`, if any
    pub fn next_after(&self, id: u32) -> Option<&MissionRecord> {
        self.get(id.saturating_add(1))
    }

    pub fn count_by_difficulty(&self, difficulty: Difficulty) -> usize {
        self.missions.iter().filter(|m| m.difficulty == difficulty).count()
    }

    /// Per-mission view for the mission list
    pub fn summaries(&self, progress: &ProgressLedger) -> Vec<MissionSummary> {
        self.missions
            .iter()
            .map(|m| MissionSummary {
                id: m.id,
                name: m.title.clone(),
                difficulty: m.difficulty,
                crypto_type: m.crypto_type.clone(),
                is_completed: progress.is_completed(m.id),
                is_locked: is_locked(m, progress),
            })
            .collect()
    }
}

/// A mission is locked if it lies past the frontier and was never completed
pub fn is_locked(mission: &MissionRecord, progress: &ProgressLedger) -> bool {
    mission.id > progress.current_level && !progress.is_completed(mission.id)
}

//! Player progress record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Everything persisted about a player's run.
///
/// Field names on the wire follow the saved format of earlier releases, so
/// existing progress files keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressLedger {
    #[serde(rename = "completedLevels", default)]
    pub completed: BTreeSet<u32>,

    /// Highest mission id the player may open
    #[serde(default = "first_level")]
    pub current_level: u32,

    #[serde(default)]
    pub hints_used: BTreeMap<u32, u32>,

    #[serde(default)]
    pub completion_dates: BTreeMap<u32, DateTime<Utc>>,
}

fn first_level() -> u32 {
    1
}

impl Default for ProgressLedger {
    fn default() -> Self {
        Self {
            completed: BTreeSet::new(),
            current_level: first_level(),
            hints_used: BTreeMap::new(),
            completion_dates: BTreeMap::new(),
        }
    }
}

impl ProgressLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completion. Returns true if the mission was newly completed.
    ///
    /// The first completion time sticks. The frontier only moves forward and
    /// never past the last mission.
    pub fn complete(&mut self, id: u32, catalog_size: u32, at: DateTime<Utc>) -> bool {
        let newly = self.completed.insert(id);
        self.completion_dates.entry(id).or_insert(at);

        let next = id.saturating_add(1).min(catalog_size.max(1));
        self.current_level = self.current_level.max(next);
        newly
    }

    /// Count one hint reveal, returns the new total for the mission
    pub fn record_hint(&mut self, id: u32) -> u32 {
        let count = self.hints_used.entry(id).or_insert(0);
        *count += 1;
        *count
    }

    pub fn is_completed(&self, id: u32) -> bool {
        self.completed.contains(&id)
    }

    pub fn hints_for(&self, id: u32) -> u32 {
        self.hints_used.get(&id).copied().unwrap_or(0)
    }

    pub fn total_hints(&self) -> u32 {
        self.hints_used.values().sum()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }
}

//! The progress ledger
//!
//! Single owner of the player's progress for a session. Loaded once when the
//! session starts, and written back in full after every change. Writes are
//! best effort: a failed save is logged and play continues on the in-memory
//! copy.

use crate::data::ProgressLedger;
use crate::game::Catalog;
use crate::store::ProgressStore;
use chrono::{DateTime, Utc};

/// Explicit answer to "reset all progress?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

/// One completed mission as the mission log shows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub id: u32,
    pub title: String,
    pub crypto_type: String,
    pub completed_at: Option<DateTime<Utc>>, // Missing in saves from older releases
    pub hints_used: u32,
}

pub struct Ledger {
    progress: ProgressLedger,
    store: Box<dyn ProgressStore>,
    catalog_size: u32,
    last_save_failed: bool,
}

impl Ledger {
    /// Load progress from the store. Missing or unreadable data starts a
    /// fresh ledger instead of failing.
    pub fn load(store: Box<dyn ProgressStore>, catalog_size: u32) -> Self {
        let progress = match store.load() {
            Ok(Some(document)) => match serde_json::from_str::<ProgressLedger>(&document) {
                Ok(progress) => {
                    tracing::info!(
                        completed = progress.completed_count(),
                        current_level = progress.current_level,
                        "Progress loaded"
                    );
                    progress
                }
                Err(e) => {
                    tracing::warn!("Saved progress is corrupt, starting fresh: {}", e);
                    ProgressLedger::default()
                }
            },
            Ok(None) => {
                tracing::info!("No saved progress, starting fresh");
                ProgressLedger::default()
            }
            Err(e) => {
                tracing::warn!("Could not read saved progress, starting fresh: {}", e);
                ProgressLedger::default()
            }
        };

        Self {
            progress,
            store,
            catalog_size,
            last_save_failed: false,
        }
    }

    pub fn progress(&self) -> &ProgressLedger {
        &self.progress
    }

    pub fn is_completed(&self, id: u32) -> bool {
        self.progress.is_completed(id)
    }

    pub fn hints_used(&self, id: u32) -> u32 {
        self.progress.hints_for(id)
    }

    pub fn completed_count(&self) -> usize {
        self.progress.completed_count()
    }

    pub fn current_level(&self) -> u32 {
        self.progress.current_level
    }

    pub fn completion_date(&self, id: u32) -> Option<DateTime<Utc>> {
        self.progress.completion_dates.get(&id).copied()
    }

    /// Whether the most recent save reached the store
    pub fn last_save_failed(&self) -> bool {
        self.last_save_failed
    }

    /// Completed missions in id order
    pub fn mission_log(&self, catalog: &Catalog) -> Vec<LogEntry> {
        catalog
            .missions()
            .iter()
            .filter(|m| self.is_completed(m.id))
            .map(|m| LogEntry {
                id: m.id,
                title: m.title.clone(),
                crypto_type: m.crypto_type.clone(),
                completed_at: self.completion_date(m.id),
                hints_used: self.hints_used(m.id),
            })
            .collect()
    }

    /// Mark a mission complete and unlock the next one.
    /// Returns true on the first completion of this mission.
    pub fn complete_mission(&mut self, id: u32) -> bool {
        let newly = self.progress.complete(id, self.catalog_size, Utc::now());
        tracing::info!(mission = id, newly, frontier = self.progress.current_level, "Mission complete");
        self.persist();
        newly
    }

    /// Count a hint reveal for a mission, returns the new total
    pub fn use_hint(&mut self, id: u32) -> u32 {
        let count = self.progress.record_hint(id);
        tracing::debug!(mission = id, count, "Hint used");
        self.persist();
        count
    }

    /// Wipe all progress. Does nothing unless confirmed.
    pub fn reset(&mut self, confirmation: Confirmation) -> bool {
        if confirmation != Confirmation::Confirmed {
            return false;
        }
        self.progress = ProgressLedger::default();
        tracing::warn!("Progress reset");
        self.persist();
        true
    }

    fn persist(&mut self) {
        let result = serde_json::to_string(&self.progress)
            .map_err(crate::store::StoreError::from)
            .and_then(|doc| self.store.save(&doc));

        self.last_save_failed = result.is_err();
        if let Err(e) = result {
            tracing::error!("Failed to save progress: {}", e);
        }
    }
}

/// Rough age of a timestamp, e.g. "3 hours ago"
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);
    let (count, unit) = match seconds {
        s if s < 60 => return "just now".to_string(),
        s if s < 3600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3600, "hour"),
        s if s < 30 * 86_400 => (s / 86_400, "day"),
        s if s < 365 * 86_400 => (s / (30 * 86_400), "month"),
        s => (s / (365 * 86_400), "year"),
    };
    let plural = if count == 1 { "" } else { "s" };
    format!("{} {}{} ago", count, unit, plural)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn ledger_with(store: &MemoryStore) -> Ledger {
        Ledger::load(Box::new(store.clone()), 50)
    }

    #[test]
    fn absent_data_yields_default() {
        let ledger = ledger_with(&MemoryStore::new());
        assert_eq!(ledger.progress(), &ProgressLedger::default());
    }

    #[test]
    fn corrupt_data_yields_default() {
        let ledger = ledger_with(&MemoryStore::with_document("{{{ not json"));
        assert_eq!(ledger.current_level(), 1);
        assert_eq!(ledger.completed_count(), 0);
    }

    #[test]
    fn every_mutation_is_persisted() {
        let store = MemoryStore::new();
        let mut ledger = ledger_with(&store);
        ledger.complete_mission(1);
        ledger.use_hint(2);
        ledger.reset(Confirmation::Confirmed);
        assert_eq!(store.write_count(), 3);
    }

    #[test]
    fn saved_document_loads_back() {
        let store = MemoryStore::new();
        let mut ledger = ledger_with(&store);
        ledger.complete_mission(1);
        ledger.use_hint(2);

        let reloaded = ledger_with(&store);
        assert_eq!(reloaded.progress(), ledger.progress());
    }

    #[test]
    fn complete_is_idempotent_and_keeps_first_timestamp() {
        let mut ledger = ledger_with(&MemoryStore::new());
        assert!(ledger.complete_mission(1));
        let first = ledger.completion_date(1);
        assert!(!ledger.complete_mission(1));
        assert_eq!(ledger.completion_date(1), first);
        assert_eq!(ledger.completed_count(), 1);
    }

    #[test]
    fn declined_reset_keeps_progress() {
        let store = MemoryStore::new();
        let mut ledger = ledger_with(&store);
        ledger.complete_mission(1);
        assert!(!ledger.reset(Confirmation::Declined));
        assert!(ledger.is_completed(1));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn failed_save_keeps_memory_state() {
        let store = MemoryStore::new().failing();
        let mut ledger = ledger_with(&store);
        ledger.complete_mission(1);
        assert!(ledger.is_completed(1));
        assert!(ledger.last_save_failed());
        assert!(store.document().is_none());
    }

    #[test]
    fn mission_log_lists_completions_in_id_order() {
        let catalog = Catalog::embedded().unwrap();
        let mut ledger = ledger_with(&MemoryStore::new());
        ledger.complete_mission(2);
        ledger.complete_mission(1);
        ledger.use_hint(2);
        ledger.use_hint(2);
        ledger.use_hint(5);

        let log = ledger.mission_log(&catalog);
        let ids: Vec<u32> = log.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(log[0].crypto_type, "Caesar Cipher");
        assert_eq!(log[1].hints_used, 2);
        assert!(log.iter().all(|e| e.completed_at.is_some()));
    }

    #[test]
    fn old_saves_log_without_dates() {
        let catalog = Catalog::embedded().unwrap();
        let store = MemoryStore::with_document(r#"{"completedLevels":[1],"currentLevel":2}"#);
        let log = ledger_with(&store).mission_log(&catalog);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].completed_at, None);
    }

    #[test]
    fn ages() {
        let now = Utc::now();
        let ago = |secs: i64| time_ago(now - chrono::Duration::seconds(secs), now);
        assert_eq!(ago(5), "just now");
        assert_eq!(ago(60), "1 minute ago");
        assert_eq!(ago(3 * 3600 + 5), "3 hours ago");
        assert_eq!(ago(2 * 86_400), "2 days ago");
        assert_eq!(ago(400 * 86_400), "1 year ago");
    }
}

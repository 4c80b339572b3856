//! In-memory stores for tests and offline play

use super::{LeaderboardStore, ProgressStore, StoreError};
use crate::data::{AgentRank, LeaderboardEntry, PlayerProfile};
use std::cell::RefCell;
use std::rc::Rc;

/// Progress store held in memory.
///
/// Clones share the same slot, so a test can keep a handle and inspect
/// what the ledger wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Option<String>>>,
    fail_writes: bool,
    writes: Rc<RefCell<u32>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a document already stored
    pub fn with_document(document: &str) -> Self {
        let store = Self::default();
        *store.slot.borrow_mut() = Some(document.to_string());
        store
    }

    /// Every save returns an error
    pub fn failing(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn document(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    pub fn write_count(&self) -> u32 {
        *self.writes.borrow()
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&mut self, document: &str) -> Result<(), StoreError> {
        *self.writes.borrow_mut() += 1;
        if self.fail_writes {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        *self.slot.borrow_mut() = Some(document.to_string());
        Ok(())
    }
}

/// Leaderboard held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryLeaderboard {
    pub entries: Vec<LeaderboardEntry>,
    pub profiles: Vec<(String, Vec<u32>, String)>,
    pub unavailable: bool,
}

impl LeaderboardStore for MemoryLeaderboard {
    fn fetch_all(&self) -> Result<Vec<LeaderboardEntry>, StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("leaderboard offline".to_string()));
        }
        Ok(self.entries.clone())
    }

    fn fetch_profile(&self, user_id: &str) -> Result<Option<PlayerProfile>, StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("leaderboard offline".to_string()));
        }
        Ok(self
            .profiles
            .iter()
            .find(|(id, _, _)| id == user_id)
            .map(|(id, levels, time)| PlayerProfile {
                id: id.clone(),
                name: String::new(),
                completed_levels: levels.clone(),
                total_time: time.clone(),
            }))
    }

    fn update_profile(
        &mut self,
        user_id: &str,
        name: &str,
        completed_level: u32,
        total_time: &str,
    ) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("leaderboard offline".to_string()));
        }

        let index = match self.profiles.iter().position(|(id, _, _)| id == user_id) {
            Some(i) => i,
            None => {
                self.profiles.push((user_id.to_string(), Vec::new(), String::new()));
                self.profiles.len() - 1
            }
        };
        let (_, levels, time) = &mut self.profiles[index];
        *time = total_time.to_string();
        if !levels.contains(&completed_level) {
            levels.push(completed_level);
        }
        let count = levels.len();

        let entry = LeaderboardEntry {
            id: user_id.to_string(),
            name: name.to_string(),
            completed_levels: count as u32,
            total_time: total_time.to_string(),
            rank: AgentRank::for_completed(count).to_string(),
            created_at: None,
        };
        match self.entries.iter_mut().find(|e| e.id == user_id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        Ok(())
    }
}

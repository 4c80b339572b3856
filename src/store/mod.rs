//! Persistence for progress and the leaderboard
//!
//! Progress is a single JSON document kept under a fixed key in a local
//! key-value store. The leaderboard lives in SQLite. Both sit behind small
//! traits so the game can run against in-memory fakes.

pub mod file;
pub mod leaderboard;
pub mod memory;

pub use file::JsonFileStore;
pub use leaderboard::{leaderboard_or_fallback, SqliteLeaderboard};
pub use memory::{MemoryLeaderboard, MemoryStore};

use crate::data::{LeaderboardEntry, PlayerProfile};

/// Key the progress document is stored under
pub const PROGRESS_KEY: &str = "cipherQuestProgress";

/// Key the local player's identity is stored under
pub const AGENT_KEY: &str = "cipherQuestAgent";

/// Name given to a player who never picked one
pub const DEFAULT_AGENT_NAME: &str = "Agent";

/// Errors from any backing store
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed store document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Load and save the serialized progress ledger
pub trait ProgressStore {
    /// The stored document, or `None` if nothing was saved yet
    fn load(&self) -> Result<Option<String>, StoreError>;

    /// Replace the stored document
    fn save(&mut self, document: &str) -> Result<(), StoreError>;
}

/// Read and update the shared leaderboard
pub trait LeaderboardStore {
    fn fetch_all(&self) -> Result<Vec<LeaderboardEntry>, StoreError>;

    /// The stored profile for a player, if they ever solved a mission.
    /// The returned name is empty; names live on the leaderboard row.
    fn fetch_profile(&self, user_id: &str) -> Result<Option<PlayerProfile>, StoreError>;

    /// Append a completed level to the player's profile and refresh
    /// their leaderboard row. Last write wins.
    fn update_profile(
        &mut self,
        user_id: &str,
        name: &str,
        completed_level: u32,
        total_time: &str,
    ) -> Result<(), StoreError>;
}

/// Load the local player's profile, creating one with a fresh id on first
/// run. A supplied name replaces the stored one.
pub fn load_agent(store: &mut dyn ProgressStore, name: Option<&str>) -> PlayerProfile {
    let stored = match store.load() {
        Ok(Some(doc)) => serde_json::from_str::<PlayerProfile>(&doc)
            .map_err(|e| tracing::warn!("Stored agent profile is corrupt: {}", e))
            .ok(),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("Could not read agent profile: {}", e);
            None
        }
    };

    let fresh = stored.is_none();
    let mut profile = stored.unwrap_or_else(|| PlayerProfile {
        id: uuid::Uuid::new_v4().to_string(),
        name: DEFAULT_AGENT_NAME.to_string(),
        ..Default::default()
    });

    let renamed = match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) if n != profile.name => {
            profile.name = n.to_string();
            true
        }
        _ => false,
    };

    if fresh || renamed {
        let saved = serde_json::to_string(&profile)
            .map_err(StoreError::from)
            .and_then(|doc| store.save(&doc));
        if let Err(e) = saved {
            tracing::error!("Failed to save agent profile: {}", e);
        }
    }
    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_run_creates_an_agent() {
        let mut store = MemoryStore::new();
        let agent = load_agent(&mut store, None);
        assert_eq!(agent.name, DEFAULT_AGENT_NAME);
        assert!(uuid::Uuid::parse_str(&agent.id).is_ok());
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn agent_is_stable_across_runs() {
        let mut store = MemoryStore::new();
        let first = load_agent(&mut store, Some("Nightjar"));
        let second = load_agent(&mut store, None);
        assert_eq!(first, second);
        assert_eq!(second.name, "Nightjar");
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn rename_keeps_the_id() {
        let mut store = MemoryStore::new();
        let first = load_agent(&mut store, None);
        let renamed = load_agent(&mut store, Some("  Kestrel "));
        assert_eq!(renamed.id, first.id);
        assert_eq!(renamed.name, "Kestrel");
    }

    #[test]
    fn corrupt_agent_is_replaced() {
        let mut store = MemoryStore::with_document("not json");
        let agent = load_agent(&mut store, None);
        assert_eq!(agent.name, DEFAULT_AGENT_NAME);
        assert!(store.document().unwrap().contains(&agent.id));
    }
}

//! SQLite-backed leaderboard

use super::{LeaderboardStore, StoreError};
use crate::data::{fallback_entries, AgentRank, LeaderboardEntry, PlayerProfile};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const LEADERBOARD_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS leaderboard (
  id TEXT PRIMARY KEY,
  name TEXT NOT NULL,
  completedlevels INTEGER NOT NULL,
  totaltime TEXT NOT NULL,
  rank TEXT NOT NULL,
  created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS profiles (
  id TEXT PRIMARY KEY,
  completed_levels TEXT NOT NULL,
  total_time TEXT NOT NULL
);
"#;

/// Leaderboard and player profiles in a SQLite database
pub struct SqliteLeaderboard {
    conn: Connection,
}

impl SqliteLeaderboard {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.display().to_string(),
                    source,
                })?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(LEADERBOARD_SCHEMA)?;
        let store = Self { conn };
        store.seed_if_empty()?;
        Ok(store)
    }

    /// A fresh board starts with the five resident agents
    fn seed_if_empty(&self) -> Result<(), StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM leaderboard", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        tracing::info!("Seeding empty leaderboard");
        let now = Utc::now().to_rfc3339();
        for entry in fallback_entries() {
            self.conn.execute(
                "INSERT INTO leaderboard (id, name, completedlevels, totaltime, rank, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    uuid::Uuid::new_v4().to_string(),
                    entry.name,
                    entry.completed_levels,
                    entry.total_time,
                    entry.rank,
                    now
                ],
            )?;
        }
        Ok(())
    }

    /// Completed level ids stored on a player's profile
    pub fn profile_levels(&self, user_id: &str) -> Result<Vec<u32>, StoreError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT completed_levels FROM profiles WHERE id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Ok(Vec::new()),
        }
    }
}

impl LeaderboardStore for SqliteLeaderboard {
    fn fetch_all(&self) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, completedlevels, totaltime, rank, created_at
             FROM leaderboard
             ORDER BY completedlevels DESC, totaltime ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            let created: String = row.get(5)?;
            Ok(LeaderboardEntry {
                id: row.get(0)?,
                name: row.get(1)?,
                completed_levels: row.get(2)?,
                total_time: row.get(3)?,
                rank: row.get(4)?,
                created_at: DateTime::parse_from_rfc3339(&created)
                    .ok()
                    .map(|t| t.with_timezone(&Utc)),
            })
        })?;
        let entries = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn fetch_profile(&self, user_id: &str) -> Result<Option<PlayerProfile>, StoreError> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT completed_levels, total_time FROM profiles WHERE id = ?1",
                params![user_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((levels, total_time)) = row else {
            return Ok(None);
        };
        Ok(Some(PlayerProfile {
            id: user_id.to_string(),
            name: String::new(),
            completed_levels: serde_json::from_str(&levels)?,
            total_time,
        }))
    }

    fn update_profile(
        &mut self,
        user_id: &str,
        name: &str,
        completed_level: u32,
        total_time: &str,
    ) -> Result<(), StoreError> {
        let mut levels = self.profile_levels(user_id)?;
        if !levels.contains(&completed_level) {
            levels.push(completed_level);
        }
        let rank = AgentRank::for_completed(levels.len()).to_string();

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO profiles (id, completed_levels, total_time) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
               completed_levels = excluded.completed_levels,
               total_time = excluded.total_time",
            params![user_id, serde_json::to_string(&levels)?, total_time],
        )?;
        tx.execute(
            "INSERT INTO leaderboard (id, name, completedlevels, totaltime, rank, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
               name = excluded.name,
               completedlevels = excluded.completedlevels,
               totaltime = excluded.totaltime,
               rank = excluded.rank",
            params![
                user_id,
                name,
                levels.len() as u32,
                total_time,
                rank,
                Utc::now().to_rfc3339()
            ],
        )?;
        tx.commit()?;

        tracing::debug!(user_id, completed_level, "Profile updated");
        Ok(())
    }
}

/// Fetch the board, falling back to the resident agents on error or when
/// the store comes back empty
pub fn leaderboard_or_fallback(store: &dyn LeaderboardStore) -> Vec<LeaderboardEntry> {
    match store.fetch_all() {
        Ok(entries) if !entries.is_empty() => entries,
        Ok(_) => fallback_entries(),
        Err(e) => {
            tracing::error!("Error fetching leaderboard: {}", e);
            fallback_entries()
        }
    }
}

//! Cipher Quest: Field Operations Against ENIGMA
//!
//! A cryptography puzzle game where you decode intercepted transmissions,
//! one mission at a time, using classical cipher techniques.
//!
//! # Game Mechanics
//!
//! - **Missions**: Fifty ordered puzzles, each unlocking the next
//! - **Hints**: Revealed one at a time, every reveal is recorded
//! - **Field Work**: Some missions need a location check or a QR scan
//! - **Leaderboard**: Ranked agents backed by a local SQLite database
//!
//! # Architecture
//!
//! - `cipher` - Pure text transforms (Caesar, Vigenère, Base64, hex)
//! - `data` - Mission records, progress ledger, leaderboard entries
//! - `game` - Catalog, ledger, session logic and device capabilities
//! - `store` - Progress and leaderboard persistence
//! - `config` - Command line and on-disk locations
//! - `tui` - Terminal user interface with ratatui

pub mod cipher;
pub mod config;
pub mod data;
pub mod game;
pub mod store;
pub mod tui;

pub use data::*;
pub use game::Game;

/// Game version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type for the game
pub type Result<T> = anyhow::Result<T>;

/// Errors raised by mission play
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Mission not found: {0}")]
    MissionNotFound(u32),

    #[error("Mission {0} is still locked")]
    MissionLocked(u32),

    #[error("No mission is open")]
    NoOpenMission,

    #[error("Location verification required: {0}")]
    LocationRequired(String),

    #[error("QR code scan required")]
    QrRequired,

    #[error("This mission has no {0} check")]
    NoConstraint(&'static str),
}

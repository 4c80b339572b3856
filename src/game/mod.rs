//! Core game logic and session state
//!
//! A `Game` ties the catalog and ledger to the device capabilities and the
//! leaderboard. The UI drives it one call at a time; nothing here blocks.

pub mod catalog;
pub mod device;
pub mod easter_eggs;
pub mod ledger;
pub mod qr;

pub use catalog::{Catalog, CatalogError, MissionSummary};
pub use device::{DeviceError, LocationProvider, Position, Proximity, QrScanner};
pub use easter_eggs::{EasterEgg, EggKey, EggTracker};
pub use ledger::{time_ago, Confirmation, Ledger, LogEntry};
pub use qr::QrImageError;

use crate::data::*;
use crate::store::{leaderboard_or_fallback, LeaderboardStore};
use crate::GameError;
use chrono::{DateTime, Utc};

/// Answer text filled in once the player's location checks out
pub const LOCATION_CONFIRMED: &str = "LOCATION_CONFIRMED";

/// Transient state for the mission currently on screen
#[derive(Debug, Clone, PartialEq)]
pub struct MissionAttempt {
    pub mission_id: u32,
    pub started_at: DateTime<Utc>,
    pub hint_index: usize,       // Last hint shown, valid once hint_shown
    pub hint_shown: bool,
    pub location_verified: bool,
    pub qr_scanned: bool,
    pub qr_value: Option<String>,
    pub draft: String,           // Answer as typed so far
}

impl MissionAttempt {
    fn new(mission_id: u32) -> Self {
        Self {
            mission_id,
            started_at: Utc::now(),
            hint_index: 0,
            hint_shown: false,
            location_verified: false,
            qr_scanned: false,
            qr_value: None,
            draft: String::new(),
        }
    }

    /// Clear the answer and any gate checks, keep the clock and hints
    pub fn clear(&mut self) {
        self.draft.clear();
        self.location_verified = false;
        self.qr_scanned = false;
        self.qr_value = None;
    }
}

/// Result of handing in an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Correct { next: Option<u32> },
    Incorrect,
}

/// Result of a QR scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub payload: String,
    pub matched: bool, // Equal to the mission's expected payload
}

/// A play session
pub struct Game {
    catalog: Catalog,
    ledger: Ledger,
    location: Box<dyn LocationProvider>,
    scanner: Box<dyn QrScanner>,
    leaderboard: Box<dyn LeaderboardStore>,
    player: PlayerProfile,
    attempt: Option<MissionAttempt>,
    solved_seconds: i64,
}

impl Game {
    pub fn new(
        catalog: Catalog,
        ledger: Ledger,
        location: Box<dyn LocationProvider>,
        scanner: Box<dyn QrScanner>,
        leaderboard: Box<dyn LeaderboardStore>,
        player: PlayerProfile,
    ) -> Self {
        let player = with_stored_profile(player, leaderboard.as_ref());
        let solved_seconds = parse_total_time(&player.total_time).unwrap_or(0);
        Self {
            catalog,
            ledger,
            location,
            scanner,
            leaderboard,
            player,
            attempt: None,
            solved_seconds,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn player(&self) -> &PlayerProfile {
        &self.player
    }

    pub fn mission_log(&self) -> Vec<LogEntry> {
        self.ledger.mission_log(&self.catalog)
    }

    pub fn summaries(&self) -> Vec<MissionSummary> {
        self.catalog.summaries(self.ledger.progress())
    }

    pub fn attempt(&self) -> Option<&MissionAttempt> {
        self.attempt.as_ref()
    }

    pub fn attempt_mut(&mut self) -> Option<&mut MissionAttempt> {
        self.attempt.as_mut()
    }

    /// The mission behind the open attempt
    pub fn current_mission(&self) -> Option<&MissionRecord> {
        self.attempt
            .as_ref()
            .and_then(|a| self.catalog.get(a.mission_id))
    }

    fn open(&self) -> Result<(&MissionAttempt, &MissionRecord), GameError> {
        let attempt = self.attempt.as_ref().ok_or(GameError::NoOpenMission)?;
        let mission = self
            .catalog
            .get(attempt.mission_id)
            .ok_or(GameError::MissionNotFound(attempt.mission_id))?;
        Ok((attempt, mission))
    }

    /// Start a fresh attempt at a mission
    pub fn open_mission(&mut self, id: u32) -> Result<&MissionAttempt, GameError> {
        let mission = self.catalog.get(id).ok_or(GameError::MissionNotFound(id))?;
        if catalog::is_locked(mission, self.ledger.progress()) {
            return Err(GameError::MissionLocked(id));
        }

        tracing::info!(mission = id, title = %mission.title, "Mission opened");
        Ok(self.attempt.insert(MissionAttempt::new(id)))
    }

    pub fn close_mission(&mut self) {
        self.attempt = None;
    }

    /// Show the first hint, or move on to the next one. The last hint stays
    /// put once reached. Every call is recorded in the ledger.
    pub fn reveal_hint(&mut self) -> Result<String, GameError> {
        let (attempt, mission) = self.open()?;
        let id = mission.id;
        let last = mission.hints.len().saturating_sub(1);

        let index = if !attempt.hint_shown {
            0
        } else if attempt.hint_index < last {
            attempt.hint_index + 1
        } else {
            attempt.hint_index
        };
        let hint = mission.hint(index).unwrap_or_default().to_string();

        if let Some(attempt) = self.attempt.as_mut() {
            attempt.hint_shown = true;
            attempt.hint_index = index;
        }
        self.ledger.use_hint(id);
        Ok(hint)
    }

    /// Ask the location provider where we are and compare against the
    /// mission's target
    pub fn verify_location(&mut self) -> Result<Result<Proximity, DeviceError>, GameError> {
        let (_, mission) = self.open()?;
        let target = mission.location.clone().ok_or(GameError::NoConstraint("location"))?;

        let position = match self.location.current_position() {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Location request failed: {}", e);
                return Ok(Err(e));
            }
        };

        let result = device::proximity(&position, &target);
        tracing::info!(
            distance = result.distance_meters,
            radius = result.radius_meters,
            "Location checked"
        );
        if result.is_within() {
            if let Some(attempt) = self.attempt.as_mut() {
                attempt.location_verified = true;
                attempt.draft = LOCATION_CONFIRMED.to_string();
            }
        }
        Ok(Ok(result))
    }

    /// Read a code from the scanner. Any payload counts as scanned and
    /// becomes the draft answer.
    pub fn scan_qr(&mut self) -> Result<Result<ScanResult, DeviceError>, GameError> {
        let (_, mission) = self.open()?;
        let expected = mission
            .qr
            .as_ref()
            .ok_or(GameError::NoConstraint("QR"))?
            .payload
            .clone();

        let payload = match self.scanner.scan_once() {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("QR scan failed: {}", e);
                return Ok(Err(e));
            }
        };

        let matched = expected.as_deref() == Some(payload.as_str());
        if let Some(attempt) = self.attempt.as_mut() {
            attempt.qr_scanned = true;
            attempt.qr_value = Some(payload.clone());
            attempt.draft = payload.clone();
        }
        tracing::info!(matched, "QR code scanned");
        Ok(Ok(ScanResult { payload, matched }))
    }

    /// Hand in an answer for the open mission
    pub fn submit_answer(&mut self, input: &str) -> Result<SubmitOutcome, GameError> {
        let (attempt, mission) = self.open()?;

        match mission.constraint() {
            Constraint::Location(loc) if !attempt.location_verified => {
                return Err(GameError::LocationRequired(loc.label.clone()));
            }
            Constraint::Qr(_) if !attempt.qr_scanned => return Err(GameError::QrRequired),
            _ => {}
        }

        if !mission.check_answer(input) {
            tracing::debug!(mission = mission.id, "Incorrect answer");
            return Ok(SubmitOutcome::Incorrect);
        }

        let id = mission.id;
        let next = self.catalog.next_after(id).map(|m| m.id);
        let spent = (Utc::now() - attempt.started_at).num_seconds().max(0);

        self.ledger.complete_mission(id);
        self.solved_seconds += spent;
        self.record_on_leaderboard(id);
        Ok(SubmitOutcome::Correct { next })
    }

    fn record_on_leaderboard(&mut self, id: u32) {
        let total = self.total_time();
        if !self.player.completed_levels.contains(&id) {
            self.player.completed_levels.push(id);
        }
        self.player.total_time = total.clone();

        if let Err(e) = self
            .leaderboard
            .update_profile(&self.player.id, &self.player.name, id, &total)
        {
            tracing::error!("Error updating profile: {}", e);
        }
    }

    /// Time on the open mission as MM:SS
    pub fn elapsed(&self) -> String {
        self.elapsed_at(Utc::now())
    }

    pub fn elapsed_at(&self, now: DateTime<Utc>) -> String {
        let seconds = self
            .attempt
            .as_ref()
            .map(|a| (now - a.started_at).num_seconds().max(0))
            .unwrap_or(0);
        format!("{:02}:{:02}", seconds / 60, seconds % 60)
    }

    /// Time spent on every solved mission so far, as HH:MM:SS. Starts from
    /// what the leaderboard already holds for this player.
    pub fn total_time(&self) -> String {
        format_total_time(self.solved_seconds)
    }

    /// Leaderboard rows, or the resident agents if the store fails
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        leaderboard_or_fallback(self.leaderboard.as_ref())
    }

    /// The player's rank from the ledger
    pub fn rank(&self) -> AgentRank {
        AgentRank::for_completed(self.ledger.completed_count())
    }

    pub fn reset_progress(&mut self, confirmation: Confirmation) -> bool {
        let reset = self.ledger.reset(confirmation);
        if reset {
            self.attempt = None;
        }
        reset
    }
}

/// Carry over the levels and time the board already holds for this player,
/// so a new session keeps adding to them
fn with_stored_profile(mut player: PlayerProfile, board: &dyn LeaderboardStore) -> PlayerProfile {
    let stored = match board.fetch_profile(&player.id) {
        Ok(Some(stored)) => stored,
        Ok(None) => return player,
        Err(e) => {
            tracing::warn!("Could not read stored profile: {}", e);
            return player;
        }
    };

    for level in stored.completed_levels {
        if !player.completed_levels.contains(&level) {
            player.completed_levels.push(level);
        }
    }
    let stored_seconds = parse_total_time(&stored.total_time).unwrap_or(0);
    if stored_seconds > parse_total_time(&player.total_time).unwrap_or(0) {
        player.total_time = stored.total_time;
    }
    tracing::debug!(levels = player.completed_levels.len(), total_time = %player.total_time, "Stored profile loaded");
    player
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::device::{FixedLocation, ManualQrScanner};
    use crate::store::{MemoryLeaderboard, MemoryStore};

    fn player() -> PlayerProfile {
        PlayerProfile {
            id: "agent-1".to_string(),
            name: "Tester".to_string(),
            ..Default::default()
        }
    }

    fn game_at(position: Option<Position>, store: MemoryStore) -> Game {
        let catalog = Catalog::embedded().unwrap();
        let ledger = Ledger::load(Box::new(store), catalog.len());
        Game::new(
            catalog,
            ledger,
            Box::new(FixedLocation::new(position)),
            Box::new(ManualQrScanner::new()),
            Box::new(MemoryLeaderboard::default()),
            player(),
        )
    }

    fn game() -> Game {
        game_at(None, MemoryStore::new())
    }

    /// A game with every mission up to `upto` unlocked
    fn unlocked(upto: u32, position: Option<Position>) -> Game {
        let doc = format!(r#"{{"completedLevels":[],"currentLevel":{},"hintsUsed":{{}},"completionDates":{{}}}}"#, upto);
        game_at(position, MemoryStore::with_document(&doc))
    }

    #[test]
    fn first_mission_solves_and_unlocks_second() {
        let mut game = game();
        game.open_mission(1).unwrap();
        let outcome = game
            .submit_answer("meet at the abandoned warehouse at midnight. bring the package.")
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Correct { next: Some(2) });
        assert!(game.ledger().is_completed(1));
        assert_eq!(game.ledger().current_level(), 2);
        assert!(game.open_mission(2).is_ok());
    }

    #[test]
    fn wrong_answer_changes_nothing() {
        let mut game = game();
        game.open_mission(1).unwrap();
        assert_eq!(game.submit_answer("MEET AT DAWN").unwrap(), SubmitOutcome::Incorrect);
        assert_eq!(game.ledger().completed_count(), 0);
    }

    #[test]
    fn locked_and_unknown_missions() {
        let mut game = game();
        assert_eq!(game.open_mission(2).unwrap_err(), GameError::MissionLocked(2));
        assert_eq!(game.open_mission(99).unwrap_err(), GameError::MissionNotFound(99));
        assert_eq!(game.reveal_hint().unwrap_err(), GameError::NoOpenMission);
    }

    #[test]
    fn hints_advance_and_stop_at_last() {
        let mut game = game();
        game.open_mission(1).unwrap();
        let shown: Vec<String> = (0..5).map(|_| game.reveal_hint().unwrap()).collect();
        let hints = &game.catalog().get(1).unwrap().hints;
        assert_eq!(shown[0], hints[0]);
        assert_eq!(shown[1], hints[1]);
        assert_eq!(shown[2], hints[2]);
        assert_eq!(shown[4], hints[2]);
        assert_eq!(game.ledger().hints_used(1), 5);
    }

    #[test]
    fn location_gate_blocks_until_verified() {
        let mut game = unlocked(29, Some(Position::new(37.7750, -122.4195)));
        game.open_mission(29).unwrap();

        let err = game.submit_answer(LOCATION_CONFIRMED).unwrap_err();
        assert_eq!(err, GameError::LocationRequired("Mission Location".to_string()));

        let proximity = game.verify_location().unwrap().unwrap();
        assert!(proximity.is_within());
        let draft = game.attempt().unwrap().draft.clone();
        assert_eq!(draft, LOCATION_CONFIRMED);
        assert_eq!(
            game.submit_answer(&draft).unwrap(),
            SubmitOutcome::Correct { next: Some(30) }
        );
    }

    #[test]
    fn far_away_location_does_not_verify() {
        let mut game = unlocked(29, Some(Position::new(40.7128, -74.0060)));
        game.open_mission(29).unwrap();
        let proximity = game.verify_location().unwrap().unwrap();
        assert!(!proximity.is_within());
        assert!(!game.attempt().unwrap().location_verified);
    }

    #[test]
    fn missing_location_is_reported_not_fatal() {
        let mut game = unlocked(29, None);
        game.open_mission(29).unwrap();
        assert!(matches!(game.verify_location().unwrap(), Err(DeviceError::Unavailable(_))));
    }

    #[test]
    fn qr_gate_then_decrypt() {
        let mut game = unlocked(30, None);
        game.open_mission(30).unwrap();
        assert_eq!(game.submit_answer("TROOP MOVEMENT AT SECRET BASE").unwrap_err(), GameError::QrRequired);

        assert!(matches!(game.scan_qr().unwrap(), Err(DeviceError::ScanFailed(_))));

        let feed = ManualQrScanner::new();
        game.scanner = Box::new(feed.clone());
        feed.set_payload("HTWJXY RTAJRJSY FY XJHWJY GFXJ");
        let scan = game.scan_qr().unwrap().unwrap();
        assert!(scan.matched);
        assert_eq!(game.attempt().unwrap().draft, "HTWJXY RTAJRJSY FY XJHWJY GFXJ");

        assert_eq!(
            game.submit_answer("troop movement at secret base").unwrap(),
            SubmitOutcome::Correct { next: Some(31) }
        );
    }

    #[test]
    fn gate_checks_need_the_matching_constraint() {
        let mut game = game();
        game.open_mission(1).unwrap();
        assert_eq!(game.verify_location().unwrap_err(), GameError::NoConstraint("location"));
        assert_eq!(game.scan_qr().unwrap_err(), GameError::NoConstraint("QR"));
    }

    #[test]
    fn last_mission_has_no_next() {
        let mut game = unlocked(50, None);
        game.open_mission(50).unwrap();
        assert_eq!(
            game.submit_answer("CONGRATULATIONS AGENT MISSION COMPLETE").unwrap(),
            SubmitOutcome::Correct { next: None }
        );
        assert_eq!(game.ledger().current_level(), 50);
    }

    #[test]
    fn solving_updates_the_leaderboard() {
        let mut game = game();
        game.open_mission(1).unwrap();
        game.submit_answer("MEET AT THE ABANDONED WAREHOUSE AT MIDNIGHT. BRING THE PACKAGE.")
            .unwrap();
        let board = game.leaderboard();
        let me = board.iter().find(|e| e.id == "agent-1").unwrap();
        assert_eq!(me.completed_levels, 1);
        assert_eq!(me.rank, "Recruit");
        assert_eq!(game.player().completed_levels, vec![1]);
    }

    #[test]
    fn stored_profile_seeds_the_total() {
        let mut board = MemoryLeaderboard::default();
        board.update_profile("agent-1", "Tester", 1, "00:05:00").unwrap();

        let catalog = Catalog::embedded().unwrap();
        let ledger = Ledger::load(Box::new(MemoryStore::new()), catalog.len());
        let game = Game::new(
            catalog,
            ledger,
            Box::new(FixedLocation::default()),
            Box::new(ManualQrScanner::new()),
            Box::new(board),
            player(),
        );
        assert_eq!(game.total_time(), "00:05:00");
        assert_eq!(game.player().completed_levels, vec![1]);
    }

    #[test]
    fn unreadable_board_starts_from_zero() {
        let catalog = Catalog::embedded().unwrap();
        let ledger = Ledger::load(Box::new(MemoryStore::new()), catalog.len());
        let game = Game::new(
            catalog,
            ledger,
            Box::new(FixedLocation::default()),
            Box::new(ManualQrScanner::new()),
            Box::new(MemoryLeaderboard {
                unavailable: true,
                ..Default::default()
            }),
            player(),
        );
        assert_eq!(game.total_time(), "00:00:00");
    }

    #[test]
    fn timer_format() {
        let mut game = game();
        assert_eq!(game.elapsed(), "00:00");
        game.open_mission(1).unwrap();
        let started = game.attempt().unwrap().started_at;
        assert_eq!(game.elapsed_at(started + chrono::Duration::seconds(125)), "02:05");
        assert_eq!(game.total_time(), "00:00:00");
    }

    #[test]
    fn reset_needs_confirmation() {
        let mut game = game();
        game.open_mission(1).unwrap();
        game.submit_answer("MEET AT THE ABANDONED WAREHOUSE AT MIDNIGHT. BRING THE PACKAGE.")
            .unwrap();
        assert!(!game.reset_progress(Confirmation::Declined));
        assert_eq!(game.ledger().completed_count(), 1);
        assert!(game.reset_progress(Confirmation::Confirmed));
        assert_eq!(game.ledger().completed_count(), 0);
        assert!(game.attempt().is_none());
    }
}

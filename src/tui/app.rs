//! Main application state and rendering

use crate::cipher::{CipherError, Direction as CipherDirection, Transform};
use crate::data::{AgentRank, LeaderboardEntry};
use crate::game::device::ManualQrScanner;
use crate::game::qr::{mission_payload, qr_missions, render_qr};
use crate::game::{
    time_ago, Confirmation, EasterEgg, EggKey, EggTracker, Game, LogEntry, SubmitOutcome,
};
use crate::tui::widgets::{DramaticBox, NoticeLine, ProgressBar};
use crate::tui::{centered_rect, create_content_layout, create_main_layout, difficulty_color};
use crate::tui::{styled_block, NoticeLevel, Theme, HELP_TEXT, LOGO, SMALL_LOGO};
use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
    Frame,
};
use std::time::{Duration, Instant};

/// How long a notice stays on the status line
const NOTICE_TTL: Duration = Duration::from_secs(4);

const MENU_ITEMS: [&str; 8] = [
    "Missions",
    "Mission Log",
    "Leaderboard",
    "Cipher Workbench",
    "QR Tools",
    "Help",
    "Reset Progress",
    "Quit",
];

/// Transforms offered on the workbench, by short name
const WORKBENCH_TRANSFORMS: [&str; 5] = ["caesar", "rot13", "vigenere", "base64", "hex"];

/// Application state
pub struct App {
    pub game: Game,
    pub theme: Theme,
    pub running: bool,
    pub show_help: bool,
    pub current_screen: Screen,
    pub menu_state: ListState,
    pub mission_state: ListState,
    pub input_mode: InputMode,
    pub input_buffer: String,       // QR text while typing it
    pub notice: Option<Notice>,
    pub hint_text: Option<String>,
    pub completed: Option<Completion>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub workbench: Workbench,
    pub qr_tools: QrTools,
    pub log_state: ListState,
    qr_feed: ManualQrScanner,
    eggs: EggTracker,
    effect_until: Option<Instant>, // When an easter egg look wears off
}

/// Current screen being displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    MissionSelect,
    Mission,
    MissionLog,
    Leaderboard,
    Workbench,
    QrTools,
    Help,
    ConfirmReset,
}

/// What typed characters go into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Answer,
    QrPayload,
    WorkbenchKey,
    WorkbenchText,
    QrText,
}

/// A transient status line message
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
    pub shown_at: Instant,
}

/// The box shown after a correct answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub mission_id: u32,
    pub next: Option<u32>,
}

/// Cipher workbench state
#[derive(Debug, Clone)]
pub struct Workbench {
    pub transform: usize,           // Index into WORKBENCH_TRANSFORMS
    pub direction: CipherDirection,
    pub key: String,
    pub input: String,
    pub output: Result<String, CipherError>,
}

impl Default for Workbench {
    fn default() -> Self {
        let mut bench = Self {
            transform: 0,
            direction: CipherDirection::Decode,
            key: "3".to_string(),
            input: String::new(),
            output: Ok(String::new()),
        };
        bench.recompute();
        bench
    }
}

impl Workbench {
    pub fn transform_name(&self) -> &'static str {
        WORKBENCH_TRANSFORMS[self.transform % WORKBENCH_TRANSFORMS.len()]
    }

    fn parsed(&self) -> Result<Transform, CipherError> {
        let key = Some(self.key.as_str()).filter(|k| !k.trim().is_empty());
        Transform::parse(self.transform_name(), key)
    }

    pub fn recompute(&mut self) {
        self.output = self
            .parsed()
            .and_then(|t| t.apply(&self.input, self.direction));
    }

    pub fn next_transform(&mut self) {
        self.transform = (self.transform + 1) % WORKBENCH_TRANSFORMS.len();
        self.recompute();
    }

    pub fn previous_transform(&mut self) {
        self.transform = (self.transform + WORKBENCH_TRANSFORMS.len() - 1) % WORKBENCH_TRANSFORMS.len();
        self.recompute();
    }

    pub fn toggle_direction(&mut self) {
        self.direction = self.direction.toggle();
        self.recompute();
    }

    pub fn uses_key(&self) -> bool {
        matches!(self.transform_name(), "caesar" | "vigenere")
    }
}

/// QR tools state: a mission code or custom text
#[derive(Debug, Clone, Default)]
pub struct QrTools {
    pub mission_state: ListState,   // Index into the QR mission list
    pub custom: String,
    pub show_custom: bool,
}

impl App {
    /// `qr_feed` must share its slot with the scanner the game owns
    pub fn new(game: Game, qr_feed: ManualQrScanner) -> Self {
        let mut menu_state = ListState::default();
        menu_state.select(Some(0));
        let mut mission_state = ListState::default();
        mission_state.select(Some(0));

        Self {
            game,
            theme: Theme::default(),
            running: true,
            show_help: false,
            current_screen: Screen::MainMenu,
            menu_state,
            mission_state,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            notice: None,
            hint_text: None,
            completed: None,
            leaderboard: Vec::new(),
            workbench: Workbench::default(),
            qr_tools: QrTools {
                mission_state: ListState::default().with_selected(Some(0)),
                ..Default::default()
            },
            log_state: ListState::default().with_selected(Some(0)),
            qr_feed,
            eggs: EggTracker::new(),
            effect_until: None,
        }
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notice = Some(Notice {
            message: message.into(),
            level,
            shown_at: Instant::now(),
        });
    }

    /// Poll for one key and apply it. Returns false once the app should exit.
    pub fn handle_input(&mut self) -> std::io::Result<bool> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        if self
            .notice
            .as_ref()
            .is_some_and(|n| n.shown_at.elapsed() > NOTICE_TTL)
        {
            self.notice = None;
        }
        self.expire_effects(Instant::now());
        Ok(self.running)
    }

    /// Drop an easter egg look once its time is up
    pub fn expire_effects(&mut self, now: Instant) {
        if self.effect_until.is_some_and(|until| now >= until) {
            self.theme = Theme::default();
            self.effect_until = None;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.input_mode != InputMode::Normal {
            self.handle_text_key(key.code);
            return;
        }

        self.check_easter_egg(key.code);

        if self.completed.is_some() {
            self.handle_completion_key(key.code);
            return;
        }

        match key.code {
            KeyCode::Char('q') if self.current_screen == Screen::MainMenu => {
                self.running = false;
            }
            KeyCode::Char('?') => self.show_help = !self.show_help,
            KeyCode::Esc if self.show_help => self.show_help = false,
            KeyCode::Esc => self.handle_escape(),
            _ => match self.current_screen {
                Screen::MainMenu => self.handle_menu_key(key.code),
                Screen::MissionSelect => self.handle_mission_select_key(key.code),
                Screen::Mission => self.handle_mission_key(key.code),
                Screen::Workbench => self.handle_workbench_key(key.code),
                Screen::QrTools => self.handle_qr_tools_key(key.code),
                Screen::MissionLog => self.handle_log_key(key.code),
                Screen::ConfirmReset => self.handle_confirm_key(key.code),
                Screen::Leaderboard | Screen::Help => {}
            },
        }
    }

    fn check_easter_egg(&mut self, code: KeyCode) {
        let key = match code {
            KeyCode::Up => EggKey::Up,
            KeyCode::Down => EggKey::Down,
            KeyCode::Left => EggKey::Left,
            KeyCode::Right => EggKey::Right,
            KeyCode::Char(c) => EggKey::Char(c),
            _ => return,
        };
        if let Some(egg) = self.eggs.press(key) {
            tracing::info!(?egg, "Easter egg found");
            self.theme = match egg {
                EasterEgg::MatrixMode => Theme::matrix(),
                EasterEgg::AgentMode => Theme::agent(),
            };
            self.effect_until = Some(Instant::now() + egg.duration());
            self.notify(NoticeLevel::Success, egg.message());
        }
    }

    fn handle_text_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.input_buffer.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                let mode = self.input_mode;
                self.input_mode = InputMode::Normal;
                match mode {
                    InputMode::Answer => self.submit(),
                    InputMode::QrPayload => self.scan(),
                    _ => {}
                }
            }
            KeyCode::Backspace => {
                if let Some(text) = self.text_target() {
                    text.pop();
                }
                self.workbench_changed();
            }
            KeyCode::Char(c) => {
                if let Some(text) = self.text_target() {
                    text.push(c);
                }
                self.workbench_changed();
            }
            _ => {}
        }
    }

    /// The string the current input mode edits
    fn text_target(&mut self) -> Option<&mut String> {
        match self.input_mode {
            InputMode::Normal => None,
            InputMode::Answer => self.game.attempt_mut().map(|a| &mut a.draft),
            InputMode::QrPayload => Some(&mut self.input_buffer),
            InputMode::WorkbenchKey => Some(&mut self.workbench.key),
            InputMode::WorkbenchText => Some(&mut self.workbench.input),
            InputMode::QrText => Some(&mut self.qr_tools.custom),
        }
    }

    fn workbench_changed(&mut self) {
        if matches!(self.input_mode, InputMode::WorkbenchKey | InputMode::WorkbenchText) {
            self.workbench.recompute();
        }
    }

    fn handle_escape(&mut self) {
        match self.current_screen {
            Screen::Mission => {
                self.game.close_mission();
                self.hint_text = None;
                self.current_screen = Screen::MissionSelect;
            }
            Screen::ConfirmReset => {
                self.confirm_reset(Confirmation::Declined);
            }
            Screen::MissionSelect
            | Screen::MissionLog
            | Screen::Leaderboard
            | Screen::Workbench
            | Screen::QrTools
            | Screen::Help => {
                self.current_screen = Screen::MainMenu;
            }
            Screen::MainMenu => {}
        }
    }

    fn handle_menu_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => select_previous(&mut self.menu_state),
            KeyCode::Down => select_next(&mut self.menu_state, MENU_ITEMS.len()),
            KeyCode::Enter => match self.menu_state.selected() {
                Some(0) => self.show_missions(),
                Some(1) => self.current_screen = Screen::MissionLog,
                Some(2) => self.show_leaderboard(),
                Some(3) => self.current_screen = Screen::Workbench,
                Some(4) => self.current_screen = Screen::QrTools,
                Some(5) => self.current_screen = Screen::Help,
                Some(6) => self.current_screen = Screen::ConfirmReset,
                Some(7) => self.running = false,
                _ => {}
            },
            _ => {}
        }
    }

    fn show_missions(&mut self) {
        // Land on the frontier mission
        let frontier = self.game.ledger().current_level().saturating_sub(1) as usize;
        self.mission_state.select(Some(frontier));
        self.current_screen = Screen::MissionSelect;
    }

    fn show_leaderboard(&mut self) {
        self.leaderboard = self.game.leaderboard();
        self.current_screen = Screen::Leaderboard;
    }

    fn handle_mission_select_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => select_previous(&mut self.mission_state),
            KeyCode::Down => select_next(&mut self.mission_state, self.game.catalog().len() as usize),
            KeyCode::Enter => {
                let id = self.mission_state.selected().unwrap_or(0) as u32 + 1;
                self.open_mission(id);
            }
            _ => {}
        }
    }

    fn open_mission(&mut self, id: u32) {
        match self.game.open_mission(id) {
            Ok(_) => {
                self.hint_text = None;
                self.mission_state.select(Some(id as usize - 1));
                self.current_screen = Screen::Mission;
            }
            Err(e) => self.notify(NoticeLevel::Error, e.to_string()),
        }
    }

    fn handle_mission_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('i') | KeyCode::Enter => self.input_mode = InputMode::Answer,
            KeyCode::Char('h') => match self.game.reveal_hint() {
                Ok(hint) => self.hint_text = Some(hint),
                Err(e) => self.notify(NoticeLevel::Error, e.to_string()),
            },
            KeyCode::Char('l') => self.check_location(),
            KeyCode::Char('s') => {
                let needs_qr = self
                    .game
                    .current_mission()
                    .is_some_and(|m| m.requires_qr());
                if needs_qr {
                    self.input_buffer.clear();
                    self.input_mode = InputMode::QrPayload;
                } else {
                    self.notify(NoticeLevel::Info, "This mission has no QR code");
                }
            }
            KeyCode::Char('c') => {
                if let Some(attempt) = self.game.attempt_mut() {
                    attempt.clear();
                }
                self.notify(NoticeLevel::Info, "Answer cleared");
            }
            _ => {}
        }
    }

    fn check_location(&mut self) {
        let label = self
            .game
            .current_mission()
            .and_then(|m| m.location.as_ref())
            .map(|l| l.label.clone());
        match self.game.verify_location() {
            Ok(Ok(p)) if p.is_within() => self.notify(
                NoticeLevel::Success,
                format!("Location confirmed! You've reached {}", label.unwrap_or_default()),
            ),
            Ok(Ok(p)) => self.notify(
                NoticeLevel::Error,
                format!(
                    "Not at the required location yet ({:.0} m away, need {:.0} m)",
                    p.distance_meters, p.radius_meters
                ),
            ),
            Ok(Err(e)) => self.notify(NoticeLevel::Error, e.to_string()),
            Err(e) => self.notify(NoticeLevel::Info, e.to_string()),
        }
    }

    fn scan(&mut self) {
        self.qr_feed.set_payload(std::mem::take(&mut self.input_buffer));
        match self.game.scan_qr() {
            Ok(Ok(scan)) if scan.matched => self.notify(NoticeLevel::Success, "QR code successfully scanned!"),
            Ok(Ok(scan)) => self.notify(NoticeLevel::Info, format!("QR code scanned: {}", scan.payload)),
            Ok(Err(e)) => self.notify(NoticeLevel::Error, e.to_string()),
            Err(e) => self.notify(NoticeLevel::Error, e.to_string()),
        }
    }

    fn submit(&mut self) {
        let Some(attempt) = self.game.attempt() else {
            return;
        };
        let mission_id = attempt.mission_id;
        let draft = attempt.draft.clone();

        match self.game.submit_answer(&draft) {
            Ok(SubmitOutcome::Correct { next }) => {
                self.completed = Some(Completion { mission_id, next });
                if self.game.ledger().last_save_failed() {
                    self.notify(NoticeLevel::Error, "Progress could not be saved");
                }
            }
            Ok(SubmitOutcome::Incorrect) => {
                self.notify(NoticeLevel::Error, "Decryption failed. The solution is incorrect.")
            }
            Err(e) => self.notify(NoticeLevel::Error, e.to_string()),
        }
    }

    fn handle_completion_key(&mut self, code: KeyCode) {
        if !matches!(code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            return;
        }
        let Some(done) = self.completed.take() else {
            return;
        };
        match done.next {
            Some(next) if code == KeyCode::Enter => self.open_mission(next),
            _ => {
                self.game.close_mission();
                self.hint_text = None;
                self.current_screen = Screen::MissionSelect;
            }
        }
    }

    fn handle_workbench_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left => self.workbench.previous_transform(),
            KeyCode::Right => self.workbench.next_transform(),
            KeyCode::Char('d') => self.workbench.toggle_direction(),
            KeyCode::Char('k') if self.workbench.uses_key() => self.input_mode = InputMode::WorkbenchKey,
            KeyCode::Char('i') | KeyCode::Enter => self.input_mode = InputMode::WorkbenchText,
            _ => {}
        }
    }

    fn handle_log_key(&mut self, code: KeyCode) {
        let len = self.game.ledger().completed_count();
        match code {
            KeyCode::Up => select_previous(&mut self.log_state),
            KeyCode::Down => select_next(&mut self.log_state, len),
            _ => {}
        }
    }

    fn handle_qr_tools_key(&mut self, code: KeyCode) {
        let len = qr_missions(self.game.catalog()).len();
        match code {
            KeyCode::Up => {
                select_previous(&mut self.qr_tools.mission_state);
                self.qr_tools.show_custom = false;
            }
            KeyCode::Down => {
                select_next(&mut self.qr_tools.mission_state, len);
                self.qr_tools.show_custom = false;
            }
            KeyCode::Enter => self.qr_tools.show_custom = false,
            KeyCode::Char('t') => {
                self.qr_tools.show_custom = true;
                self.input_mode = InputMode::QrText;
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => self.confirm_reset(Confirmation::Confirmed),
            KeyCode::Char('n') | KeyCode::Char('N') => self.confirm_reset(Confirmation::Declined),
            _ => {}
        }
    }

    fn confirm_reset(&mut self, confirmation: Confirmation) {
        if self.game.reset_progress(confirmation) {
            self.hint_text = None;
            self.mission_state.select(Some(0));
            self.notify(NoticeLevel::Success, "All progress has been reset");
        }
        self.current_screen = Screen::MainMenu;
    }

    pub fn render(&mut self, frame: &mut Frame) {
        match self.current_screen {
            Screen::MainMenu => self.render_main_menu(frame),
            Screen::MissionSelect => self.render_mission_select(frame),
            Screen::Mission => self.render_mission(frame),
            Screen::Leaderboard => self.render_leaderboard(frame),
            Screen::MissionLog => self.render_mission_log(frame),
            Screen::Workbench => self.render_workbench(frame),
            Screen::QrTools => self.render_qr_tools(frame),
            Screen::Help => self.render_help(frame),
            Screen::ConfirmReset => {
                self.render_main_menu(frame);
                self.render_confirm_reset(frame);
            }
        }

        if let Some(done) = self.completed {
            self.render_completion(frame, done);
        }
        if self.show_help {
            self.render_help_overlay(frame);
        }
    }

    /// Header, body and notice line; returns the body area
    fn render_frame(&self, frame: &mut Frame, title: &str, right: &str) -> Rect {
        let area = frame.area();
        frame.render_widget(Clear, area);
        let rows = create_main_layout(area);

        let header = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(16),
                Constraint::Min(20),
                Constraint::Length(24),
            ])
            .split(rows[0]);
        let bordered = || {
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.border))
        };

        frame.render_widget(
            Paragraph::new(SMALL_LOGO)
                .style(Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD))
                .block(bordered()),
            header[0],
        );
        frame.render_widget(
            Paragraph::new(title.to_string())
                .style(Style::default().fg(self.theme.warning))
                .alignment(Alignment::Center)
                .block(bordered()),
            header[1],
        );
        frame.render_widget(
            Paragraph::new(right.to_string())
                .style(Style::default().fg(self.theme.fg))
                .alignment(Alignment::Right)
                .block(bordered()),
            header[2],
        );

        self.render_notice(frame, rows[2]);
        rows[1]
    }

    fn render_notice(&self, frame: &mut Frame, area: Rect) {
        match &self.notice {
            Some(notice) => frame.render_widget(NoticeLine::new(&notice.message, notice.level), area),
            None => frame.render_widget(
                Paragraph::new(" ? help | Esc back").style(Style::default().fg(self.theme.muted)),
                area,
            ),
        }
    }

    fn render_main_menu(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Clear, area);

        let menu_height = MENU_ITEMS.len() as u16 + 2;
        let logo_height = LOGO.lines().count() as u16;
        let show_logo = area.height >= logo_height + menu_height + 3;

        let mut y = 1;
        if show_logo {
            y = area.height.saturating_sub(logo_height + menu_height + 2) / 2;
            let logo = Paragraph::new(LOGO)
                .style(Style::default().fg(self.theme.accent))
                .alignment(Alignment::Center);
            frame.render_widget(logo, Rect::new(area.x, y, area.width, logo_height));
            y += logo_height + 1;
        } else {
            let title = Paragraph::new("═══ CIPHER QUEST ═══")
                .style(Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD))
                .alignment(Alignment::Center);
            frame.render_widget(title, Rect::new(area.x, y, area.width, 1));
            y += 2;
        }

        let rank = self.game.rank();
        let status = format!(
            "{} {}  |  {}/{} missions",
            rank.icon(),
            rank,
            self.game.ledger().completed_count(),
            self.game.catalog().len()
        );
        frame.render_widget(
            Paragraph::new(status)
                .style(Style::default().fg(self.theme.header))
                .alignment(Alignment::Center),
            Rect::new(area.x, y.min(area.height.saturating_sub(1)), area.width, 1),
        );
        y += 1;

        let menu_area = Rect::new(
            area.width / 4,
            y.min(area.height.saturating_sub(menu_height)),
            area.width / 2,
            menu_height.min(area.height.saturating_sub(y)),
        );
        let items: Vec<ListItem> = MENU_ITEMS
            .iter()
            .map(|item| ListItem::new(format!("  ▶ {}", item)))
            .collect();
        let menu = List::new(items)
            .block(styled_block("Main Menu", &self.theme))
            .highlight_style(
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            )
            .highlight_symbol("→ ");
        frame.render_stateful_widget(menu, menu_area, &mut self.menu_state);

        if area.height > 1 {
            self.render_notice(frame, Rect::new(0, area.height - 1, area.width, 1));
        }
    }

    fn render_mission_select(&mut self, frame: &mut Frame) {
        let right = format!(" {} {} ", self.game.rank().icon(), self.game.rank());
        let body = self.render_frame(frame, "Mission Select", &right);
        let columns = create_content_layout(body);

        let summaries = self.game.summaries();
        let done = summaries.iter().filter(|s| s.is_completed).count() as u32;

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(5)])
            .split(columns[0]);
        let bar_block = styled_block("Progress", &self.theme);
        let bar_area = bar_block.inner(side[0]);
        frame.render_widget(bar_block, side[0]);
        frame.render_widget(
            ProgressBar::new("Missions", done, summaries.len() as u32).color(self.theme.success),
            bar_area,
        );

        let catalog = self.game.catalog();
        let mut lines: Vec<Line> = crate::data::Difficulty::all()
            .into_iter()
            .map(|d| {
                let solved = summaries
                    .iter()
                    .filter(|s| s.difficulty == d && s.is_completed)
                    .count();
                Line::from(vec![
                    Span::styled(format!("{} {:<7}", d.symbol(), d.to_string()), Style::default().fg(difficulty_color(d))),
                    Span::raw(format!(" {}/{}", solved, catalog.count_by_difficulty(d))),
                ])
            })
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(format!(
            "Hints used: {}",
            self.game.ledger().progress().total_hints()
        )));
        frame.render_widget(
            Paragraph::new(lines).block(styled_block("Dossier", &self.theme)),
            side[1],
        );

        let items: Vec<ListItem> = summaries
            .iter()
            .map(|s| {
                let (mark, style) = if s.is_completed {
                    ("✔", Style::default().fg(self.theme.success))
                } else if s.is_locked {
                    ("🔒", Style::default().fg(self.theme.muted))
                } else {
                    ("▶", Style::default().fg(self.theme.fg))
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!(" {} {:02} ", mark, s.id), style),
                    Span::styled(format!("{:<36}", s.name), style),
                    Span::styled(
                        format!("{:<7}", s.difficulty.to_string()),
                        Style::default().fg(difficulty_color(s.difficulty)),
                    ),
                    Span::styled(format!(" {}", s.crypto_type), Style::default().fg(self.theme.muted)),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(styled_block("Missions", &self.theme))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        frame.render_stateful_widget(list, columns[1], &mut self.mission_state);
    }

    fn render_mission(&mut self, frame: &mut Frame) {
        let Some(mission) = self.game.current_mission().cloned() else {
            self.current_screen = Screen::MissionSelect;
            return;
        };
        let Some(attempt) = self.game.attempt().cloned() else {
            return;
        };

        let title = format!("#{:02} {}", mission.id, mission.title);
        let right = format!(" ⏱ {} ", self.game.elapsed());
        let body = self.render_frame(frame, &title, &right);
        let columns = create_content_layout(body);

        // Side panel: mission facts and field checks
        let mut info = vec![
            Line::from(vec![
                Span::raw("Difficulty: "),
                Span::styled(mission.difficulty.to_string(), Style::default().fg(difficulty_color(mission.difficulty))),
            ]),
            Line::from(format!("Type: {}", mission.crypto_type)),
            Line::from(format!("Hints used: {}", self.game.ledger().hints_used(mission.id))),
            Line::from(if self.game.ledger().is_completed(mission.id) {
                Span::styled("Status: COMPLETED", Style::default().fg(self.theme.success))
            } else {
                Span::raw("Status: OPEN")
            }),
            Line::from(""),
        ];
        if let Some(loc) = &mission.location {
            info.push(Line::from(format!("📍 Go to: {}", loc.label)));
            info.push(Line::from(format!("   {:.4}, {:.4} ({:.0} m)", loc.latitude, loc.longitude, loc.radius_meters)));
            info.push(check_line("Location", attempt.location_verified, &self.theme));
        }
        if mission.qr.is_some() {
            info.push(check_line("QR code", attempt.qr_scanned, &self.theme));
        }
        info.push(Line::from(""));
        info.push(Line::from("[i] Answer  [h] Hint"));
        if mission.requires_location() {
            info.push(Line::from("[l] Verify location"));
        }
        if mission.requires_qr() {
            info.push(Line::from("[s] Scan QR code"));
        }
        info.push(Line::from("[c] Clear  [Esc] Back"));
        frame.render_widget(
            Paragraph::new(info)
                .wrap(Wrap { trim: false })
                .block(styled_block("Mission", &self.theme)),
            columns[0],
        );

        let main = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),      // Brief
                Constraint::Length(5),   // Challenge
                Constraint::Length(4),   // Hint
                Constraint::Length(3),   // Answer
            ])
            .split(columns[1]);

        frame.render_widget(
            Paragraph::new(mission.brief.clone())
                .style(Style::default().fg(self.theme.fg))
                .wrap(Wrap { trim: true })
                .block(styled_block("Briefing", &self.theme)),
            main[0],
        );
        frame.render_widget(
            Paragraph::new(mission.challenge.clone())
                .style(Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD))
                .wrap(Wrap { trim: false })
                .block(styled_block("Intercepted Transmission", &self.theme)),
            main[1],
        );

        let hint_title = if attempt.hint_shown {
            format!("Hint {}/{}", attempt.hint_index + 1, mission.hints.len())
        } else {
            "Hint".to_string()
        };
        let hint = self
            .hint_text
            .clone()
            .unwrap_or_else(|| "Press h for a hint".to_string());
        frame.render_widget(
            Paragraph::new(hint)
                .style(Style::default().fg(self.theme.warning))
                .wrap(Wrap { trim: true })
                .block(styled_block(&hint_title, &self.theme)),
            main[2],
        );

        let (answer_text, answer_title) = match self.input_mode {
            InputMode::QrPayload => (format!("{}█", self.input_buffer), "QR code text (Enter to scan)"),
            InputMode::Answer => (format!("{}█", attempt.draft), "Answer (Enter to submit)"),
            _ => (attempt.draft.clone(), "Answer"),
        };
        frame.render_widget(
            Paragraph::new(answer_text)
                .style(Style::default().fg(self.theme.fg))
                .block(styled_block(answer_title, &self.theme)),
            main[3],
        );
    }

    fn render_leaderboard(&self, frame: &mut Frame) {
        let rank = self.game.rank();
        let right = format!(" {} {} ", rank.icon(), rank);
        let body = self.render_frame(frame, "Top Agents", &right);

        let player_id = &self.game.player().id;
        let rows: Vec<Row> = self
            .leaderboard
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let style = if &entry.id == player_id {
                    Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(self.theme.fg)
                };
                Row::new(vec![
                    Cell::from(format!("#{}", i + 1)),
                    Cell::from(entry.name.clone()),
                    Cell::from(entry.completed_levels.to_string()),
                    Cell::from(entry.total_time.clone()),
                    Cell::from(entry.rank.clone()),
                ])
                .style(style)
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(5),
                Constraint::Min(16),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(22),
            ],
        )
        .header(
            Row::new(vec!["Rank", "Agent", "Missions", "Time", "Title"])
                .style(Style::default().fg(self.theme.header).add_modifier(Modifier::BOLD)),
        )
        .block(styled_block("Leaderboard", &self.theme));

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(3)])
            .split(body);
        frame.render_widget(table, parts[0]);

        let next = match rank {
            AgentRank::Recruit => Some(3),
            AgentRank::Analyst => Some(5),
            AgentRank::FieldOperative => Some(7),
            AgentRank::SeniorAgent => Some(9),
            AgentRank::MasterCryptographer => None,
        };
        let done = self.game.ledger().completed_count();
        let footer = match next {
            Some(target) => format!(
                "You: {} {} with {} missions. {} more for the next rank.",
                rank.icon(),
                rank,
                done,
                target - done.min(target)
            ),
            None => format!("You: {} {} with {} missions.", rank.icon(), rank, done),
        };
        frame.render_widget(
            Paragraph::new(footer).block(styled_block("Your Standing", &self.theme)),
            parts[1],
        );
    }

    fn render_workbench(&self, frame: &mut Frame) {
        let bench = &self.workbench;
        let right = format!(" {} ", bench.direction);
        let body = self.render_frame(frame, "Cipher Workbench", &right);

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),   // Transform picker
                Constraint::Length(3),   // Key
                Constraint::Min(4),      // Input
                Constraint::Min(4),      // Output
            ])
            .split(body);

        let picker: Vec<Span> = WORKBENCH_TRANSFORMS
            .iter()
            .enumerate()
            .flat_map(|(i, name)| {
                let style = if i == bench.transform {
                    Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    Style::default().fg(self.theme.muted)
                };
                [Span::styled(format!(" {} ", name), style), Span::raw(" ")]
            })
            .collect();
        frame.render_widget(
            Paragraph::new(Line::from(picker)).block(styled_block("Transform [←/→]  Direction [d]", &self.theme)),
            parts[0],
        );

        let cursor = |mode: InputMode| if self.input_mode == mode { "█" } else { "" };
        let key_text = if bench.uses_key() {
            format!("{}{}", bench.key, cursor(InputMode::WorkbenchKey))
        } else {
            "(no key)".to_string()
        };
        frame.render_widget(
            Paragraph::new(key_text).block(styled_block("Key [k]", &self.theme)),
            parts[1],
        );
        frame.render_widget(
            Paragraph::new(format!("{}{}", bench.input, cursor(InputMode::WorkbenchText)))
                .wrap(Wrap { trim: false })
                .block(styled_block("Input [i]", &self.theme)),
            parts[2],
        );

        let (output, style) = match &bench.output {
            Ok(text) => (text.clone(), Style::default().fg(self.theme.success)),
            Err(e) => (e.to_string(), Style::default().fg(self.theme.alert)),
        };
        frame.render_widget(
            Paragraph::new(output)
                .style(style)
                .wrap(Wrap { trim: false })
                .block(styled_block("Output", &self.theme)),
            parts[3],
        );
    }

    fn render_mission_log(&mut self, frame: &mut Frame) {
        let right = format!(" {} completed ", self.game.ledger().completed_count());
        let body = self.render_frame(frame, "Agent Mission Logs", &right);
        let entries = self.game.mission_log();

        if entries.is_empty() {
            let text = vec![
                Line::from(""),
                Line::from("No completed missions yet."),
                Line::from(Span::styled(
                    "Complete your first mission to see it in your logs.",
                    Style::default().fg(self.theme.muted),
                )),
            ];
            frame.render_widget(
                Paragraph::new(text)
                    .alignment(Alignment::Center)
                    .block(styled_block("Mission Log", &self.theme)),
                body,
            );
            return;
        }

        let now = Utc::now();
        let items: Vec<ListItem> = entries
            .iter()
            .map(|entry| log_item(entry, now, &self.theme))
            .collect();
        let list = List::new(items)
            .block(styled_block("Mission Log", &self.theme))
            .highlight_style(Style::default().add_modifier(Modifier::BOLD));
        frame.render_stateful_widget(list, body, &mut self.log_state);
    }

    fn render_qr_tools(&mut self, frame: &mut Frame) {
        let body = self.render_frame(frame, "QR Code Tools", " print or scan ");
        let columns = create_content_layout(body);

        let missions = qr_missions(self.game.catalog());
        let items: Vec<ListItem> = missions
            .iter()
            .map(|m| {
                let payload = mission_payload(m).unwrap_or_default();
                let preview: String = payload.chars().take(20).collect();
                let more = if payload.chars().count() > 20 { "..." } else { "" };
                ListItem::new(vec![
                    Line::from(format!("Level {}: {}", m.id, m.title)),
                    Line::from(Span::styled(
                        format!("  {}{}", preview, more),
                        Style::default().fg(self.theme.muted),
                    )),
                ])
            })
            .collect();
        let highlight = if self.qr_tools.show_custom {
            Style::default()
        } else {
            Style::default().fg(self.theme.accent).add_modifier(Modifier::REVERSED)
        };
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(6), Constraint::Length(4)])
            .split(columns[0]);
        frame.render_stateful_widget(
            List::new(items)
                .block(styled_block("Mission QR Codes", &self.theme))
                .highlight_style(highlight),
            side[0],
            &mut self.qr_tools.mission_state,
        );

        let cursor = if self.input_mode == InputMode::QrText { "█" } else { "" };
        frame.render_widget(
            Paragraph::new(format!("{}{}", self.qr_tools.custom, cursor))
                .wrap(Wrap { trim: false })
                .block(styled_block("Custom text [t]", &self.theme)),
            side[1],
        );

        let (title, value) = if self.qr_tools.show_custom {
            ("Custom QR Code".to_string(), self.qr_tools.custom.clone())
        } else {
            match self
                .qr_tools
                .mission_state
                .selected()
                .and_then(|i| missions.get(i))
            {
                Some(m) => (
                    format!("Level {}: {}", m.id, m.title),
                    mission_payload(m).unwrap_or_default().to_string(),
                ),
                None => ("No QR missions found".to_string(), String::new()),
            }
        };

        let block = styled_block(&title, &self.theme);
        let inner = block.inner(columns[1]);
        frame.render_widget(block, columns[1]);
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        match render_qr(&value) {
            Ok(image) => frame.render_widget(
                Paragraph::new(image)
                    .style(Style::default().fg(Color::White).bg(Color::Black))
                    .alignment(Alignment::Center),
                parts[0],
            ),
            Err(e) => frame.render_widget(
                Paragraph::new(e.to_string())
                    .style(Style::default().fg(self.theme.muted))
                    .alignment(Alignment::Center),
                parts[0],
            ),
        }
        frame.render_widget(
            Paragraph::new(format!("Value: {}", value))
                .style(Style::default().fg(self.theme.muted))
                .alignment(Alignment::Center),
            parts[1],
        );
    }

    fn render_confirm_reset(&self, frame: &mut Frame) {
        let popup = centered_rect(48, 8, frame.area());
        frame.render_widget(Clear, popup);
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Reset all progress?",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from("This cannot be undone."),
            Line::from(""),
            Line::from("[y] Yes, wipe it   [n] No"),
        ];
        frame.render_widget(
            Paragraph::new(text).alignment(Alignment::Center).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .title(" Confirm "),
            ),
            popup,
        );
    }

    fn render_completion(&self, frame: &mut Frame, done: Completion) {
        let popup = centered_rect(50, 8, frame.area());
        frame.render_widget(Clear, popup);
        let mut lines = vec![
            String::new(),
            format!("Mission {:02} decrypted.", done.mission_id),
            format!("Total time: {}", self.game.total_time()),
            String::new(),
        ];
        lines.push(match done.next {
            Some(next) => format!("Enter: mission {:02}   Esc: mission list", next),
            None => "All missions complete. Esc: mission list".to_string(),
        });
        frame.render_widget(
            DramaticBox::new("MISSION COMPLETE")
                .content(lines)
                .border_color(self.theme.success),
            popup,
        );
    }

    fn render_help_overlay(&self, frame: &mut Frame) {
        let popup = centered_rect(70, 36, frame.area());
        frame.render_widget(Clear, popup);
        let help = Paragraph::new(HELP_TEXT)
            .style(Style::default().fg(self.theme.fg))
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(self.theme.accent)));
        frame.render_widget(help, popup);
    }

    fn render_help(&self, frame: &mut Frame) {
        let body = self.render_frame(frame, "Field Manual", "");
        let help = Paragraph::new(HELP_TEXT)
            .style(Style::default().fg(self.theme.fg))
            .block(styled_block("Help", &self.theme));
        frame.render_widget(help, body);
    }
}

fn check_line<'a>(label: &str, passed: bool, theme: &Theme) -> Line<'a> {
    if passed {
        Line::from(Span::styled(format!("✔ {} verified", label), Style::default().fg(theme.success)))
    } else {
        Line::from(Span::styled(format!("✖ {} required", label), Style::default().fg(theme.warning)))
    }
}

fn hints_label(count: u32) -> String {
    match count {
        0 => "No hints used".to_string(),
        1 => "1 hint used".to_string(),
        n => format!("{} hints used", n),
    }
}

fn log_item<'a>(entry: &LogEntry, now: chrono::DateTime<Utc>, theme: &Theme) -> ListItem<'a> {
    let when = match entry.completed_at {
        Some(at) => format!("{} ({})", time_ago(at, now), at.format("%Y-%m-%d %H:%M")),
        None => "date unknown".to_string(),
    };
    ListItem::new(vec![
        Line::from(vec![
            Span::styled(
                format!("Mission {}: {}", entry.id, entry.title),
                Style::default().fg(theme.accent),
            ),
            Span::styled(format!("  {}", when), Style::default().fg(theme.muted)),
        ]),
        Line::from(format!("  Crypto Method: {}", entry.crypto_type)),
        Line::from(Span::styled(
            format!("  {}", hints_label(entry.hints_used)),
            Style::default().fg(theme.muted),
        )),
        Line::from(""),
    ])
}

fn select_previous(state: &mut ListState) {
    let i = state.selected().unwrap_or(0);
    state.select(Some(i.saturating_sub(1)));
}

fn select_next(state: &mut ListState, len: usize) {
    let i = state.selected().unwrap_or(0);
    if i + 1 < len {
        state.select(Some(i + 1));
    }
}

//! Terminal User Interface
//!
//! ratatui front end: menus, the mission screen and the cipher workbench

pub mod app;
pub mod widgets;

pub use app::App;

use crate::data::Difficulty;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
};

/// Color scheme for the game
pub struct Theme {
    pub fg: Color,
    pub accent: Color,
    pub alert: Color,
    pub success: Color,
    pub warning: Color,
    pub muted: Color,
    pub border: Color,
    pub header: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: Color::White,
            accent: Color::Cyan,
            alert: Color::Red,
            success: Color::Green,
            warning: Color::Yellow,
            muted: Color::DarkGray,
            border: Color::DarkGray,
            header: Color::Magenta,
        }
    }
}

impl Theme {
    /// Everything goes green
    pub fn matrix() -> Self {
        Self {
            fg: Color::Green,
            accent: Color::LightGreen,
            alert: Color::LightGreen,
            success: Color::Green,
            warning: Color::LightGreen,
            muted: Color::Green,
            border: Color::Green,
            header: Color::LightGreen,
        }
    }

    /// Monochrome look for agent mode
    pub fn agent() -> Self {
        Self {
            fg: Color::Gray,
            accent: Color::White,
            alert: Color::White,
            success: Color::White,
            warning: Color::Gray,
            muted: Color::DarkGray,
            border: Color::DarkGray,
            header: Color::White,
        }
    }
}

pub fn difficulty_color(difficulty: Difficulty) -> Color {
    match difficulty {
        Difficulty::Easy => Color::Green,
        Difficulty::Medium => Color::Yellow,
        Difficulty::Hard => Color::Red,
    }
}

/// How loud a status line notice is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

impl NoticeLevel {
    pub fn color(&self) -> Color {
        match self {
            NoticeLevel::Info => Color::Cyan,
            NoticeLevel::Success => Color::Green,
            NoticeLevel::Error => Color::Red,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "ℹ",
            NoticeLevel::Success => "✔",
            NoticeLevel::Error => "✖",
        }
    }
}

/// Create a styled border block
pub fn styled_block<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
}

/// ASCII art logo
pub const LOGO: &str = r#"
  ██████╗██╗██████╗ ██╗  ██╗███████╗██████╗
 ██╔════╝██║██╔══██╗██║  ██║██╔════╝██╔══██╗
 ██║     ██║██████╔╝███████║█████╗  ██████╔╝
 ██║     ██║██╔═══╝ ██╔══██║██╔══╝  ██╔══██╗
 ╚██████╗██║██║     ██║  ██║███████╗██║  ██║
  ╚═════╝╚═╝╚═╝     ╚═╝  ╚═╝╚══════╝╚═╝  ╚═╝
        ██████╗ ██╗   ██╗███████╗███████╗████████╗
       ██╔═══██╗██║   ██║██╔════╝██╔════╝╚══██╔══╝
       ██║   ██║██║   ██║█████╗  ███████╗   ██║
       ██║▄▄ ██║██║   ██║██╔══╝  ╚════██║   ██║
       ╚██████╔╝╚██████╔╝███████╗███████║   ██║
        ╚══▀▀═╝  ╚═════╝ ╚══════╝╚══════╝   ╚═╝

          Field Operations Against ENIGMA
"#;

/// Smaller logo for header
pub const SMALL_LOGO: &str = " CIPHER QUEST ";

/// Help text
pub const HELP_TEXT: &str = r#"
╔═══════════════════════════════════════════════════════════════╗
║                       CONTROLS                                ║
╠═══════════════════════════════════════════════════════════════╣
║  ↑/↓   Navigate menus and lists                               ║
║  Enter Select / submit answer                                 ║
║  Esc   Go back / cancel                                       ║
║  ?     This help                                              ║
║  q     Quit (outside text input)                              ║
╠═══════════════════════════════════════════════════════════════╣
║                    MISSION SCREEN                             ║
╠═══════════════════════════════════════════════════════════════╣
║  i     Type an answer                                         ║
║  h     Reveal the next hint                                   ║
║  l     Verify your location (field missions)                  ║
║  s     Scan a QR code (type its text)                         ║
║  c     Clear the answer and checks                            ║
╠═══════════════════════════════════════════════════════════════╣
║                    CIPHER WORKBENCH                           ║
╠═══════════════════════════════════════════════════════════════╣
║  ←/→   Pick a transform                                       ║
║  d     Switch encode / decode                                 ║
║  k     Edit the key                                           ║
║  i     Edit the input text                                    ║
╠═══════════════════════════════════════════════════════════════╣
║                            QR TOOLS                           ║
╠═══════════════════════════════════════════════════════════════╣
║  ↑/↓   Pick a mission code                                    ║
║  t     Type any text to encode                                ║
╚═══════════════════════════════════════════════════════════════╝
"#;

/// Create the main layout
pub fn create_main_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),   // Header
            Constraint::Min(10),     // Main content
            Constraint::Length(1),   // Notice line
        ])
        .split(area)
        .to_vec()
}

/// Side panel plus main area
pub fn create_content_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(70),
        ])
        .split(area)
        .to_vec()
}

/// A box of the given size centered in `area`
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_fits_inside() {
        let outer = Rect::new(0, 0, 80, 24);
        assert_eq!(centered_rect(40, 10, outer), Rect::new(20, 7, 40, 10));
        assert_eq!(centered_rect(100, 50, outer), outer);
    }

    #[test]
    fn main_layout_has_three_rows() {
        let rows = create_main_layout(Rect::new(0, 0, 80, 24));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].height, 3);
        assert_eq!(rows[2].height, 1);
    }
}

//! Custom widgets for the game UI

use super::NoticeLevel;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

/// Completed-out-of-total bar for the mission list
pub struct ProgressBar {
    done: u32,
    total: u32,
    label: String,
    color: Color,
}

impl ProgressBar {
    pub fn new(label: &str, done: u32, total: u32) -> Self {
        Self {
            done,
            total,
            label: label.to_string(),
            color: Color::Green,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Filled cells for a bar `width` cells wide
    pub fn filled(done: u32, total: u32, width: u16) -> u16 {
        if total == 0 {
            return 0;
        }
        let done = done.min(total) as u64;
        ((done * width as u64) / total as u64) as u16
    }
}

impl Widget for ProgressBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height < 1 {
            return;
        }

        let label = format!("{}: {}/{}", self.label, self.done, self.total);
        buf.set_string(area.x, area.y, &label, Style::default().fg(self.color));

        if area.height > 1 {
            let bar_y = area.y + 1;
            let inner = area.width - 2;
            let filled = Self::filled(self.done, self.total, inner);

            buf.set_string(area.x, bar_y, "[", Style::default());
            buf.set_string(area.x + area.width - 1, bar_y, "]", Style::default());
            for x in 0..filled {
                buf.set_string(area.x + 1 + x, bar_y, "█", Style::default().fg(self.color));
            }
            for x in filled..inner {
                buf.set_string(area.x + 1 + x, bar_y, "░", Style::default().fg(Color::DarkGray));
            }
        }
    }
}

/// One-line transient message at the bottom of the screen
pub struct NoticeLine<'a> {
    message: &'a str,
    level: NoticeLevel,
}

impl<'a> NoticeLine<'a> {
    pub fn new(message: &'a str, level: NoticeLevel) -> Self {
        Self { message, level }
    }
}

impl Widget for NoticeLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let text = format!("{} {}", self.level.symbol(), self.message);
        let style = Style::default()
            .fg(self.level.color())
            .add_modifier(Modifier::BOLD);
        buf.set_stringn(area.x, area.y, &text, area.width as usize, style);
    }
}

/// Double-lined box for mission results
pub struct DramaticBox {
    title: String,
    content: Vec<String>,
    border_color: Color,
}

impl DramaticBox {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            content: Vec::new(),
            border_color: Color::Green,
        }
    }

    pub fn content(mut self, lines: Vec<String>) -> Self {
        self.content = lines;
        self
    }

    pub fn border_color(mut self, color: Color) -> Self {
        self.border_color = color;
        self
    }
}

impl Widget for DramaticBox {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title_width = self.title.chars().count() as u16 + 2;
        if area.width < title_width + 2 || area.height < 2 {
            return;
        }
        let style = Style::default().fg(self.border_color);
        let right = area.x + area.width - 1;
        let bottom = area.y + area.height - 1;

        buf.set_string(area.x, area.y, "╔", style);
        buf.set_string(right, area.y, "╗", style);
        buf.set_string(area.x, bottom, "╚", style);
        buf.set_string(right, bottom, "╝", style);
        for x in area.x + 1..right {
            buf.set_string(x, area.y, "═", style);
            buf.set_string(x, bottom, "═", style);
        }
        for y in area.y + 1..bottom {
            buf.set_string(area.x, y, "║", style);
            buf.set_string(right, y, "║", style);
        }

        let title_x = area.x + (area.width - title_width) / 2;
        buf.set_string(
            title_x,
            area.y,
            format!(" {} ", self.title),
            style.add_modifier(Modifier::BOLD),
        );

        let max_width = area.width.saturating_sub(4) as usize;
        for (i, line) in self.content.iter().enumerate() {
            let y = area.y + 1 + i as u16;
            if y >= bottom {
                break;
            }
            buf.set_stringn(area.x + 2, y, line, max_width, Style::default().fg(Color::White));
        }
    }
}

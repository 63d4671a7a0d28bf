use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};

use crate::render::DisplaySlots;
use crate::timer::color::Shade;

/// Terminal rendition of the three display slots.
///
/// Holds whatever the renderer last wrote; drawing it is side-effect free,
/// so the screen can be redrawn on resize without a render step.
pub struct TimerView {
    title: String,
    clock: String,
    text: String,
    background: Option<Shade>,
}

impl TimerView {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            clock: String::new(),
            text: String::new(),
            background: None,
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }
}

impl DisplaySlots for TimerView {
    fn set_clock(&mut self, clock: &str) {
        self.clock = clock.to_string();
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    fn set_background(&mut self, color: Shade) {
        self.background = Some(color);
    }
}

/// Black or white, whichever reads better on `bg`.
fn foreground_for(bg: [u8; 3]) -> Color {
    let [r, g, b] = bg.map(u32::from);
    // Integer approximation of perceived luminance (ITU-R BT.601).
    let luma = (299 * r + 587 * g + 114 * b) / 1000;
    if luma > 140 {
        Color::Black
    } else {
        Color::White
    }
}

impl Widget for &TimerView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (bg, fg) = match self.background {
            Some(shade) => {
                let bytes = shade.to_bytes();
                let [r, g, b] = bytes;
                (Color::Rgb(r, g, b), foreground_for(bytes))
            }
            None => (Color::Reset, Color::White),
        };
        let style = Style::default().bg(bg).fg(fg);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .style(style);
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1), // clock
            Constraint::Length(1),
            Constraint::Length(2), // status text
            Constraint::Fill(1),
        ])
        .split(inner);

        let clock = if self.clock.is_empty() { "--:--:--" } else { self.clock.as_str() };
        Paragraph::new(Line::from(Span::styled(
            clock,
            style.add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(rows[1], buf);

        Paragraph::new(Line::from(Span::styled(self.text.as_str(), style)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(rows[3], buf);
    }
}

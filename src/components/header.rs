use crate::styles::theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph};

/// Top bar: app name, screen title, and a right-aligned status (the signed-in
/// user, or "offline").
pub struct Header;

impl Header {
    pub const HEIGHT: u16 = 3;

    pub fn render(frame: &mut Frame, area: Rect, title: &str, status: &str) {
        let t = theme();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(t.border_focused_style())
            .title(Line::from(" rollbook ").style(t.title_style()))
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [left, right] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(status_width(status))])
                .areas(inner);
        frame.render_widget(Paragraph::new(title).style(t.text_style()), left);
        frame.render_widget(
            Paragraph::new(status)
                .style(t.muted_style())
                .alignment(Alignment::Right),
            right,
        );
    }
}

fn status_width(status: &str) -> u16 {
    status.chars().count().min(u16::MAX as usize) as u16
}

use crate::styles::theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Bottom key-hint bar.
pub struct Footer;

impl Footer {
    pub const HEIGHT: u16 = 2;

    /// Render `"Key: Label | Key: Label"` hints, keys highlighted.
    pub fn render(frame: &mut Frame, area: Rect, hints: &str) {
        let t = theme();
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(t.border_style());
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new(hint_line(hints)).alignment(Alignment::Center),
            inner,
        );
    }
}

pub fn hint_line(hints: &str) -> Line<'_> {
    let t = theme();
    let mut spans = Vec::new();
    for (i, part) in hints.split(" | ").enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", t.muted_style()));
        }
        match part.split_once(": ") {
            Some((key, label)) => {
                spans.push(Span::styled(key, t.key_style()));
                spans.push(Span::styled(": ", t.muted_style()));
                spans.push(Span::styled(label, t.text_style()));
            }
            None => spans.push(Span::styled(part, t.text_style())),
        }
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_line_splits_keys_and_labels() {
        let line = hint_line("C: Add | Q: Quit");
        let text: Vec<&str> = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, vec!["C", ": ", "Add", " | ", "Q", ": ", "Quit"]);
    }
}

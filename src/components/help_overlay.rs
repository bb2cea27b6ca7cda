//! Key binding reference shown with `?`.

use crate::keymap::{Action, Keymap};
use crate::styles::theme;
use crate::utils::center_popup;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

const CATEGORY_ORDER: [&str; 6] = [
    "Students",
    "Navigation",
    "Dialogs",
    "Forms",
    "Account",
    "Global",
];

pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame, area: Rect, keymap: &Keymap, config_path: &str) {
        let t = theme();
        let popup = center_popup(area, 70, area.height.saturating_sub(4).max(10));
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(t.border_focused_style())
            .title(
                Line::from(format!(" Keyboard Shortcuts ({}) ", keymap.preset.name()))
                    .style(t.title_style()),
            )
            .title_bottom(
                Line::from(format!(" Customize in {config_path} | Esc: Close ")).style(t.muted_style()),
            );
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        frame.render_widget(
            Paragraph::new(help_lines(keymap)).wrap(Wrap { trim: false }),
            inner,
        );
    }
}

/// One heading per category, then `key  description` rows.
pub fn help_lines(keymap: &Keymap) -> Vec<Line<'static>> {
    let t = theme();
    let bindings = keymap.all_bindings();
    let mut lines = Vec::new();

    for category in CATEGORY_ORDER {
        let mut seen: Vec<Action> = Vec::new();
        let rows: Vec<Line<'static>> = bindings
            .iter()
            .filter(|b| b.action.category() == category)
            .filter_map(|b| {
                if seen.contains(&b.action) {
                    return None;
                }
                seen.push(b.action);
                let keys: Vec<String> = bindings
                    .iter()
                    .filter(|other| other.action == b.action)
                    .map(|other| other.display())
                    .collect();
                Some(Line::from(vec![
                    Span::styled(format!("  {:<16}", keys.join(", ")), t.key_style()),
                    Span::styled(b.description().to_string(), t.text_style()),
                ]))
            })
            .collect();

        if rows.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(category, t.title_style())));
        lines.extend(rows);
    }
    lines
}

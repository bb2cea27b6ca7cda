//! Centered modal box drawn over the records table.

use crate::styles::theme;
use crate::utils::center_popup;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DialogVariant {
    #[default]
    Default,
    Danger,
}

/// Frame of a dialog; the caller fills the area returned by [`Dialog::render`].
pub struct Dialog<'a> {
    title: &'a str,
    footer: Option<String>,
    width_percent: u16,
    height: u16,
    variant: DialogVariant,
}

impl<'a> Dialog<'a> {
    pub fn new(title: &'a str) -> Self {
        Self {
            title,
            footer: None,
            width_percent: 60,
            height: 10,
            variant: DialogVariant::Default,
        }
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn width(mut self, percent: u16) -> Self {
        self.width_percent = percent;
        self
    }

    /// Total height in rows, borders included.
    pub fn height(mut self, rows: u16) -> Self {
        self.height = rows;
        self
    }

    pub fn variant(mut self, variant: DialogVariant) -> Self {
        self.variant = variant;
        self
    }

    fn block(&self) -> Block<'a> {
        let t = theme();
        let border_style = match self.variant {
            DialogVariant::Default => t.border_focused_style(),
            DialogVariant::Danger => t.error_style(),
        };
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(Line::from(format!(" {} ", self.title)).style(t.title_style()))
            .padding(Padding::horizontal(1));
        if let Some(footer) = &self.footer {
            block = block.title_bottom(Line::from(format!(" {footer} ")).style(t.muted_style()));
        }
        block
    }

    /// Clear the popup area, draw the frame and return its inner area.
    pub fn render(self, frame: &mut Frame, area: Rect) -> Rect {
        let popup = center_popup(area, self.width_percent, self.height);
        let block = self.block();
        let inner = block.inner(popup);
        frame.render_widget(Clear, popup);
        frame.render_widget(block, popup);
        inner
    }
}

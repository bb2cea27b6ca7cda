//! Rendering for [`TextInput`]: bordered box, placeholder, masking and the
//! terminal cursor.

use crate::styles::theme;
use crate::utils::TextInput;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

pub struct TextInputWidget<'a> {
    input: &'a TextInput,
    title: Option<&'a str>,
    placeholder: Option<&'a str>,
    focused: bool,
    masked: bool,
    /// Empty on the last submit attempt.
    missing: bool,
}

impl<'a> TextInputWidget<'a> {
    pub fn new(input: &'a TextInput) -> Self {
        Self {
            input,
            title: None,
            placeholder: None,
            focused: false,
            masked: false,
            missing: false,
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn masked(mut self, masked: bool) -> Self {
        self.masked = masked;
        self
    }

    pub fn missing(mut self, missing: bool) -> Self {
        self.missing = missing;
        self
    }

    fn block(&self) -> Block<'a> {
        let t = theme();
        let border_style = if self.missing {
            t.border_missing_style()
        } else if self.focused {
            t.border_focused_style()
        } else {
            t.border_style()
        };
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style);
        if let Some(title) = self.title {
            let title = if self.missing {
                format!(" {title} (required) ")
            } else {
                format!(" {title} ")
            };
            block = block.title(title);
        }
        block
    }

    /// Visible text for an inner width of `width` columns.
    fn visible_text(&self, width: usize) -> (String, bool) {
        if self.input.text().is_empty() {
            return (self.placeholder.unwrap_or_default().to_string(), true);
        }
        let shown = if self.masked {
            self.input.masked('•')
        } else {
            self.input.text().to_string()
        };
        let skip = self.input.scroll_offset(width);
        (shown.chars().skip(skip).collect(), false)
    }
}

impl Widget for TextInputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = self.block();
        let inner = block.inner(area);
        let (text, is_placeholder) = self.visible_text(inner.width as usize);
        let t = theme();
        let style = if is_placeholder {
            t.muted_style()
        } else {
            t.text_style()
        };
        Paragraph::new(text).style(style).block(block).render(area, buf);
    }
}

/// Render a [`TextInputWidget`] and place the terminal cursor when focused.
pub trait TextInputWidgetExt {
    fn render_text_input(&mut self, widget: TextInputWidget, area: Rect);
}

impl TextInputWidgetExt for Frame<'_> {
    fn render_text_input(&mut self, widget: TextInputWidget, area: Rect) {
        let inner = widget.block().inner(area);
        let cursor_column = if widget.focused && inner.width > 0 {
            let width = inner.width as usize;
            Some(widget.input.cursor() - widget.input.scroll_offset(width))
        } else {
            None
        };

        self.render_widget(widget, area);

        if let Some(column) = cursor_column {
            let x = inner.x + (column as u16).min(inner.width.saturating_sub(1));
            self.set_cursor_position((x, inner.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_when_empty() {
        let input = TextInput::new();
        let widget = TextInputWidget::new(&input).placeholder("e.g. 2010-04-21");
        assert_eq!(
            widget.visible_text(30),
            ("e.g. 2010-04-21".to_string(), true)
        );
    }

    #[test]
    fn test_masked_text() {
        let input = TextInput::with_text("secret");
        let widget = TextInputWidget::new(&input).masked(true);
        assert_eq!(widget.visible_text(30), ("••••••".to_string(), false));
    }

    #[test]
    fn test_long_text_scrolls_to_cursor() {
        let input = TextInput::with_text("abcdefghij");
        let widget = TextInputWidget::new(&input);
        assert_eq!(widget.visible_text(5).0, "ghij");
    }

    #[test]
    fn test_render_marks_missing_field() {
        let input = TextInput::new();
        let widget = TextInputWidget::new(&input).title("Name").missing(true);
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        let top: String = (0..30)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect();
        assert!(top.contains("Name (required)"));
    }
}

//! Row navigation for the student table.

use ratatui::widgets::TableState;

/// Rows moved by page up/down.
pub const PAGE_SIZE: usize = 10;

/// Bounded movement over a table with `rows` rows. With zero rows the
/// selection is cleared.
pub trait TableStateExt {
    fn move_up_by(&mut self, count: usize, rows: usize);

    fn move_down_by(&mut self, count: usize, rows: usize);

    fn select_first_row(&mut self, rows: usize);

    fn select_last_row(&mut self, rows: usize);

    /// Keep the selection inside `0..rows` after the row count changed.
    fn clamp_to(&mut self, rows: usize);
}

impl TableStateExt for TableState {
    fn move_up_by(&mut self, count: usize, rows: usize) {
        if rows == 0 {
            self.select(None);
            return;
        }
        let current = self.selected().unwrap_or(0).min(rows - 1);
        self.select(Some(current.saturating_sub(count)));
    }

    fn move_down_by(&mut self, count: usize, rows: usize) {
        if rows == 0 {
            self.select(None);
            return;
        }
        let next = match self.selected() {
            Some(current) => current.saturating_add(count),
            None => 0,
        };
        self.select(Some(next.min(rows - 1)));
    }

    fn select_first_row(&mut self, rows: usize) {
        self.select(if rows == 0 { None } else { Some(0) });
    }

    fn select_last_row(&mut self, rows: usize) {
        self.select(rows.checked_sub(1));
    }

    fn clamp_to(&mut self, rows: usize) {
        match (self.selected(), rows) {
            (_, 0) => self.select(None),
            (None, _) => self.select(Some(0)),
            (Some(i), n) if i >= n => self.select(Some(n - 1)),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_saturate_at_edges() {
        let mut state = TableState::default();
        state.select(Some(2));
        state.move_up_by(5, 4);
        assert_eq!(state.selected(), Some(0));
        state.move_down_by(PAGE_SIZE, 4);
        assert_eq!(state.selected(), Some(3));
    }

    #[test]
    fn test_first_move_down_selects_first_row() {
        let mut state = TableState::default();
        state.move_down_by(1, 3);
        assert_eq!(state.selected(), Some(0));
    }

    #[test]
    fn test_first_and_last() {
        let mut state = TableState::default();
        state.select_last_row(7);
        assert_eq!(state.selected(), Some(6));
        state.select_first_row(7);
        assert_eq!(state.selected(), Some(0));
        state.select_last_row(0);
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn test_clamp_after_rows_removed() {
        let mut state = TableState::default();
        state.select(Some(4));
        state.clamp_to(3);
        assert_eq!(state.selected(), Some(2));
        state.clamp_to(0);
        assert_eq!(state.selected(), None);
        state.clamp_to(2);
        assert_eq!(state.selected(), Some(0));
    }
}

//! The student table and its add/view/edit/delete dialogs.
//!
//! All record logic lives in [`RecordsState`]; this screen maps keys to its
//! actions, keeps the table selection and the single text editor used by
//! the form, and turns completions into toasts.

use crate::components::{Footer, Header};
use crate::keymap::Action;
use crate::record::{Field, Record};
use crate::screens::screen_trait::{typing_action, Screen, ScreenAction, ScreenContext};
use crate::state::{Completion, Dispatch, Modal, RecordsState};
use crate::styles::{theme, ROW_HIGHLIGHT_SYMBOL};
use crate::utils::table_navigation::PAGE_SIZE;
use crate::utils::{TableStateExt, TextInput};
use crate::widgets::{
    Dialog, DialogVariant, TextInputWidget, TextInputWidgetExt, Toast, ToastVariant,
};
use anyhow::Result;
use crossterm::event::{Event, KeyEvent, KeyEventKind};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};

const TABLE_COLUMNS: [Field; 4] = [Field::Name, Field::Class, Field::Section, Field::RollNumber];
const FORM_COLUMNS: usize = 2;
const INPUT_HEIGHT: u16 = 3;

pub struct RecordsScreen {
    state: RecordsState,
    table: TableState,
    /// Index into [`Field::ALL`] of the focused form input.
    focus: usize,
    /// Editor for the focused input; every edit is written through to the form.
    editor: TextInput,
}

impl RecordsScreen {
    pub fn new(state: RecordsState) -> Self {
        Self {
            state,
            table: TableState::default(),
            focus: 0,
            editor: TextInput::new(),
        }
    }

    pub fn state(&self) -> &RecordsState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut RecordsState {
        &mut self.state
    }

    pub fn focused_field(&self) -> Field {
        Field::ALL[self.focus]
    }

    /// The record under the table cursor.
    pub fn highlighted(&self) -> Option<Record> {
        self.table
            .selected()
            .and_then(|i| self.state.records().get(i))
            .cloned()
    }

    fn focus_field(&mut self, field: Field) {
        self.focus = field.index();
        self.editor = TextInput::with_text(self.state.form().get(field));
    }

    fn shift_focus(&mut self, forward: bool) {
        let count = Field::ALL.len();
        let next = if forward {
            (self.focus + 1) % count
        } else {
            (self.focus + count - 1) % count
        };
        self.focus_field(Field::ALL[next]);
    }

    fn is_form_open(&self) -> bool {
        matches!(self.state.modal(), Modal::Add | Modal::Edit)
    }

    /// Turn a refused action into feedback.
    fn report(&mut self, dispatch: Dispatch) -> ScreenAction {
        match dispatch {
            Dispatch::Blocked => {
                let label = self
                    .state
                    .pending_operation()
                    .map_or("Working...", |op| op.in_progress_label());
                ScreenAction::Notify(Toast::new(
                    format!("Please wait. {label}"),
                    ToastVariant::Info,
                ))
            }
            Dispatch::Incomplete(missing) => {
                if let Some(first) = missing.first() {
                    self.focus_field(*first);
                }
                ScreenAction::Notify(Toast::new(
                    format!("Please fill in all fields ({} missing)", missing.len()),
                    ToastVariant::Error,
                ))
            }
            Dispatch::Started | Dispatch::Applied | Dispatch::Ignored => ScreenAction::None,
        }
    }

    fn submit(&mut self) -> ScreenAction {
        let dispatch = match self.state.modal() {
            Modal::Add => self.state.submit_add(),
            Modal::Edit => self.state.submit_edit(),
            _ => Dispatch::Ignored,
        };
        self.report(dispatch)
    }

    fn handle_table(&mut self, action: Action) -> ScreenAction {
        let rows = self.state.records().len();
        let dispatch = match action {
            Action::MoveUp => {
                self.table.move_up_by(1, rows);
                Dispatch::Applied
            }
            Action::MoveDown => {
                self.table.move_down_by(1, rows);
                Dispatch::Applied
            }
            Action::PageUp => {
                self.table.move_up_by(PAGE_SIZE, rows);
                Dispatch::Applied
            }
            Action::PageDown => {
                self.table.move_down_by(PAGE_SIZE, rows);
                Dispatch::Applied
            }
            Action::GoToTop => {
                self.table.select_first_row(rows);
                Dispatch::Applied
            }
            Action::GoToEnd => {
                self.table.select_last_row(rows);
                Dispatch::Applied
            }
            Action::Create => {
                let dispatch = self.state.open_add();
                if dispatch == Dispatch::Applied {
                    self.focus_field(Field::Name);
                }
                dispatch
            }
            Action::View | Action::Confirm => match self.highlighted() {
                Some(record) => self.state.open_view(record),
                None => Dispatch::Ignored,
            },
            Action::Edit => self.open_edit(self.highlighted()),
            Action::Delete => match self.highlighted() {
                Some(record) => self.state.request_delete(record),
                None => Dispatch::Ignored,
            },
            Action::Refresh => self.state.load(),
            Action::Cancel => self.state.cancel(),
            Action::Logout => return ScreenAction::Logout,
            Action::Help => return ScreenAction::ShowHelp,
            Action::Quit => return ScreenAction::Quit,
            _ => Dispatch::Ignored,
        };
        self.report(dispatch)
    }

    fn open_edit(&mut self, record: Option<Record>) -> Dispatch {
        let Some(record) = record else {
            return Dispatch::Ignored;
        };
        let dispatch = self.state.open_edit(record);
        if dispatch == Dispatch::Applied {
            self.focus_field(Field::Name);
        }
        dispatch
    }

    fn handle_form(&mut self, key: KeyEvent, action: Option<Action>) -> ScreenAction {
        match action {
            Some(Action::Quit) => ScreenAction::Quit,
            Some(Action::Cancel) => {
                let dispatch = self.state.cancel();
                self.report(dispatch)
            }
            Some(Action::NextField) => {
                self.shift_focus(true);
                ScreenAction::None
            }
            Some(Action::PrevField) => {
                self.shift_focus(false);
                ScreenAction::None
            }
            Some(Action::Save) => self.submit(),
            Some(Action::Confirm) if self.focus + 1 == Field::ALL.len() => self.submit(),
            Some(Action::Confirm) => {
                self.shift_focus(true);
                ScreenAction::None
            }
            Some(action) => {
                if self.editor.handle_action(action) {
                    self.write_through()
                } else {
                    ScreenAction::None
                }
            }
            None => {
                if self.editor.handle_key(key) {
                    self.write_through()
                } else {
                    ScreenAction::None
                }
            }
        }
    }

    fn write_through(&mut self) -> ScreenAction {
        let field = self.focused_field();
        let dispatch = self.state.update_field(field, self.editor.text());
        if dispatch == Dispatch::Blocked {
            // Keep the editor in step with the form it mirrors.
            self.editor = TextInput::with_text(self.state.form().get(field));
        }
        self.report(dispatch)
    }

    fn handle_view(&mut self, action: Action) -> ScreenAction {
        let dispatch = match action {
            Action::Cancel | Action::Confirm => self.state.cancel(),
            Action::Edit => self.open_edit(self.state.selected().cloned()),
            Action::Delete => match self.state.selected().cloned() {
                Some(record) => self.state.request_delete(record),
                None => Dispatch::Ignored,
            },
            Action::Quit => return ScreenAction::Quit,
            _ => Dispatch::Ignored,
        };
        self.report(dispatch)
    }

    fn handle_delete_confirm(&mut self, action: Action) -> ScreenAction {
        let dispatch = match action {
            Action::Yes | Action::Confirm => self.state.confirm_delete(),
            Action::No | Action::Cancel => self.state.cancel(),
            Action::Quit => return ScreenAction::Quit,
            _ => Dispatch::Ignored,
        };
        self.report(dispatch)
    }

    fn completion_toast(&mut self, completion: Completion) -> ScreenAction {
        let rows = self.state.records().len();
        let toast = match completion {
            Completion::Loaded { count } => {
                self.table.clamp_to(rows);
                Toast::new(format!("Loaded {count} students"), ToastVariant::Info)
            }
            Completion::Created { name } => {
                self.table.select_last_row(rows);
                Toast::new(format!("Added {name}"), ToastVariant::Success)
            }
            Completion::Updated { name } => {
                Toast::new(format!("Updated {name}"), ToastVariant::Success)
            }
            Completion::Deleted { name } => {
                self.table.clamp_to(rows);
                Toast::new(format!("Deleted {name}"), ToastVariant::Success)
            }
            // Failures show in the error banner.
            Completion::Failed { .. } => {
                self.table.clamp_to(rows);
                return ScreenAction::None;
            }
        };
        ScreenAction::Notify(toast)
    }

    // ---- rendering -----------------------------------------------------

    fn render_banner(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let line = if let Some(error) = self.state.last_error() {
            Line::from(vec![
                Span::styled(format!(" ✘ {error} "), t.error_style()),
                Span::styled("(Esc to dismiss)", t.muted_style()),
            ])
        } else if let Some(operation) = self.state.pending_operation() {
            Line::from(Span::styled(
                format!(" {}", operation.in_progress_label()),
                t.warning_style(),
            ))
        } else {
            Line::from(Span::styled(
                format!(" {} students", self.state.records().len()),
                t.muted_style(),
            ))
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect, ctx: &ScreenContext) {
        let t = theme();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(t.border_style())
            .title(Line::from(" Students ").style(t.title_style()));

        if self.state.records().is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let message = if self.state.is_pending() {
                vec![Line::from(Span::styled("Loading students...", t.muted_style()))]
            } else {
                vec![
                    Line::from(Span::styled("No Students Found", t.title_style())),
                    Line::default(),
                    Line::from(vec![
                        Span::styled("Press ", t.muted_style()),
                        Span::styled(ctx.config.keymap.key_for(Action::Create), t.key_style()),
                        Span::styled(" to add a new student", t.muted_style()),
                    ]),
                ]
            };
            let [_, middle, _] = Layout::vertical([
                Constraint::Fill(1),
                Constraint::Length(message.len() as u16),
                Constraint::Fill(1),
            ])
            .areas(inner);
            frame.render_widget(Paragraph::new(message).alignment(Alignment::Center), middle);
            return;
        }

        let header = Row::new(
            TABLE_COLUMNS
                .iter()
                .map(|f| Cell::from(f.label()).style(t.title_style())),
        );
        let rows = self.state.records().iter().map(|record| {
            Row::new(
                TABLE_COLUMNS
                    .iter()
                    .map(|f| Cell::from(record.get(*f).to_string())),
            )
            .style(t.text_style())
        });
        let table = Table::new(
            rows,
            [
                Constraint::Percentage(40),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(t.highlight_style())
        .highlight_symbol(ROW_HIGHLIGHT_SYMBOL);
        frame.render_stateful_widget(table, area, &mut self.table);
    }

    fn render_form(&self, frame: &mut Frame, area: Rect, ctx: &ScreenContext) {
        let t = theme();
        let title = match self.state.modal() {
            Modal::Edit => "Edit Student",
            _ => "Add Student",
        };
        let form_rows = Field::ALL.len().div_ceil(FORM_COLUMNS) as u16;
        let hints = ctx.config.keymap.hints(&[
            (Action::NextField, "Next field"),
            (Action::Save, "Save"),
            (Action::Cancel, "Cancel"),
        ]);
        let inner = Dialog::new(title)
            .footer(hints)
            .width(80)
            .height(form_rows * INPUT_HEIGHT + 3)
            .render(frame, area);

        let [status_area, fields_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);
        let status = if let Some(operation) = self.state.pending_operation() {
            Span::styled(operation.in_progress_label(), t.warning_style())
        } else if let Some(error) = self.state.last_error() {
            Span::styled(error.to_string(), t.error_style())
        } else {
            Span::styled("All fields are required.", t.muted_style())
        };
        frame.render_widget(Paragraph::new(Line::from(status)), status_area);

        let rows = Layout::vertical(vec![Constraint::Length(INPUT_HEIGHT); form_rows as usize])
            .split(fields_area);
        let idle: Vec<TextInput> = Field::ALL
            .iter()
            .map(|f| TextInput::with_text(self.state.form().get(*f)))
            .collect();

        for (i, field) in Field::ALL.iter().enumerate() {
            let Some(row) = rows.get(i / FORM_COLUMNS) else {
                break;
            };
            let columns =
                Layout::horizontal(vec![Constraint::Ratio(1, FORM_COLUMNS as u32); FORM_COLUMNS])
                    .split(*row);
            let focused = i == self.focus;
            let input = if focused { &self.editor } else { &idle[i] };
            frame.render_text_input(
                TextInputWidget::new(input)
                    .title(field.label())
                    .placeholder(field.kind().placeholder())
                    .focused(focused)
                    .missing(self.state.missing().contains(field)),
                columns[i % FORM_COLUMNS],
            );
        }
    }

    fn render_view(&self, frame: &mut Frame, area: Rect, ctx: &ScreenContext) {
        let t = theme();
        let Some(record) = self.state.selected() else {
            return;
        };
        let hints = ctx.config.keymap.hints(&[
            (Action::Edit, "Edit"),
            (Action::Delete, "Delete"),
            (Action::Cancel, "Close"),
        ]);
        let inner = Dialog::new("Student Details")
            .footer(hints)
            .width(60)
            .height(Field::ALL.len() as u16 + 2)
            .render(frame, area);

        let lines: Vec<Line> = record
            .fields
            .iter()
            .map(|(field, value)| {
                Line::from(vec![
                    Span::styled(format!("{:<16}", field.label()), t.key_style()),
                    Span::styled(value.to_string(), t.text_style()),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_delete_confirm(&self, frame: &mut Frame, area: Rect, ctx: &ScreenContext) {
        let t = theme();
        let name = self
            .state
            .selected()
            .map_or("this student", |r| r.get(Field::Name));
        let hints = ctx
            .config
            .keymap
            .hints(&[(Action::Yes, "Delete"), (Action::No, "Keep")]);
        let inner = Dialog::new("Delete Student")
            .footer(hints)
            .variant(DialogVariant::Danger)
            .width(50)
            .height(7)
            .render(frame, area);

        let mut lines = vec![
            Line::from(vec![
                Span::styled("Delete ", t.text_style()),
                Span::styled(name.to_string(), t.title_style()),
                Span::styled("?", t.text_style()),
            ]),
            Line::from(Span::styled("This cannot be undone.", t.muted_style())),
        ];
        if let Some(operation) = self.state.pending_operation() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                operation.in_progress_label(),
                t.warning_style(),
            )));
        }
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            inner,
        );
    }
}

impl Screen for RecordsScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &ScreenContext) -> Result<()> {
        let [header, banner, body, footer] = Layout::vertical([
            Constraint::Length(Header::HEIGHT),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(Footer::HEIGHT),
        ])
        .areas(area);

        Header::render(frame, header, "Student Records", &ctx.status());
        self.render_banner(frame, banner);
        self.render_table(frame, body, ctx);
        let hints = ctx.config.keymap.hints(&[
            (Action::Create, "Add"),
            (Action::View, "View"),
            (Action::Edit, "Edit"),
            (Action::Delete, "Delete"),
            (Action::Refresh, "Refresh"),
            (Action::Logout, "Logout"),
            (Action::Help, "Help"),
            (Action::Quit, "Quit"),
        ]);
        Footer::render(frame, footer, &hints);

        match self.state.modal() {
            Modal::None => {}
            Modal::Add | Modal::Edit => self.render_form(frame, area, ctx),
            Modal::View => self.render_view(frame, area, ctx),
            Modal::DeleteConfirm => self.render_delete_confirm(frame, area, ctx),
        }
        Ok(())
    }

    fn handle_event(&mut self, event: Event, ctx: &ScreenContext) -> Result<ScreenAction> {
        let Event::Key(key) = event else {
            return Ok(ScreenAction::None);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(ScreenAction::None);
        }
        let keymap = &ctx.config.keymap;

        if self.is_form_open() {
            let action = typing_action(keymap, &key);
            return Ok(self.handle_form(key, action));
        }

        let Some(action) = keymap.get_action(key.code, key.modifiers) else {
            return Ok(ScreenAction::None);
        };
        Ok(match self.state.modal() {
            Modal::View => self.handle_view(action),
            Modal::DeleteConfirm => self.handle_delete_confirm(action),
            Modal::None | Modal::Add | Modal::Edit => self.handle_table(action),
        })
    }

    fn tick(&mut self, _ctx: &ScreenContext) -> Result<ScreenAction> {
        Ok(match self.state.poll() {
            Some(completion) => self.completion_toast(completion),
            None => ScreenAction::None,
        })
    }

    fn is_input_focused(&self) -> bool {
        self.is_form_open()
    }

    fn on_enter(&mut self, _ctx: &ScreenContext) -> Result<()> {
        self.table.select(None);
        self.state.load();
        Ok(())
    }
}

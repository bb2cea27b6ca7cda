//! Login screen: email and password, sign-in or sign-up.

use crate::components::Header;
use crate::keymap::Action;
use crate::screens::screen_trait::{typing_action, Screen, ScreenAction, ScreenContext};
use crate::state::{AuthMode, LoginField, LoginOutcome, LoginState};
use crate::styles::theme;
use crate::widgets::{Dialog, TextInputWidget, TextInputWidgetExt, Toast, ToastVariant};
use anyhow::Result;
use crossterm::event::{Event, KeyEventKind};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

pub struct LoginScreen {
    state: LoginState,
}

impl LoginScreen {
    pub fn new(state: LoginState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &LoginState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut LoginState {
        &mut self.state
    }

    fn status_line(&self) -> Line<'static> {
        let t = theme();
        if self.state.is_pending() {
            let label = match self.state.mode {
                AuthMode::SignIn => "Logging in...",
                AuthMode::SignUp => "Creating account...",
            };
            Line::from(Span::styled(label, t.warning_style()))
        } else if let Some(error) = &self.state.error {
            Line::from(Span::styled(error.clone(), t.error_style()))
        } else {
            Line::default()
        }
    }

    fn hints(&self, ctx: &ScreenContext) -> String {
        let other = self.state.mode.toggled().title();
        ctx.config.keymap.hints(&[
            (Action::Confirm, "Submit"),
            (Action::NextField, "Next"),
            (Action::TogglePassword, "Show password"),
            (Action::SwitchMode, other),
            (Action::Cancel, "Quit"),
        ])
    }

    /// Wait out an exchange whose session has already been published.
    pub fn finish(&mut self) -> ScreenAction {
        let outcome = self.state.settle();
        self.outcome_action(outcome)
    }

    fn outcome_action(&self, outcome: Option<LoginOutcome>) -> ScreenAction {
        match outcome {
            Some(LoginOutcome::SignedIn(session)) => {
                let message = match self.state.mode {
                    AuthMode::SignIn => "Login successful!".to_string(),
                    AuthMode::SignUp => format!("Account created for {}", session.email),
                };
                ScreenAction::Notify(Toast::new(message, ToastVariant::Success))
            }
            Some(LoginOutcome::Failed(_)) | None => ScreenAction::None,
        }
    }

    fn apply(&mut self, action: Action) -> ScreenAction {
        match action {
            Action::Quit | Action::Cancel => ScreenAction::Quit,
            Action::NextField | Action::PrevField => {
                self.state.switch_focus();
                ScreenAction::None
            }
            Action::Confirm if self.state.focus == LoginField::Email => {
                self.state.switch_focus();
                ScreenAction::None
            }
            Action::Confirm | Action::Save => {
                self.state.submit();
                ScreenAction::None
            }
            Action::TogglePassword => {
                self.state.show_password = !self.state.show_password;
                ScreenAction::None
            }
            Action::SwitchMode => {
                self.state.toggle_mode();
                ScreenAction::None
            }
            other => {
                self.state.focused_input().handle_action(other);
                ScreenAction::None
            }
        }
    }
}

impl Screen for LoginScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &ScreenContext) -> Result<()> {
        let [header, body] =
            Layout::vertical([Constraint::Length(Header::HEIGHT), Constraint::Min(0)]).areas(area);
        Header::render(frame, header, "Student Records", &ctx.status());

        let hints = self.hints(ctx);
        let inner = Dialog::new(self.state.mode.title())
            .footer(hints)
            .width(60)
            .height(12)
            .render(frame, body);

        let [email_area, password_area, _, status_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let focus = self.state.focus;
        frame.render_text_input(
            TextInputWidget::new(&self.state.email)
                .title("Email")
                .placeholder("you@school.org")
                .focused(focus == LoginField::Email),
            email_area,
        );
        frame.render_text_input(
            TextInputWidget::new(&self.state.password)
                .title("Password")
                .placeholder("at least 6 characters")
                .masked(!self.state.show_password)
                .focused(focus == LoginField::Password),
            password_area,
        );
        frame.render_widget(
            Paragraph::new(self.status_line()).alignment(Alignment::Center),
            status_area,
        );
        Ok(())
    }

    fn handle_event(&mut self, event: Event, ctx: &ScreenContext) -> Result<ScreenAction> {
        let Event::Key(key) = event else {
            return Ok(ScreenAction::None);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(ScreenAction::None);
        }

        let action = typing_action(&ctx.config.keymap, &key);
        if self.state.is_pending() {
            // Only quitting is possible while the exchange runs.
            return Ok(match action {
                Some(Action::Quit) => ScreenAction::Quit,
                _ => ScreenAction::None,
            });
        }

        match action {
            Some(action) => Ok(self.apply(action)),
            None => {
                self.state.focused_input().handle_key(key);
                Ok(ScreenAction::None)
            }
        }
    }

    fn tick(&mut self, _ctx: &ScreenContext) -> Result<ScreenAction> {
        let outcome = self.state.poll();
        Ok(self.outcome_action(outcome))
    }

    fn is_input_focused(&self) -> bool {
        true
    }
}

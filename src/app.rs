use crate::auth::{AuthError, Session};
use crate::backend::Backend;
use crate::components::HelpOverlay;
use crate::config::Config;
use crate::screens::{LoginScreen, RecordsScreen, Screen, ScreenAction, ScreenContext};
use crate::state::{LoginState, RecordsState};
use crate::styles::{init_theme, ThemeType};
use crate::tui::Tui;
use crate::utils::{TaskHandle, TaskPoll};
use crate::widgets::ToastManager;
use anyhow::{Context, Result};
use crossterm::event::{Event, KeyEventKind};
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// How long the loop waits for input before ticking.
const TICK: Duration = Duration::from_millis(250);

/// Which screen the session allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveScreen {
    Login,
    Records,
}

impl ActiveScreen {
    /// The records screen is reachable only with a session.
    pub fn for_session(session: Option<&Session>) -> Self {
        if session.is_some() {
            ActiveScreen::Records
        } else {
            ActiveScreen::Login
        }
    }
}

/// Main application state
pub struct App {
    config: Config,
    config_path: PathBuf,
    backend: Backend,
    tui: Tui,
    session_rx: watch::Receiver<Option<Session>>,
    /// Email of the signed-in user, mirrored from the session watch.
    user: Option<String>,
    active: ActiveScreen,
    login: LoginScreen,
    records: RecordsScreen,
    toasts: ToastManager,
    show_help: bool,
    should_quit: bool,
    restoring: Option<TaskHandle<Result<Option<Session>, AuthError>>>,
    // Dropped last so background tasks outlive the handles polling them.
    runtime: Runtime,
}

impl App {
    pub fn new(offline: bool, no_colors: bool) -> Result<Self> {
        let config_path = crate::utils::config_path();
        let config =
            Config::load_or_create(&config_path).context("Failed to load configuration")?;

        let theme = if no_colors || std::env::var_os("NO_COLOR").is_some() {
            ThemeType::NoColor
        } else {
            config.theme
        };
        init_theme(theme);
        for invalid in config.keymap.invalid_overrides() {
            warn!("Ignoring invalid key binding {}", invalid);
        }

        let backend = Backend::connect(
            &config,
            &config_path,
            &crate::utils::session_path(),
            offline,
        )?;
        let runtime = Runtime::new().context("Failed to create tokio runtime")?;
        let tui = Tui::new()?;
        let session_rx = backend.session().subscribe();

        let login = Self::login_screen(&backend, &runtime);
        let records = Self::records_screen(&backend, &config, &runtime);
        info!(offline, config = ?config_path, "Starting rollbook");

        Ok(Self {
            config,
            config_path,
            backend,
            tui,
            session_rx,
            user: None,
            active: ActiveScreen::Login,
            login,
            records,
            toasts: ToastManager::new(),
            show_help: false,
            should_quit: false,
            restoring: None,
            runtime,
        })
    }

    fn login_screen(backend: &Backend, runtime: &Runtime) -> LoginScreen {
        LoginScreen::new(LoginState::new(
            backend.auth.clone(),
            runtime.handle().clone(),
        ))
    }

    fn records_screen(backend: &Backend, config: &Config, runtime: &Runtime) -> RecordsScreen {
        RecordsScreen::new(
            RecordsState::new(backend.store.clone(), runtime.handle().clone())
                .with_resync(config.records.resync_after_write),
        )
    }

    pub fn run(&mut self) -> Result<()> {
        self.tui.enter()?;

        let auth = self.backend.auth.clone();
        self.restoring = Some(TaskHandle::spawn(self.runtime.handle(), async move {
            auth.restore().await
        }));

        let result = self.event_loop();
        self.tui.exit()?;
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        loop {
            self.sync_session()?;
            self.tick()?;
            self.draw()?;

            if self.should_quit {
                info!("Quitting");
                return Ok(());
            }

            if let Some(event) = self.tui.poll_event(TICK)? {
                self.handle_event(event)?;
            }
        }
    }

    /// Route to the screen the current session allows.
    fn sync_session(&mut self) -> Result<()> {
        if !self
            .session_rx
            .has_changed()
            .context("Session channel closed")?
        {
            return Ok(());
        }
        let session = self.session_rx.borrow_and_update().clone();
        self.user = session.as_ref().map(|s| s.email.clone());

        let target = ActiveScreen::for_session(session.as_ref());
        if target == self.active {
            return Ok(());
        }
        info!(from = ?self.active, to = ?target, "Switching screen");
        self.active = target;
        self.show_help = false;

        let ctx = ScreenContext {
            config: &self.config,
            config_path: &self.config_path,
            user: self.user.as_deref(),
            offline: self.backend.offline,
        };
        match target {
            ActiveScreen::Records => {
                let greeting = self.login.finish();
                self.records = Self::records_screen(&self.backend, &self.config, &self.runtime);
                self.records.on_enter(&ctx)?;
                self.apply(greeting);
            }
            ActiveScreen::Login => {
                self.login = Self::login_screen(&self.backend, &self.runtime);
                self.login.on_enter(&ctx)?;
            }
        }
        Ok(())
    }

    fn tick(&mut self) -> Result<()> {
        self.toasts.tick();
        self.poll_restore();

        let ctx = ScreenContext {
            config: &self.config,
            config_path: &self.config_path,
            user: self.user.as_deref(),
            offline: self.backend.offline,
        };
        let action = match self.active {
            ActiveScreen::Login => self.login.tick(&ctx)?,
            ActiveScreen::Records => self.records.tick(&ctx)?,
        };
        self.apply(action);
        Ok(())
    }

    fn poll_restore(&mut self) {
        let Some(handle) = self.restoring.as_mut() else {
            return;
        };
        let outcome = match handle.try_take() {
            TaskPoll::Pending => return,
            TaskPoll::Ready(outcome) => outcome,
            TaskPoll::Dropped => {
                error!("Session restore task ended unexpectedly");
                Ok(None)
            }
        };
        self.restoring = None;
        match outcome {
            Ok(Some(session)) => self.toasts.success(format!("Welcome back, {}", session.email)),
            Ok(None) => {}
            Err(e) if e.invalidates_session() => {
                self.toasts.info("Your saved session has expired. Please log in again.");
            }
            Err(e) => {
                warn!("Could not restore session: {}", e);
                self.toasts.error("Could not restore your session. Please log in.");
            }
        }
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        if self.show_help {
            if matches!(&event, Event::Key(key) if key.kind == KeyEventKind::Press) {
                self.show_help = false;
            }
            return Ok(());
        }

        let ctx = ScreenContext {
            config: &self.config,
            config_path: &self.config_path,
            user: self.user.as_deref(),
            offline: self.backend.offline,
        };
        let action = match self.active {
            ActiveScreen::Login => self.login.handle_event(event, &ctx)?,
            ActiveScreen::Records => self.records.handle_event(event, &ctx)?,
        };
        self.apply(action);
        Ok(())
    }

    fn apply(&mut self, action: ScreenAction) {
        match action {
            ScreenAction::None => {}
            ScreenAction::Quit => self.should_quit = true,
            ScreenAction::ShowHelp => self.show_help = true,
            ScreenAction::Logout => {
                self.backend.auth.sign_out();
                self.toasts.info("Logged out");
            }
            ScreenAction::Notify(toast) => self.toasts.push(toast),
        }
    }

    fn draw(&mut self) -> Result<()> {
        let ctx = ScreenContext {
            config: &self.config,
            config_path: &self.config_path,
            user: self.user.as_deref(),
            offline: self.backend.offline,
        };
        let config_path = self.config_path.display().to_string();
        let mut rendered = Ok(());

        self.tui.terminal_mut().draw(|frame| {
            let area = frame.area();
            rendered = match self.active {
                ActiveScreen::Login => self.login.render(frame, area, &ctx),
                ActiveScreen::Records => self.records.render(frame, area, &ctx),
            };
            if self.show_help {
                HelpOverlay::render(frame, area, &ctx.config.keymap, &config_path);
            }
            self.toasts.render(frame, area);
        })?;
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_records_screen_needs_a_session() {
        assert_eq!(ActiveScreen::for_session(None), ActiveScreen::Login);

        let session = Session {
            user_id: "u1".to_string(),
            email: "ann@school.org".to_string(),
            id_token: "id".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        };
        assert_eq!(
            ActiveScreen::for_session(Some(&session)),
            ActiveScreen::Records
        );
    }
}

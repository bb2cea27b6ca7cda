use anyhow::Result;
use clap::Parser;
use rollbook::app::App;
use rollbook::cli::{print_error, Cli};
use tracing_appender::non_blocking::WorkerGuard;

/// Set up panic hook to restore terminal state on panic
fn setup_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Log to `<cache dir>/rollbook/rollbook.log`; the TUI owns stdout.
fn init_logging() -> Result<WorkerGuard> {
    let log_dir = rollbook::utils::log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_appender = tracing_appender::rolling::never(&log_dir, "rollbook.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    Ok(guard)
}

fn run(cli: Cli) -> Result<()> {
    if cli.command.is_some() {
        return cli.execute();
    }

    setup_panic_hook();
    eprintln!(
        "Logs are being written to: {:?}",
        rollbook::utils::log_dir().join("rollbook.log")
    );
    let mut app = App::new(cli.offline, cli.no_colors)?;
    app.run()
}

fn main() {
    let cli = Cli::parse();
    let guard = match init_logging() {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {e:#}");
            None
        }
    };

    let result = run(cli);
    drop(guard);

    if let Err(e) = result {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

use crate::auth::SessionVault;
use crate::backend::Backend;
use crate::config::Config;
use crate::record::{Field, Record};
use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use indoc::indoc;
use tokio::runtime::Runtime;

const AFTER_HELP: &str = indoc! {"
    Without a command, rollbook opens the student records TUI.

    Settings live in ~/.config/rollbook/config.toml, or in
    $ROLLBOOK_CONFIG_DIR when that is set. Fill in firebase.api_key and
    firebase.project_id there, or pass --offline to try rollbook with
    local accounts and an in-memory store.
"};

const TABLE_COLUMNS: [Field; 4] = [Field::Name, Field::Class, Field::Section, Field::RollNumber];

/// Student records over Firebase, in the terminal
#[derive(Parser, Debug)]
#[command(
    name = "rollbook",
    version,
    about = "Student records over Firebase, in the terminal",
    long_about = None,
    after_help = AFTER_HELP,
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Use local accounts and an in-memory store instead of Firebase
    #[arg(long, global = true)]
    pub offline: bool,

    /// Disable colors in the TUI (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_colors: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print every student, using the stored session
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
    /// Delete the stored session
    Logout,
    /// Print the config file path, creating a default config if missing
    Config,
    /// Print the log file path
    Logs,
    /// Generate shell completions
    Completions {
        /// Shell to generate for; detected from $SHELL when omitted
        #[arg(value_enum)]
        shell: Option<Shell>,
    },
}

impl Cli {
    /// Execute a subcommand. The TUI (no subcommand) is started by `main`.
    pub fn execute(self) -> Result<()> {
        match self.command {
            Some(Commands::List { json }) => Self::cmd_list(self.offline, json),
            Some(Commands::Logout) => Self::cmd_logout(),
            Some(Commands::Config) => Self::cmd_config(),
            Some(Commands::Logs) => Self::cmd_logs(),
            Some(Commands::Completions { shell }) => Self::cmd_completions(shell),
            None => Ok(()),
        }
    }

    fn cmd_list(offline: bool, json: bool) -> Result<()> {
        if offline {
            print_warning("Offline mode keeps no students between runs; nothing to list.");
            return Ok(());
        }

        let config_path = crate::utils::config_path();
        let config =
            Config::load_or_create(&config_path).context("Failed to load configuration")?;
        let backend = Backend::online(&config, &config_path, &crate::utils::session_path())?;
        let runtime = Runtime::new().context("Failed to create tokio runtime")?;

        let records = runtime.block_on(async {
            if backend
                .auth
                .restore()
                .await
                .context("Failed to restore session")?
                .is_none()
            {
                bail!("Not logged in. Run `rollbook` and log in first.");
            }
            backend
                .store
                .list_all()
                .await
                .context("Failed to list students")
        })?;

        if json {
            let output =
                serde_json::to_string_pretty(&records).context("Failed to serialize students")?;
            println!("{}", output);
        } else if records.is_empty() {
            println!("No students found.");
        } else {
            print!("{}", format_table(&records));
        }
        Ok(())
    }

    fn cmd_logout() -> Result<()> {
        let vault = SessionVault::new(crate::utils::session_path());
        if logout(&vault)? {
            print_success("Logged out");
        } else {
            print_info("No stored session.");
        }
        Ok(())
    }

    fn cmd_config() -> Result<()> {
        let config_path = crate::utils::config_path();
        let config =
            Config::load_or_create(&config_path).context("Failed to load configuration")?;
        println!("{}", config_path.display());
        if !config.firebase.is_ready() {
            eprintln!("firebase.api_key and firebase.project_id are not set yet.");
        }
        Ok(())
    }

    fn cmd_logs() -> Result<()> {
        println!("{}", crate::utils::log_dir().join("rollbook.log").display());
        Ok(())
    }

    fn cmd_completions(shell: Option<Shell>) -> Result<()> {
        let Some(shell) = shell.or_else(Shell::from_env) else {
            bail!("Could not automatically detect shell");
        };
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        Ok(())
    }
}

/// Plain-text table of the list columns, padded to the widest cell.
pub fn format_table(records: &[Record]) -> String {
    let widths: Vec<usize> = TABLE_COLUMNS
        .iter()
        .map(|field| {
            records
                .iter()
                .map(|r| r.get(*field).chars().count())
                .chain(std::iter::once(field.label().len()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let mut out = pad_row(&TABLE_COLUMNS.map(|f| f.label()), &widths);
    for record in records {
        out.push_str(&pad_row(&TABLE_COLUMNS.map(|f| record.get(f)), &widths));
    }
    out
}

fn pad_row(cells: &[&str], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    format!("{}\n", line.trim_end())
}

/// Delete the stored session. Returns `false` when there was none.
fn logout(vault: &SessionVault) -> Result<bool> {
    if matches!(vault.load(), Ok(None)) {
        return Ok(false);
    }
    vault.clear()?;
    Ok(true)
}

/// Print a success message with a checkmark prefix.
pub fn print_success(msg: &str) {
    println!("\u{2713} {}", msg);
}

/// Print an error message with an X prefix to stderr.
pub fn print_error(msg: &str) {
    eprintln!("\u{2717} {}", msg);
}

pub fn print_warning(msg: &str) {
    println!("\u{26A0}\u{FE0F} {}", msg);
}

pub fn print_info(msg: &str) {
    println!("\u{2139}\u{FE0F} {}", msg);
}

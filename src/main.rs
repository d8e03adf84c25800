use anyhow::{Context, Result};
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gesture_lock::{CredentialStore, LockConfig, SqliteStore};

enum Command {
    Run,
    Status,
    Reset,
}

fn main() -> Result<()> {
    let (command, config_path) = parse_args(env::args().skip(1))?;
    let config = LockConfig::load(config_path.as_deref())?;
    init_logging(&config)?;

    match command {
        Command::Run => run_ui_mode(&config),
        Command::Status => run_status(&config),
        Command::Reset => run_reset(&config),
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<(Command, Option<PathBuf>)> {
    let mut command = Command::Run;
    let mut config_path = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "run" => command = Command::Run,
            "status" => command = Command::Status,
            "reset" => command = Command::Reset,
            "--config" | "-c" => {
                let path = args.next().context("--config needs a path")?;
                config_path = Some(PathBuf::from(path));
            }
            other => anyhow::bail!(
                "unknown argument '{}'\nusage: gesture-lock [run|status|reset] [--config <path>]",
                other
            ),
        }
    }

    Ok((command, config_path))
}

/// Log to `log_path` when configured; the TUI owns the terminal otherwise
fn init_logging(config: &LockConfig) -> Result<()> {
    let Some(log_path) = &config.log_path else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("Invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    Ok(())
}

fn open_store(config: &LockConfig) -> Result<SqliteStore> {
    SqliteStore::open(&config.database_path)
}

fn run_status(config: &LockConfig) -> Result<()> {
    let store = open_store(config)?;

    match store.credential(&config.credential_key)? {
        Some(credential) => println!(
            "🔐 Pattern set for '{}' (updated {})",
            credential.key,
            credential.updated_at.to_rfc3339()
        ),
        None => println!("🔓 No pattern set for '{}'", config.credential_key),
    }

    Ok(())
}

fn run_reset(config: &LockConfig) -> Result<()> {
    let mut store = open_store(config)?;

    if store.remove(&config.credential_key)? {
        info!(key = %config.credential_key, "credential removed");
        println!("✓ Pattern for '{}' removed", config.credential_key);
    } else {
        println!("Nothing to remove for '{}'", config.credential_key);
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &LockConfig) -> Result<()> {
    use gesture_lock::ui::{run_ui, App};
    use gesture_lock::{GridGeometry, PatternSession};

    // Start in verify mode when a pattern is already stored
    let store = open_store(config)?;
    let session = PatternSession::resume(store, config.credential_key.clone())?;

    info!(db = %config.database_path.display(), mode = ?session.active_mode(), "starting lock");

    let mut app = App::new(session, GridGeometry::new(config.cell_diameter));
    run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &LockConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    std::process::exit(1);
}

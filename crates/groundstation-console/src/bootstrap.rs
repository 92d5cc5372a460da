use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Name of the per-user state directory under `$HOME`.
const STATE_DIR: &str = ".groundstation-console";

// ── Directory bootstrap ────────────────────────────────────────────────────────

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Ensure `~/.groundstation-console/logs` exists.
pub fn ensure_directories() -> anyhow::Result<()> {
    ensure_directories_in(&home())
}

/// Directory bootstrap rooted at `base` instead of `$HOME`.
pub fn ensure_directories_in(base: &Path) -> anyhow::Result<()> {
    let dir = base.join(STATE_DIR).join("logs");
    std::fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    Ok(())
}

/// `~/.groundstation-console/logs/console.log`
pub fn default_log_path() -> PathBuf {
    default_log_path_in(&home())
}

pub fn default_log_path_in(base: &Path) -> PathBuf {
    base.join(STATE_DIR).join("logs").join("console.log")
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map an operator level name to an `EnvFilter` directive. Unknown names
/// pass through unchanged so full directives like `console_runtime=trace`
/// still work.
pub fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// The terminal is owned by the TUI, so output is appended to `log_file`
/// (or [`default_log_path`]) rather than written to stderr. An unparseable
/// level falls back to `info`.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<PathBuf> {
    let path = log_file.cloned().unwrap_or_else(default_log_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .context("tracing subscriber already installed")?;

    Ok(path)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

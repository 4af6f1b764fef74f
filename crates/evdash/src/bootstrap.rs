use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name looked up under `./data/` and `./public/data/`.
pub const DATASET_FILE_NAME: &str = "processed_ev_data.json";

// ── Directory bootstrap ────────────────────────────────────────────────────────

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// `~/.evdash/`
pub fn app_dir() -> PathBuf {
    home_dir().join(".evdash")
}

/// Where the TUI writes its log while it owns the terminal.
pub fn default_log_file() -> PathBuf {
    app_dir().join("logs").join("evdash.log")
}

/// Ensure the standard `~/.evdash/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.evdash/`
/// - `~/.evdash/logs/`
/// - `~/.evdash/data/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let dir = app_dir();
    std::fs::create_dir_all(&dir)?;
    std::fs::create_dir_all(dir.join("logs"))?;
    std::fs::create_dir_all(dir.join("data"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `--log-level` value to an [`EnvFilter`] directive.
///
/// Unknown values are passed through so `RUST_LOG`-style directives such as
/// `evdash_data=trace` keep working.
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
/// With a `log_file` every event is appended there without ANSI colours;
/// otherwise output goes to stderr.  Falls back to `"info"` if the level
/// string is not a valid directive.
pub fn setup_logging(log_level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let (stderr_layer, file_layer) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Arc::new(file));
            (None, Some(layer))
        }
        None => (
            Some(fmt::layer().with_target(false).with_thread_ids(false)),
            None,
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// Locations searched when `--data` is not given, in order:
/// 1. `./data/processed_ev_data.json`
/// 2. `./public/data/processed_ev_data.json`
/// 3. `~/.evdash/data/`
pub fn data_candidates(cwd: &Path, home: &Path) -> [PathBuf; 3] {
    [
        cwd.join("data").join(DATASET_FILE_NAME),
        cwd.join("public").join("data").join(DATASET_FILE_NAME),
        home.join(".evdash").join("data"),
    ]
}

/// Resolve the dataset to load.
///
/// An explicit path is returned as is, even when missing, so the loader can
/// report it.  Otherwise the first existing candidate wins.
pub fn discover_data_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    discover_data_path_in(&cwd, &home_dir())
}

pub fn discover_data_path_in(cwd: &Path, home: &Path) -> Option<PathBuf> {
    data_candidates(cwd, home).into_iter().find(|p| p.exists())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::models::{FilterState, YearRange, DEFAULT_MAX_YEAR, DEFAULT_MIN_YEAR};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Electric-vehicle registrations dashboard
#[derive(Parser, Debug, Clone)]
#[command(
    name = "evdash",
    about = "Electric-vehicle registrations dashboard",
    version
)]
pub struct Settings {
    /// Dataset file or directory (.json, .jsonl, .csv)
    #[arg(long, env = "EVDASH_DATA")]
    pub data: Option<PathBuf>,

    /// Initial manufacturer filter (all makes when omitted)
    #[arg(long)]
    pub make: Option<String>,

    /// Initial lower bound of the model-year filter
    #[arg(long, default_value_t = DEFAULT_MIN_YEAR, allow_negative_numbers = true)]
    pub min_year: i32,

    /// Initial upper bound of the model-year filter
    #[arg(long, default_value_t = DEFAULT_MAX_YEAR, allow_negative_numbers = true)]
    pub max_year: i32,

    /// Initial view
    #[arg(long, default_value = "dashboard", value_parser = ["dashboard", "map", "table"])]
    pub view: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Output mode: interactive terminal UI or one JSON document on stdout
    #[arg(long, default_value = "tui", value_parser = ["tui", "json"])]
    pub output: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.evdash/last_used.json`.
///
/// The filter is deliberately absent: every session starts from the filter
/// given on the command line.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".evdash").join("last_used.json")
    }

    /// Load persisted params from the default path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load persisted params from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

/// A `last_used.json` operation that failed while settings were loaded.
///
/// Settings are parsed before the log subscriber exists, so these are handed
/// back to the caller and logged once logging is set up.
#[derive(Debug)]
pub enum LastUsedIssue {
    /// `--clear` could not remove the file.
    Clear { path: PathBuf, error: std::io::Error },
    /// The merged parameters could not be written back.
    Persist { path: PathBuf, error: std::io::Error },
}

impl LastUsedIssue {
    /// Emit the issue through `tracing`.
    pub fn log(&self) {
        match self {
            LastUsedIssue::Clear { path, error } => {
                tracing::warn!("Failed to clear {}: {}", path.display(), error)
            }
            LastUsedIssue::Persist { path, error } => tracing::debug!(
                "Could not persist last-used params to {}: {}",
                path.display(),
                error
            ),
        }
    }
}

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    ///
    /// Failures touching the last-used file are returned for later logging.
    pub fn load_with_last_used() -> (Self, Vec<LastUsedIssue>) {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> (Self, Vec<LastUsedIssue>) {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);
        let mut issues = Vec::new();

        if settings.clear {
            if let Err(error) = LastUsedParams::clear_at(config_path) {
                issues.push(LastUsedIssue::Clear {
                    path: config_path.to_path_buf(),
                    error,
                });
            }
            return (Self::apply_debug_flag(settings), issues);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins over the persisted value.
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if settings.data.is_none() {
            settings.data = last.data_path;
        }

        settings = Self::apply_debug_flag(settings);

        let params = LastUsedParams::from(&settings);
        if let Err(error) = params.save_to(config_path) {
            issues.push(LastUsedIssue::Persist {
                path: config_path.to_path_buf(),
                error,
            });
        }

        (settings, issues)
    }

    /// The filter the dashboard opens with.
    ///
    /// Fails with [`DashboardError::InvalidYearRange`] when
    /// `--min-year` exceeds `--max-year`.
    ///
    /// [`DashboardError::InvalidYearRange`]: crate::error::DashboardError::InvalidYearRange
    pub fn initial_filter(&self) -> Result<FilterState> {
        let range = YearRange::new(self.min_year, self.max_year)?;
        let make = self
            .make
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);
        Ok(FilterState::new(make, range))
    }

    /// `--debug` overrides the log level.
    fn apply_debug_flag(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            theme: Some(s.theme.clone()),
            view: Some(s.view.clone()),
            data_path: s.data.clone(),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

// Configuration loading and validation (config/pennant.toml).

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use pennant_core::teams::TeamDirectory;
use serde::Deserialize;
use thiserror::Error;

/// Name of the configuration file inside `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "pennant.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub season: SeasonConfig,
    pub source: SourceConfig,
    pub paths: PathsConfig,
    /// Identity table: the `[teams]` override if present, else the built-in.
    pub teams: TeamDirectory,
    /// Directory relative paths are resolved against.
    pub base_dir: PathBuf,
}

impl Config {
    /// Resolve a configured path against the base directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.base_dir.join(path)
    }

    /// The configured reference date, or `today` when none is pinned.
    pub fn reference_date(&self, today: NaiveDate) -> NaiveDate {
        self.season.reference_date.unwrap_or(today)
    }
}

// ---------------------------------------------------------------------------
// pennant.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the whole file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    season: SeasonConfig,
    source: SourceConfig,
    paths: PathsConfig,
    #[serde(default)]
    teams: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonConfig {
    pub year: u32,
    /// First day of the schedule window requested from the stats service.
    pub opening_day: NaiveDate,
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    Remote,
    Fixture,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub mode: SourceMode,
    pub base_url: String,
    pub fixture_dir: String,
    pub timeout_secs: u64,
    pub league_ids: Vec<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    pub participants: String,
    pub quarters: String,
    pub output: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/pennant.toml` relative to `base_dir`.
///
/// Does not copy defaults; see [`load_config`].
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound {
        path: path.clone(),
    })?;
    let file: ConfigFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&file)?;
    let teams = build_team_directory(&file.teams)?;

    Ok(Config {
        season: file.season,
        source: file.source,
        paths: file.paths,
        teams,
        base_dir: base_dir.to_path_buf(),
    })
}

/// Copy files from `defaults/` into `config/` when missing. Existing files
/// are left untouched and `*.example` templates are skipped. Returns the
/// files that were copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(copy_error(format!(
                "neither defaults/ nor config/ directory found in {}",
                base_dir.display()
            )));
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("failed to create config directory: {e}")))?;

    let entries = std::fs::read_dir(&defaults_dir)
        .map_err(|e| copy_error(format!("failed to read defaults directory: {e}")))?;

    let mut copied = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| copy_error(format!("failed to read defaults entry: {e}")))?
            .path();
        let Some(file_name) = path.file_name().filter(|_| path.is_file()) else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);
        match OpenOptions::new().write(true).create_new(true).open(&target) {
            Ok(mut dest) => {
                let content = std::fs::read(&path)
                    .map_err(|e| copy_error(format!("failed to read {}: {e}", path.display())))?;
                dest.write_all(&content)
                    .map_err(|e| copy_error(format!("failed to write {}: {e}", target.display())))?;
                copied.push(target);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(copy_error(format!("failed to create {}: {e}", target.display())));
            }
        }
    }

    copied.sort();
    Ok(copied)
}

/// Load config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn copy_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Build the identity table from the `[teams]` override, or the built-in
/// table when the override is empty.
fn build_team_directory(overrides: &BTreeMap<String, String>) -> Result<TeamDirectory, ConfigError> {
    if overrides.is_empty() {
        return Ok(TeamDirectory::mlb());
    }

    let mut entries = Vec::with_capacity(overrides.len());
    for (key, abbr) in overrides {
        let id: u32 = key
            .trim()
            .parse()
            .map_err(|_| invalid(&format!("teams.{key}"), "team id must be an integer"))?;
        if abbr.trim().is_empty() {
            return Err(invalid(&format!("teams.{key}"), "abbreviation must not be empty"));
        }
        entries.push((id, abbr.trim().to_string()));
    }

    TeamDirectory::new(entries).map_err(|e| invalid("teams", e.to_string()))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(file: &ConfigFile) -> Result<(), ConfigError> {
    if file.season.year == 0 {
        return Err(invalid("season.year", "must be greater than 0"));
    }

    if file.source.timeout_secs == 0 {
        return Err(invalid("source.timeout_secs", "must be greater than 0"));
    }

    if file.source.league_ids.is_empty() {
        return Err(invalid("source.league_ids", "must list at least one league"));
    }

    if file.source.mode == SourceMode::Remote && file.source.base_url.trim().is_empty() {
        return Err(invalid("source.base_url", "required when mode = \"remote\""));
    }

    let paths = [
        ("paths.participants", &file.paths.participants),
        ("paths.quarters", &file.paths.quarters),
        ("paths.output", &file.paths.output),
    ];
    for (field, value) in paths {
        if value.trim().is_empty() {
            return Err(invalid(field, "must not be empty"));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

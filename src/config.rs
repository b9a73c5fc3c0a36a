//! Configuration for the ingestor
//!
//! Layers, highest priority first:
//! 1. CLI flags
//! 2. Environment variables (INGESTOR_*)
//! 3. Config file (`--config <path>`, or `ingestor.toml` in the working directory)
//! 4. Built-in defaults (`landing/`, `bronze/`, `bad_data/`, `ingestor.log`)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IngestError, IngestResult};
use crate::models::ConflictPolicy;

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "ingestor.toml";

/// Directory layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_landing")]
    pub landing: PathBuf,

    #[serde(default = "default_bronze")]
    pub bronze: PathBuf,

    #[serde(default = "default_bad_data")]
    pub bad_data: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            landing: default_landing(),
            bronze: default_bronze(),
            bad_data: default_bad_data(),
        }
    }
}

fn default_landing() -> PathBuf {
    PathBuf::from("landing")
}

fn default_bronze() -> PathBuf {
    PathBuf::from("bronze")
}

fn default_bad_data() -> PathBuf {
    PathBuf::from("bad_data")
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_file")]
    pub file: PathBuf,

    #[serde(default)]
    pub level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            level: LogLevel::default(),
        }
    }
}

fn default_log_file() -> PathBuf {
    PathBuf::from("ingestor.log")
}

/// Ingest behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IngestConfig {
    #[serde(default)]
    pub on_conflict: ConflictPolicy,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub ingest: IngestConfig,
}

/// Unknown key found while loading a config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown config key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration and collect unknown keys as warnings
    pub fn load_with_warnings(path: &Path) -> IngestResult<(Self, Vec<ConfigWarning>)> {
        let content = fs::read_to_string(path).map_err(|source| IngestError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let mut unknown_paths: Vec<String> = Vec::new();
        let deserializer = toml::de::Deserializer::new(&content);

        let config: Self = serde_ignored::deserialize(deserializer, |ignored| {
            unknown_paths.push(ignored.to_string());
        })
        .map_err(|e| IngestError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let warnings = unknown_paths
            .into_iter()
            .map(|dotted| {
                let key = dotted.rsplit('.').next().unwrap_or(&dotted).to_string();
                ConfigWarning {
                    line: find_line_number(&content, &key),
                    suggestion: suggest_key(&key),
                    file: path.to_path_buf(),
                    key,
                }
            })
            .collect();

        Ok((config, warnings))
    }

    /// Resolve the file layer.
    ///
    /// An explicit path must exist. Without one, `ingestor.toml` in `cwd` is
    /// used when present, otherwise defaults.
    pub fn resolve(
        explicit: Option<&Path>,
        cwd: &Path,
    ) -> IngestResult<(Self, Vec<ConfigWarning>)> {
        if let Some(path) = explicit {
            return Self::load_with_warnings(path);
        }

        let implicit = cwd.join(DEFAULT_CONFIG_FILE);
        if implicit.is_file() {
            return Self::load_with_warnings(&implicit);
        }

        Ok((Self::default(), Vec::new()))
    }

    /// Apply INGESTOR_* environment variable overrides
    pub fn with_env_overrides(self) -> IngestResult<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides_from<F>(mut self, lookup: F) -> IngestResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = non_empty("INGESTOR_LANDING_DIR") {
            self.paths.landing = PathBuf::from(dir);
        }
        if let Some(dir) = non_empty("INGESTOR_BRONZE_DIR") {
            self.paths.bronze = PathBuf::from(dir);
        }
        if let Some(dir) = non_empty("INGESTOR_BAD_DATA_DIR") {
            self.paths.bad_data = PathBuf::from(dir);
        }
        if let Some(file) = non_empty("INGESTOR_LOG_FILE") {
            self.logging.file = PathBuf::from(file);
        }
        if let Some(policy) = non_empty("INGESTOR_ON_CONFLICT") {
            self.ingest.on_conflict = policy.parse::<ConflictPolicy>().map_err(|value| {
                IngestError::InvalidValue {
                    key: "INGESTOR_ON_CONFLICT".to_string(),
                    value,
                    expected: ConflictPolicy::EXPECTED,
                }
            })?;
        }

        Ok(self)
    }
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const KNOWN_KEYS: &[&str] = &[
        "paths",
        "landing",
        "bronze",
        "bad_data",
        "logging",
        "file",
        "level",
        "ingest",
        "on_conflict",
    ];

    KNOWN_KEYS
        .iter()
        .map(|candidate| (candidate, edit_distance(unknown, candidate)))
        .min_by_key(|(_, dist)| *dist)
        .filter(|(_, dist)| *dist <= 2)
        .map(|(candidate, _)| candidate.to_string())
}

/// Levenshtein distance over chars
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            let substitution = diag + usize::from(ca != *cb);
            row[j + 1] = substitution.min(above + 1).min(row[j] + 1);
            diag = above;
        }
    }

    row[b.len()]
}

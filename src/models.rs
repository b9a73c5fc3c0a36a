//! Core data models for the ingestor

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::fs::FsError;

/// Destination tier for a landed file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Non-empty files: raw but usable data
    Bronze,
    /// Empty files: rejected
    BadData,
}

impl Tier {
    /// Classify a file purely by its byte size
    pub fn classify(size: u64) -> Self {
        if size > 0 {
            Tier::Bronze
        } else {
            Tier::BadData
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Bronze => "Bronze",
            Tier::BadData => "Bad Data",
        }
    }
}

/// What to do when the destination already holds a file with the same name
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Keep both: the incoming file gets the first free `name-N` suffix
    #[default]
    Rename,
    /// Replace the existing file
    Overwrite,
    /// Leave the incoming file in landing and count it as an error
    Reject,
}

impl ConflictPolicy {
    pub const EXPECTED: &'static str = "rename, overwrite or reject";

    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictPolicy::Rename => "rename",
            ConflictPolicy::Overwrite => "overwrite",
            ConflictPolicy::Reject => "reject",
        }
    }
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rename" => Ok(ConflictPolicy::Rename),
            "overwrite" => Ok(ConflictPolicy::Overwrite),
            "reject" => Ok(ConflictPolicy::Reject),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A regular file found in landing at scan time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    /// Name the file is stored under in its tier, byte for byte
    pub file_name: OsString,
    /// Lossy UTF-8 rendering for logs and failures
    pub name: String,
}

impl FileEntry {
    pub fn new(path: PathBuf, file_name: OsString) -> Self {
        let name = file_name.to_string_lossy().into_owned();
        Self {
            path,
            file_name,
            name,
        }
    }
}

/// Why a single file could not be moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    PermissionDenied,
    /// Destination name taken under the `reject` policy
    Conflict,
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureKind::NotFound => "file not found",
            FailureKind::PermissionDenied => "permission denied",
            FailureKind::Conflict => "name conflict",
            FailureKind::Other => "unexpected error",
        };
        f.write_str(text)
    }
}

/// Per-file failure, recorded instead of aborting the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub file: String,
    pub kind: FailureKind,
    pub message: String,
}

impl FileFailure {
    pub fn from_fs(file: &str, err: &FsError) -> Self {
        let kind = match err {
            FsError::NotFound(_) => FailureKind::NotFound,
            FsError::PermissionDenied(_) => FailureKind::PermissionDenied,
            FsError::AlreadyExists(_) => FailureKind::Conflict,
            FsError::CrossesDevices(_) | FsError::Io { .. } => FailureKind::Other,
        };
        Self {
            file: file.to_string(),
            kind,
            message: err.to_string(),
        }
    }

    pub fn conflict(file: &str, destination: &std::path::Path) -> Self {
        Self {
            file: file.to_string(),
            kind: FailureKind::Conflict,
            message: format!("{} already exists", destination.display()),
        }
    }
}

/// Result of processing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Moved {
        tier: Tier,
        size: u64,
        destination: PathBuf,
    },
    Failed(FileFailure),
}

/// Outcome counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeTally {
    pub bronze: usize,
    pub bad_data: usize,
    pub errors: usize,
}

impl OutcomeTally {
    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Moved {
                tier: Tier::Bronze, ..
            } => self.bronze += 1,
            FileOutcome::Moved {
                tier: Tier::BadData,
                ..
            } => self.bad_data += 1,
            FileOutcome::Failed(_) => self.errors += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.bronze + self.bad_data + self.errors
    }
}

/// Everything a finished run has to say about itself
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    /// Regular files present in landing at scan time
    pub found: usize,
    pub tally: OutcomeTally,
    pub failures: Vec<FileFailure>,
    /// Entries still in landing after the run; `None` if it could not be listed
    pub leftover: Option<usize>,
    pub duration: Duration,
    pub dry_run: bool,
    /// Landing was missing at scan time (created unless dry run)
    pub landing_created: bool,
}

impl RunReport {
    /// Report for a run that found nothing to ingest
    pub fn nothing_to_do(
        started_at: DateTime<Local>,
        duration: Duration,
        landing_created: bool,
        dry_run: bool,
    ) -> Self {
        Self {
            started_at,
            found: 0,
            tally: OutcomeTally::default(),
            failures: Vec::new(),
            leftover: Some(0),
            duration,
            dry_run,
            landing_created,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.tally.errors == 0 && self.leftover == Some(0)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "event": "ingest",
            "started_at": self.started_at.to_rfc3339(),
            "found": self.found,
            "bronze": self.tally.bronze,
            "bad_data": self.tally.bad_data,
            "errors": self.tally.errors,
            "leftover": self.leftover,
            "duration_secs": self.duration.as_secs_f64(),
            "dry_run": self.dry_run,
            "landing_created": self.landing_created,
            "failures": self.failures,
        })
    }
}

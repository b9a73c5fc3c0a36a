//! Error types for the ingestor
//!
//! Only run-level failures live here. A single file failing to move is not an
//! error of the run: it is reported as a [`crate::models::FileFailure`]
//! inside the file's outcome.

use std::path::PathBuf;
use thiserror::Error;

use crate::fs::FsError;

/// Result type alias for ingestor operations
pub type IngestResult<T> = Result<T, IngestError>;

/// Fatal errors that abort a run
#[derive(Error, Debug)]
pub enum IngestError {
    /// bronze/ or bad_data/ could not be created
    #[error("cannot create destination directory {}: {source}", .path.display())]
    DestinationCreate {
        path: PathBuf,
        #[source]
        source: FsError,
    },

    /// The landing directory was missing and could not be created
    #[error("cannot create landing directory {}: {source}", .path.display())]
    LandingCreate {
        path: PathBuf,
        #[source]
        source: FsError,
    },

    /// The landing directory exists but could not be listed
    #[error("cannot list landing directory {}: {source}", .path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: FsError,
    },

    /// Config file could not be read
    #[error("cannot read config file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the expected layout
    #[error("invalid config in {}: {message}", .path.display())]
    ConfigParse { path: PathBuf, message: String },

    /// A setting (env var or CLI flag) holds an unsupported value
    #[error("invalid value '{value}' for {key} (expected {expected})")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    /// The persistent log file could not be opened
    #[error("cannot open log file {}: {message}", .path.display())]
    LogSetup { path: PathBuf, message: String },
}

//! Bronze Ingestor - landing zone triage for a data lake
//!
//! Scans a landing directory once, moves every non-empty file to the bronze
//! tier and every empty file to bad_data, and reports what happened.

pub mod config;
pub mod error;
pub mod fs;
pub mod ingest;
pub mod logging;
pub mod models;

// Re-exports for convenience
pub use config::{Config, ConfigWarning, LogLevel};
pub use error::{IngestError, IngestResult};
pub use fs::{FileSystem, FsError, LocalFs};
pub use ingest::{IngestSettings, Ingestor};
pub use logging::{LogOptions, RunLogger};
pub use models::{
    ConflictPolicy, FailureKind, FileEntry, FileFailure, FileOutcome, OutcomeTally, RunReport,
    Tier,
};

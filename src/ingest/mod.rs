//! Landing zone ingestion
//!
//! One run: make sure the tier directories exist, list the regular files in
//! landing, then classify and move each one independently. A file that fails
//! is recorded in the report and the batch carries on; only directory setup
//! and the landing listing can abort a run.

mod mover;
mod summary;


use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{IngestError, IngestResult};
use crate::fs::{DirEntryInfo, FileSystem};
use crate::models::{
    ConflictPolicy, FileEntry, FileFailure, FileOutcome, OutcomeTally, RunReport, Tier,
};

pub use mover::{resolve_destination, transfer};
pub use summary::{summary_lines, RULE};

/// Everything a run needs to know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSettings {
    pub landing: PathBuf,
    pub bronze: PathBuf,
    pub bad_data: PathBuf,
    pub on_conflict: ConflictPolicy,
    /// Classify and log, but touch nothing on disk
    pub dry_run: bool,
}

impl IngestSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            landing: config.paths.landing.clone(),
            bronze: config.paths.bronze.clone(),
            bad_data: config.paths.bad_data.clone(),
            on_conflict: config.ingest.on_conflict,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn tier_dir(&self, tier: Tier) -> &Path {
        match tier {
            Tier::Bronze => &self.bronze,
            Tier::BadData => &self.bad_data,
        }
    }
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// The pipeline runner
pub struct Ingestor<FS: FileSystem> {
    settings: IngestSettings,
    fs: FS,
}

impl<FS: FileSystem> Ingestor<FS> {
    pub fn new(settings: IngestSettings, fs: FS) -> Self {
        Self { settings, fs }
    }

    /// Run the whole pipeline once
    pub fn run(&self) -> IngestResult<RunReport> {
        let started_at = Local::now();
        let clock = Instant::now();
        let dry_run = self.settings.dry_run;

        info!("{}", RULE);
        info!("STARTING BRONZE INGESTOR PIPELINE");
        info!("{}", RULE);
        if dry_run {
            info!("Dry run: nothing will be moved or created");
        }

        self.ensure_destinations()?;

        let landing = &self.settings.landing;
        if !self.fs.exists(landing) {
            error!("Landing directory {} does not exist, creating it", landing.display());
            if !dry_run {
                self.fs
                    .create_dir_all(landing)
                    .map_err(|source| IngestError::LandingCreate {
                        path: landing.clone(),
                        source,
                    })?;
            }
            if dry_run {
                warn!("Landing directory {} would be created, nothing to ingest", landing.display());
            } else {
                warn!("Landing directory {} created but it is empty", landing.display());
            }
            return Ok(RunReport::nothing_to_do(
                started_at,
                clock.elapsed(),
                true,
                dry_run,
            ));
        }

        let listing = self.list_landing()?;
        let listed = listing.len();
        let entries = regular_files(listing);
        if entries.is_empty() {
            warn!("No files found in {}", landing.display());
            let report = RunReport {
                leftover: Some(listed),
                ..RunReport::nothing_to_do(started_at, clock.elapsed(), false, dry_run)
            };
            if listed > 0 {
                self.log_leftover(&report);
            }
            return Ok(report);
        }

        info!("Files found: {}", entries.len());

        let mut tally = OutcomeTally::default();
        let mut failures = Vec::new();
        for entry in &entries {
            let outcome = self.process_file(entry);
            tally.record(&outcome);
            if let FileOutcome::Failed(failure) = outcome {
                failures.push(failure);
            }
        }

        let leftover = match self.fs.list_dir(landing) {
            Ok(remaining) => Some(remaining.len()),
            Err(err) => {
                warn!("Could not re-check {}: {}", landing.display(), err);
                None
            }
        };

        let report = RunReport {
            started_at,
            found: entries.len(),
            tally,
            failures,
            leftover,
            duration: clock.elapsed(),
            dry_run,
            landing_created: false,
        };

        for line in summary_lines(&report) {
            info!("{}", line);
        }
        self.log_leftover(&report);

        Ok(report)
    }

    /// Create the bronze and bad data directories. Failure is fatal.
    pub fn ensure_destinations(&self) -> IngestResult<()> {
        if self.settings.dry_run {
            return Ok(());
        }

        for dir in [&self.settings.bronze, &self.settings.bad_data] {
            if let Err(source) = self.fs.create_dir_all(dir) {
                error!(
                    "Critical error creating destination {}: {}",
                    dir.display(),
                    source
                );
                return Err(IngestError::DestinationCreate {
                    path: dir.clone(),
                    source,
                });
            }
        }

        info!("Destination directories verified");
        Ok(())
    }

    /// Regular files in landing, sorted by name
    pub fn scan(&self) -> IngestResult<Vec<FileEntry>> {
        self.list_landing().map(regular_files)
    }

    fn list_landing(&self) -> IngestResult<Vec<DirEntryInfo>> {
        let landing = &self.settings.landing;
        self.fs
            .list_dir(landing)
            .map_err(|source| IngestError::Scan {
                path: landing.clone(),
                source,
            })
    }

    /// Classify and move one file. Never fails: errors become the outcome.
    pub fn process_file(&self, entry: &FileEntry) -> FileOutcome {
        info!("Processing: {}", entry.name);

        let outcome = match self.try_process(entry) {
            Ok(outcome) => outcome,
            Err(failure) => {
                error!(
                    "Error with {}: {} - {}",
                    failure.file, failure.kind, failure.message
                );
                FileOutcome::Failed(failure)
            }
        };

        info!("Finished attempt for {}", entry.name);
        outcome
    }

    fn try_process(&self, entry: &FileEntry) -> Result<FileOutcome, FileFailure> {
        let size = self
            .fs
            .file_size(&entry.path)
            .map_err(|err| FileFailure::from_fs(&entry.name, &err))?;
        info!("Size detected: {} bytes", size);

        let tier = Tier::classify(size);
        let destination = resolve_destination(
            &self.fs,
            self.settings.tier_dir(tier),
            &entry.file_name,
            self.settings.on_conflict,
        )?;

        if self.settings.dry_run {
            info!(
                "Would move {} -> {} ({} bytes)",
                entry.name,
                destination.display(),
                size
            );
        } else {
            transfer(&self.fs, &entry.path, &destination)
                .map_err(|err| FileFailure::from_fs(&entry.name, &err))?;

            match tier {
                Tier::Bronze => info!(
                    "✓ Processed: {} -> {} ({} bytes)",
                    entry.name,
                    tier.label(),
                    size
                ),
                Tier::BadData => warn!("✗ Rejected: {} -> {} (0 bytes)", entry.name, tier.label()),
            }
            if destination.file_name() != Some(entry.file_name.as_os_str()) {
                info!("Name taken, stored as {}", destination.display());
            }
        }

        Ok(FileOutcome::Moved {
            tier,
            size,
            destination,
        })
    }

    fn log_leftover(&self, report: &RunReport) {
        let landing = self.settings.landing.display();
        match report.leftover {
            _ if report.dry_run => {
                info!("Dry run complete, {} left untouched", landing);
            }
            Some(0) => info!("✓ {} is empty - pipeline completed successfully", landing),
            Some(n) => warn!("WARNING: {} entries remain in {}", n, landing),
            None => {}
        }
    }
}

/// Keep the regular files of a listing, in byte order of their names
fn regular_files(listing: Vec<DirEntryInfo>) -> Vec<FileEntry> {
    let mut entries: Vec<FileEntry> = listing
        .into_iter()
        .filter_map(|entry| {
            if entry.is_file {
                Some(FileEntry::new(entry.path, entry.file_name))
            } else {
                debug!("Skipping non-file entry {}", entry.name());
                None
            }
        })
        .collect();
    entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    entries
}

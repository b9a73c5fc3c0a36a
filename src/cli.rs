use std::path::PathBuf;

use bronze_ingestor::{Config, ConflictPolicy};
use clap::Parser;

/// Bronze Ingestor - sort landed files into bronze/ and bad_data/
#[derive(Parser, Debug)]
#[command(name = "bronze-ingestor")]
#[command(author, version, about, long_about = None)]
#[command(
    after_help = "With no arguments, processes ./landing into ./bronze and ./bad_data and logs to ./ingestor.log."
)]
pub struct Cli {
    /// Directory scanned for incoming files
    #[arg(long, value_name = "DIR")]
    pub landing: Option<PathBuf>,

    /// Destination for non-empty files
    #[arg(long, value_name = "DIR")]
    pub bronze: Option<PathBuf>,

    /// Destination for empty files
    #[arg(long, value_name = "DIR")]
    pub bad_data: Option<PathBuf>,

    /// Persistent log file (appended to)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Config file (defaults to ./ingestor.toml when present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// What to do when the destination already has a file with the same name
    #[arg(long, value_enum, value_name = "POLICY")]
    pub on_conflict: Option<ConflictPolicy>,

    /// Classify and log without moving anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON on stdout (log lines go to the file only)
    #[arg(long)]
    pub json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Apply flags on top of the lower configuration layers
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.landing {
            config.paths.landing = dir.clone();
        }
        if let Some(dir) = &self.bronze {
            config.paths.bronze = dir.clone();
        }
        if let Some(dir) = &self.bad_data {
            config.paths.bad_data = dir.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = file.clone();
        }
        if let Some(policy) = self.on_conflict {
            config.ingest.on_conflict = policy;
        }
        config
    }
}

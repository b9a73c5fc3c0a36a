//! Bronze Ingestor CLI
//!
//! Usage: bronze-ingestor [OPTIONS]
//!
//! Runs one pass over the landing directory and exits. Per-file failures are
//! logged and counted; only setup failures exit non-zero.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, warn};

use bronze_ingestor::{
    Config, ConfigWarning, IngestSettings, Ingestor, LocalFs, LogOptions, RunLogger,
};

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, warnings) = match load_config(&cli) {
        Ok(loaded) => loaded,
        Err(err) => {
            // No usable config: log to the default (or flagged) file instead.
            let fallback = cli.apply(Config::default());
            let _logger = RunLogger::install(&log_options(&cli, &fallback))?;
            error!("Fatal configuration error: {:#}", err);
            return Err(err);
        }
    };

    let _logger = RunLogger::install(&log_options(&cli, &config))?;

    for warning in &warnings {
        warn!("{}", warning);
    }

    let settings = IngestSettings::from_config(&config).with_dry_run(cli.dry_run);
    let report = match Ingestor::new(settings, LocalFs::new()).run() {
        Ok(report) => report,
        Err(err) => {
            error!("Fatal pipeline error: {}", err);
            return Err(err.into());
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string(&report.to_json())?);
    }

    Ok(())
}

/// Config file, then env, then flags
fn load_config(cli: &Cli) -> Result<(Config, Vec<ConfigWarning>)> {
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let (config, warnings) = Config::resolve(cli.config.as_deref(), &cwd)?;
    Ok((cli.apply(config.with_env_overrides()?), warnings))
}

fn log_options(cli: &Cli, config: &Config) -> LogOptions {
    LogOptions::new(&config.logging)
        .verbose(cli.verbose)
        .console(!cli.json)
        .directive(std::env::var("RUST_LOG").ok())
}

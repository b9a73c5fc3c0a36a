//! Run-scoped logging
//!
//! Every event is written twice, one line each: to stdout and to a
//! persistent log file that is appended to across runs. A line carries a
//! local timestamp, the level and the message.
//!
//! The subscriber is installed with `set_default`, so it only lives as long
//! as the [`RunLogger`] that owns it. Nothing is registered process-wide.

use std::path::{Path, PathBuf};

use is_terminal::IsTerminal;
use tracing::subscriber::DefaultGuard;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{LogLevel, LoggingConfig};
use crate::error::{IngestError, IngestResult};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// How the run logger should be built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    pub file: PathBuf,
    pub level: LogLevel,
    /// `-v` count; raises the level to debug (1) or trace (2+)
    pub verbose: u8,
    /// Mirror events to stdout
    pub console: bool,
    /// Filter directive that replaces the level entirely (e.g. `RUST_LOG`)
    pub directive: Option<String>,
}

impl LogOptions {
    pub fn new(config: &LoggingConfig) -> Self {
        Self {
            file: config.file.clone(),
            level: config.level,
            verbose: 0,
            console: true,
            directive: None,
        }
    }

    pub fn verbose(mut self, verbose: u8) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    pub fn directive(mut self, directive: Option<String>) -> Self {
        self.directive = directive.filter(|d| !d.trim().is_empty());
        self
    }

    fn filter(&self) -> EnvFilter {
        if let Some(directive) = &self.directive {
            if let Ok(filter) = EnvFilter::try_new(directive) {
                return filter;
            }
        }
        let level = match self.verbose {
            0 => self.level.as_str(),
            1 => LogLevel::Debug.as_str(),
            _ => LogLevel::Trace.as_str(),
        };
        EnvFilter::new(level)
    }
}

/// Logger owned by a single run
///
/// Dropping it uninstalls the subscriber and flushes the file writer.
pub struct RunLogger {
    // Field order matters: the dispatcher goes before the writer is flushed.
    _dispatch: DefaultGuard,
    _flush: WorkerGuard,
}

impl RunLogger {
    /// Build the subscriber and make it the current thread's default
    pub fn install(options: &LogOptions) -> IngestResult<Self> {
        let (file_writer, flush) = tracing_appender::non_blocking(file_appender(&options.file)?);

        let console = options.console.then(|| {
            fmt::layer()
                .with_target(false)
                .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
                .with_ansi(std::io::stdout().is_terminal())
                .with_writer(std::io::stdout)
        });

        let file = fmt::layer()
            .with_target(false)
            .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
            .with_ansi(false)
            .with_writer(file_writer);

        let subscriber = tracing_subscriber::registry()
            .with(options.filter())
            .with(console)
            .with(file);

        Ok(Self {
            _dispatch: tracing::subscriber::set_default(subscriber),
            _flush: flush,
        })
    }
}

/// Append-only appender for `path`, creating its directory if needed
fn file_appender(path: &Path) -> IngestResult<RollingFileAppender> {
    let setup_error = |message: String| IngestError::LogSetup {
        path: path.to_path_buf(),
        message,
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| setup_error("path has no file name".to_string()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(dir).map_err(|e| setup_error(e.to_string()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .map_err(|e| setup_error(e.to_string()))
}

//! Test environment builder for isolated ingestor runs.
//!
//! Provides `TestEnv` - a temp working directory with helpers to seed the
//! landing directory and run the ingestor binary inside it.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Environment variables the ingestor reads; cleared for every run so the
/// developer's shell cannot leak into tests.
const INGESTOR_VARS: &[&str] = &[
    "INGESTOR_LANDING_DIR",
    "INGESTOR_BRONZE_DIR",
    "INGESTOR_BAD_DATA_DIR",
    "INGESTOR_LOG_FILE",
    "INGESTOR_ON_CONFLICT",
    "RUST_LOG",
];

/// Result of running the ingestor binary
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated working directory
pub struct TestEnv {
    pub root: TempDir,
}

impl TestEnv {
    pub fn builder() -> TestEnvBuilder {
        TestEnvBuilder::new()
    }

    /// Path relative to the working directory
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    /// Run the ingestor with the working directory as cwd
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    /// Run the ingestor with extra environment variables
    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_bronze-ingestor"));
        cmd.current_dir(self.root.path()).args(args);

        for var in INGESTOR_VARS {
            cmd.env_remove(var);
        }
        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute bronze-ingestor");
        Self::output_to_result(output)
    }

    fn output_to_result(output: Output) -> TestResult {
        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// Drop a file into landing/ (or any relative path)
    pub fn write_file(&self, relative: &str, content: &str) {
        let full_path = self.path(relative);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
    }

    pub fn read_file(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative, e))
    }

    /// Sorted file names directly inside a directory (empty if missing)
    pub fn list(&self, relative: &str) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.path(relative))
            .map(|rd| {
                rd.flatten()
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Content of the default log file
    pub fn log(&self) -> String {
        self.read_log("ingestor.log")
    }

    pub fn read_log(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative)).unwrap_or_default()
    }

    pub fn root_path(&self) -> &Path {
        self.root.path()
    }
}

/// Builder for `TestEnv`
#[derive(Default)]
pub struct TestEnvBuilder {
    landing_files: Vec<(String, String)>,
    extra_files: Vec<(String, String)>,
    dirs: Vec<String>,
    create_landing: bool,
}

impl TestEnvBuilder {
    pub fn new() -> Self {
        Self {
            create_landing: true,
            ..Self::default()
        }
    }

    /// Add a file to landing/
    pub fn with_landing_file(mut self, name: &str, content: &str) -> Self {
        self.landing_files
            .push((name.to_string(), content.to_string()));
        self
    }

    /// Add a file anywhere in the working directory
    pub fn with_file(mut self, relative: &str, content: &str) -> Self {
        self.extra_files
            .push((relative.to_string(), content.to_string()));
        self
    }

    /// Create an (empty) directory in the working directory
    pub fn with_dir(mut self, relative: &str) -> Self {
        self.dirs.push(relative.to_string());
        self
    }

    /// Do not create landing/
    pub fn without_landing(mut self) -> Self {
        self.create_landing = false;
        self
    }

    pub fn build(self) -> TestEnv {
        let env = TestEnv {
            root: TempDir::new().expect("Failed to create temp work dir"),
        };

        if self.create_landing || !self.landing_files.is_empty() {
            std::fs::create_dir_all(env.path("landing")).expect("Failed to create landing");
        }
        for (name, content) in &self.landing_files {
            env.write_file(&format!("landing/{}", name), content);
        }
        for dir in &self.dirs {
            std::fs::create_dir_all(env.path(dir)).expect("Failed to create dir");
        }
        for (relative, content) in &self.extra_files {
            env.write_file(relative, content);
        }

        env
    }
}

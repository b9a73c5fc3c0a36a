//! Custom assertion macros for CLI tests.
//!
//! These macros provide descriptive failure messages to aid debugging.

use std::path::Path;

/// List all files under a directory recursively (for debugging)
pub fn list_all_files(dir: &Path) -> Vec<String> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(list_all_files(&path));
            } else {
                files.push(path.display().to_string());
            }
        }
    }
    files.sort();
    files
}

/// Assert that a file ended up at the given path relative to the work dir.
///
/// # Example
/// ```ignore
/// assert_landed!(env, "bronze/orders.csv");
/// ```
#[macro_export]
macro_rules! assert_landed {
    ($env:expr, $path:expr) => {
        let full_path = $env.path($path);
        assert!(
            full_path.is_file(),
            "Expected file at '{}', but it doesn't exist.\n\
             Work dir: {:?}\n\
             Files found:\n  {}",
            $path,
            $env.root.path(),
            $crate::common::list_all_files($env.root.path()).join("\n  ")
        );
    };
}

/// Assert that nothing exists at the given path.
#[macro_export]
macro_rules! assert_absent {
    ($env:expr, $path:expr) => {
        let full_path = $env.path($path);
        assert!(
            !full_path.exists(),
            "Expected '{}' to NOT exist, but it does.\n\
             Files found:\n  {}",
            $path,
            $crate::common::list_all_files($env.root.path()).join("\n  ")
        );
    };
}

/// Assert that stdout or stderr contains the expected text.
#[macro_export]
macro_rules! assert_output_contains {
    ($result:expr, $text:expr) => {
        let combined = $result.combined_output();
        assert!(
            combined.contains($text),
            "Expected output to contain '{}'.\nActual output:\n{}",
            $text,
            combined
        );
    };
}

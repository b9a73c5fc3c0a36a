//! Moving a file into its tier directory
//!
//! Destination names are resolved against the collision policy first, then
//! the file is renamed. A rename that crosses devices falls back to copying
//! into a partial file next to the destination. The source is removed only
//! once the copy is complete, and the partial file is renamed into place last.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::fs::{FileSystem, FsError};
use crate::models::{ConflictPolicy, FileFailure};

/// Pick the destination path for `name` inside `dir`
pub fn resolve_destination<FS: FileSystem>(
    fs: &FS,
    dir: &Path,
    name: &OsStr,
    policy: ConflictPolicy,
) -> Result<PathBuf, FileFailure> {
    let target = dir.join(name);
    if !fs.exists(&target) {
        return Ok(target);
    }

    let conflict = || FileFailure::conflict(&name.to_string_lossy(), &target);
    match policy {
        ConflictPolicy::Overwrite => Ok(target.clone()),
        ConflictPolicy::Reject => Err(conflict()),
        ConflictPolicy::Rename => (1..=u32::MAX)
            .map(|n| dir.join(numbered_name(name, n)))
            .find(|candidate| !fs.exists(candidate))
            .ok_or_else(conflict),
    }
}

/// `report.csv` -> `report-2.csv`, `README` -> `README-2`, `.env` -> `.env-2`
fn numbered_name(name: &OsStr, n: u32) -> OsString {
    let path = Path::new(name);
    let mut numbered = path.file_stem().unwrap_or(name).to_os_string();
    numbered.push(format!("-{}", n));
    if let Some(ext) = path.extension() {
        numbered.push(".");
        numbered.push(ext);
    }
    numbered
}

/// Move `source` to `destination`
pub fn transfer<FS: FileSystem>(fs: &FS, source: &Path, destination: &Path) -> Result<(), FsError> {
    match fs.rename(source, destination) {
        Err(FsError::CrossesDevices(_)) => {
            debug!(
                "rename across devices, copying {} -> {}",
                source.display(),
                destination.display()
            );
            copy_then_remove(fs, source, destination)
        }
        other => other,
    }
}

/// Free `.<name>.partial[-N]` path beside `destination`
fn partial_path<FS: FileSystem>(fs: &FS, destination: &Path) -> PathBuf {
    let name = destination.file_name().unwrap_or(destination.as_os_str());
    let mut base = OsString::from(".");
    base.push(name);
    base.push(".partial");

    let candidate = destination.with_file_name(&base);
    if !fs.exists(&candidate) {
        return candidate;
    }
    (1..=u32::MAX)
        .map(|n| {
            let mut numbered = base.clone();
            numbered.push(format!("-{}", n));
            destination.with_file_name(numbered)
        })
        .find(|candidate| !fs.exists(candidate))
        .unwrap_or(candidate)
}

fn copy_then_remove<FS: FileSystem>(
    fs: &FS,
    source: &Path,
    destination: &Path,
) -> Result<(), FsError> {
    let partial = partial_path(fs, destination);

    let staged = fs.copy(source, &partial).and_then(|_| fs.remove_file(source));
    if let Err(err) = staged {
        // The source is still in place; drop whatever part of the copy exists.
        if fs.exists(&partial) {
            if let Err(cleanup) = fs.remove_file(&partial) {
                debug!(
                    "could not remove partial copy {}: {}",
                    partial.display(),
                    cleanup
                );
            }
        }
        return Err(err);
    }

    fs.rename(&partial, destination)
}

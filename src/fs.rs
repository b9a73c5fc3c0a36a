//! File system port
//!
//! The ingestor only talks to the disk through [`FileSystem`], so tests can
//! swap in [`MockFileSystem`] to make files vanish or refuse to move.

use std::borrow::Cow;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for file system operations
pub type FsResult<T> = Result<T, FsError>;

/// File system operation errors, tagged with the path that failed
#[derive(Debug, Error)]
pub enum FsError {
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// `rename` cannot cross file system boundaries
    #[error("cannot rename across devices: {}", .0.display())]
    CrossesDevices(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Attach a path to a raw `io::Error`, keeping the kinds the ingestor
    /// reacts to as their own variants.
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound(path),
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied(path),
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists(path),
            io::ErrorKind::CrossesDevices => FsError::CrossesDevices(path),
            _ => FsError::Io { path, source: err },
        }
    }
}

/// A directory listing entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub path: PathBuf,
    /// Raw file name, not necessarily UTF-8
    pub file_name: OsString,
    /// True for regular files (symlinks are followed)
    pub is_file: bool,
}

impl DirEntryInfo {
    /// File name for display; invalid UTF-8 is replaced
    pub fn name(&self) -> Cow<'_, str> {
        self.file_name.to_string_lossy()
    }
}

/// Abstract file system interface
///
/// Implementations:
/// - `LocalFs` - standard file I/O
/// - `MockFileSystem` - in-memory, with fault injection (tests only)
pub trait FileSystem {
    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Create a directory and its parents
    fn create_dir_all(&self, path: &Path) -> FsResult<()>;

    /// List the direct children of a directory
    fn list_dir(&self, path: &Path) -> FsResult<Vec<DirEntryInfo>>;

    /// Size of a file in bytes
    fn file_size(&self, path: &Path) -> FsResult<u64>;

    /// Rename within one file system, replacing `to` if it exists
    fn rename(&self, from: &Path, to: &Path) -> FsResult<()>;

    /// Copy file content and permissions
    fn copy(&self, from: &Path, to: &Path) -> FsResult<u64>;

    /// Remove a file
    fn remove_file(&self, path: &Path) -> FsResult<()>;
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        (**self).create_dir_all(path)
    }

    fn list_dir(&self, path: &Path) -> FsResult<Vec<DirEntryInfo>> {
        (**self).list_dir(path)
    }

    fn file_size(&self, path: &Path) -> FsResult<u64> {
        (**self).file_size(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> FsResult<()> {
        (**self).rename(from, to)
    }

    fn copy(&self, from: &Path, to: &Path) -> FsResult<u64> {
        (**self).copy(from, to)
    }

    fn remove_file(&self, path: &Path) -> FsResult<()> {
        (**self).remove_file(path)
    }
}

/// Local disk implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        std::fs::create_dir_all(path).map_err(|e| FsError::from_io(e, path))
    }

    fn list_dir(&self, path: &Path) -> FsResult<Vec<DirEntryInfo>> {
        let read_dir = std::fs::read_dir(path).map_err(|e| FsError::from_io(e, path))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| FsError::from_io(e, path))?;
            let entry_path = entry.path();
            entries.push(DirEntryInfo {
                is_file: entry_path.is_file(),
                file_name: entry.file_name(),
                path: entry_path,
            });
        }
        Ok(entries)
    }

    fn file_size(&self, path: &Path) -> FsResult<u64> {
        std::fs::metadata(path)
            .map(|meta| meta.len())
            .map_err(|e| FsError::from_io(e, path))
    }

    fn rename(&self, from: &Path, to: &Path) -> FsResult<()> {
        std::fs::rename(from, to).map_err(|e| FsError::from_io(e, from))
    }

    fn copy(&self, from: &Path, to: &Path) -> FsResult<u64> {
        std::fs::copy(from, to).map_err(|e| FsError::from_io(e, from))
    }

    fn remove_file(&self, path: &Path) -> FsResult<()> {
        std::fs::remove_file(path).map_err(|e| FsError::from_io(e, path))
    }
}

/// In-memory file system for testing
///
/// Files are stored as `path -> size`. Faults are injected per path:
/// - `vanish`: the file disappears the first time its size is read
/// - `deny`: rename and copy fail with permission denied
/// - `cross_device`: renames between directories fail as if crossing devices
/// - `undeletable`: remove fails with permission denied
/// - `broken_copy`: copy leaves an empty destination behind and fails
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileSystem {
    state: std::sync::Mutex<MockState>,
}

#[cfg(test)]
#[derive(Debug, Default)]
struct MockState {
    files: std::collections::BTreeMap<PathBuf, u64>,
    dirs: std::collections::BTreeSet<PathBuf>,
    vanish: std::collections::HashSet<PathBuf>,
    deny: std::collections::HashSet<PathBuf>,
    undeletable: std::collections::HashSet<PathBuf>,
    readonly_dirs: std::collections::HashSet<PathBuf>,
    broken_copy: std::collections::HashSet<PathBuf>,
    cross_device: bool,
}

#[cfg(test)]
impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn add_dir(&self, path: impl Into<PathBuf>) -> &Self {
        self.state().dirs.insert(path.into());
        self
    }

    pub fn add_file(&self, path: impl Into<PathBuf>, size: u64) -> &Self {
        self.state().files.insert(path.into(), size);
        self
    }

    pub fn vanish_on_read(&self, path: impl Into<PathBuf>) -> &Self {
        self.state().vanish.insert(path.into());
        self
    }

    pub fn deny_move(&self, path: impl Into<PathBuf>) -> &Self {
        self.state().deny.insert(path.into());
        self
    }

    pub fn deny_remove(&self, path: impl Into<PathBuf>) -> &Self {
        self.state().undeletable.insert(path.into());
        self
    }

    pub fn readonly_dir(&self, path: impl Into<PathBuf>) -> &Self {
        self.state().readonly_dirs.insert(path.into());
        self
    }

    pub fn break_copy(&self, path: impl Into<PathBuf>) -> &Self {
        self.state().broken_copy.insert(path.into());
        self
    }

    pub fn force_cross_device(&self) -> &Self {
        self.state().cross_device = true;
        self
    }

    pub fn has_file(&self, path: impl AsRef<Path>) -> bool {
        self.state().files.contains_key(path.as_ref())
    }

    pub fn size_of(&self, path: impl AsRef<Path>) -> Option<u64> {
        self.state().files.get(path.as_ref()).copied()
    }

    pub fn files_in(&self, dir: impl AsRef<Path>) -> Vec<PathBuf> {
        let dir = dir.as_ref();
        self.state()
            .files
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let state = self.state();
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        let mut state = self.state();
        if state.readonly_dirs.contains(path) {
            return Err(FsError::PermissionDenied(path.to_path_buf()));
        }
        if state.files.contains_key(path) {
            return Err(FsError::AlreadyExists(path.to_path_buf()));
        }
        state.dirs.insert(path.to_path_buf());
        Ok(())
    }

    fn list_dir(&self, path: &Path) -> FsResult<Vec<DirEntryInfo>> {
        let state = self.state();
        if !state.dirs.contains(path) {
            return Err(FsError::NotFound(path.to_path_buf()));
        }
        let to_entry = |p: &PathBuf, is_file: bool| DirEntryInfo {
            path: p.clone(),
            file_name: p.file_name().map(OsString::from).unwrap_or_default(),
            is_file,
        };
        let files = state
            .files
            .keys()
            .filter(|p| p.parent() == Some(path))
            .map(|p| to_entry(p, true));
        let dirs = state
            .dirs
            .iter()
            .filter(|p| p.parent() == Some(path))
            .map(|p| to_entry(p, false));
        Ok(files.chain(dirs).collect())
    }

    fn file_size(&self, path: &Path) -> FsResult<u64> {
        let mut state = self.state();
        if state.vanish.remove(path) {
            state.files.remove(path);
        }
        state
            .files
            .get(path)
            .copied()
            .ok_or_else(|| FsError::NotFound(path.to_path_buf()))
    }

    fn rename(&self, from: &Path, to: &Path) -> FsResult<()> {
        let mut state = self.state();
        if state.deny.contains(from) {
            return Err(FsError::PermissionDenied(from.to_path_buf()));
        }
        if state.cross_device && from.parent() != to.parent() {
            return Err(FsError::CrossesDevices(from.to_path_buf()));
        }
        let size = state
            .files
            .remove(from)
            .ok_or_else(|| FsError::NotFound(from.to_path_buf()))?;
        state.files.insert(to.to_path_buf(), size);
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> FsResult<u64> {
        let mut state = self.state();
        if state.deny.contains(from) {
            return Err(FsError::PermissionDenied(from.to_path_buf()));
        }
        let size = *state
            .files
            .get(from)
            .ok_or_else(|| FsError::NotFound(from.to_path_buf()))?;
        if state.broken_copy.contains(from) {
            state.files.insert(to.to_path_buf(), 0);
            return Err(FsError::Io {
                path: from.to_path_buf(),
                source: io::Error::other("no space left on device"),
            });
        }
        state.files.insert(to.to_path_buf(), size);
        Ok(size)
    }

    fn remove_file(&self, path: &Path) -> FsResult<()> {
        let mut state = self.state();
        if state.undeletable.contains(path) {
            return Err(FsError::PermissionDenied(path.to_path_buf()));
        }
        state
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| FsError::NotFound(path.to_path_buf()))
    }
}

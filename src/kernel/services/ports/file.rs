//! File broker contract: error taxonomy and directory entries.

use std::cmp::Ordering;
use std::io;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, FileError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileError {
    AccessDenied(PathBuf),
    NotFound(PathBuf),
    Io { path: PathBuf, message: String },
    Cancelled,
}

impl FileError {
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FileError::NotFound(path.to_path_buf()),
            _ => FileError::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
        }
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, FileError::AccessDenied(_))
    }
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileError::AccessDenied(p) => write!(f, "Access denied: {}", p.display()),
            FileError::NotFound(p) => write!(f, "Not found: {}", p.display()),
            FileError::Io { path, message } => {
                write!(f, "IO error on {}: {}", path.display(), message)
            }
            FileError::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl std::error::Error for FileError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

impl DirEntry {
    pub fn new(path: PathBuf, is_dir: bool) -> Self {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self { name, path, is_dir }
    }
}

/// Directories first, then ordinal (case-sensitive) name order.
pub fn compare_entries(a: &DirEntry, b: &DirEntry) -> Ordering {
    match (a.is_dir, b.is_dir) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.cmp(&b.name),
    }
}

pub fn sort_entries(entries: &mut [DirEntry]) {
    entries.sort_by(compare_entries);
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/file.rs"]
mod tests;

//! 本地文件系统操作
//!
//! Async primitives used by the broker after a path has been resolved and
//! checked.

use crate::kernel::services::ports::file::{sort_entries, DirEntry, FileError, Result};
use std::path::{Path, PathBuf};

pub async fn read_text(path: &Path) -> Result<String> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| FileError::from_io(path, e))?;
    if !metadata.is_file() {
        return Err(FileError::Io {
            path: path.to_path_buf(),
            message: "not a file".to_string(),
        });
    }
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| FileError::from_io(path, e))
}

pub async fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if tokio::fs::metadata(parent).await.is_err() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FileError::from_io(parent, e))?;
        }
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|e| FileError::from_io(path, e))
}

pub async fn read_dir(path: &Path) -> Result<Vec<DirEntry>> {
    let mut reader = tokio::fs::read_dir(path)
        .await
        .map_err(|e| FileError::from_io(path, e))?;

    let mut entries = Vec::new();
    while let Some(entry) = reader
        .next_entry()
        .await
        .map_err(|e| FileError::from_io(path, e))?
    {
        let is_dir = match entry.file_type().await {
            Ok(file_type) if file_type.is_symlink() => tokio::fs::metadata(entry.path())
                .await
                .map(|meta| meta.is_dir())
                .unwrap_or(false),
            Ok(file_type) => file_type.is_dir(),
            Err(_) => continue,
        };
        entries.push(DirEntry {
            name: entry.file_name().to_string_lossy().to_string(),
            path: entry.path(),
            is_dir,
        });
    }

    sort_entries(&mut entries);
    Ok(entries)
}

/// Canonical form of `path`. A missing final component is allowed so that
/// new files can be resolved before their first write.
pub async fn canonicalize_lenient(path: &Path) -> Result<PathBuf> {
    match tokio::fs::canonicalize(path).await {
        Ok(canonical) => Ok(canonical),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
                return Err(FileError::NotFound(path.to_path_buf()));
            };
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            let parent = tokio::fs::canonicalize(parent)
                .await
                .map_err(|_| FileError::NotFound(path.to_path_buf()))?;
            Ok(parent.join(name))
        }
        Err(e) => Err(FileError::from_io(path, e)),
    }
}

pub fn canonicalize_lenient_sync(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|p| p.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/file/local.rs"]
mod tests;

//! 会话存储
//!
//! 跨平台的应用数据目录：
//! - macOS: ~/Library/Application Support/folio/
//! - Linux: ~/.local/share/folio/
//! - Windows: %APPDATA%\folio\
//!
//! 缺失或损坏的文件按默认值处理，不做版本迁移。

use crate::kernel::session::{SessionSnapshot, WindowBounds};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "folio";
const SESSION_FILE: &str = "session.json";
const WINDOW_STATE_FILE: &str = "window-state.json";
const LOG_DIR: &str = "logs";

#[derive(Debug)]
pub enum SessionStoreError {
    NoDataDir,
    Io { path: PathBuf, source: std::io::Error },
    Encode(serde_json::Error),
}

impl fmt::Display for SessionStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDataDir => write!(f, "Cannot determine application data directory"),
            Self::Io { path, source } => write!(f, "IO error on {}: {}", path.display(), source),
            Self::Encode(e) => write!(f, "Failed to encode session: {}", e),
        }
    }
}

impl std::error::Error for SessionStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NoDataDir => None,
            Self::Io { source, .. } => Some(source),
            Self::Encode(e) => Some(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn default_location() -> Result<Self, SessionStoreError> {
        get_app_data_dir()
            .map(Self::new)
            .ok_or(SessionStoreError::NoDataDir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    pub fn bounds_path(&self) -> PathBuf {
        self.dir.join(WINDOW_STATE_FILE)
    }

    pub fn load(&self) -> SessionSnapshot {
        read_record(&self.session_path())
    }

    pub fn save(&self, snapshot: &SessionSnapshot) -> Result<(), SessionStoreError> {
        write_record(&self.session_path(), snapshot)
    }

    pub fn load_bounds(&self) -> WindowBounds {
        read_record(&self.bounds_path())
    }

    pub fn save_bounds(&self, bounds: &WindowBounds) -> Result<(), SessionStoreError> {
        write_record(&self.bounds_path(), bounds)
    }
}

fn read_record<T: DeserializeOwned + Default>(path: &Path) -> T {
    let Ok(data) = std::fs::read_to_string(path) else {
        return T::default();
    };
    serde_json::from_str(&data).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "malformed record, using defaults");
        T::default()
    })
}

fn write_record<T: Serialize>(path: &Path, value: &T) -> Result<(), SessionStoreError> {
    let data = serde_json::to_string_pretty(value).map_err(SessionStoreError::Encode)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| SessionStoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    // 先写临时文件再替换，避免写到一半的记录
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, data).map_err(|source| SessionStoreError::Io {
        path: tmp.clone(),
        source,
    })?;
    std::fs::rename(&tmp, path).map_err(|source| SessionStoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// 获取应用数据目录
fn get_app_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME").ok().map(|home| {
            PathBuf::from(home)
                .join("Library/Application Support")
                .join(APP_NAME)
        })
    }

    #[cfg(target_os = "linux")]
    {
        // 优先使用 XDG_DATA_HOME，否则使用 ~/.local/share
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            Some(PathBuf::from(xdg).join(APP_NAME))
        } else {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".local/share").join(APP_NAME))
        }
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_NAME))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        None
    }
}

/// 获取日志目录路径
pub fn get_log_dir() -> Option<PathBuf> {
    get_app_data_dir().map(|p| p.join(LOG_DIR))
}

/// 确保日志目录存在
pub fn ensure_log_dir() -> std::io::Result<PathBuf> {
    let dir = get_log_dir().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "Cannot determine log directory")
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }

    Ok(dir)
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/session_store.rs"]
mod tests;

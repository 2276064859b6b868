use crate::kernel::documents::{DocumentId, SaveRequest};
use crate::kernel::git::GitStatusKind;
use crate::kernel::services::adapters::file_watcher::FolderChange;
use crate::kernel::services::ports::{DirEntry, FileError};
use crate::kernel::session::RestoredDocument;
use crate::kernel::DirListing;
use std::path::PathBuf;

#[derive(Debug)]
pub enum AppMessage {
    FileLoaded {
        path: PathBuf,
        content: String,
    },
    FileLoadFailed {
        path: PathBuf,
        error: FileError,
    },
    FileSaved {
        request: SaveRequest,
        result: Result<(), FileError>,
    },
    SavePathChosen {
        id: DocumentId,
        path: PathBuf,
    },
    OpenFileChosen(PathBuf),
    OpenFolderChosen(PathBuf),
    DialogCancelled,
    FolderOpened {
        request: u64,
        root: PathBuf,
    },
    FolderOpenFailed {
        request: u64,
        path: PathBuf,
        error: FileError,
    },
    FolderChanged(FolderChange),
    TreeRendered {
        generation: u64,
        result: Result<DirListing, FileError>,
    },
    DirLoaded {
        generation: u64,
        path: PathBuf,
        result: Result<Vec<DirEntry>, FileError>,
    },
    GitStatus {
        generation: u64,
        statuses: Vec<(PathBuf, GitStatusKind)>,
    },
    SessionRestored {
        documents: Vec<RestoredDocument>,
        active_path: Option<PathBuf>,
    },
}

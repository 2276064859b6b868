use crate::kernel::documents::{DocumentId, SaveRequest};
use crate::kernel::git::GitStatusKind;
use crate::kernel::services::adapters::file_watcher::FolderChange;
use crate::kernel::services::ports::{DirEntry, FileError};
use crate::kernel::session::{RestoredDocument, SessionSnapshot};
use rustc_hash::FxHashMap;
use std::path::PathBuf;

pub type DirListing = FxHashMap<PathBuf, Vec<DirEntry>>;

#[derive(Debug, Clone)]
pub enum Action {
    Tick,
    ClearError,

    // documents
    NewDocument,
    OpenFile(PathBuf),
    OpenFileDialog,
    FileLoaded {
        path: PathBuf,
        content: String,
    },
    FileLoadFailed {
        path: PathBuf,
        error: FileError,
    },
    Activate(DocumentId),
    Edit {
        id: DocumentId,
        content: String,
    },
    MarkModified(DocumentId),
    Close(DocumentId),
    Save(DocumentId),
    SaveAs(DocumentId),
    SavePathChosen {
        id: DocumentId,
        path: PathBuf,
    },
    SaveAll,
    SaveCompleted {
        request: SaveRequest,
        result: Result<(), FileError>,
    },
    DialogCancelled,

    // folder + tree
    OpenFolder(PathBuf),
    OpenFolderDialog,
    FolderOpened {
        request: u64,
        root: PathBuf,
    },
    FolderOpenFailed {
        request: u64,
        path: PathBuf,
        error: FileError,
    },
    CloseFolder,
    FolderChanged(FolderChange),
    RefreshTree,
    TreeRendered {
        generation: u64,
        result: Result<DirListing, FileError>,
    },
    ToggleDirectory(PathBuf),
    DirLoaded {
        generation: u64,
        path: PathBuf,
        result: Result<Vec<DirEntry>, FileError>,
    },
    GitStatusLoaded {
        generation: u64,
        statuses: Vec<(PathBuf, GitStatusKind)>,
    },

    // session
    RestoreSession(SessionSnapshot),
    SessionRestored {
        documents: Vec<RestoredDocument>,
        active_path: Option<PathBuf>,
    },
    PersistSession,
}

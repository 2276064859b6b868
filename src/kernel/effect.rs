use crate::kernel::documents::{DocumentId, SaveRequest};
use crate::kernel::explorer::RenderRequest;
use crate::kernel::session::SessionSnapshot;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadFile(PathBuf),
    WriteFile(SaveRequest),
    ChooseSavePath {
        id: DocumentId,
        suggested_name: String,
        directory: Option<PathBuf>,
    },
    ChooseOpenFile {
        directory: Option<PathBuf>,
    },
    ChooseOpenFolder,
    OpenFolder {
        request: u64,
        path: PathBuf,
    },
    CloseFolder,
    RenderTree(RenderRequest),
    LoadDir {
        generation: u64,
        path: PathBuf,
    },
    RefreshGit {
        generation: u64,
        root: PathBuf,
    },
    RestoreSession {
        request: u64,
        snapshot: SessionSnapshot,
    },
    PersistSession(SessionSnapshot),
}

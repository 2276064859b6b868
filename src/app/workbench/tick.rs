use super::Workbench;
use crate::kernel::services::adapters::AppMessage;
use crate::kernel::Action as KernelAction;
use std::sync::mpsc;

impl Workbench {
    /// 轮询运行时消息（由主循环调用）
    pub fn tick(&mut self) -> bool {
        let mut changed = self.poll_runtime();
        changed |= self.dispatch(KernelAction::Tick);
        changed
    }

    fn poll_runtime(&mut self) -> bool {
        let mut changed = false;
        let mut drained = 0usize;
        while drained < super::MAX_MESSAGES_PER_TICK {
            match self.rx.try_recv() {
                Ok(msg) => {
                    drained += 1;
                    changed |= self.handle_message(msg);
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => break,
            }
        }
        changed
    }

    pub fn handle_message(&mut self, msg: AppMessage) -> bool {
        let action = match msg {
            AppMessage::FileLoaded { path, content } => KernelAction::FileLoaded { path, content },
            AppMessage::FileLoadFailed { path, error } => {
                tracing::error!(path = %path.display(), error = %error, "load_file failed");
                KernelAction::FileLoadFailed { path, error }
            }
            AppMessage::FileSaved { request, result } => {
                KernelAction::SaveCompleted { request, result }
            }
            AppMessage::SavePathChosen { id, path } => KernelAction::SavePathChosen { id, path },
            AppMessage::OpenFileChosen(path) => KernelAction::OpenFile(path),
            AppMessage::OpenFolderChosen(path) => KernelAction::OpenFolder(path),
            AppMessage::DialogCancelled => KernelAction::DialogCancelled,
            AppMessage::FolderOpened { request, root } => {
                KernelAction::FolderOpened { request, root }
            }
            AppMessage::FolderOpenFailed {
                request,
                path,
                error,
            } => {
                tracing::error!(path = %path.display(), error = %error, "open_folder failed");
                KernelAction::FolderOpenFailed {
                    request,
                    path,
                    error,
                }
            }
            AppMessage::FolderChanged(change) => KernelAction::FolderChanged(change),
            AppMessage::TreeRendered { generation, result } => {
                KernelAction::TreeRendered { generation, result }
            }
            AppMessage::DirLoaded {
                generation,
                path,
                result,
            } => KernelAction::DirLoaded {
                generation,
                path,
                result,
            },
            AppMessage::GitStatus {
                generation,
                statuses,
            } => KernelAction::GitStatusLoaded {
                generation,
                statuses,
            },
            AppMessage::SessionRestored {
                documents,
                active_path,
            } => KernelAction::SessionRestored {
                documents,
                active_path,
            },
        };
        self.dispatch(action)
    }
}

//! 应用层：共享文件代理，按窗口创建工作台

mod workbench;

pub use workbench::{CloseDecision, Workbench, CLOSE_OPTIONS};

use crate::kernel::services::adapters::{FileBroker, SessionStore, WatchConfig};
use crate::kernel::services::ports::{DialogProvider, Settings, WindowKind};
use std::sync::Arc;

/// One per process. Every window shares the broker; only the first window
/// owns the persisted session.
pub struct Application {
    broker: Arc<FileBroker>,
    dialogs: Arc<dyn DialogProvider>,
    settings: Settings,
    session_store: Option<SessionStore>,
    windows_opened: usize,
}

impl Application {
    pub fn new(
        settings: Settings,
        dialogs: Arc<dyn DialogProvider>,
        session_store: Option<SessionStore>,
    ) -> Self {
        let broker = Arc::new(FileBroker::new(WatchConfig::from_settings(&settings.watcher)));
        Self {
            broker,
            dialogs,
            settings,
            session_store,
            windows_opened: 0,
        }
    }

    pub fn broker(&self) -> &Arc<FileBroker> {
        &self.broker
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session_store(&self) -> Option<&SessionStore> {
        self.session_store.as_ref()
    }

    /// The first window is primary, every later one secondary.
    pub fn open_window(&mut self) -> std::io::Result<Workbench> {
        let kind = if self.windows_opened == 0 {
            WindowKind::Primary
        } else {
            WindowKind::Secondary
        };
        let workbench = Workbench::new(
            kind,
            Arc::clone(&self.broker),
            Arc::clone(&self.dialogs),
            self.settings.clone(),
            self.session_store.clone(),
        )?;
        self.windows_opened += 1;
        Ok(workbench)
    }
}

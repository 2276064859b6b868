//folio/src/main.rs
use folio::app::{Application, CloseDecision};
use folio::kernel::services::adapters::{ensure_settings_file, load_settings, SessionStore};
use folio::kernel::services::ports::HeadlessDialogs;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

mod logging;

const TICK_INTERVAL: Duration = Duration::from_millis(16);
const RESTORE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TerminationSignal {
    SigInt,
    SigTerm,
}

#[cfg(unix)]
fn install_termination_signals(
    tx: mpsc::Sender<TerminationSignal>,
) -> io::Result<std::thread::JoinHandle<()>> {
    use signal_hook::consts::signal::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    Ok(std::thread::spawn(move || {
        for sig in signals.forever() {
            let signal = match sig {
                SIGINT => TerminationSignal::SigInt,
                SIGTERM => TerminationSignal::SigTerm,
                _ => continue,
            };
            if tx.send(signal).is_err() {
                break;
            }
        }
    }))
}

#[cfg(not(unix))]
fn install_termination_signals(
    tx: mpsc::Sender<TerminationSignal>,
) -> io::Result<std::thread::JoinHandle<()>> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use std::sync::atomic::{AtomicBool, Ordering};

    let interrupted = Arc::new(AtomicBool::new(false));
    let terminated = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGINT, Arc::clone(&interrupted))?;
    signal_hook::flag::register(SIGTERM, Arc::clone(&terminated))?;
    Ok(std::thread::spawn(move || loop {
        let signal = if interrupted.swap(false, Ordering::SeqCst) {
            Some(TerminationSignal::SigInt)
        } else if terminated.swap(false, Ordering::SeqCst) {
            Some(TerminationSignal::SigTerm)
        } else {
            None
        };
        if let Some(signal) = signal {
            if tx.send(signal).is_err() {
                break;
            }
        }
        std::thread::sleep(Duration::from_millis(50));
    }))
}

fn main() -> io::Result<()> {
    let _logging = logging::init();
    let folder = std::env::args_os().nth(1).map(PathBuf::from);

    if let Err(e) = ensure_settings_file() {
        tracing::warn!(error = %e, "settings file unavailable, using defaults");
    }
    let settings = load_settings();

    let session_store = match SessionStore::default_location() {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::warn!(error = %e, "session persistence disabled");
            None
        }
    };
    let bounds = session_store
        .as_ref()
        .map(|store| store.load_bounds())
        .unwrap_or_default();
    tracing::info!(
        width = bounds.width,
        height = bounds.height,
        x = ?bounds.x,
        y = ?bounds.y,
        "window bounds"
    );

    let (signal_tx, signal_rx) = mpsc::channel();
    let _signals = install_termination_signals(signal_tx)?;

    let mut app = Application::new(settings, Arc::new(HeadlessDialogs), session_store);
    let mut workbench = app.open_window()?;
    let restoring = workbench.restore_session();
    if let Some(folder) = folder {
        // 命令行指定的目录在会话恢复之后打开，以它为准
        if restoring && !workbench.wait_until(RESTORE_TIMEOUT, |s| !s.restoring) {
            tracing::warn!("session restore still running, opening folder anyway");
        }
        workbench.open_folder(folder);
    }

    // 第二次信号不再询问，直接关闭
    let mut force_close = false;
    loop {
        workbench.tick();
        match signal_rx.recv_timeout(TICK_INTERVAL) {
            Ok(signal) => {
                tracing::info!(signal = ?signal, "termination requested");
                if force_close || workbench.request_close() == CloseDecision::Close {
                    break;
                }
                force_close = true;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    workbench.shutdown();
    if let Some(store) = app.session_store() {
        if let Err(e) = store.save_bounds(&bounds) {
            tracing::warn!(error = %e, "failed to save window bounds");
        }
    }
    tracing::info!("exit");
    Ok(())
}

use super::Workbench;

pub const CLOSE_OPTIONS: [&str; 3] = ["Save All", "Don't Save", "Cancel"];

const SAVE_ALL: usize = 0;
const DISCARD: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    Close,
    Cancel,
}

impl Workbench {
    /// Asks about unsaved documents before the window goes away. An
    /// unanswered prompt counts as nothing to save.
    pub fn request_close(&mut self) -> CloseDecision {
        self.store.sync_editor();
        let dirty = self.store.state().documents.dirty_count();
        if dirty == 0 {
            return CloseDecision::Close;
        }

        let message = if dirty == 1 {
            "1 document has unsaved changes. Save before closing?".to_string()
        } else {
            format!("{dirty} documents have unsaved changes. Save before closing?")
        };
        let response = self.runtime.confirm(
            message,
            &CLOSE_OPTIONS,
            self.settings.close.response_timeout(),
        );

        match response {
            None => {
                tracing::warn!(window = %self.window(), "close prompt timed out, closing");
                CloseDecision::Close
            }
            Some(Some(SAVE_ALL)) => {
                self.save_all();
                let timeout = self.settings.close.save_all_timeout();
                if !self.wait_until(timeout, |state| state.saves_in_flight == 0) {
                    tracing::warn!(
                        window = %self.window(),
                        timeout_ms = timeout.as_millis() as u64,
                        "save all did not finish before close"
                    );
                }
                CloseDecision::Close
            }
            Some(Some(DISCARD)) => CloseDecision::Close,
            Some(_) => CloseDecision::Cancel,
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/app/workbench/close.rs"]
mod tests;

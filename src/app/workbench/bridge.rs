use super::Workbench;
use crate::kernel::{Action as KernelAction, Effect as KernelEffect};

impl Workbench {
    pub fn dispatch(&mut self, action: KernelAction) -> bool {
        let result = self.store.dispatch(action);
        for effect in result.effects {
            self.run_effect(effect);
        }
        result.state_changed
    }

    fn run_effect(&mut self, effect: KernelEffect) {
        match effect {
            KernelEffect::LoadFile(path) => self.runtime.load_file(path),
            KernelEffect::WriteFile(request) => self.runtime.write_file(request),
            KernelEffect::ChooseSavePath {
                id,
                suggested_name,
                directory,
            } => self.runtime.choose_save_path(id, suggested_name, directory),
            KernelEffect::ChooseOpenFile { directory } => self.runtime.choose_open_file(directory),
            KernelEffect::ChooseOpenFolder => self.runtime.choose_open_folder(),
            KernelEffect::OpenFolder { request, path } => self.runtime.open_folder(request, path),
            KernelEffect::CloseFolder => self.runtime.close_folder(),
            KernelEffect::RenderTree(request) => self.runtime.render_tree(request),
            KernelEffect::LoadDir { generation, path } => self.runtime.load_dir(generation, path),
            KernelEffect::RefreshGit { generation, root } => {
                self.runtime.refresh_git(generation, root)
            }
            KernelEffect::RestoreSession { request, snapshot } => {
                self.runtime.restore_session(request, snapshot)
            }
            KernelEffect::PersistSession(snapshot) => self.runtime.persist_session(snapshot),
        }
    }
}

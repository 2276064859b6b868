use super::*;
use crate::kernel::documents::SaveRequest;
use crate::kernel::explorer::Decoration;
use crate::kernel::git::GitStatusKind;
use crate::kernel::services::adapters::RopeEngine;
use crate::kernel::services::ports::{DirEntry, FileError, WindowId, WindowKind};
use crate::kernel::session::RestoredDocument;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

fn new_store(kind: WindowKind) -> Store {
    Store::new(
        AppState::new(WindowId::next(), kind),
        Box::new(RopeEngine::new()),
    )
}

fn open_file(store: &mut Store, path: &str, content: &str) -> crate::kernel::DocumentId {
    store.dispatch(Action::FileLoaded {
        path: PathBuf::from(path),
        content: content.to_string(),
    });
    store.state().documents.active().unwrap()
}

fn write_requests(result: &DispatchResult) -> Vec<SaveRequest> {
    result
        .effects
        .iter()
        .filter_map(|e| match e {
            Effect::WriteFile(request) => Some(request.clone()),
            _ => None,
        })
        .collect()
}

fn has_persist(result: &DispatchResult) -> bool {
    result
        .effects
        .iter()
        .any(|e| matches!(e, Effect::PersistSession(_)))
}

fn folder_opened(store: &mut Store, request: u64, root: &str) -> DispatchResult {
    store.dispatch(Action::FolderOpened {
        request,
        root: PathBuf::from(root),
    })
}

fn open_folder(store: &mut Store, root: &str) -> DispatchResult {
    store.dispatch(Action::OpenFolder(PathBuf::from(root)));
    let request = store.state().folder_request;
    folder_opened(store, request, root)
}

fn finish_render(store: &mut Store, root: &str, entries: Vec<DirEntry>) {
    let generation = store.state().explorer.generation();
    let mut listing = FxHashMap::default();
    listing.insert(PathBuf::from(root), entries);
    store.dispatch(Action::TreeRendered {
        generation,
        result: Ok(listing),
    });
}

#[test]
fn open_file_dedupes_without_io() {
    let mut store = new_store(WindowKind::Primary);
    let a = open_file(&mut store, "/w/a.rs", "a");
    open_file(&mut store, "/w/b.rs", "b");

    let result = store.dispatch(Action::OpenFile(PathBuf::from("/w/a.rs")));
    assert!(result.effects.is_empty());
    assert_eq!(store.state().documents.active(), Some(a));

    let result = store.dispatch(Action::OpenFile(PathBuf::from("/w/c.rs")));
    assert_eq!(result.effects, vec![Effect::LoadFile(PathBuf::from("/w/c.rs"))]);
}

#[test]
fn structural_changes_persist_the_session() {
    let mut store = new_store(WindowKind::Primary);
    let result = store.dispatch(Action::NewDocument);
    assert!(has_persist(&result));

    let id = store.state().documents.active().unwrap();
    let result = store.dispatch(Action::Edit {
        id,
        content: "x".to_string(),
    });
    assert!(!has_persist(&result));

    let result = store.dispatch(Action::Close(id));
    assert!(has_persist(&result));
}

#[test]
fn secondary_window_never_persists_or_restores() {
    let mut store = new_store(WindowKind::Secondary);
    let result = store.dispatch(Action::NewDocument);
    assert!(!has_persist(&result));

    let snapshot = SessionSnapshot {
        open_folder: Some(PathBuf::from("/w")),
        ..Default::default()
    };
    let result = store.dispatch(Action::RestoreSession(snapshot));
    assert!(result.effects.is_empty());
    assert!(!store.state().restoring);
}

#[test]
fn save_without_path_asks_for_one() {
    let mut store = new_store(WindowKind::Primary);
    open_folder(&mut store, "/w");
    store.dispatch(Action::NewDocument);
    let id = store.state().documents.active().unwrap();

    let result = store.dispatch(Action::Save(id));
    assert_eq!(
        result.effects,
        vec![Effect::ChooseSavePath {
            id,
            suggested_name: "Untitled-1".to_string(),
            directory: Some(PathBuf::from("/w")),
        }]
    );
    assert_eq!(store.state().saves_in_flight, 0);
}

#[test]
fn save_cycle_clears_dirty_and_unsaved_decoration() {
    let mut store = new_store(WindowKind::Primary);
    open_folder(&mut store, "/w");
    finish_render(&mut store, "/w", vec![DirEntry::new(PathBuf::from("/w/a.rs"), false)]);
    let id = open_file(&mut store, "/w/a.rs", "v1");

    store.dispatch(Action::Edit {
        id,
        content: "v2".to_string(),
    });
    assert_eq!(
        store.state().explorer.row(Path::new("/w/a.rs")).unwrap().decoration,
        Some(Decoration::Unsaved)
    );

    let result = store.dispatch(Action::Save(id));
    let requests = write_requests(&result);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].content, "v2");
    assert_eq!(store.state().saves_in_flight, 1);

    store.dispatch(Action::SaveCompleted {
        request: requests[0].clone(),
        result: Ok(()),
    });
    assert_eq!(store.state().saves_in_flight, 0);
    assert!(!store.state().documents.get(id).unwrap().is_dirty());
    assert_eq!(
        store.state().explorer.row(Path::new("/w/a.rs")).unwrap().decoration,
        None
    );
}

#[test]
fn failed_write_keeps_dirty_and_reports() {
    let mut store = new_store(WindowKind::Primary);
    let id = open_file(&mut store, "/w/a.rs", "v1");
    store.dispatch(Action::MarkModified(id));

    let requests = write_requests(&store.dispatch(Action::Save(id)));
    store.dispatch(Action::SaveCompleted {
        request: requests[0].clone(),
        result: Err(FileError::Io {
            path: PathBuf::from("/w/a.rs"),
            message: "disk full".to_string(),
        }),
    });

    assert!(store.state().documents.get(id).unwrap().is_dirty());
    assert!(store.state().last_error.as_deref().unwrap().contains("disk full"));
    assert_eq!(store.state().saves_in_flight, 0);
}

#[test]
fn save_all_writes_each_dirty_document_independently() {
    let mut store = new_store(WindowKind::Primary);
    let a = open_file(&mut store, "/w/a.rs", "a");
    let b = open_file(&mut store, "/w/b.rs", "b");
    let _c = open_file(&mut store, "/w/c.rs", "c");
    store.dispatch(Action::NewDocument);
    store.dispatch(Action::Edit { id: a, content: "a2".into() });
    store.dispatch(Action::Edit { id: b, content: "b2".into() });

    let result = store.dispatch(Action::SaveAll);
    let requests = write_requests(&result);
    assert_eq!(requests.iter().map(|r| r.id).collect::<Vec<_>>(), vec![a, b]);
    assert_eq!(store.state().saves_in_flight, 2);

    store.dispatch(Action::SaveCompleted {
        request: requests[0].clone(),
        result: Err(FileError::AccessDenied(PathBuf::from("/w/a.rs"))),
    });
    store.dispatch(Action::SaveCompleted {
        request: requests[1].clone(),
        result: Ok(()),
    });

    assert!(store.state().documents.get(a).unwrap().is_dirty());
    assert!(!store.state().documents.get(b).unwrap().is_dirty());
    assert_eq!(store.state().saves_in_flight, 0);
}

#[test]
fn save_as_renames_then_writes() {
    let mut store = new_store(WindowKind::Primary);
    store.dispatch(Action::NewDocument);
    let id = store.state().documents.active().unwrap();
    store.dispatch(Action::Edit { id, content: "draft".into() });

    let result = store.dispatch(Action::SaveAs(id));
    assert!(matches!(result.effects.as_slice(), [Effect::ChooseSavePath { .. }]));

    let result = store.dispatch(Action::SavePathChosen {
        id,
        path: PathBuf::from("/tmp/notes.md"),
    });
    let requests = write_requests(&result);
    assert_eq!(requests[0].path, PathBuf::from("/tmp/notes.md"));
    assert_eq!(requests[0].content, "draft");
    assert_eq!(store.state().documents.get(id).unwrap().name(), "notes.md");
}

#[test]
fn save_as_onto_an_open_path_replaces_that_tab() {
    let mut store = new_store(WindowKind::Primary);
    let existing = open_file(&mut store, "/p/a.txt", "old");
    store.dispatch(Action::NewDocument);
    let id = store.state().documents.active().unwrap();
    store.dispatch(Action::Edit {
        id,
        content: "new".to_string(),
    });

    let result = store.dispatch(Action::SavePathChosen {
        id,
        path: PathBuf::from("/p/a.txt"),
    });
    let requests = write_requests(&result);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].id, id);
    assert_eq!(requests[0].content, "new");

    let documents = &store.state().documents;
    assert!(documents.get(existing).is_none());
    assert_eq!(documents.len(), 1);
    assert_eq!(documents.find_by_path(Path::new("/p/a.txt")), Some(id));
    assert_eq!(documents.active(), Some(id));
    assert_eq!(
        documents
            .iter()
            .filter(|doc| doc.path() == Some(Path::new("/p/a.txt")))
            .count(),
        1
    );
}

#[test]
fn dialog_cancel_surfaces_cancelled() {
    let mut store = new_store(WindowKind::Primary);
    store.dispatch(Action::DialogCancelled);
    assert_eq!(store.state().last_error.as_deref(), Some("Cancelled"));
    assert!(store.dispatch(Action::ClearError).state_changed);
    assert_eq!(store.state().last_error, None);
}

#[test]
fn opening_a_folder_closes_foreign_tabs_and_renders() {
    let mut store = new_store(WindowKind::Primary);
    open_folder(&mut store, "/a");
    open_file(&mut store, "/a/x.rs", "");
    store.dispatch(Action::NewDocument);
    let keep = open_file(&mut store, "/b/y.rs", "");

    let result = open_folder(&mut store, "/b");
    assert_eq!(store.state().documents.len(), 1);
    assert_eq!(store.state().documents.active(), Some(keep));
    assert_eq!(store.state().folder.as_deref(), Some(Path::new("/b")));

    let generation = store.state().explorer.generation();
    assert!(result.effects.iter().any(|e| matches!(
        e,
        Effect::RenderTree(request) if request.root == Path::new("/b") && request.generation == generation
    )));
    assert!(result
        .effects
        .iter()
        .any(|e| matches!(e, Effect::RefreshGit { root, .. } if root == Path::new("/b"))));
    assert!(has_persist(&result));
}

#[test]
fn superseded_folder_open_result_is_dropped() {
    let mut store = new_store(WindowKind::Primary);
    let result = store.dispatch(Action::OpenFolder(PathBuf::from("/a")));
    let Some(Effect::OpenFolder { request: first, .. }) = result.effects.first().cloned() else {
        panic!("expected an open request, got {:?}", result.effects);
    };
    let result = store.dispatch(Action::OpenFolder(PathBuf::from("/b")));
    let Some(Effect::OpenFolder { request: second, path }) = result.effects.first().cloned() else {
        panic!("expected an open request, got {:?}", result.effects);
    };
    assert_eq!(path, PathBuf::from("/b"));
    assert!(second > first);

    folder_opened(&mut store, second, "/b");
    let keep = open_file(&mut store, "/b/y.rs", "");

    let result = folder_opened(&mut store, first, "/a");
    assert!(result.effects.is_empty());
    assert!(!result.state_changed);
    assert_eq!(store.state().folder.as_deref(), Some(Path::new("/b")));
    assert_eq!(store.state().explorer.root(), Some(Path::new("/b")));
    assert_eq!(store.state().documents.active(), Some(keep));

    let result = store.dispatch(Action::FolderOpenFailed {
        request: first,
        path: PathBuf::from("/a"),
        error: FileError::NotFound(PathBuf::from("/a")),
    });
    assert!(!result.state_changed);
    assert_eq!(store.state().last_error, None);
}

#[test]
fn close_folder_supersedes_an_open_in_flight() {
    let mut store = new_store(WindowKind::Primary);
    store.dispatch(Action::OpenFolder(PathBuf::from("/a")));
    let pending = store.state().folder_request;
    store.dispatch(Action::CloseFolder);

    folder_opened(&mut store, pending, "/a");
    assert_eq!(store.state().folder, None);
}

#[test]
fn watcher_bursts_coalesce_into_one_follow_up_render() {
    let mut store = new_store(WindowKind::Primary);
    open_folder(&mut store, "/w");
    let change = crate::kernel::services::adapters::FolderChange {
        kind: crate::kernel::services::adapters::ChangeKind::Modified,
        filename: Some(PathBuf::from("a.rs")),
    };

    let mut renders = 0;
    for _ in 0..4 {
        let result = store.dispatch(Action::FolderChanged(change.clone()));
        renders += result
            .effects
            .iter()
            .filter(|e| matches!(e, Effect::RenderTree(_)))
            .count();
    }
    assert_eq!(renders, 0);

    let generation = store.state().explorer.generation();
    let result = store.dispatch(Action::TreeRendered {
        generation,
        result: Ok(FxHashMap::default()),
    });
    let follow_ups = result
        .effects
        .iter()
        .filter(|e| matches!(e, Effect::RenderTree(_)))
        .count();
    assert_eq!(follow_ups, 1);
}

#[test]
fn folder_change_without_folder_is_ignored() {
    let mut store = new_store(WindowKind::Primary);
    let change = crate::kernel::services::adapters::FolderChange {
        kind: crate::kernel::services::adapters::ChangeKind::Created,
        filename: None,
    };
    assert!(store.dispatch(Action::FolderChanged(change)).effects.is_empty());
}

#[test]
fn toggle_loads_once_and_collapse_restores_expanded_set() {
    let mut store = new_store(WindowKind::Primary);
    open_folder(&mut store, "/w");
    finish_render(&mut store, "/w", vec![DirEntry::new(PathBuf::from("/w/src"), true)]);

    let result = store.dispatch(Action::ToggleDirectory(PathBuf::from("/w/src")));
    let generation = store.state().explorer.generation();
    assert_eq!(
        result.effects,
        vec![Effect::LoadDir {
            generation,
            path: PathBuf::from("/w/src"),
        }]
    );
    store.dispatch(Action::DirLoaded {
        generation,
        path: PathBuf::from("/w/src"),
        result: Ok(vec![DirEntry::new(PathBuf::from("/w/src/lib.rs"), false)]),
    });
    assert_eq!(store.state().explorer.rows().len(), 2);

    store.dispatch(Action::ToggleDirectory(PathBuf::from("/w/src")));
    assert!(store.state().explorer.expanded().is_empty());
    assert_eq!(store.state().explorer.rows().len(), 1);
}

#[test]
fn git_overlay_decorates_rows_for_current_folder_only() {
    let mut store = new_store(WindowKind::Primary);
    open_folder(&mut store, "/w");
    finish_render(
        &mut store,
        "/w",
        vec![
            DirEntry::new(PathBuf::from("/w/src"), true),
            DirEntry::new(PathBuf::from("/w/a.rs"), false),
        ],
    );
    let stale = store.state().explorer.generation() - 1;
    let statuses = vec![(PathBuf::from("/w/src/lib.rs"), GitStatusKind::Added)];

    let result = store.dispatch(Action::GitStatusLoaded {
        generation: stale,
        statuses: statuses.clone(),
    });
    assert!(!result.state_changed);

    let generation = store.state().explorer.generation();
    store.dispatch(Action::GitStatusLoaded {
        generation,
        statuses,
    });
    assert_eq!(
        store.state().explorer.row(Path::new("/w/src")).unwrap().decoration,
        Some(Decoration::Git(GitStatusKind::Modified))
    );
    assert_eq!(
        store.state().explorer.row(Path::new("/w/a.rs")).unwrap().decoration,
        None
    );
}

#[test]
fn restore_recreates_tabs_in_order_and_reactivates_by_path() {
    let mut store = new_store(WindowKind::Primary);
    let snapshot = SessionSnapshot {
        open_folder: Some(PathBuf::from("/w")),
        tabs: Vec::new(),
        active_tab_path: Some(PathBuf::from("/w/a.rs")),
    };
    let result = store.dispatch(Action::RestoreSession(snapshot.clone()));
    let request = store.state().folder_request;
    assert_eq!(result.effects, vec![Effect::RestoreSession { request, snapshot }]);
    assert!(store.state().restoring);

    let result = folder_opened(&mut store, request, "/w");
    assert!(result.state_changed);
    assert!(!has_persist(&result));

    let result = store.dispatch(Action::SessionRestored {
        documents: vec![
            RestoredDocument {
                path: Some(PathBuf::from("/w/a.rs")),
                name: "a.rs".to_string(),
                content: "disk a".to_string(),
            },
            RestoredDocument {
                path: None,
                name: "Untitled-3".to_string(),
                content: "scratch".to_string(),
            },
        ],
        active_path: Some(PathBuf::from("/w/a.rs")),
    });
    assert!(!store.state().restoring);
    assert!(has_persist(&result));

    let snapshot = store.snapshot();
    assert_eq!(snapshot.open_folder, Some(PathBuf::from("/w")));
    assert_eq!(snapshot.active_tab_path, Some(PathBuf::from("/w/a.rs")));
    assert_eq!(snapshot.tabs.len(), 2);
    assert_eq!(snapshot.tabs[1].path, None);
    assert_eq!(snapshot.tabs[1].content, "scratch");
    assert_eq!(snapshot.tabs[1].name, "Untitled-3");
}

#[test]
fn snapshot_captures_live_editor_text() {
    let mut store = new_store(WindowKind::Primary);
    let id = open_file(&mut store, "/w/a.rs", "old");
    let model = store.state().documents.get(id).unwrap().model();
    store.engine_mut().set_value(model, "typed");

    let snapshot = store.snapshot();
    assert_eq!(snapshot.tabs[0].content, "typed");
    assert!(store.state().documents.get(id).unwrap().is_dirty());
}

#[test]
fn close_folder_keeps_tabs_and_stops_watch() {
    let mut store = new_store(WindowKind::Primary);
    open_folder(&mut store, "/w");
    open_file(&mut store, "/w/a.rs", "");

    let result = store.dispatch(Action::CloseFolder);
    assert!(result.effects.contains(&Effect::CloseFolder));
    assert_eq!(store.state().folder, None);
    assert_eq!(store.state().documents.len(), 1);
    assert!(store.dispatch(Action::CloseFolder).effects.is_empty());
}

use super::*;

#[test]
fn ancestors_are_marked_modified_up_to_root() {
    let root = PathBuf::from("/proj");
    let overlay = GitOverlay::from_statuses(
        &root,
        vec![(root.join("src/kernel/mod.rs"), GitStatusKind::Added)],
    );

    assert_eq!(overlay.get(&root.join("src/kernel/mod.rs")), Some(GitStatusKind::Added));
    assert_eq!(overlay.get(&root.join("src/kernel")), Some(GitStatusKind::Modified));
    assert_eq!(overlay.get(&root.join("src")), Some(GitStatusKind::Modified));
    assert_eq!(overlay.get(&root), None);
    assert_eq!(overlay.len(), 3);
}

#[test]
fn explicit_directory_status_is_not_overwritten() {
    let root = PathBuf::from("/proj");
    let overlay = GitOverlay::from_statuses(
        &root,
        vec![
            (root.join("docs/guide.md"), GitStatusKind::Modified),
            (root.join("docs"), GitStatusKind::Renamed),
        ],
    );
    assert_eq!(overlay.get(&root.join("docs")), Some(GitStatusKind::Renamed));
}

#[test]
fn paths_outside_root_get_no_ancestors() {
    let root = PathBuf::from("/proj/app");
    let overlay = GitOverlay::from_statuses(
        &root,
        vec![(PathBuf::from("/proj/other/file.rs"), GitStatusKind::Deleted)],
    );
    assert_eq!(overlay.len(), 1);
    assert_eq!(overlay.get(Path::new("/proj/other")), None);
}

#[test]
fn class_names_follow_the_status() {
    assert_eq!(GitStatusKind::Modified.class_name(), "git-modified");
    assert_eq!(GitStatusKind::Renamed.class_name(), "git-renamed");
}

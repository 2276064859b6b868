use super::*;

#[test]
fn parses_porcelain_z_statuses() {
    let root = Path::new("/repo");
    let data = b" M src/main.rs\0A  src/new.rs\0?? notes.txt\0 D old.rs\0R  lib/b.rs\0lib/a.rs\0UU conflict.rs\0";

    let statuses = parse_status_porcelain_z(data, root);
    assert_eq!(
        statuses,
        vec![
            (root.join("src/main.rs"), GitStatusKind::Modified),
            (root.join("src/new.rs"), GitStatusKind::Added),
            (root.join("notes.txt"), GitStatusKind::Added),
            (root.join("old.rs"), GitStatusKind::Deleted),
            (root.join("lib/b.rs"), GitStatusKind::Renamed),
            (root.join("conflict.rs"), GitStatusKind::Changed),
        ]
    );
}

#[test]
fn skips_ignored_and_malformed_entries() {
    let root = Path::new("/repo");
    let data = b"!! target/\0XY\0MM both.rs\0";

    let statuses = parse_status_porcelain_z(data, root);
    assert_eq!(statuses, vec![(root.join("both.rs"), GitStatusKind::Modified)]);
}

#[tokio::test]
async fn folder_outside_repository_has_no_statuses() {
    let dir = tempfile::tempdir().unwrap();
    match git_status(dir.path()).await {
        Ok(statuses) => assert!(statuses.is_empty()),
        // git missing from PATH
        Err(_) => {}
    }
}

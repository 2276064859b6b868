use super::*;
use crate::kernel::session::SessionTab;
use tempfile::tempdir;

#[test]
fn test_get_log_dir() {
    let dir = get_log_dir();
    assert!(dir.is_some());
    let dir = dir.unwrap();
    assert!(dir.to_string_lossy().contains(APP_NAME));
    assert!(dir.to_string_lossy().contains(LOG_DIR));
}

#[test]
fn absent_records_fall_back_to_defaults() {
    let dir = tempdir().unwrap();
    let store = SessionStore::new(dir.path());

    assert_eq!(store.load(), SessionSnapshot::default());
    assert_eq!(store.load_bounds(), WindowBounds::default());
}

#[test]
fn malformed_records_are_treated_as_absent() {
    let dir = tempdir().unwrap();
    let store = SessionStore::new(dir.path());
    std::fs::write(store.session_path(), "[1, 2").unwrap();
    std::fs::write(store.bounds_path(), r#"{"width":"wide"}"#).unwrap();

    assert_eq!(store.load(), SessionSnapshot::default());
    assert_eq!(store.load_bounds(), WindowBounds::default());
}

#[test]
fn session_record_uses_camel_case_keys() {
    let dir = tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("state"));
    let snapshot = SessionSnapshot {
        open_folder: Some(PathBuf::from("/work/proj")),
        tabs: vec![
            SessionTab {
                path: Some(PathBuf::from("/work/proj/a.rs")),
                content: "fn a() {}".to_string(),
                name: "a.rs".to_string(),
            },
            SessionTab {
                path: None,
                content: "scratch".to_string(),
                name: "Untitled-1".to_string(),
            },
        ],
        active_tab_path: Some(PathBuf::from("/work/proj/a.rs")),
    };

    store.save(&snapshot).unwrap();
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.session_path()).unwrap()).unwrap();
    assert_eq!(raw["openFolder"], "/work/proj");
    assert_eq!(raw["activeTabPath"], "/work/proj/a.rs");
    assert!(raw["tabs"][1]["path"].is_null());
    assert_eq!(raw["tabs"][1]["content"], "scratch");

    assert_eq!(store.load(), snapshot);
    assert!(!store.dir().join("session.json.tmp").exists());
}

#[test]
fn bounds_record_keeps_position() {
    let dir = tempdir().unwrap();
    let store = SessionStore::new(dir.path());
    let bounds = WindowBounds {
        width: 900,
        height: 600,
        x: Some(-20),
        y: Some(40),
    };

    store.save_bounds(&bounds).unwrap();
    assert_eq!(store.load_bounds(), bounds);

    std::fs::write(store.bounds_path(), r#"{"width":640,"height":480}"#).unwrap();
    assert_eq!(
        store.load_bounds(),
        WindowBounds {
            width: 640,
            height: 480,
            x: None,
            y: None
        }
    );
}

use super::*;
use notify::event::{CreateKind, DataChange, RemoveKind, RenameMode};

type Delivered = Arc<Mutex<Vec<(Instant, FolderChange)>>>;

fn recording_sink() -> (ChangeSink, Delivered) {
    let delivered: Delivered = Arc::new(Mutex::new(Vec::new()));
    let target = Arc::clone(&delivered);
    let sink: ChangeSink = Arc::new(move |change| {
        target.lock().unwrap().push((Instant::now(), change));
    });
    (sink, delivered)
}

fn change(name: &str) -> WatchSignal {
    WatchSignal::Change(FolderChange {
        kind: ChangeKind::Modified,
        filename: Some(PathBuf::from(name)),
    })
}

fn event(kind: EventKind, paths: Vec<PathBuf>) -> notify::Event {
    notify::Event {
        kind,
        paths,
        attrs: Default::default(),
    }
}

#[test]
fn classify_drops_dotfiles_and_ignored_segments() {
    let root = PathBuf::from("/proj");
    let ignore = IgnoreRules::default();
    let signals = classify_event(
        event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            vec![
                root.join(".git/index"),
                root.join("web/node_modules/react/index.js"),
                root.join("pkg/__pycache__/m.pyc"),
                root.join(".env"),
                root.join("src/main.rs"),
                root.join(".github/ci.yml"),
            ],
        ),
        &root,
        &ignore,
    );

    assert_eq!(
        signals,
        vec![
            WatchSignal::Change(FolderChange {
                kind: ChangeKind::Modified,
                filename: Some(PathBuf::from("src/main.rs")),
            }),
            WatchSignal::Change(FolderChange {
                kind: ChangeKind::Modified,
                filename: Some(PathBuf::from(".github/ci.yml")),
            }),
        ]
    );
}

#[test]
fn classify_maps_event_kinds() {
    let root = PathBuf::from("/proj");
    let ignore = IgnoreRules::default();
    let kind_of = |kind: EventKind| match classify_event(
        event(kind, vec![root.join("a.txt")]),
        &root,
        &ignore,
    )
    .pop()
    {
        Some(WatchSignal::Change(change)) => Some(change.kind),
        _ => None,
    };

    assert_eq!(kind_of(EventKind::Create(CreateKind::File)), Some(ChangeKind::Created));
    assert_eq!(kind_of(EventKind::Remove(RemoveKind::File)), Some(ChangeKind::Removed));
    assert_eq!(
        kind_of(EventKind::Modify(ModifyKind::Name(RenameMode::Both))),
        Some(ChangeKind::Renamed)
    );
    assert_eq!(
        kind_of(EventKind::Access(AccessKind::Close(AccessMode::Write))),
        Some(ChangeKind::Modified)
    );
    assert_eq!(kind_of(EventKind::Access(AccessKind::Read)), None);
}

#[test]
fn removing_the_watched_root_is_a_failure() {
    let root = PathBuf::from("/proj");
    let signals = classify_event(
        event(EventKind::Remove(RemoveKind::Folder), vec![root.clone()]),
        &root,
        &IgnoreRules::default(),
    );
    assert!(matches!(signals.as_slice(), [WatchSignal::Failed(_)]));
}

#[tokio::test(start_paused = true)]
async fn burst_emits_once_after_quiescence() {
    let (sink, delivered) = recording_sink();
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(debounce_changes(
        rx,
        DEFAULT_DEBOUNCE,
        WriteSuppression::default(),
        sink,
    ));

    let mut last_sent = Instant::now();
    for i in 0..5 {
        tx.send(change(&format!("file{i}.txt"))).unwrap();
        last_sent = Instant::now();
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(delivered.lock().unwrap().is_empty());

    tokio::time::sleep(Duration::from_millis(199)).await;
    assert!(delivered.lock().unwrap().is_empty());

    tokio::time::sleep(Duration::from_millis(2)).await;
    let delivered = delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, last_sent + DEFAULT_DEBOUNCE);
    assert_eq!(
        delivered[0].1.filename.as_deref(),
        Some(Path::new("file4.txt"))
    );
}

#[tokio::test(start_paused = true)]
async fn suppression_drops_notifications_until_window_elapses() {
    let (sink, delivered) = recording_sink();
    let suppression = WriteSuppression::default();
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(debounce_changes(
        rx,
        DEFAULT_DEBOUNCE,
        suppression.clone(),
        sink,
    ));

    suppression.suppress(DEFAULT_SUPPRESS_WINDOW);
    tx.send(change("saved.rs")).unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(delivered.lock().unwrap().is_empty());

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(!suppression.is_active());

    tx.send(change("external.rs")).unwrap();
    tokio::time::sleep(Duration::from_millis(350)).await;
    let delivered = delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(
        delivered[0].1.filename.as_deref(),
        Some(Path::new("external.rs"))
    );
}

#[tokio::test(start_paused = true)]
async fn failure_stops_the_subscription() {
    let (sink, delivered) = recording_sink();
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(debounce_changes(
        rx,
        DEFAULT_DEBOUNCE,
        WriteSuppression::default(),
        sink,
    ));

    tx.send(WatchSignal::Failed("gone".to_string())).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(task.is_finished());

    let _ = tx.send(change("late.rs"));
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(delivered.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn closing_the_channel_cancels_pending_notification() {
    let (sink, delivered) = recording_sink();
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(debounce_changes(
        rx,
        DEFAULT_DEBOUNCE,
        WriteSuppression::default(),
        sink,
    ));

    tx.send(change("a.rs")).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    drop(tx);
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(task.is_finished());
    assert!(delivered.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn suppression_keeps_the_later_deadline() {
    let suppression = WriteSuppression::default();
    assert!(!suppression.is_active());

    suppression.suppress(Duration::from_millis(500));
    suppression.suppress(Duration::from_millis(100));
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(suppression.is_active());

    tokio::time::sleep(Duration::from_millis(301)).await;
    assert!(!suppression.is_active());
}

#[test]
fn config_follows_watcher_settings() {
    let settings = crate::kernel::services::ports::WatcherSettings {
        debounce_ms: 50,
        suppress_ms: 120,
        ignored_names: vec!["target".to_string()],
    };
    let config = WatchConfig::from_settings(&settings);

    assert_eq!(config.debounce, Duration::from_millis(50));
    assert_eq!(config.suppress_window, Duration::from_millis(120));
    assert!(config.ignore.is_ignored_path(Path::new("target/debug/app")));
    assert!(!config.ignore.is_ignored_path(Path::new("node_modules/x.js")));
}

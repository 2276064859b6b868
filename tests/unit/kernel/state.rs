use super::*;

#[test]
fn fresh_state_is_empty() {
    let state = AppState::new(WindowId::next(), WindowKind::Primary);
    assert!(state.folder.is_none());
    assert!(state.documents.is_empty());
    assert!(state.explorer.rows().is_empty());
    assert!(state.git.is_empty());
    assert!(!state.restoring);
    assert!(state.owns_session());
}

#[test]
fn secondary_windows_do_not_own_the_session() {
    let state = AppState::new(WindowId::next(), WindowKind::Secondary);
    assert!(!state.owns_session());
}

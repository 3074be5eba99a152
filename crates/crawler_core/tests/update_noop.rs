use crawler_core::{update, AppState, Msg};

#[test]
fn update_is_noop() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn stale_countdown_tick_on_fresh_state_is_noop() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::CountdownTick { generation: 0 });

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

use perfect_twenty::core::{
    action::{ActionKind, ActionRequest},
    export,
    game_state::{GameState, Phase},
    persistence::{self, KeyValueStore, MemoryStore},
    rule_engine::{self, BlockReason},
};
use perfect_twenty::util::clock::FixedClock;
use time::macros::datetime;

fn clock() -> FixedClock {
    FixedClock::new(datetime!(2024-09-14 19:30 +02:00))
}

fn score(state: &GameState, name: &str) -> Option<i32> {
    state.player(name).map(|player| player.score)
}

fn act(state: &mut GameState, kind: ActionKind, actor: &str, target: &str, points: i32) -> bool {
    rule_engine::apply_in_place(state, &ActionRequest::new(kind, actor, target, points), &clock()).allowed
}

#[test]
fn full_round_then_new_round_keeps_history() {
    let mut state = GameState::new();
    state.setup_players(&["alice", "bob", "carol"], &clock()).unwrap();

    assert!(rule_engine::quick_add(&mut state, "Alice", 10, &clock()).allowed);
    assert!(rule_engine::quick_add(&mut state, "Bob", 8, &clock()).allowed);
    assert!(act(&mut state, ActionKind::Steal, "Carol", "Alice", 3));
    assert_eq!(score(&state, "Alice"), Some(7));
    assert_eq!(score(&state, "Carol"), Some(3));

    assert!(act(&mut state, ActionKind::Swap, "Carol", "Bob", 1));
    assert_eq!(score(&state, "Bob"), Some(3));
    assert_eq!(score(&state, "Carol"), Some(8));

    // Bob is now lowest and pushes Carol to the line.
    assert!(act(&mut state, ActionKind::AddToTarget, "Bob", "Carol", 10));
    assert_eq!(score(&state, "Carol"), Some(18));
    assert!(rule_engine::quick_add(&mut state, "Carol", 2, &clock()).allowed);

    assert_eq!(state.phase(), Phase::Ended);
    assert_eq!(state.winner(), Some("Carol"));
    assert_eq!(state.wins_for("Carol"), 1);
    assert!(!act(&mut state, ActionKind::AddToTarget, "Alice", "Bob", 1));

    let first_round_entries = state.game_log().len();
    state.start_new_round(&clock()).unwrap();
    assert_eq!(state.current_game_number(), 2);
    assert!(state.players().iter().all(|player| player.score == 0));
    assert_eq!(state.game_log().for_game(1).count(), first_round_entries);
    assert_eq!(state.game_log().for_game(2).count(), 1);
    assert_eq!(state.wins_for("Carol"), 1);
}

#[test]
fn worked_example_deduct_then_overshoot() {
    let mut state = GameState::new();
    state.setup_players(&["Alice", "Bob"], &clock()).unwrap();
    rule_engine::quick_add(&mut state, "Alice", 10, &clock());
    rule_engine::quick_add(&mut state, "Bob", 10, &clock());
    rule_engine::quick_add(&mut state, "Bob", 8, &clock());

    assert!(act(&mut state, ActionKind::Deduct, "Alice", "Bob", 5));
    assert_eq!(score(&state, "Bob"), Some(13));

    assert!(act(&mut state, ActionKind::AddToTarget, "Alice", "Bob", 8));
    assert_eq!(score(&state, "Bob"), Some(15));
    assert_eq!(state.phase(), Phase::InProgress);
    assert_eq!(
        state.game_log().latest().map(|entry| entry.description.as_str()),
        Some("Bob went over 20 and was reset to 15.")
    );
}

#[test]
fn block_reasons_name_the_rule() {
    let mut state = GameState::new();
    state.setup_players(&["Ann", "Bea"], &clock()).unwrap();
    rule_engine::quick_add(&mut state, "Bea", 2, &clock());

    assert_eq!(
        rule_engine::check_action(&state, &ActionRequest::new(ActionKind::Steal, "Ann", "Bea", 3)),
        Err(BlockReason::InsufficientPoints {
            kind: ActionKind::Steal,
            actor: "Ann".to_string(),
            target: "Bea".to_string(),
            points: 3,
        })
    );
    assert_eq!(
        rule_engine::action_message(&state, &ActionRequest::swap("Bea", "Ann")),
        "Bea cannot swap score with Ann (your score must be lower than target)"
    );
    assert_eq!(
        rule_engine::check_action(&state, &ActionRequest::swap("Ann", "Zed")),
        Err(BlockReason::UnknownPlayer("Zed".to_string()))
    );
}

#[test]
fn saved_game_survives_a_restart() {
    let mut store = MemoryStore::new();
    let mut state = GameState::new();
    state.setup_players(&["Ann", "Bea"], &clock()).unwrap();
    rule_engine::quick_add(&mut state, "Bea", 9, &clock());
    act(&mut state, ActionKind::Deduct, "Ann", "Bea", 4);
    persistence::save_game(&mut store, &state).unwrap();

    let restored = persistence::load_game(&store).unwrap();
    assert_eq!(restored, state);
    assert_eq!(export::export_text(&restored), export::export_text(&state));
    assert!(
        export::export_text(&restored).ends_with("3. [Game 1] [19:30] Ann deducted 4 points from Bea.\n")
    );

    store.set(persistence::STORAGE_KEY, "{\"players\":").unwrap();
    assert!(persistence::load_game(&store).is_none());
}

#[test]
fn full_reset_clears_everything() {
    let mut state = GameState::new();
    state.setup_players(&["Ann", "Bea"], &clock()).unwrap();
    rule_engine::quick_add(&mut state, "Ann", 10, &clock());
    rule_engine::quick_add(&mut state, "Ann", 10, &clock());
    state.start_new_round(&clock()).unwrap();

    state.reset();
    assert_eq!(state.phase(), Phase::Setup);
    assert!(state.players().is_empty());
    assert!(state.game_log().is_empty());
    assert!(state.wins().is_empty());
    assert_eq!(state.current_game_number(), 1);
    assert!(!rule_engine::quick_add(&mut state, "Ann", 1, &clock()).allowed);
}

//! Browser tests for the exported game handle.
#![cfg(target_arch = "wasm32")]

use perfect_twenty::{new_game_handle, storage_key};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn handle_plays_a_round_in_the_browser() {
    let mut handle = new_game_handle();
    assert_eq!(storage_key(), "perfect20_game");
    assert_eq!(handle.setup_players(r#"["Ann","Bea"]"#), "");

    let outcome = handle.quick_add("Bea", 10);
    assert!(outcome.contains("\"allowed\":true"));
    let outcome = handle.apply_action(r#"{"kind":"addToTarget","actor":"Ann","target":"Bea","points":10}"#);
    assert!(outcome.contains("\"winner\":\"Bea\""));
    assert_eq!(handle.phase(), "ended");

    let scores = handle.scores_value().unwrap();
    assert!(scores.is_object());

    let log = handle.game_log_json();
    assert!(log.contains("Bea reached exactly 20 and wins Game 1!"));
}

#[wasm_bindgen_test]
fn saved_json_restores_in_a_fresh_handle() {
    let mut handle = new_game_handle();
    handle.setup_players(r#"["Ann","Bea"]"#);
    handle.quick_add("Ann", 4);

    let mut restored = new_game_handle();
    assert_eq!(restored.import_state_json(&handle.export_state_json()), "");
    assert_eq!(restored.players_json(), handle.players_json());
}

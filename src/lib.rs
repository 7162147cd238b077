use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod core;
pub mod util;

use crate::core::{
    action::{ActionKind, ActionOutcome, ActionRequest},
    export,
    game_state::GameState,
    persistence,
    rule_engine,
};
use crate::util::clock::SystemClock;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogEntryView {
    id: String,
    game_number: u32,
    time_text: String,
    description: String,
}

fn to_outcome_json(outcome: &ActionOutcome) -> String {
    serde_json::to_string(outcome).unwrap_or_else(|_| {
        "{\"allowed\":false,\"reason\":\"Outcome serialization failed.\",\"newScores\":{},\"winner\":null}".to_string()
    })
}

fn invalid_request_json(state: &GameState, message: String) -> String {
    to_outcome_json(&ActionOutcome::blocked(message, state.scores()))
}

fn parse_request(request_json: &str) -> Result<ActionRequest, String> {
    serde_json::from_str::<ActionRequest>(request_json.trim())
        .map_err(|err| format!("Invalid action request JSON: {err}"))
}

#[wasm_bindgen(js_name = "storageKey")]
pub fn storage_key() -> String {
    persistence::STORAGE_KEY.to_string()
}

#[wasm_bindgen]
pub struct GameHandle {
    state: GameState,
}

#[wasm_bindgen]
impl GameHandle {
    pub fn summary(&self, indentation_level: usize) -> String {
        self.state.summary(indentation_level)
    }

    pub fn phase(&self) -> String {
        self.state.phase().as_str().to_string()
    }

    #[wasm_bindgen(js_name = "currentGameNumber")]
    pub fn current_game_number(&self) -> u32 {
        self.state.current_game_number()
    }

    #[wasm_bindgen(js_name = "hasWinner")]
    pub fn has_winner(&self) -> bool {
        self.state.has_winner()
    }

    pub fn winner(&self) -> String {
        self.state.winner().unwrap_or_default().to_string()
    }

    #[wasm_bindgen(js_name = "playersJson")]
    pub fn players_json(&self) -> String {
        serde_json::to_string(self.state.players()).unwrap_or_else(|_| "[]".to_string())
    }

    #[wasm_bindgen(js_name = "winsJson")]
    pub fn wins_json(&self) -> String {
        serde_json::to_string(self.state.wins()).unwrap_or_else(|_| "{}".to_string())
    }

    #[wasm_bindgen(js_name = "gameLogJson")]
    pub fn game_log_json(&self) -> String {
        let entries = self
            .state
            .game_log()
            .newest_first()
            .map(|entry| LogEntryView {
                id: entry.id.clone(),
                game_number: entry.game_number,
                time_text: entry.time_text(),
                description: entry.description.clone(),
            })
            .collect::<Vec<_>>();

        serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string())
    }

    /// Scores as a plain `{ name: score }` object.
    #[wasm_bindgen(js_name = "scoresValue")]
    pub fn scores_value(&self) -> Result<JsValue, JsValue> {
        self.state
            .scores()
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(JsValue::from)
    }

    /// Takes a JSON array of names; returns an empty string on success.
    #[wasm_bindgen(js_name = "setupPlayers")]
    pub fn setup_players(&mut self, names_json: &str) -> String {
        let names = match serde_json::from_str::<Vec<String>>(names_json) {
            Ok(names) => names,
            Err(err) => return format!("Invalid player list JSON: {err}"),
        };

        match self.state.setup_players(&names, &SystemClock) {
            Ok(()) => String::new(),
            Err(err) => err.to_string(),
        }
    }

    #[wasm_bindgen(js_name = "isLegal")]
    pub fn is_legal(&self, request_json: &str) -> bool {
        parse_request(request_json)
            .map(|request| rule_engine::is_legal(&self.state, &request))
            .unwrap_or(false)
    }

    #[wasm_bindgen(js_name = "actionMessage")]
    pub fn action_message(&self, request_json: &str) -> String {
        match parse_request(request_json) {
            Ok(request) => rule_engine::action_message(&self.state, &request),
            Err(message) => message,
        }
    }

    #[wasm_bindgen(js_name = "legalTargetsJson")]
    pub fn legal_targets_json(&self, actor: &str, kind: &str, points: i32) -> String {
        let Some(kind) = ActionKind::parse(kind) else {
            return "[]".to_string();
        };

        let names = rule_engine::legal_targets(&self.state, actor, kind, points)
            .into_iter()
            .map(|player| player.name.clone())
            .collect::<Vec<_>>();

        serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string())
    }

    #[wasm_bindgen(js_name = "applyAction")]
    pub fn apply_action(&mut self, request_json: &str) -> String {
        let request = match parse_request(request_json) {
            Ok(request) => request,
            Err(message) => return invalid_request_json(&self.state, message),
        };

        to_outcome_json(&rule_engine::apply_in_place(&mut self.state, &request, &SystemClock))
    }

    #[wasm_bindgen(js_name = "quickAdd")]
    pub fn quick_add(&mut self, player: &str, points: i32) -> String {
        to_outcome_json(&rule_engine::quick_add(&mut self.state, player, points, &SystemClock))
    }

    #[wasm_bindgen(js_name = "quickSubtract")]
    pub fn quick_subtract(&mut self, player: &str, points: i32) -> String {
        to_outcome_json(&rule_engine::quick_subtract(&mut self.state, player, points, &SystemClock))
    }

    #[wasm_bindgen(js_name = "startNewRound")]
    pub fn start_new_round(&mut self) -> String {
        match self.state.start_new_round(&SystemClock) {
            Ok(()) => String::new(),
            Err(err) => err.to_string(),
        }
    }

    #[wasm_bindgen(js_name = "resetGame")]
    pub fn reset_game(&mut self) {
        self.state.reset();
    }

    #[wasm_bindgen(js_name = "exportText")]
    pub fn export_text(&self) -> String {
        export::export_text(&self.state)
    }

    /// The record the page keeps in local storage under `storageKey()`.
    #[wasm_bindgen(js_name = "exportStateJson")]
    pub fn export_state_json(&self) -> String {
        persistence::to_json(&self.state).unwrap_or_else(|err| {
            log::warn!("could not serialize game: {err}");
            "{\"players\":[],\"gameLog\":[],\"wins\":{},\"currentGameNumber\":1}".to_string()
        })
    }

    #[wasm_bindgen(js_name = "importStateJson")]
    pub fn import_state_json(&mut self, state_json: &str) -> String {
        match persistence::from_json(state_json) {
            Ok(state) => {
                self.state = state;
                String::new()
            }
            Err(err) => format!("Saved game could not be restored: {err}"),
        }
    }
}

#[wasm_bindgen(js_name = "newGameHandle")]
pub fn new_game_handle() -> GameHandle {
    GameHandle {
        state: GameState::new(),
    }
}

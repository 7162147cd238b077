use crate::core::{
    game_log::GameLog,
    game_state::GameState,
    player::Player,
    rule_helper,
    setup,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::{fs, io, path::PathBuf};
use thiserror::Error;

pub const STORAGE_KEY: &str = "perfect20_game";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("saved game is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("saved game is inconsistent: {0}")]
    Invalid(String),
}

/// The single record kept in local storage.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedGame {
    pub players: Vec<Player>,
    #[serde(default)]
    pub game_log: GameLog,
    #[serde(default)]
    pub wins: BTreeMap<String, u32>,
    #[serde(default = "first_game_number")]
    pub current_game_number: u32,
}

fn first_game_number() -> u32 {
    rule_helper::FIRST_GAME_NUMBER
}

impl PersistedGame {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            players: state.players().to_vec(),
            game_log: state.game_log().clone(),
            wins: state.wins().clone(),
            current_game_number: state.current_game_number(),
        }
    }

    pub fn validate(&self) -> Result<(), PersistError> {
        if self.current_game_number < rule_helper::FIRST_GAME_NUMBER {
            return Err(PersistError::Invalid("game number must be at least 1".to_string()));
        }

        if let Some(player) = self
            .players
            .iter()
            .find(|player| !(rule_helper::MIN_SCORE..=rule_helper::WINNING_SCORE).contains(&player.score))
        {
            return Err(PersistError::Invalid(format!(
                "{} has out-of-range score {}",
                player.name, player.score
            )));
        }

        if !self.players.is_empty() {
            let names = self.players.iter().map(|player| player.name.as_str()).collect::<Vec<_>>();
            let normalized = setup::validate_names(&names)
                .map_err(|err| PersistError::Invalid(err.to_string()))?;
            if normalized != names {
                return Err(PersistError::Invalid(format!(
                    "player names are not normalized: {}",
                    names.iter().join(", ")
                )));
            }
        }

        if let Some(entry) = self
            .game_log
            .newest_first()
            .find(|entry| entry.game_number < rule_helper::FIRST_GAME_NUMBER || entry.game_number > self.current_game_number)
        {
            return Err(PersistError::Invalid(format!(
                "log entry {} belongs to game {} but the current game is {}",
                entry.id, entry.game_number, self.current_game_number
            )));
        }

        if self.players.iter().filter(|player| player.has_won()).count() > 1 {
            return Err(PersistError::Invalid("more than one player at the winning score".to_string()));
        }

        Ok(())
    }

    pub fn into_state(self) -> Result<GameState, PersistError> {
        self.validate()?;
        Ok(GameState::from_parts(
            self.players,
            self.game_log,
            self.wins,
            self.current_game_number,
        ))
    }
}

pub fn to_json(state: &GameState) -> Result<String, PersistError> {
    Ok(serde_json::to_string(&PersistedGame::from_state(state))?)
}

pub fn from_json(json: &str) -> Result<GameState, PersistError> {
    serde_json::from_str::<PersistedGame>(json)?.into_state()
}

/// A string key-value store, shaped like the browser's `localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        self.values.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        match fs::remove_file(self.path_for(key)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

pub fn save_game(store: &mut dyn KeyValueStore, state: &GameState) -> Result<(), PersistError> {
    let json = to_json(state)?;
    store.set(STORAGE_KEY, &json)?;
    log::debug!("saved game {} ({} bytes)", state.current_game_number(), json.len());
    Ok(())
}

/// A missing, unreadable or corrupt record all mean "no saved game".
pub fn load_game(store: &dyn KeyValueStore) -> Option<GameState> {
    let json = match store.get(STORAGE_KEY) {
        Ok(Some(json)) => json,
        Ok(None) => return None,
        Err(err) => {
            log::warn!("could not read saved game: {err}");
            return None;
        }
    };

    match from_json(&json) {
        Ok(state) => {
            log::info!("restored saved game {}", state.current_game_number());
            Some(state)
        }
        Err(err) => {
            log::warn!("discarding saved game: {err}");
            None
        }
    }
}

pub fn clear_saved_game(store: &mut dyn KeyValueStore) -> Result<(), PersistError> {
    store.remove(STORAGE_KEY)
}

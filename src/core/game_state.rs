use crate::core::{
    game_log::GameLog,
    player::{Player, roster_to_nice_string},
    rule_helper,
    setup::{self, SetupError},
};
use crate::util::clock::Clock;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Setup,
    InProgress,
    Ended,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::InProgress => "inProgress",
            Phase::Ended => "ended",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything one game session knows: roster, log, win tally and which round
/// is being played.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub(crate) players: Vec<Player>,
    pub(crate) game_log: GameLog,
    pub(crate) wins: BTreeMap<String, u32>,
    pub(crate) current_game_number: u32,
    pub(crate) phase: Phase,
    pub(crate) winner: Option<String>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            players: Vec::new(),
            game_log: GameLog::new(),
            wins: BTreeMap::new(),
            current_game_number: rule_helper::FIRST_GAME_NUMBER,
            phase: Phase::Setup,
            winner: None,
        }
    }

    /// Rebuilds a state from stored parts. The phase is derived: no players
    /// means setup, a player sitting on the winning score means the round ended.
    pub fn from_parts(
        players: Vec<Player>,
        game_log: GameLog,
        wins: BTreeMap<String, u32>,
        current_game_number: u32,
    ) -> Self {
        let winner = players
            .iter()
            .find(|player| player.has_won())
            .map(|player| player.name.clone());
        let phase = if players.is_empty() {
            Phase::Setup
        } else if winner.is_some() {
            Phase::Ended
        } else {
            Phase::InProgress
        };

        Self {
            players,
            game_log,
            wins,
            current_game_number,
            phase,
            winner,
        }
    }

    pub fn setup_players<S: AsRef<str>>(&mut self, names: &[S], clock: &dyn Clock) -> Result<(), SetupError> {
        if self.phase != Phase::Setup {
            return Err(SetupError::AlreadySetUp);
        }

        let names = setup::validate_names(names)?;
        self.players = names.into_iter().map(Player::at_start).collect();
        self.wins = self.players.iter().map(|player| (player.name.clone(), 0)).collect();
        self.phase = Phase::InProgress;
        self.winner = None;
        log::info!(
            "game {} set up with {}",
            self.current_game_number,
            self.players.iter().map(|player| player.name.as_str()).join(", ")
        );
        self.log(
            format!("Game {} started. All scores set to 0.", self.current_game_number),
            clock,
        );
        Ok(())
    }

    pub fn start_new_round(&mut self, clock: &dyn Clock) -> Result<(), SetupError> {
        if self.phase == Phase::Setup {
            return Err(SetupError::NoPlayers);
        }

        for player in &mut self.players {
            player.set_score(rule_helper::MIN_SCORE);
        }
        self.current_game_number += 1;
        self.phase = Phase::InProgress;
        self.winner = None;
        log::info!("starting game {}", self.current_game_number);
        self.log(
            format!("Game {} started. All scores set to 0.", self.current_game_number),
            clock,
        );
        Ok(())
    }

    /// Back to setup: roster, log and win tally are discarded.
    pub fn reset(&mut self) {
        log::info!("full reset after {} game(s)", self.current_game_number);
        *self = Self::new();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_in_progress(&self) -> bool {
        self.phase == Phase::InProgress
    }

    pub fn has_winner(&self) -> bool {
        self.winner.is_some()
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.is_named(name))
    }

    pub(crate) fn player_index(&self, name: &str) -> Option<usize> {
        self.players.iter().position(|player| player.is_named(name))
    }

    pub fn scores(&self) -> BTreeMap<String, i32> {
        self.players
            .iter()
            .map(|player| (player.name.clone(), player.score))
            .collect()
    }

    pub fn game_log(&self) -> &GameLog {
        &self.game_log
    }

    pub fn wins(&self) -> &BTreeMap<String, u32> {
        &self.wins
    }

    pub fn wins_for(&self, name: &str) -> u32 {
        self.wins.get(name).copied().unwrap_or(0)
    }

    pub fn current_game_number(&self) -> u32 {
        self.current_game_number
    }

    pub(crate) fn log(&mut self, description: impl Into<String>, clock: &dyn Clock) {
        let entry = self.game_log.push(description, self.current_game_number, clock);
        log::debug!("log {}: {}", entry.id, entry.description);
    }

    pub(crate) fn record_win(&mut self, player_idx: usize, clock: &dyn Clock) {
        let name = self.players[player_idx].name.clone();
        *self.wins.entry(name.clone()).or_insert(0) += 1;
        self.phase = Phase::Ended;
        self.winner = Some(name.clone());
        log::info!("{name} wins game {}", self.current_game_number);
        self.log(
            format!(
                "{name} reached exactly {} and wins Game {}!",
                rule_helper::WINNING_SCORE,
                self.current_game_number
            ),
            clock,
        );
    }

    pub fn summary(&self, indentation_level: usize) -> String {
        self.state_summary(&" ".repeat(indentation_level))
    }

    pub fn state_summary(&self, leading_text: &str) -> String {
        let mut sb = format!(
            "{leading_text}Game {}, {}",
            self.current_game_number, self.phase
        );

        if let Some(winner) = self.winner() {
            sb.push_str(&format!(", winner {winner}"));
        }

        for player in &self.players {
            sb.push_str(&format!(
                "\n{leading_text}  {:<10} {:>2}/{}  wins {}",
                player.name,
                player.score,
                rule_helper::WINNING_SCORE,
                self.wins_for(&player.name)
            ));
        }

        sb
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Game {} [{}] {}",
            self.current_game_number,
            self.phase,
            roster_to_nice_string(&self.players)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::clock::FixedClock;
    use time::macros::datetime;

    fn clock() -> FixedClock {
        FixedClock::new(datetime!(2024-06-01 18:00 UTC))
    }

    fn started(names: &[&str]) -> GameState {
        let mut state = GameState::new();
        state.setup_players(names, &clock()).unwrap();
        state
    }

    #[test]
    fn new_state_is_in_setup() {
        let state = GameState::new();
        assert_eq!(state.phase(), Phase::Setup);
        assert!(state.players().is_empty());
        assert_eq!(state.current_game_number(), 1);
        assert!(state.game_log().is_empty());
    }

    #[test]
    fn setup_players_starts_round_with_zero_scores() {
        let state = started(&["alice", "bob"]);
        assert_eq!(state.phase(), Phase::InProgress);
        assert_eq!(
            state.scores(),
            BTreeMap::from([("Alice".to_string(), 0), ("Bob".to_string(), 0)])
        );
        assert_eq!(state.wins_for("Alice"), 0);
        assert_eq!(
            state.game_log().latest().map(|entry| entry.description.as_str()),
            Some("Game 1 started. All scores set to 0.")
        );
    }

    #[test]
    fn setup_players_rejects_bad_rosters_and_second_setup() {
        let mut state = GameState::new();
        assert_eq!(
            state.setup_players(&["Ann", "ann"], &clock()),
            Err(SetupError::DuplicateName { name: "Ann".to_string() })
        );
        assert_eq!(state.phase(), Phase::Setup);

        let mut state = started(&["Ann", "Bea"]);
        assert_eq!(
            state.setup_players(&["Cid", "Dee"], &clock()),
            Err(SetupError::AlreadySetUp)
        );
    }

    #[test]
    fn player_lookup_is_case_insensitive() {
        let state = started(&["Alice", "Bob"]);
        assert_eq!(state.player("bob").map(|player| player.name.as_str()), Some("Bob"));
        assert!(state.player("Carol").is_none());
    }

    #[test]
    fn start_new_round_requires_players() {
        let mut state = GameState::new();
        assert_eq!(state.start_new_round(&clock()), Err(SetupError::NoPlayers));
    }

    #[test]
    fn record_win_and_new_round() {
        let mut state = started(&["Alice", "Bob"]);
        state.players[0].set_score(20);
        state.record_win(0, &clock());

        assert_eq!(state.phase(), Phase::Ended);
        assert_eq!(state.winner(), Some("Alice"));
        assert_eq!(state.wins_for("Alice"), 1);

        state.start_new_round(&clock()).unwrap();
        assert_eq!(state.phase(), Phase::InProgress);
        assert_eq!(state.current_game_number(), 2);
        assert!(state.winner().is_none());
        assert!(state.players().iter().all(|player| player.score == 0));
        assert_eq!(state.wins_for("Alice"), 1);
        assert_eq!(state.game_log().for_game(1).count(), 2);
        assert_eq!(state.game_log().for_game(2).count(), 1);
    }

    #[test]
    fn reset_returns_to_setup() {
        let mut state = started(&["Alice", "Bob"]);
        state.start_new_round(&clock()).unwrap();
        state.reset();
        assert_eq!(state, GameState::new());
    }

    #[test]
    fn from_parts_derives_phase() {
        let empty = GameState::from_parts(Vec::new(), GameLog::new(), BTreeMap::new(), 1);
        assert_eq!(empty.phase(), Phase::Setup);

        let playing = GameState::from_parts(
            vec![Player::new("Ann", 4), Player::new("Bea", 19)],
            GameLog::new(),
            BTreeMap::new(),
            3,
        );
        assert_eq!(playing.phase(), Phase::InProgress);

        let ended = GameState::from_parts(
            vec![Player::new("Ann", 4), Player::new("Bea", 20)],
            GameLog::new(),
            BTreeMap::new(),
            3,
        );
        assert_eq!(ended.phase(), Phase::Ended);
        assert_eq!(ended.winner(), Some("Bea"));
    }

    #[test]
    fn summary_lists_players() {
        let state = started(&["Alice", "Bob"]);
        assert_eq!(
            state.summary(1),
            concat!(
                " Game 1, inProgress\n",
                "   Alice       0/20  wins 0\n",
                "   Bob         0/20  wins 0"
            )
        );
        assert_eq!(state.to_string(), "Game 1 [inProgress] Alice(0) Bob(0)");
    }
}

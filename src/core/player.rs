use crate::core::rule_helper;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[readonly::make]
pub struct Player {
    pub name: String,
    pub score: i32,
}

impl Player {
    pub fn new(name: impl Into<String>, score: i32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }

    pub fn at_start(name: impl Into<String>) -> Self {
        Self::new(name, rule_helper::MIN_SCORE)
    }

    pub(crate) fn set_score(&mut self, score: i32) {
        self.score = score;
    }

    pub fn has_won(&self) -> bool {
        rule_helper::is_winning_score(self.score)
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.score)
    }
}

pub fn roster_to_nice_string<'a>(players: impl IntoIterator<Item = &'a Player>) -> String {
    players.into_iter().map(Player::to_string).join(" ")
}

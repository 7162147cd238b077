use crate::util::clock::{self, Clock};
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;
use time::macros::format_description;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[readonly::make]
pub struct LogEntry {
    pub id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub description: String,
    pub game_number: u32,
}

impl LogEntry {
    pub fn new(
        id: impl Into<String>,
        timestamp: OffsetDateTime,
        description: impl Into<String>,
        game_number: u32,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp,
            description: description.into(),
            game_number,
        }
    }

    /// Hours and minutes of the entry in the offset it was recorded with.
    pub fn time_text(&self) -> String {
        self.timestamp
            .format(format_description!("[hour]:[minute]"))
            .unwrap_or_else(|_| "--:--".to_string())
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Game {}] [{}] {}",
            self.game_number,
            self.time_text(),
            self.description
        )
    }
}

/// Append-only record of what happened, newest entry first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct GameLog {
    entries: Vec<LogEntry>,
}

impl GameLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, description: impl Into<String>, game_number: u32, clock: &dyn Clock) -> &LogEntry {
        let timestamp = clock.now();
        // The sequence part keeps ids unique when several entries share a millisecond.
        let id = format!("{}-{}", clock::unix_millis(timestamp), self.entries.len());
        self.entries.insert(0, LogEntry::new(id, timestamp, description, game_number));
        &self.entries[0]
    }

    pub fn newest_first(&self) -> impl DoubleEndedIterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn oldest_first(&self) -> impl DoubleEndedIterator<Item = &LogEntry> {
        self.entries.iter().rev()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.first()
    }

    pub fn for_game(&self, game_number: u32) -> impl Iterator<Item = &LogEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.game_number == game_number)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

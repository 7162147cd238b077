use crate::core::rule_helper::{MAX_NAME_LEN, MAX_PLAYERS, MIN_PLAYERS};
use itertools::Itertools;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("number of players must be between 2 and 10, got {0}")]
    PlayerCount(usize),
    #[error("expected {expected} player names, got {actual}")]
    NameCountMismatch { expected: usize, actual: usize },
    #[error("player {position} needs a name")]
    EmptyName { position: usize },
    #[error("'{name}' must be 1 to 10 letters (A-Z)")]
    InvalidName { name: String },
    #[error("'{name}' is used by more than one player")]
    DuplicateName { name: String },
    #[error("players have not been set up")]
    NoPlayers,
    #[error("players are already set up; reset the game first")]
    AlreadySetUp,
}

pub fn validate_player_count(count: usize) -> Result<usize, SetupError> {
    if (MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
        Ok(count)
    } else {
        Err(SetupError::PlayerCount(count))
    }
}

/// Parses a typed player count; anything unparsable counts as zero players.
pub fn parse_player_count(input: &str) -> Result<usize, SetupError> {
    validate_player_count(input.trim().parse::<usize>().unwrap_or(0))
}

/// Drops non-letters and truncates, the way the name field filters keystrokes.
pub fn sanitize_name_input(raw: &str) -> String {
    let letters = raw
        .chars()
        .filter(char::is_ascii_alphabetic)
        .take(MAX_NAME_LEN)
        .collect::<String>();
    normalize_name(&letters)
}

/// First letter upper case, the rest lower case. Only ASCII letters change
/// case, so normalizing twice gives the same name.
pub fn normalize_name(name: &str) -> String {
    let mut chars = name.trim().chars();
    match chars.next() {
        Some(first) => std::iter::once(first.to_ascii_uppercase())
            .chain(chars.map(|ch| ch.to_ascii_lowercase()))
            .collect(),
        None => String::new(),
    }
}

pub fn is_valid_name(name: &str) -> bool {
    let len = name.chars().count();
    (1..=MAX_NAME_LEN).contains(&len) && name.chars().all(|ch| ch.is_ascii_alphabetic())
}

/// Normalizes and checks a full roster of names, in order.
pub fn validate_names<S: AsRef<str>>(names: &[S]) -> Result<Vec<String>, SetupError> {
    validate_player_count(names.len())?;

    let normalized = names
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            let name = normalize_name(raw.as_ref());
            if name.is_empty() {
                Err(SetupError::EmptyName { position: idx + 1 })
            } else if !is_valid_name(&name) {
                Err(SetupError::InvalidName { name })
            } else {
                Ok(name)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(name) = normalized
        .iter()
        .duplicates_by(|name| name.to_ascii_lowercase())
        .next()
    {
        return Err(SetupError::DuplicateName { name: name.clone() });
    }

    Ok(normalized)
}

/// Two-step setup: a declared count followed by that many names.
pub fn validate_roster<S: AsRef<str>>(count: usize, names: &[S]) -> Result<Vec<String>, SetupError> {
    validate_player_count(count)?;
    if names.len() != count {
        return Err(SetupError::NameCountMismatch {
            expected: count,
            actual: names.len(),
        });
    }
    validate_names(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_name_capitalizes() {
        assert_eq!(normalize_name("alice"), "Alice");
        assert_eq!(normalize_name("bOB"), "Bob");
        assert_eq!(normalize_name("  eve "), "Eve");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn sanitize_name_input_filters_like_the_input_field() {
        assert_eq!(sanitize_name_input("ann-marie 2"), "Annmarie");
        assert_eq!(sanitize_name_input("abcdefghijklmno"), "Abcdefghij");
        assert_eq!(sanitize_name_input("123"), "");
        assert_eq!(sanitize_name_input("ßen"), "En");
    }

    #[test]
    fn names_are_ascii_letters_and_normalize_idempotently() {
        assert_eq!(normalize_name("ßen"), "ßen");
        assert!(!is_valid_name("ßen"));
        assert!(!is_valid_name("Ｆin"));
        assert_eq!(
            validate_names(&["ßen", "Bob"]),
            Err(SetupError::InvalidName { name: "ßen".to_string() })
        );
        for raw in ["mcDONALD", "eve", "ZOE"] {
            let once = normalize_name(raw);
            assert_eq!(normalize_name(&once), once);
        }
    }

    #[test]
    fn player_count_bounds() {
        assert_eq!(validate_player_count(2), Ok(2));
        assert_eq!(validate_player_count(10), Ok(10));
        assert_eq!(validate_player_count(1), Err(SetupError::PlayerCount(1)));
        assert_eq!(validate_player_count(11), Err(SetupError::PlayerCount(11)));
        assert_eq!(parse_player_count(" 4 "), Ok(4));
        assert_eq!(parse_player_count("four"), Err(SetupError::PlayerCount(0)));
    }

    #[test]
    fn validate_names_normalizes_in_order() {
        assert_eq!(
            validate_names(&["alice", "BOB", "Charlie"]),
            Ok(vec!["Alice".to_string(), "Bob".to_string(), "Charlie".to_string()])
        );
    }

    #[test]
    fn validate_names_rejects_empty_invalid_and_duplicate() {
        assert_eq!(
            validate_names(&["Alice", " "]),
            Err(SetupError::EmptyName { position: 2 })
        );
        assert_eq!(
            validate_names(&["Alice", "Bob1"]),
            Err(SetupError::InvalidName { name: "Bob1".to_string() })
        );
        assert_eq!(
            validate_names(&["Alice", "Bobbybobbyb"]),
            Err(SetupError::InvalidName { name: "Bobbybobbyb".to_string() })
        );
        assert_eq!(
            validate_names(&["alice", "Bob", "ALICE"]),
            Err(SetupError::DuplicateName { name: "Alice".to_string() })
        );
        assert_eq!(validate_names(&["Solo"]), Err(SetupError::PlayerCount(1)));
    }

    #[test]
    fn validate_roster_checks_declared_count() {
        assert_eq!(
            validate_roster(3, &["Ann", "Bea"]),
            Err(SetupError::NameCountMismatch { expected: 3, actual: 2 })
        );
        assert!(validate_roster(2, &["Ann", "Bea"]).is_ok());
    }

    #[test]
    fn errors_render_readable_messages() {
        assert_eq!(
            SetupError::PlayerCount(12).to_string(),
            "number of players must be between 2 and 10, got 12"
        );
        assert_eq!(
            SetupError::InvalidName { name: "X1".to_string() }.to_string(),
            "'X1' must be 1 to 10 letters (A-Z)"
        );
    }
}

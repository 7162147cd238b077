pub const WINNING_SCORE: i32 = 20;
pub const OVERSHOOT_RESET_SCORE: i32 = 15;
pub const MIN_SCORE: i32 = 0;

pub const MIN_ACTION_POINTS: i32 = 1;
pub const MAX_ACTION_POINTS: i32 = 10;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 10;
pub const MAX_NAME_LEN: usize = 10;

pub const FIRST_GAME_NUMBER: u32 = 1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Normalization {
    Unchanged,
    OvershootRedirect,
    ClampedToZero,
}

/// Brings a freshly computed score back into `[MIN_SCORE, WINNING_SCORE]`.
///
/// Going over the winning score is penalized: the score drops to
/// `OVERSHOOT_RESET_SCORE` instead of being capped at `WINNING_SCORE`.
pub fn normalize_score(raw_score: i32) -> (i32, Normalization) {
    if raw_score > WINNING_SCORE {
        (OVERSHOOT_RESET_SCORE, Normalization::OvershootRedirect)
    } else if raw_score < MIN_SCORE {
        (MIN_SCORE, Normalization::ClampedToZero)
    } else {
        (raw_score, Normalization::Unchanged)
    }
}

pub fn clamp_points(points: i32) -> i32 {
    num::clamp(points, MIN_ACTION_POINTS, MAX_ACTION_POINTS)
}

pub fn is_winning_score(score: i32) -> bool {
    score == WINNING_SCORE
}

pub fn points_text(points: i32) -> String {
    if points == 1 {
        "1 point".to_string()
    } else {
        format!("{points} points")
    }
}

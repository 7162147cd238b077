use crate::core::{
    action::{ActionKind, ActionOutcome, ActionRequest},
    game_state::{GameState, Phase},
    player::Player,
    rule_helper::{self, Normalization},
};
use crate::util::clock::Clock;
use thiserror::Error;

/// Why an action cannot be applied right now. The UI shows these verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockReason {
    #[error("players have not been set up")]
    NotStarted,
    #[error("the round is over; start a new round to keep playing")]
    RoundEnded,
    #[error("{0} is not playing in this game")]
    UnknownPlayer(String),
    #[error("{0} cannot target themselves")]
    SamePlayer(String),
    #[error("{actor} cannot {} {target} (your score must be lower than target)", blocked_phrase(.kind))]
    ScoreNotLower {
        kind: ActionKind,
        actor: String,
        target: String,
    },
    #[error("{}", insufficient_points_text(.kind, .actor, .target, .points))]
    InsufficientPoints {
        kind: ActionKind,
        actor: String,
        target: String,
        points: i32,
    },
    #[error("{player} doesn't have enough points to subtract {points}")]
    NotEnoughToSubtract { player: String, points: i32 },
}

fn blocked_phrase(kind: &ActionKind) -> &'static str {
    match kind {
        ActionKind::AddToTarget => "add points to",
        ActionKind::Deduct => "deduct points from",
        ActionKind::Swap => "swap score with",
        ActionKind::Steal => "steal points from",
    }
}

fn insufficient_points_text(kind: &ActionKind, actor: &str, target: &str, points: &i32) -> String {
    if *kind == ActionKind::Steal {
        format!("{target} doesn't have enough points for {actor} to steal {points}")
    } else {
        format!("{target} doesn't have enough points to deduct {points}")
    }
}

fn check_round(state: &GameState) -> Result<(), BlockReason> {
    match state.phase() {
        Phase::Setup => Err(BlockReason::NotStarted),
        Phase::Ended => Err(BlockReason::RoundEnded),
        Phase::InProgress => Ok(()),
    }
}

fn find_player(state: &GameState, name: &str) -> Result<usize, BlockReason> {
    state
        .player_index(name)
        .ok_or_else(|| BlockReason::UnknownPlayer(name.trim().to_string()))
}

/// Resolves actor and target to roster indices, or the first rule they break.
fn locate(state: &GameState, request: &ActionRequest) -> Result<(usize, usize), BlockReason> {
    check_round(state)?;
    let actor_idx = find_player(state, &request.actor)?;
    let target_idx = find_player(state, &request.target)?;
    let actor = &state.players[actor_idx];
    let target = &state.players[target_idx];

    if actor_idx == target_idx {
        return Err(BlockReason::SamePlayer(actor.name.clone()));
    }

    // Lower score acts on higher score, for every kind of action.
    if actor.score >= target.score {
        return Err(BlockReason::ScoreNotLower {
            kind: request.kind,
            actor: actor.name.clone(),
            target: target.name.clone(),
        });
    }

    let points = request.effective_points();
    if request.kind.takes_from_target() && target.score < points {
        return Err(BlockReason::InsufficientPoints {
            kind: request.kind,
            actor: actor.name.clone(),
            target: target.name.clone(),
            points,
        });
    }

    Ok((actor_idx, target_idx))
}

pub fn check_action(state: &GameState, request: &ActionRequest) -> Result<(), BlockReason> {
    locate(state, request).map(|_| ())
}

/// The one legality predicate: gates applying an action and filters the
/// targets offered to an actor.
pub fn is_legal(state: &GameState, request: &ActionRequest) -> bool {
    check_action(state, request).is_ok()
}

pub fn legal_targets<'a>(
    state: &'a GameState,
    actor: &str,
    kind: ActionKind,
    points: i32,
) -> Vec<&'a Player> {
    state
        .players()
        .iter()
        .filter(|target| is_legal(state, &ActionRequest::new(kind, actor, target.name.as_str(), points)))
        .collect()
}

/// What the action would do, or why it cannot happen.
pub fn action_message(state: &GameState, request: &ActionRequest) -> String {
    let (actor_idx, target_idx) = match locate(state, request) {
        Ok(indices) => indices,
        Err(reason) => return reason.to_string(),
    };
    let actor = &state.players[actor_idx].name;
    let target = &state.players[target_idx].name;
    let points = rule_helper::points_text(request.effective_points());

    match request.kind {
        ActionKind::AddToTarget => format!("{actor} will add {points} to {target}"),
        ActionKind::Deduct => format!("{points} will be deducted from {target}"),
        ActionKind::Swap => format!("{actor} and {target} will swap their scores"),
        ActionKind::Steal => format!("{actor} will steal {points} from {target}"),
    }
}

fn describe(kind: ActionKind, actor: &str, target: &str, points: i32) -> String {
    let points = rule_helper::points_text(points);
    match kind {
        ActionKind::AddToTarget => format!("{actor} added {points} to {target}."),
        ActionKind::Deduct => format!("{actor} deducted {points} from {target}."),
        ActionKind::Swap => format!("{actor} swapped scores with {target}."),
        ActionKind::Steal => format!("{actor} stole {points} from {target}."),
    }
}

/// Pure form: the given state is left untouched.
pub fn apply(state: &GameState, request: &ActionRequest, clock: &dyn Clock) -> (GameState, ActionOutcome) {
    let mut new_state = state.clone();
    let outcome = apply_in_place(&mut new_state, request, clock);
    (new_state, outcome)
}

pub fn apply_in_place(state: &mut GameState, request: &ActionRequest, clock: &dyn Clock) -> ActionOutcome {
    let (actor_idx, target_idx) = match locate(state, request) {
        Ok(indices) => indices,
        Err(reason) => {
            log::debug!("blocked {request}: {reason}");
            return ActionOutcome::blocked(reason.to_string(), state.scores());
        }
    };

    let points = request.effective_points();
    let actor_score = state.players[actor_idx].score;
    let target_score = state.players[target_idx].score;
    let (new_actor_score, new_target_score) = match request.kind {
        ActionKind::AddToTarget => (actor_score, target_score + points),
        ActionKind::Deduct => (actor_score, target_score - points),
        ActionKind::Swap => (target_score, actor_score),
        ActionKind::Steal => (actor_score + points, target_score - points),
    };

    let description = describe(
        request.kind,
        &state.players[actor_idx].name,
        &state.players[target_idx].name,
        points,
    );
    log::debug!("applying {request}");
    state.log(description.clone(), clock);
    settle_score(state, actor_idx, new_actor_score, clock);
    settle_score(state, target_idx, new_target_score, clock);
    let winner = settle_round(state, clock);

    ActionOutcome::applied(description, state.scores(), winner)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QuickAction {
    Add,
    Subtract,
}

pub fn check_quick_action(
    state: &GameState,
    player: &str,
    action: QuickAction,
    points: i32,
) -> Result<(), BlockReason> {
    locate_quick(state, player, action, points).map(|_| ())
}

fn locate_quick(state: &GameState, player: &str, action: QuickAction, points: i32) -> Result<usize, BlockReason> {
    check_round(state)?;
    let player_idx = find_player(state, player)?;
    let player = &state.players[player_idx];
    let points = rule_helper::clamp_points(points);

    if action == QuickAction::Subtract && player.score < points {
        return Err(BlockReason::NotEnoughToSubtract {
            player: player.name.clone(),
            points,
        });
    }

    Ok(player_idx)
}

/// Direct change to a player's own score, outside the actor/target rules.
pub fn quick_action(
    state: &mut GameState,
    player: &str,
    action: QuickAction,
    points: i32,
    clock: &dyn Clock,
) -> ActionOutcome {
    let player_idx = match locate_quick(state, player, action, points) {
        Ok(idx) => idx,
        Err(reason) => {
            log::debug!("blocked quick {action:?} for {player}: {reason}");
            return ActionOutcome::blocked(reason.to_string(), state.scores());
        }
    };

    let points = rule_helper::clamp_points(points);
    let name = state.players[player_idx].name.clone();
    let score = state.players[player_idx].score;
    let (raw_score, description) = match action {
        QuickAction::Add => (
            score + points,
            format!("{name} added {} to self.", rule_helper::points_text(points)),
        ),
        QuickAction::Subtract => (
            score - points,
            format!("{name} deducted {} from self.", rule_helper::points_text(points)),
        ),
    };

    state.log(description.clone(), clock);
    settle_score(state, player_idx, raw_score, clock);
    let winner = settle_round(state, clock);

    ActionOutcome::applied(description, state.scores(), winner)
}

pub fn quick_add(state: &mut GameState, player: &str, points: i32, clock: &dyn Clock) -> ActionOutcome {
    quick_action(state, player, QuickAction::Add, points, clock)
}

pub fn quick_subtract(state: &mut GameState, player: &str, points: i32, clock: &dyn Clock) -> ActionOutcome {
    quick_action(state, player, QuickAction::Subtract, points, clock)
}

fn settle_score(state: &mut GameState, player_idx: usize, raw_score: i32, clock: &dyn Clock) {
    let (score, normalization) = rule_helper::normalize_score(raw_score);
    state.players[player_idx].set_score(score);

    match normalization {
        Normalization::OvershootRedirect => {
            let name = state.players[player_idx].name.clone();
            log::debug!("{name} overshot to {raw_score}, reset to {score}");
            state.log(
                format!(
                    "{name} went over {} and was reset to {}.",
                    rule_helper::WINNING_SCORE,
                    rule_helper::OVERSHOOT_RESET_SCORE
                ),
                clock,
            );
        }
        Normalization::ClampedToZero => {
            log::debug!("{} clamped from {raw_score} to {score}", state.players[player_idx].name);
        }
        Normalization::Unchanged => {}
    }
}

/// Ends the round if somebody now sits on exactly the winning score.
fn settle_round(state: &mut GameState, clock: &dyn Clock) -> Option<String> {
    let winner_idx = state.players.iter().position(Player::has_won)?;
    state.record_win(winner_idx, clock);
    state.winner().map(str::to_string)
}
